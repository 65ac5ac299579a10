/* Geometry helpers for the map layer: everything here takes route lines in
`[lng, lat]` order and produces GeoJSON feature collections ready to be handed
to the renderer.

Projections onto a line are done in the lng/lat plane. That is not a true
distance on the sphere but the segments of a walking route are short enough
for picking the nearest one.

The plain functions are fail-soft and return `None` when there is nothing to
draw. The `try_` variants say why through a `GeometryError`.
*/
use std::f64::consts::PI;

use anyhow::Result;
use geo_types::Coord;
use geojson::{Feature, FeatureCollection, Geometry, Position, Value};
use itertools::Itertools;
use strum_macros::Display;

use crate::{
    circuit_progress::Poi,
    geo_utils::{haversine, EARTH_RADIUS},
    zone::Zone,
};

pub const ZONE_POLYGON_STEPS: usize = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum GeometryError {
    #[strum(to_string = "no input geometry")]
    NoInput,
    #[strum(to_string = "line needs at least 2 coordinates")]
    TooFewPoints,
    #[strum(to_string = "coordinate is malformed or not finite")]
    NonFiniteCoordinate,
    #[strum(to_string = "expected a LineString geometry")]
    UnsupportedGeometry,
    #[strum(to_string = "result has fewer than 2 points")]
    EmptyResult,
}

impl std::error::Error for GeometryError {}

/// Where a point lands on a polyline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    /// Index of the segment start vertex.
    pub segment: usize,
    /// Position along the segment, in `[0, 1]`.
    pub t: f64,
    pub point: Coord<f64>,
    pub dist2: f64,
}

pub fn zone_radius_for_speed(kmh: f64) -> f64 {
    if kmh <= 20. {
        100.
    } else if kmh < 50. {
        250.
    } else {
        450.
    }
}

pub fn zoom_for_speed(kmh: f64) -> u8 {
    if kmh <= 20. {
        16
    } else if kmh < 50. {
        15
    } else {
        14
    }
}

pub fn coord_is_finite(c: &Coord<f64>) -> bool {
    c.x.is_finite() && c.y.is_finite()
}

fn position_to_coord(position: &Position) -> Result<Coord<f64>> {
    if position.len() < 2 {
        return Err(GeometryError::NonFiniteCoordinate.into());
    }
    let c = Coord {
        x: position[0],
        y: position[1],
    };
    if !coord_is_finite(&c) {
        return Err(GeometryError::NonFiniteCoordinate.into());
    }
    Ok(c)
}

fn coord_to_position(c: &Coord<f64>) -> Position {
    vec![c.x, c.y]
}

/// Reads a GeoJSON `LineString` (a single-line `MultiLineString` is accepted
/// too since some routing responses come that way).
pub fn line_from_geometry(geometry: &Geometry) -> Result<Vec<Coord<f64>>> {
    let positions = match &geometry.value {
        Value::LineString(positions) => positions,
        Value::MultiLineString(lines) if lines.len() == 1 => &lines[0],
        _ => return Err(GeometryError::UnsupportedGeometry.into()),
    };
    positions.iter().map(position_to_coord).collect()
}

pub fn line_geometry(coords: &[Coord<f64>]) -> Geometry {
    Geometry::new(Value::LineString(
        coords.iter().map(coord_to_position).collect(),
    ))
}

fn plain_feature(geometry: Geometry) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: None,
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn dist2(a: &Coord<f64>, b: &Coord<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Clamped projection of `p` onto the segment `a`-`b`.
pub fn project_on_segment(p: &Coord<f64>, a: &Coord<f64>, b: &Coord<f64>) -> (Coord<f64>, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    if len2 == 0. {
        return (*a, 0.);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0., 1.);
    (
        Coord {
            x: a.x + t * dx,
            y: a.y + t * dy,
        },
        t,
    )
}

/// Nearest point on the polyline. Ties go to the earliest segment.
pub fn project_on_line(coords: &[Coord<f64>], p: &Coord<f64>) -> Option<Projection> {
    let mut best: Option<Projection> = None;
    for (i, (a, b)) in coords.iter().tuple_windows().enumerate() {
        let (point, t) = project_on_segment(p, a, b);
        let d2 = dist2(p, &point);
        if best.map_or(true, |best| d2 < best.dist2) {
            best = Some(Projection {
                segment: i,
                t,
                point,
                dist2: d2,
            });
        }
    }
    best
}

// https://www.movable-type.co.uk/scripts/latlong.html "Destination point given
// distance and bearing from start point"
fn destination(lat: f64, lng: f64, bearing: f64, distance: f64) -> (f64, f64) {
    let phi1 = lat.to_radians();
    let lambda1 = lng.to_radians();
    let delta = distance / EARTH_RADIUS;
    let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * bearing.cos()).asin();
    let lambda2 = lambda1
        + (bearing.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());
    (phi2.to_degrees(), lambda2.to_degrees())
}

/// Closed ring of `steps + 1` positions approximating the zone's circle.
pub fn zone_ring(zone: &Zone, steps: usize) -> Vec<Position> {
    let center = &zone.center;
    let mut ring: Vec<Position> = (0..steps)
        .map(|i| {
            let bearing = (i as f64 / steps as f64) * 2. * PI;
            let (lat, lng) = destination(
                center.latitude,
                center.longitude,
                bearing,
                zone.radius_meters,
            );
            vec![lng, lat]
        })
        .collect();
    // the sweep ends at 2π which is the first vertex again, reuse it so the
    // ring is closed exactly
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    ring
}

pub fn try_zone_to_polygon(zone: Option<&Zone>) -> Result<FeatureCollection> {
    let zone = zone.ok_or(GeometryError::NoInput)?;
    if !zone.center.is_finite() || !zone.radius_meters.is_finite() {
        return Err(GeometryError::NonFiniteCoordinate.into());
    }
    let ring = zone_ring(zone, ZONE_POLYGON_STEPS);
    let mut feature = plain_feature(Geometry::new(Value::Polygon(vec![ring])));
    feature.set_property("zone_id", zone.id.clone());
    feature.set_property("kind", zone.kind.to_string());
    feature.set_property("radius_meters", zone.radius_meters);
    if let Some(name) = &zone.name {
        feature.set_property("name", name.clone());
    }
    Ok(collection(vec![feature]))
}

pub fn zone_to_polygon(zone: Option<&Zone>) -> Option<FeatureCollection> {
    try_zone_to_polygon(zone).ok()
}

pub fn try_build_connectors(line: &Geometry, ordered_pois: &[Poi]) -> Result<FeatureCollection> {
    let coords = line_from_geometry(line)?;
    if coords.len() < 2 {
        return Err(GeometryError::TooFewPoints.into());
    }

    let mut features = Vec::with_capacity(ordered_pois.len());
    for (order, poi) in ordered_pois.iter().enumerate() {
        let poi_coord = poi.lng_lat();
        if !coord_is_finite(&poi_coord) {
            debug!("skipping connector for POI {} without a valid position", poi.id);
            continue;
        }
        let projection = match project_on_line(&coords, &poi_coord) {
            Some(projection) => projection,
            None => continue,
        };
        let mut feature = plain_feature(line_geometry(&[poi_coord, projection.point]));
        feature.set_property("poi_id", poi.id.clone());
        feature.set_property("order", order);
        feature.set_property(
            "distance_meters",
            haversine(
                poi_coord.y,
                poi_coord.x,
                projection.point.y,
                projection.point.x,
            ),
        );
        features.push(feature);
    }
    Ok(collection(features))
}

/// One line per POI, from the POI to the closest point of the route.
pub fn build_connectors(line: &Geometry, ordered_pois: &[Poi]) -> Option<FeatureCollection> {
    match try_build_connectors(line, ordered_pois) {
        Ok(connectors) => Some(connectors),
        Err(e) => {
            debug!("no connectors: {e}");
            None
        }
    }
}

/// The part of the route between `start` and where the user currently is,
/// ordered from `start` towards the user.
pub fn passed_coords(
    coords: &[Coord<f64>],
    user: &Coord<f64>,
    start: &Coord<f64>,
) -> Result<Vec<Coord<f64>>> {
    if coords.len() < 2 {
        return Err(GeometryError::TooFewPoints.into());
    }
    if !coord_is_finite(user) || !coord_is_finite(start) {
        return Err(GeometryError::NonFiniteCoordinate.into());
    }
    let projection = project_on_line(coords, user).ok_or(GeometryError::TooFewPoints)?;
    // TODO: a route that passes the same place twice can match the wrong
    // vertex here, needs the travelled distance to disambiguate.
    let start_idx = coords
        .iter()
        .position_min_by(|a, b| dist2(a, start).total_cmp(&dist2(b, start)))
        .ok_or(GeometryError::TooFewPoints)?;

    let passed: Vec<Coord<f64>> = if start_idx <= projection.segment {
        coords[start_idx..=projection.segment]
            .iter()
            .copied()
            .chain(std::iter::once(projection.point))
            .collect()
    } else {
        // walking against the vertex order
        std::iter::once(projection.point)
            .chain(coords[projection.segment + 1..=start_idx].iter().copied())
            .rev()
            .collect()
    };
    // the projection can sit exactly on a vertex
    let passed: Vec<Coord<f64>> = passed.into_iter().dedup().collect();
    if passed.len() < 2 {
        return Err(GeometryError::EmptyResult.into());
    }
    Ok(passed)
}

pub fn try_compute_passed_segment(
    line: &Geometry,
    user_lng_lat: Coord<f64>,
    start_lng_lat: Coord<f64>,
) -> Result<FeatureCollection> {
    let coords = line_from_geometry(line)?;
    let passed = passed_coords(&coords, &user_lng_lat, &start_lng_lat)?;
    Ok(collection(vec![plain_feature(line_geometry(&passed))]))
}

pub fn compute_passed_segment(
    line: &Geometry,
    user_lng_lat: Coord<f64>,
    start_lng_lat: Coord<f64>,
) -> Option<FeatureCollection> {
    match try_compute_passed_segment(line, user_lng_lat, start_lng_lat) {
        Ok(segment) => Some(segment),
        Err(e) => {
            debug!("no passed segment: {e}");
            None
        }
    }
}
