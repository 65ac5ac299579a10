/* Read-only views of an OSRM `route` service response. The crate never talks
to OSRM itself; the shell fetches the JSON and hands it over. Only the parts
the map layer uses are modelled, everything else in the response is ignored.
*/
use anyhow::Result;
use geo_types::Coord;
use geojson::{Geometry, Value};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OsrmResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
    #[serde(default)]
    pub waypoints: Vec<OsrmWaypoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OsrmRoute {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub geometry: OsrmGeometry,
    #[serde(default)]
    pub legs: Vec<OsrmLeg>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OsrmLeg {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub summary: String,
    // only present when the request asked for `steps=true`
    #[serde(default)]
    pub steps: Vec<OsrmStep>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OsrmStep {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub geometry: OsrmGeometry,
    pub maneuver: OsrmManeuver,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OsrmManeuver {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub modifier: Option<String>,
    pub location: [f64; 2],
}

/// GeoJSON-style geometry (`geometries=geojson`). Entries of `coordinates`
/// that are not a pair of finite numbers are dropped while deserializing,
/// and a geometry in any other encoding comes out empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct OsrmGeometry {
    pub coordinates: Vec<[f64; 2]>,
}

impl From<serde_json::Value> for OsrmGeometry {
    fn from(value: serde_json::Value) -> Self {
        let coordinates = value
            .get("coordinates")
            .and_then(|c| c.as_array())
            .map(|entries| entries.iter().filter_map(lon_lat_pair).collect())
            .unwrap_or_default();
        OsrmGeometry { coordinates }
    }
}

fn lon_lat_pair(entry: &serde_json::Value) -> Option<[f64; 2]> {
    let pair = entry.as_array()?;
    if pair.len() < 2 {
        return None;
    }
    let lon = pair[0].as_f64()?;
    let lat = pair[1].as_f64()?;
    if lon.is_finite() && lat.is_finite() {
        Some([lon, lat])
    } else {
        None
    }
}

impl OsrmGeometry {
    pub fn coords(&self) -> Vec<Coord<f64>> {
        self.coordinates
            .iter()
            .map(|[x, y]| Coord { x: *x, y: *y })
            .collect()
    }

    pub fn to_geojson(&self) -> Geometry {
        Geometry::new(Value::LineString(
            self.coordinates.iter().map(|p| p.to_vec()).collect(),
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OsrmWaypoint {
    #[serde(default)]
    pub name: String,
    pub location: [f64; 2],
    #[serde(default)]
    pub distance: f64,
}

/// A route the user has been given, as picked from an OSRM response.
#[derive(Clone, Debug, PartialEq)]
pub struct Traject {
    pub route: OsrmRoute,
    pub waypoints: Vec<OsrmWaypoint>,
}

impl Traject {
    /// Uses the first (best) route of the response.
    pub fn from_response(response: OsrmResponse) -> Result<Self> {
        if response.code != "Ok" {
            bail!(
                "OSRM returned `{}`: {}",
                response.code,
                response.message.unwrap_or_default()
            );
        }
        let route = match response.routes.into_iter().next() {
            Some(route) => route,
            None => bail!("OSRM response has no route"),
        };
        Ok(Traject {
            route,
            waypoints: response.waypoints,
        })
    }

    pub fn from_osrm_json(json: &str) -> Result<Self> {
        let response: OsrmResponse = serde_json::from_str(json)?;
        Self::from_response(response)
    }

    pub fn distance_meters(&self) -> f64 {
        self.route.distance
    }

    pub fn duration_secs(&self) -> f64 {
        self.route.duration
    }

    pub fn coordinates(&self) -> &[[f64; 2]] {
        &self.route.geometry.coordinates
    }

    pub fn line_geometry(&self) -> Geometry {
        self.route.geometry.to_geojson()
    }

    pub fn steps(&self) -> impl Iterator<Item = &OsrmStep> {
        self.route.legs.iter().flat_map(|leg| leg.steps.iter())
    }

    pub fn start(&self) -> Option<Coord<f64>> {
        self.coordinates().first().map(|[x, y]| Coord { x: *x, y: *y })
    }

    pub fn end(&self) -> Option<Coord<f64>> {
        self.coordinates().last().map(|[x, y]| Coord { x: *x, y: *y })
    }
}
