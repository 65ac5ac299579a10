pub mod test_utils;

use geojson::Value;
use gofez_core::osrm::{OsrmGeometry, OsrmResponse, Traject};
use test_utils::*;

#[test]
fn parse_route() {
    let traject = Traject::from_osrm_json(&load_osrm_response()).unwrap();
    assert_eq!(traject.distance_meters(), 668.4);
    assert_eq!(traject.duration_secs(), 481.2);
    assert_eq!(traject.waypoints.len(), 2);
    assert_eq!(traject.waypoints[0].name, "Bab Bou Jeloud");

    let steps: Vec<_> = traject.steps().collect();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].maneuver.kind, "depart");
    assert_eq!(steps[1].maneuver.modifier.as_deref(), Some("straight"));
    assert_eq!(steps[1].geometry.coordinates.len(), 2);
}

#[test]
fn malformed_coordinates_are_filtered() {
    let traject = Traject::from_osrm_json(&load_osrm_response()).unwrap();
    assert_eq!(
        traject.coordinates(),
        &[
            [-4.98361, 34.06172],
            [-4.98361, 34.06442],
            [-4.98361, 34.06712]
        ]
    );
    let start = traject.start().unwrap();
    assert_eq!((start.x, start.y), (-4.98361, 34.06172));
    let end = traject.end().unwrap();
    assert_eq!((end.x, end.y), (-4.98361, 34.06712));

    match traject.line_geometry().value {
        Value::LineString(positions) => assert_eq!(positions.len(), 3),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn geometry_in_another_encoding_is_empty() {
    let geometry: OsrmGeometry = serde_json::from_str("\"_p~iF~ps|U_ulLnnqC\"").unwrap();
    assert!(geometry.coordinates.is_empty());
    let geometry: OsrmGeometry =
        serde_json::from_str(r#"{"type": "LineString", "coordinates": [[1, 2], [null, 3], [4, 5, 6]]}"#)
            .unwrap();
    assert_eq!(geometry.coordinates, vec![[1., 2.], [4., 5.]]);
}

#[test]
fn error_response() {
    let json = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
    let err = Traject::from_osrm_json(json).unwrap_err();
    assert!(err.to_string().contains("NoRoute"));

    let response: OsrmResponse = serde_json::from_str(r#"{"code": "Ok", "routes": []}"#).unwrap();
    assert!(Traject::from_response(response).is_err());
}
