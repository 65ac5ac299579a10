#![allow(dead_code)]

use gofez_core::circuit_progress::Poi;
use gofez_core::geo_utils::GeoPoint;

// Bab Bou Jeloud, the usual starting point of medina circuits.
pub const BAB_BOU_JELOUD: (f64, f64) = (34.061_72, -4.983_61);
// Roughly 1 meter of latitude.
pub const ONE_METER_LAT: f64 = 1. / 111_195.;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn point(latitude: f64, longitude: f64, timestamp_ms: i64) -> GeoPoint {
    GeoPoint::new(latitude, longitude, timestamp_ms)
}

/// `meters` north of Bab Bou Jeloud.
pub fn north_of_gate(meters: f64, timestamp_ms: i64) -> GeoPoint {
    point(
        BAB_BOU_JELOUD.0 + meters * ONE_METER_LAT,
        BAB_BOU_JELOUD.1,
        timestamp_ms,
    )
}

pub fn medina_pois() -> Vec<Poi> {
    vec![
        Poi::new("bab-bou-jeloud", BAB_BOU_JELOUD.0, BAB_BOU_JELOUD.1),
        Poi::new("medersa-bou-inania", BAB_BOU_JELOUD.0 + 300. * ONE_METER_LAT, BAB_BOU_JELOUD.1),
        Poi::new("al-qarawiyyin", BAB_BOU_JELOUD.0 + 600. * ONE_METER_LAT, BAB_BOU_JELOUD.1),
    ]
}

pub fn load_osrm_response() -> String {
    std::fs::read_to_string("./tests/data/osrm_route.json").unwrap()
}
