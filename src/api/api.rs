/* Process-wide entry points for the app shell. The shell owns the GPS
callbacks and the frame loop; everything here just forwards to the single
`NavigationSession`.
*/
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use anyhow::Result;
use geojson::FeatureCollection;

use crate::circuit_progress::Poi;
use crate::config::TrackingConfig;
use crate::geo_utils::GeoPoint;
use crate::logs;
use crate::navigation::{NavigationFrame, NavigationSession};
use crate::osrm::Traject;

struct MainState {
    session: Mutex<NavigationSession>,
}

static MAIN_STATE: OnceLock<MainState> = OnceLock::new();

/// `config_path` is optional, a missing or broken config falls back to the
/// defaults.
pub fn init(base_dir: String, config_path: Option<String>, user_id: String) {
    let mut already_initialized = true;
    MAIN_STATE.get_or_init(|| {
        already_initialized = false;

        if let Err(e) = logs::init(&base_dir) {
            eprintln!("failed to initialize logging: {e:?}");
        }

        let config = match config_path {
            None => TrackingConfig::default(),
            Some(path) => TrackingConfig::load(&path).unwrap_or_else(|e| {
                warn!("using default tracking config: {e:?}");
                TrackingConfig::default()
            }),
        };
        info!("initialized");

        MainState {
            session: Mutex::new(NavigationSession::new(user_id, config)),
        }
    });
    if already_initialized {
        warn!("`init` is called multiple times");
    }
}

fn get() -> &'static MainState {
    MAIN_STATE.get().expect("main state is not initialized")
}

/// Handles a batch of fixes and returns the frame for the latest one.
pub fn on_location_update(mut raw_data_list: Vec<GeoPoint>) -> Option<NavigationFrame> {
    let state = get();
    let mut session = state.session.lock().unwrap();

    // NOTE: some platforms deliver a batch out of order
    raw_data_list.sort_by(|a, b| a.timestamp_ms.cmp(&b.timestamp_ms));
    raw_data_list
        .iter()
        .map(|point| session.on_location(point))
        .last()
}

pub fn set_route_from_osrm_json(json: &str) -> Result<()> {
    let traject = Traject::from_osrm_json(json)?;
    info!(
        "new route: {:.0}m, {:.0}s, {} points",
        traject.distance_meters(),
        traject.duration_secs(),
        traject.coordinates().len()
    );
    get().session.lock().unwrap().set_traject(traject);
    Ok(())
}

pub fn clear_route() {
    get().session.lock().unwrap().clear_route();
}

/// `pois_json` is the ordered POI list of the circuit.
pub fn start_circuit(circuit_id: String, pois_json: &str) -> Result<()> {
    let pois: Vec<Poi> = serde_json::from_str(pois_json)?;
    get().session.lock().unwrap().start_circuit(circuit_id, pois);
    Ok(())
}

/// Returns the circuit's check-in ratio when it is ended.
pub fn end_circuit() -> Option<f64> {
    get()
        .session
        .lock()
        .unwrap()
        .end_circuit()
        .map(|circuit| circuit.completion_ratio())
}

pub fn circuit_completion() -> Option<f64> {
    get()
        .session
        .lock()
        .unwrap()
        .circuit()
        .map(|circuit| circuit.completion_ratio())
}

pub fn route_connectors() -> Option<FeatureCollection> {
    get().session.lock().unwrap().connectors()
}

/// The shell keeps calling `route_animation_frame` until it returns false.
/// `set_state` runs after the session lock is released, so it may call back
/// into this module.
pub fn start_route_animation<F>(mut set_state: F) -> bool
where
    F: FnMut(Option<Vec<geo_types::Coord<f64>>>),
{
    let mut published = None;
    let started = get()
        .session
        .lock()
        .unwrap()
        .start_route_animation(Instant::now(), |state| published = Some(state))
        .is_some();
    if let Some(state) = published {
        set_state(state);
    }
    started
}

pub fn route_animation_frame<F>(mut set_state: F) -> bool
where
    F: FnMut(Option<Vec<geo_types::Coord<f64>>>),
{
    let mut published = None;
    let more = get()
        .session
        .lock()
        .unwrap()
        .animator_mut()
        .on_frame(Instant::now(), |state| published = Some(state));
    if let Some(state) = published {
        set_state(state);
    }
    more
}
