pub mod test_utils;

use gofez_core::gps_trace::{GpsTrace, ProcessResult, TraceRecorder};
use test_utils::*;

#[test]
fn first_data() {
    let mut recorder = TraceRecorder::new(30., 30_000);
    assert!(recorder.last_data().is_none());
    let data = north_of_gate(0., 1697349116449).with_accuracy(3.9);
    assert_eq!(recorder.preprocess(&data), ProcessResult::NewSegment);
}

#[test]
fn ignore_inaccurate() {
    let mut recorder = TraceRecorder::new(30., 30_000);
    let data = north_of_gate(0., 1697349116449).with_accuracy(300.);
    assert_eq!(recorder.preprocess(&data), ProcessResult::Ignore);
    assert!(recorder.last_data().is_none());
}

#[test]
fn time_difference() {
    let mut recorder = TraceRecorder::new(30., 30_000);
    recorder.preprocess(&north_of_gate(0., 1697349116449));

    let result = recorder.preprocess(&north_of_gate(5., 1697349117449));
    assert_eq!(ProcessResult::Append, result);
    assert_eq!(recorder.last_data().unwrap().timestamp_ms, 1697349117449);

    let result = recorder.preprocess(&north_of_gate(10., 1697349217449));
    assert_eq!(ProcessResult::NewSegment, result);

    // older than what we already have
    let result = recorder.preprocess(&north_of_gate(15., 1697349116449));
    assert_eq!(ProcessResult::Ignore, result);
    assert_eq!(recorder.last_data().unwrap().timestamp_ms, 1697349217449);
}

#[test]
fn trace_segments_and_length() {
    let mut recorder = TraceRecorder::new(30., 30_000);
    let mut trace = GpsTrace::new();
    let fixes = [
        north_of_gate(0., 0),
        north_of_gate(10., 5_000),
        north_of_gate(20., 10_000),
        // quiet for a minute
        north_of_gate(100., 70_000),
        north_of_gate(110., 75_000),
        north_of_gate(500., 76_000).with_accuracy(80.),
    ];
    for fix in &fixes {
        let result = recorder.preprocess(fix);
        trace.push(fix, result);
    }
    assert_eq!(trace.segments.len(), 2);
    assert_eq!(trace.num_points(), 5);
    // 20m + 10m, the gap is not counted
    let length = trace.length_meters();
    assert!((length - 30.).abs() < 0.01, "{length}");

    let geojson = trace.to_geojson();
    assert_eq!(geojson.features.len(), 2);
}
