pub mod test_utils;

use gofez_core::circuit_progress::CircuitProgress;
use gofez_core::config::TrackingConfig;
use gofez_core::gps_trace::ProcessResult;
use test_utils::*;

#[test]
fn walk_the_whole_circuit() {
    init_logger();
    let mut progress = CircuitProgress::new("medina", medina_pois(), &TrackingConfig::default());
    assert_eq!(progress.completion_ratio(), 0.);
    assert_eq!(progress.next_poi().unwrap().id, "bab-bou-jeloud");

    let update = progress.record(&north_of_gate(5., 0));
    assert_eq!(update.process_result, ProcessResult::NewSegment);
    assert_eq!(update.new_check_ins, vec!["bab-bou-jeloud".to_string()]);

    // walking north at ~1.2 m/s, a fix every 10 seconds
    let mut checked_in = Vec::new();
    for i in 1..=60 {
        let update = progress.record(&north_of_gate(5. + 12. * i as f64, 10_000 * i));
        assert_eq!(update.process_result, ProcessResult::Append);
        checked_in.extend(update.new_check_ins);
    }
    assert_eq!(checked_in, vec!["medersa-bou-inania", "al-qarawiyyin"]);
    assert!(progress.is_complete());
    assert_eq!(progress.completion_ratio(), 1.);
    assert!(progress.next_poi().is_none());

    let check_ins = progress.check_ins();
    assert_eq!(check_ins.len(), 3);
    assert!(check_ins.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
    assert_eq!(progress.trace().num_points(), 61);
    assert!((progress.trace_length_meters() - 720.).abs() < 0.1);
}

#[test]
fn check_in_only_once() {
    let mut progress = CircuitProgress::new("medina", medina_pois(), &TrackingConfig::default());
    assert_eq!(progress.record(&north_of_gate(0., 0)).new_check_ins.len(), 1);
    assert!(progress.record(&north_of_gate(1., 1000)).new_check_ins.is_empty());
    assert!(progress.is_checked_in("bab-bou-jeloud"));
    assert!((progress.completion_ratio() - 1. / 3.).abs() < 1e-12);
    let remaining: Vec<_> = progress.remaining_pois().map(|p| p.id.as_str()).collect();
    assert_eq!(remaining, vec!["medersa-bou-inania", "al-qarawiyyin"]);
}

#[test]
fn inaccurate_fix_does_not_check_in() {
    let mut progress = CircuitProgress::new("medina", medina_pois(), &TrackingConfig::default());
    let update = progress.record(&north_of_gate(300., 0).with_accuracy(120.));
    assert_eq!(update.process_result, ProcessResult::Ignore);
    assert!(update.new_check_ins.is_empty());
    assert!(progress.trace().is_empty());
}

#[test]
fn empty_circuit_is_complete() {
    let progress = CircuitProgress::new("empty", Vec::new(), &TrackingConfig::default());
    assert!(progress.is_complete());
    assert_eq!(progress.completion_ratio(), 1.);
}
