use criterion::{criterion_group, criterion_main, Criterion};
use geo_types::Coord;
use geojson::{Geometry, Value};

use gofez_core::{circuit_progress::Poi, route_geometry};

// A wiggly 500 vertex route, about the size of a long walking circuit.
fn sample_route() -> Geometry {
    let positions = (0..500)
        .map(|i| {
            let t = i as f64 / 500.;
            vec![-4.99 + 0.02 * t + 0.0005 * (t * 80.).sin(), 34.05 + 0.02 * t]
        })
        .collect();
    Geometry::new(Value::LineString(positions))
}

fn build_connectors(c: &mut Criterion) {
    let route = sample_route();
    let pois: Vec<Poi> = (0..50)
        .map(|i| Poi::new(format!("poi-{i}"), 34.05 + 0.0004 * i as f64, -4.985))
        .collect();
    c.bench_function("build_connectors", |b| {
        b.iter(|| std::hint::black_box(route_geometry::build_connectors(&route, &pois)))
    });
}

fn compute_passed_segment(c: &mut Criterion) {
    let route = sample_route();
    let start = Coord { x: -4.99, y: 34.05 };
    let user = Coord { x: -4.98, y: 34.06 };
    c.bench_function("compute_passed_segment", |b| {
        b.iter(|| {
            std::hint::black_box(route_geometry::compute_passed_segment(&route, user, start))
        })
    });
}

criterion_group!(benches, build_connectors, compute_passed_segment);
criterion_main!(benches);
