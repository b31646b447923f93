use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Mat4;
use scroll_showcase::core::{scroll_progress, MotionCurve, Phases, ScrollSettings, ScrollTracker};
use scroll_showcase::scenes::fallback_character;

fn bench_progress(c: &mut Criterion) {
    c.bench_function("scroll_progress", |b| {
        b.iter(|| scroll_progress(black_box(640.0), black_box(1200.0)))
    });

    c.bench_function("tracker_coalesce_32_events", |b| {
        let mut tracker = ScrollTracker::new(ScrollSettings::default(), 720.0);
        b.iter(|| {
            for _ in 0..32 {
                tracker.scroll_by(black_box(3.0));
            }
            tracker.scroll_to(0.0);
            black_box(tracker.sample())
        })
    });
}

fn bench_pose(c: &mut Criterion) {
    let mut group = c.benchmark_group("pose");
    for (name, curve) in [
        ("full_range", MotionCurve::default()),
        (
            "staged",
            MotionCurve {
                phases: Phases::staged(),
                ..MotionCurve::default()
            },
        ),
    ] {
        group.bench_with_input(BenchmarkId::new("curve", name), &curve, |b, curve| {
            b.iter(|| curve.pose(black_box(0.37)).matrix())
        });
    }
    group.finish();
}

/// Per-frame cost of composing the animated root with every mesh's local matrix
fn bench_compose(c: &mut Criterion) {
    let asset = fallback_character();
    let mut locals = Vec::new();
    asset.root.visit(Mat4::IDENTITY, &mut |node, world| {
        if node.kind.mesh_part().is_some() {
            locals.push(world);
        }
    });
    let curve = MotionCurve::default();

    c.bench_function("compose_fallback_draws", |b| {
        b.iter(|| {
            let root = curve.pose(black_box(0.5)).matrix();
            locals.iter().map(|local| root * *local).fold(Mat4::ZERO, |acc, m| acc + m)
        })
    });
}

criterion_group!(benches, bench_progress, bench_pose, bench_compose);
criterion_main!(benches);
