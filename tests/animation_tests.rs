use std::f32::consts::PI;

use scroll_showcase::core::{AnimationStep, MotionCurve, Phases, Transform, Wave};
use scroll_showcase::frame::FrameInfo;

fn samples() -> impl Iterator<Item = f32> {
    (0..=200).map(|i| i as f32 / 200.0)
}

#[test]
fn mapping_is_pure() {
    let curve = MotionCurve::default();
    for p in samples() {
        assert_eq!(curve.pose(p), curve.pose(p));
    }
}

#[test]
fn step_ignores_frame_timing() {
    let step = AnimationStep::new(MotionCurve::default());
    let mut a = Transform::IDENTITY;
    let mut b = Transform::IDENTITY;
    step.apply(0.42, &FrameInfo::new(1, 0.016, 0.016), Some(&mut a));
    step.apply(0.42, &FrameInfo::new(900, 15.0, 0.1), Some(&mut b));
    assert_eq!(a, b);
}

#[test]
fn step_without_root_is_a_noop() {
    let step = AnimationStep::default();
    assert!(!step.apply(0.5, &FrameInfo::default(), None));
}

#[test]
fn scale_stays_positive_and_bounded() {
    let curves = [
        MotionCurve::default(),
        MotionCurve {
            scale: Wave::new(5.0, 7.0),
            ..MotionCurve::default()
        },
        MotionCurve {
            scale_base: -2.0,
            scale: Wave::new(-3.0, 1.5),
            phases: Phases::staged(),
            ..MotionCurve::default()
        },
    ];
    for curve in curves {
        let (lo, hi) = curve.scale_bounds();
        assert!(lo > 0.0);
        for p in samples() {
            let s = curve.pose(p).scale;
            assert!(s.x > 0.0, "scale {} at p={}", s.x, p);
            assert!(s.x >= lo - 1e-5 && s.x <= hi + 1e-5);
            assert_eq!(s.x, s.y);
            assert_eq!(s.y, s.z);
        }
    }
}

#[test]
fn top_of_page_is_rest_pose() {
    let curve = MotionCurve::default();
    let pose = curve.pose(0.0);
    assert_eq!(pose.rotation.y, 0.0);
    assert_eq!(pose.position.y, 0.0);
    assert_eq!(pose.scale.x, curve.scale_base);
}

#[test]
fn single_turn_is_half_way_at_midpoint() {
    let curve = MotionCurve::single_turn();
    assert!((curve.pose(0.5).rotation.y - PI).abs() < 1e-5);
    assert!((curve.pose(1.0).rotation.y - 2.0 * PI).abs() < 1e-5);
}

#[test]
fn out_of_range_progress_is_clamped() {
    let curve = MotionCurve::default();
    assert_eq!(curve.pose(-3.0), curve.pose(0.0));
    assert_eq!(curve.pose(7.0), curve.pose(1.0));
    assert_eq!(curve.pose(f32::NAN), curve.pose(0.0));
}

#[test]
fn staged_phases_run_one_after_another() {
    let curve = MotionCurve {
        phases: Phases::staged(),
        ..MotionCurve::default()
    };
    // Spin is finished and hop has not started at the first boundary
    let boundary = curve.pose(1.0 / 3.0);
    assert!((boundary.rotation.y - curve.turns * 2.0 * PI).abs() < 1e-3);
    assert!(boundary.position.y.abs() < 1e-5);
    // Zoom is still at rest before the last third
    assert_eq!(curve.pose(0.5).scale.x, curve.scale_base);
}

#[test]
fn tilt_follows_yaw() {
    let curve = MotionCurve {
        tilt: 0.25,
        ..MotionCurve::single_turn()
    };
    let pose = curve.pose(0.5);
    assert!((pose.rotation.x - 0.25 * pose.rotation.y).abs() < 1e-6);
}
