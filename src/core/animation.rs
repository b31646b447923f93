//! Scroll progress to model-root pose mapping.
//!
//! Every channel is a pure function of scroll progress and fixed constants, so
//! re-running a frame with the same progress lands on the same pose.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::transform::Transform;
use crate::frame::FrameInfo;

/// Upper bound for scale amplitude; keeps `1 - amplitude` strictly positive
pub const MAX_SCALE_AMPLITUDE: f32 = 0.95;

/// Sub-range of the scroll domain a channel animates over
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub start: f32,
    pub end: f32,
}

impl Phase {
    pub const FULL: Phase = Phase { start: 0.0, end: 1.0 };

    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Progress local to this phase, clamped to [0, 1].
    /// A degenerate phase acts as a step at `start`.
    pub fn local(&self, progress: f32) -> f32 {
        let span = self.end - self.start;
        if span <= f32::EPSILON {
            return if progress >= self.start { 1.0 } else { 0.0 };
        }
        ((progress - self.start) / span).clamp(0.0, 1.0)
    }

    /// Rises 0 → 1 → 0 across the phase
    pub fn curve(&self, progress: f32) -> f32 {
        (self.local(progress) * PI).sin()
    }

    pub fn contains(&self, progress: f32) -> bool {
        progress >= self.start && progress <= self.end
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::FULL
    }
}

/// Which slice of the scroll range drives each channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phases {
    pub spin: Phase,
    pub hop: Phase,
    pub zoom: Phase,
    pub sway: Phase,
}

impl Phases {
    /// Every channel spans the whole page
    pub const fn full_range() -> Self {
        Self {
            spin: Phase::FULL,
            hop: Phase::FULL,
            zoom: Phase::FULL,
            sway: Phase::FULL,
        }
    }

    /// Spin through the first third, hop through the second, zoom through the last.
    /// Sway follows the whole page.
    pub const fn staged() -> Self {
        Self {
            spin: Phase::new(0.0, 1.0 / 3.0),
            hop: Phase::new(1.0 / 3.0, 2.0 / 3.0),
            zoom: Phase::new(2.0 / 3.0, 1.0),
            sway: Phase::FULL,
        }
    }
}

impl Default for Phases {
    fn default() -> Self {
        Self::full_range()
    }
}

/// `amplitude * sin(local * frequency * PI)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub amplitude: f32,
    pub frequency: f32,
}

impl Wave {
    pub const fn new(amplitude: f32, frequency: f32) -> Self {
        Self { amplitude, frequency }
    }

    pub fn sample(&self, local: f32) -> f32 {
        self.amplitude * (local * self.frequency * PI).sin()
    }
}

/// Tunable coefficients of the scroll mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionCurve {
    /// Full turns about Y across the spin phase
    pub turns: f32,
    /// Vertical offset
    pub hop: Wave,
    /// Resting uniform scale
    pub scale_base: f32,
    /// Relative breathing around `scale_base`; clamped to [0, MAX_SCALE_AMPLITUDE]
    pub scale: Wave,
    /// Roll about Z
    pub sway: Wave,
    /// Pitch as a fraction of the current yaw
    pub tilt: f32,
    pub phases: Phases,
}

impl Default for MotionCurve {
    fn default() -> Self {
        Self {
            turns: 4.0,
            hop: Wave::new(0.5, 6.0),
            scale_base: 0.8,
            scale: Wave::new(0.375, 2.0),
            sway: Wave::new(0.15, 3.0),
            tilt: 0.0,
            phases: Phases::full_range(),
        }
    }
}

impl MotionCurve {
    /// One full turn by the bottom of the page, nothing else
    pub fn single_turn() -> Self {
        Self {
            turns: 1.0,
            hop: Wave::new(0.0, 1.0),
            scale_base: 1.0,
            scale: Wave::new(0.0, 1.0),
            sway: Wave::new(0.0, 1.0),
            tilt: 0.0,
            phases: Phases::full_range(),
        }
    }

    fn scale_amplitude(&self) -> f32 {
        self.scale.amplitude.abs().min(MAX_SCALE_AMPLITUDE)
    }

    /// Smallest and largest uniform scale the curve can produce
    pub fn scale_bounds(&self) -> (f32, f32) {
        let base = self.scale_base.abs().max(f32::EPSILON);
        let a = self.scale_amplitude();
        (base * (1.0 - a), base * (1.0 + a))
    }

    pub fn yaw(&self, progress: f32) -> f32 {
        self.phases.spin.local(progress) * self.turns * TAU
    }

    pub fn bob(&self, progress: f32) -> f32 {
        self.hop.sample(self.phases.hop.local(progress))
    }

    pub fn uniform_scale(&self, progress: f32) -> f32 {
        let base = self.scale_base.abs().max(f32::EPSILON);
        let local = self.phases.zoom.local(progress);
        let wave = Wave::new(self.scale_amplitude(), self.scale.frequency).sample(local);
        base * (1.0 + wave.clamp(-MAX_SCALE_AMPLITUDE, MAX_SCALE_AMPLITUDE))
    }

    pub fn roll(&self, progress: f32) -> f32 {
        self.sway.sample(self.phases.sway.local(progress))
    }

    /// Pose of the model root for a given progress
    pub fn pose(&self, progress: f32) -> Transform {
        let p = sanitize(progress);
        let yaw = self.yaw(p);
        Transform {
            position: Vec3::new(0.0, self.bob(p), 0.0),
            rotation: Vec3::new(yaw * self.tilt, yaw, self.roll(p)),
            scale: Vec3::splat(self.uniform_scale(p)),
        }
    }
}

fn sanitize(progress: f32) -> f32 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

/// Per-frame writer of the model root transform
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationStep {
    curve: MotionCurve,
}

impl AnimationStep {
    pub fn new(curve: MotionCurve) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> &MotionCurve {
        &self.curve
    }

    /// Overwrite the root with the pose for `progress`.
    /// Returns false when there is no root yet.
    pub fn apply(&self, progress: f32, _frame: &FrameInfo, root: Option<&mut Transform>) -> bool {
        match root {
            Some(root) => {
                *root = self.curve.pose(progress);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> FrameInfo {
        FrameInfo::new(0, 0.0, 0.016)
    }

    #[test]
    fn phase_local_clamps() {
        let phase = Phase::new(0.25, 0.75);
        assert_eq!(phase.local(0.0), 0.0);
        assert_eq!(phase.local(0.5), 0.5);
        assert_eq!(phase.local(1.0), 1.0);
    }

    #[test]
    fn degenerate_phase_is_a_step() {
        let phase = Phase::new(0.5, 0.5);
        assert_eq!(phase.local(0.49), 0.0);
        assert_eq!(phase.local(0.5), 1.0);
    }

    #[test]
    fn phase_curve_peaks_mid_phase() {
        let phase = Phase::FULL;
        assert!(phase.curve(0.0).abs() < 1e-6);
        assert!((phase.curve(0.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn apply_without_root_is_noop() {
        let step = AnimationStep::default();
        assert!(!step.apply(0.5, &frame(), None));
    }

    #[test]
    fn apply_overwrites_rather_than_accumulates() {
        let step = AnimationStep::default();
        let mut root = Transform::IDENTITY;
        step.apply(0.3, &frame(), Some(&mut root));
        let first = root;
        step.apply(0.3, &frame(), Some(&mut root));
        assert_eq!(first, root);
    }

    #[test]
    fn nan_progress_is_treated_as_top() {
        let curve = MotionCurve::default();
        assert_eq!(curve.pose(f32::NAN), curve.pose(0.0));
    }

    #[test]
    fn oversized_amplitude_is_clamped() {
        let curve = MotionCurve {
            scale: Wave::new(4.0, 1.0),
            ..MotionCurve::default()
        };
        let (lo, hi) = curve.scale_bounds();
        assert!(lo > 0.0);
        assert!(hi <= curve.scale_base * (1.0 + MAX_SCALE_AMPLITUDE) + 1e-6);
        assert!(curve.uniform_scale(0.75) > 0.0);
    }

    #[test]
    fn staged_phases_hold_spin_after_first_third() {
        let curve = MotionCurve {
            turns: 1.0,
            phases: Phases::staged(),
            ..MotionCurve::default()
        };
        assert!((curve.yaw(0.5) - TAU).abs() < 1e-5);
        assert!((curve.yaw(0.9) - TAU).abs() < 1e-5);
    }

    #[test]
    fn tilt_follows_yaw() {
        let curve = MotionCurve {
            tilt: 0.25,
            ..MotionCurve::single_turn()
        };
        let pose = curve.pose(0.5);
        assert!((pose.rotation.x - pose.rotation.y * 0.25).abs() < 1e-6);
    }
}
