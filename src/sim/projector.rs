//! Cascading offset projection
//!
//! Converts the current phase into a target position for every stack item.
//! Each layer slides relative to the layer below it, so lean compounds with
//! height: a tall stack leans visibly farther than a short one in the same
//! phase. Item 0 never moves off the baseline.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::curve::Curve;
use super::phase::Phase;
use crate::settings::Settings;

/// Height-response curve applied to an item's normalized height
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum CurveMode {
    /// Uniform growth with height
    #[default]
    Linear,
    /// Squared: upper layers slide much more
    Exponential,
    /// Quarter sine: fast growth that flattens near the top
    Sine,
    /// User-supplied curve
    Custom(Curve),
}

impl CurveMode {
    pub fn height_factor(&self, normalized_height: f32) -> f32 {
        match self {
            CurveMode::Linear => normalized_height,
            CurveMode::Exponential => normalized_height.powi(2),
            CurveMode::Sine => (normalized_height * std::f32::consts::FRAC_PI_2).sin(),
            CurveMode::Custom(curve) => curve.evaluate(normalized_height),
        }
    }
}

/// Stateless projector from (index, count, phase) to target position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetProjector {
    /// Base horizontal slide per tilt level
    pub base_offset_per_tilt: f32,
    /// Global height response scale
    pub height_multiplier: f32,
    pub curve_mode: CurveMode,
    /// X position of the bottom item
    pub baseline_x: f32,
    /// Vertical spacing between items
    pub spacing: f32,
}

impl Default for OffsetProjector {
    fn default() -> Self {
        Self {
            base_offset_per_tilt: 0.1,
            height_multiplier: 1.0,
            curve_mode: CurveMode::Linear,
            baseline_x: 0.0,
            spacing: crate::consts::DEFAULT_OBJECT_SPACING,
        }
    }
}

impl OffsetProjector {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base_offset_per_tilt: settings.base_offset_per_tilt,
            height_multiplier: settings.height_multiplier,
            curve_mode: settings.curve_mode.clone(),
            baseline_x: settings.baseline_x,
            spacing: settings.object_spacing,
        }
    }

    /// Horizontal slide of layer `index` relative to the layer below it
    pub fn layer_slide(&self, index: usize, count: usize, phase: Phase) -> f32 {
        let tilt_level = phase.tilt_level();
        let direction = phase.direction();
        if index == 0 || count < 2 || tilt_level == 0 {
            return 0.0;
        }

        let normalized_height = index as f32 / (count - 1) as f32;
        let base_slide = self.base_offset_per_tilt * tilt_level as f32;
        let height_factor = self.curve_mode.height_factor(normalized_height);

        base_slide * height_factor * self.height_multiplier * direction as f32
    }

    /// Cumulative horizontal offsets (relative to the baseline) for a stack of `count`
    pub fn offsets(&self, count: usize, phase: Phase) -> Vec<f32> {
        let mut offsets = Vec::with_capacity(count);
        let mut cumulative = 0.0;
        for i in 0..count {
            cumulative += self.layer_slide(i, count, phase);
            offsets.push(cumulative);
        }
        offsets
    }

    /// Target position of every item, bottom to top
    pub fn target_positions(&self, count: usize, phase: Phase) -> Vec<Vec2> {
        self.offsets(count, phase)
            .into_iter()
            .enumerate()
            .map(|(i, offset)| Vec2::new(self.baseline_x + offset, i as f32 * self.spacing))
            .collect()
    }

    /// Target position of a single item
    pub fn target_position(&self, index: usize, count: usize, phase: Phase) -> Vec2 {
        let offset: f32 = (1..=index).map(|i| self.layer_slide(i, count, phase)).sum();
        Vec2::new(self.baseline_x + offset, index as f32 * self.spacing)
    }
}

/// Critically damped step of `current` toward `target`.
///
/// `velocity` carries the smoothing state between calls. Never overshoots the target.
pub fn smooth_damp(current: Vec2, target: Vec2, velocity: &mut Vec2, smooth_time: f32, dt: f32) -> Vec2 {
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + change * omega) * dt;
    *velocity = (*velocity - temp * omega) * decay;
    let mut output = target + (change + temp) * decay;

    // Clamp overshoot
    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = Vec2::ZERO;
    }
    output
}
