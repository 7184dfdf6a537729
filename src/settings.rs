//! Simulation settings
//!
//! Every tunable of the sway system. Loaded from JSON; missing fields take
//! their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::sim::curve::Curve;
use crate::sim::projector::CurveMode;

/// Sway system settings (durations in seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Phase timing ===
    /// Length of the rotation animation per phase change
    pub transition_duration: f32,
    /// Random wait in Center before drifting into a tilt
    pub center_min_interval: f32,
    pub center_max_interval: f32,
    /// Time in a tilt before it worsens one level
    pub tilt_countdown: f32,
    /// Time between drop bursts while toppled
    pub topple_drop_interval: f32,
    /// Easing of the rotation animation
    pub rotation_curve: Curve,

    // === Input ===
    /// Time a binding must stay down to fire its repeat
    pub hold_duration: f32,
    pub hold_repeat: bool,

    // === Stack layout ===
    pub initial_stack_count: usize,
    /// Vertical spacing between stacked items
    pub object_spacing: f32,
    /// X position of the bottom item
    pub baseline_x: f32,
    pub base_offset_per_tilt: f32,
    pub height_multiplier: f32,
    pub curve_mode: CurveMode,
    pub smooth_movement: bool,
    pub smooth_time: f32,

    // === Falling items ===
    pub drop_force: f32,
    pub drop_torque: f32,
    pub dropped_lifetime: f32,
    pub gravity: f32,
    pub damping: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            transition_duration: 1.0,
            center_min_interval: 4.0,
            center_max_interval: 8.0,
            tilt_countdown: 5.0,
            topple_drop_interval: 3.0,
            rotation_curve: Curve::EaseInOut,

            hold_duration: 1.0,
            hold_repeat: true,

            initial_stack_count: DEFAULT_STACK_COUNT,
            object_spacing: DEFAULT_OBJECT_SPACING,
            baseline_x: 0.0,
            base_offset_per_tilt: 0.1,
            height_multiplier: 1.0,
            curve_mode: CurveMode::Linear,
            smooth_movement: true,
            smooth_time: 0.2,

            drop_force: 5.0,
            drop_torque: 2.0,
            dropped_lifetime: 3.0,
            gravity: DROP_GRAVITY,
            damping: DROP_DAMPING,
        }
    }
}

impl Settings {
    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reject values the simulation cannot use (non-finite numbers)
    pub fn validate(&self) -> Result<(), SettingsError> {
        let fields = [
            ("transition_duration", self.transition_duration),
            ("center_min_interval", self.center_min_interval),
            ("center_max_interval", self.center_max_interval),
            ("tilt_countdown", self.tilt_countdown),
            ("topple_drop_interval", self.topple_drop_interval),
            ("hold_duration", self.hold_duration),
            ("object_spacing", self.object_spacing),
            ("baseline_x", self.baseline_x),
            ("base_offset_per_tilt", self.base_offset_per_tilt),
            ("height_multiplier", self.height_multiplier),
            ("smooth_time", self.smooth_time),
            ("drop_force", self.drop_force),
            ("drop_torque", self.drop_torque),
            ("dropped_lifetime", self.dropped_lifetime),
            ("gravity", self.gravity),
            ("damping", self.damping),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(SettingsError::Invalid { field, value });
            }
        }
        Ok(())
    }

    /// Copy with negative or non-finite durations zeroed and the center
    /// interval ordered
    pub fn sanitized(&self) -> Self {
        let mut s = self.clone();
        for secs in [
            &mut s.transition_duration,
            &mut s.center_min_interval,
            &mut s.center_max_interval,
            &mut s.tilt_countdown,
            &mut s.topple_drop_interval,
            &mut s.hold_duration,
            &mut s.smooth_time,
            &mut s.dropped_lifetime,
        ] {
            *secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
        }
        s.center_max_interval = s.center_max_interval.max(s.center_min_interval);
        s.object_spacing = s.object_spacing.max(0.0);
        s.drop_torque = s.drop_torque.abs();
        s
    }
}
