//! Sway Stack - a tilting stack of items that topples under pressure
//!
//! Core modules:
//! - `sim`: Deterministic simulation (phase state machine, stack, offsets)
//! - `settings`: Data-driven tuning, loaded from JSON
//! - `error`: Configuration errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::SettingsError;
pub use settings::Settings;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Simulation ticks per second
    pub const TICKS_PER_SEC: u32 = 60;

    /// Stack defaults
    pub const DEFAULT_STACK_COUNT: usize = 5;
    pub const DEFAULT_OBJECT_SPACING: f32 = 1.0;

    /// Falling item defaults
    pub const DROP_GRAVITY: f32 = 9.81;
    /// Per-tick velocity damping for falling items
    pub const DROP_DAMPING: f32 = 0.98;
}

/// Convert a configured duration in seconds to whole simulation ticks.
///
/// Negative (and NaN) durations are treated as zero, which fires on the next tick.
#[inline]
pub fn secs_to_ticks(secs: f32) -> u32 {
    (secs.max(0.0) / consts::SIM_DT).round() as u32
}

/// Convert whole simulation ticks back to seconds
#[inline]
pub fn ticks_to_secs(ticks: u32) -> f32 {
    ticks as f32 * consts::SIM_DT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_to_ticks() {
        assert_eq!(secs_to_ticks(1.0), 60);
        assert_eq!(secs_to_ticks(5.0), 300);
        assert_eq!(secs_to_ticks(0.0), 0);
        assert_eq!(secs_to_ticks(-2.0), 0);
        assert_eq!(secs_to_ticks(f32::NAN), 0);
    }

    #[test]
    fn test_ticks_to_secs() {
        assert!((ticks_to_secs(120) - 2.0).abs() < 1e-4);
    }
}
