//! Sway phases
//!
//! Seven ordered lean states from full-left topple to full-right topple.
//! Everything derived from a phase is a fixed lookup keyed by its ordinal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lean phase of the stack (ordinal -3..=3)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[repr(i8)]
pub enum Phase {
    LeftTopple = -3,
    LeftTilt2 = -2,
    LeftTilt1 = -1,
    #[default]
    Center = 0,
    RightTilt1 = 1,
    RightTilt2 = 2,
    RightTopple = 3,
}

/// Entry-policy category of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseCategory {
    Center,
    Tilt,
    Topple,
}

/// Danger level shown by gauges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Safe,
    Warning,
    Danger,
}

/// Side of the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// -1 for left, +1 for right
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }

    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Side for a signed direction (None for zero)
    pub fn from_sign(sign: i32) -> Option<Side> {
        match sign.signum() {
            -1 => Some(Side::Left),
            1 => Some(Side::Right),
            _ => None,
        }
    }
}

/// Rotation angle (degrees) per ordinal, indexed by `ordinal + 3`
const ROTATION_ANGLES: [f32; 7] = [-35.0, -25.0, -15.0, 0.0, 15.0, 25.0, 35.0];

/// Gauge value per ordinal (reversed: left lean reads high)
const GAUGE_VALUES: [f32; 7] = [1.0, 0.85, 0.65, 0.5, 0.25, 0.15, 0.0];

impl Phase {
    /// All phases in ordinal order
    pub const ALL: [Phase; 7] = [
        Phase::LeftTopple,
        Phase::LeftTilt2,
        Phase::LeftTilt1,
        Phase::Center,
        Phase::RightTilt1,
        Phase::RightTilt2,
        Phase::RightTopple,
    ];

    /// The four non-extreme tilt phases a centered stack can drift into
    pub const TILT_PHASES: [Phase; 4] = [
        Phase::LeftTilt2,
        Phase::LeftTilt1,
        Phase::RightTilt1,
        Phase::RightTilt2,
    ];

    pub const MIN_ORDINAL: i8 = -3;
    pub const MAX_ORDINAL: i8 = 3;

    #[inline]
    pub fn ordinal(self) -> i8 {
        self as i8
    }

    pub fn from_ordinal(ordinal: i8) -> Option<Phase> {
        if (Self::MIN_ORDINAL..=Self::MAX_ORDINAL).contains(&ordinal) {
            Some(Self::ALL[(ordinal + 3) as usize])
        } else {
            None
        }
    }

    /// Phase for any ordinal, clamped into -3..=3
    pub fn from_ordinal_clamped(ordinal: i32) -> Phase {
        let clamped = ordinal.clamp(Self::MIN_ORDINAL as i32, Self::MAX_ORDINAL as i32);
        Self::ALL[(clamped + 3) as usize]
    }

    /// Lean direction: -1 left, 0 center, +1 right
    #[inline]
    pub fn direction(self) -> i8 {
        self.ordinal().signum()
    }

    /// Distance from center (0-3)
    #[inline]
    pub fn tilt_level(self) -> u8 {
        self.ordinal().unsigned_abs()
    }

    #[inline]
    pub fn side(self) -> Option<Side> {
        Side::from_sign(self.direction() as i32)
    }

    #[inline]
    pub fn is_center(self) -> bool {
        self == Phase::Center
    }

    #[inline]
    pub fn is_topple(self) -> bool {
        self.tilt_level() == 3
    }

    #[inline]
    pub fn is_tilt(self) -> bool {
        !self.is_center() && !self.is_topple()
    }

    pub fn category(self) -> PhaseCategory {
        match self.tilt_level() {
            0 => PhaseCategory::Center,
            3 => PhaseCategory::Topple,
            _ => PhaseCategory::Tilt,
        }
    }

    /// Visual rotation of the stack root in degrees
    #[inline]
    pub fn rotation_angle(self) -> f32 {
        ROTATION_ANGLES[(self.ordinal() + 3) as usize]
    }

    /// Topple phase on the given side
    pub fn topple(side: Side) -> Phase {
        match side {
            Side::Left => Phase::LeftTopple,
            Side::Right => Phase::RightTopple,
        }
    }

    /// One level farther from center in the same direction (topple and center stay put)
    pub fn next_in_same_direction(self) -> Phase {
        if self.is_topple() || self.is_center() {
            return self;
        }
        Phase::from_ordinal_clamped(self.ordinal() as i32 + self.direction() as i32)
    }

    /// One level closer to center (center stays put)
    pub fn toward_center(self) -> Phase {
        Phase::from_ordinal_clamped(self.ordinal() as i32 - self.direction() as i32)
    }

    /// Reversed gauge reading in 0..=1 (left topple reads 1.0, right topple 0.0)
    #[inline]
    pub fn gauge_value(self) -> f32 {
        GAUGE_VALUES[(self.ordinal() + 3) as usize]
    }

    pub fn severity(self) -> Severity {
        match self.category() {
            PhaseCategory::Center => Severity::Safe,
            PhaseCategory::Tilt => Severity::Warning,
            PhaseCategory::Topple => Severity::Danger,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::LeftTopple => "LeftTopple",
            Phase::LeftTilt2 => "LeftTilt2",
            Phase::LeftTilt1 => "LeftTilt1",
            Phase::Center => "Center",
            Phase::RightTilt1 => "RightTilt1",
            Phase::RightTilt2 => "RightTilt2",
            Phase::RightTopple => "RightTopple",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
