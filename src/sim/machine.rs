//! Phase state machine
//!
//! Owns the current phase, the rotation transition and the single active
//! phase-policy timer. Every timer is a countdown in whole ticks advanced once
//! per tick by [`PhaseStateMachine::advance`].
//!
//! Entry policies:
//! - Center: wait a random interval, then drift into a random non-extreme tilt
//! - Tilt: after a fixed countdown, worsen one level in the same direction
//! - Topple: drop one item immediately, then drop 1-2 items every interval
//!
//! The transition animation and the policy timer run concurrently; while a
//! transition is in flight every phase request and player command is refused.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::curve::Curve;
use super::phase::{Phase, PhaseCategory, Side};
use crate::settings::Settings;
use crate::{secs_to_ticks, ticks_to_secs};

/// Player command understood by the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Lean one level toward a side (topple only allows stepping back)
    StepToward(Side),
    /// One level closer to center from anywhere
    MoveTowardCenter,
    /// Restart the tilt countdown
    Stabilize,
    /// Jump straight into the topple on a side
    InstantTopple(Side),
}

/// Signals produced by the machine, drained by the session each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineEvent {
    PhaseChanged { old: Phase, new: Phase },
    /// The top item must be shed
    ToppleDrop,
}

/// Active phase-policy timer (ticks remaining)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhaseTimer {
    #[default]
    None,
    CenterWait { remaining: u32 },
    TiltCountdown { remaining: u32 },
    ToppleDropCycle { remaining: u32 },
}

impl PhaseTimer {
    pub fn remaining(&self) -> Option<u32> {
        match *self {
            PhaseTimer::None => None,
            PhaseTimer::CenterWait { remaining }
            | PhaseTimer::TiltCountdown { remaining }
            | PhaseTimer::ToppleDropCycle { remaining } => Some(remaining),
        }
    }
}

/// Rotation animation between two phase angles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from_angle: f32,
    pub to_angle: f32,
    pub elapsed: u32,
    pub duration: u32,
}

impl Transition {
    /// Linear progress in 0..=1
    pub fn progress(&self) -> f32 {
        if self.duration == 0 {
            1.0
        } else {
            (self.elapsed as f32 / self.duration as f32).min(1.0)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Timer lengths in ticks (center wait bounds stay in seconds, drawn per entry)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTimings {
    pub transition_ticks: u32,
    pub center_min_secs: f32,
    pub center_max_secs: f32,
    pub tilt_ticks: u32,
    pub topple_drop_ticks: u32,
}

impl PhaseTimings {
    pub fn from_settings(settings: &Settings) -> Self {
        let settings = settings.sanitized();
        Self {
            transition_ticks: secs_to_ticks(settings.transition_duration),
            center_min_secs: settings.center_min_interval,
            center_max_secs: settings.center_max_interval,
            tilt_ticks: secs_to_ticks(settings.tilt_countdown),
            topple_drop_ticks: secs_to_ticks(settings.topple_drop_interval),
        }
    }
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// The tilt-phase state machine
#[derive(Debug, Clone)]
pub struct PhaseStateMachine {
    phase: Phase,
    transition: Option<Transition>,
    timer: PhaseTimer,
    /// Current visual rotation in degrees
    rotation: f32,
    easing: Curve,
    timings: PhaseTimings,
    rng: Pcg32,
    events: Vec<MachineEvent>,
}

impl PhaseStateMachine {
    /// Create a machine resting in Center with its center-wait armed
    pub fn new(timings: PhaseTimings, easing: Curve, seed: u64) -> Self {
        let mut machine = Self {
            phase: Phase::Center,
            transition: None,
            timer: PhaseTimer::None,
            rotation: Phase::Center.rotation_angle(),
            easing,
            timings,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        };
        machine.enter_policy();
        machine
    }

    pub fn from_settings(settings: &Settings, seed: u64) -> Self {
        Self::new(
            PhaseTimings::from_settings(settings),
            settings.rotation_curve.clone(),
            seed,
        )
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Progress of the in-flight transition (1.0 when idle)
    pub fn transition_progress(&self) -> f32 {
        self.transition.map_or(1.0, |t| t.progress())
    }

    #[inline]
    pub fn timer(&self) -> PhaseTimer {
        self.timer
    }

    /// Remaining time of the active phase timer in seconds
    pub fn countdown_secs(&self) -> f32 {
        self.timer.remaining().map_or(0.0, ticks_to_secs)
    }

    /// Visual rotation of the stack root in degrees
    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }

    /// Take all events produced since the last drain, in order
    pub fn drain_events(&mut self) -> Vec<MachineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Change phase through the transition protocol.
    ///
    /// Refused while transitioning or when `target` is already current.
    pub fn request_phase(&mut self, target: Phase) -> bool {
        if self.is_transitioning() || target == self.phase {
            return false;
        }

        let old = self.phase;
        self.timer = PhaseTimer::None;
        self.phase = target;
        self.events.push(MachineEvent::PhaseChanged { old, new: target });
        log::info!("Phase: {} -> {}", old, target);

        self.begin_transition(target);
        self.enter_policy();
        true
    }

    /// Apply a player command. Returns whether it had any effect.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::StepToward(side) => self.step_toward(side),
            Command::MoveTowardCenter => self.move_toward_center(),
            Command::Stabilize => self.stabilize(),
            Command::InstantTopple(side) => self.instant_topple(side),
        }
    }

    pub fn step_toward(&mut self, side: Side) -> bool {
        if self.is_transitioning() {
            return false;
        }

        if self.phase.is_topple() {
            // Topple only allows stepping back toward center
            if self.phase.side() == Some(side) {
                return false;
            }
            return self.request_phase(self.phase.toward_center());
        }

        let target = Phase::from_ordinal_clamped(self.phase.ordinal() as i32 + side.sign() as i32);
        self.request_phase(target)
    }

    pub fn move_toward_center(&mut self) -> bool {
        if self.is_transitioning() || self.phase.is_center() {
            return false;
        }
        self.request_phase(self.phase.toward_center())
    }

    /// Restart the tilt countdown without changing phase (tilt phases only)
    pub fn stabilize(&mut self) -> bool {
        if self.is_transitioning() || !self.phase.is_tilt() {
            return false;
        }
        self.timer = PhaseTimer::TiltCountdown {
            remaining: self.timings.tilt_ticks,
        };
        log::debug!("Stabilized {}, countdown reset", self.phase);
        true
    }

    /// Jump into the topple on `side`.
    ///
    /// From the opposite topple the ordinal moves four levels toward `side`
    /// (landing on that side's first tilt). Otherwise the topple is requested
    /// directly and one extra drop fires on top of the topple entry drop.
    pub fn instant_topple(&mut self, side: Side) -> bool {
        if self.is_transitioning() {
            return false;
        }

        if self.phase == Phase::topple(side.opposite()) {
            let target =
                Phase::from_ordinal_clamped(self.phase.ordinal() as i32 + 4 * side.sign() as i32);
            log::info!("Jumping 4 levels: {} -> {}", self.phase, target);
            return self.request_phase(target);
        }

        log::info!("Instant topple to {}", Phase::topple(side));
        self.request_phase(Phase::topple(side));
        self.events.push(MachineEvent::ToppleDrop);
        true
    }

    /// Advance the transition and then the phase-policy timer by one tick
    pub fn advance(&mut self) {
        self.advance_transition();
        self.advance_policy();
    }

    fn begin_transition(&mut self, target: Phase) {
        let transition = Transition {
            from_angle: self.rotation,
            to_angle: target.rotation_angle(),
            elapsed: 0,
            duration: self.timings.transition_ticks,
        };
        if transition.is_finished() {
            self.rotation = transition.to_angle;
            self.transition = None;
        } else {
            self.transition = Some(transition);
        }
    }

    fn advance_transition(&mut self) {
        let Some(mut transition) = self.transition else {
            return;
        };
        transition.elapsed += 1;

        if transition.is_finished() {
            self.rotation = transition.to_angle;
            self.transition = None;
        } else {
            let t = self.easing.evaluate(transition.progress());
            self.rotation = transition.from_angle + (transition.to_angle - transition.from_angle) * t;
            self.transition = Some(transition);
        }
    }

    fn enter_policy(&mut self) {
        match self.phase.category() {
            PhaseCategory::Center => {
                let (min, max) = (self.timings.center_min_secs, self.timings.center_max_secs);
                let wait = if min.is_finite() && max.is_finite() && max > min {
                    self.rng.random_range(min..=max)
                } else if min.is_finite() {
                    min
                } else {
                    0.0
                };
                self.timer = PhaseTimer::CenterWait {
                    remaining: secs_to_ticks(wait),
                };
                log::debug!("Center wait armed: {:.2}s", wait);
            }
            PhaseCategory::Tilt => {
                self.timer = PhaseTimer::TiltCountdown {
                    remaining: self.timings.tilt_ticks,
                };
                log::debug!("Tilt countdown armed: {} ticks", self.timings.tilt_ticks);
            }
            PhaseCategory::Topple => {
                log::info!("Entered {}, dropping", self.phase);
                self.events.push(MachineEvent::ToppleDrop);
                self.timer = PhaseTimer::ToppleDropCycle {
                    remaining: self.timings.topple_drop_ticks,
                };
            }
        }
    }

    fn advance_policy(&mut self) {
        match self.timer {
            PhaseTimer::None => {}
            PhaseTimer::CenterWait { remaining } => {
                let remaining = remaining.saturating_sub(1);
                self.timer = PhaseTimer::CenterWait { remaining };
                if remaining == 0 {
                    let target = Phase::TILT_PHASES[self.rng.random_range(0..Phase::TILT_PHASES.len())];
                    if !self.request_phase(target) {
                        log::debug!("Center drift to {} deferred by transition", target);
                    }
                }
            }
            PhaseTimer::TiltCountdown { remaining } => {
                let remaining = remaining.saturating_sub(1);
                self.timer = PhaseTimer::TiltCountdown { remaining };
                if remaining == 0 {
                    let target = self.phase.next_in_same_direction();
                    if !self.request_phase(target) {
                        log::debug!("Tilt worsening to {} deferred by transition", target);
                    }
                }
            }
            PhaseTimer::ToppleDropCycle { remaining } => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    let count = self.rng.random_range(1..=2u32);
                    log::debug!("Topple drop burst: {}", count);
                    for _ in 0..count {
                        self.events.push(MachineEvent::ToppleDrop);
                    }
                    self.timer = PhaseTimer::ToppleDropCycle {
                        remaining: self.timings.topple_drop_ticks,
                    };
                } else {
                    self.timer = PhaseTimer::ToppleDropCycle { remaining };
                }
            }
        }
    }
}
