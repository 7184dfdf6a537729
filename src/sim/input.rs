//! Hold-to-repeat input debouncing
//!
//! Each binding fires its command once on press, once more after being held
//! for the hold duration, and then stays quiet until released.

use serde::{Deserialize, Serialize};

use super::machine::Command;
use super::phase::Side;

/// The four primary command bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Binding {
    InstantToppleLeft,
    StepLeft,
    StepRight,
    InstantToppleRight,
}

impl Binding {
    /// All bindings in dispatch order
    pub const ALL: [Binding; 4] = [
        Binding::InstantToppleLeft,
        Binding::StepLeft,
        Binding::StepRight,
        Binding::InstantToppleRight,
    ];

    pub fn command(self) -> Command {
        match self {
            Binding::InstantToppleLeft => Command::InstantTopple(Side::Left),
            Binding::StepLeft => Command::StepToward(Side::Left),
            Binding::StepRight => Command::StepToward(Side::Right),
            Binding::InstantToppleRight => Command::InstantTopple(Side::Right),
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Edge state of a binding for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeySignal {
    #[default]
    Idle,
    /// Went down this tick
    Pressed,
    /// Still down
    Held,
    /// Went up this tick
    Released,
}

impl KeySignal {
    /// Derive the edge from the previous and current level
    pub fn from_levels(was_down: bool, is_down: bool) -> Self {
        match (was_down, is_down) {
            (false, true) => KeySignal::Pressed,
            (true, true) => KeySignal::Held,
            (true, false) => KeySignal::Released,
            (false, false) => KeySignal::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct HoldTracker {
    hold_ticks: u32,
    triggered: bool,
    down: bool,
}

/// Per-binding press/hold/release tracking
#[derive(Debug, Clone)]
pub struct InputDebouncer {
    trackers: [HoldTracker; 4],
    hold_ticks: u32,
    repeat_enabled: bool,
}

impl InputDebouncer {
    pub fn new(hold_ticks: u32, repeat_enabled: bool) -> Self {
        Self {
            trackers: [HoldTracker::default(); 4],
            hold_ticks,
            repeat_enabled,
        }
    }

    /// Feed one edge for a binding. Returns the command to dispatch, if any.
    pub fn signal(&mut self, binding: Binding, signal: KeySignal) -> Option<Command> {
        let hold_ticks = self.hold_ticks;
        let repeat_enabled = self.repeat_enabled;
        let tracker = &mut self.trackers[binding.index()];

        match signal {
            KeySignal::Pressed => {
                tracker.hold_ticks = 0;
                tracker.triggered = false;
                tracker.down = true;
                Some(binding.command())
            }
            KeySignal::Held => {
                tracker.down = true;
                if !repeat_enabled {
                    return None;
                }
                tracker.hold_ticks = tracker.hold_ticks.saturating_add(1);
                if tracker.hold_ticks >= hold_ticks && !tracker.triggered {
                    tracker.triggered = true;
                    log::debug!("Hold repeat: {:?}", binding);
                    Some(binding.command())
                } else {
                    None
                }
            }
            KeySignal::Released => {
                *tracker = HoldTracker::default();
                None
            }
            KeySignal::Idle => None,
        }
    }

    /// Feed edges for all bindings (in [`Binding::ALL`] order)
    pub fn update(&mut self, signals: &[KeySignal; 4]) -> Vec<Command> {
        Binding::ALL
            .iter()
            .zip(signals)
            .filter_map(|(&binding, &signal)| self.signal(binding, signal))
            .collect()
    }

    /// Feed raw down/up levels; edges are derived from the previous tick
    pub fn update_levels(&mut self, down: [bool; 4]) -> Vec<Command> {
        let signals: [KeySignal; 4] = std::array::from_fn(|i| {
            KeySignal::from_levels(self.trackers[i].down, down[i])
        });
        self.update(&signals)
    }

    /// Whether a binding is currently held down
    pub fn is_down(&self, binding: Binding) -> bool {
        self.trackers[binding.index()].down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_press_fires_once() {
        let mut input = InputDebouncer::new(60, true);
        assert_eq!(
            input.signal(Binding::StepLeft, KeySignal::Pressed),
            Some(Command::StepToward(Side::Left))
        );
        assert_eq!(input.signal(Binding::StepLeft, KeySignal::Held), None);
    }

    #[test]
    fn test_hold_repeats_exactly_once() {
        let mut input = InputDebouncer::new(60, true);
        input.signal(Binding::InstantToppleRight, KeySignal::Pressed);
        let mut fired = 0;
        for tick in 1..=300 {
            if input.signal(Binding::InstantToppleRight, KeySignal::Held).is_some() {
                fired += 1;
                assert_eq!(tick, 60);
            }
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_release_resets_hold() {
        let mut input = InputDebouncer::new(3, true);
        input.signal(Binding::StepRight, KeySignal::Pressed);
        input.signal(Binding::StepRight, KeySignal::Held);
        input.signal(Binding::StepRight, KeySignal::Released);
        assert!(!input.is_down(Binding::StepRight));

        input.signal(Binding::StepRight, KeySignal::Pressed);
        let fired: Vec<_> = (0..3)
            .filter_map(|_| input.signal(Binding::StepRight, KeySignal::Held))
            .collect();
        assert_eq!(fired, vec![Command::StepToward(Side::Right)]);
    }

    #[test]
    fn test_repeat_disabled() {
        let mut input = InputDebouncer::new(1, false);
        input.signal(Binding::StepLeft, KeySignal::Pressed);
        for _ in 0..10 {
            assert_eq!(input.signal(Binding::StepLeft, KeySignal::Held), None);
        }
    }

    #[test]
    fn test_bindings_are_independent() {
        let mut input = InputDebouncer::new(2, true);
        let commands = input.update(&[
            KeySignal::Pressed,
            KeySignal::Idle,
            KeySignal::Pressed,
            KeySignal::Idle,
        ]);
        assert_eq!(
            commands,
            vec![
                Command::InstantTopple(Side::Left),
                Command::StepToward(Side::Right)
            ]
        );
        input.signal(Binding::InstantToppleLeft, KeySignal::Released);
        assert!(!input.is_down(Binding::InstantToppleLeft));
        assert!(input.is_down(Binding::StepRight));
    }

    #[test]
    fn test_levels_derive_edges() {
        let mut input = InputDebouncer::new(2, true);
        let down = [false, true, false, false];
        let up = [false; 4];
        assert_eq!(input.update_levels(down), vec![Command::StepToward(Side::Left)]);
        assert!(input.update_levels(down).is_empty());
        assert_eq!(input.update_levels(down), vec![Command::StepToward(Side::Left)]);
        assert!(input.update_levels(down).is_empty());
        assert!(input.update_levels(up).is_empty());
        assert_eq!(input.update_levels(down), vec![Command::StepToward(Side::Left)]);
    }

    proptest! {
        #[test]
        fn at_most_two_fires_per_press(hold in 0u32..10, held_ticks in 0usize..50) {
            let mut input = InputDebouncer::new(hold, true);
            let mut fired = usize::from(input.signal(Binding::StepLeft, KeySignal::Pressed).is_some());
            for _ in 0..held_ticks {
                fired += usize::from(input.signal(Binding::StepLeft, KeySignal::Held).is_some());
            }
            prop_assert!(fired >= 1 && fired <= 2);
        }
    }
}
