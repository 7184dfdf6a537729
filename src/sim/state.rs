//! Session state
//!
//! Wires the phase machine, stack, projector, input and falling items
//! together. Collaborators are owned directly; there is no global lookup.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::events::{EventBus, ListenerId, SwayEvent};
use super::falling::{DropParams, FallingItem};
use super::input::InputDebouncer;
use super::machine::{Command, MachineEvent, PhaseStateMachine};
use super::phase::Phase;
use super::projector::OffsetProjector;
use super::stack::{ItemId, ItemStack, Motion};
use crate::secs_to_ticks;
use crate::settings::Settings;

/// Stream offset so falling-item spin doesn't share the machine's sequence
const DROP_RNG_STREAM: u64 = 0x5eed_d40f;

/// Complete sway session
#[derive(Debug)]
pub struct SwayState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub machine: PhaseStateMachine,
    pub stack: ItemStack,
    pub projector: OffsetProjector,
    pub debouncer: InputDebouncer,
    /// Items shed from the stack, still animating
    pub falling: Vec<FallingItem>,
    pub drop_params: DropParams,
    pub motion: Motion,
    /// World position of the stack root
    pub origin: Vec2,
    /// Items actually dropped this session
    pub drops_total: u32,
    bus: EventBus,
    rng: Pcg32,
}

impl SwayState {
    /// Create a session with a freshly built stack resting in Center
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let settings = settings.sanitized();
        let motion = if settings.smooth_movement {
            Motion::Smooth {
                smooth_time: settings.smooth_time,
            }
        } else {
            Motion::Immediate
        };

        let mut state = Self {
            seed,
            time_ticks: 0,
            machine: PhaseStateMachine::from_settings(&settings, seed),
            stack: ItemStack::new(settings.baseline_x, settings.object_spacing),
            projector: OffsetProjector::from_settings(&settings),
            debouncer: InputDebouncer::new(secs_to_ticks(settings.hold_duration), settings.hold_repeat),
            falling: Vec::new(),
            drop_params: DropParams::from_settings(&settings),
            motion,
            origin: Vec2::ZERO,
            drops_total: 0,
            bus: EventBus::new(),
            rng: Pcg32::seed_from_u64(seed ^ DROP_RNG_STREAM),
        };
        state.rebuild_stack(settings.initial_stack_count);
        state
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&SwayEvent) + 'static,
    {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.stack.height()
    }

    /// Apply a command and handle its consequences synchronously
    pub fn apply_command(&mut self, command: Command) -> bool {
        let accepted = self.machine.apply(command);
        self.dispatch_machine_events();
        accepted
    }

    /// Topple request from tooling. Only topple phases are accepted.
    pub fn force_topple(&mut self, phase: Phase) -> bool {
        match phase.side().filter(|_| phase.is_topple()) {
            Some(side) => self.apply_command(Command::InstantTopple(side)),
            None => {
                log::warn!("Rejected forced topple to non-topple phase {}", phase);
                false
            }
        }
    }

    /// Add an item on top of the stack
    pub fn push_item(&mut self) -> ItemId {
        self.stack.push()
    }

    /// Discard the stack and build `count` fresh items at their targets
    pub fn rebuild_stack(&mut self, count: usize) {
        self.stack.rebuild(count);
        self.snap_to_targets();
    }

    /// Target positions for the current phase and stack contents
    pub fn target_positions(&self) -> Vec<Vec2> {
        self.projector
            .target_positions(self.stack.height(), self.machine.phase())
    }

    /// Move every item straight onto its target
    pub fn snap_to_targets(&mut self) {
        let targets = self.target_positions();
        self.stack.apply_targets(&targets, Motion::Immediate, 0.0);
        self.stack.reset_velocities();
    }

    /// World position of a stack-relative point under the current rotation.
    ///
    /// Positive rotation leans right (clockwise).
    pub fn world_position(&self, local: Vec2) -> Vec2 {
        let rotation = Vec2::from_angle(-self.machine.rotation().to_radians());
        self.origin + rotation.rotate(local)
    }

    /// Publish machine events and perform the drops they ask for
    pub(crate) fn dispatch_machine_events(&mut self) {
        for event in self.machine.drain_events() {
            match event {
                MachineEvent::PhaseChanged { old, new } => {
                    self.bus.publish(&SwayEvent::PhaseChanged { old, new });
                }
                MachineEvent::ToppleDrop => self.drop_top(),
            }
        }
    }

    fn drop_top(&mut self) {
        let Some((id, local)) = self.stack.top().map(|top| (top.id, top.pos)) else {
            log::warn!("Drop requested in {} but the stack is empty", self.phase());
            return;
        };

        let position = self.world_position(local);
        let direction = self.machine.phase().direction();
        log::debug!("Dropped {:?} at ({:.2}, {:.2})", id, position.x, position.y);

        // Published while the item is still the top of the stack
        self.bus.publish(&SwayEvent::ItemDropped {
            item: id,
            position,
            direction,
        });
        self.stack.pop_top();

        self.falling.push(FallingItem::launch(
            id,
            position,
            self.machine.rotation(),
            direction,
            &self.drop_params,
            &mut self.rng,
        ));
        self.drops_total += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(state: &mut SwayState) -> Rc<RefCell<Vec<SwayEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        state.subscribe(move |e| sink.borrow_mut().push(*e));
        events
    }

    #[test]
    fn test_new_builds_initial_stack() {
        let state = SwayState::new(&Settings::default(), 1);
        assert_eq!(state.phase(), Phase::Center);
        assert_eq!(state.height(), 5);
        for (i, item) in state.stack.items().iter().enumerate() {
            assert_eq!(item.pos, Vec2::new(0.0, i as f32));
        }
    }

    #[test]
    fn test_force_topple_drops_top_items() {
        let mut state = SwayState::new(&Settings::default(), 2);
        let events = recorder(&mut state);
        assert!(state.force_topple(Phase::RightTopple));
        assert_eq!(state.height(), 3);
        assert_eq!(state.drops_total, 2);
        assert_eq!(state.falling.len(), 2);

        let events = events.borrow();
        assert_eq!(
            events[0],
            SwayEvent::PhaseChanged { old: Phase::Center, new: Phase::RightTopple }
        );
        let positions: Vec<Vec2> = events[1..]
            .iter()
            .map(|e| match e {
                SwayEvent::ItemDropped { position, direction, .. } => {
                    assert_eq!(*direction, 1);
                    *position
                }
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(positions, vec![Vec2::new(0.0, 4.0), Vec2::new(0.0, 3.0)]);
    }

    #[test]
    fn test_dropped_event_names_the_former_top() {
        let mut state = SwayState::new(&Settings::default(), 8);
        let top = state.stack.top().map(|i| i.id);
        let events = recorder(&mut state);
        state.force_topple(Phase::LeftTopple);

        let first_drop = events.borrow().iter().find_map(|e| match e {
            SwayEvent::ItemDropped { item, .. } => Some(*item),
            _ => None,
        });
        assert_eq!(first_drop, top);
        assert_eq!(state.falling.first().map(|f| f.id), top);
        assert!(state.stack.items().iter().all(|i| Some(i.id) != top));
    }

    #[test]
    fn test_unbounded_center_interval_is_sanitized() {
        let settings = Settings {
            center_max_interval: f32::INFINITY,
            ..Default::default()
        };
        let mut state = SwayState::new(&settings, 1);
        assert_eq!(state.phase(), Phase::Center);
        crate::sim::tick(&mut state, &crate::sim::TickInput::default(), crate::consts::SIM_DT);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_force_topple_rejects_non_topple() {
        let mut state = SwayState::new(&Settings::default(), 3);
        let events = recorder(&mut state);
        assert!(!state.force_topple(Phase::LeftTilt2));
        assert!(!state.force_topple(Phase::Center));
        assert_eq!(state.phase(), Phase::Center);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_drop_from_empty_stack_is_silent() {
        let settings = Settings {
            initial_stack_count: 0,
            ..Default::default()
        };
        let mut state = SwayState::new(&settings, 4);
        let events = recorder(&mut state);
        assert!(state.force_topple(Phase::LeftTopple));
        assert_eq!(state.drops_total, 0);
        assert!(state.falling.is_empty());
        assert_eq!(
            *events.borrow(),
            vec![SwayEvent::PhaseChanged { old: Phase::Center, new: Phase::LeftTopple }]
        );
    }

    #[test]
    fn test_unsubscribed_listener_stops_receiving() {
        let mut state = SwayState::new(&Settings::default(), 5);
        let count = Rc::new(RefCell::new(0));
        let id = {
            let count = count.clone();
            state.subscribe(move |_| *count.borrow_mut() += 1)
        };
        assert!(state.unsubscribe(id));
        assert!(!state.unsubscribe(id));
        state.force_topple(Phase::RightTopple);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_rebuild_keeps_falling_items() {
        let mut state = SwayState::new(&Settings::default(), 6);
        state.force_topple(Phase::LeftTopple);
        state.rebuild_stack(7);
        assert_eq!(state.height(), 7);
        assert_eq!(state.falling.len(), 2);
        let id = state.push_item();
        assert_eq!(state.stack.top().map(|i| i.id), Some(id));
    }

    #[test]
    fn test_world_position_follows_lean() {
        let mut state = SwayState::new(&Settings::default(), 7);
        state.origin = Vec2::new(10.0, 0.0);
        assert_eq!(state.world_position(Vec2::new(0.0, 2.0)), Vec2::new(10.0, 2.0));

        state.machine.request_phase(Phase::RightTilt1);
        while state.machine.is_transitioning() {
            state.machine.advance();
        }
        let leaned = state.world_position(Vec2::new(0.0, 2.0));
        assert!(leaned.x > 10.0);
        assert!(leaned.y < 2.0);
    }
}
