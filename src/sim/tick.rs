//! Fixed timestep simulation tick
//!
//! Per-tick order:
//! 1. input hold timers, then dispatch of resulting commands
//! 2. transition and phase-policy timers, with phase changes and drops applied
//! 3. target positions from the current phase and stack
//! 4. per-item smoothing, then falling items

use super::machine::Command;
use super::state::SwayState;
use crate::consts::TICKS_PER_SEC;

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Down state of each binding, in `Binding::ALL` order
    pub bindings: [bool; 4],
    /// One level toward center
    pub move_toward_center: bool,
    /// Restart the tilt countdown
    pub stabilize: bool,
    /// Scripted player keeps the stack upright
    pub autopilot: bool,
}

/// Advance the session by one fixed timestep
pub fn tick(state: &mut SwayState, input: &TickInput, dt: f32) {
    // Hold timers advance regardless of transition state
    let mut commands = state.debouncer.update_levels(input.bindings);
    if input.move_toward_center {
        commands.push(Command::MoveTowardCenter);
    }
    if input.stabilize {
        commands.push(Command::Stabilize);
    }
    if input.autopilot {
        commands.extend(autopilot(state));
    }
    for command in commands {
        state.apply_command(command);
    }

    state.machine.advance();
    state.dispatch_machine_events();

    let targets = state.target_positions();
    state.stack.apply_targets(&targets, state.motion, dt);

    let params = state.drop_params;
    state.falling.retain_mut(|item| item.update(dt, &params));

    state.time_ticks += 1;
}

/// Scripted player: back out of topples, ease off deep tilts, hold shallow ones
fn autopilot(state: &SwayState) -> Option<Command> {
    if state.machine.is_transitioning() {
        return None;
    }
    let phase = state.machine.phase();
    match phase.tilt_level() {
        3 => phase.side().map(|side| Command::StepToward(side.opposite())),
        2 => Some(Command::MoveTowardCenter),
        1 if state.time_ticks % TICKS_PER_SEC as u64 == 0 => Some(Command::Stabilize),
        _ => None,
    }
}
