//! Deterministic simulation module
//!
//! All sway logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Timers count whole ticks
//! - No rendering or platform dependencies

pub mod curve;
pub mod events;
pub mod falling;
pub mod input;
pub mod machine;
pub mod phase;
pub mod projector;
pub mod stack;
pub mod state;
pub mod tick;

pub use curve::{Curve, Keyframe};
pub use events::{EventBus, ListenerId, SwayEvent};
pub use falling::{DropParams, FallingItem};
pub use input::{Binding, InputDebouncer, KeySignal};
pub use machine::{Command, MachineEvent, PhaseStateMachine, PhaseTimer, PhaseTimings, Transition};
pub use phase::{Phase, PhaseCategory, Severity, Side};
pub use projector::{CurveMode, OffsetProjector, smooth_damp};
pub use stack::{ItemId, ItemStack, Motion, StackItem};
pub use state::SwayState;
pub use tick::{TickInput, tick};
