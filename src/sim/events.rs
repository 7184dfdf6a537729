//! Outbound events and a small publish/subscribe bus
//!
//! Listeners are invoked synchronously in subscription order.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::phase::Phase;
use super::stack::ItemId;

/// Events observed by renderers and other consumers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SwayEvent {
    /// Fired exactly once per accepted transition
    PhaseChanged { old: Phase, new: Phase },
    /// Fired once per shed item, while it is still the top of the stack
    ItemDropped {
        item: ItemId,
        /// World position at the moment of the drop
        position: Vec2,
        /// Lean direction at the moment of the drop (-1, 0, 1)
        direction: i8,
    },
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&SwayEvent)>;

/// Ordered listener list
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&SwayEvent) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn publish(&mut self, event: &SwayEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
