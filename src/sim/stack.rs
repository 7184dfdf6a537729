//! Ordered item stack
//!
//! Index 0 is the bottom (baseline, never offset), the last index is the top
//! and is always the next item to drop. Indices stay dense: removed items are
//! handed out by value and no longer tracked.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::projector::smooth_damp;

/// Opaque identity of a stacked item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// An item in the stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackItem {
    pub id: ItemId,
    /// Position relative to the stack root
    pub pos: Vec2,
    /// Smoothing velocity (only used by damped movement)
    #[serde(skip)]
    pub vel: Vec2,
}

/// How items move toward their projected targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Snap to target every tick
    Immediate,
    /// Critically damped approach over roughly `smooth_time` seconds
    Smooth { smooth_time: f32 },
}

/// Bottom-to-top sequence of items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStack {
    items: Vec<StackItem>,
    baseline_x: f32,
    spacing: f32,
    next_id: u32,
}

impl ItemStack {
    pub fn new(baseline_x: f32, spacing: f32) -> Self {
        Self {
            items: Vec::new(),
            baseline_x,
            spacing,
            next_id: 1,
        }
    }

    /// Push a new item on top at its baseline position
    pub fn push(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;

        let pos = Vec2::new(self.baseline_x, self.items.len() as f32 * self.spacing);
        self.items.push(StackItem {
            id,
            pos,
            vel: Vec2::ZERO,
        });
        self.reset_velocities();
        id
    }

    /// Remove and return the top item (None when empty)
    pub fn pop_top(&mut self) -> Option<StackItem> {
        let item = self.items.pop()?;
        self.reset_velocities();
        Some(item)
    }

    /// Discard every item without dropping it. Returns how many were discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.items.len();
        self.items.clear();
        discarded
    }

    /// Replace the stack with `count` fresh items
    pub fn rebuild(&mut self, count: usize) {
        let discarded = self.clear();
        for _ in 0..count {
            self.push();
        }
        log::info!("Stack rebuilt: discarded {} items, now {}", discarded, count);
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[StackItem] {
        &self.items
    }

    pub fn top(&self) -> Option<&StackItem> {
        self.items.last()
    }

    /// Drop cached smoothing state for every item
    pub fn reset_velocities(&mut self) {
        for item in &mut self.items {
            item.vel = Vec2::ZERO;
        }
    }

    /// Move items toward `targets` (one target per item, bottom to top)
    pub fn apply_targets(&mut self, targets: &[Vec2], motion: Motion, dt: f32) {
        for (item, &target) in self.items.iter_mut().zip(targets) {
            match motion {
                Motion::Smooth { smooth_time } if smooth_time > 0.0 => {
                    item.pos = smooth_damp(item.pos, target, &mut item.vel, smooth_time, dt);
                }
                _ => item.pos = target,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_baseline_positions() {
        let mut stack = ItemStack::new(-4.0, 1.5);
        let a = stack.push();
        let b = stack.push();
        assert_ne!(a, b);
        assert_eq!(stack.height(), 2);
        assert_eq!(stack.items()[0].pos, Vec2::new(-4.0, 0.0));
        assert_eq!(stack.items()[1].pos, Vec2::new(-4.0, 1.5));
        assert_eq!(stack.top().map(|i| i.id), Some(b));
    }

    #[test]
    fn test_pop_top_returns_last_pushed() {
        let mut stack = ItemStack::new(0.0, 1.0);
        stack.push();
        let top = stack.push();
        let popped = stack.pop_top().unwrap();
        assert_eq!(popped.id, top);
        assert_eq!(stack.height(), 1);
    }

    #[test]
    fn test_pop_empty_is_none() {
        let mut stack = ItemStack::new(0.0, 1.0);
        assert!(stack.pop_top().is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_rebuild_resets_items_and_smoothing() {
        let mut stack = ItemStack::new(0.0, 1.0);
        for _ in 0..3 {
            stack.push();
        }
        let old_ids: Vec<ItemId> = stack.items().iter().map(|i| i.id).collect();
        let targets = vec![Vec2::new(5.0, 0.0); 3];
        stack.apply_targets(&targets, Motion::Smooth { smooth_time: 0.2 }, 1.0 / 60.0);
        assert!(stack.items().iter().any(|i| i.vel != Vec2::ZERO));

        stack.rebuild(6);
        assert_eq!(stack.height(), 6);
        for (i, item) in stack.items().iter().enumerate() {
            assert_eq!(item.pos, Vec2::new(0.0, i as f32));
            assert_eq!(item.vel, Vec2::ZERO);
            assert!(!old_ids.contains(&item.id));
        }
    }

    #[test]
    fn test_membership_change_resets_velocities() {
        let mut stack = ItemStack::new(0.0, 1.0);
        stack.push();
        stack.push();
        let targets = vec![Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0)];
        stack.apply_targets(&targets, Motion::Smooth { smooth_time: 0.5 }, 1.0 / 60.0);
        stack.push();
        assert!(stack.items().iter().all(|i| i.vel == Vec2::ZERO));
    }

    #[test]
    fn test_pop_resets_velocities() {
        let mut stack = ItemStack::new(0.0, 1.0);
        for _ in 0..4 {
            stack.push();
        }
        let targets: Vec<Vec2> = (0..4).map(|i| Vec2::new(i as f32 * 0.3, i as f32)).collect();
        for _ in 0..5 {
            stack.apply_targets(&targets, Motion::Smooth { smooth_time: 0.2 }, 1.0 / 60.0);
        }
        assert!(stack.items().iter().any(|i| i.vel != Vec2::ZERO));

        stack.pop_top();
        assert_eq!(stack.height(), 3);
        assert!(stack.items().iter().all(|i| i.vel == Vec2::ZERO));
    }

    #[test]
    fn test_immediate_motion_snaps() {
        let mut stack = ItemStack::new(0.0, 1.0);
        stack.push();
        stack.push();
        let targets = vec![Vec2::new(0.0, 0.0), Vec2::new(0.3, 1.0)];
        stack.apply_targets(&targets, Motion::Immediate, 1.0 / 60.0);
        assert_eq!(stack.items()[1].pos, Vec2::new(0.3, 1.0));
    }
}
