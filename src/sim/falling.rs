//! Falling items
//!
//! Simple kinematic animation for items shed from the stack: constant
//! gravity, per-tick damping, fixed lifetime. No collisions.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::stack::ItemId;
use crate::secs_to_ticks;
use crate::settings::Settings;

/// Launch and integration parameters for falling items
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropParams {
    /// Horizontal launch speed scale
    pub force: f32,
    /// Angular velocity range scale
    pub torque: f32,
    pub gravity: f32,
    /// Per-tick multiplier for linear and angular velocity
    pub damping: f32,
    pub lifetime_ticks: u32,
}

impl DropParams {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            force: settings.drop_force,
            torque: settings.drop_torque,
            gravity: settings.gravity,
            damping: settings.damping,
            lifetime_ticks: secs_to_ticks(settings.dropped_lifetime),
        }
    }
}

impl Default for DropParams {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// An item that left the stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingItem {
    pub id: ItemId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Degrees
    pub rotation: f32,
    /// Degrees per second
    pub angular_vel: f32,
    pub ttl_ticks: u32,
}

impl FallingItem {
    /// Launch from `pos`, thrown toward the lean `direction`
    pub fn launch<R: Rng>(
        id: ItemId,
        pos: Vec2,
        rotation: f32,
        direction: i8,
        params: &DropParams,
        rng: &mut R,
    ) -> Self {
        let spin = if params.torque > 0.0 {
            rng.random_range(-params.torque..=params.torque)
        } else {
            0.0
        };
        Self {
            id,
            pos,
            vel: Vec2::new(direction as f32 * params.force, -params.force * 0.5),
            rotation,
            angular_vel: spin * 100.0,
            ttl_ticks: params.lifetime_ticks,
        }
    }

    /// Integrate one tick. Returns false once the lifetime has run out.
    pub fn update(&mut self, dt: f32, params: &DropParams) -> bool {
        self.vel.y -= params.gravity * dt;
        self.pos += self.vel * dt;
        self.rotation += self.angular_vel * dt;

        self.vel *= params.damping;
        self.angular_vel *= params.damping;

        self.ttl_ticks = self.ttl_ticks.saturating_sub(1);
        self.ttl_ticks > 0
    }
}
