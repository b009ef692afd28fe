//! Gravity-driven actors.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use platformer_physics::{CollisionFlags, ControllerId};
use serde::{Deserialize, Serialize};

/// Per-actor movement tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Downward acceleration in units per second squared.
    pub gravity: f32,

    /// Terminal fall speed.
    pub max_fall_speed: f32,

    /// Horizontal patrol speed. Zero stands still.
    pub walk_speed: f32,

    /// Reverse the patrol direction after bumping into a wall.
    pub turn_at_walls: bool,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            gravity: 30.0,
            max_fall_speed: 20.0,
            walk_speed: 0.0,
            turn_at_walls: true,
        }
    }
}

/// Collision counters fed by the controller's collision events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActorStats {
    /// Downward hits after at least one move without ground below.
    pub landings: u32,
    pub ceiling_hits: u32,
    pub wall_hits: u32,
    /// No ground below after the last move.
    pub airborne: bool,
}

/// Shared between an actor and its event subscribers.
pub type SharedStats = Rc<RefCell<ActorStats>>;

/// A body that falls under gravity and optionally patrols sideways.
#[derive(Debug, Clone)]
pub struct GravityActor {
    pub name: String,
    pub controller: ControllerId,
    pub config: ActorConfig,
    pub velocity: Vec2,
    /// +1 walking right, -1 walking left.
    facing: f32,
    stats: SharedStats,
}

impl GravityActor {
    pub fn new(name: impl Into<String>, controller: ControllerId, config: ActorConfig) -> Self {
        Self {
            name: name.into(),
            controller,
            config,
            velocity: Vec2::ZERO,
            facing: 1.0,
            stats: Rc::new(RefCell::new(ActorStats {
                airborne: true,
                ..Default::default()
            })),
        }
    }

    #[inline]
    pub fn facing(&self) -> f32 {
        self.facing
    }

    pub fn stats(&self) -> ActorStats {
        *self.stats.borrow()
    }

    /// Handle for event subscribers to update the counters.
    pub fn shared_stats(&self) -> SharedStats {
        Rc::clone(&self.stats)
    }

    /// Launch upward, replacing any vertical velocity.
    pub fn jump(&mut self, speed: f32) {
        self.velocity.y = speed;
    }

    /// Integrate velocity for one step and return the displacement to move.
    pub fn displacement(&mut self, dt: f32) -> Vec2 {
        self.velocity.x = self.config.walk_speed * self.facing;
        self.velocity.y =
            (self.velocity.y - self.config.gravity * dt).max(-self.config.max_fall_speed);
        self.velocity * dt
    }

    /// React to the flags of the move just made.
    pub fn after_move(&mut self, flags: CollisionFlags) {
        if flags.down() || flags.up() {
            self.velocity.y = 0.0;
        }
        if flags.horizontal() && self.config.turn_at_walls {
            self.facing = if flags.right() { -1.0 } else { 1.0 };
        }

        self.stats.borrow_mut().airborne = !flags.down();
    }
}
