//! Waypoint paths for moving platforms.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A closed loop of waypoints travelled at constant speed.
///
/// The path only produces displacements; the simulation feeds them through
/// the platform's motion controller so riders are carried along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointPath {
    /// Points visited in order, wrapping back to the first.
    pub points: Vec<Vec2>,

    /// Travel speed in units per second.
    pub speed: f32,

    #[serde(skip)]
    target: usize,
}

impl WaypointPath {
    /// Distance at which a waypoint counts as reached.
    pub const ARRIVAL_THRESHOLD: f32 = 0.1;

    pub fn new(points: Vec<Vec2>, speed: f32) -> Self {
        Self {
            points,
            speed,
            target: 0,
        }
    }

    /// Paths with fewer than two points never move.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.points.len() >= 2
    }

    /// Index of the waypoint currently headed for.
    #[inline]
    pub fn target_index(&self) -> usize {
        self.target
    }

    pub fn target(&self) -> Option<Vec2> {
        if !self.is_active() {
            return None;
        }
        self.points.get(self.target).copied()
    }

    /// Displacement toward the current target for one step of `dt` seconds.
    ///
    /// Never overshoots the target.
    pub fn displacement(&self, position: Vec2, dt: f32) -> Vec2 {
        let Some(target) = self.target() else {
            return Vec2::ZERO;
        };

        let to_target = target - position;
        let step = self.speed * dt;
        if to_target.length() <= step {
            return to_target;
        }
        to_target.normalize_or_zero() * step
    }

    /// Advance to the next waypoint once `position` is close enough.
    ///
    /// Returns true when the target changed.
    pub fn update_target(&mut self, position: Vec2) -> bool {
        let Some(target) = self.target() else {
            return false;
        };
        if position.distance(target) >= Self::ARRIVAL_THRESHOLD {
            return false;
        }

        self.target = (self.target + 1) % self.points.len();
        log::trace!("waypoint reached, heading for #{}", self.target);
        true
    }
}
