//! Platformer Physics
//!
//! Raycast-based 2D kinematic movement for platformer characters. Bodies are
//! axis-aligned boxes; movement is resolved with fans of parallel rays
//! instead of rigid-body simulation.
//!
//! # Architecture
//!
//! The crate is split into two systems:
//!
//! - **Collision**: the scene interface, a box world, and the raycaster that
//!   samples collider edges with ray fans
//! - **Movement**: motion controllers that use those casts to resolve a
//!   displacement per step, plus the carrying hierarchy for moving platforms
//!
//! # Step Order
//!
//! 1. The driver computes a displacement per controller and calls
//!    [`ControllerSet::move_controller`]
//! 2. After every controller moved, [`ControllerSet::update_all_carrying`]
//!    relinks riders to whatever they now stand on
//!
//! Everything runs synchronously on one thread.

pub mod collision;
pub mod error;
pub mod movement;

// Re-export commonly used types
pub use collision::{
    BodyId, BoxCollider, CastDirection, CollisionWorld, HitRecord, Layer, LayerMask, PhysicsScene,
    RayHit, Raycaster, RaycasterConfig, Transform2D,
};
pub use error::{ConfigError, ControllerError};
pub use movement::{
    CollisionChannel, CollisionFlags, ControllerId, ControllerSet, MotionConfig, MotionController,
};
