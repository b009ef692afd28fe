//! Collision queries for 2D kinematic movement.
//!
//! This module provides the scene interface, the in-crate collision world,
//! and the raycaster that samples box edges with fans of parallel rays.
//!
//! # Key Types
//!
//! - [`PhysicsScene`]: Ray test and transform service the core runs against
//! - [`CollisionWorld`]: A `parry2d`-backed scene of box bodies
//! - [`Raycaster`]: Casts ray fans from one body's collider edges
//! - [`HitRecord`]: Output from a ray fan cast
//!
//! # Self Exclusion
//!
//! Ray origins sit inside the casting body's own collider. Each ray is cast
//! with the body parked on a scratch layer outside the solid mask, so the
//! body cannot hit itself.

mod hit;
mod layers;
mod raycaster;
mod scene;
mod world;

pub use hit::{CastDirection, HitRecord};
pub use layers::{Layer, LayerMask};
pub use raycaster::{RayOrigins, Raycaster, RaycasterConfig};
pub use scene::{with_scratch_layer, BodyId, BoxCollider, PhysicsScene, RayHit, Transform2D};
pub use world::{Body, CollisionWorld};
