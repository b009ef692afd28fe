//! Kinematic movement on top of the raycaster.
//!
//! This module implements platformer-style movement with:
//!
//! - Axis-separated resolution (horizontal, then vertical)
//! - Horizontal hits that cancel the x component outright
//! - Vertical hits that clamp the body to rest one skin width off a surface
//! - Per-side collision flags and synchronous collision events
//! - Carrying: riders follow the controller they stand on
//!
//! # Design
//!
//! A [`MotionController`] resolves one body. A [`ControllerSet`] owns all
//! controllers of a scene and maintains the carrying links between them as
//! arena handles, so no controller ever owns another.

mod carrying;
mod config;
mod controller;
mod events;
mod flags;

pub use carrying::{ControllerId, ControllerSet};
pub use config::MotionConfig;
pub use controller::MotionController;
pub use events::{
    CollisionChannel, CollisionEvents, CollisionSubscriber, SubscriberError, SubscriptionId,
};
pub use flags::CollisionFlags;
