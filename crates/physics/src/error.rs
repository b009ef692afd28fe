//! Errors raised while setting up raycasters and controllers.
//!
//! Every error here is a load-time configuration fault. Runtime queries never
//! fail: a cast that finds nothing returns an empty
//! [`HitRecord`](crate::collision::HitRecord).

use thiserror::Error;

use crate::collision::BodyId;
use crate::movement::ControllerId;

/// Invalid values in a [`RaycasterConfig`](crate::collision::RaycasterConfig).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{fan} ray fan needs at least 2 rays, got {count}")]
    TooFewRays { fan: &'static str, count: u32 },

    #[error("skin width must be finite and non-negative, got {0}")]
    InvalidSkinWidth(f32),

    #[error("scratch layer {0} is out of range (0..=31)")]
    ScratchLayerOutOfRange(u8),

    #[error("scratch layer {0} is part of the solid mask, casts would hit their own body")]
    ScratchLayerIsSolid(u8),

    #[error("carry reach must be finite and positive, got {0}")]
    InvalidCarryReach(f32),
}

/// Failure to attach a raycaster or controller to a body.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControllerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("body {0:?} does not exist in the scene")]
    MissingBody(BodyId),

    #[error("body {0:?} has no box collider")]
    MissingCollider(BodyId),

    #[error(
        "collider of body {body:?} is too small ({width}x{height}) for skin width {skin_width}"
    )]
    DegenerateCollider {
        body: BodyId,
        width: f32,
        height: f32,
        skin_width: f32,
    },

    #[error("body {0:?} already has a motion controller")]
    BodyAlreadyControlled(BodyId),

    #[error("no controller with id {0:?}")]
    UnknownController(ControllerId),
}
