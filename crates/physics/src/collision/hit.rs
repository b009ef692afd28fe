//! Cast directions and hit records returned by the raycaster.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::layers::Layer;
use super::scene::{BodyId, RayHit};

/// The four directions a ray fan can be cast in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastDirection {
    Left,
    Right,
    Up,
    Down,
}

impl CastDirection {
    /// Order used by omnidirectional casts.
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    /// Unit vector of this direction.
    #[inline]
    pub fn vector(self) -> Vec2 {
        match self {
            Self::Left => Vec2::NEG_X,
            Self::Right => Vec2::X,
            Self::Up => Vec2::Y,
            Self::Down => Vec2::NEG_Y,
        }
    }

    /// Up or Down.
    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    /// Direction matching the sign of a horizontal displacement.
    #[inline]
    pub fn horizontal(dx: f32) -> Self {
        if dx > 0.0 { Self::Right } else { Self::Left }
    }

    /// Direction matching the sign of a vertical displacement.
    #[inline]
    pub fn vertical(dy: f32) -> Self {
        if dy > 0.0 { Self::Up } else { Self::Down }
    }
}

/// Result of casting a ray fan.
///
/// `hit` is `None` when no ray in the fan found a qualifying collider. That
/// is the normal outcome of an unobstructed cast, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    /// Direction the fan was cast in.
    pub direction: CastDirection,

    /// Origin of the ray that produced the hit.
    ///
    /// Without a hit, this is the origin of the last ray cast.
    pub ray_origin: Vec2,

    /// Geometry of the accepted hit.
    pub hit: Option<RayHit>,
}

impl HitRecord {
    /// An empty record for a cast that found nothing.
    pub fn miss(direction: CastDirection, ray_origin: Vec2) -> Self {
        Self {
            direction,
            ray_origin,
            hit: None,
        }
    }

    /// A record for an accepted hit.
    pub fn hit(direction: CastDirection, ray_origin: Vec2, hit: RayHit) -> Self {
        Self {
            direction,
            ray_origin,
            hit: Some(hit),
        }
    }

    /// Check if this cast hit something.
    #[inline]
    pub fn did_hit(&self) -> bool {
        self.hit.is_some()
    }

    /// Body that was struck, if any.
    #[inline]
    pub fn body(&self) -> Option<BodyId> {
        self.hit.map(|hit| hit.body)
    }

    #[inline]
    pub fn point(&self) -> Option<Vec2> {
        self.hit.map(|hit| hit.point)
    }

    #[inline]
    pub fn normal(&self) -> Option<Vec2> {
        self.hit.map(|hit| hit.normal)
    }

    #[inline]
    pub fn distance(&self) -> Option<f32> {
        self.hit.map(|hit| hit.distance)
    }

    #[inline]
    pub fn layer(&self) -> Option<Layer> {
        self.hit.map(|hit| hit.layer)
    }
}
