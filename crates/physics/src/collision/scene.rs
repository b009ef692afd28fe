//! The scene query service the movement core runs against.
//!
//! The raycaster and motion controllers never own geometry. They address
//! bodies by [`BodyId`] and go through [`PhysicsScene`] for every ray test,
//! layer swap, and translation. [`CollisionWorld`](super::CollisionWorld) is
//! the in-crate implementation; an engine integration provides its own.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::layers::{Layer, LayerMask};

/// Handle to a body in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// World placement of a body. No rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    /// World position of the body's pivot.
    pub position: Vec2,
    /// Local scale. Negative values mirror the collider offset.
    pub scale: Vec2,
}

impl Transform2D {
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            scale: Vec2::ONE,
        }
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::from_position(Vec2::ZERO)
    }
}

/// Axis-aligned box collider, in the body's local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxCollider {
    /// Center of the box relative to the body pivot.
    #[serde(default)]
    pub offset: Vec2,
    /// Full width and height.
    pub size: Vec2,
    /// Marker volume: reported by ray tests but never blocks movement.
    #[serde(default)]
    pub is_trigger: bool,
}

impl BoxCollider {
    /// A solid box centered on the pivot.
    pub fn new(size: Vec2) -> Self {
        Self {
            offset: Vec2::ZERO,
            size,
            is_trigger: false,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Half extents in world units under the given transform.
    #[inline]
    pub fn world_half_extents(&self, transform: &Transform2D) -> Vec2 {
        self.size * transform.scale.abs() * 0.5
    }

    /// World-space center under the given transform.
    #[inline]
    pub fn world_center(&self, transform: &Transform2D) -> Vec2 {
        transform.position + self.offset * transform.scale
    }
}

/// Nearest intersection reported by a scene ray test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    /// Body owning the collider that was struck.
    pub body: BodyId,
    /// Impact point in world space.
    pub point: Vec2,
    /// Surface normal at the impact point.
    pub normal: Vec2,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
    /// Layer of the struck body at query time.
    pub layer: Layer,
    /// Whether the struck collider is a trigger volume.
    pub is_trigger: bool,
}

/// Ray and transform queries the movement core needs from a scene.
pub trait PhysicsScene {
    /// Nearest collider along the ray within `max_distance` that `accept`
    /// agrees to.
    ///
    /// Only bodies whose layer is in `mask` are considered. Rejected hits do
    /// not end the search: a collider further along the same ray can still
    /// be returned.
    fn raycast_filtered(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
        accept: &dyn Fn(&RayHit) -> bool,
    ) -> Option<RayHit>;

    /// Nearest collider along the ray within `max_distance`.
    ///
    /// Triggers are reported like any other collider.
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        self.raycast_filtered(origin, direction, max_distance, mask, &|_| true)
    }

    /// Current layer of a body.
    fn body_layer(&self, body: BodyId) -> Option<Layer>;

    /// Move a body to another layer.
    fn set_body_layer(&mut self, body: BodyId, layer: Layer);

    /// World placement of a body.
    fn transform(&self, body: BodyId) -> Option<Transform2D>;

    /// The box collider attached to a body.
    fn box_collider(&self, body: BodyId) -> Option<BoxCollider>;

    /// Translate a body in world space.
    fn translate(&mut self, body: BodyId, delta: Vec2);
}

/// Run `query` with `body` parked on `scratch`, restoring its layer after.
///
/// The swap and the restore happen inside this call, so no other query can
/// observe the body on the scratch layer.
pub fn with_scratch_layer<S, R>(
    scene: &mut S,
    body: BodyId,
    scratch: Layer,
    query: impl FnOnce(&S) -> R,
) -> R
where
    S: PhysicsScene + ?Sized,
{
    let former = scene.body_layer(body);
    if former.is_some() {
        scene.set_body_layer(body, scratch);
    }

    let result = query(scene);

    if let Some(layer) = former {
        scene.set_body_layer(body, layer);
    }
    result
}
