//! Collision world containing every body in the scene.
//!
//! Each body is a transform plus one axis-aligned box collider on a layer.
//! Ray queries go through `parry2d` cuboids built from the body's current
//! transform, so moving a body never requires rebuilding anything.

use glam::Vec2;
use parry2d::math::{Isometry, Point, Real, Vector};
use parry2d::query::{Ray, RayCast};
use parry2d::shape::Cuboid;

use super::layers::{Layer, LayerMask};
use super::scene::{BodyId, BoxCollider, PhysicsScene, RayHit, Transform2D};

/// A body in the collision world.
#[derive(Debug, Clone)]
pub struct Body {
    /// Unique identifier for this body.
    pub id: BodyId,
    /// World placement.
    pub transform: Transform2D,
    /// The attached box collider.
    pub collider: BoxCollider,
    /// Collision layer used for ray filtering.
    pub layer: Layer,
}

impl Body {
    fn cuboid(&self) -> Cuboid {
        let half = self.collider.world_half_extents(&self.transform);
        Cuboid::new(Vector::new(half.x, half.y))
    }

    fn isometry(&self) -> Isometry<Real> {
        let center = self.collider.world_center(&self.transform);
        Isometry::translation(center.x, center.y)
    }

    /// World-space axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let center = self.collider.world_center(&self.transform);
        let half = self.collider.world_half_extents(&self.transform);
        (center - half, center + half)
    }
}

/// The collision world containing all bodies.
///
/// # Thread Safety
///
/// Queries take `&self`; only layer swaps and translations mutate. The
/// movement core drives it from a single thread.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    bodies: Vec<Body>,
    next_id: u32,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a body with an explicit transform and collider.
    pub fn add_body(
        &mut self,
        transform: Transform2D,
        collider: BoxCollider,
        layer: Layer,
    ) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;

        self.bodies.push(Body {
            id,
            transform,
            collider,
            layer,
        });

        id
    }

    /// Add a solid box centered at `center`.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the box in world space
    /// * `size` - Full width and height
    /// * `layer` - Collision layer
    pub fn add_box(&mut self, center: Vec2, size: Vec2, layer: Layer) -> BodyId {
        self.add_body(Transform2D::from_position(center), BoxCollider::new(size), layer)
    }

    /// Add a trigger volume centered at `center`.
    pub fn add_trigger(&mut self, center: Vec2, size: Vec2, layer: Layer) -> BodyId {
        self.add_body(
            Transform2D::from_position(center),
            BoxCollider::new(size).trigger(),
            layer,
        )
    }

    /// Remove a body. Returns whether it existed.
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        let before = self.bodies.len();
        self.bodies.retain(|body| body.id != id);
        self.bodies.len() != before
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|body| body.id == id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|body| body.id == id)
    }

    /// Teleport a body.
    pub fn set_position(&mut self, id: BodyId, position: Vec2) {
        if let Some(body) = self.body_mut(id) {
            body.transform.position = position;
        }
    }

    /// Position of a body, if it exists.
    pub fn position(&self, id: BodyId) -> Option<Vec2> {
        self.body(id).map(|body| body.transform.position)
    }

    /// Get the number of bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Remove every body.
    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }
}

impl PhysicsScene for CollisionWorld {
    fn raycast_filtered(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
        accept: &dyn Fn(&RayHit) -> bool,
    ) -> Option<RayHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec2::ZERO || max_distance <= 0.0 {
            return None;
        }

        let ray = Ray::new(Point::new(origin.x, origin.y), Vector::new(dir.x, dir.y));

        let mut closest: Option<RayHit> = None;

        for body in &self.bodies {
            if !mask.contains(body.layer) {
                continue;
            }

            let cuboid = body.cuboid();
            let isometry = body.isometry();

            let Some(distance) = cuboid.cast_ray(&isometry, &ray, max_distance, true) else {
                continue;
            };
            if closest.as_ref().is_some_and(|best| best.distance <= distance) {
                continue;
            }

            let hit = RayHit {
                body: body.id,
                point: origin + dir * distance,
                normal: surface_normal(&cuboid, &isometry, &ray, distance).unwrap_or(-dir),
                distance,
                layer: body.layer,
                is_trigger: body.collider.is_trigger,
            };
            if accept(&hit) {
                closest = Some(hit);
            }
        }

        closest
    }

    fn body_layer(&self, body: BodyId) -> Option<Layer> {
        self.body(body).map(|body| body.layer)
    }

    fn set_body_layer(&mut self, body: BodyId, layer: Layer) {
        if let Some(body) = self.body_mut(body) {
            body.layer = layer;
        }
    }

    fn transform(&self, body: BodyId) -> Option<Transform2D> {
        self.body(body).map(|body| body.transform)
    }

    fn box_collider(&self, body: BodyId) -> Option<BoxCollider> {
        self.body(body).map(|body| body.collider)
    }

    fn translate(&mut self, body: BodyId, delta: Vec2) {
        if let Some(body) = self.body_mut(body) {
            body.transform.position += delta;
        }
    }
}

/// Outward normal where `ray` meets `cuboid`. `None` when the ray starts
/// inside the box.
fn surface_normal(
    cuboid: &Cuboid,
    isometry: &Isometry<Real>,
    ray: &Ray,
    distance: Real,
) -> Option<Vec2> {
    cuboid
        .cast_ray_and_get_normal(isometry, ray, distance + 0.01, true)
        .map(|intersection| Vec2::new(intersection.normal.x, intersection.normal.y))
        .filter(|normal| *normal != Vec2::ZERO)
}
