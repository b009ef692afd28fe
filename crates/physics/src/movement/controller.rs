//! Kinematic motion controller.
//!
//! A controller takes a desired displacement each step and resolves it
//! against the scene one axis at a time: horizontal first, then vertical.
//! Obstructions found by the [`Raycaster`] either cancel the horizontal
//! component or clamp the vertical one, and the result is applied to the
//! body in a single translation.
//!
//! Carrying (riding moving platforms) needs access to other controllers and
//! lives in [`ControllerSet`](super::ControllerSet).

use glam::Vec2;

use crate::collision::{BodyId, CastDirection, HitRecord, PhysicsScene, Raycaster};
use crate::error::ControllerError;

use super::carrying::ControllerId;
use super::config::MotionConfig;
use super::events::{CollisionChannel, CollisionEvents, SubscriberError, SubscriptionId};
use super::flags::CollisionFlags;

/// Moves one body through the scene with raycast collision.
///
/// # Example
///
/// ```ignore
/// let mut controller = MotionController::new(body, MotionConfig::default(), &world)?;
///
/// // Each step:
/// controller.move_by(&mut world, velocity * dt);
/// if controller.is_grounded() { /* ... */ }
/// ```
#[derive(Debug)]
pub struct MotionController {
    body: BodyId,
    raycaster: Raycaster,
    flags: CollisionFlags,
    /// Copied from the raycaster at construction.
    skin_width: f32,
    can_be_carried: bool,
    carry_reach: f32,
    pub(super) parent: Option<ControllerId>,
    pub(super) children: Vec<ControllerId>,
    events: CollisionEvents,
}

impl MotionController {
    /// Build a controller for a body.
    ///
    /// Fails fast on invalid configuration or a missing/degenerate collider.
    pub fn new<S>(body: BodyId, config: MotionConfig, scene: &S) -> Result<Self, ControllerError>
    where
        S: PhysicsScene + ?Sized,
    {
        config.validate()?;

        let carry_reach = config.carry_reach();
        let raycaster = Raycaster::new(body, config.raycaster, scene)?;

        Ok(Self {
            body,
            skin_width: raycaster.skin_width(),
            raycaster,
            flags: CollisionFlags::default(),
            can_be_carried: config.can_be_carried,
            carry_reach,
            parent: None,
            children: Vec::new(),
            events: CollisionEvents::new(),
        })
    }

    #[inline]
    pub fn body(&self) -> BodyId {
        self.body
    }

    /// Collision flags from the last move.
    #[inline]
    pub fn flags(&self) -> CollisionFlags {
        self.flags
    }

    /// Blocked below during the last move.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.flags.down()
    }

    #[inline]
    pub fn skin_width(&self) -> f32 {
        self.skin_width
    }

    #[inline]
    pub fn raycaster(&self) -> &Raycaster {
        &self.raycaster
    }

    /// For omnidirectional casts outside of movement, e.g. before a teleport.
    #[inline]
    pub fn raycaster_mut(&mut self) -> &mut Raycaster {
        &mut self.raycaster
    }

    #[inline]
    pub fn can_be_carried(&self) -> bool {
        self.can_be_carried
    }

    pub fn set_can_be_carried(&mut self, value: bool) {
        self.can_be_carried = value;
    }

    /// Controller this one currently rests on.
    #[inline]
    pub fn parent(&self) -> Option<ControllerId> {
        self.parent
    }

    /// Controllers currently resting on this one.
    #[inline]
    pub fn children(&self) -> &[ControllerId] {
        &self.children
    }

    pub fn events(&self) -> &CollisionEvents {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut CollisionEvents {
        &mut self.events
    }

    /// Shorthand for `events_mut().subscribe(..)`.
    pub fn subscribe<F>(&mut self, channel: CollisionChannel, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&HitRecord) -> Result<(), SubscriberError> + 'static,
    {
        self.events.subscribe(channel, subscriber)
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Current world position of the body.
    pub fn position<S: PhysicsScene + ?Sized>(&self, scene: &S) -> Option<Vec2> {
        scene.transform(self.body).map(|transform| transform.position)
    }

    /// World Y of the collider's lower edge.
    pub fn bottom<S: PhysicsScene + ?Sized>(&self, scene: &S) -> Option<f32> {
        let transform = scene.transform(self.body)?;
        let collider = scene.box_collider(self.body)?;
        Some(collider.world_center(&transform).y - collider.world_half_extents(&transform).y)
    }

    /// World Y of the collider's upper edge.
    pub fn top<S: PhysicsScene + ?Sized>(&self, scene: &S) -> Option<f32> {
        let transform = scene.transform(self.body)?;
        let collider = scene.box_collider(self.body)?;
        Some(collider.world_center(&transform).y + collider.world_half_extents(&transform).y)
    }

    /// Body position minus the lower edge.
    pub fn bottom_delta<S: PhysicsScene + ?Sized>(&self, scene: &S) -> Option<f32> {
        Some(self.position(scene)?.y - self.bottom(scene)?)
    }

    /// Body position minus the upper edge.
    pub fn top_delta<S: PhysicsScene + ?Sized>(&self, scene: &S) -> Option<f32> {
        Some(self.position(scene)?.y - self.top(scene)?)
    }

    // ========================================================================
    // Movement
    // ========================================================================

    /// Resolve and apply a displacement for this controller alone.
    ///
    /// Carried children are not moved; go through
    /// [`ControllerSet::move_controller`](super::ControllerSet::move_controller)
    /// for that. Returns the displacement actually applied.
    pub fn move_by<S>(&mut self, scene: &mut S, displacement: Vec2) -> Vec2
    where
        S: PhysicsScene + ?Sized,
    {
        let mut delta = displacement;

        self.flags.reset();

        let cast_horizontally = delta.x != 0.0;
        if cast_horizontally {
            self.move_horizontally(&mut *scene, &mut delta);
        }

        if delta.y != 0.0 {
            // Reuse the horizontal snapshot; nothing has moved since.
            self.move_vertically(&mut *scene, &mut delta, !cast_horizontally);
        }

        scene.translate(self.body, delta);
        delta
    }

    fn move_horizontally<S>(&mut self, scene: &mut S, delta: &mut Vec2)
    where
        S: PhysicsScene + ?Sized,
    {
        let length = delta.x.abs() + self.skin_width;
        let direction = CastDirection::horizontal(delta.x);

        let record = self.raycaster.cast(scene, direction, length, true);
        if !record.did_hit() {
            return;
        }

        // No partial slide: stop dead at the obstruction.
        delta.x = 0.0;

        let flag = match direction {
            CastDirection::Right => CollisionFlags::RIGHT,
            _ => CollisionFlags::LEFT,
        };
        self.flags.set(flag, true);

        self.events.emit(CollisionChannel::Any, &record);
        self.events.emit(CollisionChannel::Horizontal, &record);
    }

    fn move_vertically<S>(&mut self, scene: &mut S, delta: &mut Vec2, refresh_origins: bool)
    where
        S: PhysicsScene + ?Sized,
    {
        let length = delta.y.abs() + self.skin_width;
        let direction = CastDirection::vertical(delta.y);

        let record = self.raycaster.cast(scene, direction, length, refresh_origins);
        let Some(hit) = record.hit else {
            return;
        };

        // Land the skin-shrunk edge exactly one skin width off the surface.
        delta.y = hit.point.y - record.ray_origin.y;
        if direction == CastDirection::Up {
            delta.y -= self.skin_width;
            self.flags.set(CollisionFlags::UP, true);
        } else {
            delta.y += self.skin_width;
            self.flags.set(CollisionFlags::DOWN, true);
        }

        self.events.emit(CollisionChannel::Any, &record);
        self.events.emit(CollisionChannel::Vertical, &record);
    }

    /// Cast straight down for the body this controller stands on.
    pub fn find_ground<S>(&mut self, scene: &mut S) -> Option<BodyId>
    where
        S: PhysicsScene + ?Sized,
    {
        self.raycaster
            .cast(scene, CastDirection::Down, self.carry_reach, true)
            .body()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::collision::{CollisionWorld, Layer, LayerMask, RaycasterConfig};

    const SKIN: f32 = 0.02;
    const EPSILON: f32 = 1e-4;

    /// World with a floor whose top surface is at y=0 and a wall whose left
    /// face is at x=5.
    fn create_test_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_box(Vec2::new(0.0, -0.5), Vec2::new(100.0, 1.0), Layer::DEFAULT);
        world.add_box(Vec2::new(5.5, 5.0), Vec2::new(1.0, 10.0), Layer::DEFAULT);
        world
    }

    fn spawn(world: &mut CollisionWorld, position: Vec2) -> MotionController {
        let body = world.add_box(position, Vec2::new(1.0, 2.0), Layer::DEFAULT);
        MotionController::new(body, MotionConfig::default(), &*world).expect("valid controller")
    }

    #[test]
    fn test_free_move_applies_full_displacement() {
        let mut world = create_test_world();
        let mut controller = spawn(&mut world, Vec2::new(0.0, 5.0));

        let applied = controller.move_by(&mut world, Vec2::new(0.5, 0.25));

        assert_eq!(applied, Vec2::new(0.5, 0.25));
        assert_eq!(controller.position(&world), Some(Vec2::new(0.5, 5.25)));
        assert!(!controller.flags().any());
    }

    #[test]
    fn test_falling_body_lands_on_floor() {
        // Box of height 2 at y=5 falling 1 onto a floor whose top is 3.5.
        let mut world = CollisionWorld::new();
        let floor = world.add_box(Vec2::new(0.0, 3.0), Vec2::new(10.0, 1.0), Layer::DEFAULT);
        let mut controller = spawn(&mut world, Vec2::new(0.0, 5.0));

        controller.move_by(&mut world, Vec2::new(0.0, -1.0));

        assert!(controller.is_grounded());
        let position = controller.position(&world).unwrap();
        // Skin-shrunk bottom edge rests at 3.52, half shrunk height is 0.98.
        assert!((position.y - (3.52 + 0.98)).abs() < EPSILON, "y = {}", position.y);
        assert!((controller.bottom(&world).unwrap() - 3.5).abs() < EPSILON);

        // Resting is idempotent, however hard we push down.
        for push in [0.5, 2.0, 10.0] {
            controller.move_by(&mut world, Vec2::new(0.0, -push));
            assert!(controller.is_grounded());
            assert!((controller.position(&world).unwrap().y - 4.5).abs() < EPSILON);
        }

        assert_eq!(controller.find_ground(&mut world), Some(floor));
    }

    #[test]
    fn test_horizontal_block_cancels_x_only() {
        let mut world = create_test_world();
        // Right edge at x=4.6, wall at x=5.
        let mut controller = spawn(&mut world, Vec2::new(4.1, 3.0));

        let applied = controller.move_by(&mut world, Vec2::new(1.0, 0.5));

        assert_eq!(applied.x, 0.0);
        assert_eq!(applied.y, 0.5);
        assert!(controller.flags().right());
        assert!(!controller.flags().left());
        assert_eq!(controller.position(&world), Some(Vec2::new(4.1, 3.5)));
    }

    #[test]
    fn test_far_obstruction_does_not_block() {
        let mut world = create_test_world();
        let mut controller = spawn(&mut world, Vec2::new(0.0, 3.0));

        // Wall is 4.5 away; moving 1.0 does not reach it.
        let applied = controller.move_by(&mut world, Vec2::new(1.0, 0.0));
        assert_eq!(applied.x, 1.0);
        assert!(!controller.flags().right());
    }

    #[test]
    fn test_ceiling_clamps_upward_move() {
        let mut world = CollisionWorld::new();
        // Ceiling underside at y=4.
        world.add_box(Vec2::new(0.0, 4.5), Vec2::new(10.0, 1.0), Layer::DEFAULT);
        let mut controller = spawn(&mut world, Vec2::new(0.0, 2.0));

        controller.move_by(&mut world, Vec2::new(0.0, 3.0));

        assert!(controller.flags().up());
        assert!(!controller.is_grounded());
        assert!((controller.top(&world).unwrap() - 4.0).abs() < EPSILON);
    }

    #[test]
    fn test_flags_reset_each_move() {
        let mut world = create_test_world();
        let mut controller = spawn(&mut world, Vec2::new(0.0, 1.0));

        controller.move_by(&mut world, Vec2::new(0.0, -1.0));
        assert!(controller.is_grounded());

        controller.move_by(&mut world, Vec2::new(0.0, 1.0));
        assert!(!controller.is_grounded());
        assert!(!controller.flags().any());
    }

    #[test]
    fn test_events_fire_per_axis() {
        let mut world = create_test_world();
        let mut controller = spawn(&mut world, Vec2::new(4.1, 1.2));

        let log = Rc::new(RefCell::new(Vec::new()));
        for (channel, name) in [
            (CollisionChannel::Any, "any"),
            (CollisionChannel::Horizontal, "horizontal"),
            (CollisionChannel::Vertical, "vertical"),
        ] {
            let log = Rc::clone(&log);
            controller.subscribe(channel, move |record| {
                log.borrow_mut().push((name, record.direction));
                Ok(())
            });
        }

        // Into the wall and the floor at once.
        controller.move_by(&mut world, Vec2::new(1.0, -1.0));

        assert_eq!(
            *log.borrow(),
            vec![
                ("any", CastDirection::Right),
                ("horizontal", CastDirection::Right),
                ("any", CastDirection::Down),
                ("vertical", CastDirection::Down),
            ]
        );
    }

    #[test]
    fn test_failing_subscriber_does_not_abort_move() {
        let mut world = create_test_world();
        let mut controller = spawn(&mut world, Vec2::new(0.0, 1.5));

        controller.subscribe(CollisionChannel::Any, |_| Err("subscriber broke".into()));

        controller.move_by(&mut world, Vec2::new(0.0, -2.0));
        assert!(controller.is_grounded());
        assert!((controller.bottom(&world).unwrap()).abs() < EPSILON);
    }

    #[test]
    fn test_one_way_platform_passable_from_below() {
        let one_way = Layer(8);
        let mut world = CollisionWorld::new();
        // Thin platform, top at y=3.
        world.add_box(Vec2::new(0.0, 2.9), Vec2::new(10.0, 0.2), one_way);

        let body = world.add_box(Vec2::new(0.0, 1.0), Vec2::new(1.0, 2.0), Layer::DEFAULT);
        let config = MotionConfig {
            raycaster: RaycasterConfig {
                solid_layers: LayerMask::DEFAULT.with(one_way),
                one_way_layers: one_way.mask(),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut controller = MotionController::new(body, config, &world).unwrap();

        // Jump up through the platform.
        controller.move_by(&mut world, Vec2::new(0.0, 3.0));
        assert!(!controller.flags().up());
        assert!((controller.bottom(&world).unwrap() - 3.0).abs() < EPSILON);

        // Fall back onto it.
        controller.move_by(&mut world, Vec2::new(0.0, -0.5));
        assert!(controller.is_grounded());
        assert!((controller.bottom(&world).unwrap() - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_edge_accessors() {
        let mut world = CollisionWorld::new();
        let body = world.add_body(
            crate::collision::Transform2D {
                position: Vec2::new(0.0, 10.0),
                scale: Vec2::new(1.0, 2.0),
            },
            crate::collision::BoxCollider::new(Vec2::new(1.0, 1.0))
                .with_offset(Vec2::new(0.0, 0.5)),
            Layer::DEFAULT,
        );
        let controller = MotionController::new(body, MotionConfig::default(), &world).unwrap();

        assert!((controller.bottom(&world).unwrap() - 10.0).abs() < EPSILON);
        assert!((controller.top(&world).unwrap() - 12.0).abs() < EPSILON);
        assert!(controller.bottom_delta(&world).unwrap().abs() < EPSILON);
        assert!((controller.top_delta(&world).unwrap() + 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_skin_width_copied_from_raycaster() {
        let mut world = CollisionWorld::new();
        let controller = spawn(&mut world, Vec2::ZERO);
        assert_eq!(controller.skin_width(), SKIN);
        assert_eq!(controller.skin_width(), controller.raycaster().skin_width());
    }
}
