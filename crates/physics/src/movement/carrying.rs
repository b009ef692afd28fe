//! Controller arena and the carrying hierarchy.
//!
//! Controllers standing on another controller ride along with it. The
//! relation is stored as arena handles: each controller has at most one
//! parent and any number of children.
//!
//! ```text
//!   platform.move(Δ)
//!     ├─► rider.move(Δ)          (children first, with the raw Δ)
//!     │     └─► crate.move(Δ)    (cascade)
//!     └─► platform resolves its own collision
//! ```
//!
//! Links are rebuilt once per step by [`ControllerSet::update_carrying`],
//! after every controller has moved.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::{BodyId, PhysicsScene};
use crate::error::ControllerError;

use super::config::MotionConfig;
use super::controller::MotionController;

/// Handle to a controller in a [`ControllerSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControllerId(pub u32);

/// Owns every motion controller in a scene.
#[derive(Debug, Default)]
pub struct ControllerSet {
    slots: Vec<Option<MotionController>>,
    by_body: HashMap<BodyId, ControllerId>,
}

impl ControllerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a controller for `body` and add it.
    pub fn spawn<S>(
        &mut self,
        body: BodyId,
        config: MotionConfig,
        scene: &S,
    ) -> Result<ControllerId, ControllerError>
    where
        S: PhysicsScene + ?Sized,
    {
        let controller = MotionController::new(body, config, scene)?;
        self.insert(controller)
    }

    /// Add a controller. A body can only have one.
    pub fn insert(
        &mut self,
        mut controller: MotionController,
    ) -> Result<ControllerId, ControllerError> {
        let body = controller.body();
        if self.by_body.contains_key(&body) {
            return Err(ControllerError::BodyAlreadyControlled(body));
        }

        // Links from another arena mean nothing here.
        controller.parent = None;
        controller.children.clear();

        let id = ControllerId(self.slots.len() as u32);
        self.slots.push(Some(controller));
        self.by_body.insert(body, id);
        Ok(id)
    }

    /// Remove a controller, tearing down its links on both sides.
    ///
    /// Its children are left without a parent until the next carrying pass.
    pub fn remove(&mut self, id: ControllerId) -> Option<MotionController> {
        self.unlink(id);

        let mut controller = self.slots.get_mut(id.0 as usize)?.take()?;
        for child in controller.children.drain(..) {
            if let Some(child) = self.get_mut(child) {
                child.parent = None;
            }
        }
        self.by_body.remove(&controller.body());

        log::debug!("removed controller {id:?}");
        Some(controller)
    }

    pub fn get(&self, id: ControllerId) -> Option<&MotionController> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: ControllerId) -> Option<&mut MotionController> {
        self.slots.get_mut(id.0 as usize)?.as_mut()
    }

    /// Controller attached to a body, if any.
    pub fn controller_for_body(&self, body: BodyId) -> Option<ControllerId> {
        self.by_body.get(&body).copied()
    }

    /// Live controller handles, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = ControllerId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| ControllerId(index as u32))
    }

    pub fn len(&self) -> usize {
        self.by_body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_body.is_empty()
    }

    pub fn parent_of(&self, id: ControllerId) -> Option<ControllerId> {
        self.get(id)?.parent()
    }

    pub fn children_of(&self, id: ControllerId) -> &[ControllerId] {
        match self.get(id) {
            Some(controller) => controller.children(),
            None => &[],
        }
    }

    // ========================================================================
    // Movement
    // ========================================================================

    /// Move a controller and everything it carries.
    ///
    /// Children receive the same raw displacement before this controller
    /// resolves its own collisions, so riders keep pace with what the
    /// platform intended to do. Returns the displacement applied to `id`.
    pub fn move_controller<S>(
        &mut self,
        id: ControllerId,
        displacement: Vec2,
        scene: &mut S,
    ) -> Result<Vec2, ControllerError>
    where
        S: PhysicsScene + ?Sized,
    {
        let children = self
            .get(id)
            .ok_or(ControllerError::UnknownController(id))?
            .children
            .clone();

        for child in children {
            self.move_controller(child, displacement, &mut *scene)?;
        }

        let controller = self.get_mut(id).ok_or(ControllerError::UnknownController(id))?;
        Ok(controller.move_by(scene, displacement))
    }

    // ========================================================================
    // Carrying
    // ========================================================================

    /// Re-evaluate what `id` stands on and relink it.
    ///
    /// Does nothing for controllers that cannot be carried. Returns the
    /// parent after the update.
    pub fn update_carrying<S>(
        &mut self,
        id: ControllerId,
        scene: &mut S,
    ) -> Result<Option<ControllerId>, ControllerError>
    where
        S: PhysicsScene + ?Sized,
    {
        let controller = self.get_mut(id).ok_or(ControllerError::UnknownController(id))?;
        if !controller.can_be_carried() {
            return Ok(controller.parent());
        }

        let current = controller.parent();
        let ground = controller.find_ground(scene);
        let candidate = ground
            .and_then(|body| self.controller_for_body(body))
            .filter(|candidate| *candidate != id);

        if candidate == current {
            return Ok(current);
        }

        self.unlink(id);

        if let Some(parent) = candidate {
            if self.is_ancestor(id, parent) {
                log::warn!("controller {id:?} not linked to {parent:?}: it already carries it");
                return Ok(None);
            }
            self.link(id, parent);
        }

        Ok(candidate)
    }

    /// Run [`update_carrying`](Self::update_carrying) for every controller.
    pub fn update_all_carrying<S>(&mut self, scene: &mut S)
    where
        S: PhysicsScene + ?Sized,
    {
        let ids: Vec<ControllerId> = self.ids().collect();
        for id in ids {
            if let Err(err) = self.update_carrying(id, &mut *scene) {
                log::warn!("carrying update for controller {id:?} failed: {err}");
            }
        }
    }

    /// Clear `id`'s parent and remove it from that parent's children.
    pub fn unlink(&mut self, id: ControllerId) {
        let Some(parent) = self.get_mut(id).and_then(|controller| controller.parent.take()) else {
            return;
        };

        if let Some(parent_controller) = self.get_mut(parent) {
            parent_controller.children.retain(|child| *child != id);
        }
        log::debug!("controller {id:?} stopped riding {parent:?}");
    }

    fn link(&mut self, id: ControllerId, parent: ControllerId) {
        let Some(parent_controller) = self.get_mut(parent) else {
            return;
        };
        if !parent_controller.children.contains(&id) {
            parent_controller.children.push(id);
        }

        if let Some(controller) = self.get_mut(id) {
            controller.parent = Some(parent);
        }
        log::debug!("controller {id:?} now riding {parent:?}");
    }

    /// Whether `ancestor` is `id` or appears in `id`'s parent chain.
    fn is_ancestor(&self, ancestor: ControllerId, id: ControllerId) -> bool {
        let mut current = Some(id);
        // Bounded walk; a valid chain is never longer than the arena.
        for _ in 0..=self.slots.len() {
            match current {
                Some(node) if node == ancestor => return true,
                Some(node) => current = self.parent_of(node),
                None => return false,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionWorld, Layer};

    const EPSILON: f32 = 1e-4;

    struct Fixture {
        world: CollisionWorld,
        set: ControllerSet,
        platform: ControllerId,
        rider: ControllerId,
    }

    /// A 4x1 platform with its top at y=1 and a 1x2 rider standing on it.
    fn fixture() -> Fixture {
        let mut world = CollisionWorld::new();
        let platform_body = world.add_box(Vec2::new(0.0, 0.5), Vec2::new(4.0, 1.0), Layer::DEFAULT);
        let rider_body = world.add_box(Vec2::new(0.0, 2.0), Vec2::new(1.0, 2.0), Layer::DEFAULT);

        let mut set = ControllerSet::new();
        let platform = set.spawn(platform_body, MotionConfig::platform(), &world).unwrap();
        let rider = set.spawn(rider_body, MotionConfig::carryable(), &world).unwrap();

        Fixture {
            world,
            set,
            platform,
            rider,
        }
    }

    fn position(fx: &Fixture, id: ControllerId) -> Vec2 {
        fx.set.get(id).and_then(|c| c.position(&fx.world)).unwrap()
    }

    #[test]
    fn test_rider_links_to_platform() {
        let mut fx = fixture();

        let parent = fx.set.update_carrying(fx.rider, &mut fx.world).unwrap();

        assert_eq!(parent, Some(fx.platform));
        assert_eq!(fx.set.parent_of(fx.rider), Some(fx.platform));
        assert_eq!(fx.set.children_of(fx.platform), &[fx.rider]);
    }

    #[test]
    fn test_platform_is_never_carried() {
        let mut fx = fixture();
        fx.set.update_all_carrying(&mut fx.world);
        assert_eq!(fx.set.parent_of(fx.platform), None);
    }

    #[test]
    fn test_platform_carries_rider() {
        let mut fx = fixture();
        fx.set.update_carrying(fx.rider, &mut fx.world).unwrap();

        let before = position(&fx, fx.rider);
        fx.set
            .move_controller(fx.platform, Vec2::new(1.5, 0.0), &mut fx.world)
            .unwrap();

        assert_eq!(position(&fx, fx.rider), before + Vec2::new(1.5, 0.0));
        assert_eq!(position(&fx, fx.platform), Vec2::new(1.5, 0.5));
    }

    #[test]
    fn test_rider_gets_raw_displacement_when_platform_blocked() {
        let mut fx = fixture();
        // Wall beside the platform only, below the rider's feet.
        fx.world.add_box(Vec2::new(2.5, 0.5), Vec2::new(1.0, 1.0), Layer::DEFAULT);
        fx.set.update_carrying(fx.rider, &mut fx.world).unwrap();

        let applied = fx
            .set
            .move_controller(fx.platform, Vec2::new(0.3, 0.0), &mut fx.world)
            .unwrap();

        assert_eq!(applied, Vec2::ZERO);
        assert!(fx.set.get(fx.platform).unwrap().flags().right());
        assert!((position(&fx, fx.rider).x - 0.3).abs() < EPSILON);
    }

    #[test]
    fn test_rider_moves_before_platform_resolves() {
        use std::cell::RefCell;
        use std::rc::Rc;

        use crate::movement::CollisionChannel;

        let mut fx = fixture();
        fx.set.update_carrying(fx.rider, &mut fx.world).unwrap();

        // Floor under the platform so both controllers land when moving down.
        fx.world.add_box(Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0), Layer::DEFAULT);

        let order = Rc::new(RefCell::new(Vec::new()));
        for (id, name) in [(fx.platform, "platform"), (fx.rider, "rider")] {
            let order = Rc::clone(&order);
            fx.set.get_mut(id).unwrap().subscribe(CollisionChannel::Any, move |_| {
                order.borrow_mut().push(name);
                Ok(())
            });
        }

        fx.set
            .move_controller(fx.platform, Vec2::new(0.0, -0.5), &mut fx.world)
            .unwrap();

        // Rider casts first and lands on the platform where it still is.
        assert_eq!(*order.borrow(), vec!["rider", "platform"]);
    }

    #[test]
    fn test_rider_unlinks_when_platform_leaves() {
        let mut fx = fixture();
        fx.set.update_carrying(fx.rider, &mut fx.world).unwrap();

        // Slide the platform out from under the rider without carrying it.
        let platform_body = fx.set.get(fx.platform).unwrap().body();
        fx.world.set_position(platform_body, Vec2::new(10.0, 0.5));

        let parent = fx.set.update_carrying(fx.rider, &mut fx.world).unwrap();

        assert_eq!(parent, None);
        assert_eq!(fx.set.parent_of(fx.rider), None);
        assert!(fx.set.children_of(fx.platform).is_empty());
    }

    #[test]
    fn test_rider_switches_platforms() {
        let mut fx = fixture();
        fx.set.update_carrying(fx.rider, &mut fx.world).unwrap();

        let other_body = fx
            .world
            .add_box(Vec2::new(10.0, 0.5), Vec2::new(4.0, 1.0), Layer::DEFAULT);
        let other = fx.set.spawn(other_body, MotionConfig::platform(), &fx.world).unwrap();

        let rider_body = fx.set.get(fx.rider).unwrap().body();
        fx.world.set_position(rider_body, Vec2::new(10.0, 2.0));
        fx.set.update_carrying(fx.rider, &mut fx.world).unwrap();

        assert_eq!(fx.set.parent_of(fx.rider), Some(other));
        assert!(fx.set.children_of(fx.platform).is_empty());
        assert_eq!(fx.set.children_of(other), &[fx.rider]);
    }

    #[test]
    fn test_static_ground_is_not_a_parent() {
        let mut world = CollisionWorld::new();
        world.add_box(Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0), Layer::DEFAULT);
        let body = world.add_box(Vec2::new(0.0, 1.0), Vec2::new(1.0, 2.0), Layer::DEFAULT);

        let mut set = ControllerSet::new();
        let rider = set.spawn(body, MotionConfig::carryable(), &world).unwrap();

        assert_eq!(set.update_carrying(rider, &mut world).unwrap(), None);
    }

    #[test]
    fn test_update_all_with_rider_body_gone() {
        let mut fx = fixture();
        fx.set.update_all_carrying(&mut fx.world);
        assert_eq!(fx.set.parent_of(fx.rider), Some(fx.platform));

        let rider_body = fx.set.get(fx.rider).unwrap().body();
        fx.world.remove_body(rider_body);
        fx.set.update_all_carrying(&mut fx.world);

        assert_eq!(fx.set.parent_of(fx.rider), None);
        assert!(fx.set.children_of(fx.platform).is_empty());
    }

    #[test]
    fn test_cascade_to_grandchildren() {
        let mut fx = fixture();
        let crate_body = fx
            .world
            .add_box(Vec2::new(0.0, 3.5), Vec2::new(0.5, 1.0), Layer::DEFAULT);
        let top = fx.set.spawn(crate_body, MotionConfig::carryable(), &fx.world).unwrap();

        fx.set.update_all_carrying(&mut fx.world);
        assert_eq!(fx.set.parent_of(top), Some(fx.rider));
        assert_eq!(fx.set.parent_of(fx.rider), Some(fx.platform));

        fx.set
            .move_controller(fx.platform, Vec2::new(-1.0, 0.0), &mut fx.world)
            .unwrap();
        assert!((position(&fx, top) - Vec2::new(-1.0, 3.5)).length() < EPSILON);
    }

    #[test]
    fn test_cycle_is_refused() {
        let mut fx = fixture();
        fx.set.get_mut(fx.platform).unwrap().set_can_be_carried(true);
        fx.set.update_carrying(fx.rider, &mut fx.world).unwrap();

        // Put the platform on top of its own rider.
        let platform_body = fx.set.get(fx.platform).unwrap().body();
        fx.world.set_position(platform_body, Vec2::new(0.0, 3.5));

        let parent = fx.set.update_carrying(fx.platform, &mut fx.world).unwrap();
        assert_eq!(parent, None);
        assert_eq!(fx.set.parent_of(fx.platform), None);
        assert_eq!(fx.set.parent_of(fx.rider), Some(fx.platform));
    }

    #[test]
    fn test_remove_tears_down_links() {
        let mut fx = fixture();
        fx.set.update_carrying(fx.rider, &mut fx.world).unwrap();

        let removed = fx.set.remove(fx.platform).unwrap();
        assert!(removed.children().is_empty());
        assert_eq!(fx.set.parent_of(fx.rider), None);
        assert!(fx.set.get(fx.platform).is_none());
        assert_eq!(fx.set.len(), 1);
        assert_eq!(fx.set.controller_for_body(removed.body()), None);

        let err = fx
            .set
            .move_controller(fx.platform, Vec2::X, &mut fx.world)
            .unwrap_err();
        assert_eq!(err, ControllerError::UnknownController(fx.platform));
    }

    #[test]
    fn test_one_controller_per_body() {
        let mut fx = fixture();
        let body = fx.set.get(fx.rider).unwrap().body();
        let err = fx.set.spawn(body, MotionConfig::default(), &fx.world).unwrap_err();
        assert_eq!(err, ControllerError::BodyAlreadyControlled(body));
    }
}
