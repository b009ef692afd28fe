//! Ray fans cast from the edges of a body's box collider.
//!
//! The raycaster is the only piece of the movement core that talks to the
//! scene's ray test. A cast samples one face of the box with evenly spaced
//! parallel rays and reports the first ray, in fan order, that strikes a
//! blocking collider.
//!
//! # Fan Layout
//!
//! ```text
//!   Up:    TL ──►──►──► (left to right)
//!   Left:  BL ▲ bottom to top      Right: BR ▲ bottom to top
//!   Down:  BL ──►──►──► (left to right)
//! ```
//!
//! All origins sit on the skin-shrunk box, so a ray never starts exactly on
//! a surface the body is touching.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ControllerError};

use super::hit::{CastDirection, HitRecord};
use super::layers::{Layer, LayerMask};
use super::scene::{with_scratch_layer, BodyId, PhysicsScene, RayHit};

/// Load-time settings for a [`Raycaster`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaycasterConfig {
    /// Rays in each horizontal cast (Left/Right), stacked along the collider
    /// height.
    ///
    /// Named after the rays it counts, not the edge they sample: the fan
    /// along the top and bottom edges is `vertical_rays`.
    pub horizontal_rays: u32,

    /// Rays in each vertical cast (Up/Down), spread along the collider
    /// width.
    pub vertical_rays: u32,

    /// Inward margin between the collider edge and the ray origins.
    pub skin_width: f32,

    /// Layers that block movement.
    pub solid_layers: LayerMask,

    /// Layers that only block bodies moving down onto them.
    pub one_way_layers: LayerMask,

    /// Layer the body is parked on while it casts. Must not be solid.
    pub scratch_layer: Layer,
}

impl Default for RaycasterConfig {
    fn default() -> Self {
        Self {
            horizontal_rays: 10,
            vertical_rays: 10,
            skin_width: 0.02,
            solid_layers: LayerMask::DEFAULT,
            one_way_layers: LayerMask::NONE,
            scratch_layer: Layer::SCRATCH,
        }
    }
}

impl RaycasterConfig {
    /// Check the configuration for values that would break ray spacing or
    /// self-exclusion.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizontal_rays < 2 {
            return Err(ConfigError::TooFewRays {
                fan: "horizontal",
                count: self.horizontal_rays,
            });
        }
        if self.vertical_rays < 2 {
            return Err(ConfigError::TooFewRays {
                fan: "vertical",
                count: self.vertical_rays,
            });
        }
        if !self.skin_width.is_finite() || self.skin_width < 0.0 {
            return Err(ConfigError::InvalidSkinWidth(self.skin_width));
        }
        if !self.scratch_layer.is_valid() {
            return Err(ConfigError::ScratchLayerOutOfRange(self.scratch_layer.0));
        }
        if self.solid_layers.contains(self.scratch_layer) {
            return Err(ConfigError::ScratchLayerIsSolid(self.scratch_layer.0));
        }
        Ok(())
    }
}

/// Corners of the skin-shrunk collider box in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RayOrigins {
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
}

/// Casts ray fans for one body.
#[derive(Debug, Clone)]
pub struct Raycaster {
    body: BodyId,
    config: RaycasterConfig,
    origins: RayOrigins,
    /// x: gap between Up/Down rays, y: gap between Left/Right rays.
    spacing: Vec2,
}

impl Raycaster {
    /// Attach a raycaster to a body.
    ///
    /// Fails if the configuration is invalid, the body or its collider is
    /// missing, or the collider is no larger than twice the skin width.
    pub fn new<S>(
        body: BodyId,
        config: RaycasterConfig,
        scene: &S,
    ) -> Result<Self, ControllerError>
    where
        S: PhysicsScene + ?Sized,
    {
        config.validate()?;

        let transform = scene.transform(body).ok_or(ControllerError::MissingBody(body))?;
        let collider = scene
            .box_collider(body)
            .ok_or(ControllerError::MissingCollider(body))?;

        let extent = collider.world_half_extents(&transform) * 2.0;
        if extent.x <= 2.0 * config.skin_width || extent.y <= 2.0 * config.skin_width {
            return Err(ControllerError::DegenerateCollider {
                body,
                width: extent.x,
                height: extent.y,
                skin_width: config.skin_width,
            });
        }

        let mut raycaster = Self {
            body,
            config,
            origins: RayOrigins::default(),
            spacing: Vec2::ZERO,
        };
        raycaster.refresh_origins(scene);
        Ok(raycaster)
    }

    #[inline]
    pub fn body(&self) -> BodyId {
        self.body
    }

    #[inline]
    pub fn config(&self) -> &RaycasterConfig {
        &self.config
    }

    #[inline]
    pub fn skin_width(&self) -> f32 {
        self.config.skin_width
    }

    /// Origins computed by the last refresh.
    #[inline]
    pub fn origins(&self) -> RayOrigins {
        self.origins
    }

    /// Recompute corner origins and ray spacing from the body's current
    /// transform. Returns `false` if the body has left the scene.
    pub fn refresh_origins<S>(&mut self, scene: &S) -> bool
    where
        S: PhysicsScene + ?Sized,
    {
        let (Some(transform), Some(collider)) =
            (scene.transform(self.body), scene.box_collider(self.body))
        else {
            return false;
        };

        let skin = self.config.skin_width;
        let center = collider.world_center(&transform);
        let half = collider.world_half_extents(&transform);

        let min = center - half + Vec2::splat(skin);
        let max = center + half - Vec2::splat(skin);

        self.origins = RayOrigins {
            top_left: Vec2::new(min.x, max.y),
            top_right: max,
            bottom_left: min,
            bottom_right: Vec2::new(max.x, min.y),
        };

        let inner = (max - min).max(Vec2::ZERO);
        self.spacing = Vec2::new(
            inner.x / (self.config.vertical_rays - 1) as f32,
            inner.y / (self.config.horizontal_rays - 1) as f32,
        );
        true
    }

    /// Cast a ray fan in `direction`.
    ///
    /// Each ray reaches `|max_distance| + skin_width` from its origin. Triggers
    /// never block, and one-way layers only block when casting down. A ray
    /// that meets a non-blocking collider keeps going, so a solid behind a
    /// trigger is still found. The first ray in fan order with a blocking hit
    /// wins; this is not a search for the globally nearest hit.
    pub fn cast<S>(
        &mut self,
        scene: &mut S,
        direction: CastDirection,
        max_distance: f32,
        refresh_origins: bool,
    ) -> HitRecord
    where
        S: PhysicsScene + ?Sized,
    {
        if refresh_origins && !self.refresh_origins(&*scene) {
            log::debug!("cast from body {:?} skipped, body left the scene", self.body);
            return HitRecord::miss(direction, Vec2::ZERO);
        }

        let ray_distance = max_distance.abs() + self.config.skin_width;
        let (start, step, count) = self.fan(direction);
        let ray_direction = direction.vector();
        let solid = self.config.solid_layers;
        let one_way = self.config.one_way_layers;
        let blocks = |hit: &RayHit| {
            !hit.is_trigger && (direction == CastDirection::Down || !one_way.contains(hit.layer))
        };

        let mut ray_origin = start;
        for i in 0..count {
            ray_origin = start + step * i as f32;

            let scratch = self.config.scratch_layer;
            let hit = with_scratch_layer(&mut *scene, self.body, scratch, |scene| {
                scene.raycast_filtered(ray_origin, ray_direction, ray_distance, solid, &blocks)
            });

            let Some(hit) = hit else {
                continue;
            };

            log::trace!(
                "body {:?} cast {:?}: ray {} struck {:?} at {:?}",
                self.body,
                direction,
                i,
                hit.body,
                hit.point
            );
            return HitRecord::hit(direction, ray_origin, hit);
        }

        HitRecord::miss(direction, ray_origin)
    }

    /// Cast Left, Right, Up, then Down and return the first hit.
    ///
    /// Origins are refreshed once up front.
    pub fn cast_all_directions<S>(&mut self, scene: &mut S, max_distance: f32) -> HitRecord
    where
        S: PhysicsScene + ?Sized,
    {
        self.refresh_origins(&*scene);

        let mut record = HitRecord::miss(CastDirection::Down, self.origins.bottom_left);
        for direction in CastDirection::ALL {
            record = self.cast(&mut *scene, direction, max_distance, false);
            if record.did_hit() {
                break;
            }
        }
        record
    }

    /// Starting corner, per-ray offset and ray count for a direction.
    fn fan(&self, direction: CastDirection) -> (Vec2, Vec2, u32) {
        let across = Vec2::new(self.spacing.x, 0.0);
        let along = Vec2::new(0.0, self.spacing.y);

        match direction {
            CastDirection::Down => (self.origins.bottom_left, across, self.config.vertical_rays),
            CastDirection::Up => (self.origins.top_left, across, self.config.vertical_rays),
            CastDirection::Left => (self.origins.bottom_left, along, self.config.horizontal_rays),
            CastDirection::Right => (self.origins.bottom_right, along, self.config.horizontal_rays),
        }
    }
}
