//! Game simulation - the fixed-step update loop.
//!
//! Each tick moves every waypoint platform, then every actor, then rebuilds
//! the carrying links for the next tick. Platforms move before actors so a
//! rider is carried first and then settles onto the platform under gravity.

use glam::Vec2;
use platformer_physics::{
    BodyId, CastDirection, CollisionChannel, CollisionWorld, ControllerError, ControllerId,
    ControllerSet, MotionConfig,
};
use serde::{Deserialize, Serialize};

use crate::actor::{ActorStats, GravityActor};
use crate::level::{Level, LevelError};
use crate::mover::WaypointPath;

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation tick rate (ticks per second).
    pub tick_rate: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { tick_rate: 60 }
    }
}

impl SimulationConfig {
    /// Time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

/// A platform driven along a waypoint path.
#[derive(Debug, Clone)]
pub struct Mover {
    pub name: String,
    pub controller: ControllerId,
    pub path: WaypointPath,
}

/// Owns the scene, every controller and everything that drives them.
#[derive(Debug)]
pub struct Simulation {
    /// Ticks run so far.
    pub frame: u64,

    pub config: SimulationConfig,

    /// Level name, for logging.
    pub name: String,

    pub world: CollisionWorld,
    pub controllers: ControllerSet,

    movers: Vec<Mover>,
    actors: Vec<GravityActor>,
}

impl Simulation {
    /// Build the scene described by `level`.
    ///
    /// Every controller is created up front; a rejected configuration fails
    /// the whole level. Riders that start on a platform are linked before the
    /// first tick.
    pub fn new(config: SimulationConfig, level: &Level) -> Result<Self, LevelError> {
        level.validate()?;

        let mut world = CollisionWorld::new();
        let mut controllers = ControllerSet::new();

        for solid in &level.solids {
            world.add_box(solid.center, solid.size, solid.layer);
        }
        for trigger in &level.triggers {
            world.add_trigger(trigger.center, trigger.size, trigger.layer);
        }

        let mut movers = Vec::with_capacity(level.platforms.len());
        for platform in &level.platforms {
            let body = world.add_box(platform.center, platform.size, platform.layer);
            let controller =
                spawn(&mut controllers, &world, body, &platform.motion, &platform.name)?;

            let path = WaypointPath::new(platform.waypoints.clone(), platform.speed);
            if !path.is_active() {
                log::warn!(
                    "platform '{}' has fewer than two waypoints and will not move",
                    platform.name
                );
            }
            movers.push(Mover {
                name: platform.name.clone(),
                controller,
                path,
            });
        }

        let mut actors = Vec::with_capacity(level.actors.len());
        for desc in &level.actors {
            let body = world.add_box(desc.center, desc.size, desc.layer);
            let controller = spawn(&mut controllers, &world, body, &desc.motion, &desc.name)?;
            let actor = GravityActor::new(desc.name.clone(), controller, desc.actor);

            // Known starting state, so a body spawned on the ground is not
            // counted as landing on its first tick.
            let grounded = controllers
                .get_mut(controller)
                .and_then(|c| c.find_ground(&mut world))
                .is_some();
            actor.shared_stats().borrow_mut().airborne = !grounded;

            subscribe_stats(&mut controllers, &actor)?;
            actors.push(actor);
        }

        controllers.update_all_carrying(&mut world);

        log::info!(
            "simulation ready for '{}': {} bodies, {} controllers",
            level.name,
            world.body_count(),
            controllers.len()
        );

        Ok(Self {
            frame: 0,
            config,
            name: level.name.clone(),
            world,
            controllers,
            movers,
            actors,
        })
    }

    /// Default configuration and the built-in test arena.
    pub fn test() -> Result<Self, LevelError> {
        Self::new(SimulationConfig::default(), &Level::test_arena())
    }

    pub fn movers(&self) -> &[Mover] {
        &self.movers
    }

    pub fn actors(&self) -> &[GravityActor] {
        &self.actors
    }

    pub fn actor(&self, name: &str) -> Option<&GravityActor> {
        self.actors.iter().find(|actor| actor.name == name)
    }

    pub fn actor_mut(&mut self, name: &str) -> Option<&mut GravityActor> {
        self.actors.iter_mut().find(|actor| actor.name == name)
    }

    /// World position of a controller's body.
    pub fn position(&self, controller: ControllerId) -> Option<Vec2> {
        self.controllers.get(controller)?.position(&self.world)
    }

    /// Collision counters of the named actor.
    pub fn stats(&self, name: &str) -> Option<ActorStats> {
        self.actor(name).map(GravityActor::stats)
    }

    /// Advance by one tick of the configured rate.
    pub fn step(&mut self) -> Result<(), ControllerError> {
        self.tick(self.config.delta_time())
    }

    /// Advance the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Result<(), ControllerError> {
        for mover in &mut self.movers {
            let Some(position) = self
                .controllers
                .get(mover.controller)
                .and_then(|c| c.position(&self.world))
            else {
                continue;
            };

            let displacement = mover.path.displacement(position, dt);
            if displacement == Vec2::ZERO {
                mover.path.update_target(position);
                continue;
            }

            let applied = self
                .controllers
                .move_controller(mover.controller, displacement, &mut self.world)?;
            if applied != displacement {
                log::debug!(
                    "platform '{}' obstructed: {applied:?} of {displacement:?}",
                    mover.name
                );
            }
            mover.path.update_target(position + applied);
        }

        for actor in &mut self.actors {
            let displacement = actor.displacement(dt);
            self.controllers
                .move_controller(actor.controller, displacement, &mut self.world)?;

            let flags = self
                .controllers
                .get(actor.controller)
                .ok_or(ControllerError::UnknownController(actor.controller))?
                .flags();
            actor.after_move(flags);
        }

        self.controllers.update_all_carrying(&mut self.world);

        self.frame += 1;
        Ok(())
    }
}

fn spawn(
    controllers: &mut ControllerSet,
    world: &CollisionWorld,
    body: BodyId,
    motion: &MotionConfig,
    name: &str,
) -> Result<ControllerId, LevelError> {
    controllers
        .spawn(body, motion.clone(), world)
        .map_err(|source| LevelError::Controller {
            name: name.to_string(),
            source,
        })
}

/// Feed the actor's counters from its controller's collision events.
fn subscribe_stats(
    controllers: &mut ControllerSet,
    actor: &GravityActor,
) -> Result<(), LevelError> {
    let controller = controllers
        .get_mut(actor.controller)
        .ok_or_else(|| LevelError::Controller {
            name: actor.name.clone(),
            source: ControllerError::UnknownController(actor.controller),
        })?;

    let stats = actor.shared_stats();
    let name = actor.name.clone();
    controller.subscribe(CollisionChannel::Vertical, move |record| {
        let mut stats = stats.borrow_mut();
        match record.direction {
            CastDirection::Down if stats.airborne => {
                stats.landings += 1;
                log::debug!("'{name}' landed on {:?}", record.body());
            }
            CastDirection::Up => stats.ceiling_hits += 1,
            _ => {}
        }
        Ok(())
    });

    let stats = actor.shared_stats();
    controller.subscribe(CollisionChannel::Horizontal, move |_| {
        stats.borrow_mut().wall_hits += 1;
        Ok(())
    });

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
