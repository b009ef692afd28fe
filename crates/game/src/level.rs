//! Level descriptions and loading.
//!
//! Levels are plain data, usually read from TOML:
//!
//! ```toml
//! name = "Demo"
//!
//! [[solids]]
//! center = [0.0, -0.5]
//! size = [40.0, 1.0]
//!
//! [[platforms]]
//! center = [0.0, 2.0]
//! size = [3.0, 0.5]
//! waypoints = [[0.0, 2.0], [6.0, 2.0]]
//! speed = 2.0
//!
//! [[actors]]
//! name = "hero"
//! center = [0.0, 4.0]
//! size = [1.0, 2.0]
//! ```
//!
//! A [`Simulation`](crate::Simulation) is built from a validated level.

use std::path::{Path, PathBuf};

use glam::Vec2;
use platformer_physics::{ControllerError, Layer, MotionConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actor::ActorConfig;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse level: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("`{name}` has invalid size {size:?}")]
    InvalidSize { name: String, size: Vec2 },

    #[error("platform `{name}` has invalid speed {speed}")]
    InvalidSpeed { name: String, speed: f32 },

    #[error("layer {layer} of `{name}` is out of range")]
    InvalidLayer { name: String, layer: u8 },

    #[error("controller for `{name}` rejected: {source}")]
    Controller {
        name: String,
        #[source]
        source: ControllerError,
    },
}

/// A static box or trigger volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxDesc {
    pub center: Vec2,
    pub size: Vec2,
    #[serde(default)]
    pub layer: Layer,
}

/// A box moved along a waypoint loop by its own controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformDesc {
    #[serde(default)]
    pub name: String,
    pub center: Vec2,
    pub size: Vec2,
    #[serde(default)]
    pub layer: Layer,
    #[serde(default)]
    pub waypoints: Vec<Vec2>,
    #[serde(default)]
    pub speed: f32,
    #[serde(default = "MotionConfig::platform")]
    pub motion: MotionConfig,
}

/// A gravity-driven character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorDesc {
    pub name: String,
    pub center: Vec2,
    pub size: Vec2,
    #[serde(default)]
    pub layer: Layer,
    #[serde(default = "MotionConfig::carryable")]
    pub motion: MotionConfig,
    #[serde(default)]
    pub actor: ActorConfig,
}

/// A level: static geometry plus everything the simulation drives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Level {
    pub name: String,
    pub solids: Vec<BoxDesc>,
    pub triggers: Vec<BoxDesc>,
    pub platforms: Vec<PlatformDesc>,
    pub actors: Vec<ActorDesc>,
}

impl Level {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Parse and validate a level from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, LevelError> {
        let level: Level = toml::from_str(text)?;
        level.validate()?;
        Ok(level)
    }

    /// Read and parse a level file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let level = Self::from_toml_str(&text)?;
        log::info!(
            "loaded level '{}' from {}: {} solids, {} platforms, {} actors",
            level.name,
            path.display(),
            level.solids.len(),
            level.platforms.len(),
            level.actors.len()
        );
        Ok(level)
    }

    /// Built-in level used when no file is given.
    ///
    /// A floored room with two walls, a platform shuttling sideways with a
    /// rider on it, a patrolling walker and a crate dropped from above.
    pub fn test_arena() -> Self {
        let mut level = Self::new("Test Arena");

        // Floor, top surface at y=0
        level.solids.push(BoxDesc {
            center: Vec2::new(0.0, -0.5),
            size: Vec2::new(40.0, 1.0),
            layer: Layer::DEFAULT,
        });

        // Walls
        for x in [-15.5, 15.5] {
            level.solids.push(BoxDesc {
                center: Vec2::new(x, 5.0),
                size: Vec2::new(1.0, 10.0),
                layer: Layer::DEFAULT,
            });
        }

        level.triggers.push(BoxDesc {
            center: Vec2::new(-12.0, 1.0),
            size: Vec2::new(2.0, 2.0),
            layer: Layer::DEFAULT,
        });

        level.platforms.push(PlatformDesc {
            name: "shuttle".to_string(),
            center: Vec2::new(0.0, 3.0),
            size: Vec2::new(3.0, 0.5),
            layer: Layer::DEFAULT,
            waypoints: vec![Vec2::new(0.0, 3.0), Vec2::new(8.0, 3.0)],
            speed: 2.0,
            motion: MotionConfig::platform(),
        });

        // Standing on the shuttle: bottom at 3.25
        level.actors.push(ActorDesc {
            name: "rider".to_string(),
            center: Vec2::new(0.0, 4.25),
            size: Vec2::new(1.0, 2.0),
            layer: Layer::DEFAULT,
            motion: MotionConfig::carryable(),
            actor: ActorConfig::default(),
        });

        level.actors.push(ActorDesc {
            name: "walker".to_string(),
            center: Vec2::new(-8.0, 1.0),
            size: Vec2::new(1.0, 2.0),
            layer: Layer::DEFAULT,
            motion: MotionConfig::carryable(),
            actor: ActorConfig {
                walk_speed: 3.0,
                ..Default::default()
            },
        });

        level.actors.push(ActorDesc {
            name: "crate".to_string(),
            center: Vec2::new(-4.0, 8.0),
            size: Vec2::new(1.0, 1.0),
            layer: Layer::DEFAULT,
            motion: MotionConfig::carryable(),
            actor: ActorConfig::default(),
        });

        level
    }

    /// Check everything that would otherwise surface as a confusing
    /// controller error or a silently broken body.
    pub fn validate(&self) -> Result<(), LevelError> {
        let boxes = self
            .solids
            .iter()
            .map(|solid| ("solid", solid.size, solid.layer))
            .chain(self.triggers.iter().map(|trigger| ("trigger", trigger.size, trigger.layer)))
            .map(|(kind, size, layer)| (kind.to_string(), size, layer))
            .chain(
                self.platforms
                    .iter()
                    .map(|platform| (platform.name.clone(), platform.size, platform.layer)),
            )
            .chain(self.actors.iter().map(|actor| (actor.name.clone(), actor.size, actor.layer)));

        for (name, size, layer) in boxes {
            if !(size.x > 0.0 && size.y > 0.0 && size.is_finite()) {
                return Err(LevelError::InvalidSize { name, size });
            }
            if !layer.is_valid() {
                return Err(LevelError::InvalidLayer { name, layer: layer.0 });
            }
        }

        for platform in &self.platforms {
            if !platform.speed.is_finite() || platform.speed < 0.0 {
                return Err(LevelError::InvalidSpeed {
                    name: platform.name.clone(),
                    speed: platform.speed,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: &str = r#"
        name = "Small"

        [[solids]]
        center = [0.0, -0.5]
        size = [20.0, 1.0]

        [[triggers]]
        center = [5.0, 1.0]
        size = [1.0, 1.0]
        layer = 3

        [[platforms]]
        name = "lift"
        center = [0.0, 2.0]
        size = [3.0, 0.5]
        waypoints = [[0.0, 2.0], [0.0, 6.0]]
        speed = 1.5

        [[actors]]
        name = "hero"
        center = [2.0, 1.0]
        size = [1.0, 2.0]

        [actors.actor]
        walk_speed = 4.0
    "#;

    #[test]
    fn test_parse_level() {
        let level = Level::from_toml_str(DEMO).unwrap();

        assert_eq!(level.name, "Small");
        assert_eq!(level.solids.len(), 1);
        assert_eq!(level.triggers[0].layer, Layer(3));
        assert_eq!(level.platforms[0].waypoints.len(), 2);
        assert!(!level.platforms[0].motion.can_be_carried);

        let hero = &level.actors[0];
        assert_eq!(hero.name, "hero");
        assert!(hero.motion.can_be_carried);
        assert_eq!(hero.actor.walk_speed, 4.0);
        assert_eq!(hero.actor.gravity, ActorConfig::default().gravity);
    }

    #[test]
    fn test_empty_level_is_valid() {
        let level = Level::from_toml_str("").unwrap();
        assert!(level.solids.is_empty());
        assert!(level.actors.is_empty());
    }

    #[test]
    fn test_test_arena_is_valid() {
        let level = Level::test_arena();
        level.validate().unwrap();
        assert!(!level.solids.is_empty());
        assert_eq!(level.platforms.len(), 1);
        assert!(level.actors.len() >= 2);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = Level::from_toml_str("[[solids]\ncenter = ").unwrap_err();
        assert!(matches!(err, LevelError::Parse(_)));
    }

    #[test]
    fn test_rejects_degenerate_size() {
        let err = Level::from_toml_str(
            r#"
            [[actors]]
            name = "flat"
            center = [0.0, 0.0]
            size = [1.0, 0.0]
            "#,
        )
        .unwrap_err();

        match err {
            LevelError::InvalidSize { name, .. } => assert_eq!(name, "flat"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_negative_speed() {
        let mut level = Level::test_arena();
        level.platforms[0].speed = -1.0;
        assert!(matches!(level.validate(), Err(LevelError::InvalidSpeed { .. })));
    }

    #[test]
    fn test_rejects_out_of_range_layer() {
        let mut level = Level::test_arena();
        level.solids[0].layer = Layer(40);
        assert!(matches!(level.validate(), Err(LevelError::InvalidLayer { layer: 40, .. })));
    }

    #[test]
    fn test_missing_file() {
        let err = Level::load("/nonexistent/level.toml").unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
    }
}
