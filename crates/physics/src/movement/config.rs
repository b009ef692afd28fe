//! Motion controller configuration.
//!
//! Everything here is read once when a controller is built.

use serde::{Deserialize, Serialize};

use crate::collision::RaycasterConfig;
use crate::error::ConfigError;

/// Configuration for a [`MotionController`](super::MotionController).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Ray fan settings. The controller copies `skin_width` from here.
    pub raycaster: RaycasterConfig,

    /// Whether this controller rides controllers it stands on.
    pub can_be_carried: bool,

    /// Length of the downward carry reach, in multiples of the skin width.
    pub carry_reach_skins: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            raycaster: RaycasterConfig::default(),
            can_be_carried: false,
            carry_reach_skins: 5.0,
        }
    }
}

impl MotionConfig {
    /// A character that rides moving platforms.
    pub fn carryable() -> Self {
        Self {
            can_be_carried: true,
            ..Default::default()
        }
    }

    /// A moving platform. Carries others, never ridden itself.
    pub fn platform() -> Self {
        Self {
            can_be_carried: false,
            ..Default::default()
        }
    }

    /// Distance the carry reach reaches below the skin-shrunk bottom edge.
    pub fn carry_reach(&self) -> f32 {
        self.carry_reach_skins * self.raycaster.skin_width
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.raycaster.validate()?;
        if !self.carry_reach_skins.is_finite() || self.carry_reach_skins <= 0.0 {
            return Err(ConfigError::InvalidCarryReach(self.carry_reach_skins));
        }
        Ok(())
    }
}
