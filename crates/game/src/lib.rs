//! Platformer Game Logic
//!
//! This crate drives `platformer-physics` controllers with a fixed-step
//! simulation:
//!
//! - Level descriptions loaded from TOML
//! - Moving platforms that follow waypoint loops
//! - Gravity actors that land, bump ceilings and patrol
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Simulation::tick(dt)                  │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────────────────┐  │
//! │  │ Movers  │───►│ Actors   │───►│ Carrying pass       │  │
//! │  │ (paths) │    │ (gravity)│    │ (relink riders)     │  │
//! │  └─────────┘    └──────────┘    └─────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod actor;
pub mod level;
pub mod mover;
pub mod simulation;

// Re-export main types
pub use actor::{ActorConfig, ActorStats, GravityActor};
pub use level::{Level, LevelError};
pub use mover::WaypointPath;
pub use simulation::{Mover, Simulation, SimulationConfig};

// Re-export physics types for convenience
pub use platformer_physics::{
    CollisionFlags, CollisionWorld, ControllerId, ControllerSet, MotionConfig, MotionController,
};
