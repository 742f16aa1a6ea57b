//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID, then timer ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod physics;
pub mod scene;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timer;
pub mod tracker;

pub use collision::{Resolution, resolve};
pub use physics::Aabb;
pub use scene::SceneTrigger;
pub use state::{
    AudioCue, Entity, EntityKind, GameEvent, GameState, Player, Scene, Session, Sound,
};
pub use tick::{TickInput, tick};
pub use timer::{TimerAction, TimerId, Timers};
