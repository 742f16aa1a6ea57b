//! Pixel Dash - A side-scrolling arcade runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (scenes, spawning, collisions, scoring)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player audio preferences
//! - `renderer`: Canvas 2D drawing (wasm32 only)
//! - `audio`: Web Audio sound effects and music (wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one score point per frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;
    /// Top surface of the ground platform
    pub const GROUND_Y: f32 = 536.0;

    /// Downward acceleration (units/s²)
    pub const GRAVITY: f32 = 500.0;

    /// Player defaults
    pub const PLAYER_X: f32 = 100.0;
    pub const PLAYER_START_Y: f32 = 450.0;
    pub const PLAYER_HALF_WIDTH: f32 = 16.0;
    pub const PLAYER_HALF_HEIGHT: f32 = 24.0;
    pub const JUMP_VELOCITY: f32 = -400.0;
    /// Minimum downward speed while the descend key is held
    pub const DESCEND_VELOCITY: f32 = 100.0;
    /// Restitution when landing
    pub const PLAYER_BOUNCE: f32 = 0.2;
    /// Landing speeds below this settle instead of bouncing
    pub const REST_SPEED: f32 = 30.0;

    /// Entities spawn just past the right edge
    pub const SPAWN_X: f32 = 800.0;
    /// Entities left of this are swept
    pub const DESPAWN_X: f32 = -50.0;

    /// Background scroll per Playing frame
    pub const SCROLL_PER_FRAME: f32 = 2.0;

    /// Player tint while shielded
    pub const SHIELD_TINT: u32 = 0x00ff00;
    /// Power-up tint
    pub const POWER_UP_TINT: u32 = 0xff0000;
}

/// Convert a duration in milliseconds to clock microseconds
#[inline]
pub fn ms_to_us(ms: u32) -> u64 {
    ms as u64 * 1000
}

/// Convert a timestep in seconds to clock microseconds
#[inline]
pub fn secs_to_us(secs: f32) -> u64 {
    (secs as f64 * 1_000_000.0).round() as u64
}
