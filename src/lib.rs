//! Fireball Quest - a top-down tile arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (levels, physics, enemies, game state)
//! - `settings`: Data-driven configuration
//! - `error`: Error types for map and settings loading

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{GameError, MapError};
pub use settings::Settings;

use glam::Vec2;

/// Game rule constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Simulation ticks per second of game time
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Highest level number; levels run 1..=MAX_LEVEL
    pub const MAX_LEVEL: u8 = 3;

    /// Tile edge length in pixels
    pub const TILE_SIZE: f32 = 16.0;

    /// Player movement speed (pixels/s)
    pub const PLAYER_SPEED: f32 = 150.0;
    /// Player body edge length
    pub const PLAYER_SIZE: f32 = 12.0;

    /// Initial enemy patrol speed (pixels/s, sign is the direction)
    pub const ENEMY_PATROL_SPEED: f32 = 30.0;
    /// Enemy chase speed (pixels/s)
    pub const ENEMY_CHASE_SPEED: f32 = 40.0;
    /// Enemies start chasing when the player is closer than this
    pub const ENEMY_CHASE_RADIUS: f32 = 120.0;
    /// Enemy body edge length
    pub const ENEMY_SIZE: f32 = 12.0;

    /// Fireball/coin body edge length
    pub const PICKUP_SIZE: f32 = 10.0;
    /// Exit/final trigger zone edge length
    pub const TRIGGER_SIZE: f32 = 16.0;

    /// Fireballs needed before the exit or final zone reacts
    pub const FIREBALLS_TO_UNLOCK: u32 = 5;
    /// Points awarded per coin
    pub const COIN_SCORE: u64 = 100;

    /// Camera zoom while following the player (levels 2+)
    pub const FOLLOW_ZOOM: f32 = 1.5;

    /// Seconds shown on the victory countdown before the game restarts
    pub const VICTORY_COUNTDOWN: u32 = 5;
}

/// Center of the tile at (col, row) in world pixels
#[inline]
pub fn tile_center(col: i32, row: i32, tile_size: f32) -> Vec2 {
    Vec2::new(
        (col as f32 + 0.5) * tile_size,
        (row as f32 + 0.5) * tile_size,
    )
}

/// Tile coordinates containing a world position
#[inline]
pub fn world_to_tile(pos: Vec2, tile_size: f32) -> (i32, i32) {
    (
        (pos.x / tile_size).floor() as i32,
        (pos.y / tile_size).floor() as i32,
    )
}
