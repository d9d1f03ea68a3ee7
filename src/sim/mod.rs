//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (autopilot)
//! - Stable iteration order (entity vectors keep map order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod camera;
pub mod controller;
pub mod enemy;
pub mod levels;
pub mod physics;
pub mod state;
pub mod tick;
pub mod tilemap;

pub use autopilot::{Autopilot, RouteMap, find_path};
pub use camera::Camera;
pub use controller::{LevelController, Rules};
pub use enemy::{Axis, ChaseRules, Enemy, EnemyMode};
pub use levels::{Level, LevelId, LevelSet};
pub use physics::{Blocked, Body, Contact, ContactRules, Group, Rect, TileGrid, step_body};
pub use state::{
    Counters, GameEvent, GameState, Hud, LevelWorld, Pickup, PickupKind, Player, Trigger,
    TriggerKind, WinSequence,
};
pub use tick::TickInput;
pub use tilemap::{LevelMap, MapObject, ObjectKind};
