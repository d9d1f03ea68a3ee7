//! Game state and core simulation types
//!
//! Everything the controller owns lives here: counters, HUD text, the win
//! countdown, the camera and the currently loaded level world.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::enemy::{Enemy, EnemyMode};
use super::levels::LevelId;
use super::physics::{Body, ContactRules, Rect, TileGrid};
use crate::consts::*;

/// The player's body; one per loaded level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
}

impl Player {
    pub fn spawn(pos: Vec2) -> Self {
        Self {
            body: Body::new(pos, PLAYER_SIZE).with_world_bounds(),
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Fireball,
    Coin,
}

/// A static collectible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub body: Body,
}

impl Pickup {
    pub fn new(id: u32, kind: PickupKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            body: Body::new(pos, PICKUP_SIZE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerKind {
    Exit,
    Final,
}

/// Invisible zone that fires an overlap handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub kind: TriggerKind,
    pub body: Body,
}

impl Trigger {
    pub fn new(kind: TriggerKind, pos: Vec2) -> Self {
        Self {
            kind,
            body: Body::new(pos, TRIGGER_SIZE),
        }
    }
}

/// Entities and contact rules of the loaded level; dropped on every load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelWorld {
    pub level: LevelId,
    pub ground: TileGrid,
    pub bounds: Rect,
    pub player: Player,
    pub fireballs: Vec<Pickup>,
    pub coins: Vec<Pickup>,
    pub enemies: Vec<Enemy>,
    pub exit: Option<Trigger>,
    pub finale: Option<Trigger>,
    pub contacts: ContactRules,
}

/// Progress counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub fireballs: u32,
    pub coins: u32,
    pub score: u64,
}

impl Counters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// On-screen text (drawing is up to the front end)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hud {
    pub fireballs: String,
    pub coins: String,
    pub score: String,
    /// Countdown message while the victory sequence runs
    pub banner: Option<String>,
}

impl Hud {
    pub fn new() -> Self {
        let mut hud = Self {
            fireballs: String::new(),
            coins: String::new(),
            score: String::new(),
            banner: None,
        };
        hud.sync(&Counters::default());
        hud
    }

    pub fn sync(&mut self, counters: &Counters) {
        self.fireballs = counters.fireballs.to_string();
        self.coins = format!("Coins: {}", counters.coins);
        self.score = format!("Score: {}", counters.score);
    }

    pub fn countdown_text(remaining: u32) -> String {
        format!("You win! Restarting in {}...", remaining)
    }
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

/// Victory countdown: Idle -> Counting(n) -> ... -> Counting(0) -> Resetting -> Idle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinSequence {
    #[default]
    Idle,
    Counting {
        remaining: u32,
        /// Ticks until `remaining` next drops
        ticks_left: u32,
    },
    Resetting,
}

impl WinSequence {
    pub fn is_idle(&self) -> bool {
        matches!(self, WinSequence::Idle)
    }
}

/// Things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelLoaded { level: LevelId },
    FireballCollected { total: u32 },
    CoinCollected { total: u32, score: u64 },
    PlayerCaught { level: LevelId },
    LevelAdvanced { from: LevelId, to: LevelId },
    EnemyModeChanged { id: u32, mode: EnemyMode },
    VictoryStarted,
    CountdownTick { remaining: u32 },
    GameRestarted,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub current_level: LevelId,
    pub counters: Counters,
    pub win: WinSequence,
    pub physics_paused: bool,
    pub camera: Camera,
    pub hud: Hud,
    /// `None` until the first level load
    pub world: Option<LevelWorld>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Incremented on every level load
    pub loads: u64,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            current_level: LevelId::FIRST,
            counters: Counters::default(),
            win: WinSequence::Idle,
            physics_paused: false,
            camera: Camera::new(viewport),
            hud: Hud::new(),
            world: None,
            time_ticks: 0,
            loads: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn player_pos(&self) -> Option<Vec2> {
        self.world.as_ref().map(|w| w.player.pos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hud_sync() {
        let mut hud = Hud::new();
        assert_eq!(hud.fireballs, "0");
        assert_eq!(hud.coins, "Coins: 0");
        hud.sync(&Counters {
            fireballs: 3,
            coins: 2,
            score: 200,
        });
        assert_eq!(hud.fireballs, "3");
        assert_eq!(hud.coins, "Coins: 2");
        assert_eq!(hud.score, "Score: 200");
    }

    #[test]
    fn test_counters_reset() {
        let mut counters = Counters {
            fireballs: 7,
            coins: 1,
            score: 100,
        };
        assert!(!counters.is_zero());
        counters.reset();
        assert!(counters.is_zero());
    }

    #[test]
    fn test_entity_ids_increase() {
        let mut state = GameState::new(Vec2::new(800.0, 600.0));
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
        assert!(state.world.is_none());
        assert!(state.win.is_idle());
    }
}
