//! Level controller
//!
//! Owns the game state and level set. Builds level worlds from map
//! manifests and implements the gameplay handlers the tick dispatches to.

use glam::Vec2;

use super::enemy::{ChaseRules, Enemy};
use super::levels::{LevelId, LevelSet};
use super::physics::{Group, Rect};
use super::state::{
    GameEvent, GameState, Hud, LevelWorld, Pickup, PickupKind, Player, Trigger, TriggerKind,
    WinSequence,
};
use super::tilemap::ObjectKind;
use crate::Settings;
use crate::consts::*;

/// Gameplay numbers used by the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    pub player_speed: f32,
    pub patrol_speed: f32,
    pub chase: ChaseRules,
    pub fireballs_to_unlock: u32,
    pub coins_enabled: bool,
    pub coin_score: u64,
    pub follow_zoom: f32,
    pub countdown_from: u32,
    pub ticks_per_second: u32,
    pub viewport: Vec2,
}

impl Rules {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            player_speed: PLAYER_SPEED,
            patrol_speed: ENEMY_PATROL_SPEED,
            chase: ChaseRules {
                radius: ENEMY_CHASE_RADIUS,
                hysteresis: settings.chase_hysteresis,
                speed: ENEMY_CHASE_SPEED,
            },
            fireballs_to_unlock: FIREBALLS_TO_UNLOCK,
            coins_enabled: settings.coins_enabled,
            coin_score: COIN_SCORE,
            follow_zoom: FOLLOW_ZOOM,
            countdown_from: VICTORY_COUNTDOWN,
            ticks_per_second: settings.ticks_per_second.max(1),
            viewport: Vec2::new(settings.viewport_width, settings.viewport_height),
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

pub struct LevelController {
    pub state: GameState,
    pub rules: Rules,
    levels: LevelSet,
    events: Vec<GameEvent>,
}

impl LevelController {
    /// Create a controller and load level 1
    pub fn new(levels: LevelSet, rules: Rules) -> Self {
        let mut controller = Self {
            state: GameState::new(rules.viewport),
            rules,
            levels,
            events: Vec::new(),
        };
        controller.load_level(LevelId::FIRST);
        controller
    }

    pub fn levels(&self) -> &LevelSet {
        &self.levels
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(super) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Tear down the current level and build `level` from its map.
    ///
    /// Counters are left alone.
    pub fn load_level(&mut self, level: LevelId) {
        if let Some(old) = self.state.world.take() {
            log::debug!(
                "Tearing down level {} ({} enemies, {} contact rules)",
                old.level,
                old.enemies.len(),
                old.contacts.len()
            );
        }

        let entry = self.levels.get(level);
        let ground = entry.map.grid.clone();
        let bounds = Rect::new(Vec2::ZERO, ground.pixel_size());
        let player = Player::spawn(entry.spawn);
        let objects = entry.map.objects.clone();

        let mut fireballs = Vec::new();
        let mut coins = Vec::new();
        let mut enemies = Vec::new();
        let mut exit = None;
        let mut finale = None;

        for object in objects {
            match object.kind {
                ObjectKind::Spawn => {}
                ObjectKind::Fireball => {
                    let id = self.state.next_entity_id();
                    fireballs.push(Pickup::new(id, PickupKind::Fireball, object.pos));
                }
                ObjectKind::Coin => {
                    if self.rules.coins_enabled {
                        let id = self.state.next_entity_id();
                        coins.push(Pickup::new(id, PickupKind::Coin, object.pos));
                    }
                }
                ObjectKind::Enemy { axis } => {
                    let id = self.state.next_entity_id();
                    enemies.push(Enemy::new(id, object.pos, axis, self.rules.patrol_speed));
                }
                ObjectKind::Exit => {
                    if !level.is_final() && exit.is_none() {
                        exit = Some(Trigger::new(TriggerKind::Exit, object.pos));
                    }
                }
                ObjectKind::Final => {
                    if level.is_final() && finale.is_none() {
                        finale = Some(Trigger::new(TriggerKind::Final, object.pos));
                    }
                }
                ObjectKind::Other(name) => {
                    log::debug!("Ignoring map object of type '{}'", name);
                }
            }
        }

        let mut world = LevelWorld {
            level,
            ground,
            bounds,
            player,
            fireballs,
            coins,
            enemies,
            exit,
            finale,
            contacts: Default::default(),
        };

        let contacts = &mut world.contacts;
        contacts.add_collider(Group::Player, Group::Ground);
        contacts.add_collider(Group::Enemies, Group::Ground);
        contacts.add_overlap(Group::Player, Group::Coins);
        contacts.add_overlap(Group::Player, Group::Fireballs);
        contacts.add_collider(Group::Player, Group::Enemies);
        if world.exit.is_some() {
            contacts.add_overlap(Group::Player, Group::Exit);
        }
        if world.finale.is_some() {
            contacts.add_overlap(Group::Player, Group::Final);
        }

        for enemy in &mut world.enemies {
            enemy.start_patrol();
        }

        let camera = &mut self.state.camera;
        if level.get() >= 2 {
            camera.start_follow();
            camera.set_zoom(self.rules.follow_zoom);
        } else {
            camera.stop_follow();
            camera.set_zoom(1.0);
        }
        camera.update(world.player.pos());

        log::info!(
            "Level {} loaded: {} fireballs, {} coins, {} enemies",
            level,
            world.fireballs.len(),
            world.coins.len(),
            world.enemies.len()
        );

        self.state.world = Some(world);
        self.state.loads += 1;
        self.emit(GameEvent::LevelLoaded { level });
    }

    /// Overlap handler: player touched a fireball
    pub fn collect_fireball(&mut self, id: u32) -> bool {
        let Some(world) = self.state.world.as_mut() else {
            return false;
        };
        let Some(index) = world.fireballs.iter().position(|f| f.id == id) else {
            return false;
        };
        world.fireballs.remove(index);

        self.state.counters.fireballs += 1;
        self.state.hud.sync(&self.state.counters);
        let total = self.state.counters.fireballs;
        log::debug!("Fireball {} collected ({} total)", id, total);
        self.emit(GameEvent::FireballCollected { total });
        true
    }

    /// Overlap handler: player touched a coin
    pub fn collect_coin(&mut self, id: u32) -> bool {
        let Some(world) = self.state.world.as_mut() else {
            return false;
        };
        let Some(index) = world.coins.iter().position(|c| c.id == id) else {
            return false;
        };
        world.coins.remove(index);

        let counters = &mut self.state.counters;
        counters.coins += 1;
        counters.score += self.rules.coin_score;
        let (total, score) = (counters.coins, counters.score);
        self.state.hud.sync(&self.state.counters);
        log::debug!("Coin {} collected (score {})", id, score);
        self.emit(GameEvent::CoinCollected { total, score });
        true
    }

    /// Collider handler: an enemy caught the player. Back to level 1 with nothing.
    pub fn hit_enemy(&mut self, enemy_id: u32) {
        let caught_on = self.state.current_level;
        log::info!("Caught by enemy {} on level {}", enemy_id, caught_on);

        self.state.counters.reset();
        self.state.hud.sync(&self.state.counters);
        self.state.current_level = LevelId::FIRST;
        self.state.camera.reset();
        self.load_level(LevelId::FIRST);
        self.emit(GameEvent::PlayerCaught { level: caught_on });
    }

    fn unlocked(&self) -> bool {
        self.state.counters.fireballs >= self.rules.fireballs_to_unlock
    }

    /// Overlap handler for the exit zone; returns true if the level advanced
    pub fn try_reach_exit(&mut self) -> bool {
        if !self.unlocked() {
            log::trace!(
                "Exit locked: {}/{} fireballs",
                self.state.counters.fireballs,
                self.rules.fireballs_to_unlock
            );
            return false;
        }
        let from = self.state.current_level;
        let Some(to) = from.next() else {
            return false;
        };

        log::info!("Level {} cleared, advancing to {}", from, to);
        self.state.current_level = to;
        self.load_level(to);
        self.emit(GameEvent::LevelAdvanced { from, to });
        true
    }

    /// Overlap handler for the final zone; returns true if the countdown started
    pub fn reach_final(&mut self) -> bool {
        if !self.unlocked() || !self.state.win.is_idle() {
            return false;
        }

        log::info!("Final zone reached, restarting in {}s", self.rules.countdown_from);
        self.state.physics_paused = true;
        self.state.win = WinSequence::Counting {
            remaining: self.rules.countdown_from,
            ticks_left: self.rules.ticks_per_second,
        };
        self.state.hud.banner = Some(Hud::countdown_text(self.rules.countdown_from));
        self.emit(GameEvent::VictoryStarted);
        true
    }

    /// Advance the victory countdown by one tick
    pub(super) fn advance_win_sequence(&mut self) {
        let win = self.state.win;
        match win {
            WinSequence::Idle => {}
            WinSequence::Counting {
                remaining,
                ticks_left,
            } => {
                if ticks_left > 1 {
                    self.state.win = WinSequence::Counting {
                        remaining,
                        ticks_left: ticks_left - 1,
                    };
                    return;
                }
                let remaining = remaining.saturating_sub(1);
                self.state.hud.banner = Some(Hud::countdown_text(remaining));
                self.state.win = if remaining == 0 {
                    WinSequence::Resetting
                } else {
                    WinSequence::Counting {
                        remaining,
                        ticks_left: self.rules.ticks_per_second,
                    }
                };
                self.emit(GameEvent::CountdownTick { remaining });
            }
            WinSequence::Resetting => self.restart(),
        }
    }

    /// Full reset after the countdown: fresh counters, level 1, physics running
    fn restart(&mut self) {
        if let Some(world) = self.state.world.as_mut() {
            world.contacts.clear();
        }
        self.state.hud.banner = None;
        self.state.physics_paused = false;
        self.state.counters.reset();
        self.state.hud.sync(&self.state.counters);
        self.state.current_level = LevelId::FIRST;
        self.state.camera.reset();
        self.state.win = WinSequence::Idle;
        self.load_level(LevelId::FIRST);
        log::info!("Game restarted");
        self.emit(GameEvent::GameRestarted);
    }
}
