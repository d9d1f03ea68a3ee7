//! Fixed timestep simulation tick
//!
//! One frame: victory countdown (if running), physics step, contact
//! handlers, then player input and enemy behavior for the next step.

use glam::Vec2;

use super::controller::LevelController;
use super::physics::{Contact, Group, step_body};
use super::state::GameEvent;

/// Digital direction input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl TickInput {
    pub fn velocity(&self, speed: f32) -> Vec2 {
        let mut vel = Vec2::ZERO;
        if self.left {
            vel.x = -speed;
        } else if self.right {
            vel.x = speed;
        }
        if self.up {
            vel.y = -speed;
        } else if self.down {
            vel.y = speed;
        }
        vel
    }
}

impl LevelController {
    /// Advance the game by one fixed timestep and return what happened
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> Vec<GameEvent> {
        self.state.time_ticks += 1;

        if !self.state.win.is_idle() {
            self.advance_win_sequence();
            return self.drain_events();
        }
        if self.state.physics_paused {
            return self.drain_events();
        }

        self.step_physics(dt);

        let loads = self.state.loads;
        self.resolve_contacts();
        if self.state.loads != loads || !self.state.win.is_idle() {
            // A handler replaced the level or froze the world
            return self.drain_events();
        }

        self.update_player(input);
        self.update_enemies();
        if let Some(pos) = self.state.player_pos() {
            self.state.camera.update(pos);
        }

        self.drain_events()
    }

    fn step_physics(&mut self, dt: f32) {
        let Some(world) = self.state.world.as_mut() else {
            return;
        };

        let player_ground = world
            .contacts
            .collides_with_ground(Group::Player)
            .then_some(&world.ground);
        step_body(&mut world.player.body, dt, player_ground, &world.bounds);

        let enemy_ground = world
            .contacts
            .collides_with_ground(Group::Enemies)
            .then_some(&world.ground);
        for enemy in &mut world.enemies {
            step_body(&mut enemy.body, dt, enemy_ground, &world.bounds);
        }
    }

    /// Run contact handlers in registration order; stop once the level changes
    fn resolve_contacts(&mut self) {
        let Some(world) = self.state.world.as_ref() else {
            return;
        };
        let rules: Vec<Contact> = world.contacts.iter().copied().collect();
        let loads = self.state.loads;

        for rule in rules {
            if self.state.loads != loads || !self.state.win.is_idle() {
                return;
            }
            let Some(world) = self.state.world.as_ref() else {
                return;
            };
            let player = &world.player.body;

            match rule {
                Contact::Collider(Group::Player, Group::Enemies) => {
                    let caught_by = world.enemies.iter().find(|e| e.body.overlaps(player));
                    if let Some(enemy) = caught_by {
                        let id = enemy.id;
                        self.hit_enemy(id);
                    }
                }
                Contact::Overlap(Group::Player, Group::Fireballs) => {
                    let touched: Vec<u32> = world
                        .fireballs
                        .iter()
                        .filter(|f| f.body.overlaps(player))
                        .map(|f| f.id)
                        .collect();
                    for id in touched {
                        self.collect_fireball(id);
                    }
                }
                Contact::Overlap(Group::Player, Group::Coins) => {
                    let touched: Vec<u32> = world
                        .coins
                        .iter()
                        .filter(|c| c.body.overlaps(player))
                        .map(|c| c.id)
                        .collect();
                    for id in touched {
                        self.collect_coin(id);
                    }
                }
                Contact::Overlap(Group::Player, Group::Exit) => {
                    if world.exit.as_ref().is_some_and(|z| z.body.overlaps(player)) {
                        self.try_reach_exit();
                    }
                }
                Contact::Overlap(Group::Player, Group::Final) => {
                    if world.finale.as_ref().is_some_and(|z| z.body.overlaps(player)) {
                        self.reach_final();
                    }
                }
                // Ground colliders are resolved inside the physics step
                _ => {}
            }
        }
    }

    fn update_player(&mut self, input: &TickInput) {
        let speed = self.rules.player_speed;
        if let Some(world) = self.state.world.as_mut() {
            world.player.body.vel = input.velocity(speed);
        }
    }

    fn update_enemies(&mut self) {
        let chase = self.rules.chase;
        let Some(world) = self.state.world.as_mut() else {
            return;
        };
        let player_pos = world.player.pos();

        let mut changes = Vec::new();
        for enemy in &mut world.enemies {
            if let Some(mode) = enemy.update(player_pos, &chase) {
                log::debug!("Enemy {} -> {:?}", enemy.id, mode);
                changes.push(GameEvent::EnemyModeChanged { id: enemy.id, mode });
            }
        }

        for event in changes {
            self.emit(event);
        }
    }
}
