//! Enemy patrol/chase behavior
//!
//! The mode is re-derived from the player's distance every frame; the stored
//! mode only matters for hysteresis and for restoring patrol velocity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::Body;
use crate::consts::*;

/// Patrol axis read from the map object's `move` property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    /// `move` property value; missing or unknown values patrol horizontally
    pub fn from_property(value: Option<&str>) -> Self {
        match value {
            None | Some("horizontal") => Axis::Horizontal,
            Some("vertical") => Axis::Vertical,
            Some(other) => {
                log::warn!("Unknown enemy move '{}', patrolling horizontally", other);
                Axis::Horizontal
            }
        }
    }

    pub fn unit(&self) -> Vec2 {
        match self {
            Axis::Horizontal => Vec2::X,
            Axis::Vertical => Vec2::Y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyMode {
    #[default]
    Patrol,
    Chase,
}

/// Distances and speed for the chase decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChaseRules {
    /// Start chasing below this distance
    pub radius: f32,
    /// Keep chasing until the distance reaches `radius + hysteresis`
    pub hysteresis: f32,
    pub speed: f32,
}

impl ChaseRules {
    pub fn next_mode(&self, current: EnemyMode, distance: f32) -> EnemyMode {
        let limit = match current {
            EnemyMode::Patrol => self.radius,
            EnemyMode::Chase => self.radius + self.hysteresis,
        };
        if distance < limit {
            EnemyMode::Chase
        } else {
            EnemyMode::Patrol
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub body: Body,
    pub axis: Axis,
    /// Signed patrol speed along `axis`
    pub speed: f32,
    pub start: Vec2,
    pub mode: EnemyMode,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, axis: Axis, speed: f32) -> Self {
        Self {
            id,
            body: Body::new(pos, ENEMY_SIZE).with_world_bounds(),
            axis,
            speed,
            start: pos,
            mode: EnemyMode::Patrol,
        }
    }

    pub fn patrol_velocity(&self) -> Vec2 {
        self.axis.unit() * self.speed
    }

    /// Set velocity to the patrol velocity
    pub fn start_patrol(&mut self) {
        self.body.vel = self.patrol_velocity();
    }

    /// Whether the last physics step stopped this enemy along its patrol axis
    pub fn blocked_on_axis(&self) -> bool {
        match self.axis {
            Axis::Horizontal => self.body.blocked.horizontal(),
            Axis::Vertical => self.body.blocked.vertical(),
        }
    }

    /// Per-frame behavior update; returns the new mode on a transition
    pub fn update(&mut self, player_pos: Vec2, rules: &ChaseRules) -> Option<EnemyMode> {
        let distance = self.body.pos.distance(player_pos);
        let previous = self.mode;
        self.mode = rules.next_mode(previous, distance);

        match self.mode {
            EnemyMode::Chase => {
                self.body.vel = (player_pos - self.body.pos).normalize_or_zero() * rules.speed;
            }
            EnemyMode::Patrol if previous == EnemyMode::Chase => {
                self.start_patrol();
            }
            EnemyMode::Patrol => {
                if self.blocked_on_axis() {
                    self.speed = -self.speed;
                    self.start_patrol();
                }
            }
        }

        (self.mode != previous).then_some(self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy(axis: Axis) -> Enemy {
        let mut enemy = Enemy::new(1, Vec2::new(100.0, 100.0), axis, ENEMY_PATROL_SPEED);
        enemy.start_patrol();
        enemy
    }

    const FAR: Vec2 = Vec2::new(1000.0, 1000.0);

    /// Plain threshold, no hysteresis
    const RULES: ChaseRules = ChaseRules {
        radius: ENEMY_CHASE_RADIUS,
        hysteresis: 0.0,
        speed: ENEMY_CHASE_SPEED,
    };

    #[test]
    fn test_axis_default_is_horizontal() {
        assert_eq!(Axis::from_property(None), Axis::Horizontal);
        assert_eq!(Axis::from_property(Some("vertical")), Axis::Vertical);
        assert_eq!(Axis::from_property(Some("diagonal")), Axis::Horizontal);
    }

    #[test]
    fn test_patrol_velocity_along_axis() {
        assert_eq!(enemy(Axis::Horizontal).body.vel, Vec2::new(30.0, 0.0));
        assert_eq!(enemy(Axis::Vertical).body.vel, Vec2::new(0.0, 30.0));
    }

    #[test]
    fn test_patrol_reverses_when_blocked_on_axis() {
        let mut e = enemy(Axis::Horizontal);
        e.body.blocked.right = true;
        e.body.vel = Vec2::ZERO;
        assert_eq!(e.update(FAR, &RULES), None);
        assert_eq!(e.speed, -30.0);
        assert_eq!(e.body.vel, Vec2::new(-30.0, 0.0));
    }

    #[test]
    fn test_patrol_ignores_block_on_other_axis() {
        let mut e = enemy(Axis::Horizontal);
        e.body.blocked.down = true;
        e.update(FAR, &RULES);
        assert_eq!(e.speed, 30.0);
        assert_eq!(e.body.vel, Vec2::new(30.0, 0.0));

        let mut v = enemy(Axis::Vertical);
        v.body.blocked.left = true;
        v.update(FAR, &RULES);
        assert_eq!(v.speed, 30.0);
    }

    #[test]
    fn test_unblocked_patrol_keeps_direction() {
        let mut e = enemy(Axis::Vertical);
        for _ in 0..10 {
            e.update(FAR, &RULES);
        }
        assert_eq!(e.body.vel, Vec2::new(0.0, 30.0));
    }

    #[test]
    fn test_chase_moves_toward_player() {
        let mut e = enemy(Axis::Horizontal);
        let player = Vec2::new(100.0, 200.0); // 100 units below
        assert_eq!(e.update(player, &RULES), Some(EnemyMode::Chase));
        assert!((e.body.vel - Vec2::new(0.0, 40.0)).length() < 1e-4);
    }

    #[test]
    fn test_chase_to_patrol_restores_axis_velocity() {
        let mut e = enemy(Axis::Horizontal);
        e.update(Vec2::new(100.0, 150.0), &RULES);
        assert_eq!(e.mode, EnemyMode::Chase);
        assert_eq!(e.update(FAR, &RULES), Some(EnemyMode::Patrol));
        assert_eq!(e.body.vel, Vec2::new(30.0, 0.0));
    }

    #[test]
    fn test_boundary_without_hysteresis_flickers() {
        let rules = RULES;
        assert_eq!(rules.next_mode(EnemyMode::Patrol, 119.9), EnemyMode::Chase);
        assert_eq!(rules.next_mode(EnemyMode::Chase, 120.0), EnemyMode::Patrol);
    }

    #[test]
    fn test_hysteresis_holds_chase() {
        let rules = ChaseRules {
            hysteresis: 16.0,
            ..RULES
        };
        assert_eq!(rules.next_mode(EnemyMode::Patrol, 125.0), EnemyMode::Patrol);
        assert_eq!(rules.next_mode(EnemyMode::Chase, 125.0), EnemyMode::Chase);
        assert_eq!(rules.next_mode(EnemyMode::Chase, 136.0), EnemyMode::Patrol);
    }
}
