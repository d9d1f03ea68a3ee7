//! Idle/demo mode - the computer plays the game
//!
//! Picks the cheapest fireball until the exit unlocks, then heads for the
//! exit or final zone. Routes come from a Dijkstra search over the tile grid
//! where tiles near enemies cost more and tiles right next to them are
//! closed. Retreats when an enemy gets close and wanders randomly when
//! nothing is reachable.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::controller::Rules;
use super::physics::TileGrid;
use super::state::{GameState, LevelWorld};
use super::tick::TickInput;
use crate::{tile_center, world_to_tile};

/// Tiles whose center is closer than this to an enemy are never entered
const HARD_RADIUS: f32 = 28.0;
/// Tiles closer than this to an enemy cost extra
const SOFT_RADIUS: f32 = 64.0;
/// Extra cost, in steps, of a tile sitting on an enemy
const DANGER_WEIGHT: f32 = 8.0;
/// Cost of one step through a safe tile
const STEP_COST: u32 = 10;
/// Retreat instead of chasing a goal when an enemy is this close
const FLEE_RADIUS: f32 = 32.0;
/// How far (in path cost) a retreat may lead
const RETREAT_COST: u32 = 12 * STEP_COST;
/// Close enough to a waypoint on one axis
const ARRIVE_EPSILON: f32 = 2.0;
/// Ticks to hold a random direction
const WANDER_TICKS: u32 = 30;

type Tile = (i32, i32);

const NEIGHBORS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Shortest 4-connected path over open tiles, excluding `from`
pub fn find_path(grid: &TileGrid, from: Tile, to: Tile) -> Option<Vec<Tile>> {
    if !grid.in_bounds(to.0, to.1) || grid.is_solid(to.0, to.1) {
        return None;
    }
    let mut came_from: HashMap<Tile, Tile> = HashMap::new();
    let mut queue = VecDeque::from([from]);
    came_from.insert(from, from);

    while let Some(tile) = queue.pop_front() {
        if tile == to {
            let mut path = Vec::new();
            let mut cur = tile;
            while cur != from {
                path.push(cur);
                cur = came_from[&cur];
            }
            path.reverse();
            return Some(path);
        }
        for (dx, dy) in NEIGHBORS {
            let next = (tile.0 + dx, tile.1 + dy);
            if grid.in_bounds(next.0, next.1)
                && !grid.is_solid(next.0, next.1)
                && !came_from.contains_key(&next)
            {
                came_from.insert(next, tile);
                queue.push_back(next);
            }
        }
    }
    None
}

/// Distance from `point` to the closest enemy
fn enemy_distance(enemies: &[Vec2], point: Vec2) -> f32 {
    enemies
        .iter()
        .map(|e| e.distance(point))
        .fold(f32::INFINITY, f32::min)
}

/// Cost of stepping onto a tile whose center is `distance` from an enemy
fn step_cost(distance: f32) -> u32 {
    let closeness = ((SOFT_RADIUS - distance) / SOFT_RADIUS).max(0.0);
    STEP_COST + (DANGER_WEIGHT * STEP_COST as f32 * closeness) as u32
}

/// Cheapest routes from one tile, avoiding enemies
#[derive(Debug)]
pub struct RouteMap {
    start: Tile,
    cost: HashMap<Tile, u32>,
    came_from: HashMap<Tile, Tile>,
    /// Tiles in the order they were first reached
    reached: Vec<Tile>,
}

impl RouteMap {
    pub fn build(grid: &TileGrid, start: Tile, enemies: &[Vec2]) -> Self {
        let mut cost = HashMap::from([(start, 0)]);
        let mut came_from = HashMap::from([(start, start)]);
        let mut reached = vec![start];
        let mut heap = BinaryHeap::from([Reverse((0, start))]);

        while let Some(Reverse((spent, tile))) = heap.pop() {
            if spent > cost[&tile] {
                continue;
            }
            for (dx, dy) in NEIGHBORS {
                let next = (tile.0 + dx, tile.1 + dy);
                if !grid.in_bounds(next.0, next.1) || grid.is_solid(next.0, next.1) {
                    continue;
                }
                let distance = enemy_distance(enemies, tile_center(next.0, next.1, grid.tile_size));
                if distance < HARD_RADIUS {
                    continue;
                }
                let total = spent + step_cost(distance);
                let known = cost.get(&next).copied();
                if known.is_some_and(|k| k <= total) {
                    continue;
                }
                if known.is_none() {
                    reached.push(next);
                }
                cost.insert(next, total);
                came_from.insert(next, tile);
                heap.push(Reverse((total, next)));
            }
        }

        Self {
            start,
            cost,
            came_from,
            reached,
        }
    }

    pub fn cost(&self, tile: Tile) -> Option<u32> {
        self.cost.get(&tile).copied()
    }

    /// First tile to step onto on the way to `to`
    pub fn first_step(&self, to: Tile) -> Option<Tile> {
        let mut cur = to;
        loop {
            let prev = *self.came_from.get(&cur)?;
            if prev == self.start {
                return Some(cur);
            }
            cur = prev;
        }
    }
}

/// Digital input that moves `from` toward `to`
fn steer(from: Vec2, to: Vec2) -> TickInput {
    let delta = to - from;
    TickInput {
        left: delta.x < -ARRIVE_EPSILON,
        right: delta.x > ARRIVE_EPSILON,
        up: delta.y < -ARRIVE_EPSILON,
        down: delta.y > ARRIVE_EPSILON,
    }
}

pub struct Autopilot {
    rng: Pcg32,
    wander: Option<(TickInput, u32)>,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            wander: None,
        }
    }

    /// Positions worth heading for, in map order
    fn goals(world: &LevelWorld, fireballs: u32, rules: &Rules) -> Vec<Vec2> {
        if fireballs < rules.fireballs_to_unlock {
            world.fireballs.iter().map(|f| f.body.pos).collect()
        } else {
            world
                .exit
                .as_ref()
                .or(world.finale.as_ref())
                .map(|z| z.body.pos)
                .into_iter()
                .collect()
        }
    }

    fn wander(&mut self, routes: &RouteMap, pos: Vec2, ts: f32) -> TickInput {
        if let Some((input, left)) = self.wander.as_mut() {
            if *left > 0 {
                *left -= 1;
                return *input;
            }
        }
        let (dx, dy) = NEIGHBORS[self.rng.random_range(0..NEIGHBORS.len())];
        let next = (routes.start.0 + dx, routes.start.1 + dy);
        if routes.cost(next).is_none() {
            return steer(pos, tile_center(routes.start.0, routes.start.1, ts));
        }
        let input = TickInput {
            left: dx < 0,
            right: dx > 0,
            up: dy < 0,
            down: dy > 0,
        };
        self.wander = Some((input, WANDER_TICKS));
        input
    }

    /// Input for the next tick
    pub fn next_input(&mut self, state: &GameState, rules: &Rules) -> TickInput {
        let Some(world) = state.world.as_ref() else {
            return TickInput::default();
        };
        if !state.win.is_idle() {
            return TickInput::default();
        }
        let ts = world.ground.tile_size;
        let pos = world.player.pos();
        let enemies: Vec<Vec2> = world.enemies.iter().map(|e| e.body.pos).collect();
        let routes = RouteMap::build(&world.ground, world_to_tile(pos, ts), &enemies);
        let center = |tile: Tile| tile_center(tile.0, tile.1, ts);
        let toward = |tile: Tile| match routes.first_step(tile) {
            Some(step) => steer(pos, center(step)),
            None => steer(pos, center(routes.start)),
        };

        let goal = Self::goals(world, state.counters.fireballs, rules)
            .into_iter()
            .filter_map(|target| {
                let tile = world_to_tile(target, ts);
                routes.cost(tile).map(|cost| (cost, tile, target))
            })
            .min_by_key(|&(cost, _, _)| cost);

        if enemy_distance(&enemies, pos) >= FLEE_RADIUS {
            return match goal {
                Some((_, tile, target)) => {
                    self.wander = None;
                    if tile == routes.start {
                        steer(pos, target)
                    } else {
                        toward(tile)
                    }
                }
                None => self.wander(&routes, pos, ts),
            };
        }

        // Retreat to the nearby tile farthest from any enemy
        let mut retreat = routes.start;
        let mut best: Option<(f32, u32)> = None;
        for &tile in &routes.reached {
            let cost = routes.cost[&tile];
            if cost > RETREAT_COST {
                continue;
            }
            let distance = enemy_distance(&enemies, center(tile));
            let better = match best {
                None => true,
                Some((d, c)) => distance > d || (distance == d && cost < c),
            };
            if better {
                retreat = tile;
                best = Some((distance, cost));
            }
        }
        if let Some((_, tile, _)) = goal {
            if enemy_distance(&enemies, center(tile)) > enemy_distance(&enemies, center(retreat)) {
                retreat = tile;
            }
        }
        toward(retreat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::controller::LevelController;
    use crate::sim::levels::LevelSet;
    use crate::sim::state::GameEvent;
    use crate::sim::tilemap::LevelMap;

    fn grid(rows: &[&str]) -> TileGrid {
        LevelMap::from_ascii(rows).unwrap().grid
    }

    #[test]
    fn test_find_path_around_wall() {
        let g = grid(&["#####", "#..##", "##..#", "#####"]);
        let path = find_path(&g, (1, 1), (3, 2)).unwrap();
        assert_eq!(path, vec![(2, 1), (2, 2), (3, 2)]);
    }

    #[test]
    fn test_find_path_same_tile_is_empty() {
        let g = grid(&["###", "#.#", "###"]);
        assert_eq!(find_path(&g, (1, 1), (1, 1)), Some(vec![]));
    }

    #[test]
    fn test_find_path_unreachable() {
        let g = grid(&["#####", "#.#.#", "#####"]);
        assert_eq!(find_path(&g, (1, 1), (3, 1)), None);
        assert_eq!(find_path(&g, (1, 1), (2, 1)), None);
    }

    #[test]
    fn test_steer() {
        let input = steer(Vec2::new(10.0, 10.0), Vec2::new(30.0, 11.0));
        assert!(input.right && !input.left && !input.up && !input.down);
    }

    #[test]
    fn test_step_cost_grows_near_enemies() {
        assert_eq!(step_cost(100.0), STEP_COST);
        assert_eq!(step_cost(SOFT_RADIUS), STEP_COST);
        assert_eq!(step_cost(32.0), 50);
        assert_eq!(step_cost(0.0), 90);
    }

    #[test]
    fn test_routes_go_around_enemy() {
        let g = grid(&[
            "#########",
            "#.......#",
            "#.......#",
            "#.......#",
            "#.......#",
            "#.......#",
            "#########",
        ]);
        let enemy = tile_center(4, 3, 16.0);
        let routes = RouteMap::build(&g, (1, 3), &[enemy]);

        assert_eq!(routes.cost((4, 3)), None);
        assert_eq!(routes.cost((3, 3)), None);
        let far = routes.cost((7, 3)).unwrap();
        assert!(far > 6 * STEP_COST);

        // Walk the route back and check it never comes close
        let mut tile = (7, 3);
        while tile != (1, 3) {
            assert!(tile_center(tile.0, tile.1, 16.0).distance(enemy) >= HARD_RADIUS);
            tile = routes.came_from[&tile];
        }
    }

    #[test]
    fn test_first_step() {
        let g = grid(&["#####", "#...#", "#####"]);
        let routes = RouteMap::build(&g, (1, 1), &[]);
        assert_eq!(routes.first_step((3, 1)), Some((2, 1)));
        assert_eq!(routes.first_step((1, 1)), Some((1, 1)));
        assert_eq!(routes.first_step((0, 0)), None);
    }

    fn levels(first: &[&str]) -> LevelSet {
        LevelSet::new(vec![
            LevelMap::from_ascii(first).unwrap(),
            LevelMap::from_ascii(&["#P.X#"]).unwrap(),
            LevelMap::from_ascii(&["#P.W#"]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_heads_for_fireball_first() {
        let c = LevelController::new(levels(&["#######", "#XP.F.#", "#######"]), Rules::default());
        let mut pilot = Autopilot::new(1);
        let input = pilot.next_input(&c.state, &c.rules);
        assert!(input.right);
        assert!(!input.left);
    }

    #[test]
    fn test_flees_close_enemy() {
        let c = LevelController::new(levels(&["#######", "#XPE..#", "#######"]), Rules::default());
        let mut pilot = Autopilot::new(1);
        let input = pilot.next_input(&c.state, &c.rules);
        assert!(input.left);
    }

    #[test]
    fn test_clears_winding_level() {
        let mut c = LevelController::new(
            levels(&["#######", "#P.F..#", "#####.#", "#XFFFF#", "#######"]),
            Rules::default(),
        );
        let mut pilot = Autopilot::new(7);
        let mut advanced = false;
        for _ in 0..1200 {
            let input = pilot.next_input(&c.state, &c.rules);
            let events = c.tick(&input, SIM_DT);
            if events.iter().any(|e| matches!(e, GameEvent::LevelAdvanced { .. })) {
                advanced = true;
                break;
            }
        }
        assert!(advanced);
        assert_eq!(c.state.counters.fireballs, 5);
    }

    #[test]
    fn test_clears_builtin_levels() {
        let mut c = LevelController::new(LevelSet::builtin().unwrap(), Rules::default());
        let mut pilot = Autopilot::new(1);
        let mut advanced = Vec::new();
        for _ in 0..3600 {
            let input = pilot.next_input(&c.state, &c.rules);
            for event in c.tick(&input, SIM_DT) {
                if let GameEvent::LevelAdvanced { from, to } = event {
                    advanced.push((from.get(), to.get()));
                }
            }
            if advanced.contains(&(2, 3)) {
                break;
            }
        }
        assert!(advanced.contains(&(1, 2)), "advanced: {:?}", advanced);
        assert!(advanced.contains(&(2, 3)), "advanced: {:?}", advanced);
    }

    #[test]
    fn test_idle_during_countdown() {
        let mut c = LevelController::new(levels(&["#P.X#"]), Rules::default());
        c.state.win = crate::sim::state::WinSequence::Resetting;
        let mut pilot = Autopilot::new(1);
        assert_eq!(pilot.next_input(&c.state, &c.rules), TickInput::default());
    }
}
