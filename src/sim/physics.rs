//! Arcade physics for axis-aligned bodies on a tile grid
//!
//! Bodies move by velocity, resolve against solid tiles one axis at a time,
//! and report which sides were blocked this step. Contact rules record which
//! groups collide or overlap; the tick evaluates them after each step.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Slack used when mapping edges to tile indices
const EDGE_EPSILON: f32 = 1e-3;

/// Axis-aligned rectangle in world pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Solid ground derived from a tilemap's collision layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    pub width: usize,
    pub height: usize,
    pub tile_size: f32,
    solid: Vec<bool>,
}

impl TileGrid {
    /// Build a grid; `solid` is row-major and must hold `width * height` cells
    pub fn new(width: usize, height: usize, tile_size: f32, solid: Vec<bool>) -> Self {
        debug_assert_eq!(solid.len(), width * height);
        Self {
            width,
            height,
            tile_size,
            solid,
        }
    }

    /// Tiles outside the grid are never solid; world bounds handle the edges
    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return false;
        }
        self.solid[row as usize * self.width + col as usize]
    }

    pub fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.width && (row as usize) < self.height
    }

    /// Map size in pixels
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 * self.tile_size,
            self.height as f32 * self.tile_size,
        )
    }

    /// Whether any solid tile intersects the rectangle
    pub fn overlaps_solid(&self, rect: &Rect) -> bool {
        let cols = tile_span(rect.min.x, rect.max.x, self.tile_size);
        let rows = tile_span(rect.min.y, rect.max.y, self.tile_size);
        rows.into_iter()
            .any(|row| cols.clone().any(|col| self.is_solid(col, row)))
    }
}

/// Indices of the tiles a [min, max) span touches
fn tile_span(min: f32, max: f32, tile_size: f32) -> std::ops::RangeInclusive<i32> {
    let first = ((min + EDGE_EPSILON) / tile_size).floor() as i32;
    let last = ((max - EDGE_EPSILON) / tile_size).floor() as i32;
    first..=last
}

/// Sides a body was stopped on during the last step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocked {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Blocked {
    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }

    pub fn vertical(&self) -> bool {
        self.up || self.down
    }
}

/// A dynamic or static physics body (position is the center)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub half: Vec2,
    pub blocked: Blocked,
    pub collide_world_bounds: bool,
}

impl Body {
    /// Square body of edge `size` centered on `pos`
    pub fn new(pos: Vec2, size: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            half: Vec2::splat(size / 2.0),
            blocked: Blocked::default(),
            collide_world_bounds: false,
        }
    }

    pub fn with_world_bounds(mut self) -> Self {
        self.collide_world_bounds = true;
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, self.half)
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.rect().overlaps(&other.rect())
    }
}

/// Advance a body one step: x then y, each resolved against ground and bounds
pub fn step_body(body: &mut Body, dt: f32, ground: Option<&TileGrid>, bounds: &Rect) {
    body.blocked = Blocked::default();

    if body.vel.x != 0.0 {
        body.pos.x += body.vel.x * dt;
        if let Some(grid) = ground {
            resolve_tiles_x(body, grid);
        }
    }
    if body.collide_world_bounds {
        clamp_bounds_x(body, bounds);
    }

    if body.vel.y != 0.0 {
        body.pos.y += body.vel.y * dt;
        if let Some(grid) = ground {
            resolve_tiles_y(body, grid);
        }
    }
    if body.collide_world_bounds {
        clamp_bounds_y(body, bounds);
    }

    log::trace!(
        "body at ({:.1}, {:.1}) vel ({:.1}, {:.1}) blocked {:?}",
        body.pos.x,
        body.pos.y,
        body.vel.x,
        body.vel.y,
        body.blocked
    );
}

fn resolve_tiles_x(body: &mut Body, grid: &TileGrid) {
    let rect = body.rect();
    let ts = grid.tile_size;
    let rows = tile_span(rect.min.y, rect.max.y, ts);

    if body.vel.x > 0.0 {
        let col = ((rect.max.x - EDGE_EPSILON) / ts).floor() as i32;
        if rows.into_iter().any(|row| grid.is_solid(col, row)) {
            body.pos.x = col as f32 * ts - body.half.x;
            body.vel.x = 0.0;
            body.blocked.right = true;
        }
    } else {
        let col = ((rect.min.x + EDGE_EPSILON) / ts).floor() as i32;
        if rows.into_iter().any(|row| grid.is_solid(col, row)) {
            body.pos.x = (col + 1) as f32 * ts + body.half.x;
            body.vel.x = 0.0;
            body.blocked.left = true;
        }
    }
}

fn resolve_tiles_y(body: &mut Body, grid: &TileGrid) {
    let rect = body.rect();
    let ts = grid.tile_size;
    let cols = tile_span(rect.min.x, rect.max.x, ts);

    if body.vel.y > 0.0 {
        let row = ((rect.max.y - EDGE_EPSILON) / ts).floor() as i32;
        if cols.into_iter().any(|col| grid.is_solid(col, row)) {
            body.pos.y = row as f32 * ts - body.half.y;
            body.vel.y = 0.0;
            body.blocked.down = true;
        }
    } else {
        let row = ((rect.min.y + EDGE_EPSILON) / ts).floor() as i32;
        if cols.into_iter().any(|col| grid.is_solid(col, row)) {
            body.pos.y = (row + 1) as f32 * ts + body.half.y;
            body.vel.y = 0.0;
            body.blocked.up = true;
        }
    }
}

fn clamp_bounds_x(body: &mut Body, bounds: &Rect) {
    if body.pos.x - body.half.x < bounds.min.x {
        body.pos.x = bounds.min.x + body.half.x;
        body.blocked.left = true;
        body.vel.x = body.vel.x.max(0.0);
    } else if body.pos.x + body.half.x > bounds.max.x {
        body.pos.x = bounds.max.x - body.half.x;
        body.blocked.right = true;
        body.vel.x = body.vel.x.min(0.0);
    }
}

fn clamp_bounds_y(body: &mut Body, bounds: &Rect) {
    if body.pos.y - body.half.y < bounds.min.y {
        body.pos.y = bounds.min.y + body.half.y;
        body.blocked.up = true;
        body.vel.y = body.vel.y.max(0.0);
    } else if body.pos.y + body.half.y > bounds.max.y {
        body.pos.y = bounds.max.y - body.half.y;
        body.blocked.down = true;
        body.vel.y = body.vel.y.min(0.0);
    }
}

/// Entity groups that contact rules refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Group {
    Player,
    Enemies,
    Ground,
    Fireballs,
    Coins,
    Exit,
    Final,
}

/// A registered interaction between two groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    /// Blocking; ground colliders are resolved during the step
    Collider(Group, Group),
    /// Non-blocking; fires a handler while the bodies intersect
    Overlap(Group, Group),
}

/// Contact rules for the loaded level, evaluated in registration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactRules {
    rules: Vec<Contact>,
}

impl ContactRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_collider(&mut self, a: Group, b: Group) {
        self.rules.push(Contact::Collider(a, b));
    }

    pub fn add_overlap(&mut self, a: Group, b: Group) {
        self.rules.push(Contact::Overlap(a, b));
    }

    /// Remove every rule (level teardown)
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.rules.iter()
    }

    /// Whether bodies of `group` are blocked by ground tiles
    pub fn collides_with_ground(&self, group: Group) -> bool {
        self.rules.iter().any(|rule| {
            matches!(rule, Contact::Collider(a, b)
                if (*a == group && *b == Group::Ground) || (*b == group && *a == Group::Ground))
        })
    }
}
