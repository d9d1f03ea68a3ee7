//! Tilemap loading
//!
//! Reads Tiled JSON maps: the `tileLayer` tile layer becomes the ground grid
//! (tiles whose tileset entry has `collide = true` are solid) and the
//! `objects` object layer becomes the placement manifest.

use std::path::Path;

use glam::Vec2;
use serde::Deserialize;

use super::enemy::Axis;
use super::physics::TileGrid;
use crate::consts::TILE_SIZE;
use crate::{GameError, MapError, tile_center};

/// Name of the layer that holds ground tiles
pub const TILE_LAYER: &str = "tileLayer";
/// Name of the layer that holds placement objects
pub const OBJECT_LAYER: &str = "objects";

/// What a map object places
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Spawn,
    Coin,
    Fireball,
    Enemy { axis: Axis },
    Exit,
    Final,
    Other(String),
}

impl ObjectKind {
    fn parse(type_name: &str, properties: &[TiledProperty]) -> Self {
        match type_name {
            "spawn" => ObjectKind::Spawn,
            "coins" | "coin" => ObjectKind::Coin,
            "fireball" => ObjectKind::Fireball,
            "enemy" => {
                let axis = properties
                    .iter()
                    .find(|p| p.name == "move")
                    .and_then(|p| p.value.as_str());
                ObjectKind::Enemy {
                    axis: Axis::from_property(axis),
                }
            }
            "exit" => ObjectKind::Exit,
            "final" => ObjectKind::Final,
            other => ObjectKind::Other(other.to_string()),
        }
    }
}

/// A placed object, positioned at its center in world pixels
#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    pub pos: Vec2,
    pub kind: ObjectKind,
}

/// Ground grid plus ordered object manifest
#[derive(Debug, Clone, PartialEq)]
pub struct LevelMap {
    pub grid: TileGrid,
    pub objects: Vec<MapObject>,
}

// Raw Tiled JSON

#[derive(Debug, Deserialize)]
struct TiledMap {
    width: usize,
    height: usize,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    layers: Vec<TiledLayer>,
    #[serde(default)]
    tilesets: Vec<TiledTileset>,
}

#[derive(Debug, Deserialize)]
struct TiledLayer {
    name: String,
    #[serde(default)]
    data: Option<Vec<u32>>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    objects: Option<Vec<TiledObject>>,
}

#[derive(Debug, Deserialize)]
struct TiledObject {
    x: f32,
    y: f32,
    #[serde(default)]
    r#type: String,
    /// Tiled 1.9+ writes `class` instead of `type`
    #[serde(default)]
    class: String,
    #[serde(default)]
    properties: Vec<TiledProperty>,
}

impl TiledObject {
    fn type_name(&self) -> &str {
        if self.r#type.is_empty() {
            &self.class
        } else {
            &self.r#type
        }
    }
}

#[derive(Debug, Deserialize)]
struct TiledProperty {
    name: String,
    value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct TiledTileset {
    firstgid: u32,
    #[serde(default)]
    tiles: Vec<TiledTile>,
}

#[derive(Debug, Deserialize)]
struct TiledTile {
    id: u32,
    #[serde(default)]
    properties: Vec<TiledProperty>,
}

/// Tiled stores flip flags in the top bits of each gid
const GID_MASK: u32 = 0x0FFF_FFFF;

impl TiledMap {
    fn collides(&self, gid: u32) -> bool {
        let gid = gid & GID_MASK;
        if gid == 0 {
            return false;
        }
        // Owning tileset is the one with the largest firstgid <= gid
        let Some(tileset) = self
            .tilesets
            .iter()
            .filter(|t| t.firstgid <= gid)
            .max_by_key(|t| t.firstgid)
        else {
            return false;
        };
        let local = gid - tileset.firstgid;
        tileset
            .tiles
            .iter()
            .find(|t| t.id == local)
            .is_some_and(|t| {
                t.properties
                    .iter()
                    .any(|p| p.name == "collide" && p.value == serde_json::Value::Bool(true))
            })
    }
}

impl LevelMap {
    /// Parse a Tiled JSON map
    pub fn from_tiled_json(json: &str) -> Result<Self, GameError> {
        let map: TiledMap = serde_json::from_str(json)?;
        if map.tilewidth != map.tileheight {
            return Err(MapError::NonSquareTiles {
                width: map.tilewidth,
                height: map.tileheight,
            }
            .into());
        }

        let tile_layer = map
            .layers
            .iter()
            .find(|l| l.name == TILE_LAYER)
            .ok_or(MapError::MissingLayer(TILE_LAYER))?;
        if let Some(encoding) = &tile_layer.encoding {
            if encoding != "csv" {
                return Err(MapError::UnsupportedEncoding(encoding.clone()).into());
            }
        }
        let data = tile_layer
            .data
            .as_ref()
            .ok_or(MapError::MissingLayer(TILE_LAYER))?;
        let expected = map.width * map.height;
        if data.len() != expected {
            return Err(MapError::DataSizeMismatch {
                expected,
                actual: data.len(),
            }
            .into());
        }
        let solid = data.iter().map(|&gid| map.collides(gid)).collect();
        let grid = TileGrid::new(map.width, map.height, map.tilewidth as f32, solid);

        let raw_objects = map
            .layers
            .iter()
            .find(|l| l.name == OBJECT_LAYER)
            .and_then(|l| l.objects.as_ref())
            .ok_or(MapError::MissingLayer(OBJECT_LAYER))?;
        let objects = raw_objects
            .iter()
            .map(|o| MapObject {
                pos: Vec2::new(o.x, o.y),
                kind: ObjectKind::parse(o.type_name(), &o.properties),
            })
            .collect();

        Ok(Self { grid, objects })
    }

    /// Load a Tiled JSON map from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| GameError::Level {
            path: path.display().to_string(),
            source: Box::new(e.into()),
        })?;
        Self::from_tiled_json(&json).map_err(|e| GameError::Level {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    }

    /// Build a map from an ASCII layout.
    ///
    /// `#` solid, `P` spawn, `F` fireball, `C` coin, `E` horizontal enemy,
    /// `V` vertical enemy, `X` exit, `W` final zone; anything else is floor.
    /// Short rows are padded with floor.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, MapError> {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(MapError::EmptyLayout);
        }

        let mut solid = vec![false; width * height];
        let mut objects = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let pos = tile_center(col as i32, row as i32, TILE_SIZE);
                let kind = match ch {
                    '#' => {
                        solid[row * width + col] = true;
                        continue;
                    }
                    'P' => ObjectKind::Spawn,
                    'F' => ObjectKind::Fireball,
                    'C' => ObjectKind::Coin,
                    'E' => ObjectKind::Enemy {
                        axis: Axis::Horizontal,
                    },
                    'V' => ObjectKind::Enemy {
                        axis: Axis::Vertical,
                    },
                    'X' => ObjectKind::Exit,
                    'W' => ObjectKind::Final,
                    _ => continue,
                };
                objects.push(MapObject { pos, kind });
            }
        }

        Ok(Self {
            grid: TileGrid::new(width, height, TILE_SIZE, solid),
            objects,
        })
    }

    pub fn count(&self, kind: &ObjectKind) -> usize {
        self.objects.iter().filter(|o| &o.kind == kind).count()
    }

    pub fn find(&self, kind: &ObjectKind) -> Option<&MapObject> {
        self.objects.iter().find(|o| &o.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "width": 3, "height": 2, "tilewidth": 16, "tileheight": 16,
        "tilesets": [
            { "firstgid": 1, "name": "tiles",
              "tiles": [ { "id": 1, "properties": [
                  { "name": "collide", "type": "bool", "value": true } ] } ] }
        ],
        "layers": [
            { "name": "tileLayer", "type": "tilelayer", "data": [2, 1, 2, 0, 1, 2] },
            { "name": "objects", "type": "objectgroup", "objects": [
                { "id": 1, "type": "spawn", "x": 24, "y": 8 },
                { "id": 2, "type": "enemy", "x": 8, "y": 24,
                  "properties": [ { "name": "move", "type": "string", "value": "vertical" } ] },
                { "id": 3, "class": "fireball", "x": 40, "y": 24 },
                { "id": 4, "type": "decoration", "x": 0, "y": 0 }
            ] }
        ]
    }"#;

    #[test]
    fn test_parse_tiled_map() {
        let map = LevelMap::from_tiled_json(SAMPLE).unwrap();
        assert_eq!(map.grid.width, 3);
        assert_eq!(map.grid.height, 2);
        assert!(map.grid.is_solid(0, 0));
        assert!(!map.grid.is_solid(1, 0));
        assert!(map.grid.is_solid(2, 0));
        assert!(!map.grid.is_solid(0, 1));
        assert!(map.grid.is_solid(2, 1));

        assert_eq!(map.objects.len(), 4);
        assert_eq!(map.objects[0].kind, ObjectKind::Spawn);
        assert_eq!(map.objects[0].pos, Vec2::new(24.0, 8.0));
        assert_eq!(
            map.objects[1].kind,
            ObjectKind::Enemy {
                axis: Axis::Vertical
            }
        );
        assert_eq!(map.objects[2].kind, ObjectKind::Fireball);
        assert_eq!(map.objects[3].kind, ObjectKind::Other("decoration".into()));
    }

    #[test]
    fn test_non_square_tiles_rejected() {
        let json = SAMPLE.replace(r#""tileheight": 16"#, r#""tileheight": 8"#);
        assert!(matches!(
            LevelMap::from_tiled_json(&json),
            Err(GameError::Map(MapError::NonSquareTiles {
                width: 16,
                height: 8
            }))
        ));
    }

    #[test]
    fn test_tile_size_from_map() {
        let json = SAMPLE
            .replace(r#""tilewidth": 16"#, r#""tilewidth": 32"#)
            .replace(r#""tileheight": 16"#, r#""tileheight": 32"#);
        let map = LevelMap::from_tiled_json(&json).unwrap();
        assert_eq!(map.grid.pixel_size(), Vec2::new(96.0, 64.0));
    }

    #[test]
    fn test_type_wins_over_class() {
        let json = SAMPLE.replace(
            r#"{ "id": 3, "class": "fireball""#,
            r#"{ "id": 3, "type": "coin", "class": "fireball""#,
        );
        let map = LevelMap::from_tiled_json(&json).unwrap();
        assert_eq!(map.objects[2].kind, ObjectKind::Coin);
    }

    #[test]
    fn test_flip_flags_ignored() {
        let json = SAMPLE.replace("[2, 1, 2, 0, 1, 2]", "[2147483650, 1, 2, 0, 1, 2]");
        let map = LevelMap::from_tiled_json(&json).unwrap();
        assert!(map.grid.is_solid(0, 0));
    }

    #[test]
    fn test_enemy_without_move_is_horizontal() {
        let map = LevelMap::from_ascii(&["PE"]).unwrap();
        let json = SAMPLE.replace(r#""value": "vertical""#, r#""value": 3"#);
        let parsed = LevelMap::from_tiled_json(&json).unwrap();
        assert_eq!(
            parsed.objects[1].kind,
            ObjectKind::Enemy {
                axis: Axis::Horizontal
            }
        );
        assert_eq!(
            map.objects[1].kind,
            ObjectKind::Enemy {
                axis: Axis::Horizontal
            }
        );
    }

    #[test]
    fn test_missing_object_layer() {
        let json = SAMPLE.replace(r#""name": "objects""#, r#""name": "props""#);
        assert!(matches!(
            LevelMap::from_tiled_json(&json),
            Err(GameError::Map(MapError::MissingLayer("objects")))
        ));
    }

    #[test]
    fn test_base64_rejected() {
        let json = SAMPLE.replace(
            r#""data": [2, 1, 2, 0, 1, 2]"#,
            r#""encoding": "base64", "data": []"#,
        );
        assert!(matches!(
            LevelMap::from_tiled_json(&json),
            Err(GameError::Map(MapError::UnsupportedEncoding(_)))
        ));
    }

    #[test]
    fn test_data_size_mismatch() {
        let json = SAMPLE.replace("[2, 1, 2, 0, 1, 2]", "[2, 1, 2]");
        assert!(matches!(
            LevelMap::from_tiled_json(&json),
            Err(GameError::Map(MapError::DataSizeMismatch {
                expected: 6,
                actual: 3
            }))
        ));
    }

    #[test]
    fn test_from_ascii() {
        let map = LevelMap::from_ascii(&["#####", "#PFX#", "#CV", "#####"]).unwrap();
        assert_eq!(map.grid.width, 5);
        assert_eq!(map.grid.height, 4);
        assert!(map.grid.is_solid(0, 2));
        assert!(!map.grid.is_solid(4, 2));
        assert_eq!(map.find(&ObjectKind::Spawn).unwrap().pos, Vec2::new(24.0, 24.0));
        assert_eq!(map.count(&ObjectKind::Fireball), 1);
        assert_eq!(map.count(&ObjectKind::Coin), 1);
        assert_eq!(map.count(&ObjectKind::Exit), 1);
        assert_eq!(
            map.count(&ObjectKind::Enemy {
                axis: Axis::Vertical
            }),
            1
        );
    }

    #[test]
    fn test_empty_ascii_rejected() {
        assert_eq!(LevelMap::from_ascii(&[]), Err(MapError::EmptyLayout));
    }
}
