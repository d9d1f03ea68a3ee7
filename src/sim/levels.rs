//! Level numbering and the validated set of level maps

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::tilemap::{LevelMap, ObjectKind};
use crate::consts::MAX_LEVEL;
use crate::{GameError, MapError};

/// A level number in 1..=MAX_LEVEL
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LevelId(u8);

impl LevelId {
    pub const FIRST: LevelId = LevelId(1);
    pub const LAST: LevelId = LevelId(MAX_LEVEL);

    pub fn new(number: u8) -> Option<Self> {
        (1..=MAX_LEVEL).contains(&number).then_some(Self(number))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    pub fn is_final(self) -> bool {
        self == Self::LAST
    }

    /// Resource key, e.g. `level2`
    pub fn key(self) -> String {
        format!("level{}", self.0)
    }

    pub fn all() -> impl Iterator<Item = LevelId> {
        (1..=MAX_LEVEL).map(LevelId)
    }
}

impl std::fmt::Display for LevelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A map that passed validation, with its spawn point resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub id: LevelId,
    pub spawn: Vec2,
    pub map: LevelMap,
}

impl Level {
    /// Check the placement rules for the given level number
    pub fn validate(id: LevelId, map: LevelMap) -> Result<Self, MapError> {
        let level = id.get();
        let spawns: Vec<Vec2> = map
            .objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Spawn)
            .map(|o| o.pos)
            .collect();
        let spawn = match spawns.as_slice() {
            [] => return Err(MapError::MissingSpawn { level }),
            [spawn] => *spawn,
            many => {
                return Err(MapError::DuplicateSpawn {
                    level,
                    count: many.len(),
                });
            }
        };

        if id.is_final() {
            if map.find(&ObjectKind::Final).is_none() {
                return Err(MapError::MissingFinal { level });
            }
            if map.find(&ObjectKind::Exit).is_some() {
                log::warn!("Level {} is the last level; its exit zone is ignored", level);
            }
        } else {
            if map.find(&ObjectKind::Exit).is_none() {
                return Err(MapError::MissingExit { level });
            }
            if map.find(&ObjectKind::Final).is_some() {
                log::warn!("Level {} is not the last level; its final zone is ignored", level);
            }
        }

        Ok(Self { id, spawn, map })
    }
}

/// All levels of the game, validated
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSet {
    levels: Vec<Level>,
}

impl LevelSet {
    /// Validate maps given in level order
    pub fn new(maps: Vec<LevelMap>) -> Result<Self, MapError> {
        if maps.len() != MAX_LEVEL as usize {
            return Err(MapError::WrongLevelCount {
                expected: MAX_LEVEL as usize,
                actual: maps.len(),
            });
        }
        let levels = LevelId::all()
            .zip(maps)
            .map(|(id, map)| Level::validate(id, map))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { levels })
    }

    /// Load `level1.json` ..= `level3.json` from a directory
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, GameError> {
        let dir = dir.as_ref();
        let maps = LevelId::all()
            .map(|id| {
                let path = dir.join(format!("{}.json", id.key()));
                log::debug!("Loading {}", path.display());
                LevelMap::load(path)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let set = Self::new(maps)?;
        log::info!("Loaded {} levels from {}", set.levels.len(), dir.display());
        Ok(set)
    }

    /// Levels compiled into the binary
    pub fn builtin() -> Result<Self, MapError> {
        let maps = BUILTIN_LAYOUTS
            .iter()
            .map(|rows| LevelMap::from_ascii(rows))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(maps)
    }

    pub fn get(&self, id: LevelId) -> &Level {
        &self.levels[id.get() as usize - 1]
    }
}

const BUILTIN_LAYOUTS: [&[&str]; 3] = [
    &[
        "####################",
        "#P.....#...........#",
        "#.###..#..F.....F..#",
        "#.#F...#......####.#",
        "#.#....#...........#",
        "#...F.......E......#",
        "#####..####....#...#",
        "#..F....#......#.F.#",
        "#.......#......#...#",
        "#.####..#...####...#",
        "#.......F.......X..#",
        "####################",
    ],
    &[
        "##############################",
        "#P......#.........#.........F#",
        "#.####..#..F......#..V......##",
        "#.#..F..#.........#.........##",
        "#.#.....####..E.......####..##",
        "#.#.........................##",
        "#.######..........F.....#...##",
        "#........#####..........#...##",
        "#..F.....#...#....###...#...##",
        "####.....#.F.#....#X#...#...##",
        "#........#...#..........#..F.#",
        "#..E.....#..................##",
        "#....F...............E......##",
        "##############################",
    ],
    &[
        "########################################",
        "#P.....#..........#...........#.......F#",
        "#......#..F.......#.....V.....#........#",
        "#..##..#..........#...........#..####..#",
        "#..#F..######..####....F......#..#.....#",
        "#..#.......E.......................#...#",
        "#..#####.......................E...#.F.#",
        "#......#....####........####.......#...#",
        "#..F...#....#..#...V....#..#.......#####",
        "#......#....#F.#........#.F#...........#",
        "######.#....#..#........#..#...........#",
        "#...........#..#...E.......#.....####..#",
        "#..V........#..#...........#.....#W....#",
        "#......F....#..#...........#.....#.....#",
        "#..........................#...F.#..E..#",
        "########################################",
    ],
];
