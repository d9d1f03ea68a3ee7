//! Error types
//!
//! Map problems are caught when a level set is loaded so the controller
//! never has to handle a half-valid level at runtime.

use thiserror::Error;

/// Problems with a tilemap or a level set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("layer '{0}' not found")]
    MissingLayer(&'static str),
    #[error("tile data encoding '{0}' is not supported (use CSV/array data)")]
    UnsupportedEncoding(String),
    #[error("tiles are {width}x{height}, only square tiles are supported")]
    NonSquareTiles { width: u32, height: u32 },
    #[error("tile layer has {actual} entries, expected {expected}")]
    DataSizeMismatch { expected: usize, actual: usize },
    #[error("level {level} has no spawn point")]
    MissingSpawn { level: u8 },
    #[error("level {level} has {count} spawn points, expected exactly one")]
    DuplicateSpawn { level: u8, count: usize },
    #[error("level {level} has no exit zone")]
    MissingExit { level: u8 },
    #[error("level {level} has no final zone")]
    MissingFinal { level: u8 },
    #[error("expected {expected} levels, got {actual}")]
    WrongLevelCount { expected: usize, actual: usize },
    #[error("layout is empty")]
    EmptyLayout,
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Map error: {0}")]
    Map(#[from] MapError),
    #[error("{path}: {source}")]
    Level {
        path: String,
        #[source]
        source: Box<GameError>,
    },
}
