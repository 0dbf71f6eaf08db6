//! Error types
//!
//! Level and tuning errors are configuration errors: they abort loading.
//! `TileError` covers operations the public contract should never reach.

use thiserror::Error;

use crate::sim::TilePos;

/// Malformed level data.
#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    #[error("expected {expected} sections separated by '~', found {found}")]
    SectionCount { expected: usize, found: usize },

    #[error("layer: expected {expected} tiles, found {found}")]
    LayerSize { expected: usize, found: usize },

    #[error("{layer} layer: expected {expected} columns, found {found}")]
    ColumnCount {
        layer: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{layer} layer, column {column}: expected {expected} tiles, found {found}")]
    RowCount {
        layer: &'static str,
        column: usize,
        expected: usize,
        found: usize,
    },

    #[error("{layer} layer: bad tile id {token:?} at {pos}")]
    BadTile {
        layer: &'static str,
        pos: TilePos,
        token: String,
    },

    #[error("bad shell id {0:?}")]
    BadShell(String),

    #[error("start shell list is empty")]
    NoShells,

    #[error("start shell list must begin with the center shell and contain it once")]
    MisplacedCenter,

    #[error("level has no {0} tile")]
    Missing(&'static str),

    #[error("level has more than one {0} tile")]
    Duplicate(&'static str),

    #[error(transparent)]
    Tile(#[from] TileError),
}

/// Invalid operation on a level tile.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TileError {
    #[error("invalid operation: no button at {0}")]
    NotAButton(TilePos),

    #[error("invalid operation: {0} is outside the level")]
    OutOfBounds(TilePos),
}

/// Malformed or out-of-range physics tuning.
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tuning value {name} out of range: {value}")]
    OutOfRange { name: &'static str, value: f32 },
}
