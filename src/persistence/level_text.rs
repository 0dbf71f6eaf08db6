//! Plain-text level encoding
//!
//! ```text
//! <blocks layer> ~ <buttons layer> ~ <start shells>
//! ```
//!
//! A layer is one line per column, each line the column's tile ids top to
//! bottom separated by spaces. Shells are ids separated by spaces, innermost
//! first. A level pack is levels joined by `*`.

use crate::consts::{LEVEL_HEIGHT, LEVEL_WIDTH};
use crate::error::LevelError;
use crate::sim::{BlockTile, ButtonTile, Layer, LayerKind, Level, ShellType, TilePos};

pub const LEVEL_SEPARATOR: char = '*';
pub const SECTION_SEPARATOR: char = '~';
pub const COLUMN_SEPARATOR: char = '\n';
pub const TILE_SEPARATOR: char = ' ';

const SECTION_COUNT: usize = 3;

/// Parse one level. Any malformed section aborts the load.
pub fn parse_level(text: &str) -> Result<Level, LevelError> {
    let sections: Vec<&str> = text.split(SECTION_SEPARATOR).collect();
    if sections.len() != SECTION_COUNT {
        return Err(LevelError::SectionCount {
            expected: SECTION_COUNT,
            found: sections.len(),
        });
    }

    let blocks = parse_layer(sections[0], LayerKind::Blocks, BlockTile::from_id)?;
    let buttons = parse_layer(sections[1], LayerKind::Buttons, ButtonTile::from_id)?;
    let shells = parse_shells(sections[2])?;

    Level::from_layers(blocks, buttons, shells)
}

/// Encode a level so that `parse_level` reads it back unchanged.
/// Pressed state is not saved.
pub fn level_to_string(level: &Level) -> String {
    let shells: Vec<String> = level
        .start_shells()
        .iter()
        .map(|shell| shell.id().to_string())
        .collect();

    [
        layer_to_string(level.blocks(), |tile| tile.id()),
        layer_to_string(level.buttons(), |tile| tile.id()),
        shells.join(&TILE_SEPARATOR.to_string()),
    ]
    .join(&SECTION_SEPARATOR.to_string())
}

/// Parse a `*`-separated pack. Blank trailing entries are ignored.
pub fn parse_level_pack(text: &str) -> Result<Vec<Level>, LevelError> {
    let levels = text
        .split(LEVEL_SEPARATOR)
        .filter(|entry| !entry.trim().is_empty())
        .map(parse_level)
        .collect::<Result<Vec<_>, _>>()?;

    log::info!("Loaded level pack with {} levels", levels.len());
    Ok(levels)
}

pub fn level_pack_to_string(levels: &[Level]) -> String {
    levels
        .iter()
        .map(level_to_string)
        .collect::<Vec<_>>()
        .join(&LEVEL_SEPARATOR.to_string())
}

fn parse_layer<T: Copy + Default>(
    text: &str,
    kind: LayerKind,
    from_id: fn(u8) -> Option<T>,
) -> Result<Layer<T>, LevelError> {
    let columns: Vec<&str> = text.trim().lines().collect();
    if columns.len() != LEVEL_WIDTH {
        return Err(LevelError::ColumnCount {
            layer: kind.as_str(),
            expected: LEVEL_WIDTH,
            found: columns.len(),
        });
    }

    let mut layer = Layer::new();
    for (col, column) in columns.iter().enumerate() {
        let tokens: Vec<&str> = column.split_whitespace().collect();
        if tokens.len() != LEVEL_HEIGHT {
            return Err(LevelError::RowCount {
                layer: kind.as_str(),
                column: col,
                expected: LEVEL_HEIGHT,
                found: tokens.len(),
            });
        }

        for (row, token) in tokens.into_iter().enumerate() {
            let pos = TilePos::new(col as i32, row as i32);
            let tile = token
                .parse::<u8>()
                .ok()
                .and_then(from_id)
                .ok_or_else(|| LevelError::BadTile {
                    layer: kind.as_str(),
                    pos,
                    token: token.to_string(),
                })?;
            layer.set(pos, tile)?;
        }
    }

    Ok(layer)
}

fn parse_shells(text: &str) -> Result<Vec<ShellType>, LevelError> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<u8>()
                .ok()
                .and_then(ShellType::from_id)
                .ok_or_else(|| LevelError::BadShell(token.to_string()))
        })
        .collect()
}

fn layer_to_string<T: Copy + Default>(layer: &Layer<T>, id: fn(T) -> u8) -> String {
    let mut out = String::with_capacity(LEVEL_WIDTH * LEVEL_HEIGHT * 2);
    for col in 0..LEVEL_WIDTH {
        if col > 0 {
            out.push(COLUMN_SEPARATOR);
        }
        for row in 0..LEVEL_HEIGHT {
            if row > 0 {
                out.push(TILE_SEPARATOR);
            }
            let tile = layer
                .get(TilePos::new(col as i32, row as i32))
                .unwrap_or_default();
            out.push_str(&id(tile).to_string());
        }
    }
    out
}
