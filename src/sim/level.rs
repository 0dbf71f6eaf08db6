//! Level state: two tile layers, start/end markers, pressed buttons

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Segment;
use super::shell::ShellType;
use super::tile::{BlockTile, ButtonTile, LayerKind, Tile, TilePos};
use crate::consts::{LEVEL_HEIGHT, LEVEL_WIDTH};
use crate::error::{LevelError, TileError};

/// Whether a grid coordinate lies inside the level
#[inline]
pub fn in_bounds(pos: TilePos) -> bool {
    (0..LEVEL_WIDTH as i32).contains(&pos.col) && (0..LEVEL_HEIGHT as i32).contains(&pos.row)
}

/// A fixed-size grid of tiles, stored column-major.
///
/// Serialized as the flat tile list; loading rejects any other length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<T>", into = "Vec<T>")]
pub struct Layer<T: Clone> {
    tiles: Vec<T>,
}

impl<T: Clone> TryFrom<Vec<T>> for Layer<T> {
    type Error = LevelError;

    fn try_from(tiles: Vec<T>) -> Result<Self, Self::Error> {
        let expected = LEVEL_WIDTH * LEVEL_HEIGHT;
        if tiles.len() != expected {
            return Err(LevelError::LayerSize {
                expected,
                found: tiles.len(),
            });
        }
        Ok(Self { tiles })
    }
}

impl<T: Clone> From<Layer<T>> for Vec<T> {
    fn from(layer: Layer<T>) -> Self {
        layer.tiles
    }
}

impl<T: Copy + Default> Default for Layer<T> {
    fn default() -> Self {
        Self {
            tiles: vec![T::default(); LEVEL_WIDTH * LEVEL_HEIGHT],
        }
    }
}

impl<T: Copy + Default> Layer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(pos: TilePos) -> Option<usize> {
        in_bounds(pos).then(|| pos.col as usize * LEVEL_HEIGHT + pos.row as usize)
    }

    /// Tile at `pos`, `None` when out of bounds
    pub fn get(&self, pos: TilePos) -> Option<T> {
        Self::index(pos).map(|i| self.tiles[i])
    }

    pub fn set(&mut self, pos: TilePos, tile: T) -> Result<(), TileError> {
        let i = Self::index(pos).ok_or(TileError::OutOfBounds(pos))?;
        self.tiles[i] = tile;
        Ok(())
    }

    /// Every tile with its position, column by column
    pub fn iter(&self) -> impl Iterator<Item = (TilePos, T)> + '_ {
        self.tiles.iter().enumerate().map(|(i, tile)| {
            let pos = TilePos::new((i / LEVEL_HEIGHT) as i32, (i % LEVEL_HEIGHT) as i32);
            (pos, *tile)
        })
    }
}

/// The active puzzle.
///
/// Loading rebuilds the level from its layers, shells and pressed tiles,
/// so markers and counters are recomputed rather than trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LevelData")]
pub struct Level {
    blocks: Layer<BlockTile>,
    buttons: Layer<ButtonTile>,
    start_tile: Option<TilePos>,
    end_tile: Option<TilePos>,
    /// Shells of the starting ball, innermost first
    start_shells: Vec<ShellType>,
    pressed: Layer<bool>,
    total_buttons: u32,
    pressed_buttons: u32,
}

/// Stored form of a level. Derived fields are ignored on load.
#[derive(Deserialize)]
struct LevelData {
    blocks: Layer<BlockTile>,
    buttons: Layer<ButtonTile>,
    start_shells: Vec<ShellType>,
    #[serde(default)]
    pressed: Layer<bool>,
}

impl TryFrom<LevelData> for Level {
    type Error = LevelError;

    fn try_from(data: LevelData) -> Result<Self, Self::Error> {
        let mut level = Level::from_layers(data.blocks, data.buttons, data.start_shells)?;
        for (pos, pressed) in data.pressed.iter() {
            if pressed {
                level.press(pos)?;
            }
        }
        Ok(level)
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::new()
    }
}

impl Level {
    /// An empty level holding a bare center ball
    pub fn new() -> Self {
        Self {
            blocks: Layer::new(),
            buttons: Layer::new(),
            start_tile: None,
            end_tile: None,
            start_shells: vec![ShellType::Center],
            pressed: Layer::new(),
            total_buttons: 0,
            pressed_buttons: 0,
        }
    }

    /// Build a playable level, rejecting inconsistent data.
    ///
    /// Requires exactly one Start and one End tile and a valid shell list.
    pub fn from_layers(
        blocks: Layer<BlockTile>,
        buttons: Layer<ButtonTile>,
        start_shells: Vec<ShellType>,
    ) -> Result<Self, LevelError> {
        validate_shells(&start_shells)?;

        let start_tile = find_unique(&blocks, BlockTile::Start, "start")?;
        let end_tile = find_unique(&blocks, BlockTile::End, "end")?;
        let total_buttons = buttons.iter().filter(|(_, tile)| tile.is_button()).count() as u32;

        log::info!(
            "Level built: start {start_tile}, end {end_tile}, {total_buttons} buttons, {} shells",
            start_shells.len()
        );

        Ok(Self {
            blocks,
            buttons,
            start_tile: Some(start_tile),
            end_tile: Some(end_tile),
            start_shells,
            pressed: Layer::new(),
            total_buttons,
            pressed_buttons: 0,
        })
    }

    pub fn blocks(&self) -> &Layer<BlockTile> {
        &self.blocks
    }

    pub fn buttons(&self) -> &Layer<ButtonTile> {
        &self.buttons
    }

    pub fn start_tile(&self) -> Option<TilePos> {
        self.start_tile
    }

    pub fn end_tile(&self) -> Option<TilePos> {
        self.end_tile
    }

    /// Where a fresh player ball appears
    pub fn start_position(&self) -> Option<Vec2> {
        self.start_tile.map(TilePos::center)
    }

    pub fn start_shells(&self) -> &[ShellType] {
        &self.start_shells
    }

    pub fn total_buttons(&self) -> u32 {
        self.total_buttons
    }

    pub fn pressed_buttons(&self) -> u32 {
        self.pressed_buttons
    }

    /// Tile at `pos` in `layer`, `None` when out of bounds
    pub fn tile_at(&self, layer: LayerKind, pos: TilePos) -> Option<Tile> {
        match layer {
            LayerKind::Blocks => self.blocks.get(pos).map(Tile::Block),
            LayerKind::Buttons => self.buttons.get(pos).map(Tile::Button),
        }
    }

    pub fn block_at(&self, pos: TilePos) -> Option<BlockTile> {
        self.blocks.get(pos)
    }

    pub fn button_at(&self, pos: TilePos) -> Option<ButtonTile> {
        self.buttons.get(pos)
    }

    pub fn is_button(&self, pos: TilePos) -> bool {
        self.buttons.get(pos).is_some_and(ButtonTile::is_button)
    }

    pub fn is_pressed(&self, pos: TilePos) -> bool {
        self.pressed.get(pos).unwrap_or(false)
    }

    /// Press the button at `pos`. Returns whether it was newly pressed.
    pub fn press(&mut self, pos: TilePos) -> Result<bool, TileError> {
        self.set_pressed(pos, true)
    }

    /// Release the button at `pos`. Returns whether it was pressed before.
    pub fn unpress(&mut self, pos: TilePos) -> Result<bool, TileError> {
        self.set_pressed(pos, false)
    }

    fn set_pressed(&mut self, pos: TilePos, pressed: bool) -> Result<bool, TileError> {
        if !self.is_button(pos) {
            return Err(TileError::NotAButton(pos));
        }
        if self.is_pressed(pos) == pressed {
            return Ok(false);
        }

        self.pressed.set(pos, pressed)?;
        if pressed {
            self.pressed_buttons += 1;
        } else {
            self.pressed_buttons -= 1;
        }
        Ok(true)
    }

    /// Release every button
    pub fn release_all(&mut self) {
        self.pressed = Layer::new();
        self.pressed_buttons = 0;
    }

    /// All buttons pressed
    pub fn is_solved(&self) -> bool {
        self.pressed_buttons == self.total_buttons
    }

    /// Collision boundary of the blocks-layer tile at `pos`
    pub fn tile_to_segments(&self, pos: TilePos) -> Vec<Segment> {
        self.blocks
            .get(pos)
            .map(|tile| tile.segments(pos))
            .unwrap_or_default()
    }

    /// Editor: change a block tile. Start and End stay unique, so placing
    /// one clears the previous marker.
    pub fn set_block(&mut self, pos: TilePos, tile: BlockTile) -> Result<(), TileError> {
        let old = self.blocks.get(pos).ok_or(TileError::OutOfBounds(pos))?;

        if tile.is_start() {
            if let Some(prev) = self.start_tile.filter(|prev| *prev != pos) {
                self.blocks.set(prev, BlockTile::Empty)?;
            }
            self.start_tile = Some(pos);
        } else if old.is_start() {
            self.start_tile = None;
        }

        if tile.is_end() {
            if let Some(prev) = self.end_tile.filter(|prev| *prev != pos) {
                self.blocks.set(prev, BlockTile::Empty)?;
            }
            self.end_tile = Some(pos);
        } else if old.is_end() {
            self.end_tile = None;
        }

        self.blocks.set(pos, tile)
    }

    /// Editor: change a button tile, keeping the counters consistent
    pub fn set_button(&mut self, pos: TilePos, tile: ButtonTile) -> Result<(), TileError> {
        let old = self.buttons.get(pos).ok_or(TileError::OutOfBounds(pos))?;

        if old.is_button() {
            self.unpress(pos)?;
            self.total_buttons -= 1;
        }
        self.buttons.set(pos, tile)?;
        if tile.is_button() {
            self.total_buttons += 1;
        }
        Ok(())
    }

    /// Editor: replace the starting shells
    pub fn set_start_shells(&mut self, shells: Vec<ShellType>) -> Result<(), LevelError> {
        validate_shells(&shells)?;
        self.start_shells = shells;
        Ok(())
    }
}

/// Shell lists start with exactly one Center, innermost
pub fn validate_shells(shells: &[ShellType]) -> Result<(), LevelError> {
    match shells.split_first() {
        None => Err(LevelError::NoShells),
        Some((ShellType::Center, rest)) if !rest.contains(&ShellType::Center) => Ok(()),
        Some(_) => Err(LevelError::MisplacedCenter),
    }
}

fn find_unique(
    blocks: &Layer<BlockTile>,
    wanted: BlockTile,
    name: &'static str,
) -> Result<TilePos, LevelError> {
    let mut found = blocks.iter().filter(|(_, tile)| *tile == wanted).map(|(pos, _)| pos);
    let first = found.next().ok_or(LevelError::Missing(name))?;
    if found.next().is_some() {
        return Err(LevelError::Duplicate(name));
    }
    Ok(first)
}
