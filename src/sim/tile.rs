//! Tile model
//!
//! Two closed tile enums, one per layer. A tile's polygon is a pure
//! function of its value and grid position; collision segments are derived
//! from that polygon for solid block tiles only.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Segment, points_to_segment_list};
use crate::consts::*;

/// A (column, row) grid coordinate. May lie outside the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub col: i32,
    pub row: i32,
}

impl TilePos {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Tile containing a screen-space point
    pub fn containing(point: Vec2) -> Self {
        Self {
            col: (point.x / TILE_WIDTH).floor() as i32,
            row: (point.y / TILE_HEIGHT).floor() as i32,
        }
    }

    /// Screen-space top-left corner
    pub fn top_left(self) -> Vec2 {
        Vec2::new(self.col as f32 * TILE_WIDTH, self.row as f32 * TILE_HEIGHT)
    }

    /// Screen-space center
    pub fn center(self) -> Vec2 {
        self.top_left() + Vec2::new(TILE_WIDTH, TILE_HEIGHT) / 2.0
    }

    /// The four corners: top-left, top-right, bottom-right, bottom-left
    fn corners(self) -> [Vec2; 4] {
        let tl = self.top_left();
        [
            tl,
            tl + Vec2::new(TILE_WIDTH, 0.0),
            tl + Vec2::new(TILE_WIDTH, TILE_HEIGHT),
            tl + Vec2::new(0.0, TILE_HEIGHT),
        ]
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Which grid a tile lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    Blocks,
    Buttons,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Blocks => "blocks",
            LayerKind::Buttons => "buttons",
        }
    }
}

/// Blocks layer tile. Diagonals are named for the fully solid corner:
///
/// ```text
/// ##/   TopLeft: top-left corner filled,
/// #/    bottom-right corner empty
/// /
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockTile {
    #[default]
    Empty,
    Wall,
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
    Start,
    End,
}

impl BlockTile {
    pub const ALL: [BlockTile; 8] = [
        BlockTile::Empty,
        BlockTile::Wall,
        BlockTile::TopLeft,
        BlockTile::TopRight,
        BlockTile::BottomRight,
        BlockTile::BottomLeft,
        BlockTile::Start,
        BlockTile::End,
    ];

    /// Id used by the level text format
    pub fn id(self) -> u8 {
        match self {
            BlockTile::Empty => 1,
            BlockTile::Wall => 2,
            BlockTile::TopLeft => 3,
            BlockTile::TopRight => 4,
            BlockTile::BottomRight => 5,
            BlockTile::BottomLeft => 6,
            BlockTile::Start => 7,
            BlockTile::End => 8,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|tile| tile.id() == id)
    }

    /// Blocks a ball
    pub fn is_solid(self) -> bool {
        match self {
            BlockTile::Wall
            | BlockTile::TopLeft
            | BlockTile::TopRight
            | BlockTile::BottomRight
            | BlockTile::BottomLeft => true,
            BlockTile::Empty | BlockTile::Start | BlockTile::End => false,
        }
    }

    pub fn is_start(self) -> bool {
        self == BlockTile::Start
    }

    pub fn is_end(self) -> bool {
        self == BlockTile::End
    }

    /// Outline polygon at `pos`, clockwise in screen space
    pub fn polygon(self, pos: TilePos) -> Vec<Vec2> {
        let [tl, tr, br, bl] = pos.corners();
        match self {
            BlockTile::Empty => Vec::new(),
            BlockTile::Wall | BlockTile::Start | BlockTile::End => vec![tl, tr, br, bl],
            BlockTile::TopLeft => vec![tl, tr, bl],
            BlockTile::TopRight => vec![tl, tr, br],
            BlockTile::BottomRight => vec![tr, br, bl],
            BlockTile::BottomLeft => vec![tl, br, bl],
        }
    }

    /// Collision boundary at `pos`. Empty for non-solid tiles.
    pub fn segments(self, pos: TilePos) -> Vec<Segment> {
        if !self.is_solid() {
            return Vec::new();
        }
        points_to_segment_list(&self.polygon(pos))
    }
}

/// Buttons layer tile: a pressure strip along an edge or across a corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ButtonTile {
    #[default]
    Empty,
    Left,
    Up,
    Right,
    Down,
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl ButtonTile {
    pub const ALL: [ButtonTile; 9] = [
        ButtonTile::Empty,
        ButtonTile::Left,
        ButtonTile::Up,
        ButtonTile::Right,
        ButtonTile::Down,
        ButtonTile::TopLeft,
        ButtonTile::TopRight,
        ButtonTile::BottomRight,
        ButtonTile::BottomLeft,
    ];

    pub fn id(self) -> u8 {
        match self {
            ButtonTile::Empty => 1,
            ButtonTile::Left => 2,
            ButtonTile::Up => 3,
            ButtonTile::Right => 4,
            ButtonTile::Down => 5,
            ButtonTile::TopLeft => 6,
            ButtonTile::TopRight => 7,
            ButtonTile::BottomRight => 8,
            ButtonTile::BottomLeft => 9,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|tile| tile.id() == id)
    }

    pub fn is_button(self) -> bool {
        self != ButtonTile::Empty
    }

    /// Strip polygon at `pos` (drawing only, buttons never collide)
    pub fn polygon(self, pos: TilePos) -> Vec<Vec2> {
        let [tl, tr, br, bl] = pos.corners();
        let t = BUTTON_THICKNESS;
        let leg = 2.0 * BUTTON_THICKNESS;
        match self {
            ButtonTile::Empty => Vec::new(),
            ButtonTile::Left => vec![tl, tl + Vec2::X * t, bl + Vec2::X * t, bl],
            ButtonTile::Up => vec![tl, tr, tr + Vec2::Y * t, tl + Vec2::Y * t],
            ButtonTile::Right => vec![tr - Vec2::X * t, tr, br, br - Vec2::X * t],
            ButtonTile::Down => vec![bl - Vec2::Y * t, br - Vec2::Y * t, br, bl],
            ButtonTile::TopLeft => vec![tl, tl + Vec2::X * leg, tl + Vec2::Y * leg],
            ButtonTile::TopRight => vec![tr - Vec2::X * leg, tr, tr + Vec2::Y * leg],
            ButtonTile::BottomRight => vec![br - Vec2::Y * leg, br, br - Vec2::X * leg],
            ButtonTile::BottomLeft => vec![bl - Vec2::Y * leg, bl + Vec2::X * leg, bl],
        }
    }
}

/// A tile from either layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Block(BlockTile),
    Button(ButtonTile),
}

impl Tile {
    pub fn polygon(self, pos: TilePos) -> Vec<Vec2> {
        match self {
            Tile::Block(tile) => tile.polygon(pos),
            Tile::Button(tile) => tile.polygon(pos),
        }
    }
}
