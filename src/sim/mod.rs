//! Deterministic simulation module
//!
//! All gameplay physics lives here. This module must be pure and deterministic:
//! - Frame-stepped, with slowmo dividing every delta
//! - Stable iteration order (balls in creation order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod geometry;
pub mod level;
pub mod shell;
pub mod state;
pub mod tick;
pub mod tile;

pub use collision::{TileProbe, bounce, probe_tiles, sample_circumference_tiles};
pub use geometry::{
    Polar, Segment, angle_between, component_in_direction, difference_to_vector,
    point_and_segment, points_to_segment_list, reflect_vector, vector_to_difference,
};
pub use level::{Layer, Level, in_bounds, validate_shells};
pub use shell::{ShellStack, ShellType};
pub use state::{Ball, BallSnapshot, SimEvent, SimulationContext};
pub use tick::{BulletTime, TickInput, shoot, tick};
pub use tile::{BlockTile, ButtonTile, LayerKind, Tile, TilePos};
