//! Ringshot - a tile-based physics puzzle core
//!
//! Core modules:
//! - `sim`: Simulation (geometry, tiles, level state, shelled balls, collision)
//! - `tuning`: Data-driven physics constants
//! - `persistence`: Level text encoding
//! - `error`: Error types shared by the modules above

pub mod error;
pub mod persistence;
pub mod sim;
pub mod tuning;

pub use error::{LevelError, TileError, TuningError};
pub use tuning::PhysicsTuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Target frame rate of the fixed-step loop
    pub const FPS: u32 = 60;

    /// Tile dimensions in pixels
    pub const TILE_WIDTH: f32 = 20.0;
    pub const TILE_HEIGHT: f32 = 20.0;

    /// Level dimensions, measured in tiles
    pub const LEVEL_WIDTH: usize = 25;
    pub const LEVEL_HEIGHT: usize = 25;

    /// Playfield dimensions in pixels
    pub const PLAYFIELD_WIDTH: f32 = LEVEL_WIDTH as f32 * TILE_WIDTH;
    pub const PLAYFIELD_HEIGHT: f32 = LEVEL_HEIGHT as f32 * TILE_HEIGHT;

    /// Thickness of a button pressure strip (pixels)
    pub const BUTTON_THICKNESS: f32 = 4.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
