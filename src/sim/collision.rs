//! Collision detection and response against the tile grid
//!
//! Bounded accuracy: a ball only sees the tiles under a fixed
//! number of points on its circumference, and the nearest boundary segment
//! of those tiles stands in for an exact circle-polygon test.

use std::f32::consts::TAU;

use glam::Vec2;

use super::geometry::{
    Segment, component_in_direction, difference_to_vector, point_and_segment, reflect_vector,
};
use super::level::{Level, in_bounds};
use super::state::Ball;
use super::tile::TilePos;
use crate::polar_to_cartesian;

/// What a ball touches at one candidate position
#[derive(Debug, Clone, Default)]
pub struct TileProbe {
    /// One of the sampled tiles is the end tile
    pub touching_end: bool,
    /// Buttons this probe pressed, in sample order
    pub pressed: Vec<TilePos>,
    /// Shortest connector from the center to a solid boundary
    pub nearest: Option<Segment>,
}

impl TileProbe {
    /// The nearest boundary, if it is closer than `radius`
    pub fn contact(&self, radius: f32) -> Option<&Segment> {
        self.nearest.as_ref().filter(|c| c.length() < radius)
    }
}

/// Distinct tiles under `samples` evenly spaced points on the circle,
/// in sample order. May include tiles outside the level.
pub fn sample_circumference_tiles(center: Vec2, radius: f32, samples: u32) -> Vec<TilePos> {
    let mut tiles: Vec<TilePos> = Vec::with_capacity(samples as usize);
    for i in 0..samples {
        let theta = i as f32 * TAU / samples as f32;
        let tile = TilePos::containing(center + polar_to_cartesian(radius, theta));
        if !tiles.contains(&tile) {
            tiles.push(tile);
        }
    }
    tiles
}

/// Probe the level around a candidate position.
///
/// Presses any unpressed button touched on the way. With `pass_through`
/// the ball still presses buttons and sees the end tile, but no wall.
pub fn probe_tiles(
    level: &mut Level,
    center: Vec2,
    radius: f32,
    samples: u32,
    pass_through: bool,
) -> TileProbe {
    let mut probe = TileProbe::default();
    let mut best_dist = f32::INFINITY;

    for tile in sample_circumference_tiles(center, radius, samples) {
        if !in_bounds(tile) {
            continue;
        }
        if level.end_tile() == Some(tile) {
            probe.touching_end = true;
        }
        if level.is_button(tile) && !level.is_pressed(tile) {
            if let Ok(true) = level.press(tile) {
                probe.pressed.push(tile);
            }
        }

        let segments = level.tile_to_segments(tile);
        if segments.is_empty() || pass_through {
            continue;
        }
        for segment in &segments {
            if let Some(connector) = point_and_segment(center, segment) {
                if connector.length() < best_dist {
                    best_dist = connector.length();
                    probe.nearest = Some(connector);
                }
            }
        }
    }

    probe
}

/// Bounce `ball` off the surface perpendicular to `connector`.
///
/// Reflects in a y-up frame, sets spin from the tangential speed and
/// applies the ball's per-axis bounce decay. Returns the new speed.
pub fn bounce(ball: &mut Ball, connector: &Segment, radius: f32, spin_divisor: f32) -> f32 {
    // The connector is screen-space; in the y-up frame the surface's
    // slope is the reciprocal of the connector's.
    let tangent_slope = 1.0 / connector.slope();
    let reflected = reflect_vector(tangent_slope, Vec2::new(ball.vel.x, -ball.vel.y));

    if radius > 0.0 {
        let tangential =
            component_in_direction(difference_to_vector(reflected), tangent_slope.atan());
        ball.angular_vel = tangential / (spin_divisor * radius);
    }

    ball.vel = Vec2::new(
        reflected.x * ball.x_bounce_decay,
        -reflected.y * ball.y_bounce_decay,
    );
    ball.vel.length()
}
