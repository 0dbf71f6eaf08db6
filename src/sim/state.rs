//! Simulation state and core entity types
//!
//! `SimulationContext` owns everything one frame mutates: the active level
//! and the live balls. Rendering and audio read it after `tick` returns.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{angle_between, vector_to_difference};
use super::level::Level;
use super::shell::{ShellStack, ShellType};
use super::tile::TilePos;
use crate::consts::*;
use crate::error::LevelError;
use crate::normalize_angle;
use crate::tuning::PhysicsTuning;

/// Side effects of a frame, for audio and visual feedback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A button tile went from released to pressed
    ButtonPressed { tile: TilePos },
    /// A ball bounced off a wall
    BounceOccurred {
        ball_id: u32,
        magnitude: f32,
        shell_type: ShellType,
        is_player: bool,
    },
    /// A ball started touching the end tile
    EndTouched { ball_id: u32 },
}

/// Immutable description of the ball a level starts with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub pos: Vec2,
    pub shell_type: ShellType,
    pub containing_shells: ShellStack,
}

impl BallSnapshot {
    /// The start ball of `level`: outermost start shell exposed, the rest
    /// contained outermost first
    pub fn from_level(level: &Level) -> Result<Self, LevelError> {
        let pos = level.start_position().ok_or(LevelError::Missing("start"))?;
        let (&shell_type, inner) = level
            .start_shells()
            .split_last()
            .ok_or(LevelError::NoShells)?;

        Ok(Self {
            pos,
            shell_type,
            containing_shells: inner.iter().rev().copied().collect(),
        })
    }
}

/// One simulated circle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Cosmetic rotation, never fed back into physics
    pub angle: f32,
    pub angular_vel: f32,
    /// Currently exposed outer layer
    pub shell_type: ShellType,
    pub containing_shells: ShellStack,
    pub is_player: bool,
    /// Fraction of horizontal velocity kept on the next bounce
    pub x_bounce_decay: f32,
    /// Fraction of vertical velocity kept on the next bounce
    pub y_bounce_decay: f32,
    /// Recomputed every physics step
    pub touching_end: bool,
}

impl Ball {
    /// A resting player ball built from a snapshot
    pub fn from_snapshot(id: u32, snapshot: &BallSnapshot, tuning: &PhysicsTuning) -> Self {
        Self {
            id,
            pos: snapshot.pos,
            vel: Vec2::ZERO,
            radius: tuning.radius_for(snapshot.containing_shells.len()),
            angle: 0.0,
            angular_vel: 0.0,
            shell_type: snapshot.shell_type,
            containing_shells: snapshot.containing_shells.clone(),
            is_player: true,
            x_bounce_decay: tuning.x_bounce_decay,
            y_bounce_decay: tuning.y_bounce_decay,
            touching_end: false,
        }
    }

    /// Whether another shell can be peeled off
    pub fn can_shoot(&self) -> bool {
        !self.containing_shells.is_empty()
    }

    /// Non-player ghosts fly through solid tiles
    pub fn passes_through_walls(&self) -> bool {
        self.shell_type == ShellType::Ghost && !self.is_player
    }

    /// Non-player floats ignore gravity and drift to rest
    pub fn is_drifting(&self) -> bool {
        self.shell_type == ShellType::Float && !self.is_player
    }

    /// Radius that meets walls. A player's leading ghost shells don't.
    pub fn effective_radius(&self, shell_width: f32) -> f32 {
        if !self.is_player {
            return self.radius;
        }
        let ghosts = self.containing_shells.leading_ghosts() as f32;
        (self.radius - ghosts * shell_width).max(0.0)
    }

    /// Position next frame, ignoring collision
    pub fn next_position(&self, slowmo_factor: f32) -> Vec2 {
        self.pos + self.vel / slowmo_factor
    }

    pub fn launch(&mut self, direction: f32, power: f32) {
        self.vel = vector_to_difference(direction, power);
    }

    pub fn launch_towards(&mut self, target: Vec2, power: f32) {
        self.launch(angle_between(self.pos, target), power);
    }

    /// Peel the next shell off toward `target`.
    ///
    /// Returns the new projectile, or `None` when no shells remain. A Clone
    /// shell stays in play as a player; anything else retires to a plain
    /// projectile. Either way it recoils opposite the shot.
    pub fn shoot(&mut self, id: u32, target: Vec2, tuning: &PhysicsTuning) -> Option<Ball> {
        let next = self.containing_shells.peek_next()?;
        let new_radius = self.radius - tuning.shell_width;

        let mut inner = self.containing_shells.clone();
        inner.pop_next();

        let mut shot = Ball {
            id,
            pos: self.pos,
            vel: Vec2::ZERO,
            radius: new_radius,
            angle: self.angle,
            angular_vel: 0.0,
            shell_type: next,
            containing_shells: inner,
            is_player: true,
            x_bounce_decay: tuning.x_bounce_decay,
            y_bounce_decay: tuning.y_bounce_decay,
            touching_end: false,
        };
        shot.launch_towards(target, tuning.launch_power);

        if self.shell_type == ShellType::Clone {
            self.shell_type = next;
            self.containing_shells.pop_next();
            self.radius = new_radius;
        } else {
            self.is_player = false;
            self.containing_shells.clear();
        }
        self.vel = -shot.vel;

        Some(shot)
    }

    /// Advance position, velocity and spin by one frame
    pub fn integrate(&mut self, slowmo_factor: f32, gravity: f32) {
        self.pos += self.vel / slowmo_factor;
        self.vel.y += gravity / slowmo_factor;
        self.angle = normalize_angle(self.angle + self.angular_vel / slowmo_factor);
    }

    /// More than `margin` outside the playfield on any side
    pub fn is_out_of_bounds(&self, margin: f32) -> bool {
        self.pos.x < -margin
            || self.pos.x > PLAYFIELD_WIDTH + margin
            || self.pos.y < -margin
            || self.pos.y > PLAYFIELD_HEIGHT + margin
    }
}

/// Everything the frame update touches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationContext {
    pub level: Level,
    /// Live balls, in creation order
    pub balls: Vec<Ball>,
    pub tuning: PhysicsTuning,
    /// Ball restored on reset
    start_ball: BallSnapshot,
    /// Events since the last drain
    pub(crate) events: Vec<SimEvent>,
    /// Frames simulated since the last reset
    pub frame: u64,
    next_id: u32,
}

impl SimulationContext {
    /// Start playing `level`
    pub fn new(level: Level, tuning: PhysicsTuning) -> Result<Self, LevelError> {
        let start_ball = BallSnapshot::from_level(&level)?;
        let mut ctx = Self {
            level,
            balls: Vec::new(),
            tuning,
            start_ball,
            events: Vec::new(),
            frame: 0,
            next_id: 1,
        };
        ctx.reset();
        Ok(ctx)
    }

    /// Put the start ball back and release every button
    pub fn reset(&mut self) {
        self.level.release_all();
        self.balls.clear();
        self.events.clear();
        self.frame = 0;

        let id = self.next_entity_id();
        let ball = Ball::from_snapshot(id, &self.start_ball, &self.tuning);
        log::info!(
            "Level reset: {:?} ball with {} shells at {}",
            ball.shell_type,
            ball.containing_shells.len(),
            ball.pos
        );
        self.balls.push(ball);
    }

    pub fn start_ball(&self) -> &BallSnapshot {
        &self.start_ball
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn players(&self) -> impl Iterator<Item = &Ball> {
        self.balls.iter().filter(|ball| ball.is_player)
    }

    pub fn has_player(&self) -> bool {
        self.players().next().is_some()
    }

    /// A player is on the end tile with every button pressed
    pub fn is_complete(&self) -> bool {
        self.level.is_solved() && self.players().any(|ball| ball.touching_end)
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}
