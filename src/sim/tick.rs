//! Frame-stepped simulation tick
//!
//! Order within a frame: drop balls that left the playfield, apply the
//! shoot command, then advance every ball through the tile grid. Balls
//! never collide with each other, so their order only affects event order.

use glam::Vec2;

use super::collision::{bounce, probe_tiles};
use super::level::Level;
use super::state::{Ball, SimEvent, SimulationContext};
use crate::tuning::PhysicsTuning;

/// Input commands for a single frame
#[derive(Debug, Clone)]
pub struct TickInput {
    /// Shoot every player ball toward this point
    pub shoot_target: Option<Vec2>,
    /// Bullet-time divisor applied to all deltas (>= 1.0)
    pub slowmo_factor: f32,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            shoot_target: None,
            slowmo_factor: 1.0,
        }
    }
}

/// Input-side bullet time: full slowmo when aiming starts, wearing off
/// while the aim is held, gone on release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletTime {
    factor: f32,
}

impl Default for BulletTime {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

impl BulletTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn begin_aim(&mut self, tuning: &PhysicsTuning) {
        self.factor = tuning.slowmo_max;
    }

    /// Call once per frame while the aim is held
    pub fn hold(&mut self, tuning: &PhysicsTuning) {
        self.factor = (self.factor - tuning.slowmo_recovery).max(1.0);
    }

    pub fn release(&mut self) {
        self.factor = 1.0;
    }
}

/// Advance the simulation by one frame
pub fn tick(ctx: &mut SimulationContext, input: &TickInput) {
    let slowmo = input.slowmo_factor.max(1.0);

    let margin = ctx.tuning.out_of_bounds_margin;
    let before = ctx.balls.len();
    ctx.balls.retain(|ball| !ball.is_out_of_bounds(margin));
    if ctx.balls.len() < before {
        log::debug!(
            "Frame {}: removed {} out-of-bounds balls",
            ctx.frame,
            before - ctx.balls.len()
        );
    }

    if let Some(target) = input.shoot_target {
        shoot(ctx, target);
    }

    for ball in &mut ctx.balls {
        step_ball(ball, &mut ctx.level, &ctx.tuning, slowmo, &mut ctx.events);
    }

    ctx.frame += 1;
}

/// Shoot every player ball that still holds a shell. Returns the number
/// of new projectiles.
pub fn shoot(ctx: &mut SimulationContext, target: Vec2) -> usize {
    let mut shots = Vec::new();
    for i in 0..ctx.balls.len() {
        if !ctx.balls[i].is_player || !ctx.balls[i].can_shoot() {
            continue;
        }
        let id = ctx.next_entity_id();
        if let Some(shot) = ctx.balls[i].shoot(id, target, &ctx.tuning) {
            log::debug!(
                "Ball {} shot {:?} shell {} toward {}",
                ctx.balls[i].id,
                shot.shell_type,
                shot.id,
                target
            );
            shots.push(shot);
        }
    }

    let count = shots.len();
    ctx.balls.extend(shots);
    count
}

/// Move one ball through the level for one frame.
///
/// Sub-steps toward the unobstructed next position and resolves only the
/// first contact found; a second wall later in the same frame is missed.
fn step_ball(
    ball: &mut Ball,
    level: &mut Level,
    tuning: &PhysicsTuning,
    slowmo: f32,
    events: &mut Vec<SimEvent>,
) {
    let was_touching_end = ball.touching_end;
    ball.touching_end = false;

    let origin = ball.pos;
    let target = ball.next_position(slowmo);
    let radius = ball.effective_radius(tuning.shell_width);
    let pass_through = ball.passes_through_walls();

    for step in 1..=tuning.check_steps {
        let t = step as f32 / tuning.check_steps as f32;
        let candidate = origin.lerp(target, t);
        let probe = probe_tiles(level, candidate, radius, tuning.sample_count, pass_through);

        ball.touching_end |= probe.touching_end;
        events.extend(
            probe
                .pressed
                .iter()
                .map(|&tile| SimEvent::ButtonPressed { tile }),
        );

        if let Some(contact) = probe.contact(radius) {
            let magnitude = bounce(ball, contact, radius, tuning.spin_divisor);
            events.push(SimEvent::BounceOccurred {
                ball_id: ball.id,
                magnitude,
                shell_type: ball.shell_type,
                is_player: ball.is_player,
            });
            break;
        }
    }

    if ball.touching_end && !was_touching_end {
        events.push(SimEvent::EndTouched { ball_id: ball.id });
    }

    let drifting = ball.is_drifting();
    let gravity = if drifting { 0.0 } else { tuning.gravity };
    ball.integrate(slowmo, gravity);

    if drifting {
        let decay = tuning.float_decay_at(slowmo);
        ball.vel *= decay;
        ball.angular_vel *= decay;
        ball.x_bounce_decay = tuning.float_bounce_decay;
        ball.y_bounce_decay = tuning.float_bounce_decay;
    } else {
        ball.x_bounce_decay = tuning.x_bounce_decay;
        // A slow vertical speed kills the next bounce so resting balls settle
        ball.y_bounce_decay = if ball.vel.y.abs() < tuning.grounded_threshold {
            ball.vel.y.abs() * 0.5
        } else {
            tuning.y_bounce_decay
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::Layer;
    use crate::sim::shell::{ShellStack, ShellType};
    use crate::sim::state::BallSnapshot;
    use crate::sim::tile::{BlockTile, ButtonTile, TilePos};

    const BUTTON: TilePos = TilePos::new(5, 12);
    const END: TilePos = TilePos::new(10, 10);

    fn context(walls: &[TilePos], shells: Vec<ShellType>) -> SimulationContext {
        let mut blocks = Layer::new();
        blocks.set(TilePos::new(0, 0), BlockTile::Start).unwrap();
        blocks.set(END, BlockTile::End).unwrap();
        for &wall in walls {
            blocks.set(wall, BlockTile::Wall).unwrap();
        }
        let mut buttons = Layer::new();
        buttons.set(BUTTON, ButtonTile::Down).unwrap();
        let level = Level::from_layers(blocks, buttons, shells).unwrap();
        SimulationContext::new(level, PhysicsTuning::default()).unwrap()
    }

    fn projectile(shell_type: ShellType, pos: Vec2, vel: Vec2, radius: f32) -> Ball {
        let snapshot = BallSnapshot {
            pos,
            shell_type,
            containing_shells: ShellStack::new(),
        };
        let mut ball = Ball::from_snapshot(99, &snapshot, &PhysicsTuning::default());
        ball.vel = vel;
        ball.radius = radius;
        ball.is_player = false;
        ball
    }

    fn bounces(events: &[SimEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, SimEvent::BounceOccurred { .. }))
            .count()
    }

    #[test]
    fn test_ball_bounces_off_wall_from_above() {
        let mut ctx = context(&[TilePos::new(2, 2)], vec![ShellType::Center]);
        ctx.balls = vec![projectile(
            ShellType::Normal,
            Vec2::new(50.0, 10.0),
            Vec2::new(0.0, 10.0),
            6.0,
        )];

        let mut reversed = false;
        for _ in 0..10 {
            tick(&mut ctx, &TickInput::default());
            let ball = &ctx.balls[0];
            // Never reaches the tile's center
            assert!(ball.pos.y < 50.0);
            if ball.vel.y < 0.0 {
                reversed = true;
                break;
            }
        }
        assert!(reversed);

        let events = ctx.drain_events();
        assert_eq!(bounces(&events), 1);
        let Some(SimEvent::BounceOccurred { magnitude, .. }) = events
            .iter()
            .find(|e| matches!(e, SimEvent::BounceOccurred { .. }))
        else {
            unreachable!()
        };
        // Restitution took some speed away
        assert!(*magnitude > 0.0 && *magnitude < 11.0);
    }

    #[test]
    fn test_ghost_projectile_passes_through_wall() {
        let mut ctx = context(&[TilePos::new(2, 2)], vec![ShellType::Center]);
        ctx.balls = vec![projectile(
            ShellType::Ghost,
            Vec2::new(50.0, 20.0),
            Vec2::new(0.0, 10.0),
            6.0,
        )];

        for _ in 0..5 {
            tick(&mut ctx, &TickInput::default());
        }
        assert!(ctx.balls[0].pos.y > 60.0);
        assert_eq!(bounces(&ctx.drain_events()), 0);
    }

    #[test]
    fn test_player_leading_ghosts_shrink_collision_radius() {
        use ShellType::*;
        let wall = TilePos::new(2, 2);

        // Radius 10 ball whose center is 8.5 above the wall: touches
        let mut ctx = context(&[wall], vec![Center, Normal, Normal]);
        ctx.balls[0].pos = Vec2::new(50.0, 31.5);
        ctx.balls[0].vel = Vec2::new(0.0, 1.0);
        assert_eq!(ctx.balls[0].radius, 10.0);
        tick(&mut ctx, &TickInput::default());
        assert_eq!(bounces(&ctx.drain_events()), 1);

        // Same size, but the next shell in is a ghost
        let mut ctx = context(&[wall], vec![Center, Ghost, Normal]);
        ctx.balls[0].pos = Vec2::new(50.0, 31.5);
        ctx.balls[0].vel = Vec2::new(0.0, 1.0);
        assert_eq!(ctx.balls[0].radius, 10.0);
        tick(&mut ctx, &TickInput::default());
        assert_eq!(bounces(&ctx.drain_events()), 0);
    }

    #[test]
    fn test_float_projectile_drifts_without_gravity() {
        let mut ctx = context(&[], vec![ShellType::Center]);
        ctx.balls = vec![projectile(
            ShellType::Float,
            Vec2::new(250.0, 100.0),
            Vec2::new(2.0, 0.0),
            6.0,
        )];
        ctx.balls[0].angular_vel = 1.0;

        tick(&mut ctx, &TickInput::default());
        let ball = &ctx.balls[0];
        assert_eq!(ball.pos, Vec2::new(252.0, 100.0));
        assert!((ball.vel.x - 2.0 * 0.98).abs() < 1e-6);
        assert_eq!(ball.vel.y, 0.0);
        assert!((ball.angular_vel - 0.98).abs() < 1e-6);
        assert_eq!(ball.y_bounce_decay, ctx.tuning.float_bounce_decay);
    }

    #[test]
    fn test_player_float_still_falls() {
        let mut ctx = context(&[], vec![ShellType::Center, ShellType::Float]);
        ctx.balls[0].pos = Vec2::new(250.0, 100.0);
        tick(&mut ctx, &TickInput::default());
        assert_eq!(ctx.balls[0].vel.y, ctx.tuning.gravity);
    }

    #[test]
    fn test_grounding_decay() {
        let mut ctx = context(&[], vec![ShellType::Center]);
        ctx.balls[0].pos = Vec2::new(250.0, 100.0);
        tick(&mut ctx, &TickInput::default());
        // vy = 0.5 after one frame of gravity
        assert!((ctx.balls[0].y_bounce_decay - 0.25).abs() < 1e-6);

        ctx.balls[0].vel.y = 5.0;
        tick(&mut ctx, &TickInput::default());
        assert_eq!(ctx.balls[0].y_bounce_decay, ctx.tuning.y_bounce_decay);
    }

    #[test]
    fn test_end_touched_needs_buttons_for_completion() {
        let mut ctx = context(&[], vec![ShellType::Center]);
        ctx.tuning.gravity = 0.0;

        // Roll over the button first
        ctx.balls[0].pos = BUTTON.center();
        tick(&mut ctx, &TickInput::default());
        assert!(ctx.level.is_pressed(BUTTON));
        assert!(ctx.level.is_solved());
        let events = ctx.drain_events();
        assert!(events.contains(&SimEvent::ButtonPressed { tile: BUTTON }));

        // Then reach the end
        ctx.balls[0].pos = END.center();
        tick(&mut ctx, &TickInput::default());
        assert!(ctx.balls[0].touching_end);
        assert!(ctx.is_complete());
        let id = ctx.balls[0].id;
        assert!(ctx.drain_events().contains(&SimEvent::EndTouched { ball_id: id }));

        // Still touching: no repeat event
        tick(&mut ctx, &TickInput::default());
        assert!(ctx.balls[0].touching_end);
        assert!(ctx.drain_events().is_empty());
    }

    #[test]
    fn test_end_before_buttons_is_not_complete() {
        let mut ctx = context(&[], vec![ShellType::Center]);
        ctx.tuning.gravity = 0.0;
        ctx.balls[0].pos = END.center();

        tick(&mut ctx, &TickInput::default());
        assert!(ctx.balls[0].touching_end);
        assert!(!ctx.level.is_solved());
        assert!(!ctx.is_complete());

        // Leaving the end clears the flag
        ctx.balls[0].pos = Vec2::new(300.0, 100.0);
        tick(&mut ctx, &TickInput::default());
        assert!(!ctx.balls[0].touching_end);
    }

    #[test]
    fn test_tick_shoot_spawns_projectile() {
        use ShellType::*;
        let mut ctx = context(&[], vec![Center, Ghost, Normal]);
        ctx.balls[0].pos = Vec2::new(250.0, 250.0);
        let input = TickInput {
            shoot_target: Some(Vec2::new(400.0, 250.0)),
            ..Default::default()
        };
        tick(&mut ctx, &input);

        assert_eq!(ctx.balls.len(), 2);
        let (old, shot) = (&ctx.balls[0], &ctx.balls[1]);
        assert!(!old.is_player);
        assert!(shot.is_player);
        assert_eq!(shot.shell_type, Ghost);
        assert!(shot.vel.x > 0.0 && old.vel.x < 0.0);
        assert_ne!(old.id, shot.id);

        // Center shell left: one more shot, then nothing
        assert_eq!(shoot(&mut ctx, Vec2::ZERO), 1);
        assert_eq!(shoot(&mut ctx, Vec2::ZERO), 0);
        assert_eq!(ctx.players().count(), 1);
    }

    #[test]
    fn test_clone_shot_keeps_both_players() {
        use ShellType::*;
        let mut ctx = context(&[], vec![Center, Normal, Clone]);
        ctx.balls[0].pos = Vec2::new(250.0, 250.0);
        assert_eq!(shoot(&mut ctx, Vec2::new(250.0, 0.0)), 1);
        assert_eq!(ctx.players().count(), 2);

        // Both players hold the Center shell and shoot together
        assert_eq!(shoot(&mut ctx, Vec2::new(250.0, 0.0)), 2);
        assert_eq!(ctx.balls.len(), 4);
    }

    #[test]
    fn test_out_of_bounds_removed_next_frame() {
        let mut ctx = context(&[], vec![ShellType::Center]);
        ctx.balls.push(projectile(
            ShellType::Normal,
            Vec2::new(-150.0, 100.0),
            Vec2::ZERO,
            6.0,
        ));
        assert_eq!(ctx.balls.len(), 2);
        tick(&mut ctx, &TickInput::default());
        assert_eq!(ctx.balls.len(), 1);
        assert!(ctx.has_player());
    }

    #[test]
    fn test_slowmo_divides_motion() {
        let mut ctx = context(&[], vec![ShellType::Center]);
        ctx.balls[0].pos = Vec2::new(250.0, 100.0);
        ctx.balls[0].vel = Vec2::new(4.0, 0.0);
        let input = TickInput {
            slowmo_factor: 4.0,
            ..Default::default()
        };
        tick(&mut ctx, &input);
        assert_eq!(ctx.balls[0].pos, Vec2::new(251.0, 100.0));
        assert_eq!(ctx.balls[0].vel.y, ctx.tuning.gravity / 4.0);
    }

    #[test]
    fn test_one_bounce_per_frame() {
        // Fast ball whose unobstructed path clips the wall at (4,1) and then
        // sinks into the floor at (3,3); only the wall is resolved
        let mut ctx = context(
            &[TilePos::new(4, 1), TilePos::new(3, 3)],
            vec![ShellType::Center],
        );
        ctx.tuning.gravity = 0.0;
        ctx.balls = vec![projectile(
            ShellType::Normal,
            Vec2::new(74.0, 24.0),
            Vec2::new(4.0, 36.0),
            6.0,
        )];
        let floor_top = TilePos::new(3, 3).top_left().y;
        assert!(ctx.balls[0].next_position(1.0).y + 6.0 > floor_top);

        tick(&mut ctx, &TickInput::default());
        assert_eq!(bounces(&ctx.drain_events()), 1);
        let ball = &ctx.balls[0];
        assert!(ball.vel.x < 0.0);
        // The floor later in the frame was never seen
        assert!(ball.vel.y > 0.0);
    }

    #[test]
    fn test_bullet_time() {
        let tuning = PhysicsTuning::default();
        let mut bullet = BulletTime::new();
        assert_eq!(bullet.factor(), 1.0);

        bullet.begin_aim(&tuning);
        assert_eq!(bullet.factor(), tuning.slowmo_max);
        bullet.hold(&tuning);
        assert!((bullet.factor() - (tuning.slowmo_max - tuning.slowmo_recovery)).abs() < 1e-6);

        for _ in 0..1000 {
            bullet.hold(&tuning);
        }
        assert_eq!(bullet.factor(), 1.0);

        bullet.begin_aim(&tuning);
        bullet.release();
        assert_eq!(bullet.factor(), 1.0);
    }
}
