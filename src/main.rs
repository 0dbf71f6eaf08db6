//! Ringshot headless driver
//!
//! Plays a level without a window: an idle auto-aimer shoots shells at
//! random targets, with bullet time ramping while it "aims". Useful for
//! soak-testing levels and tuning.
//!
//! Usage: `ringshot [LEVEL_PACK] [LEVEL_INDEX]`
//!
//! Environment:
//! - `RUST_LOG`: log filter (default `info`)
//! - `RINGSHOT_SEED`: seed for the auto-aimer (default 42)
//! - `RINGSHOT_TUNING`: path to a physics tuning JSON file

#[cfg(not(target_arch = "wasm32"))]
use rand::{Rng, SeedableRng};
#[cfg(not(target_arch = "wasm32"))]
use rand_pcg::Pcg32;

#[cfg(not(target_arch = "wasm32"))]
use ringshot::consts::*;
#[cfg(not(target_arch = "wasm32"))]
use ringshot::sim::{
    Ball, BlockTile, BulletTime, ButtonTile, Level, ShellType, SimEvent, SimulationContext,
    TickInput, TilePos, tick,
};
#[cfg(not(target_arch = "wasm32"))]
use ringshot::{PhysicsTuning, persistence};

/// Give up after this many frames in total
#[cfg(not(target_arch = "wasm32"))]
const FRAME_CAP: u64 = FPS as u64 * 60 * 5;
/// Frames of bullet time before each shot
#[cfg(not(target_arch = "wasm32"))]
const AIM_FRAMES: u64 = 30;
/// Reset an attempt whose shells are spent after this many frames
#[cfg(not(target_arch = "wasm32"))]
const STUCK_FRAMES: u64 = FPS as u64 * 10;

/// Shoots at random points on a random cadence
#[cfg(not(target_arch = "wasm32"))]
struct IdleAimer {
    rng: Pcg32,
    bullet_time: BulletTime,
    next_shot: u64,
    last_shot: u64,
}

#[cfg(not(target_arch = "wasm32"))]
impl IdleAimer {
    fn new(seed: u64) -> Self {
        let mut aimer = Self {
            rng: Pcg32::seed_from_u64(seed),
            bullet_time: BulletTime::new(),
            next_shot: 0,
            last_shot: 0,
        };
        aimer.reset();
        aimer
    }

    /// Start over with a fresh attempt (frame counter back at zero)
    fn reset(&mut self) {
        self.bullet_time.release();
        self.last_shot = 0;
        self.next_shot = self.rng.random_range(AIM_FRAMES..AIM_FRAMES + 90);
    }

    fn input(&mut self, ctx: &SimulationContext) -> TickInput {
        let mut input = TickInput::default();
        if !ctx.players().any(Ball::can_shoot) {
            self.bullet_time.release();
            return input;
        }

        let frames_left = self.next_shot.saturating_sub(ctx.frame);
        if frames_left == 0 {
            let target = glam::Vec2::new(
                self.rng.random_range(0.0..PLAYFIELD_WIDTH),
                self.rng.random_range(0.0..PLAYFIELD_HEIGHT),
            );
            input.shoot_target = Some(target);
            self.bullet_time.release();
            self.last_shot = ctx.frame;
            self.next_shot = ctx.frame + self.rng.random_range(AIM_FRAMES + 30..AIM_FRAMES + 180);
        } else if frames_left == AIM_FRAMES {
            self.bullet_time.begin_aim(&ctx.tuning);
        } else if frames_left < AIM_FRAMES {
            self.bullet_time.hold(&ctx.tuning);
        }

        input.slowmo_factor = self.bullet_time.factor();
        input
    }

    fn is_stuck(&self, ctx: &SimulationContext) -> bool {
        !ctx.players().any(Ball::can_shoot)
            && ctx.frame.saturating_sub(self.last_shot) > STUCK_FRAMES
    }
}

/// A walled room: ramp down to a floor button, end tile in the far corner
#[cfg(not(target_arch = "wasm32"))]
fn demo_level() -> Result<Level, Box<dyn std::error::Error>> {
    let mut level = Level::new();
    let last_col = LEVEL_WIDTH as i32 - 1;
    let floor = LEVEL_HEIGHT as i32 - 2;

    for col in 0..=last_col {
        level.set_block(TilePos::new(col, floor), BlockTile::Wall)?;
    }
    for row in 0..floor {
        level.set_block(TilePos::new(0, row), BlockTile::Wall)?;
        level.set_block(TilePos::new(last_col, row), BlockTile::Wall)?;
    }
    level.set_block(TilePos::new(1, floor - 1), BlockTile::BottomLeft)?;
    level.set_block(TilePos::new(last_col - 1, floor - 1), BlockTile::BottomRight)?;
    for col in 8..12 {
        level.set_block(TilePos::new(col, 14), BlockTile::Wall)?;
    }

    level.set_block(TilePos::new(3, floor - 1), BlockTile::Start)?;
    level.set_block(TilePos::new(last_col - 3, floor - 1), BlockTile::End)?;
    level.set_button(TilePos::new(12, floor - 1), ButtonTile::Down)?;
    level.set_button(TilePos::new(9, 13), ButtonTile::Down)?;

    use ShellType::*;
    level.set_start_shells(vec![Center, Normal, Float, Ghost, Clone, Normal])?;

    // Go through the text format so the demo exercises the loader too
    Ok(persistence::parse_level(&persistence::level_to_string(&level))?)
}

#[cfg(not(target_arch = "wasm32"))]
fn load_level(args: &[String]) -> Result<Level, Box<dyn std::error::Error>> {
    let Some(path) = args.first() else {
        log::info!("No level pack given, using the demo level");
        return demo_level();
    };

    let index: usize = match args.get(1) {
        Some(arg) => arg.parse()?,
        None => 0,
    };
    let text = std::fs::read_to_string(path)?;
    let mut levels = persistence::parse_level_pack(&text)?;
    if index >= levels.len() {
        return Err(format!("{path} has {} levels, no index {index}", levels.len()).into());
    }
    log::info!("Playing level {index} of {path}");
    Ok(levels.swap_remove(index))
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning() -> Result<PhysicsTuning, Box<dyn std::error::Error>> {
    match std::env::var("RINGSHOT_TUNING") {
        Ok(path) => {
            log::info!("Loading tuning from {path}");
            Ok(PhysicsTuning::from_json(&std::fs::read_to_string(path)?)?)
        }
        Err(_) => Ok(PhysicsTuning::default()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn log_event(event: &SimEvent, frame: u64) {
    match event {
        SimEvent::ButtonPressed { tile } => log::info!("Frame {frame}: button {tile} pressed"),
        SimEvent::EndTouched { ball_id } => {
            log::info!("Frame {frame}: ball {ball_id} reached the end")
        }
        SimEvent::BounceOccurred {
            ball_id,
            magnitude,
            shell_type,
            is_player,
        } => log::trace!(
            "Frame {frame}: ball {ball_id} ({shell_type:?}, player={is_player}) bounced at {magnitude:.2}"
        ),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Ringshot (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = match std::env::var("RINGSHOT_SEED") {
        Ok(value) => value.parse()?,
        Err(_) => 42,
    };

    let level = load_level(&args)?;
    let tuning = load_tuning()?;
    let mut ctx = SimulationContext::new(level, tuning)?;
    let mut aimer = IdleAimer::new(seed);
    log::info!("Idle aimer seeded with {seed}");

    let mut attempts = 1u32;
    for total in 0..FRAME_CAP {
        if !ctx.has_player() || aimer.is_stuck(&ctx) {
            attempts += 1;
            log::info!("Attempt {attempts} after {} frames", ctx.frame);
            ctx.reset();
            aimer.reset();
        }

        let input = aimer.input(&ctx);
        tick(&mut ctx, &input);
        for event in ctx.drain_events() {
            log_event(&event, ctx.frame);
        }

        if ctx.is_complete() {
            log::info!(
                "Level complete on attempt {attempts} ({} frames, {total} total)",
                ctx.frame
            );
            return Ok(());
        }
    }

    log::info!("Stopped after {FRAME_CAP} frames and {attempts} attempts without finishing");
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless driver on the web
}
