#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots Monster Kong.

mod config;
mod scene;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use monster_kong_core::{LevelData, PlayerInput, FADE_DURATION};
use monster_kong_rendering::{Camera, Color, Presentation, RenderingBackend, Scene};
use monster_kong_rendering_macroquad::MacroquadBackend;
use monster_kong_simulation::{Config, Simulation};
use monster_kong_world::query;

use crate::config::GameConfig;

/// Longest frame the simulation advances in one step.
const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

const HEADLESS_STEP: Duration = Duration::from_nanos(16_666_667);

/// Command-line arguments for the Monster Kong binary.
#[derive(Debug, Parser)]
#[command(name = "monster-kong", about = "Climb to the goal while dodging barrels", version)]
struct CliArgs {
    /// Level description to load.
    #[arg(long, value_name = "PATH", default_value = "assets/levels/level_data.json")]
    level: PathBuf,
    /// Optional TOML file overriding window, physics and debug settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Runs the given number of fixed frames without opening a window.
    #[arg(long, value_name = "FRAMES")]
    headless_frames: Option<u64>,
    /// Draws collider outlines from the first frame (toggle with F1).
    #[arg(long)]
    debug_colliders: bool,
    /// Synchronises presentation with the display refresh rate.
    #[arg(long)]
    vsync: bool,
}

/// Entry point for the Monster Kong command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => GameConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    let level = load_level(&args)?;
    let simulation = Simulation::new(level, Config::new(config.physics.gravity, FADE_DURATION));

    match args.headless_frames {
        Some(frames) => {
            run_headless(simulation, frames);
            Ok(())
        }
        None => run_windowed(simulation, &config, &args),
    }
}

fn load_level(args: &CliArgs) -> Result<LevelData> {
    let contents = fs::read_to_string(&args.level)
        .with_context(|| format!("failed to read level file {}", args.level.display()))?;
    LevelData::from_json_str(&contents)
        .with_context(|| format!("level file {} is invalid", args.level.display()))
}

fn run_headless(mut simulation: Simulation, frames: u64) {
    let mut restarts = 0_u64;
    let mut spawned = 0_usize;
    for _ in 0..frames {
        let report = simulation.step(HEADLESS_STEP, PlayerInput::default());
        if report.restarted() {
            restarts += 1;
        }
        spawned += report.hazards_spawned();
    }

    let world = simulation.world();
    log::info!(
        "simulated {} frames: {restarts} restarts, {spawned} hazards spawned, {} pooled",
        simulation.frames(),
        query::hazard_pool_size(world)
    );
    println!(
        "frames={} generation={} restarts={restarts} hazards_spawned={spawned}",
        simulation.frames(),
        query::generation(world).get()
    );
}

fn run_windowed(mut simulation: Simulation, config: &GameConfig, args: &CliArgs) -> Result<()> {
    let camera = Camera::new(Vec2::new(config.window.width, config.window.height))
        .context("window size cannot be used as a viewport")?;
    let mut scene = Scene::new(camera);
    scene::populate(&mut scene, simulation.world());

    let presentation = Presentation::new(
        config.window.title.clone(),
        Color::from_rgb_u8(0x10, 0x12, 0x1c),
        scene,
    );
    let backend = MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_collider_outlines(args.debug_colliders || config.debug.colliders);

    backend.run(presentation, move |dt, input, scene| {
        let report = simulation.step(dt.min(MAX_FRAME_STEP), scene::player_input(input));
        if report.restarted() {
            log::debug!("level rebuilt after {} frames", simulation.frames());
        }
        scene::populate(scene, simulation.world());
    })
}
