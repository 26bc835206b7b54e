#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed per-frame pipeline wiring the world to the gameplay systems.
//!
//! Every frame runs in the same order: the clock tick and everything it
//! triggers, then physics, then the player controller, then the restart
//! protocol reacting to the overlaps physics reported.

use std::time::Duration;

use monster_kong_core::{Command, Event, LevelData, PlayerInput, DEFAULT_GRAVITY, FADE_DURATION};
use monster_kong_system_player::PlayerController;
use monster_kong_system_restart::RestartProtocol;
use monster_kong_system_spawning::{SpawnScheduler, SpawnSite};
use monster_kong_world::{self as world, query, World};

/// Tunables applied when the simulation is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    gravity: f32,
    fade_duration: Duration,
}

impl Config {
    /// Creates a configuration with the provided gravity and fade duration.
    #[must_use]
    pub const fn new(gravity: f32, fade_duration: Duration) -> Self {
        Self {
            gravity,
            fade_duration,
        }
    }

    /// Downward acceleration in world units per second squared.
    #[must_use]
    pub const fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Length of the fade that precedes a restart.
    #[must_use]
    pub const fn fade_duration(&self) -> Duration {
        self.fade_duration
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY, FADE_DURATION)
    }
}

/// Everything the world reported while one frame was simulated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Events in the order the world emitted them.
    pub events: Vec<Event>,
}

impl FrameReport {
    /// Reports whether the level was rebuilt during the frame.
    #[must_use]
    pub fn restarted(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, Event::LevelStarted { .. }))
    }

    /// Number of hazards that entered play during the frame.
    #[must_use]
    pub fn hazards_spawned(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, Event::HazardSpawned { .. }))
            .count()
    }
}

/// Owns the world and every system, advancing them one frame at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    spawning: SpawnScheduler,
    player: PlayerController,
    restart: RestartProtocol,
    frames: u64,
}

impl Simulation {
    /// Builds the world from `level` and arms the systems for the first generation.
    #[must_use]
    pub fn new(level: LevelData, config: Config) -> Self {
        let mut simulation = Self {
            world: World::new(),
            spawning: SpawnScheduler::new(),
            player: PlayerController::new(),
            restart: RestartProtocol::with_fade(config.fade_duration),
            frames: 0,
        };

        let mut events = Vec::new();
        simulation.submit(
            Command::ConfigurePhysics {
                gravity: config.gravity,
            },
            &mut events,
        );
        simulation.submit(Command::LoadLevel { level }, &mut events);
        simulation
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Number of frames simulated so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advances the simulation by `dt` with the keys held this frame.
    pub fn step(&mut self, dt: Duration, input: PlayerInput) -> FrameReport {
        let mut report = FrameReport::default();

        self.submit(Command::Tick { dt }, &mut report.events);

        let mut physics = Vec::new();
        world::apply(&mut self.world, Command::StepPhysics { dt }, &mut physics);

        let player = query::player(&self.world);
        let mut commands = Vec::new();
        self.player.handle(input, player.as_ref(), &mut commands);
        for command in commands {
            world::apply(&mut self.world, command, &mut physics);
        }

        self.dispatch(physics, &mut report.events);
        self.frames = self.frames.saturating_add(1);
        report
    }

    fn submit(&mut self, command: Command, observed: &mut Vec<Event>) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.dispatch(events, observed);
    }

    /// Feeds events to the systems until they stop issuing commands.
    fn dispatch(&mut self, mut events: Vec<Event>, observed: &mut Vec<Event>) {
        let mut commands = Vec::new();
        while !events.is_empty() {
            let site = self.spawn_site();
            self.spawning.handle(&events, site, &mut commands);
            self.restart.handle(&events, &mut commands);
            observed.append(&mut events);

            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }

    fn spawn_site(&self) -> Option<SpawnSite> {
        Some(SpawnSite {
            goal: query::goal_position(&self.world)?,
            settings: query::level(&self.world)?.spawner(),
        })
    }
}
