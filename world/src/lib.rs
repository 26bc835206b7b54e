#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Monster Kong.

mod animation;
mod physics;
mod pool;

use std::time::Duration;

use glam::Vec2;
use monster_kong_core::{
    Aabb, Command, CollisionPolicy, EntityClass, Event, Facing, FireId, Generation, LevelData,
    OverlapTarget, PlayerIntent, SpriteKey, WalkingChange, DEFAULT_GRAVITY, PLAYER_IDLE_FRAME,
};

use animation::{Animator, BURNING, WALKING};
use physics::Body;
use pool::HazardPool;

/// Represents the authoritative Monster Kong world state.
#[derive(Debug)]
pub struct World {
    gravity: f32,
    generation: Generation,
    level: Option<LevelData>,
    stage: Option<Stage>,
    fade: Fade,
    clock: Duration,
}

impl World {
    /// Creates an empty world. Nothing exists until a level is loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            generation: Generation::default(),
            level: None,
            stage: None,
            fade: Fade::Idle,
            clock: Duration::ZERO,
        }
    }

    /// Discards every entity and rebuilds the cached level under a new generation.
    fn rebuild(&mut self, out_events: &mut Vec<Event>) {
        let Some(level) = self.level.as_ref() else {
            log::warn!("reset requested before any level was loaded");
            return;
        };

        self.generation = self.generation.next();
        self.stage = Some(Stage::build(level, self.generation));
        self.fade = Fade::Idle;
        self.clock = Duration::ZERO;

        log::info!("level started (generation {})", self.generation.get());
        out_events.push(Event::LevelStarted {
            generation: self.generation,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Every entity belonging to one life of the level.
#[derive(Debug)]
struct Stage {
    world_size: Vec2,
    platforms: Vec<Aabb>,
    fires: Vec<Fire>,
    player: Player,
    goal: Body,
    hazards: HazardPool,
}

impl Stage {
    /// Builds platforms, fires, player, goal and an empty hazard pool in that order.
    fn build(level: &LevelData, generation: Generation) -> Self {
        let platforms = level
            .platforms()
            .iter()
            .map(|platform| Aabb::from_min_size(platform.position(), platform.size()))
            .collect();

        let fires = level
            .fires()
            .iter()
            .map(|fire| {
                let mut animator = Animator::showing(0);
                animator.play(&BURNING);
                Fire {
                    bounds: Aabb::from_min_size(fire.position(), SpriteKey::Fire.frame_size()),
                    animator,
                }
            })
            .collect();

        let player = Player {
            body: Body::dynamic(level.player_start(), SpriteKey::Player.frame_size())
                .with_world_bounds(),
            facing: Facing::default(),
            animator: Animator::showing(PLAYER_IDLE_FRAME),
        };

        Self {
            world_size: level.world_size(),
            platforms,
            fires,
            player,
            goal: Body::dynamic(level.goal_start(), SpriteKey::Goal.frame_size()),
            hazards: HazardPool::new(generation),
        }
    }

    fn animate(&mut self, dt: Duration) {
        self.player.animator.advance(dt);
        for fire in &mut self.fires {
            fire.animator.advance(dt);
        }
    }

    /// Integrates the frame in equal substeps no longer than [`PHYSICS_SUBSTEP`], then
    /// reports the overlaps of the final positions once.
    fn step(&mut self, dt: f32, gravity: f32, out_events: &mut Vec<Event>) {
        let (count, substep) = substeps(dt);
        for _ in 0..count {
            self.integrate(substep, gravity);
        }
        self.report_overlaps(out_events);
    }

    fn integrate(&mut self, dt: f32, gravity: f32) {
        let world_size = self.world_size;
        let platforms = &self.platforms;
        let resolve = |body: &mut Body, class: EntityClass| {
            body.integrate(dt, gravity, world_size);
            if CollisionPolicy::blocks(class, EntityClass::Platform) {
                for platform in platforms {
                    body.separate_from(platform);
                }
            }
        };

        resolve(&mut self.player.body, EntityClass::Player);
        resolve(&mut self.goal, EntityClass::Goal);
        for hazard in self.hazards.iter_active_mut() {
            resolve(&mut hazard.body, EntityClass::Hazard);
        }
    }

    /// Emits one event per triggering entity the player overlaps, fires first.
    fn report_overlaps(&self, out_events: &mut Vec<Event>) {
        if !self.player.body.enabled {
            return;
        }
        let player = self.player.body.aabb();

        let fires = self
            .fires
            .iter()
            .enumerate()
            .filter(|(_, fire)| player.intersects(&fire.bounds))
            .map(|(index, _)| OverlapTarget::Fire(FireId::new(index as u32)));
        let goal = player
            .intersects(&self.goal.aabb())
            .then_some(OverlapTarget::Goal);
        let hazards = self
            .hazards
            .iter()
            .filter(|(_, hazard, active)| {
                *active && hazard.body.enabled && player.intersects(&hazard.body.aabb())
            })
            .map(|(handle, _, _)| OverlapTarget::Hazard(handle));

        for other in fires.chain(goal).chain(hazards) {
            if CollisionPolicy::triggers(EntityClass::Player, other.class()) {
                out_events.push(Event::PlayerOverlapped { other });
            }
        }
    }

    fn drive_player(&mut self, intent: PlayerIntent) {
        let player = &mut self.player;
        player.body.velocity.x = intent.velocity_x;
        if let Some(velocity_y) = intent.velocity_y {
            player.body.velocity.y = velocity_y;
        }
        if let Some(facing) = intent.facing {
            player.facing = facing;
        }
        match intent.walking {
            WalkingChange::Unchanged => {}
            WalkingChange::Start => player.animator.play(&WALKING),
            WalkingChange::Stop => player.animator.stop(&WALKING),
        }
        if let Some(frame) = intent.frame {
            player.animator.set_frame(frame);
        }
    }
}

/// Longest interval integrated in one physics substep.
const PHYSICS_SUBSTEP: f32 = 1.0 / 60.0;

/// Upper bound on substeps per frame; longer frames stretch each substep instead.
const MAX_SUBSTEPS: f32 = 60.0;

/// Slack keeping a frame of exactly one substep from rounding up to two.
const SUBSTEP_SLACK: f32 = 1e-3;

/// Splits `dt` into the number of substeps and the length of each.
fn substeps(dt: f32) -> (u32, f32) {
    let count = (dt / PHYSICS_SUBSTEP - SUBSTEP_SLACK)
        .ceil()
        .clamp(1.0, MAX_SUBSTEPS);
    (count as u32, dt / count)
}

#[derive(Debug)]
struct Fire {
    bounds: Aabb,
    animator: Animator,
}

#[derive(Debug)]
struct Player {
    body: Body,
    facing: Facing,
    animator: Animator,
}

/// Camera fade that precedes a restart.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Fade {
    Idle,
    Running { elapsed: Duration, duration: Duration },
    Complete,
}

impl Fade {
    /// Advances a running fade, returning `true` on the tick it completes.
    fn advance(&mut self, dt: Duration) -> bool {
        let Self::Running { elapsed, duration } = self else {
            return false;
        };
        *elapsed = elapsed.saturating_add(dt);
        if *elapsed >= *duration {
            *self = Self::Complete;
            true
        } else {
            false
        }
    }

    fn progress(&self) -> f32 {
        match self {
            Self::Idle => 0.0,
            Self::Complete => 1.0,
            Self::Running { elapsed, duration } => {
                if duration.is_zero() {
                    1.0
                } else {
                    (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
                }
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigurePhysics { gravity } => {
            world.gravity = gravity;
        }
        Command::LoadLevel { level } => {
            world.level = Some(level);
            world.rebuild(out_events);
        }
        Command::ResetLevel => world.rebuild(out_events),
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            if world.fade.advance(dt) {
                out_events.push(Event::FadeCompleted);
            }
            if let Some(stage) = world.stage.as_mut() {
                stage.animate(dt);
            }
        }
        Command::SpawnHazard {
            position,
            velocity_x,
        } => {
            let Some(stage) = world.stage.as_mut() else {
                return;
            };
            let hazard = stage.hazards.acquire(position);
            if let Some(spawned) = stage.hazards.get_mut(hazard) {
                spawned.body.velocity.x = velocity_x;
            }
            log::debug!("hazard {} spawned at {position}", hazard.slot());
            out_events.push(Event::HazardSpawned {
                hazard,
                position,
                velocity_x,
            });
        }
        Command::RetireHazard { hazard } => {
            let Some(stage) = world.stage.as_mut() else {
                return;
            };
            if !stage.hazards.release(hazard) {
                log::debug!(
                    "ignoring retirement of hazard {} from generation {}",
                    hazard.slot(),
                    hazard.generation().get()
                );
                return;
            }
            if let Some(retired) = stage.hazards.get_mut(hazard) {
                retired.body.enabled = false;
            }
            log::debug!("hazard {} retired", hazard.slot());
            out_events.push(Event::HazardRetired { hazard });
        }
        Command::StepPhysics { dt } => {
            let gravity = world.gravity;
            if let Some(stage) = world.stage.as_mut() {
                stage.step(dt.as_secs_f32(), gravity, out_events);
            }
        }
        Command::DrivePlayer { intent } => {
            if let Some(stage) = world.stage.as_mut() {
                stage.drive_player(intent);
            }
        }
        Command::BeginFade { duration } => {
            if world.fade == Fade::Idle {
                world.fade = Fade::Running {
                    elapsed: Duration::ZERO,
                    duration,
                };
                out_events.push(Event::FadeStarted { duration });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use monster_kong_core::{
        Aabb, FireId, FireSnapshot, Generation, HazardHandle, HazardSnapshot, LevelData,
        PlayerAnimation, PlayerSnapshot,
    };

    use super::{World, WALKING};

    /// Generation of the level currently in play.
    #[must_use]
    pub fn generation(world: &World) -> Generation {
        world.generation
    }

    /// Level data the current stage was built from.
    #[must_use]
    pub fn level(world: &World) -> Option<&LevelData> {
        world.level.as_ref()
    }

    /// Width and height of the world bounds, once a level exists.
    #[must_use]
    pub fn world_size(world: &World) -> Option<Vec2> {
        world.stage.as_ref().map(|stage| stage.world_size)
    }

    /// Downward acceleration applied by the physics step.
    #[must_use]
    pub fn gravity(world: &World) -> f32 {
        world.gravity
    }

    /// Captures the player's body, facing and animation state.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerSnapshot> {
        let player = &world.stage.as_ref()?.player;
        let animation = if player.animator.is_playing(&WALKING) {
            PlayerAnimation::Walking
        } else {
            PlayerAnimation::Idle
        };
        Some(PlayerSnapshot {
            position: player.body.center(),
            velocity: player.body.velocity,
            facing: player.facing,
            animation,
            frame: player.animator.frame(),
            contact: player.body.contact(),
        })
    }

    /// Center of the goal body.
    #[must_use]
    pub fn goal_position(world: &World) -> Option<Vec2> {
        world.stage.as_ref().map(|stage| stage.goal.center())
    }

    /// Colliders of the static platforms in level order.
    #[must_use]
    pub fn platforms(world: &World) -> &[Aabb] {
        world
            .stage
            .as_ref()
            .map(|stage| stage.platforms.as_slice())
            .unwrap_or_default()
    }

    /// Captures every fire emitter in level order.
    #[must_use]
    pub fn fires(world: &World) -> Vec<FireSnapshot> {
        world.stage.as_ref().map_or_else(Vec::new, |stage| {
            stage
                .fires
                .iter()
                .enumerate()
                .map(|(index, fire)| FireSnapshot {
                    id: FireId::new(index as u32),
                    bounds: fire.bounds,
                    frame: fire.animator.frame(),
                })
                .collect()
        })
    }

    /// Captures every pooled hazard of the current generation, active or not, in slot order.
    #[must_use]
    pub fn hazards(world: &World) -> Vec<HazardSnapshot> {
        world.stage.as_ref().map_or_else(Vec::new, |stage| {
            stage
                .hazards
                .iter()
                .map(|(handle, hazard, active)| HazardSnapshot {
                    handle,
                    position: hazard.body.center(),
                    velocity: hazard.body.velocity,
                    active,
                    visible: hazard.visible,
                    body_enabled: hazard.body.enabled,
                })
                .collect()
        })
    }

    /// Captures a single hazard. Stale handles resolve to `None`.
    #[must_use]
    pub fn hazard(world: &World, handle: HazardHandle) -> Option<HazardSnapshot> {
        hazards(world)
            .into_iter()
            .find(|snapshot| snapshot.handle == handle)
    }

    /// Number of hazard slots created during the current generation.
    #[must_use]
    pub fn hazard_pool_size(world: &World) -> usize {
        world
            .stage
            .as_ref()
            .map_or(0, |stage| stage.hazards.len())
    }

    /// Opacity of the fade overlay, from 0 (clear) to 1 (black).
    #[must_use]
    pub fn fade_progress(world: &World) -> f32 {
        world.fade.progress()
    }

    /// Reports whether a fade is underway or has finished without a reset.
    #[must_use]
    pub fn is_fading(world: &World) -> bool {
        world.fade != super::Fade::Idle
    }

    /// Simulated time since the current generation started.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock
    }
}
