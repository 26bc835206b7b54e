#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Monster Kong runtime.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

mod collision;
mod level;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use collision::{CollisionPolicy, EntityClass};
pub use level::{
    FirePlacement, LevelData, LevelEntity, LevelError, PlatformKey, PlatformPlacement,
    SpawnerField, SpawnerSettings,
};

/// Title shown by windowed adapters.
pub const WINDOW_TITLE: &str = "Monster Kong";

/// Logical viewport width in world units.
pub const VIEWPORT_WIDTH: f32 = 360.0;

/// Logical viewport height in world units.
pub const VIEWPORT_HEIGHT: f32 = 640.0;

/// Downward acceleration applied to dynamic bodies, in units per second squared.
pub const DEFAULT_GRAVITY: f32 = 1000.0;

/// Horizontal speed applied while a direction key is held.
pub const PLAYER_SPEED: f32 = 150.0;

/// Vertical velocity applied by a jump. Negative values point up.
pub const JUMP_SPEED: f32 = -600.0;

/// Length of the fade-out played before the level restarts.
pub const FADE_DURATION: Duration = Duration::from_millis(500);

/// Spritesheet frame shown while the player stands still on the ground.
pub const PLAYER_IDLE_FRAME: u8 = 3;

/// Spritesheet frame shown while the player is airborne after a jump.
pub const PLAYER_JUMP_FRAME: u8 = 2;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the downward acceleration used by the physics step.
    ConfigurePhysics {
        /// Gravity in world units per second squared.
        gravity: f32,
    },
    /// Replaces the running level with a freshly built one.
    LoadLevel {
        /// Validated description of the level to build.
        level: LevelData,
    },
    /// Tears down every entity of the current generation and rebuilds the cached level.
    ResetLevel,
    /// Advances the level clock, camera fade and animations.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a pooled hazard be activated at the provided position.
    SpawnHazard {
        /// Center of the hazard once spawned.
        position: Vec2,
        /// Signed horizontal speed given to the hazard.
        velocity_x: f32,
    },
    /// Requests that a hazard be returned to the pool and excluded from physics.
    RetireHazard {
        /// Handle issued when the hazard was spawned.
        hazard: HazardHandle,
    },
    /// Integrates bodies, resolves blocking collisions and reports overlaps.
    StepPhysics {
        /// Duration the bodies are integrated over.
        dt: Duration,
    },
    /// Applies the player controller's decision for this frame.
    DrivePlayer {
        /// Velocity, facing and animation changes to apply to the player.
        intent: PlayerIntent,
    },
    /// Starts the camera fade-out that precedes a level restart.
    BeginFade {
        /// Time the fade takes to reach full opacity.
        duration: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a level was (re)built and every prior handle is void.
    LevelStarted {
        /// Generation tag carried by every handle issued for the new level.
        generation: Generation,
    },
    /// Indicates that the level clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a hazard left the pool and entered play.
    HazardSpawned {
        /// Handle identifying the activated hazard.
        hazard: HazardHandle,
        /// Center of the hazard at activation.
        position: Vec2,
        /// Horizontal velocity assigned at activation.
        velocity_x: f32,
    },
    /// Confirms that a hazard was hidden, deactivated and removed from collision.
    HazardRetired {
        /// Handle of the retired hazard.
        hazard: HazardHandle,
    },
    /// Reports that the player overlaps an entity from the triggering relation.
    PlayerOverlapped {
        /// Entity the player touched.
        other: OverlapTarget,
    },
    /// Confirms that the camera began fading out.
    FadeStarted {
        /// Time the fade takes to complete.
        duration: Duration,
    },
    /// Reports that the camera fade reached full opacity.
    FadeCompleted,
}

/// Monotonic tag identifying one life of the level.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Generation(u32);

impl Generation {
    /// Creates a generation tag from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the generation.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the generation that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Handle to a pooled hazard slot, scoped to the generation that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HazardHandle {
    slot: u32,
    generation: Generation,
}

impl HazardHandle {
    /// Creates a handle for the provided slot and generation.
    #[must_use]
    pub const fn new(slot: u32, generation: Generation) -> Self {
        Self { slot, generation }
    }

    /// Index of the pool slot the handle refers to.
    #[must_use]
    pub const fn slot(&self) -> u32 {
        self.slot
    }

    /// Generation of the level that issued the handle.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }
}

/// Identifier of a fire emitter, equal to its index in the level data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FireId(u32);

impl FireId {
    /// Creates a fire identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Entity the player can touch to trigger a restart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlapTarget {
    /// A burning fire emitter.
    Fire(FireId),
    /// The goal sprite at the top of the level.
    Goal,
    /// A rolling hazard.
    Hazard(HazardHandle),
}

impl OverlapTarget {
    /// Collision class of the touched entity.
    #[must_use]
    pub const fn class(&self) -> EntityClass {
        match self {
            Self::Fire(_) => EntityClass::Fire,
            Self::Goal => EntityClass::Goal,
            Self::Hazard(_) => EntityClass::Hazard,
        }
    }
}

/// Direction the player sprite faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Facing toward decreasing x. The spritesheet is drawn this way.
    #[default]
    Left,
    /// Facing toward increasing x. Rendered by mirroring the sprite.
    Right,
}

impl Facing {
    /// Reports whether adapters must mirror the sprite horizontally.
    #[must_use]
    pub const fn flip_x(&self) -> bool {
        matches!(self, Self::Right)
    }
}

/// Named animation currently driving the player sprite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlayerAnimation {
    /// No animation is playing; a fixed frame is shown.
    #[default]
    Idle,
    /// The looping walk cycle is playing.
    Walking,
}

/// Change requested for the walking animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WalkingChange {
    /// Leave the animation as it is.
    #[default]
    Unchanged,
    /// Start the walk cycle from its first frame.
    Start,
    /// Stop the walk cycle, keeping the current frame.
    Stop,
}

/// Per-frame decision produced by the player controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerIntent {
    /// Horizontal velocity to assign.
    pub velocity_x: f32,
    /// Vertical velocity to assign, when a jump fires.
    pub velocity_y: Option<f32>,
    /// New facing, when a direction is held.
    pub facing: Option<Facing>,
    /// Walk animation change, applied before `frame`.
    pub walking: WalkingChange,
    /// Fixed spritesheet frame to show, applied after `walking`.
    pub frame: Option<u8>,
}

impl Default for PlayerIntent {
    fn default() -> Self {
        Self {
            velocity_x: 0.0,
            velocity_y: None,
            facing: None,
            walking: WalkingChange::Unchanged,
            frame: None,
        }
    }
}

/// Keyboard state sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PlayerInput {
    /// Left arrow held.
    pub left: bool,
    /// Right arrow held.
    pub right: bool,
    /// Up arrow held.
    pub up: bool,
    /// Space bar held.
    pub space: bool,
}

impl PlayerInput {
    /// Reports whether either jump key is held.
    #[must_use]
    pub const fn jump_held(&self) -> bool {
        self.up || self.space
    }
}

/// Downward contact flags reported by the physics step.
///
/// Static surfaces and dynamic surfaces report ground contact through
/// different flags, so both have to be checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ContactFlags {
    /// Body was stopped moving down by a static surface or the world bounds.
    pub blocked_down: bool,
    /// Body touched another body with its bottom face.
    pub touching_down: bool,
}

impl ContactFlags {
    /// Ground contact predicate used by the player controller.
    #[must_use]
    pub const fn on_ground(&self) -> bool {
        self.blocked_down || self.touching_down
    }
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Center of the player body.
    pub position: Vec2,
    /// Current body velocity.
    pub velocity: Vec2,
    /// Direction the sprite faces.
    pub facing: Facing,
    /// Animation currently playing.
    pub animation: PlayerAnimation,
    /// Spritesheet frame currently shown.
    pub frame: u8,
    /// Ground contact flags from the latest physics step.
    pub contact: ContactFlags,
}

/// Immutable representation of a single pooled hazard used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HazardSnapshot {
    /// Handle that currently addresses the slot.
    pub handle: HazardHandle,
    /// Center of the hazard body.
    pub position: Vec2,
    /// Current body velocity.
    pub velocity: Vec2,
    /// Whether the hazard is in play.
    pub active: bool,
    /// Whether the hazard is drawn.
    pub visible: bool,
    /// Whether the hazard participates in collision resolution.
    pub body_enabled: bool,
}

/// Immutable representation of a fire emitter used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireSnapshot {
    /// Identifier of the fire.
    pub id: FireId,
    /// Trigger region of the fire.
    pub bounds: Aabb,
    /// Spritesheet frame of the burning animation.
    pub frame: u8,
}

/// Texture keys understood by the runtime, each with a fixed frame size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKey {
    /// Full-width ground slab.
    Ground,
    /// Thin girder tile.
    Platform,
    /// Square block tile.
    Block,
    /// Goal sprite.
    Goal,
    /// Rolling barrel hazard.
    Barrel,
    /// Player spritesheet.
    Player,
    /// Fire spritesheet.
    Fire,
}

impl SpriteKey {
    /// Size of a single frame of the texture in world units.
    #[must_use]
    pub const fn frame_size(self) -> Vec2 {
        match self {
            Self::Ground => Vec2::new(360.0, 30.0),
            Self::Platform => Vec2::new(36.0, 15.0),
            Self::Block => Vec2::new(36.0, 30.0),
            Self::Goal => Vec2::new(42.0, 50.0),
            Self::Barrel => Vec2::new(20.0, 20.0),
            Self::Player => Vec2::new(28.0, 30.0),
            Self::Fire => Vec2::new(20.0, 21.0),
        }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    min: Vec2,
    size: Vec2,
}

impl Aabb {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Creates a rectangle centered on the provided point.
    #[must_use]
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size * 0.5,
            size,
        }
    }

    /// Top-left corner.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Bottom-right corner.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Width and height.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Reports whether the rectangles share a region of positive area.
    ///
    /// Rectangles that only touch along an edge do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x
            && a_max.x > other.min.x
            && self.min.y < b_max.y
            && a_max.y > other.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_contact_is_not_an_intersection() {
        let floor = Aabb::from_min_size(Vec2::new(0.0, 100.0), Vec2::new(50.0, 10.0));
        let resting = Aabb::from_min_size(Vec2::new(10.0, 70.0), Vec2::new(10.0, 30.0));
        let sunk = Aabb::from_min_size(Vec2::new(10.0, 71.0), Vec2::new(10.0, 30.0));

        assert!(!floor.intersects(&resting));
        assert!(floor.intersects(&sunk));
        assert!(sunk.intersects(&floor));
    }

    #[test]
    fn centered_rectangle_keeps_its_center() {
        let rect = Aabb::from_center_size(Vec2::new(300.0, 100.0), Vec2::new(42.0, 50.0));
        assert_eq!(rect.min(), Vec2::new(279.0, 75.0));
        assert_eq!(rect.center(), Vec2::new(300.0, 100.0));
    }

    #[test]
    fn either_jump_key_counts() {
        let up = PlayerInput {
            up: true,
            ..PlayerInput::default()
        };
        let space = PlayerInput {
            space: true,
            ..PlayerInput::default()
        };
        assert!(up.jump_held());
        assert!(space.jump_held());
        assert!(!PlayerInput::default().jump_held());
    }

    #[test]
    fn ground_contact_accepts_either_signal() {
        let blocked = ContactFlags {
            blocked_down: true,
            touching_down: false,
        };
        let touching = ContactFlags {
            blocked_down: false,
            touching_down: true,
        };
        assert!(blocked.on_ground());
        assert!(touching.on_ground());
        assert!(!ContactFlags::default().on_ground());
    }

    #[test]
    fn generation_advances_monotonically() {
        let first = Generation::default();
        assert!(first.next() > first);
        assert_eq!(first.next().get(), 1);
    }

    #[test]
    fn only_right_facing_mirrors_sprite() {
        assert!(!Facing::Left.flip_x());
        assert!(Facing::Right.flip_x());
    }
}
