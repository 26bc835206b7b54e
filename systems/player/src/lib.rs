#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player controller translating held keys into movement and animation intents.

use monster_kong_core::{
    Command, Facing, PlayerAnimation, PlayerInput, PlayerIntent, PlayerSnapshot, WalkingChange,
    JUMP_SPEED, PLAYER_IDLE_FRAME, PLAYER_JUMP_FRAME, PLAYER_SPEED,
};

/// Pure per-frame state transform for the player character.
///
/// Walking and idle are read back from the world's animation state; jumping has
/// no state of its own beyond the fixed frame shown while airborne.
#[derive(Clone, Copy, Debug)]
pub struct PlayerController {
    speed: f32,
    jump_speed: f32,
}

impl PlayerController {
    /// Creates a controller using the stock movement constants.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_speeds(PLAYER_SPEED, JUMP_SPEED)
    }

    /// Creates a controller with custom horizontal and jump speeds.
    #[must_use]
    pub const fn with_speeds(speed: f32, jump_speed: f32) -> Self {
        Self { speed, jump_speed }
    }

    /// Decides the intent for one frame from held keys and the player's current state.
    #[must_use]
    pub fn intent(&self, input: PlayerInput, player: &PlayerSnapshot) -> PlayerIntent {
        let on_ground = player.contact.on_ground();
        let mut intent = PlayerIntent::default();

        // Left wins when both directions are held.
        let direction = if input.left {
            Some((Facing::Left, -self.speed))
        } else if input.right {
            Some((Facing::Right, self.speed))
        } else {
            None
        };

        match direction {
            Some((facing, velocity_x)) => {
                intent.velocity_x = velocity_x;
                intent.facing = Some(facing);
                if on_ground && player.animation != PlayerAnimation::Walking {
                    intent.walking = WalkingChange::Start;
                }
            }
            None => {
                intent.velocity_x = 0.0;
                intent.walking = WalkingChange::Stop;
                if on_ground {
                    intent.frame = Some(PLAYER_IDLE_FRAME);
                }
            }
        }

        if on_ground && input.jump_held() {
            intent.velocity_y = Some(self.jump_speed);
            intent.walking = WalkingChange::Stop;
            intent.frame = Some(PLAYER_JUMP_FRAME);
        }

        intent
    }

    /// Emits the frame's `DrivePlayer` command when a player exists.
    pub fn handle(
        &self,
        input: PlayerInput,
        player: Option<&PlayerSnapshot>,
        out: &mut Vec<Command>,
    ) {
        if let Some(player) = player {
            out.push(Command::DrivePlayer {
                intent: self.intent(input, player),
            });
        }
    }
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new()
    }
}
