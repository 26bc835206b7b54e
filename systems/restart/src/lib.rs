#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Restart system that fades the camera out on any triggering overlap and then resets the level.

use std::time::Duration;

use monster_kong_core::{Command, Event, OverlapTarget, FADE_DURATION};

/// Progress of the restart sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RestartPhase {
    /// The level is running and overlaps start a restart.
    #[default]
    Playing,
    /// The fade-out is running; further overlaps are ignored.
    Fading {
        /// Overlap that started the restart.
        trigger: OverlapTarget,
    },
    /// The reset was requested and the new level has not started yet.
    Resetting,
}

/// Pure system that turns the first overlap of a level life into exactly one reset.
///
/// Touching the goal and touching a fire or hazard restart the level the same way.
#[derive(Debug)]
pub struct RestartProtocol {
    fade_duration: Duration,
    phase: RestartPhase,
}

impl RestartProtocol {
    /// Creates a protocol that fades out over the stock duration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_fade(FADE_DURATION)
    }

    /// Creates a protocol with a custom fade duration.
    #[must_use]
    pub fn with_fade(fade_duration: Duration) -> Self {
        Self {
            fade_duration,
            phase: RestartPhase::Playing,
        }
    }

    /// Current phase of the restart sequence.
    #[must_use]
    pub fn phase(&self) -> RestartPhase {
        self.phase
    }

    /// Consumes world events and emits at most one fade and one reset per level life.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match (event, self.phase) {
                (Event::LevelStarted { .. }, _) => self.phase = RestartPhase::Playing,
                (Event::PlayerOverlapped { other }, RestartPhase::Playing) => {
                    log::info!("player touched {}; restarting level", describe(other));
                    self.phase = RestartPhase::Fading { trigger: *other };
                    out.push(Command::BeginFade {
                        duration: self.fade_duration,
                    });
                }
                (Event::FadeCompleted, RestartPhase::Fading { .. }) => {
                    self.phase = RestartPhase::Resetting;
                    out.push(Command::ResetLevel);
                }
                _ => {}
            }
        }
    }
}

impl Default for RestartProtocol {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(target: &OverlapTarget) -> String {
    match target {
        OverlapTarget::Fire(id) => format!("fire #{}", id.get()),
        OverlapTarget::Goal => "the goal".to_owned(),
        OverlapTarget::Hazard(handle) => format!("hazard {}", handle.slot()),
    }
}
