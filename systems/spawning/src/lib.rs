#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system that schedules hazard activation and retirement per level generation.

mod timers;

use std::{collections::VecDeque, time::Duration};

use glam::Vec2;
use monster_kong_core::{Command, Event, Generation, HazardHandle, SpawnerSettings};

pub use timers::{Firing, Repeat, TimerQueue};

/// Read-only view of where and how hazards enter play.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnSite {
    /// Current center of the goal; hazards appear here.
    pub goal: Vec2,
    /// Cadence, lifespan and speed of the level's spawner.
    pub settings: SpawnerSettings,
}

/// Action carried by a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scheduled {
    Spawn,
    Retire(HazardHandle),
}

/// Pure system that owns every timer of the current level generation.
///
/// All timers are dropped when a new generation starts, so no callback armed
/// before a restart can act on the rebuilt level.
///
/// A hazard's lifespan counts from the instant its spawn fell due, even when
/// one long advance covers several spawns.
#[derive(Debug, Default)]
pub struct SpawnScheduler {
    generation: Option<Generation>,
    timers: TimerQueue<Scheduled>,
    /// Lateness of each issued spawn not yet confirmed, in issue order.
    unconfirmed: VecDeque<Duration>,
}

impl SpawnScheduler {
    /// Creates a scheduler with no armed timers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation the armed timers belong to.
    #[must_use]
    pub fn generation(&self) -> Option<Generation> {
        self.generation
    }

    /// Number of timers waiting to fire.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Consumes events and the spawn site to emit spawn and retire commands.
    ///
    /// `site` is `None` while no level exists; timers still advance but firings
    /// that need a spawn position are dropped.
    pub fn handle(&mut self, events: &[Event], site: Option<SpawnSite>, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::LevelStarted { generation } => self.start_generation(*generation, site),
                Event::TimeAdvanced { dt } => {
                    let mut fired = Vec::new();
                    self.timers.advance(*dt, &mut fired);
                    for firing in fired {
                        self.dispatch(firing, site, out);
                    }
                }
                Event::HazardSpawned { hazard, .. } => {
                    if Some(hazard.generation()) != self.generation {
                        continue;
                    }
                    let late = self.unconfirmed.pop_front().unwrap_or_default();
                    if let Some(site) = site {
                        self.timers.after_elapsed(
                            site.settings.lifespan(),
                            late,
                            Scheduled::Retire(*hazard),
                        );
                    }
                }
                _ => {}
            }
        }
    }

    fn start_generation(&mut self, generation: Generation, site: Option<SpawnSite>) {
        self.timers.cancel_all();
        self.unconfirmed.clear();
        self.generation = Some(generation);
        if let Some(site) = site {
            self.timers.every(site.settings.interval(), Scheduled::Spawn);
        }
    }

    fn dispatch(
        &mut self,
        firing: Firing<Scheduled>,
        site: Option<SpawnSite>,
        out: &mut Vec<Command>,
    ) {
        match firing.action {
            Scheduled::Spawn => {
                if let Some(site) = site {
                    self.unconfirmed.push_back(firing.late);
                    out.push(Command::SpawnHazard {
                        position: site.goal,
                        velocity_x: site.settings.horizontal_speed(),
                    });
                }
            }
            Scheduled::Retire(hazard) => {
                log::trace!("lifespan elapsed for hazard {}", hazard.slot());
                out.push(Command::RetireHazard { hazard });
            }
        }
    }
}
