use std::time::Duration;

use glam::Vec2;
use monster_kong_core::{Command, Event, FireId, Generation, LevelData, OverlapTarget};
use monster_kong_system_restart::{RestartPhase, RestartProtocol};
use monster_kong_world::{self as world, query, World};

const DT: Duration = Duration::from_millis(100);

// Player starts inside both the fire and the goal.
const LEVEL: &str = r#"{
    "world": { "width": 360, "height": 640 },
    "platforms": [ { "x": 0, "y": 125, "key": "ground", "numTiles": 1 } ],
    "fires": [ { "x": 280, "y": 104 } ],
    "spawner": { "interval": 2000, "lifespan": 5000, "speed": -100 },
    "player": { "x": 290, "y": 110 },
    "goal": { "x": 300, "y": 100 }
}"#;

fn pump(world: &mut World, restart: &mut RestartProtocol, command: Command) -> Vec<Event> {
    let mut observed = Vec::new();
    let mut pending = vec![command];
    while !pending.is_empty() {
        let mut events = Vec::new();
        for command in pending.drain(..) {
            world::apply(world, command, &mut events);
        }
        restart.handle(&events, &mut pending);
        observed.extend(events);
    }
    observed
}

fn frame(world: &mut World, restart: &mut RestartProtocol) -> Vec<Event> {
    let mut events = pump(world, restart, Command::Tick { dt: DT });
    events.extend(pump(world, restart, Command::StepPhysics { dt: DT }));
    events
}

// Player stands clear of the goal and there are no fires.
const OPEN_LEVEL: &str = r#"{
    "world": { "width": 360, "height": 640 },
    "platforms": [ { "x": 0, "y": 125, "key": "ground", "numTiles": 1 } ],
    "fires": [],
    "spawner": { "interval": 2000, "lifespan": 5000, "speed": -100 },
    "player": { "x": 50, "y": 110 },
    "goal": { "x": 300, "y": 100 }
}"#;

fn loaded() -> (World, RestartProtocol) {
    loaded_from(LEVEL)
}

fn loaded_from(source: &str) -> (World, RestartProtocol) {
    let mut world = World::new();
    let mut restart = RestartProtocol::new();
    let level = LevelData::from_json_str(source).expect("valid level");
    let _ = pump(&mut world, &mut restart, Command::LoadLevel { level });
    (world, restart)
}

#[test]
fn simultaneous_overlaps_start_a_single_fade() {
    let (mut world, mut restart) = loaded();

    let events = frame(&mut world, &mut restart);
    let overlaps: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::PlayerOverlapped { other } => Some(*other),
            _ => None,
        })
        .collect();
    assert_eq!(
        overlaps,
        vec![OverlapTarget::Fire(FireId::new(0)), OverlapTarget::Goal]
    );

    let fades = events
        .iter()
        .filter(|event| matches!(event, Event::FadeStarted { .. }))
        .count();
    assert_eq!(fades, 1);
    assert_eq!(
        restart.phase(),
        RestartPhase::Fading {
            trigger: OverlapTarget::Fire(FireId::new(0))
        }
    );
    assert!(query::is_fading(&world));
}

#[test]
fn fade_completion_resets_exactly_once() {
    let (mut world, mut restart) = loaded();
    let mut history = Vec::new();
    for _ in 0..6 {
        history.push(frame(&mut world, &mut restart));
    }

    let count = |tick: usize, predicate: fn(&Event) -> bool| {
        history[tick].iter().filter(|event| predicate(event)).count()
    };

    assert_eq!(count(0, |event| matches!(event, Event::FadeStarted { .. })), 1);
    for tick in 1..5 {
        assert_eq!(count(tick, |event| matches!(event, Event::FadeStarted { .. })), 0);
        assert_eq!(count(tick, |event| matches!(event, Event::LevelStarted { .. })), 0);
    }
    assert_eq!(count(5, |event| matches!(event, Event::FadeCompleted)), 1);
    assert_eq!(count(5, |event| matches!(event, Event::LevelStarted { .. })), 1);
    assert_eq!(query::generation(&world), Generation::new(2));

    // Still overlapping after the rebuild, so the new life fades out again.
    let after_reset = history[5]
        .iter()
        .skip_while(|event| !matches!(event, Event::LevelStarted { .. }))
        .filter(|event| matches!(event, Event::FadeStarted { .. }))
        .count();
    assert_eq!(after_reset, 1);
}

#[test]
fn overlaps_while_fading_are_ignored() {
    let mut restart = RestartProtocol::new();
    let mut commands = Vec::new();
    let overlap = Event::PlayerOverlapped {
        other: OverlapTarget::Goal,
    };

    restart.handle(&[overlap.clone(), overlap.clone()], &mut commands);
    restart.handle(&[overlap], &mut commands);

    assert_eq!(
        commands,
        vec![Command::BeginFade {
            duration: Duration::from_millis(500)
        }]
    );
}

#[test]
fn fade_completion_without_fade_is_ignored() {
    let mut restart = RestartProtocol::new();
    let mut commands = Vec::new();
    restart.handle(&[Event::FadeCompleted], &mut commands);
    assert!(commands.is_empty());

    restart.handle(
        &[
            Event::PlayerOverlapped {
                other: OverlapTarget::Goal,
            },
            Event::FadeCompleted,
            Event::FadeCompleted,
        ],
        &mut commands,
    );
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[1], Command::ResetLevel);
    assert_eq!(restart.phase(), RestartPhase::Resetting);

    restart.handle(
        &[Event::LevelStarted {
            generation: Generation::new(2),
        }],
        &mut commands,
    );
    assert_eq!(restart.phase(), RestartPhase::Playing);
}

#[test]
fn touching_a_hazard_starts_the_fade() {
    let (mut world, mut restart) = loaded_from(OPEN_LEVEL);
    assert!(frame(&mut world, &mut restart)
        .iter()
        .all(|event| !matches!(event, Event::PlayerOverlapped { .. })));

    let spawned = pump(
        &mut world,
        &mut restart,
        Command::SpawnHazard {
            position: Vec2::new(50.0, 110.0),
            velocity_x: 0.0,
        },
    );
    let Some(Event::HazardSpawned { hazard, .. }) = spawned.first() else {
        panic!("expected a spawn confirmation");
    };

    let events = frame(&mut world, &mut restart);
    assert!(events.contains(&Event::PlayerOverlapped {
        other: OverlapTarget::Hazard(*hazard)
    }));
    assert_eq!(
        restart.phase(),
        RestartPhase::Fading {
            trigger: OverlapTarget::Hazard(*hazard)
        }
    );
    assert!(query::is_fading(&world));
}
