use std::time::Duration;

use glam::Vec2;
use monster_kong_core::{Event, Generation, LevelData, PlayerInput};
use monster_kong_simulation::{Config, Simulation};
use monster_kong_world::query;

const DT: Duration = Duration::from_millis(100);

// Player waits on a ledge above the goal's floor, out of reach of the hazards.
const SPAWN_LEVEL: &str = r#"{
    "world": { "width": 360, "height": 640 },
    "platforms": [
        { "x": 0, "y": 125, "key": "ground", "numTiles": 1 },
        { "x": 0, "y": 35, "key": "platform", "numTiles": 3 }
    ],
    "fires": [],
    "spawner": { "interval": 2000, "lifespan": 5000, "speed": -100 },
    "player": { "x": 50, "y": 20 },
    "goal": { "x": 300, "y": 100 }
}"#;

// Player starts inside a fire and the goal at once.
const TRAP_LEVEL: &str = r#"{
    "world": { "width": 360, "height": 640 },
    "platforms": [ { "x": 0, "y": 125, "key": "ground", "numTiles": 1 } ],
    "fires": [ { "x": 280, "y": 104 } ],
    "spawner": { "interval": 2000, "lifespan": 5000, "speed": -100 },
    "player": { "x": 290, "y": 110 },
    "goal": { "x": 300, "y": 100 }
}"#;

fn simulation(source: &str) -> Simulation {
    let level = LevelData::from_json_str(source).expect("valid level");
    Simulation::new(level, Config::default())
}

#[test]
fn hazard_spawns_at_goal_and_retires_after_lifespan() {
    let mut simulation = simulation(SPAWN_LEVEL);

    let mut spawn = None;
    for frame in 1..=20 {
        let report = simulation.step(DT, PlayerInput::default());
        assert!(!report.restarted(), "unexpected restart on frame {frame}");
        for event in report.events {
            if let Event::HazardSpawned {
                hazard,
                position,
                velocity_x,
            } = event
            {
                spawn = Some((frame, hazard, position, velocity_x));
            }
        }
    }

    let (frame, hazard, position, velocity_x) = spawn.expect("hazard spawned after 2000 ms");
    assert_eq!(frame, 20);
    assert_eq!(position, Vec2::new(300.0, 100.0));
    assert_eq!(velocity_x, -100.0);

    for frame in 21..=69 {
        let report = simulation.step(DT, PlayerInput::default());
        assert!(
            !report
                .events
                .contains(&Event::HazardRetired { hazard }),
            "retired early on frame {frame}"
        );
        let snapshot = query::hazard(simulation.world(), hazard).expect("hazard exists");
        assert!(snapshot.active);
    }

    let report = simulation.step(DT, PlayerInput::default());
    assert!(report.events.contains(&Event::HazardRetired { hazard }));

    let retired = query::hazard(simulation.world(), hazard).expect("slot survives");
    assert!(!retired.active);
    assert!(!retired.visible);
    assert!(!retired.body_enabled);

    let _ = simulation.step(DT, PlayerInput::default());
    let later = query::hazard(simulation.world(), hazard).expect("slot survives");
    assert_eq!(later.position, retired.position, "retired hazard must not move");
}

#[test]
fn idle_player_rests_on_ledge() {
    let mut simulation = simulation(SPAWN_LEVEL);
    for _ in 0..10 {
        let _ = simulation.step(DT, PlayerInput::default());
    }

    let player = query::player(simulation.world()).expect("player exists");
    assert_eq!(player.position, Vec2::new(50.0, 20.0));
    assert!(player.contact.on_ground());
    assert_eq!(player.frame, 3);
}

#[test]
fn touching_fire_and_goal_restarts_exactly_once() {
    let mut simulation = simulation(TRAP_LEVEL);
    let mut log = Vec::new();
    for _ in 0..6 {
        log.extend(simulation.step(DT, PlayerInput::default()).events);
    }

    let first_restart = log
        .iter()
        .position(|event| matches!(event, Event::LevelStarted { .. }))
        .expect("level restarted");
    let fades_before = log[..first_restart]
        .iter()
        .filter(|event| matches!(event, Event::FadeStarted { .. }))
        .count();
    let completions = log
        .iter()
        .filter(|event| matches!(event, Event::FadeCompleted))
        .count();
    let restarts = log
        .iter()
        .filter(|event| matches!(event, Event::LevelStarted { .. }))
        .count();

    assert_eq!(fades_before, 1);
    assert_eq!(completions, 1);
    assert_eq!(restarts, 1);
    assert_eq!(query::generation(simulation.world()), Generation::new(2));
}

#[test]
fn restart_rebuilds_the_level_from_scratch() {
    let mut simulation = simulation(SPAWN_LEVEL);
    for _ in 0..25 {
        let _ = simulation.step(DT, PlayerInput::default());
    }
    assert_eq!(query::hazard_pool_size(simulation.world()), 1);

    // Walk right off the ledge and onto the goal's floor.
    let mut restarted = false;
    for _ in 0..100 {
        let input = PlayerInput {
            right: true,
            ..PlayerInput::default()
        };
        if simulation.step(DT, input).restarted() {
            restarted = true;
            break;
        }
    }

    assert!(restarted, "touching the goal or a hazard restarts the level");
    assert_eq!(query::hazard_pool_size(simulation.world()), 0);
    assert_eq!(query::elapsed(simulation.world()), Duration::ZERO);
    let player = query::player(simulation.world()).expect("player rebuilt");
    assert_eq!(player.position, Vec2::new(50.0, 20.0));
}

#[test]
fn bundled_level_loads() {
    let level = LevelData::from_json_str(include_str!("../../assets/levels/level_data.json"))
        .expect("bundled level is valid");
    let mut simulation = Simulation::new(level, Config::default());

    let report = simulation.step(Duration::from_secs_f32(1.0 / 60.0), PlayerInput::default());
    assert!(!report.restarted());
    assert_eq!(simulation.frames(), 1);
    assert_eq!(query::fires(simulation.world()).len(), 4);
}
