//! Level description loaded once per level and validated before any entity exists.

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;

use crate::SpriteKey;

/// Immutable, validated description of a single level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelData {
    world_size: Vec2,
    platforms: Vec<PlatformPlacement>,
    fires: Vec<FirePlacement>,
    spawner: SpawnerSettings,
    player: Vec2,
    goal: Vec2,
}

impl LevelData {
    /// Parses and validates a level document in its JSON form.
    pub fn from_json_str(source: &str) -> Result<Self, LevelError> {
        let document: LevelDocument = serde_json::from_str(source)?;
        Self::try_from(document)
    }

    /// Width and height of the world bounds.
    #[must_use]
    pub const fn world_size(&self) -> Vec2 {
        self.world_size
    }

    /// Static platforms in declaration order.
    #[must_use]
    pub fn platforms(&self) -> &[PlatformPlacement] {
        &self.platforms
    }

    /// Fire emitters in declaration order.
    #[must_use]
    pub fn fires(&self) -> &[FirePlacement] {
        &self.fires
    }

    /// Hazard spawner parameters.
    #[must_use]
    pub const fn spawner(&self) -> SpawnerSettings {
        self.spawner
    }

    /// Center of the player at level start.
    #[must_use]
    pub const fn player_start(&self) -> Vec2 {
        self.player
    }

    /// Center of the goal at level start.
    #[must_use]
    pub const fn goal_start(&self) -> Vec2 {
        self.goal
    }
}

/// Platform texture keys accepted in level files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKey {
    /// Full-width ground slab.
    Ground,
    /// Thin girder tile.
    Platform,
    /// Square block tile.
    Block,
}

impl PlatformKey {
    /// Texture used to draw the platform.
    #[must_use]
    pub const fn sprite(self) -> SpriteKey {
        match self {
            Self::Ground => SpriteKey::Ground,
            Self::Platform => SpriteKey::Platform,
            Self::Block => SpriteKey::Block,
        }
    }
}

/// Static platform anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlatformPlacement {
    position: Vec2,
    key: PlatformKey,
    tile_count: u32,
}

impl PlatformPlacement {
    /// Top-left corner of the platform.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Texture repeated across the platform.
    #[must_use]
    pub const fn key(&self) -> PlatformKey {
        self.key
    }

    /// Number of times the texture repeats horizontally.
    #[must_use]
    pub const fn tile_count(&self) -> u32 {
        self.tile_count
    }

    /// Extent of the platform collider.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        let tile = self.key.sprite().frame_size();
        Vec2::new(tile.x * self.tile_count as f32, tile.y)
    }
}

/// Fire emitter anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FirePlacement {
    position: Vec2,
}

impl FirePlacement {
    /// Top-left corner of the fire.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }
}

/// Cadence and motion of the hazard spawner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnerSettings {
    interval: Duration,
    lifespan: Duration,
    horizontal_speed: f32,
}

impl SpawnerSettings {
    /// Time between consecutive spawns.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Time a hazard stays in play before it is retired.
    #[must_use]
    pub const fn lifespan(&self) -> Duration {
        self.lifespan
    }

    /// Signed horizontal speed given to each spawned hazard.
    #[must_use]
    pub const fn horizontal_speed(&self) -> f32 {
        self.horizontal_speed
    }
}

/// Entity named in a level validation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelEntity {
    /// Platform at the given index.
    Platform(usize),
    /// Fire at the given index.
    Fire(usize),
    /// Player start position.
    Player,
    /// Goal start position.
    Goal,
}

impl fmt::Display for LevelEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform(index) => write!(f, "platform #{index}"),
            Self::Fire(index) => write!(f, "fire #{index}"),
            Self::Player => write!(f, "player"),
            Self::Goal => write!(f, "goal"),
        }
    }
}

/// Spawner setting named in a level validation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnerField {
    /// Time between spawns.
    Interval,
    /// Time a hazard stays in play.
    Lifespan,
}

impl fmt::Display for SpawnerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interval => write!(f, "interval"),
            Self::Lifespan => write!(f, "lifespan"),
        }
    }
}

/// Reasons a level document is rejected at load time.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The document is not valid JSON, misses a field or names an unknown key.
    #[error("level document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    /// World bounds must have positive, finite dimensions.
    #[error("world size must be positive (received {width}x{height})")]
    InvalidWorldSize {
        /// Declared world width.
        width: f32,
        /// Declared world height.
        height: f32,
    },
    /// A coordinate falls outside the world bounds.
    #[error("{entity} at ({x}, {y}) lies outside the {width}x{height} world")]
    OutOfBounds {
        /// Entity whose coordinate failed validation.
        entity: LevelEntity,
        /// Declared x coordinate.
        x: f32,
        /// Declared y coordinate.
        y: f32,
        /// World width the coordinate was checked against.
        width: f32,
        /// World height the coordinate was checked against.
        height: f32,
    },
    /// Platforms must repeat their texture at least once.
    #[error("platform #{index} must span at least one tile")]
    EmptyPlatform {
        /// Index of the offending platform.
        index: usize,
    },
    /// The spawn interval must be positive.
    #[error("spawner interval must be positive (received {0} ms)")]
    NonPositiveInterval(f64),
    /// The hazard lifespan must be positive.
    #[error("spawner lifespan must be positive (received {0} ms)")]
    NonPositiveLifespan(f64),
    /// A spawner duration is positive but cannot be represented: shorter than
    /// a nanosecond or too long for a `Duration`.
    #[error("spawner {field} of {millis} ms is out of range")]
    DurationOutOfRange {
        /// Setting that failed validation.
        field: SpawnerField,
        /// Declared value in milliseconds.
        millis: f64,
    },
    /// The hazard speed must be a finite number.
    #[error("spawner speed must be finite (received {0})")]
    NonFiniteSpeed(f32),
}

#[derive(Debug, Deserialize)]
struct LevelDocument {
    world: WorldDocument,
    platforms: Vec<PlatformDocument>,
    fires: Vec<PointDocument>,
    spawner: SpawnerDocument,
    player: PointDocument,
    goal: PointDocument,
}

#[derive(Debug, Deserialize)]
struct WorldDocument {
    width: f32,
    height: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlatformDocument {
    x: f32,
    y: f32,
    key: PlatformKey,
    num_tiles: u32,
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct PointDocument {
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
struct SpawnerDocument {
    interval: f64,
    lifespan: f64,
    speed: f32,
}

impl TryFrom<LevelDocument> for LevelData {
    type Error = LevelError;

    fn try_from(document: LevelDocument) -> Result<Self, Self::Error> {
        let WorldDocument { width, height } = document.world;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(LevelError::InvalidWorldSize { width, height });
        }
        let bounds = Bounds { width, height };

        let mut platforms = Vec::with_capacity(document.platforms.len());
        for (index, platform) in document.platforms.into_iter().enumerate() {
            let position = bounds.check(LevelEntity::Platform(index), platform.x, platform.y)?;
            if platform.num_tiles == 0 {
                return Err(LevelError::EmptyPlatform { index });
            }
            platforms.push(PlatformPlacement {
                position,
                key: platform.key,
                tile_count: platform.num_tiles,
            });
        }

        let fires = document
            .fires
            .into_iter()
            .enumerate()
            .map(|(index, fire)| {
                bounds
                    .check(LevelEntity::Fire(index), fire.x, fire.y)
                    .map(|position| FirePlacement { position })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let player = bounds.check(LevelEntity::Player, document.player.x, document.player.y)?;
        let goal = bounds.check(LevelEntity::Goal, document.goal.x, document.goal.y)?;
        let spawner = spawner_settings(&document.spawner)?;

        Ok(Self {
            world_size: Vec2::new(width, height),
            platforms,
            fires,
            spawner,
            player,
            goal,
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct Bounds {
    width: f32,
    height: f32,
}

impl Bounds {
    fn check(self, entity: LevelEntity, x: f32, y: f32) -> Result<Vec2, LevelError> {
        let inside = (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y);
        if inside {
            Ok(Vec2::new(x, y))
        } else {
            Err(LevelError::OutOfBounds {
                entity,
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }
}

fn spawner_settings(document: &SpawnerDocument) -> Result<SpawnerSettings, LevelError> {
    let interval = spawner_duration(SpawnerField::Interval, document.interval)?;
    let lifespan = spawner_duration(SpawnerField::Lifespan, document.lifespan)?;
    if !document.speed.is_finite() {
        return Err(LevelError::NonFiniteSpeed(document.speed));
    }

    Ok(SpawnerSettings {
        interval,
        lifespan,
        horizontal_speed: document.speed,
    })
}

/// Shortest spawner duration a level may declare.
const MIN_DURATION_MILLIS: f64 = 1e-6;

fn spawner_duration(field: SpawnerField, millis: f64) -> Result<Duration, LevelError> {
    if millis <= 0.0 {
        return Err(match field {
            SpawnerField::Interval => LevelError::NonPositiveInterval(millis),
            SpawnerField::Lifespan => LevelError::NonPositiveLifespan(millis),
        });
    }
    match Duration::try_from_secs_f64(millis / 1_000.0) {
        Ok(duration) if millis >= MIN_DURATION_MILLIS && !duration.is_zero() => Ok(duration),
        _ => Err(LevelError::DurationOutOfRange { field, millis }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_LEVEL: &str = r#"{
        "world": { "width": 360, "height": 640 },
        "platforms": [
            { "x": 0, "y": 610, "key": "ground", "numTiles": 1 },
            { "x": 40, "y": 480, "key": "block", "numTiles": 4 }
        ],
        "fires": [{ "x": 120, "y": 589 }],
        "spawner": { "interval": 2000, "lifespan": 5000, "speed": -100 },
        "player": { "x": 20, "y": 580 },
        "goal": { "x": 300, "y": 100 }
    }"#;

    fn level_with(replace: &str, with: &str) -> String {
        assert!(VALID_LEVEL.contains(replace), "fixture lacks {replace}");
        VALID_LEVEL.replacen(replace, with, 1)
    }

    #[test]
    fn parses_valid_document() {
        let level = LevelData::from_json_str(VALID_LEVEL).expect("level is valid");

        assert_eq!(level.world_size(), Vec2::new(360.0, 640.0));
        assert_eq!(level.platforms().len(), 2);
        assert_eq!(level.platforms()[1].key(), PlatformKey::Block);
        assert_eq!(level.platforms()[1].size(), Vec2::new(144.0, 30.0));
        assert_eq!(level.fires()[0].position(), Vec2::new(120.0, 589.0));
        assert_eq!(level.spawner().interval(), Duration::from_millis(2000));
        assert_eq!(level.spawner().lifespan(), Duration::from_millis(5000));
        assert_eq!(level.spawner().horizontal_speed(), -100.0);
        assert_eq!(level.player_start(), Vec2::new(20.0, 580.0));
        assert_eq!(level.goal_start(), Vec2::new(300.0, 100.0));
    }

    #[test]
    fn rejects_missing_field() {
        let source = level_with(r#""goal": { "x": 300, "y": 100 }"#, r#""goal": { "x": 300 }"#);
        let error = LevelData::from_json_str(&source).expect_err("goal.y is required");
        assert!(matches!(error, LevelError::Malformed(_)));
    }

    #[test]
    fn rejects_unknown_platform_key() {
        let source = level_with(r#""key": "block""#, r#""key": "lava""#);
        let error = LevelData::from_json_str(&source).expect_err("lava is not a platform");
        assert!(matches!(error, LevelError::Malformed(_)));
    }

    #[test]
    fn rejects_out_of_bounds_fire() {
        let source = level_with(r#"{ "x": 120, "y": 589 }"#, r#"{ "x": 120, "y": 641 }"#);
        let error = LevelData::from_json_str(&source).expect_err("fire below the world");
        match error {
            LevelError::OutOfBounds { entity, y, .. } => {
                assert_eq!(entity, LevelEntity::Fire(0));
                assert_eq!(y, 641.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_negative_player_coordinate() {
        let source = level_with(r#""player": { "x": 20"#, r#""player": { "x": -1"#);
        let error = LevelData::from_json_str(&source).expect_err("player left of the world");
        assert!(matches!(
            error,
            LevelError::OutOfBounds {
                entity: LevelEntity::Player,
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_positive_spawner_timing() {
        let zero_interval = level_with(r#""interval": 2000"#, r#""interval": 0"#);
        assert!(matches!(
            LevelData::from_json_str(&zero_interval),
            Err(LevelError::NonPositiveInterval(_))
        ));

        let negative_lifespan = level_with(r#""lifespan": 5000"#, r#""lifespan": -5"#);
        assert!(matches!(
            LevelData::from_json_str(&negative_lifespan),
            Err(LevelError::NonPositiveLifespan(_))
        ));
    }

    #[test]
    fn rejects_unrepresentable_spawner_timing() {
        let tiny_interval = level_with(r#""interval": 2000"#, r#""interval": 1e-7"#);
        match LevelData::from_json_str(&tiny_interval) {
            Err(LevelError::DurationOutOfRange { field, millis }) => {
                assert_eq!(field, SpawnerField::Interval);
                assert_eq!(millis, 1e-7);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let huge_lifespan = level_with(r#""lifespan": 5000"#, r#""lifespan": 1e300"#);
        let error = LevelData::from_json_str(&huge_lifespan).expect_err("lifespan overflows");
        assert!(matches!(
            error,
            LevelError::DurationOutOfRange {
                field: SpawnerField::Lifespan,
                ..
            }
        ));
        assert!(error.to_string().starts_with("spawner lifespan of "));
    }

    #[test]
    fn sub_millisecond_timing_is_kept() {
        let source = level_with(r#""interval": 2000"#, r#""interval": 0.5"#);
        let level = LevelData::from_json_str(&source).expect("half a millisecond is valid");
        let interval = level.spawner().interval();
        assert!(interval > Duration::from_micros(499) && interval < Duration::from_micros(501));
    }

    #[test]
    fn rejects_empty_platform() {
        let source = level_with(r#""numTiles": 4"#, r#""numTiles": 0"#);
        assert!(matches!(
            LevelData::from_json_str(&source),
            Err(LevelError::EmptyPlatform { index: 1 })
        ));
    }

    #[test]
    fn rejects_degenerate_world() {
        let source = level_with(r#""width": 360"#, r#""width": 0"#);
        assert!(matches!(
            LevelData::from_json_str(&source),
            Err(LevelError::InvalidWorldSize { .. })
        ));
    }

    #[test]
    fn errors_describe_the_offending_entity() {
        let source = level_with(r#""goal": { "x": 300"#, r#""goal": { "x": 999"#);
        let error = LevelData::from_json_str(&source).expect_err("goal outside");
        assert_eq!(
            error.to_string(),
            "goal at (999, 100) lies outside the 360x640 world"
        );
    }
}
