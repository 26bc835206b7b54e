//! Game configuration loaded from TOML.

use std::{fs, path::Path};

use monster_kong_core::{DEFAULT_GRAVITY, VIEWPORT_HEIGHT, VIEWPORT_WIDTH, WINDOW_TITLE};
use serde::Deserialize;
use thiserror::Error;

/// Settings for the window, physics and debug overlays.
///
/// Every section and key is optional; missing values fall back to the stock game.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) window: WindowConfig,
    pub(crate) physics: PhysicsConfig,
    pub(crate) debug: DebugConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowConfig {
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
            title: WINDOW_TITLE.to_owned(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PhysicsConfig {
    pub(crate) gravity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DebugConfig {
    pub(crate) colliders: bool,
}

/// Reasons a configuration file is rejected.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("gravity must be finite (received {0})")]
    NonFiniteGravity(f32),
    #[error("window must be positive (received {width}x{height})")]
    InvalidWindow { width: f32, height: f32 },
}

impl GameConfig {
    pub(crate) fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub(crate) fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.physics.gravity.is_finite() {
            return Err(ConfigError::NonFiniteGravity(self.physics.gravity));
        }
        let WindowConfig { width, height, .. } = self.window;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidWindow { width, height });
        }
        Ok(())
    }
}
