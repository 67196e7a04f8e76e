//! On-disk configuration: sampling cadence, axis geometry, button bindings.

use crate::input::axis::{AxisConfig, AxisConfigError, AxisKeymap};
use crate::input::buttons::ButtonBinding;
use crate::input::{AxisKind, AxisTranslator, LogicalKey};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {axis:?} axis: {source}")]
    Axis {
        axis: AxisKind,
        #[source]
        source: AxisConfigError,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to encode default config: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Could not determine a config directory")]
    NoConfigDir,
}

/// Timing and queue depths for the two input tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Joystick sampling cadence.
    pub interval_ms: u64,
    /// Capacity of the interrupt-fed line notification queue.
    pub line_queue_depth: usize,
    /// Capacity of the engine event queue created by the runner.
    pub engine_queue_depth: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 50,
            line_queue_depth: 10,
            engine_queue_depth: 64,
        }
    }
}

/// One analog axis: ADC channel, deadzone geometry, key resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisSection {
    pub channel: u8,
    #[serde(default)]
    pub deadzone: AxisConfig,
    pub keys: AxisKeymap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sampling: SamplingConfig,
    pub horizontal: AxisSection,
    pub vertical: AxisSection,
    pub buttons: Vec<ButtonBinding>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            horizontal: AxisSection {
                channel: 0,
                deadzone: AxisConfig::default(),
                keys: AxisKeymap::horizontal(),
            },
            vertical: AxisSection {
                channel: 1,
                deadzone: AxisConfig::default(),
                keys: AxisKeymap::vertical(),
            },
            buttons: vec![
                ButtonBinding::key(17, LogicalKey::Fire),
                ButtonBinding::key(17, LogicalKey::MenuEnter),
                ButtonBinding::key(27, LogicalKey::Use),
                ButtonBinding::strafe_toggle(22),
            ],
        }
    }
}

impl Config {
    /// Default location under the platform config dir.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("padlink").join("config.toml"))
    }

    /// Loads and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the default-path config, writing the built-in defaults there
    /// first if no file exists yet.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            let config = Self::load(&path)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.write_to(&path)?;
            info!("Wrote default configuration to {}", path.display());
            Ok(config)
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let encoded = toml::to_string_pretty(self)?;
        fs::write(path, encoded).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Rejects bad axis geometry before any task starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.horizontal
            .deadzone
            .validate()
            .map_err(|source| ConfigError::Axis {
                axis: AxisKind::Horizontal,
                source,
            })?;
        self.vertical
            .deadzone
            .validate()
            .map_err(|source| ConfigError::Axis {
                axis: AxisKind::Vertical,
                source,
            })?;
        Ok(())
    }

    /// Builds the per-axis translators described by this config.
    pub fn translators(&self) -> (AxisTranslator, AxisTranslator) {
        (
            AxisTranslator::new(
                AxisKind::Horizontal,
                self.horizontal.deadzone,
                self.horizontal.keys.clone(),
            ),
            AxisTranslator::new(
                AxisKind::Vertical,
                self.vertical.deadzone,
                self.vertical.keys.clone(),
            ),
        )
    }
}
