// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::{CameraBackendType, RenderTarget};
use crate::constants::TICK_INTERVAL;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Directory name under the platform config/cache/pictures directories
pub const CONFIG_DIR_NAME: &str = "cvfx";

const CONFIG_FILE_NAME: &str = "config.json";

/// Persisted user settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Capture device index opened by the start action
    pub camera_id: u32,
    /// Capture backend (V4l2 or Synthetic)
    pub backend: CameraBackendType,
    /// Frame pump interval in milliseconds
    pub tick_interval_ms: u64,
    /// Runtime lifecycle logging
    pub logging_active: bool,
    /// Initial render enable flags
    pub render_main: bool,
    pub render_alpha: bool,
    pub render_beta: bool,
    /// Snapshot output directory (default: ~/Pictures/cvfx)
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera_id: 0,
            backend: CameraBackendType::default(),
            tick_interval_ms: TICK_INTERVAL.as_millis() as u64,
            logging_active: true,
            render_main: true,
            render_alpha: false,
            render_beta: false,
            snapshot_dir: None,
        }
    }
}

impl Config {
    /// Default location: `<config dir>/cvfx/config.json`
    pub fn path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load the config, falling back to defaults on any error
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_err)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Pump interval, never shorter than one millisecond
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn render_default(&self, target: RenderTarget) -> bool {
        match target {
            RenderTarget::Main => self.render_main,
            RenderTarget::Alpha => self.render_alpha,
            RenderTarget::Beta => self.render_beta,
        }
    }

    /// Snapshot directory, falling back to `~/Pictures/cvfx`
    pub fn snapshot_dir(&self) -> PathBuf {
        self.snapshot_dir.clone().unwrap_or_else(|| {
            dirs::picture_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(CONFIG_DIR_NAME)
        })
    }
}
