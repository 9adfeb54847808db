//! TOML-based configuration for trimerge.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration. Command-line flags are applied on top by the binary.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::conflict::{CleanupMode, DisplayMode, Resolution, SessionState, DEFAULT_APPETITE};
use crate::errors::ConfigError;
use crate::render::highlight::DEFAULT_THEME;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Conflict detection and resolution settings.
    #[serde(default)]
    pub merge: MergeSettings,

    /// How conflicts and merged text are shown.
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            merge: MergeSettings::default(),
            display: DisplayConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Conflict detection and resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSettings {
    /// Consecutive unchanged lines tolerated inside one conflict (default 5).
    #[serde(default = "default_appetite")]
    pub appetite: i32,

    /// Resolution applied to every conflict without prompting.
    #[serde(default)]
    pub default_resolution: Option<Resolution>,
}

fn default_appetite() -> i32 {
    DEFAULT_APPETITE
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            appetite: default_appetite(),
            default_resolution: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Cleanup applied to the character diff of a conflict.
    #[serde(default)]
    pub cleanup_mode: CleanupMode,

    /// Initial display mode for conflicts.
    #[serde(default)]
    pub mode: DisplayMode,

    /// Syntax highlighting theme name.
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Highlight merged and single-side text.
    #[serde(default = "default_true")]
    pub highlight: bool,

    /// Emit ANSI colour at all.
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_theme() -> String {
    DEFAULT_THEME.into()
}
fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            cleanup_mode: CleanupMode::default(),
            mode: DisplayMode::default(),
            theme: default_theme(),
            highlight: true,
            color: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl MergeConfig {
    /// Load a [`MergeConfig`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: MergeConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Validate value ranges that the TOML types cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.merge.appetite < 1 {
            return Err(ConfigError::InvalidValue {
                field: "merge.appetite".into(),
                detail: "appetite must be >= 1".into(),
            });
        }
        if self.display.theme.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "display.theme".into(),
                detail: "theme must not be empty".into(),
            });
        }

        Ok(())
    }

    /// Convenience: load and validate in one call.
    pub fn load_and_validate<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Initial interactive state for a merge run.
    pub fn session_state(&self) -> SessionState {
        SessionState {
            appetite: self.merge.appetite,
            cleanup: self.display.cleanup_mode,
            display: self.display.mode,
            sticky: self.merge.default_resolution,
        }
    }
}
