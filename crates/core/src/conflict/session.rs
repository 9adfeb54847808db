//! Interactive session state shared across the conflicts of one merge run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::resolver::Resolution;
use crate::errors::ConfigError;

/// Lookahead tolerance used when no other value is configured.
pub const DEFAULT_APPETITE: i32 = 5;

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// One of the two edited versions being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Local,
    Other,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Other => write!(f, "other"),
        }
    }
}

// ---------------------------------------------------------------------------
// Display settings
// ---------------------------------------------------------------------------

/// Post-processing applied to the character diff of a conflict.
///
/// Only affects how a conflict is displayed, never the merge result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupMode {
    /// Fold short equalities into edits when that makes fewer operations.
    Efficiency,
    /// Only normalise: coalesce and reorder adjacent edits.
    Merge,
    /// Fold equalities that are smaller than the edits around them.
    #[default]
    Semantic,
    /// Slide edits onto word and line boundaries without changing them.
    SemanticLossless,
}

impl fmt::Display for CleanupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Efficiency => write!(f, "efficiency"),
            Self::Merge => write!(f, "merge"),
            Self::Semantic => write!(f, "semantic"),
            Self::SemanticLossless => write!(f, "semantic-lossless"),
        }
    }
}

impl FromStr for CleanupMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "efficiency" => Ok(Self::Efficiency),
            "merge" => Ok(Self::Merge),
            "semantic" => Ok(Self::Semantic),
            "semantic-lossless" => Ok(Self::SemanticLossless),
            other => Err(ConfigError::InvalidValue {
                field: "cleanup_mode".into(),
                detail: format!(
                    "unknown cleanup mode '{other}' (expected efficiency, merge, semantic or semantic-lossless)"
                ),
            }),
        }
    }
}

/// How a conflict is shown to the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Character diff between the two chunks.
    #[default]
    Pretty,
    /// The local chunk alone, syntax highlighted.
    Local,
    /// The other chunk alone, syntax highlighted.
    Other,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Local => write!(f, "local"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl FromStr for DisplayMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Self::Pretty),
            "local" => Ok(Self::Local),
            "other" => Ok(Self::Other),
            other => Err(ConfigError::InvalidValue {
                field: "display.mode".into(),
                detail: format!("unknown display mode '{other}' (expected pretty, local or other)"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Mutable operator settings that persist from one conflict to the next.
///
/// Only resolution commands change it; the walker reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Consecutive agreeing lines tolerated inside one conflict. May drop to
    /// zero or below through interactive adjustment.
    pub appetite: i32,
    pub cleanup: CleanupMode,
    pub display: DisplayMode,
    /// Resolution applied to every further conflict without prompting.
    pub sticky: Option<Resolution>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            appetite: DEFAULT_APPETITE,
            cleanup: CleanupMode::default(),
            display: DisplayMode::default(),
            sticky: None,
        }
    }
}
