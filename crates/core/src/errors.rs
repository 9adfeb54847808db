//! Error types for the trimerge core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.
//!
//! Conflicts left marked for attention are not errors: they are reported
//! through [`MergeOutcome::needs_attention`](crate::conflict::MergeOutcome).

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

/// Errors loading the base, local, or other file.
#[derive(Debug, Error)]
pub enum InputError {
    /// The file does not exist.
    #[error("input file not found: {path}")]
    NotFound { path: String },

    /// The file exists but could not be read as text.
    #[error("failed to read input file '{path}': {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Interactive session errors
// ---------------------------------------------------------------------------

/// Errors from the interactive side of a merge session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The command source reached end of input while a conflict was open.
    #[error("command source closed while a conflict was awaiting resolution")]
    CommandSourceClosed,

    /// Reading from the command source failed.
    #[error("failed to read command: {0}")]
    CommandSourceFailed(#[source] std::io::Error),

    /// Writing to the display sink failed.
    #[error("failed to write to display: {0}")]
    Sink(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

/// Errors writing the merged result.
#[derive(Debug, Error)]
#[error("failed to write merged output to '{path}': {source}")]
pub struct OutputError {
    pub path: String,
    #[source]
    pub source: std::io::Error,
}
