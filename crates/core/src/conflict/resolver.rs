//! Conflict resolution.
//!
//! The [`ConflictResolver`] owns the interactive [`SessionState`] and the
//! command source. For each conflict it loops: render, read a command,
//! interpret it. Non-terminal commands adjust the session and loop again;
//! a resolution command ends the loop.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::command::Command;
use super::detector::{ConflictChunks, ConflictSite};
use super::session::{SessionState, Side};
use crate::errors::{ConfigError, SessionError};
use crate::render::Screen;
use crate::source::CommandSource;

/// Marker opening a conflict left for attention.
pub const MARKER_LOCAL: &str = "<<<<<<< LOCAL\n";
/// Marker separating the two sides of a marked conflict.
pub const MARKER_SEPARATOR: &str = "=======\n";
/// Marker closing a conflict left for attention.
pub const MARKER_OTHER: &str = ">>>>>>> OTHER\n";

// ---------------------------------------------------------------------------
// Resolutions
// ---------------------------------------------------------------------------

/// How a conflict is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Resolution {
    /// Keep one side's chunk.
    Take(Side),
    /// Keep both chunks, `first` before the other.
    Both { first: Side },
    /// Keep both chunks inside conflict markers and flag the result.
    Mark,
}

impl Resolution {
    /// Append the resolved lines to `out`. Returns `true` when the conflict
    /// was marked for attention rather than decided.
    pub fn apply(&self, chunks: &ConflictChunks<'_>, out: &mut Vec<String>) -> bool {
        match self {
            Self::Take(Side::Local) => out.extend_from_slice(chunks.local),
            Self::Take(Side::Other) => out.extend_from_slice(chunks.other),
            Self::Both { first: Side::Local } => {
                push_joined(out, chunks.local);
                out.extend_from_slice(chunks.other);
            }
            Self::Both { first: Side::Other } => {
                push_joined(out, chunks.other);
                out.extend_from_slice(chunks.local);
            }
            Self::Mark => {
                out.push(MARKER_LOCAL.to_string());
                push_joined(out, chunks.local);
                out.push(MARKER_SEPARATOR.to_string());
                push_joined(out, chunks.other);
                out.push(MARKER_OTHER.to_string());
                return true;
            }
        }
        false
    }

    /// Which chunks end up in the output.
    pub fn keeps(&self, side: Side) -> bool {
        match self {
            Self::Take(taken) => *taken == side,
            Self::Both { .. } | Self::Mark => true,
        }
    }
}

/// Append `chunk`, terminating its last line if something follows it.
fn push_joined(out: &mut Vec<String>, chunk: &[String]) {
    out.extend_from_slice(chunk);
    if let Some(last) = out.last_mut() {
        if !chunk.is_empty() && !last.ends_with('\n') {
            last.push('\n');
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Take(side) => write!(f, "{side}"),
            Self::Both { first: Side::Local } => write!(f, "both-local-first"),
            Self::Both { first: Side::Other } => write!(f, "both-other-first"),
            Self::Mark => write!(f, "mark"),
        }
    }
}

impl FromStr for Resolution {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Take(Side::Local)),
            "other" => Ok(Self::Take(Side::Other)),
            "both-local-first" => Ok(Self::Both { first: Side::Local }),
            "both-other-first" => Ok(Self::Both { first: Side::Other }),
            "mark" => Ok(Self::Mark),
            other => Err(ConfigError::InvalidValue {
                field: "merge.default_resolution".into(),
                detail: format!(
                    "unknown resolution '{other}' (expected local, other, both-local-first, both-other-first or mark)"
                ),
            }),
        }
    }
}

impl TryFrom<String> for Resolution {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(resolution: Resolution) -> Self {
        resolution.to_string()
    }
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// What the resolution loop does after interpreting one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Close the conflict.
    Resolve(Resolution),
    /// Extract the chunks again (appetite changed), then redisplay.
    Redetect,
    /// Redisplay with the new display settings.
    Redisplay,
    PrintMerged,
    Help,
}

/// Drives the per-conflict command loop and owns the session state.
pub struct ConflictResolver<S> {
    state: SessionState,
    source: S,
}

impl<S: CommandSource> ConflictResolver<S> {
    pub fn new(state: SessionState, source: S) -> Self {
        Self { state, source }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Apply one command to the session state.
    pub fn interpret(&mut self, command: Command) -> Action {
        let state = &mut self.state;
        match command {
            Command::Resolve { resolution, always } => {
                if always {
                    info!(%resolution, "resolution will apply to all later conflicts");
                    state.sticky = Some(resolution);
                }
                Action::Resolve(resolution)
            }
            Command::SetAppetite(value) => {
                state.appetite = value;
                debug!(appetite = state.appetite, "appetite set");
                Action::Redetect
            }
            Command::AdjustAppetite(delta) => {
                state.appetite = state.appetite.saturating_add(delta);
                debug!(appetite = state.appetite, "appetite adjusted");
                Action::Redetect
            }
            Command::Cleanup(mode) => {
                state.cleanup = mode;
                Action::Redisplay
            }
            Command::Display(mode) => {
                state.display = mode;
                Action::Redisplay
            }
            Command::PrintMerged => Action::PrintMerged,
            Command::Help => Action::Help,
        }
    }

    /// Run the command loop for one conflict until it is resolved.
    ///
    /// `merged` is the agreed section flushed just before the conflict, for
    /// the reprint command. Returns the resolution together with the chunks
    /// it applies to.
    pub fn resolve<'a, W: std::io::Write>(
        &mut self,
        site: &ConflictSite<'a>,
        merged: &[String],
        screen: &mut Screen<W>,
    ) -> Result<(Resolution, ConflictChunks<'a>), SessionError> {
        let mut chunks = site.chunks(self.state.appetite);

        if let Some(resolution) = self.state.sticky {
            debug!(%resolution, "applying sticky resolution");
            screen.show_sticky(&chunks, resolution)?;
            return Ok((resolution, chunks));
        }

        loop {
            screen.show_conflict(&chunks, &self.state)?;
            let input = screen.read_command(&mut self.source)?;
            match self.interpret(Command::parse(&input)) {
                Action::Resolve(resolution) => return Ok((resolution, chunks)),
                Action::Redetect => chunks = site.chunks(self.state.appetite),
                Action::Redisplay => {}
                Action::PrintMerged => screen.show_lines(merged)?,
                Action::Help => screen.show_help()?,
            }
        }
    }

    pub fn into_parts(self) -> (SessionState, S) {
        (self.state, self.source)
    }
}
