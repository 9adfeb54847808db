//! The reconciliation engine.
//!
//! The conflict subsystem is responsible for:
//! 1. **Walking** -- stepping through both edit scripts and merging lines
//!    that only one side touched ([`merger`]).
//! 2. **Detection** -- bounding a conflicting region on each side
//!    ([`detector`]).
//! 3. **Resolution** -- interpreting operator commands until the conflict is
//!    closed ([`resolver`], [`command`]), against state that persists across
//!    conflicts ([`session`]).

pub mod command;
pub mod detector;
pub mod merger;
pub mod resolver;
pub mod session;

pub use command::Command;
pub use detector::{ChunkDetector, ChunkSource, ConflictChunks, ConflictSite};
pub use merger::{outcome, MergeInputs, MergeOutcome, MergeSession, Outcome};
pub use resolver::{Action, ConflictResolver, Resolution};
pub use session::{CleanupMode, DisplayMode, SessionState, Side, DEFAULT_APPETITE};
