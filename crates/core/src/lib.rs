//! trimerge core library.
//!
//! This crate provides the reconciliation engine for interactive three-way
//! line merges: edit scripts and their cursors, the merge walker, conflict
//! detection and resolution, conflict rendering, command sources, and
//! configuration.

pub mod config;
pub mod conflict;
pub mod errors;
pub mod lines;
pub mod render;
pub mod script;
pub mod source;

// Re-exports for convenience.
pub use config::MergeConfig;
pub use conflict::{MergeInputs, MergeOutcome, MergeSession, Resolution, SessionState, Side};
pub use errors::CoreError;
pub use render::{ConflictRenderer, Highlighter, Screen};
pub use source::{CommandSource, ReaderSource, ScriptedSource};
