//! The merge walker.
//!
//! Walks the local and other sequences in lockstep, each against its own
//! edit script from base. Lines that at most one side touched are merged
//! automatically; any other position opens a conflict that the
//! [`ConflictResolver`] closes before the walk resumes past it.
//!
//! Both sides are tracked by the base position of their current line.
//! A side whose current base line the other side has already passed is
//! treated as showing a deletion, which lets one-sided deletions and
//! trailing insertions survive the walk.

use std::cmp::Ordering;
use std::io::Write;
use std::path::Path;

use tracing::{debug, info, trace};

use super::detector::{ChunkSource, ConflictChunks, ConflictSite};
use super::resolver::{ConflictResolver, Resolution};
use super::session::{SessionState, Side};
use crate::errors::{InputError, OutputError, SessionError};
use crate::lines::read_lines;
use crate::render::Screen;
use crate::script::{edit_script, OpKind, Opcode, OpcodeCursor};
use crate::source::CommandSource;

// ---------------------------------------------------------------------------
// Inputs & outcome
// ---------------------------------------------------------------------------

/// The three sequences of one merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeInputs {
    pub base: Vec<String>,
    pub local: Vec<String>,
    pub other: Vec<String>,
}

impl MergeInputs {
    pub fn new(base: Vec<String>, local: Vec<String>, other: Vec<String>) -> Self {
        Self { base, local, other }
    }

    /// Read all three files. Fails on the first one that cannot be read.
    pub fn load(
        base: impl AsRef<Path>,
        local: impl AsRef<Path>,
        other: impl AsRef<Path>,
    ) -> Result<Self, InputError> {
        Ok(Self {
            base: read_lines(base)?,
            local: read_lines(local)?,
            other: read_lines(other)?,
        })
    }
}

/// Result of a completed merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub lines: Vec<String>,
    /// Set when at least one conflict was marked instead of decided.
    pub needs_attention: bool,
    /// Conflicts opened during the walk.
    pub conflicts: usize,
    /// Conflicts closed with markers.
    pub marked: usize,
}

impl MergeOutcome {
    pub fn text(&self) -> String {
        self.lines.concat()
    }

    /// Write the merged text to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), OutputError> {
        let path = path.as_ref();
        std::fs::write(path, self.text()).map_err(|source| OutputError {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), lines = self.lines.len(), "merged output written");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Outcome table
// ---------------------------------------------------------------------------

/// What the walker does with one pair of opcode kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Optionally emit the current line of one side, then move each index
    /// forward by the given amount.
    Advance {
        emit: Option<Side>,
        local: usize,
        other: usize,
    },
    Conflict,
}

/// Classify a pair of opcode kinds.
///
/// A deletion has no line of its own, so the deletion rows advance only the
/// side that still holds the deleted line.
pub fn outcome(local: OpKind, other: OpKind) -> Outcome {
    use OpKind::{Delete, Equal, Insert, Replace};

    let advance = |emit, local, other| Outcome::Advance { emit, local, other };
    match (local, other) {
        (Equal, Equal) => advance(Some(Side::Local), 1, 1),
        (Delete, Delete) => advance(None, 1, 1),
        (Delete, Equal) => advance(None, 0, 1),
        (Equal, Delete) => advance(None, 1, 0),
        (Replace, Equal) => advance(Some(Side::Local), 1, 1),
        (Equal, Replace) => advance(Some(Side::Other), 1, 1),
        (Insert, Equal) => advance(Some(Side::Local), 1, 0),
        (Equal, Insert) => advance(Some(Side::Other), 0, 1),
        _ => Outcome::Conflict,
    }
}

// ---------------------------------------------------------------------------
// Walker internals
// ---------------------------------------------------------------------------

/// A side's current line as seen from base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Probe {
    kind: OpKind,
    base_start: usize,
    base_end: usize,
    /// The line is the first one of its opcode.
    first: bool,
}

impl Probe {
    /// A consumed side stands at the end of base.
    fn exhausted(base_len: usize) -> Self {
        Self {
            kind: OpKind::Equal,
            base_start: base_len,
            base_end: base_len,
            first: true,
        }
    }
}

/// One side of the walk.
struct Track<'a> {
    cursor: OpcodeCursor<'a>,
    lines: &'a [String],
    index: usize,
}

impl<'a> Track<'a> {
    fn new(ops: &'a [Opcode], lines: &'a [String]) -> Self {
        Self {
            cursor: OpcodeCursor::new(ops),
            lines,
            index: 0,
        }
    }

    fn done(&self) -> bool {
        self.index >= self.lines.len()
    }

    fn probe(&mut self, base_len: usize) -> Probe {
        if self.done() {
            return Probe::exhausted(base_len);
        }
        let op = self.cursor.seek(self.index);
        let span = op.base_span(self.index);
        Probe {
            kind: op.kind,
            base_start: span.start,
            base_end: span.end,
            first: self.index == op.dst_start,
        }
    }

    fn line(&self) -> &'a String {
        &self.lines[self.index]
    }

    fn source(&self) -> ChunkSource<'a> {
        ChunkSource {
            cursor: self.cursor.clone(),
            lines: self.lines,
            start: self.index,
        }
    }
}

/// Effective opcode kinds of both sides once their base positions are
/// compared.
fn align(local: Probe, other: Probe) -> (OpKind, OpKind) {
    match (local.kind, other.kind) {
        (OpKind::Equal, OpKind::Equal) => match local.base_start.cmp(&other.base_start) {
            Ordering::Less => (OpKind::Equal, OpKind::Delete),
            Ordering::Greater => (OpKind::Delete, OpKind::Equal),
            Ordering::Equal => (OpKind::Equal, OpKind::Equal),
        },
        (_, OpKind::Equal) => align_edit(local, other),
        (OpKind::Equal, _) => {
            let (edit, unchanged) = align_edit(other, local);
            (unchanged, edit)
        }
        kinds => kinds,
    }
}

/// Kinds for an edited line facing an unchanged one, as `(edit, unchanged)`.
fn align_edit(edit: Probe, unchanged: Probe) -> (OpKind, OpKind) {
    if unchanged.base_start < edit.base_start {
        // The edited side already passed this base line.
        return (OpKind::Delete, OpKind::Equal);
    }
    if edit.kind == OpKind::Replace {
        if edit.first && unchanged.base_start > edit.base_start {
            // The unchanged side deleted base lines this side replaced.
            return (OpKind::Replace, OpKind::Delete);
        }
        if unchanged.base_start >= edit.base_end {
            // Continuation of a replacement longer than what it replaced.
            return (OpKind::Insert, OpKind::Equal);
        }
    }
    (edit.kind, OpKind::Equal)
}

/// The base region decided by the last resolved conflict.
///
/// Chunks of the two sides can end at different base positions. Until the
/// lagging side reaches `overruled`, its lines are dropped when the kept
/// chunks already account for them (below `covered`) and emitted otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Settlement {
    covered: usize,
    overruled: usize,
}

impl Settlement {
    fn after(
        site: &ConflictSite<'_>,
        chunks: &ConflictChunks<'_>,
        resolution: Resolution,
        local: Probe,
        other: Probe,
    ) -> Self {
        let local_end = site.local.base_end(chunks.local.len(), local.base_start);
        let other_end = site.other.base_end(chunks.other.len(), other.base_start);
        let covered = [(Side::Local, local_end), (Side::Other, other_end)]
            .into_iter()
            .filter(|(side, _)| resolution.keeps(*side))
            .map(|(_, end)| end)
            .max()
            .unwrap_or(0);
        Self {
            covered,
            overruled: local_end.max(other_end),
        }
    }

    fn settle(&self, local: Probe, other: Probe) -> Option<Outcome> {
        if local.base_start < self.overruled && other.base_start >= self.overruled {
            Some(self.catch_up(Side::Local, local))
        } else if other.base_start < self.overruled && local.base_start >= self.overruled {
            Some(self.catch_up(Side::Other, other))
        } else {
            None
        }
    }

    fn catch_up(&self, side: Side, probe: Probe) -> Outcome {
        let emit = (probe.base_start >= self.covered).then_some(side);
        match side {
            Side::Local => Outcome::Advance {
                emit,
                local: 1,
                other: 0,
            },
            Side::Other => Outcome::Advance {
                emit,
                local: 0,
                other: 1,
            },
        }
    }
}

fn explain(label: &str, ops: &[Opcode]) {
    for op in ops {
        trace!(script = label, "{op}");
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One interactive merge run: a resolver with its command source, and the
/// screen conflicts are shown on.
pub struct MergeSession<S, W> {
    resolver: ConflictResolver<S>,
    screen: Screen<W>,
}

impl<S: CommandSource, W: Write> MergeSession<S, W> {
    pub fn new(state: SessionState, source: S, screen: Screen<W>) -> Self {
        Self {
            resolver: ConflictResolver::new(state, source),
            screen,
        }
    }

    pub fn state(&self) -> &SessionState {
        self.resolver.state()
    }

    /// Walk both edit scripts and produce the merged sequence.
    ///
    /// Agreed lines collect in a merged section that is flushed to the
    /// screen and the result whenever a conflict opens and once at the end.
    pub fn run(&mut self, inputs: &MergeInputs) -> Result<MergeOutcome, SessionError> {
        let base_len = inputs.base.len();
        let local_ops = edit_script(&inputs.base, &inputs.local);
        let other_ops = edit_script(&inputs.base, &inputs.other);
        explain("local", &local_ops);
        explain("other", &other_ops);
        info!(
            base = base_len,
            local = inputs.local.len(),
            other = inputs.other.len(),
            "merge started"
        );

        let mut local = Track::new(&local_ops, &inputs.local);
        let mut other = Track::new(&other_ops, &inputs.other);
        let mut outcome = MergeOutcome::default();
        let mut merged: Vec<String> = Vec::new();
        let mut settlement = Settlement::default();

        while !(local.done() && other.done()) {
            let a = local.probe(base_len);
            let b = other.probe(base_len);

            let step = match settlement.settle(a, b) {
                Some(step) => step,
                None => {
                    let (ka, kb) = align(a, b);
                    outcome_traced(ka, kb, local.index, other.index)
                }
            };

            match step {
                Outcome::Advance {
                    emit,
                    local: da,
                    other: db,
                } => {
                    match emit {
                        Some(Side::Local) => merged.push(local.line().clone()),
                        Some(Side::Other) => merged.push(other.line().clone()),
                        None => {}
                    }
                    local.index += da;
                    other.index += db;
                }
                Outcome::Conflict => {
                    self.screen.show_lines(&merged)?;
                    let last_merged = std::mem::take(&mut merged);
                    outcome.lines.extend_from_slice(&last_merged);

                    let site = ConflictSite {
                        local: local.source(),
                        other: other.source(),
                    };
                    let (resolution, chunks) =
                        self.resolver.resolve(&site, &last_merged, &mut self.screen)?;

                    outcome.conflicts += 1;
                    if resolution.apply(&chunks, &mut outcome.lines) {
                        outcome.marked += 1;
                    }
                    info!(
                        local_start = local.index,
                        other_start = other.index,
                        local_len = chunks.local.len(),
                        other_len = chunks.other.len(),
                        %resolution,
                        "conflict resolved"
                    );

                    settlement = Settlement::after(&site, &chunks, resolution, a, b);
                    local.index += chunks.local.len();
                    other.index += chunks.other.len();
                }
            }
        }

        self.screen.show_lines(&merged)?;
        outcome.lines.append(&mut merged);
        outcome.needs_attention = outcome.marked > 0;
        info!(
            lines = outcome.lines.len(),
            conflicts = outcome.conflicts,
            marked = outcome.marked,
            "merge finished"
        );
        Ok(outcome)
    }

    pub fn into_parts(self) -> (SessionState, S, Screen<W>) {
        let (state, source) = self.resolver.into_parts();
        (state, source, self.screen)
    }
}

fn outcome_traced(local: OpKind, other: OpKind, ia: usize, ib: usize) -> Outcome {
    let step = outcome(local, other);
    trace!(ia, ib, ?local, ?other, ?step, "walk step");
    step
}
