//! Edit scripts between the base sequence and one edited sequence.
//!
//! An edit script is an ordered list of [`Opcode`]s whose destination ranges
//! are contiguous and cover the edited sequence exactly once. Scripts are
//! computed with the `similar` crate (Myers diff) and consumed through an
//! [`OpcodeCursor`].

pub mod cursor;

pub use cursor::OpcodeCursor;

use std::fmt;
use std::ops::Range;

use similar::{capture_diff_slices, Algorithm, DiffTag};

/// What an opcode does to its base range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Equal,
    Insert,
    Delete,
    Replace,
}

impl From<DiffTag> for OpKind {
    fn from(tag: DiffTag) -> Self {
        match tag {
            DiffTag::Equal => Self::Equal,
            DiffTag::Insert => Self::Insert,
            DiffTag::Delete => Self::Delete,
            DiffTag::Replace => Self::Replace,
        }
    }
}

/// One edit-script entry: half-open ranges into the base (`src`) and the
/// edited (`dst`) sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub kind: OpKind,
    pub src_start: usize,
    pub src_end: usize,
    pub dst_start: usize,
    pub dst_end: usize,
}

impl Opcode {
    pub fn new(kind: OpKind, src: Range<usize>, dst: Range<usize>) -> Self {
        Self {
            kind,
            src_start: src.start,
            src_end: src.end,
            dst_start: dst.start,
            dst_end: dst.end,
        }
    }

    /// The base lines accounted for by the edited line at `dst_index`.
    ///
    /// Equal lines map onto exactly one base line, replacement lines onto the
    /// whole replaced range, and inserted lines onto the empty range at their
    /// insertion point.
    pub fn base_span(&self, dst_index: usize) -> Range<usize> {
        match self.kind {
            OpKind::Equal => {
                let line = self.src_start + (dst_index - self.dst_start);
                line..line + 1
            }
            OpKind::Insert => self.src_start..self.src_start,
            OpKind::Delete | OpKind::Replace => self.src_start..self.src_end,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OpKind::Equal => write!(
                f,
                "E X[{}:{}] == Y[{}:{}]",
                self.src_start, self.src_end, self.dst_start, self.dst_end
            ),
            OpKind::Insert => write!(
                f,
                "I X[{}] <-- Y[{}:{}]",
                self.src_start, self.dst_start, self.dst_end
            ),
            OpKind::Replace => write!(
                f,
                "R X[{}:{}] <== Y[{}:{}]",
                self.src_start, self.src_end, self.dst_start, self.dst_end
            ),
            OpKind::Delete => write!(f, "D X[{}:{}] XXX", self.src_start, self.src_end),
        }
    }
}

/// Compute the edit script turning `base` into `edited`.
pub fn edit_script(base: &[String], edited: &[String]) -> Vec<Opcode> {
    capture_diff_slices(Algorithm::Myers, base, edited)
        .iter()
        .map(|op| {
            let (tag, src, dst) = op.as_tag_tuple();
            Opcode::new(tag.into(), src, dst)
        })
        .collect()
}
