//! Conflict chunk detection.
//!
//! Once the walker finds a position it cannot merge, each side is scanned
//! forward on its own to find where the conflicting region ends. Equal lines
//! are tolerated inside a region for up to `appetite` lookahead steps, so
//! that nearby edits separated by a few unchanged lines stay in one conflict.

use tracing::debug;

use crate::script::{OpKind, OpcodeCursor};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where one side of a conflict starts: its lines, its edit script cursor,
/// and the index of the first conflicting line.
#[derive(Debug, Clone)]
pub struct ChunkSource<'a> {
    pub cursor: OpcodeCursor<'a>,
    pub lines: &'a [String],
    pub start: usize,
}

impl<'a> ChunkSource<'a> {
    /// Extract this side's chunk for the given appetite.
    pub fn chunk(&self, appetite: i32) -> &'a [String] {
        ChunkDetector::extract(self.cursor.clone(), self.lines, self.start, appetite)
    }

    /// Base position just past the last line of a chunk of length `len`
    /// starting here, or `fallback` when the chunk is empty.
    pub fn base_end(&self, len: usize, fallback: usize) -> usize {
        if len == 0 {
            return fallback;
        }
        let last = self.start + len - 1;
        self.cursor.clone().seek(last).base_span(last).end
    }
}

/// Both starting points of one conflict.
#[derive(Debug, Clone)]
pub struct ConflictSite<'a> {
    pub local: ChunkSource<'a>,
    pub other: ChunkSource<'a>,
}

impl<'a> ConflictSite<'a> {
    /// Extract a fresh chunk pair. Always starts again from the original
    /// start indices, so re-running with a new appetite is not incremental.
    pub fn chunks(&self, appetite: i32) -> ConflictChunks<'a> {
        let chunks = ConflictChunks {
            local: self.local.chunk(appetite),
            other: self.other.chunk(appetite),
        };
        debug!(
            appetite,
            local_start = self.local.start,
            other_start = self.other.start,
            local_len = chunks.local.len(),
            other_len = chunks.other.len(),
            "conflict chunks detected"
        );
        chunks
    }
}

/// The two candidate chunks of one conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictChunks<'a> {
    pub local: &'a [String],
    pub other: &'a [String],
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Stateless chunk detector.
pub struct ChunkDetector;

impl ChunkDetector {
    /// Scan `lines` from `start` and return the conflicting chunk.
    ///
    /// Non-equal lines are always taken and reset the countdown to
    /// `appetite`. Each equal line decrements it and is taken only while it
    /// stays positive. The result is trimmed back to its last non-equal line,
    /// so it never ends on lookahead filler. An appetite of zero or below
    /// stops at the first equal line.
    pub fn extract<'a>(
        mut cursor: OpcodeCursor<'_>,
        lines: &'a [String],
        start: usize,
        appetite: i32,
    ) -> &'a [String] {
        let mut countdown = appetite;
        let mut end = start;

        for index in start..lines.len() {
            if cursor.advance(index) == OpKind::Equal {
                countdown -= 1;
                if countdown <= 0 {
                    break;
                }
            } else {
                end = index + 1;
                countdown = appetite;
            }
        }

        &lines[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::split_lines;
    use crate::script::edit_script;

    fn chunk(base: &str, edited: &str, start: usize, appetite: i32) -> Vec<String> {
        let base = split_lines(base);
        let edited = split_lines(edited);
        let ops = edit_script(&base, &edited);
        ChunkDetector::extract(OpcodeCursor::new(&ops), &edited, start, appetite).to_vec()
    }

    const BASE: &str = "a\n1\n2\nb\n3\n4\n5\n6\n7\nc\n";
    const EDITED: &str = "A\n1\n2\nB\n3\n4\n5\n6\n7\nC\n";

    #[test]
    fn test_single_line_conflict() {
        assert_eq!(chunk("a\n", "x\n", 0, 5), vec!["x\n"]);
    }

    #[test]
    fn test_appetite_bridges_nearby_edits() {
        // Two equal lines between A and B need an appetite of at least 3.
        assert_eq!(chunk(BASE, EDITED, 0, 3), vec!["A\n", "1\n", "2\n", "B\n"]);
        assert_eq!(chunk(BASE, EDITED, 0, 2), vec!["A\n"]);
    }

    #[test]
    fn test_trailing_filler_is_trimmed() {
        let result = chunk(BASE, EDITED, 0, 5);
        assert_eq!(result.last().map(String::as_str), Some("B\n"));
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_appetite_zero_or_negative_terminates() {
        assert_eq!(chunk(BASE, EDITED, 0, 0), vec!["A\n"]);
        assert_eq!(chunk(BASE, EDITED, 0, -3), vec!["A\n"]);
    }

    #[test]
    fn test_appetite_monotonic() {
        let mut previous = 0;
        for appetite in -1..12 {
            let len = chunk(BASE, EDITED, 0, appetite).len();
            assert!(len >= previous, "appetite {appetite} shrank the chunk");
            previous = len;
        }
        assert_eq!(previous, 10);
    }

    #[test]
    fn test_start_at_end_yields_empty_chunk() {
        assert!(chunk("a\n", "a\n", 1, 5).is_empty());
    }

    #[test]
    fn test_base_end() {
        let base = split_lines(BASE);
        let edited = split_lines(EDITED);
        let ops = edit_script(&base, &edited);
        let source = ChunkSource {
            cursor: OpcodeCursor::new(&ops),
            lines: &edited,
            start: 0,
        };
        assert_eq!(source.base_end(4, 0), 4);
        assert_eq!(source.base_end(2, 0), 2);
        assert_eq!(source.base_end(0, 7), 7);
    }
}
