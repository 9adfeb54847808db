//! Forward-only read cursor over an edit script.

use super::{OpKind, Opcode};

/// A position in an immutable opcode list that only ever moves forward.
///
/// Each side of a merge owns its own cursor; cloning a cursor gives an
/// independent lookahead that leaves the original untouched.
#[derive(Debug, Clone)]
pub struct OpcodeCursor<'a> {
    ops: &'a [Opcode],
    pos: usize,
}

impl<'a> OpcodeCursor<'a> {
    pub fn new(ops: &'a [Opcode]) -> Self {
        Self { ops, pos: 0 }
    }

    /// Kind of the opcode covering destination line `index`.
    pub fn advance(&mut self, index: usize) -> OpKind {
        self.seek(index).kind
    }

    /// Drop opcodes whose destination range ends at or before `index` and
    /// return the opcode now covering it.
    ///
    /// # Panics
    ///
    /// Panics if `index` lies past the end of the script or before the
    /// current head. Either means the caller walked its sequence out of step
    /// with the script describing it.
    pub fn seek(&mut self, index: usize) -> &'a Opcode {
        while let Some(op) = self.ops.get(self.pos) {
            if op.dst_end > index {
                assert!(
                    op.dst_start <= index,
                    "opcode cursor queried at line {index}, behind its head at {}",
                    op.dst_start
                );
                return op;
            }
            self.pos += 1;
        }
        panic!(
            "opcode cursor queried at line {index} past the end of its edit script ({} opcodes)",
            self.ops.len()
        );
    }

    /// Index of the current head within the opcode list.
    pub fn position(&self) -> usize {
        self.pos
    }
}
