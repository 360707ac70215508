//! Positional cursor over a list of sequence operations.
//!
//! Compose, rebase and slice walk two op lists in lockstep, taking at most
//! `n` units at a time. The cursor hands out sliced copies of the current op
//! and remembers how far into it it has advanced.

use crate::ops::SeqOp;

pub(crate) struct OpCursor<'a> {
    ops: &'a [SeqOp],
    index: usize,
    offset: usize,
}

impl<'a> OpCursor<'a> {
    pub fn new(ops: &'a [SeqOp]) -> Self {
        Self {
            ops,
            index: 0,
            offset: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.index < self.ops.len()
    }

    pub fn peek(&self) -> Option<&'a SeqOp> {
        self.ops.get(self.index)
    }

    pub fn peek_is_insert(&self) -> bool {
        self.peek().is_some_and(SeqOp::is_insert)
    }

    pub fn peek_is_delete(&self) -> bool {
        self.peek().is_some_and(SeqOp::is_delete)
    }

    /// Units left in the current op; unbounded once exhausted, matching the
    /// implicit trailing retain of every change.
    pub fn peek_len(&self) -> usize {
        match self.peek() {
            Some(op) => op.span() - self.offset,
            None => usize::MAX,
        }
    }

    /// Take up to `max` units of the current op.
    pub fn next(&mut self, max: usize) -> Option<SeqOp> {
        let op = self.ops.get(self.index)?;
        let remaining = op.span() - self.offset;
        let take = remaining.min(max);
        let out = if self.offset == 0 && take == remaining {
            op.clone()
        } else {
            op.slice(self.offset, take)
        };
        if take == remaining {
            self.index += 1;
            self.offset = 0;
        } else {
            self.offset += take;
        }
        Some(out)
    }

    /// Everything not consumed yet, the current op sliced to its remainder.
    pub fn rest(&mut self) -> Vec<SeqOp> {
        let mut out = Vec::with_capacity(self.ops.len().saturating_sub(self.index));
        while let Some(op) = self.next(usize::MAX) {
            out.push(op);
        }
        out
    }
}
