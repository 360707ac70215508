//! Read-only stage.

use delta_engine::{apply, invert, Delta};

use crate::{TransformError, TransformResult, Transformer};

/// Forwards A edits and refuses B edits. A B edit is answered with the
/// change that undoes it, sent back out of the B side, so the B side returns
/// to the state the A side dictates.
#[derive(Debug, Clone, Default)]
pub struct Fixed {
    view: Delta,
}

impl Fixed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the shared state `state`.
    pub fn over(state: Delta) -> Self {
        Self { view: state }
    }

    pub fn view(&self) -> &Delta {
        &self.view
    }
}

impl Transformer for Fixed {
    fn apply_a(&mut self, delta: Delta) -> Result<TransformResult, TransformError> {
        self.view = apply(&self.view, &delta)?;
        Ok(TransformResult::to_b(delta))
    }

    fn apply_b(&mut self, delta: Delta) -> Result<TransformResult, TransformError> {
        let correction = invert(&delta, &self.view)?;
        tracing::trace!(ops = delta.children().len(), "Reverting read-only edit");
        Ok(TransformResult::to_b(correction))
    }
}
