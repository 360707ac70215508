//! Pass-through stage.

use delta_engine::Delta;

use crate::{TransformError, TransformResult, Transformer};

/// Forwards every edit unchanged to the opposite side.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transformer for Identity {
    fn apply_a(&mut self, delta: Delta) -> Result<TransformResult, TransformError> {
        Ok(TransformResult::to_b(delta))
    }

    fn apply_b(&mut self, delta: Delta) -> Result<TransformResult, TransformError> {
        Ok(TransformResult::to_a(delta))
    }
}
