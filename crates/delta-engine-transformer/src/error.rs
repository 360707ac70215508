//! Pipeline errors.

use delta_engine::DeltaError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    /// A stage or the fragment accumulation failed in the engine.
    #[error(transparent)]
    Delta(#[from] DeltaError),
    /// Stages kept handing fragments to each other past the round limit.
    #[error("pipe did not settle within {rounds} rounds")]
    Diverged { rounds: usize },
}
