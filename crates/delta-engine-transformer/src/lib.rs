//! delta-engine-transformer: connect delta representations bidirectionally.
//!
//! A [`Transformer`] sits between an *A* side and a *B* side. An edit that
//! enters from one side produces at most one delta for each side: the
//! forward translation, and a correction that goes back where the edit came
//! from. A [`Pipe`] chains transformers and runs fragments back and forth
//! until every stage is idle.

pub mod error;
pub mod fixed;
pub mod identity;
pub mod pipe;
pub mod query;

use delta_engine::Delta;

pub use error::TransformError;
pub use fixed::Fixed;
pub use identity::Identity;
pub use pipe::{Pipe, PipeConfig};
pub use query::Query;

/// The deltas a transformer emits for one input: `a` leaves on the A side,
/// `b` on the B side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformResult {
    pub a: Option<Delta>,
    pub b: Option<Delta>,
}

impl TransformResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn to_a(delta: Delta) -> Self {
        Self {
            a: Some(delta),
            b: None,
        }
    }

    pub fn to_b(delta: Delta) -> Self {
        Self {
            a: None,
            b: Some(delta),
        }
    }
}

pub trait Transformer {
    /// Handle an edit arriving from the A side.
    fn apply_a(&mut self, delta: Delta) -> Result<TransformResult, TransformError>;

    /// Handle an edit arriving from the B side.
    fn apply_b(&mut self, delta: Delta) -> Result<TransformResult, TransformError>;
}
