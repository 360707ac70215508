//! Error taxonomy for the delta engine.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeltaError {
    /// Content or an attribute value was rejected by the builder's schema.
    /// The delta under construction is left unchanged.
    #[error("schema violation: {0}")]
    SchemaViolation(String),
    /// The operands cannot derive from a common parent state, for example a
    /// change that deletes past the end of the state it is applied to.
    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),
    /// An operation pairing that the compose/rebase tables do not cover.
    /// Always an engine bug.
    #[error("unhandled operation variant: {0}")]
    UnhandledVariant(String),
    /// The JSON projection of a delta is malformed.
    #[error("invalid delta json: {0}")]
    Decode(String),
}

impl DeltaError {
    pub(crate) fn mismatch(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::debug!(%reason, "structural mismatch");
        DeltaError::StructuralMismatch(reason)
    }

    pub(crate) fn unhandled(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::debug!(%reason, "unhandled operation variant");
        DeltaError::UnhandledVariant(reason)
    }

    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        DeltaError::Decode(reason.into())
    }
}
