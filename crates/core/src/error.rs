//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Every failure
/// path that carries one of these must leave the emitting component in a
/// well-defined, previously-valid state, never a half-applied change set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A user-fixable precondition failed. Non-fatal; local state is retained.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated (illegal state transition, missing state).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// The remote store rejected a submitted change set, fully or partially.
    /// No part of the change set has been applied locally.
    #[error("save failed: {0}")]
    SaveFailed(String),

    /// A denormalized reference copy could not be resolved. Non-blocking:
    /// the foreign key itself stays set and saving is not gated on this.
    #[error("reference resolution failed: {0}")]
    ReferenceResolution(String),

    /// Infrastructure failure reported by the backing store.
    #[error("store failure: {0}")]
    Store(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn save_failed(msg: impl Into<String>) -> Self {
        Self::SaveFailed(msg.into())
    }

    pub fn reference_resolution(msg: impl Into<String>) -> Self {
        Self::ReferenceResolution(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}
