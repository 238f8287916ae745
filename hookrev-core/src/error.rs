//! Error taxonomy for hookrev-core.
//!
//! Inference failures are split into transport and malformed-response cases
//! because callers treat them identically (per-unit isolation, chat
//! placeholders) but logs and the `check` command need to tell them apart.
//! "Nothing staged" is deliberately absent: it is a success outcome.

use thiserror::Error;

/// Result alias for hookrev-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure talking to the model or interpreting what it returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// The inference service is unreachable or answered with a non-2xx status.
    #[error("inference transport error: {0}")]
    Transport(String),

    /// The body could not be read as the expected structured or text shape.
    #[error("malformed inference response: {0}")]
    MalformedResponse(String),
}

/// A git collaborator call failed unexpectedly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("git: {0}")]
pub struct SourceError(pub String);

impl SourceError {
    /// Wraps any displayable error.
    pub fn new(msg: impl std::fmt::Display) -> Self {
        Self(msg.to_string())
    }
}

/// Top-level error for the review engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Listing staged files or reading staged content failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Every inference attempt of a non-interactive run failed.
    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A background task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(String),
}
