//! hookrev-core: the review engine behind the `hookrev` pre-commit gate.
//!
//! Splits staged changes into review units, asks a local model for findings,
//! runs follow-up conversations about individual findings, and funnels every
//! worker result through one event channel into a single-owner
//! [`ReviewSession`]. Nothing here touches the terminal or git directly; both
//! arrive through the [`StagedSource`] and [`ModelBackend`] traits.

pub mod config;
pub mod error;
pub mod event;
pub mod gate;
pub mod inference;
pub mod ollama;
pub mod prompt;
pub mod session;
pub mod splitter;
pub mod types;
pub mod worker;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Error, InferenceError, Result, SourceError};
pub use event::{EventQueue, EventSender, ReviewEvent};
pub use gate::{decide, CommitDecision};
pub use inference::{InferenceClient, ModelBackend};
pub use ollama::OllamaBackend;
pub use session::{Applied, LoopState, Rejected, ReviewPhase, ReviewSession, Tick};
pub use splitter::{split_units, StagedSource};
pub use types::{
    ConversationTurn, Finding, FindingId, RawFinding, ReviewMode, ReviewUnit, Role, Severity,
    UnitKind,
};
pub use worker::{review_batch, BatchOutcome};
