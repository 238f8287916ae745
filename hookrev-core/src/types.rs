//! Owned data types shared by the workers and the consumer loop.
//!
//! Everything here is `Send` and free of borrowed lifetimes so values can be
//! moved from a worker task into an event and stored by the session as-is.

use std::fmt;

use uuid::Uuid;

/// Display name of the single unit produced in diff mode.
pub const DIFF_UNIT_IDENTIFIER: &str = "Staged Diff";

/// Shown instead of a context window when none can be extracted.
pub const CONTEXT_UNAVAILABLE: &str = "Could not extract code context.";

/// Used when the model omits a finding's message.
pub const MISSING_MESSAGE: &str = "No message provided by AI.";

/// How staged work is split into review units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewMode {
    /// One unit holding the whole staged diff (`git diff --cached`).
    #[default]
    Diff,
    /// One unit per staged file holding its full index content.
    FullFile,
}

impl ReviewMode {
    /// Returns the other mode; bound to the mode toggle key.
    pub fn toggled(self) -> Self {
        match self {
            ReviewMode::Diff => ReviewMode::FullFile,
            ReviewMode::FullFile => ReviewMode::Diff,
        }
    }

    /// Short label for the status bar.
    pub fn label(self) -> &'static str {
        match self {
            ReviewMode::Diff => "diff",
            ReviewMode::FullFile => "full files",
        }
    }
}

/// What a review unit's content is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Unified diff text.
    Diff,
    /// Complete file content from the index.
    FullFile,
}

/// One independently analyzable chunk of staged content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewUnit {
    /// Display name: a filename, or [`DIFF_UNIT_IDENTIFIER`].
    pub identifier: String,
    pub content: String,
    pub kind: UnitKind,
}

impl ReviewUnit {
    pub fn diff(content: impl Into<String>) -> Self {
        Self {
            identifier: DIFF_UNIT_IDENTIFIER.to_owned(),
            content: content.into(),
            kind: UnitKind::Diff,
        }
    }

    pub fn full_file(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self { identifier: filename.into(), content: content.into(), kind: UnitKind::FullFile }
    }
}

/// How serious a finding is. Anything the model reports that is not
/// critical is treated as a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    Critical,
    #[default]
    Suggestion,
}

impl Severity {
    /// Case-insensitive parse; unknown labels fall back to `Suggestion`.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("critical") {
            Severity::Critical
        } else {
            Severity::Suggestion
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => f.write_str("CRITICAL"),
            Severity::Suggestion => f.write_str("SUGGESTION"),
        }
    }
}

/// A finding exactly as parsed from the model, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFinding {
    pub severity: Severity,
    /// 1-based and best-effort; the model's numbering may be off.
    pub line_number: Option<u32>,
    pub message: String,
}

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, text: text.into() }
    }
}

/// Stable handle used to bind a finding to UI rows and chat replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FindingId(Uuid);

impl FindingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FindingId {
    fn default() -> Self {
        Self::new()
    }
}

/// One issue reported for a review unit, with its discussion thread.
///
/// Only the session mutates a surfaced finding (conversation appends); workers
/// build it once and hand it over inside `ReviewEvent::Complete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub id: FindingId,
    pub severity: Severity,
    pub line_number: Option<u32>,
    /// Prefixed with `[identifier] ` unless it came from the sole diff unit.
    pub message: String,
    /// Identifier of the unit the finding was reported against.
    pub source: String,
    /// Window of source lines around `line_number`, or [`CONTEXT_UNAVAILABLE`].
    pub source_context: String,
    /// Never empty: seeded with the original message as an assistant turn.
    pub conversation: Vec<ConversationTurn>,
}
