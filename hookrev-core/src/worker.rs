//! Review and conversation workers.
//!
//! Workers never touch session state. They receive owned inputs at dispatch
//! time and report back exclusively through an [`EventSender`].

use std::sync::Arc;

use crate::error::{Error, InferenceError, Result};
use crate::event::{EventSender, ReviewEvent};
use crate::inference::{InferenceClient, FAILED_REPLY};
use crate::splitter::{split_units, StagedSource};
use crate::types::{
    ConversationTurn, Finding, FindingId, RawFinding, ReviewMode, ReviewUnit, UnitKind,
    CONTEXT_UNAVAILABLE,
};

/// Lines shown on each side of a finding's reported line.
const CONTEXT_RADIUS: usize = 2;

/// Extracts the lines around 1-based `line_number`: two before, the line
/// itself and two after, clamped to the content.
///
/// Best-effort by contract: the reported line may belong to a different
/// numbering (diff vs. file), and nothing here tries to reconcile that.
/// Returns [`CONTEXT_UNAVAILABLE`] when there is no line number or the window
/// falls entirely outside the content.
pub fn context_window(content: &str, line_number: Option<u32>) -> String {
    let Some(line) = line_number.map(|n| n as usize) else {
        return CONTEXT_UNAVAILABLE.to_owned();
    };
    let lines: Vec<&str> = content.split('\n').collect();
    let start = line.saturating_sub(CONTEXT_RADIUS + 1);
    let end = (line + CONTEXT_RADIUS).min(lines.len());
    if start >= end {
        return CONTEXT_UNAVAILABLE.to_owned();
    }
    lines[start..end].join("\n")
}

/// Turns a raw finding into a surfaced one: provenance, context window and a
/// conversation seeded with the model's original wording.
pub fn enrich(unit: &ReviewUnit, prefix_identifier: bool, raw: RawFinding) -> Finding {
    let message = if prefix_identifier {
        format!("[{}] {}", unit.identifier, raw.message)
    } else {
        raw.message.clone()
    };
    Finding {
        id: FindingId::new(),
        severity: raw.severity,
        line_number: raw.line_number,
        message,
        source: unit.identifier.clone(),
        source_context: context_window(&unit.content, raw.line_number),
        conversation: vec![ConversationTurn::assistant(raw.message)],
    }
}

/// Reviews one unit and enriches its findings. `total_units` decides whether
/// messages get the unit prefix (the sole diff unit needs none).
pub async fn review_unit(
    client: &InferenceClient,
    unit: &ReviewUnit,
    total_units: usize,
) -> std::result::Result<Vec<Finding>, InferenceError> {
    let raw = client.review(unit).await?;
    let prefix = !(unit.kind == UnitKind::Diff && total_units == 1);
    Ok(raw.into_iter().map(|r| enrich(unit, prefix, r)).collect())
}

/// Runs the splitter on the blocking pool; git calls must not stall the runtime.
async fn split_off_thread(
    source: Arc<dyn StagedSource>,
    mode: ReviewMode,
) -> Result<Vec<ReviewUnit>> {
    tokio::task::spawn_blocking(move || split_units(source.as_ref(), mode))
        .await
        .map_err(|e| Error::Worker(e.to_string()))?
        .map_err(Error::from)
}

/// The review pipeline for one run.
///
/// Units are reviewed strictly one after another to keep a single local
/// inference server from being flooded. A failing unit contributes no
/// findings and does not stop the run. Event order: `NoChanges` alone, or
/// `ReviewFailed` alone, or `UnitsReady`, then `Progress` per unit, then a
/// final `Complete`.
pub async fn run_review(
    source: Arc<dyn StagedSource>,
    client: InferenceClient,
    mode: ReviewMode,
    events: EventSender,
) {
    let units = match split_off_thread(source, mode).await {
        Ok(units) => units,
        Err(e) => {
            tracing::error!(error = %e, "collecting staged changes failed");
            events.send(ReviewEvent::ReviewFailed(e.to_string()));
            return;
        }
    };

    if units.is_empty() {
        tracing::info!("nothing staged");
        events.send(ReviewEvent::NoChanges);
        return;
    }

    let total = units.len();
    tracing::info!(total, mode = mode.label(), "review started");
    events.send(ReviewEvent::UnitsReady(units.clone()));

    let mut findings = Vec::new();
    for (index, unit) in units.iter().enumerate() {
        events.send(ReviewEvent::Progress {
            index,
            total,
            identifier: unit.identifier.clone(),
        });
        match review_unit(&client, unit, total).await {
            Ok(mut found) => {
                tracing::debug!(unit = %unit.identifier, count = found.len(), "unit reviewed");
                findings.append(&mut found);
            }
            Err(e) => {
                tracing::warn!(unit = %unit.identifier, error = %e, "unit review failed, skipping");
            }
        }
    }

    tracing::info!(findings = findings.len(), "review complete");
    events.send(ReviewEvent::Complete(findings));
}

/// Outcome of a review run without a UI attached.
#[derive(Debug)]
pub enum BatchOutcome {
    NoChanges,
    Reviewed { units: Vec<ReviewUnit>, findings: Vec<Finding> },
}

/// The same pipeline as [`run_review`], returned instead of streamed.
///
/// Used by the pre-commit hook before any UI exists. Here a model that
/// produced nothing usable for every unit is an error, since there is no
/// interactive session to fall back on.
pub async fn review_batch(
    source: Arc<dyn StagedSource>,
    client: &InferenceClient,
    mode: ReviewMode,
) -> Result<BatchOutcome> {
    let units = split_off_thread(source, mode).await?;
    if units.is_empty() {
        return Ok(BatchOutcome::NoChanges);
    }

    let total = units.len();
    let mut findings = Vec::new();
    let mut last_error = None;
    let mut failed = 0;
    for unit in &units {
        match review_unit(client, unit, total).await {
            Ok(mut found) => findings.append(&mut found),
            Err(e) => {
                tracing::warn!(unit = %unit.identifier, error = %e, "unit review failed");
                failed += 1;
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if failed == total => Err(e.into()),
        _ => Ok(BatchOutcome::Reviewed { units, findings }),
    }
}

/// Sends a placeholder reply if the chat worker ends without replying, so
/// the session's in-flight flag is cleared even if the task panics.
struct ReplyGuard {
    finding: FindingId,
    events: EventSender,
    replied: bool,
}

impl ReplyGuard {
    fn reply(mut self, text: String) {
        self.replied = true;
        self.events.send(ReviewEvent::ChatReply { finding: self.finding, text });
    }
}

impl Drop for ReplyGuard {
    fn drop(&mut self) {
        if !self.replied {
            self.events.send(ReviewEvent::ChatReply {
                finding: self.finding,
                text: FAILED_REPLY.to_owned(),
            });
        }
    }
}

/// One chat exchange. `conversation` is a snapshot that already ends with
/// the developer's new turn. Always emits exactly one `ChatReply`.
pub async fn run_chat(
    client: InferenceClient,
    finding: FindingId,
    context: String,
    conversation: Vec<ConversationTurn>,
    events: EventSender,
) {
    let guard = ReplyGuard { finding, events, replied: false };
    let text = match client.chat(&context, &conversation).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "chat turn failed");
            FAILED_REPLY.to_owned()
        }
    };
    guard.reply(text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, Severity};

    const FILE: &str = "l1\nl2\nl3\nl4\nl5\nl6\nl7";

    #[test]
    fn context_window_centres_on_line() {
        assert_eq!(context_window(FILE, Some(4)), "l2\nl3\nl4\nl5\nl6");
    }

    #[test]
    fn context_window_clamps_at_edges() {
        assert_eq!(context_window(FILE, Some(1)), "l1\nl2\nl3");
        assert_eq!(context_window(FILE, Some(7)), "l5\nl6\nl7");
        assert_eq!(context_window(FILE, Some(9)), "l7");
    }

    #[test]
    fn context_window_sentinel_when_unavailable() {
        assert_eq!(context_window(FILE, None), CONTEXT_UNAVAILABLE);
        assert_eq!(context_window(FILE, Some(40)), CONTEXT_UNAVAILABLE);
        assert_eq!(context_window("", Some(5)), CONTEXT_UNAVAILABLE);
    }

    #[test]
    fn enrich_prefixes_and_seeds_conversation() {
        let unit = ReviewUnit::full_file("calc.py", "a\nb\nc");
        let raw = RawFinding {
            severity: Severity::Suggestion,
            line_number: Some(2),
            message: "Rename b.".into(),
        };
        let f = enrich(&unit, true, raw);
        assert_eq!(f.message, "[calc.py] Rename b.");
        assert_eq!(f.source, "calc.py");
        assert_eq!(f.source_context, "a\nb\nc");
        assert_eq!(f.conversation.len(), 1);
        assert_eq!(f.conversation[0].role, Role::Assistant);
        assert_eq!(f.conversation[0].text, "Rename b.");
    }

    #[test]
    fn enrich_without_prefix_keeps_message() {
        let unit = ReviewUnit::diff("+x");
        let raw = RawFinding { severity: Severity::Critical, line_number: None, message: "m".into() };
        let f = enrich(&unit, false, raw);
        assert_eq!(f.message, "m");
        assert_eq!(f.source_context, CONTEXT_UNAVAILABLE);
    }

    #[test]
    fn findings_get_distinct_ids() {
        let unit = ReviewUnit::diff("+x");
        let raw = RawFinding { severity: Severity::Suggestion, line_number: None, message: "m".into() };
        let a = enrich(&unit, false, raw.clone());
        let b = enrich(&unit, false, raw);
        assert_ne!(a.id, b.id);
    }
}
