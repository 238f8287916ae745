//! Inference client: wraps a raw model backend and enforces the two response
//! contracts (structured findings for review, plain text for chat).
//!
//! Both operations suspend only on the backend call. They are meant to be
//! awaited from worker tasks, never from the consumer loop.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::InferenceError;
use crate::prompt;
use crate::types::{ConversationTurn, RawFinding, ReviewUnit, Severity, MISSING_MESSAGE};

/// Reply shown when the model answers a chat turn with nothing.
pub const EMPTY_REPLY: &str = "Error: AI response was empty.";

/// Reply shown when a chat turn could not be completed at all.
pub const FAILED_REPLY: &str = "Sorry, I encountered an error and could not respond.";

/// Raw text generation against an external model.
///
/// `structured` asks the backend to constrain the output to JSON. The return
/// value is the model's text, or an empty string when it produced none.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        structured: bool,
    ) -> Result<String, InferenceError>;
}

/// Cheap to clone; every worker task gets its own handle.
#[derive(Clone)]
pub struct InferenceClient {
    backend: Arc<dyn ModelBackend>,
    model: String,
}

impl InferenceClient {
    pub fn new(backend: Arc<dyn ModelBackend>, model: impl Into<String>) -> Self {
        Self { backend, model: model.into() }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Reviews one unit. The response must be a JSON object with a `findings`
    /// array; anything else, or a transport failure, is returned once with no
    /// retry.
    pub async fn review(&self, unit: &ReviewUnit) -> Result<Vec<RawFinding>, InferenceError> {
        let prompt = prompt::review_prompt(unit);
        let text = self.backend.generate(&self.model, &prompt, true).await?;
        parse_findings(&text)
    }

    /// Asks the model for the next assistant turn. An empty reply becomes
    /// [`EMPTY_REPLY`] rather than an error.
    pub async fn chat(
        &self,
        context: &str,
        conversation: &[ConversationTurn],
    ) -> Result<String, InferenceError> {
        let prompt = prompt::chat_prompt(context, conversation);
        let text = self.backend.generate(&self.model, &prompt, false).await?;
        if text.trim().is_empty() {
            Ok(EMPTY_REPLY.to_owned())
        } else {
            Ok(text)
        }
    }
}

/// Parses a structured review response.
///
/// The envelope is strict; the items are not. Models routinely send
/// lowercase severities, quoted line numbers or no message, so each field
/// degrades to a sensible default instead of failing the whole unit.
pub fn parse_findings(text: &str) -> Result<Vec<RawFinding>, InferenceError> {
    let root: Value = serde_json::from_str(text.trim())
        .map_err(|e| InferenceError::MalformedResponse(format!("response is not JSON: {e}")))?;

    let items = root
        .get("findings")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            InferenceError::MalformedResponse("response has no `findings` array".to_owned())
        })?;

    Ok(items.iter().filter_map(parse_item).collect())
}

fn parse_item(item: &Value) -> Option<RawFinding> {
    let obj = item.as_object()?;
    let severity = obj
        .get("severity")
        .and_then(Value::as_str)
        .map(Severity::from_label)
        .unwrap_or_default();
    let line_number = obj.get("line_number").and_then(parse_line_number);
    let message = obj
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(MISSING_MESSAGE)
        .to_owned();
    Some(RawFinding { severity, line_number, message })
}

fn parse_line_number(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(n).ok().filter(|&n| n > 0)
}
