//! Fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{InferenceError, SourceError};
use crate::inference::ModelBackend;
use crate::splitter::StagedSource;

pub(crate) struct FakeIndex {
    files: Vec<(String, String)>,
    diff: String,
    broken: Option<String>,
}

impl FakeIndex {
    pub(crate) fn empty() -> Self {
        Self { files: Vec::new(), diff: String::new(), broken: None }
    }

    pub(crate) fn diff_only(filename: &str, diff: &str) -> Self {
        Self {
            files: vec![(filename.to_owned(), String::new())],
            diff: diff.to_owned(),
            broken: None,
        }
    }

    pub(crate) fn broken(reason: &str) -> Self {
        Self { broken: Some(reason.to_owned()), ..Self::empty() }
    }
}

impl StagedSource for FakeIndex {
    fn list_staged_filenames(&self) -> Result<Vec<String>, SourceError> {
        if let Some(reason) = &self.broken {
            return Err(SourceError::new(reason));
        }
        Ok(self.files.iter().map(|(n, _)| n.clone()).collect())
    }

    fn staged_diff(&self) -> Result<String, SourceError> {
        Ok(self.diff.clone())
    }

    fn staged_file_content(&self, filename: &str) -> Result<String, SourceError> {
        Ok(self
            .files
            .iter()
            .find(|(n, _)| n == filename)
            .map(|(_, c)| c.clone())
            .unwrap_or_default())
    }
}

/// Replies from a script, in order. `Err` entries become transport errors.
/// An exhausted script fails every further call.
pub(crate) struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, String>>>,
    gate: Mutex<Option<Arc<Notify>>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub(crate) fn new(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            gate: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Makes every call wait for a `notify_one` on the returned handle.
    pub(crate) fn hold(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn generate(
        &self,
        _model: &str,
        _prompt: &str,
        _structured: bool,
    ) -> Result<String, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(reason)) => Err(InferenceError::Transport(reason)),
            None => Err(InferenceError::Transport("script exhausted".into())),
        }
    }
}
