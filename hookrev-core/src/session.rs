//! The consumer loop and the single-writer state it owns.
//!
//! `ReviewSession` is the only place where units, findings, conversations,
//! status text and the termination state change. Workers are spawned from
//! here with owned snapshots and report back through the event channel; the
//! owner calls [`ReviewSession::tick`] on a fixed short interval and never
//! blocks on workers.
//!
//! # Loop states
//!
//! | State              | Meaning                                              |
//! |--------------------|------------------------------------------------------|
//! | `Idle`             | Normal operation                                     |
//! | `Draining(code)`   | Termination requested, pending events still queued   |
//! | `ShuttingDown(code)` | Channel drained; the process must exit with `code` |
//!
//! Each tick pops at most one event. A termination event popped while other
//! events are queued is re-queued at the tail, so every update that was
//! already in flight reaches the UI before the session ends. The first
//! termination request's code wins; duplicates are absorbed while draining.

use std::sync::Arc;

use thiserror::Error;

use crate::event::{self, EventQueue, EventSender, ReviewEvent};
use crate::gate::{self, CommitDecision};
use crate::inference::InferenceClient;
use crate::splitter::StagedSource;
use crate::types::{ConversationTurn, Finding, FindingId, ReviewMode, ReviewUnit};
use crate::worker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Draining(i32),
    ShuttingDown(i32),
}

/// Where the current (or last) review run stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewPhase {
    NotStarted,
    Running,
    Finished,
    Failed(String),
}

/// Which kind of event a tick applied. Lets the UI refresh derived state
/// (highlighted source, selection) only when it changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    NoChanges,
    UnitsReady,
    Progress,
    Complete,
    ReviewFailed,
    ChatReply,
}

/// Result of one consumer-loop tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing was queued.
    Empty,
    Applied(Applied),
    /// A termination event was seen but deferred until the channel drains.
    Deferred,
    /// Terminal: exit the process with this code.
    ShuttingDown(i32),
}

/// Why a request was refused at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("a review is already running")]
    ReviewRunning,
    #[error("waiting for the previous reply")]
    ChatInFlight,
    #[error("message is empty")]
    EmptyMessage,
    #[error("no such finding")]
    UnknownFinding,
    #[error("session is shutting down")]
    ShuttingDown,
}

pub struct ReviewSession {
    source: Arc<dyn StagedSource>,
    client: InferenceClient,
    events: EventSender,
    queue: EventQueue,
    state: LoopState,
    phase: ReviewPhase,
    units: Vec<ReviewUnit>,
    findings: Vec<Finding>,
    decision: CommitDecision,
    status: String,
    progress: Option<(usize, usize)>,
    /// Process-wide guard: at most one chat exchange outstanding.
    chat_in_flight: bool,
}

impl ReviewSession {
    pub fn new(source: Arc<dyn StagedSource>, client: InferenceClient) -> Self {
        let (events, queue) = event::channel();
        Self {
            source,
            client,
            events,
            queue,
            state: LoopState::Idle,
            phase: ReviewPhase::NotStarted,
            units: Vec::new(),
            findings: Vec::new(),
            decision: CommitDecision::Allowed,
            status: "Ready. Press r to start a review.".to_owned(),
            progress: None,
            chat_in_flight: false,
        }
    }

    /// Installs the result of a review that ran before the session existed
    /// (the pre-commit hook's batch pass).
    pub fn seed(&mut self, units: Vec<ReviewUnit>, findings: Vec<Finding>) {
        self.units = units;
        self.set_findings(findings);
        self.phase = ReviewPhase::Finished;
        self.status = self.decision_status().to_owned();
    }

    fn decision_status(&self) -> &'static str {
        match self.decision {
            CommitDecision::Allowed => "Review complete. No issues found!",
            CommitDecision::AllowedWithSuggestions => {
                "Suggestions found. Select a finding to discuss."
            }
            CommitDecision::Blocked => "CRITICAL issues found. Commit is blocked.",
        }
    }

    /// A producer handle for code outside the session (signal handlers,
    /// additional workers).
    pub fn sender(&self) -> EventSender {
        self.events.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn phase(&self) -> &ReviewPhase {
        &self.phase
    }

    pub fn units(&self) -> &[ReviewUnit] {
        &self.units
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn finding(&self, id: FindingId) -> Option<&Finding> {
        self.findings.iter().find(|f| f.id == id)
    }

    pub fn decision(&self) -> CommitDecision {
        self.decision
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// `(index, total)` of the unit under review, 0-based.
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.progress
    }

    pub fn chat_in_flight(&self) -> bool {
        self.chat_in_flight
    }

    pub fn is_review_running(&self) -> bool {
        self.phase == ReviewPhase::Running
    }

    fn terminating(&self) -> bool {
        !matches!(self.state, LoopState::Idle)
    }

    /// Launches the review worker. Only one run may be active.
    pub fn start_review(&mut self, mode: ReviewMode) -> Result<(), Rejected> {
        if self.terminating() {
            return Err(Rejected::ShuttingDown);
        }
        if self.is_review_running() {
            return Err(Rejected::ReviewRunning);
        }

        self.units.clear();
        self.set_findings(Vec::new());
        self.phase = ReviewPhase::Running;
        self.progress = None;
        self.status = "Collecting staged changes...".to_owned();
        tracing::info!(mode = mode.label(), "launching review worker");

        tokio::spawn(worker::run_review(
            Arc::clone(&self.source),
            self.client.clone(),
            mode,
            self.events.clone(),
        ));
        Ok(())
    }

    /// Appends the developer's turn and launches a chat worker for it.
    ///
    /// Refused, without spawning anything, while another exchange is
    /// outstanding anywhere in the session.
    pub fn send_chat(&mut self, id: FindingId, text: &str) -> Result<(), Rejected> {
        if self.terminating() {
            return Err(Rejected::ShuttingDown);
        }
        if self.chat_in_flight {
            return Err(Rejected::ChatInFlight);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(Rejected::EmptyMessage);
        }
        let finding = self
            .findings
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(Rejected::UnknownFinding)?;

        finding.conversation.push(ConversationTurn::user(text));
        let context = finding.source_context.clone();
        let conversation = finding.conversation.clone();
        self.chat_in_flight = true;
        self.status = "Waiting for the reviewer's reply...".to_owned();
        tracing::debug!(turns = conversation.len(), "launching chat worker");

        tokio::spawn(worker::run_chat(
            self.client.clone(),
            id,
            context,
            conversation,
            self.events.clone(),
        ));
        Ok(())
    }

    /// Queues a termination event; honoured once the channel drains.
    pub fn request_shutdown(&self, code: i32) {
        self.events.request_shutdown(code);
    }

    /// Runs one step of the consumer loop.
    pub fn tick(&mut self) -> Tick {
        if let LoopState::ShuttingDown(code) = self.state {
            return Tick::ShuttingDown(code);
        }

        let Some(event) = self.queue.try_next() else {
            if let LoopState::Draining(code) = self.state {
                return self.shut_down(code);
            }
            return Tick::Empty;
        };

        match event {
            ReviewEvent::Shutdown(code) => self.on_termination(code),
            other => Tick::Applied(self.apply(other)),
        }
    }

    fn on_termination(&mut self, code: i32) -> Tick {
        match self.state {
            LoopState::Draining(pending) if self.queue.is_empty() => self.shut_down(pending),
            LoopState::Draining(_) => Tick::Deferred,
            LoopState::Idle if self.queue.is_empty() => self.shut_down(code),
            LoopState::Idle => {
                tracing::debug!(code, queued = self.queue.len(), "shutdown deferred");
                self.state = LoopState::Draining(code);
                self.queue.requeue(ReviewEvent::Shutdown(code));
                Tick::Deferred
            }
            LoopState::ShuttingDown(code) => Tick::ShuttingDown(code),
        }
    }

    fn shut_down(&mut self, code: i32) -> Tick {
        tracing::info!(code, "session shutting down");
        self.state = LoopState::ShuttingDown(code);
        Tick::ShuttingDown(code)
    }

    fn apply(&mut self, event: ReviewEvent) -> Applied {
        match event {
            ReviewEvent::NoChanges => {
                self.phase = ReviewPhase::Finished;
                self.progress = None;
                self.status = "No staged changes found.".to_owned();
                Applied::NoChanges
            }
            ReviewEvent::UnitsReady(units) => {
                self.status = format!("Reviewing {} unit(s)...", units.len());
                self.units = units;
                Applied::UnitsReady
            }
            ReviewEvent::Progress { index, total, identifier } => {
                self.progress = Some((index, total));
                self.status = format!("Analyzing chunk {}/{}: {}", index + 1, total, identifier);
                Applied::Progress
            }
            ReviewEvent::Complete(findings) => {
                self.set_findings(findings);
                self.phase = ReviewPhase::Finished;
                self.progress = None;
                self.status = self.decision_status().to_owned();
                Applied::Complete
            }
            ReviewEvent::ReviewFailed(reason) => {
                self.status = format!("Review failed: {reason}");
                self.phase = ReviewPhase::Failed(reason);
                self.progress = None;
                Applied::ReviewFailed
            }
            ReviewEvent::ChatReply { finding, text } => {
                self.chat_in_flight = false;
                match self.findings.iter_mut().find(|f| f.id == finding) {
                    Some(f) => {
                        f.conversation.push(ConversationTurn::assistant(text));
                        self.status = "Reply received.".to_owned();
                    }
                    None => tracing::debug!("chat reply for a finding that is gone, dropped"),
                }
                Applied::ChatReply
            }
            ReviewEvent::Shutdown(_) => unreachable!("termination is handled by tick"),
        }
    }

    /// Every write to the findings list goes through here so the decision
    /// can never go stale.
    fn set_findings(&mut self, findings: Vec<Finding>) {
        self.findings = findings;
        self.decision = gate::decide(&self.findings);
    }
}
