//! Event channel between workers and the consumer loop.
//!
//! An unbounded crossbeam channel: any number of producers hold an
//! [`EventSender`], the session owns the single [`EventQueue`]. The queue
//! never blocks; the consumer polls it on a fixed cadence. Emission order is
//! preserved per producer; interleaving across producers is unspecified.

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::types::{Finding, FindingId, ReviewUnit};

/// Everything a worker (or a shutdown request) can tell the consumer loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewEvent {
    /// Nothing is staged; the run ended successfully without reviewing.
    NoChanges,
    /// The units about to be reviewed, sent before any inference so the UI can
    /// show the source immediately.
    UnitsReady(Vec<ReviewUnit>),
    /// About to review unit `index` (0-based) of `total`.
    Progress { index: usize, total: usize, identifier: String },
    /// Every unit was attempted. Always the last event of a run that got past
    /// the splitter.
    Complete(Vec<Finding>),
    /// The splitter's git calls failed; the run was aborted.
    ReviewFailed(String),
    /// The model's answer to the latest user turn of `finding`.
    ChatReply { finding: FindingId, text: String },
    /// Terminate the session with this process exit code once the channel
    /// has drained.
    Shutdown(i32),
}

impl ReviewEvent {
    pub fn is_termination(&self) -> bool {
        matches!(self, ReviewEvent::Shutdown(_))
    }
}

/// Producer capability. Sends never block and never fail from the caller's
/// point of view: if the session is gone there is nobody left to inform.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<ReviewEvent>,
}

impl EventSender {
    pub fn send(&self, event: ReviewEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("event dropped: consumer loop has exited");
        }
    }

    /// Enqueues a termination event.
    pub fn request_shutdown(&self, code: i32) {
        self.send(ReviewEvent::Shutdown(code));
    }
}

/// Consumer end, owned by the session.
#[derive(Debug)]
pub struct EventQueue {
    rx: Receiver<ReviewEvent>,
    requeue_tx: Sender<ReviewEvent>,
}

impl EventQueue {
    /// Pops the next event without blocking.
    pub fn try_next(&self) -> Option<ReviewEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            // Unreachable while `requeue_tx` is alive, kept for completeness.
            Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Puts an event back at the tail of the queue.
    pub fn requeue(&self, event: ReviewEvent) {
        let _ = self.requeue_tx.send(event);
    }
}

/// Creates a connected sender/queue pair.
pub fn channel() -> (EventSender, EventQueue) {
    let (tx, rx) = crossbeam_channel::unbounded();
    let queue = EventQueue { rx, requeue_tx: tx.clone() };
    (EventSender { tx }, queue)
}
