//! Terminal event bus for hookrev.
//!
//! Terminal input and the two timers are normalised into `AppEvent` and sent
//! over a tokio unbounded channel to the main loop. Review results do not
//! travel here: they go through the session's own event channel, which the
//! main loop drains one event per `Tick`.
//!
//! - **Render interval** (33 ms, about 30 FPS) triggers a `terminal.draw()`.
//! - **Tick interval** (configurable, default 100 ms) drives the session's
//!   consumer loop.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::interval;

const RENDER_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Debug)]
pub enum AppEvent {
    /// Key press (`KeyEventKind::Press` only; release and repeat are dropped).
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// Consumer-loop tick.
    Tick,
    Render,
}

pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the task that feeds the channel until the receiver is dropped.
///
/// `reader.next().fuse()` keeps `select!` from polling a finished stream.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>, tick: Duration) {
    tokio::spawn(async move {
        let mut tick_interval = interval(tick);
        let mut render_interval = interval(RENDER_INTERVAL);
        let mut reader = EventStream::new();

        loop {
            let sent = tokio::select! {
                _ = tick_interval.tick() => tx.send(AppEvent::Tick),
                _ = render_interval.tick() => tx.send(AppEvent::Render),
                maybe_event = reader.next().fuse() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        tx.send(AppEvent::Key(key))
                    }
                    Some(Ok(Event::Resize(w, h))) => tx.send(AppEvent::Resize(w, h)),
                    Some(Ok(Event::Mouse(mouse))) => tx.send(AppEvent::Mouse(mouse)),
                    _ => Ok(()),
                },
            };
            if sent.is_err() {
                break;
            }
        }
    });
}
