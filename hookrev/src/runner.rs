//! The interactive event loop.
//!
//! # Startup sequence
//!
//! 1. `install_panic_hook()` first, so it is the innermost hook and restores
//!    the terminal before the panic message prints.
//! 2. `register_sigterm()`: a flag polled by the heartbeat arm below.
//! 3. `init_tui()`: alternate screen and raw mode.
//! 4. `spawn_event_task()` with the configured tick interval.
//!
//! The loop exits only when the session reports `Tick::ShuttingDown`, i.e.
//! after every event queued ahead of the termination request has been
//! applied. Errors inside the loop break out with the abort code instead of
//! propagating, so `restore_tui()` is always reached.

use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Result;
use hookrev_core::Tick;

use crate::app::{AppState, EXIT_ABORT};
use crate::event::{spawn_event_task, AppEvent, EventHandler};
use crate::tui;
use crate::ui::{self, keybindings};

/// SIGTERM is checked at least this often, even on a quiet terminal.
const HEARTBEAT: Duration = Duration::from_millis(50);

/// Runs the TUI until the session shuts down and returns its exit code.
pub async fn run_tui(mut state: AppState, tick: Duration) -> Result<i32> {
    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let handler = EventHandler::new();
    spawn_event_task(handler.tx.clone(), tick);
    let mut rx = handler.rx;

    let code = 'event_loop: loop {
        tokio::select! {
            _ = tokio::time::sleep(HEARTBEAT) => {
                if term_flag.load(Ordering::Relaxed) {
                    state.on_terminate();
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state)) {
                            tracing::error!(error = %e, "draw failed");
                            break 'event_loop EXIT_ABORT;
                        }
                    }
                    Some(AppEvent::Key(key)) => keybindings::handle_key(key, &mut state),
                    Some(AppEvent::Mouse(mouse)) => keybindings::handle_mouse(mouse, &mut state),
                    // The next Render picks up the new size from frame.area().
                    Some(AppEvent::Resize(_, _)) => {}
                    Some(AppEvent::Tick) => {
                        if let Tick::ShuttingDown(code) = state.on_tick() {
                            break 'event_loop code;
                        }
                    }
                    None => {
                        tracing::error!("terminal event channel closed");
                        break 'event_loop EXIT_ABORT;
                    }
                }
                if term_flag.load(Ordering::Relaxed) {
                    state.on_terminate();
                }
            }
        }
    };

    tui::restore_tui()?;
    tracing::info!(code, "session ended");
    Ok(code)
}
