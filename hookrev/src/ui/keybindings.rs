//! Keybinding dispatcher for hookrev.
//!
//! Translates crossterm key and mouse events into `AppState` mutations. The
//! dispatcher branches first on `state.mode` so each mode has an isolated
//! handler. Nothing here exits the process: quitting and committing go
//! through the session's shutdown request, which the event loop observes on
//! the next tick.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::app::{AppState, Mode, PanelFocus};

/// Dispatches a key event to the handler matching the current mode.
///
/// Any key dismisses the previous one-shot notice.
pub fn handle_key(key: KeyEvent, state: &mut AppState) {
    state.notice = None;
    match state.mode {
        Mode::Normal => handle_normal(key, state),
        Mode::Insert => handle_insert(key, state),
        Mode::HelpOverlay => handle_help(key, state),
        Mode::ConfirmCommit => handle_confirm_commit(key, state),
        Mode::CommitMessage => handle_commit_message(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) {
    if handle_scroll_key(key, state) {
        return;
    }

    match key.code {
        KeyCode::Char('H') | KeyCode::BackTab => state.focus = state.focus.prev(),
        KeyCode::Char('L') | KeyCode::Tab => state.focus = state.focus.next(),

        KeyCode::Char('<') => state.shrink_source_panel(),
        KeyCode::Char('>') => state.grow_source_panel(),

        KeyCode::Char('i') | KeyCode::Enter => {
            if state.selected_finding().is_some() {
                state.mode = Mode::Insert;
                state.focus = PanelFocus::Discussion;
            } else {
                state.notice = Some("Select a finding first.".to_owned());
            }
        }

        KeyCode::Char('r') => state.start_review(),
        KeyCode::Char('f') => state.toggle_review_mode(),
        KeyCode::Char('c') => state.request_commit(),
        KeyCode::Char('q') | KeyCode::Char('a') => state.abort(),

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
        }

        _ => {}
    }
}

/// j / k / g / G and Ctrl-d / Ctrl-u. Returns whether the key was consumed.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('d') if ctrl => state.half_page_down(),
        KeyCode::Char('u') if ctrl => state.half_page_up(),
        KeyCode::Char('j') | KeyCode::Down => state.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll_up(1),
        KeyCode::Char('g') | KeyCode::Home => state.scroll_top(),
        KeyCode::Char('G') | KeyCode::End => state.scroll_bottom(),
        _ => return false,
    }
    true
}

// ---------------------------------------------------------------------------
// Insert mode
// ---------------------------------------------------------------------------

fn handle_insert(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Esc => state.mode = Mode::Normal,
        KeyCode::Enter => state.send_chat(),
        KeyCode::Backspace => {
            state.input.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.input.push(c);
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Char('j') => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('G') => state.help_scroll = u16::MAX,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Commit dialogs
// ---------------------------------------------------------------------------

/// `y` commits despite open suggestions; `n` / `Esc` goes back.
fn handle_confirm_commit(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => state.proceed_with_commit(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => state.mode = Mode::Normal,
        _ => {}
    }
}

fn handle_commit_message(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Esc => state.mode = Mode::Normal,
        KeyCode::Enter => state.submit_commit_message(),
        KeyCode::Backspace => {
            state.commit_message.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.commit_message.push(c);
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Left click focuses the panel under the cursor; the wheel scrolls by 3.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            handle_mouse_click(mouse.column, mouse.row, state)
        }
        MouseEventKind::ScrollUp => {
            if state.mode == Mode::HelpOverlay {
                state.help_scroll = state.help_scroll.saturating_sub(3);
            } else {
                state.scroll_up(3);
            }
        }
        MouseEventKind::ScrollDown => {
            if state.mode == Mode::HelpOverlay {
                state.help_scroll = state.help_scroll.saturating_add(3);
            } else {
                state.scroll_down(3);
            }
        }
        _ => {}
    }
}

/// Collapsed (zero-width) panels cannot take focus.
fn handle_mouse_click(col: u16, row: u16, state: &mut AppState) {
    if state.mode != Mode::Normal {
        return;
    }
    let pos = Position { x: col, y: row };
    let [source, findings, discussion] = state.panel_rects;

    if source.width > 0 && source.contains(pos) {
        state.focus = PanelFocus::Source;
    } else if findings.contains(pos) {
        state.focus = PanelFocus::Findings;
    } else if discussion.contains(pos) {
        state.focus = PanelFocus::Discussion;
    }
}

#[cfg(test)]
mod tests {
    use hookrev_core::{Severity, Tick};
    use ratatui::layout::Rect;

    use super::*;
    use crate::app::tests::seeded_state;
    use crate::app::{Launch, EXIT_ABORT, EXIT_PROCEED};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(state: &mut AppState, s: &str) {
        for c in s.chars() {
            handle_key(key(KeyCode::Char(c)), state);
        }
    }

    #[test]
    fn j_and_k_move_the_finding_selection() {
        let mut state = seeded_state(Launch::Hook, &[Severity::Suggestion; 3]);
        handle_key(key(KeyCode::Char('j')), &mut state);
        handle_key(key(KeyCode::Char('j')), &mut state);
        assert_eq!(state.findings_state.selected(), Some(2));
        handle_key(key(KeyCode::Char('j')), &mut state);
        assert_eq!(state.findings_state.selected(), Some(2));
        handle_key(key(KeyCode::Char('g')), &mut state);
        assert_eq!(state.findings_state.selected(), Some(0));
    }

    #[test]
    fn focus_cycles_both_ways() {
        let mut state = seeded_state(Launch::Hook, &[]);
        assert_eq!(state.focus, PanelFocus::Findings);
        handle_key(key(KeyCode::Char('L')), &mut state);
        assert_eq!(state.focus, PanelFocus::Discussion);
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.focus, PanelFocus::Source);
        handle_key(key(KeyCode::Char('H')), &mut state);
        assert_eq!(state.focus, PanelFocus::Discussion);
    }

    #[test]
    fn half_page_uses_cached_viewport_height() {
        let mut state = seeded_state(Launch::Hook, &[]);
        state.focus = PanelFocus::Source;
        state.source_viewport_height = 6;
        handle_key(ctrl('d'), &mut state);
        assert_eq!(state.source_scroll, 3);
        handle_key(ctrl('u'), &mut state);
        assert_eq!(state.source_scroll, 0);
    }

    #[test]
    fn insert_mode_needs_a_finding() {
        let mut state = seeded_state(Launch::Hook, &[]);
        handle_key(key(KeyCode::Char('i')), &mut state);
        assert_eq!(state.mode, Mode::Normal);
        assert!(state.notice.is_some());

        // The next key clears the notice.
        handle_key(key(KeyCode::Char('x')), &mut state);
        assert!(state.notice.is_none());
    }

    #[test]
    fn typing_edits_the_input_buffer() {
        let mut state = seeded_state(Launch::Hook, &[Severity::Suggestion]);
        handle_key(key(KeyCode::Char('i')), &mut state);
        assert_eq!(state.mode, Mode::Insert);
        assert_eq!(state.focus, PanelFocus::Discussion);

        // Normal-mode keys are plain text here.
        type_str(&mut state, "why q?");
        handle_key(key(KeyCode::Backspace), &mut state);
        assert_eq!(state.input, "why q");
        assert_eq!(state.on_tick(), Tick::Empty);

        handle_key(key(KeyCode::Esc), &mut state);
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.input, "why q");
    }

    #[tokio::test]
    async fn enter_in_insert_mode_sends_the_message() {
        let mut state = seeded_state(Launch::Hook, &[Severity::Suggestion]);
        handle_key(key(KeyCode::Enter), &mut state);
        type_str(&mut state, "is this real?");
        handle_key(key(KeyCode::Enter), &mut state);

        assert_eq!(state.mode, Mode::Normal);
        assert!(state.input.is_empty());
        assert!(state.session.chat_in_flight());
        let finding = state.selected_finding().unwrap();
        assert_eq!(finding.conversation.last().unwrap().text, "is this real?");
    }

    #[test]
    fn suggestions_confirm_dialog_can_be_cancelled() {
        let mut state = seeded_state(Launch::Hook, &[Severity::Suggestion]);
        handle_key(key(KeyCode::Char('c')), &mut state);
        assert_eq!(state.mode, Mode::ConfirmCommit);
        handle_key(key(KeyCode::Char('n')), &mut state);
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.on_tick(), Tick::Empty);

        handle_key(key(KeyCode::Char('c')), &mut state);
        handle_key(key(KeyCode::Char('y')), &mut state);
        assert_eq!(state.on_tick(), Tick::ShuttingDown(EXIT_PROCEED));
    }

    #[test]
    fn q_aborts() {
        let mut state = seeded_state(Launch::Hook, &[Severity::Critical]);
        handle_key(key(KeyCode::Char('q')), &mut state);
        assert_eq!(state.on_tick(), Tick::ShuttingDown(EXIT_ABORT));
    }

    #[test]
    fn help_overlay_scrolls_and_closes() {
        let mut state = seeded_state(Launch::Hook, &[]);
        handle_key(key(KeyCode::Char('?')), &mut state);
        assert_eq!(state.mode, Mode::HelpOverlay);
        handle_key(key(KeyCode::Char('j')), &mut state);
        assert_eq!(state.help_scroll, 1);
        // q closes the overlay instead of aborting.
        handle_key(key(KeyCode::Char('q')), &mut state);
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.on_tick(), Tick::Empty);
    }

    #[test]
    fn click_focuses_panel_and_skips_collapsed_source() {
        let mut state = seeded_state(Launch::Hook, &[]);
        state.panel_rects = [
            Rect::new(0, 0, 0, 20),
            Rect::new(0, 0, 40, 10),
            Rect::new(0, 10, 40, 10),
        ];
        let click = |row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(click(12), &mut state);
        assert_eq!(state.focus, PanelFocus::Discussion);
        handle_mouse(click(2), &mut state);
        assert_eq!(state.focus, PanelFocus::Findings);
    }
}
