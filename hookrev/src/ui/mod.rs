//! UI rendering for hookrev.
//!
//! `render()` is the single entry point, called from the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`;
//! each panel has its own module.

mod discussion;
mod findings;
mod help;
pub mod highlight;
pub mod keybindings;
mod layout;
mod source_view;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use layout::{compute_layout, inner_rect, render_status_bar};

/// Renders one complete frame.
///
/// Viewport heights and outer panel rects are written back into `state`
/// first so the next key press can compute half-page distances and mouse
/// hit-tests against what is on screen.
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let panels = compute_layout(frame.area(), state);

    state.source_viewport_height = inner_rect(panels.source).height;
    state.findings_viewport_height = inner_rect(panels.findings).height;
    state.discussion_viewport_height = inner_rect(panels.discussion).height;
    state.panel_rects = [panels.source, panels.findings, panels.discussion];

    // Cloned so panels can borrow `state` mutably for their scroll state.
    let theme = state.theme.clone();

    if panels.source.width > 0 {
        source_view::render_source(frame, panels.source, state, &theme);
    }
    findings::render_findings(frame, panels.findings, state, &theme);
    discussion::render_discussion(frame, panels.discussion, state, &theme);
    discussion::render_input(frame, panels.input, state, &theme);
    render_status_bar(frame, panels.status_bar, state, &theme);

    // Overlays last so they sit on top.
    match state.mode {
        Mode::HelpOverlay => help::render_help_overlay(frame, &theme, state.help_scroll),
        Mode::ConfirmCommit => {
            let open = state.session.findings().len();
            help::render_confirm_commit(frame, &theme, open);
        }
        Mode::CommitMessage => help::render_commit_message(frame, &theme, &state.commit_message),
        Mode::Normal | Mode::Insert => {}
    }
}

#[cfg(test)]
mod tests {
    use hookrev_core::Severity;
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::app::tests::seeded_state;
    use crate::app::Launch;

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn wide_terminal_shows_every_panel_and_caches_geometry() {
        let mut state = seeded_state(Launch::Hook, &[Severity::Critical]);
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| render(f, &mut state)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains("Source"));
        assert!(text.contains("Findings (1)"));
        assert!(text.contains("[CRITICAL]"));
        assert!(text.contains("BLOCKED"));
        assert!(state.panel_rects[0].width > 0);
        assert!(state.findings_viewport_height > 0);
    }

    #[test]
    fn narrow_terminal_collapses_the_source_panel() {
        let mut state = seeded_state(Launch::Hook, &[]);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| render(f, &mut state)).unwrap();

        assert_eq!(state.panel_rects[0].width, 0);
        assert!(screen(&terminal).contains("COMMIT OK"));
    }

    #[test]
    fn confirm_dialog_is_drawn_over_the_panels() {
        let mut state = seeded_state(Launch::Hook, &[Severity::Suggestion]);
        state.request_commit();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| render(f, &mut state)).unwrap();
        assert!(screen(&terminal).contains("Commit with suggestions?"));
    }
}
