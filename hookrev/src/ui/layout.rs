//! Responsive panel layout for hookrev.
//!
//! Pure layout arithmetic, recomputed inside every `terminal.draw()` so the
//! layout always follows the live terminal size.
//!
//! ```text
//! ┌ Source ──────────────┬ Findings ───────┐
//! │                      ├ Discussion ─────┤
//! │                      ├ Message ────────┤
//! └──────────────────────┴─────────────────┘
//!  status bar
//! ```
//!
//! Below 100 columns the source panel collapses and the review column fills
//! the width. `Spacing::Overlap(1)` with `MergeStrategy::Fuzzy` lets adjacent
//! borders share a cell and merge their junctions.

use hookrev_core::{CommitDecision, ReviewPhase};
use ratatui::{
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
    Frame,
};

use crate::app::{AppState, Mode};
use crate::theme::Theme;

const MIN_WIDTH_FOR_SOURCE: u16 = 100;

#[derive(Debug, Clone, Copy)]
pub struct Panels {
    pub source: Rect,
    pub findings: Rect,
    pub discussion: Rect,
    pub input: Rect,
    pub status_bar: Rect,
}

pub fn compute_layout(area: Rect, state: &AppState) -> Panels {
    let [main_area, status_bar] =
        area.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let horizontal = if area.width >= MIN_WIDTH_FOR_SOURCE {
        Layout::horizontal([Constraint::Percentage(state.source_pct), Constraint::Fill(1)])
            .spacing(Spacing::Overlap(1))
    } else {
        Layout::horizontal([Constraint::Length(0), Constraint::Fill(1)])
            .spacing(Spacing::Overlap(1))
    };
    let [source, review] = main_area.layout(&horizontal);

    let [findings, discussion, input] = review.layout(
        &Layout::vertical([
            Constraint::Percentage(35),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .spacing(Spacing::Overlap(1)),
    );

    Panels { source, findings, discussion, input, status_bar }
}

/// The panel's area inside its 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Bordered block; thick and highlighted when focused. `Fuzzy` merging is
/// required because `Exact` mis-joins thick and plain borders.
pub fn panel_block<'a>(title: impl Into<Line<'a>>, is_focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    let title: Line<'a> = title.into();
    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// One row: mode, review mode, busy indicators, status or notice, and the
/// commit decision on the right.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Insert | Mode::CommitMessage => (" INSERT ", theme.status_mode_insert),
        Mode::Normal | Mode::HelpOverlay | Mode::ConfirmCommit => {
            (" NORMAL ", theme.status_mode_normal)
        }
    };
    let session = &state.session;

    let mut spans = vec![
        Span::styled(mode_text, Style::default().fg(mode_fg).add_modifier(Modifier::BOLD)),
        Span::raw(format!("[{}] ", state.review_mode.label())),
    ];
    if session.is_review_running() {
        let progress = match session.progress() {
            Some((i, n)) => format!("⟳ {}/{} ", i + 1, n),
            None => "⟳ ".to_owned(),
        };
        spans.push(Span::raw(progress));
    }
    if session.chat_in_flight() {
        spans.push(Span::raw("… "));
    }
    let message = state.notice.as_deref().unwrap_or(session.status());
    spans.push(Span::raw(message.to_owned()));

    let left = Line::from(spans);
    let right = gate_badge(state, theme);
    let right_width = right.width() as u16;

    let [left_area, right_area] = area.layout(&Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(right_width),
    ]));

    let bar_style = Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg);
    frame.render_widget(Paragraph::new(left).style(bar_style), left_area);
    frame.render_widget(Paragraph::new(right).style(bar_style), right_area);
}

fn gate_badge(state: &AppState, theme: &Theme) -> Line<'static> {
    let (text, color) = match state.session.phase() {
        ReviewPhase::Finished => match state.session.decision() {
            CommitDecision::Allowed => (" COMMIT OK ", theme.gate_allowed),
            CommitDecision::AllowedWithSuggestions => (" SUGGESTIONS ", theme.gate_suggestions),
            CommitDecision::Blocked => (" BLOCKED ", theme.gate_blocked),
        },
        ReviewPhase::Failed(_) => (" REVIEW FAILED ", theme.gate_blocked),
        ReviewPhase::Running | ReviewPhase::NotStarted => ("", theme.status_bar_fg),
    };
    Line::from(Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD)))
}
