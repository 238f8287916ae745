//! Findings panel: one row per finding with a severity badge.

use hookrev_core::{Finding, ReviewPhase, Severity};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::panel_block;

pub fn render_findings(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Findings;
    let findings = state.session.findings();
    let title = if findings.is_empty() {
        "Findings".to_owned()
    } else {
        format!("Findings ({})", findings.len())
    };
    let block = panel_block(title, is_focused, theme);

    let items: Vec<ListItem> = if findings.is_empty() {
        let msg = match state.session.phase() {
            ReviewPhase::NotStarted => "Press r to start a review.",
            ReviewPhase::Running => "Reviewing...",
            ReviewPhase::Finished if state.session.units().is_empty() => "Nothing staged.",
            ReviewPhase::Finished => "No issues found.",
            ReviewPhase::Failed(_) => "Review failed. Press r to retry.",
        };
        vec![ListItem::new(Line::raw(msg))]
    } else {
        findings.iter().map(|f| finding_item(f, theme)).collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(theme.selection).add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut state.findings_state);
}

/// `[CRITICAL] L12 message`. Findings without a line number omit the `L`.
fn finding_item(f: &Finding, theme: &Theme) -> ListItem<'static> {
    let color = match f.severity {
        Severity::Critical => theme.badge_critical,
        Severity::Suggestion => theme.badge_suggestion,
    };
    let mut spans = vec![Span::styled(
        format!("[{}] ", f.severity),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if let Some(n) = f.line_number {
        spans.push(Span::styled(format!("L{n} "), Style::default().fg(theme.line_number)));
    }
    spans.push(Span::raw(f.message.clone()));
    ListItem::new(Line::from(spans))
}
