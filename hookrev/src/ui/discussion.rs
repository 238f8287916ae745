//! Discussion panel and message input.
//!
//! The discussion shows the selected finding's code context followed by its
//! conversation. Wrapped height is estimated per line so the scroll offset
//! can be clamped; `u16::MAX` means "stick to the bottom".

use hookrev_core::{Finding, Role};
use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::app::{AppState, Mode, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_discussion(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Discussion;
    let inner = inner_rect(area);
    frame.render_widget(panel_block("Discussion", is_focused, theme), area);

    let lines = match state.selected_finding() {
        Some(f) => conversation_lines(f, state.session.chat_in_flight(), theme),
        None => vec![Line::raw("Select a finding to see its discussion.")],
    };

    let total = wrapped_height(&lines, inner.width);
    let max_scroll = total.saturating_sub(inner.height as usize);
    let scroll = (state.discussion_scroll as usize).min(max_scroll) as u16;
    state.discussion_scroll = scroll;

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((scroll, 0)),
        inner,
    );
}

fn conversation_lines(f: &Finding, waiting: bool, theme: &Theme) -> Vec<Line<'static>> {
    let dim = Style::default().fg(theme.line_number);
    let mut lines = vec![Line::from(Span::styled(
        format!("{} · {}", f.severity, f.source),
        dim.add_modifier(Modifier::BOLD),
    ))];
    lines.extend(f.source_context.lines().map(|l| Line::from(Span::styled(format!("│ {l}"), dim))));
    lines.push(Line::raw(""));

    for turn in &f.conversation {
        let (who, color) = match turn.role {
            Role::User => ("You", theme.chat_user),
            Role::Assistant => ("Reviewer", theme.chat_assistant),
        };
        lines.push(Line::from(Span::styled(
            format!("{who}:"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.extend(turn.text.lines().map(|l| Line::raw(l.to_owned())));
        lines.push(Line::raw(""));
    }

    let awaiting_reply = f.conversation.last().is_some_and(|t| t.role == Role::User);
    if waiting && awaiting_reply {
        lines.push(Line::from(Span::styled(
            "Reviewer is thinking...",
            Style::default().fg(theme.chat_pending).add_modifier(Modifier::ITALIC),
        )));
    }
    lines
}

/// Rows the lines take when wrapped at `width` columns (approximate: wraps
/// by character count, not word boundaries).
fn wrapped_height(lines: &[Line<'_>], width: u16) -> usize {
    let width = width.max(1) as usize;
    lines.iter().map(|l| l.width().max(1).div_ceil(width)).sum()
}

pub fn render_input(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let editing = state.mode == Mode::Insert;
    let title = if editing {
        "Message (Enter send, Esc cancel)"
    } else {
        "Message (i to type)"
    };
    let inner = inner_rect(area);
    frame.render_widget(panel_block(title, editing, theme), area);

    // Keep the cursor end of long input visible.
    let width = inner.width.saturating_sub(1) as usize;
    let chars = state.input.chars().count();
    let visible: String = state.input.chars().skip(chars.saturating_sub(width)).collect();
    let cursor_x = inner.x + visible.chars().count() as u16;
    frame.render_widget(Paragraph::new(visible), inner);

    if editing && inner.height > 0 {
        frame.set_cursor_position(Position { x: cursor_x, y: inner.y });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_height_counts_wrapped_rows() {
        let lines = vec![Line::raw("abcdefghij"), Line::raw(""), Line::raw("abc")];
        assert_eq!(wrapped_height(&lines, 4), 3 + 1 + 1);
        assert_eq!(wrapped_height(&lines, 20), 3);
    }
}
