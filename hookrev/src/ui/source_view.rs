//! Source panel: the staged units, pre-highlighted.
//!
//! Virtual scrolling: only `source_lines[scroll..scroll + height]` become
//! list items each frame, so large full-file reviews stay cheap to draw.

use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{List, ListItem},
    Frame,
};

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_source(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Source;
    let units = state.session.units().len();
    let title = if units > 1 { format!("Source ({units} files)") } else { "Source".to_owned() };
    let inner = inner_rect(area);
    frame.render_widget(panel_block(title, is_focused, theme), area);

    if state.source_lines.is_empty() {
        let msg = if state.session.is_review_running() {
            "Collecting staged changes..."
        } else {
            "Nothing to show."
        };
        frame.render_widget(List::new([ListItem::new(Line::raw(msg))]), inner);
        return;
    }

    let total = state.source_lines.len();
    let start = state.source_scroll.min(total.saturating_sub(1));
    let end = (start + inner.height as usize).min(total);
    let items: Vec<ListItem> = state.source_lines[start..end]
        .iter()
        .map(|l| ListItem::new(l.clone()))
        .collect();
    frame.render_widget(List::new(items), inner);
}
