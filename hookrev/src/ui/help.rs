//! Help overlay and modal dialogs.
//!
//! Each modal is drawn over the panels inside the same `terminal.draw()`:
//! `Clear` erases the area first, then a bordered `Paragraph` goes on top.

use ratatui::{
    layout::{Constraint, Position, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::Theme;

/// Skipped below 60 columns, where the centred rect degenerates.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }
    let area = frame.area().centered(Constraint::Percentage(80), Constraint::Percentage(80));
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" Help (j/k scroll, ? or Esc to close) ")
        .border_style(Style::default().fg(theme.border_active));
    frame.render_widget(
        Paragraph::new(help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        area,
    );
}

fn help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Navigation"),
        Line::from("  j / k         Down / up (next / previous finding in Findings)"),
        Line::from("  g / G         Top / bottom"),
        Line::from("  Ctrl-d / u    Half page down / up"),
        Line::from("  H / L / Tab   Move focus between panels"),
        Line::from("  < / >         Shrink / grow the source panel"),
        Line::from(""),
        Line::from("Discussion"),
        Line::from("  i / Enter     Write a message about the selected finding"),
        Line::from("  Enter         Send (while typing)"),
        Line::from("  Esc           Stop typing"),
        Line::from(""),
        Line::from("Review"),
        Line::from("  r             Run the review again"),
        Line::from("  f             Toggle diff / full-file mode for the next run"),
        Line::from(""),
        Line::from("Commit"),
        Line::from("  c             Commit (refused while CRITICAL findings exist;"),
        Line::from("                asks for confirmation when only suggestions remain)"),
        Line::from("  q / a         Abort the commit"),
        Line::from("  ?             Open / close this help"),
    ])
}

fn dialog_area(frame: &Frame, height: u16) -> Option<Rect> {
    if frame.area().width < 40 || frame.area().height < height {
        return None;
    }
    Some(frame.area().centered(Constraint::Percentage(60), Constraint::Length(height)))
}

pub fn render_confirm_commit(frame: &mut Frame, theme: &Theme, suggestions: usize) {
    let Some(area) = dialog_area(frame, 5) else {
        return;
    };
    frame.render_widget(Clear, area);
    let block = Block::bordered()
        .title(" Commit with suggestions? ")
        .border_style(Style::default().fg(theme.gate_suggestions));
    let text = Text::from(vec![
        Line::from(format!("{suggestions} suggestion(s) are still open.")),
        Line::from(""),
        Line::from("y  commit anyway      n / Esc  go back"),
    ]);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

pub fn render_commit_message(frame: &mut Frame, theme: &Theme, message: &str) {
    let Some(area) = dialog_area(frame, 3) else {
        return;
    };
    frame.render_widget(Clear, area);
    let block = Block::bordered()
        .title(" Commit message (Enter commit, Esc cancel) ")
        .border_style(Style::default().fg(theme.border_active));
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(message.to_owned()).block(block), area);
    let x = inner.x + (message.chars().count() as u16).min(inner.width.saturating_sub(1));
    frame.set_cursor_position(Position { x, y: inner.y });
}
