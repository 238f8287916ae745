//! Syntax highlighting for the source panel.
//!
//! Review units are rendered once, when they arrive, into owned ratatui
//! `Line`s. Full-file units get syntect highlighting and a line-number
//! gutter. Diff units additionally get diff coloring and word-level emphasis
//! for consecutive removed/added line pairs via `similar`.

use std::sync::LazyLock;

use hookrev_core::{ReviewUnit, UnitKind};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use similar::{ChangeTag, TextDiff};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::theme::Theme;

static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// All units rendered back to back, with the line index where each unit's
/// header sits.
#[derive(Debug, Default)]
pub struct RenderedSource {
    pub lines: Vec<Line<'static>>,
    pub unit_offsets: Vec<usize>,
}

pub fn render_units(units: &[ReviewUnit], theme: &Theme) -> RenderedSource {
    let mut out = RenderedSource::default();
    for unit in units {
        out.unit_offsets.push(out.lines.len());
        out.lines.push(Line::from(Span::styled(
            format!("── {} ──", unit.identifier),
            Style::default().fg(theme.unit_header).add_modifier(Modifier::BOLD),
        )));
        match unit.kind {
            UnitKind::Diff => highlight_diff(&unit.content, theme, &mut out.lines),
            UnitKind::FullFile => {
                highlight_file(&unit.identifier, &unit.content, theme, &mut out.lines)
            }
        }
    }
    out
}

fn highlighter(syntax: &SyntaxReference, theme: &Theme) -> Option<HighlightLines<'static>> {
    let syn_theme = TS
        .themes
        .get(theme.syntax_theme)
        .or_else(|| TS.themes.values().next())?;
    Some(HighlightLines::new(syntax, syn_theme))
}

fn syntax_for(path: &str) -> &'static SyntaxReference {
    let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("txt");
    PS.find_syntax_by_extension(ext).unwrap_or_else(|| PS.find_syntax_plain_text())
}

/// Converts a syntect style to a ratatui span. Background colors are dropped
/// so code sits on the terminal's own background.
fn syntect_to_span(style: syntect::highlighting::Style, content: &str) -> Span<'static> {
    let fg = style.foreground;
    let mut ratatui_style = Style::default();
    if fg.a > 0 {
        ratatui_style = ratatui_style.fg(Color::Rgb(fg.r, fg.g, fg.b));
    }
    if style.font_style.contains(FontStyle::BOLD) {
        ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        ratatui_style = ratatui_style.add_modifier(Modifier::UNDERLINED);
    }
    Span::styled(content.trim_end_matches(['\n', '\r']).to_owned(), ratatui_style)
}

fn code_spans(code: &str, h: Option<&mut HighlightLines<'static>>) -> Vec<Span<'static>> {
    let spans: Vec<Span<'static>> = match h {
        Some(h) => {
            // Newline-terminated input keeps syntect's parse state correct.
            let line = format!("{code}\n");
            h.highlight_line(&line, &PS)
                .unwrap_or_default()
                .into_iter()
                .map(|(style, text)| syntect_to_span(style, text))
                .filter(|s| !s.content.is_empty())
                .collect()
        }
        None => Vec::new(),
    };
    if spans.is_empty() {
        vec![Span::raw(code.to_owned())]
    } else {
        spans
    }
}

fn highlight_file(name: &str, content: &str, theme: &Theme, out: &mut Vec<Line<'static>>) {
    let mut h = highlighter(syntax_for(name), theme);
    let count = content.lines().count();
    let width = count.max(1).to_string().len();
    let gutter = Style::default().fg(theme.line_number);

    for (i, code) in content.lines().enumerate() {
        let mut spans = vec![Span::styled(format!("{:>width$} │ ", i + 1), gutter)];
        spans.extend(code_spans(code, h.as_mut()));
        out.push(Line::from(spans));
    }
    if count == 0 {
        out.push(Line::from(Span::styled("(empty)", gutter)));
    }
}

/// Word-level diff of a removed/added pair. Changed words are bold.
fn word_diff_spans(
    old_line: &str,
    new_line: &str,
    theme: &Theme,
) -> (Vec<Span<'static>>, Vec<Span<'static>>) {
    let diff = TextDiff::from_words(old_line, new_line);
    let mut old_spans = Vec::new();
    let mut new_spans = Vec::new();

    for op in diff.ops() {
        for change in diff.iter_inline_changes(op) {
            for (emphasized, value) in change.iter_strings_lossy() {
                let text = value.trim_end_matches('\n').to_owned();
                let base = match change.tag() {
                    ChangeTag::Delete => Style::default().fg(theme.diff_removed),
                    ChangeTag::Insert => Style::default().fg(theme.diff_added),
                    ChangeTag::Equal => Style::default().fg(theme.diff_context),
                };
                let style = if emphasized { base.add_modifier(Modifier::BOLD) } else { base };
                match change.tag() {
                    ChangeTag::Delete => old_spans.push(Span::styled(text, style)),
                    ChangeTag::Insert => new_spans.push(Span::styled(text, style)),
                    ChangeTag::Equal => {
                        old_spans.push(Span::styled(text.clone(), style));
                        new_spans.push(Span::styled(text, style));
                    }
                }
            }
        }
    }
    (old_spans, new_spans)
}

fn marker(sign: &'static str, color: Color) -> Span<'static> {
    Span::styled(sign, Style::default().fg(color))
}

fn highlight_diff(text: &str, theme: &Theme, out: &mut Vec<Line<'static>>) {
    let header = Style::default().fg(theme.diff_file_header).add_modifier(Modifier::BOLD);
    let mut h = highlighter(PS.find_syntax_plain_text(), theme);
    let mut in_file_header = false;
    // Removed line waiting to be paired with the next added line.
    let mut pending: Option<String> = None;

    let flush = |pending: &mut Option<String>,
                 h: &mut Option<HighlightLines<'static>>,
                 out: &mut Vec<Line<'static>>| {
        if let Some(code) = pending.take() {
            let mut spans = vec![marker("- ", theme.diff_removed)];
            spans.extend(code_spans(&code, h.as_mut()));
            out.push(Line::from(spans));
        }
    };

    for raw in text.lines() {
        if let Some(rest) = raw.strip_prefix("diff --git ") {
            flush(&mut pending, &mut h, out);
            in_file_header = true;
            let path = rest.rsplit(' ').next().unwrap_or(rest);
            let path = path.strip_prefix("b/").unwrap_or(path);
            h = highlighter(syntax_for(path), theme);
            out.push(Line::from(Span::styled(raw.to_owned(), header)));
            continue;
        }
        if raw.starts_with("@@") {
            flush(&mut pending, &mut h, out);
            in_file_header = false;
            out.push(Line::from(Span::styled(
                raw.to_owned(),
                Style::default().fg(theme.diff_hunk_header),
            )));
            continue;
        }
        if in_file_header {
            out.push(Line::from(Span::styled(raw.to_owned(), header)));
            continue;
        }

        match raw.split_at_checked(1) {
            Some(("-", code)) => {
                flush(&mut pending, &mut h, out);
                pending = Some(code.to_owned());
            }
            Some(("+", code)) => match pending.take() {
                Some(old) => {
                    let (old_words, new_words) = word_diff_spans(&old, code, theme);
                    let mut old_line = vec![marker("- ", theme.diff_removed)];
                    old_line.extend(old_words);
                    out.push(Line::from(old_line));
                    let mut new_line = vec![marker("+ ", theme.diff_added)];
                    new_line.extend(new_words);
                    out.push(Line::from(new_line));
                }
                None => {
                    let mut spans = vec![marker("+ ", theme.diff_added)];
                    spans.extend(code_spans(code, h.as_mut()));
                    out.push(Line::from(spans));
                }
            },
            _ => {
                flush(&mut pending, &mut h, out);
                let code = raw.strip_prefix(' ').unwrap_or(raw);
                let mut spans = vec![marker("  ", theme.line_number)];
                spans.extend(code_spans(code, h.as_mut()));
                out.push(Line::from(spans));
            }
        }
    }
    flush(&mut pending, &mut h, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    const DIFF: &str = "\
diff --git a/calc.py b/calc.py
index 1111111..2222222 100644
--- a/calc.py
+++ b/calc.py
@@ -1,2 +1,2 @@
 def add(a, b):
-    return a - b
+    return a + b";

    #[test]
    fn offsets_point_at_unit_headers() {
        let units = vec![
            ReviewUnit::full_file("a.py", "x = 1\ny = 2"),
            ReviewUnit::full_file("b.py", "z = 3"),
        ];
        let rendered = render_units(&units, &Theme::dark());
        assert_eq!(rendered.unit_offsets, [0, 3]);
        assert_eq!(text_of(&rendered.lines[0]), "── a.py ──");
        assert_eq!(text_of(&rendered.lines[3]), "── b.py ──");
        assert_eq!(rendered.lines.len(), 5);
    }

    #[test]
    fn full_file_lines_get_a_gutter() {
        let units = vec![ReviewUnit::full_file("a.py", "x = 1\ny = 2")];
        let rendered = render_units(&units, &Theme::dark());
        assert_eq!(text_of(&rendered.lines[1]), "1 │ x = 1");
        assert_eq!(text_of(&rendered.lines[2]), "2 │ y = 2");
    }

    #[test]
    fn diff_keeps_every_line_and_marks_changes() {
        let rendered = render_units(&[ReviewUnit::diff(DIFF)], &Theme::dark());
        let texts: Vec<String> = rendered.lines.iter().map(text_of).collect();
        assert_eq!(texts.len(), 1 + DIFF.lines().count());
        assert_eq!(texts[1], "diff --git a/calc.py b/calc.py");
        assert_eq!(texts[4], "+++ b/calc.py");
        assert_eq!(texts[5], "@@ -1,2 +1,2 @@");
        assert_eq!(texts[6], "  def add(a, b):");
        assert_eq!(texts[7], "-     return a - b");
        assert_eq!(texts[8], "+     return a + b");
    }

    #[test]
    fn paired_lines_color_only_the_changed_word() {
        let theme = Theme::dark();
        let (old, new) = word_diff_spans("return a - b", "return a + b", &theme);
        let colored = |spans: &[Span<'_>], color: Color| -> String {
            spans
                .iter()
                .filter(|s| s.style.fg == Some(color))
                .map(|s| s.content.as_ref())
                .collect()
        };
        assert_eq!(colored(&old, theme.diff_removed), "-");
        assert_eq!(colored(&new, theme.diff_added), "+");
        assert_eq!(old.iter().map(|s| s.content.as_ref()).collect::<String>(), "return a - b");
    }
}
