//! Color theme system for hookrev.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every UI
//! surface hookrev renders, plus the name of the syntect theme used for the
//! source panel. Two built-in themes are provided:
//!
//! - `dark` uses ANSI 16 colors so it works on any terminal, including SSH
//!   sessions without truecolor.
//! - `catppuccin_mocha` is the Catppuccin Mocha palette in RGB.

use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub border_active: Color,
    pub border_inactive: Color,

    // Source panel
    pub diff_added: Color,
    pub diff_removed: Color,
    pub diff_context: Color,
    pub diff_hunk_header: Color,
    pub diff_file_header: Color,
    pub line_number: Color,
    pub unit_header: Color,
    /// syntect theme for code spans.
    pub syntax_theme: &'static str,

    // Findings
    pub badge_critical: Color,
    pub badge_suggestion: Color,
    pub selection: Color,

    // Discussion
    pub chat_user: Color,
    pub chat_assistant: Color,
    pub chat_pending: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_mode_normal: Color,
    pub status_mode_insert: Color,
    pub gate_allowed: Color,
    pub gate_suggestions: Color,
    pub gate_blocked: Color,
}

impl Theme {
    /// ANSI 16 colors. Safe default when color capability is unknown.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            diff_added: Color::Green,
            diff_removed: Color::Red,
            diff_context: Color::Reset,
            diff_hunk_header: Color::Cyan,
            diff_file_header: Color::Yellow,
            line_number: Color::DarkGray,
            unit_header: Color::Magenta,
            syntax_theme: "base16-ocean.dark",

            badge_critical: Color::Red,
            badge_suggestion: Color::Yellow,
            selection: Color::Cyan,

            chat_user: Color::Green,
            chat_assistant: Color::Cyan,
            chat_pending: Color::DarkGray,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_insert: Color::Green,
            gate_allowed: Color::Green,
            gate_suggestions: Color::Yellow,
            gate_blocked: Color::Red,
        }
    }

    /// Catppuccin Mocha in RGB truecolor. Non-truecolor terminals get the
    /// nearest 256-color approximation; use `dark()` there.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let teal = Color::Rgb(148, 226, 213); // #94e2d5
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let peach = Color::Rgb(250, 179, 135); // #fab387
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let text = Color::Rgb(205, 214, 244); // #cdd6f4

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            diff_added: green,
            diff_removed: red,
            diff_context: text,
            diff_hunk_header: teal,
            diff_file_header: peach,
            line_number: overlay1,
            unit_header: mauve,
            syntax_theme: "base16-mocha.dark",

            badge_critical: red,
            badge_suggestion: peach,
            selection: lavender,

            chat_user: green,
            chat_assistant: blue,
            chat_pending: overlay1,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_insert: green,
            gate_allowed: green,
            gate_suggestions: yellow,
            gate_blocked: red,
        }
    }

    /// Resolves a configured theme name. Unknown names fall back to `dark()`
    /// so a typo in config never prevents startup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, falling back to dark");
                Self::dark()
            }
        }
    }
}
