//! Central application state for hookrev.
//!
//! `AppState` wraps the review session (the single writer of review data)
//! together with everything that is purely presentational: mode, focus,
//! scroll offsets, panel geometry, the input buffers and the pre-rendered
//! source lines. Rendering reads it; the keybinding dispatcher and the tick
//! handler mutate it.

use std::path::PathBuf;

use hookrev_core::{
    Applied, CommitDecision, Finding, ReviewMode, ReviewPhase, ReviewSession, Tick, UnitKind,
};
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::ListState;

use crate::git::commit;
use crate::theme::Theme;
use crate::ui::highlight;

/// Exit code when the developer aborts (or the process is terminated).
pub const EXIT_ABORT: i32 = 1;
/// Exit code when the commit goes ahead.
pub const EXIT_PROCEED: i32 = 0;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Typing a chat message for the selected finding.
    Insert,
    HelpOverlay,
    /// Commit with open suggestions; waiting for y/n.
    ConfirmCommit,
    /// Typing the commit message (standalone sessions only).
    CommitMessage,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    Source,
    #[default]
    Findings,
    Discussion,
}

impl PanelFocus {
    /// Cycle order: `Source` → `Findings` → `Discussion` → `Source`.
    pub fn next(self) -> Self {
        match self {
            PanelFocus::Source => PanelFocus::Findings,
            PanelFocus::Findings => PanelFocus::Discussion,
            PanelFocus::Discussion => PanelFocus::Source,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            PanelFocus::Source => PanelFocus::Discussion,
            PanelFocus::Findings => PanelFocus::Source,
            PanelFocus::Discussion => PanelFocus::Findings,
        }
    }
}

/// What "commit" means for this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    /// Running inside the pre-commit hook: committing means letting git
    /// continue, so the session just exits with 0.
    Hook,
    /// Running standalone: the commit is created here from the index.
    Standalone { workdir: PathBuf },
}

pub struct AppState {
    pub session: ReviewSession,
    pub launch: Launch,
    pub theme: Theme,
    /// Mode used by the next `r`.
    pub review_mode: ReviewMode,

    pub mode: Mode,
    pub focus: PanelFocus,

    pub findings_state: ListState,
    pub source_scroll: usize,
    pub discussion_scroll: u16,
    pub help_scroll: u16,

    /// Inner heights cached after each render for half-page scrolling.
    pub source_viewport_height: u16,
    pub findings_viewport_height: u16,
    pub discussion_viewport_height: u16,

    /// Width percentage of the source panel. Default: 55.
    pub source_pct: u16,
    /// `[source, findings, discussion]` outer rects from the last frame, for
    /// mouse hit-testing.
    pub panel_rects: [Rect; 3],

    /// Chat message being typed.
    pub input: String,
    /// Commit message being typed.
    pub commit_message: String,

    pub source_lines: Vec<Line<'static>>,
    pub unit_offsets: Vec<usize>,

    /// One-shot message shown in the status bar until the next key press.
    pub notice: Option<String>,
    /// SIGTERM seen and forwarded to the session.
    pub terminated: bool,
}

impl AppState {
    pub fn new(session: ReviewSession, launch: Launch, theme: Theme, review_mode: ReviewMode) -> Self {
        let mut state = Self {
            session,
            launch,
            theme,
            review_mode,
            mode: Mode::default(),
            focus: PanelFocus::default(),
            findings_state: ListState::default(),
            source_scroll: 0,
            discussion_scroll: 0,
            help_scroll: 0,
            source_viewport_height: 0,
            findings_viewport_height: 0,
            discussion_viewport_height: 0,
            source_pct: 55,
            panel_rects: [Rect::default(); 3],
            input: String::new(),
            commit_message: String::new(),
            source_lines: Vec::new(),
            unit_offsets: Vec::new(),
            notice: None,
            terminated: false,
        };
        // A seeded session already has units and findings.
        state.refresh_source();
        state.select_first_finding();
        state
    }

    // ---------------------------------------------------------------------
    // Consumer loop
    // ---------------------------------------------------------------------

    /// Runs one session tick and refreshes whatever the applied event changed.
    pub fn on_tick(&mut self) -> Tick {
        let tick = self.session.tick();
        match tick {
            Tick::Applied(Applied::UnitsReady | Applied::NoChanges) => {
                self.refresh_source();
            }
            Tick::Applied(Applied::Complete) => {
                self.refresh_source();
                self.select_first_finding();
            }
            Tick::Applied(Applied::ChatReply) => {
                self.discussion_scroll = u16::MAX;
            }
            _ => {}
        }
        tick
    }

    fn refresh_source(&mut self) {
        let rendered = highlight::render_units(self.session.units(), &self.theme);
        self.source_lines = rendered.lines;
        self.unit_offsets = rendered.unit_offsets;
        self.source_scroll = self.source_scroll.min(self.source_lines.len().saturating_sub(1));
    }

    fn select_first_finding(&mut self) {
        if self.session.findings().is_empty() {
            self.findings_state.select(None);
        } else {
            self.findings_state.select(Some(0));
            self.sync_selection();
        }
    }

    // ---------------------------------------------------------------------
    // Findings
    // ---------------------------------------------------------------------

    pub fn selected_finding(&self) -> Option<&Finding> {
        self.findings_state
            .selected()
            .and_then(|i| self.session.findings().get(i))
    }

    /// Scrolls the source panel to the selected finding's unit, and to its
    /// line for full-file units, and resets the discussion scroll.
    pub fn sync_selection(&mut self) {
        self.discussion_scroll = 0;
        let Some(finding) = self.selected_finding() else {
            return;
        };
        let units = self.session.units();
        let Some(unit_index) = units.iter().position(|u| u.identifier == finding.source) else {
            return;
        };
        let Some(&offset) = self.unit_offsets.get(unit_index) else {
            return;
        };
        let line = match (units[unit_index].kind, finding.line_number) {
            // Line n sits at offset + n (the header is at offset). Keep two
            // rows of lead above it.
            (UnitKind::FullFile, Some(n)) => (offset + n as usize).saturating_sub(2),
            _ => offset,
        };
        self.source_scroll = line.min(self.source_lines.len().saturating_sub(1));
    }

    pub fn select_next_finding(&mut self, by: u16) {
        let len = self.session.findings().len();
        if len == 0 {
            return;
        }
        let next = self
            .findings_state
            .selected()
            .map_or(0, |i| (i + by as usize).min(len - 1));
        self.findings_state.select(Some(next));
        self.sync_selection();
    }

    pub fn select_prev_finding(&mut self, by: u16) {
        if self.session.findings().is_empty() {
            return;
        }
        let prev = self
            .findings_state
            .selected()
            .map_or(0, |i| i.saturating_sub(by as usize));
        self.findings_state.select(Some(prev));
        self.sync_selection();
    }

    // ---------------------------------------------------------------------
    // Scrolling
    // ---------------------------------------------------------------------

    pub fn scroll_down(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Source => {
                let max = self.source_lines.len().saturating_sub(1);
                self.source_scroll = (self.source_scroll + lines as usize).min(max);
            }
            PanelFocus::Findings => self.select_next_finding(lines),
            PanelFocus::Discussion => {
                self.discussion_scroll = self.discussion_scroll.saturating_add(lines);
            }
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Source => {
                self.source_scroll = self.source_scroll.saturating_sub(lines as usize);
            }
            PanelFocus::Findings => self.select_prev_finding(lines),
            PanelFocus::Discussion => {
                self.discussion_scroll = self.discussion_scroll.saturating_sub(lines);
            }
        }
    }

    pub fn scroll_top(&mut self) {
        match self.focus {
            PanelFocus::Source => self.source_scroll = 0,
            PanelFocus::Findings => {
                if !self.session.findings().is_empty() {
                    self.findings_state.select(Some(0));
                    self.sync_selection();
                }
            }
            PanelFocus::Discussion => self.discussion_scroll = 0,
        }
    }

    pub fn scroll_bottom(&mut self) {
        match self.focus {
            PanelFocus::Source => {
                self.source_scroll = self.source_lines.len().saturating_sub(1);
            }
            PanelFocus::Findings => {
                let len = self.session.findings().len();
                if len > 0 {
                    self.findings_state.select(Some(len - 1));
                    self.sync_selection();
                }
            }
            // The renderer clamps.
            PanelFocus::Discussion => self.discussion_scroll = u16::MAX,
        }
    }

    fn focused_viewport_height(&self) -> u16 {
        match self.focus {
            PanelFocus::Source => self.source_viewport_height,
            PanelFocus::Findings => self.findings_viewport_height,
            PanelFocus::Discussion => self.discussion_viewport_height,
        }
    }

    /// Half the focused panel's height from the previous frame; at least 1.
    pub fn half_page_down(&mut self) {
        self.scroll_down((self.focused_viewport_height() / 2).max(1));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up((self.focused_viewport_height() / 2).max(1));
    }

    /// Shrinks the source panel by 5%, down to 20%.
    pub fn shrink_source_panel(&mut self) {
        self.source_pct = self.source_pct.saturating_sub(5).max(20);
    }

    /// Grows the source panel by 5%, up to 80%.
    pub fn grow_source_panel(&mut self) {
        self.source_pct = (self.source_pct + 5).min(80);
    }

    // ---------------------------------------------------------------------
    // Actions
    // ---------------------------------------------------------------------

    pub fn start_review(&mut self) {
        match self.session.start_review(self.review_mode) {
            Ok(()) => {
                self.findings_state.select(None);
                self.source_scroll = 0;
                self.discussion_scroll = 0;
            }
            Err(rejected) => self.notice = Some(format!("Cannot start review: {rejected}.")),
        }
    }

    pub fn toggle_review_mode(&mut self) {
        self.review_mode = self.review_mode.toggled();
        self.notice = Some(format!(
            "Next review: {}. Press r to run it.",
            self.review_mode.label()
        ));
    }

    /// Sends the input buffer as a chat turn for the selected finding.
    pub fn send_chat(&mut self) {
        let Some(id) = self.selected_finding().map(|f| f.id) else {
            self.notice = Some("Select a finding first.".to_owned());
            return;
        };
        match self.session.send_chat(id, &self.input) {
            Ok(()) => {
                self.input.clear();
                self.mode = Mode::Normal;
                self.discussion_scroll = u16::MAX;
            }
            Err(rejected) => self.notice = Some(format!("Not sent: {rejected}.")),
        }
    }

    /// Applies the commit gate. Depending on the decision this proceeds,
    /// asks for confirmation, or refuses with a notice.
    pub fn request_commit(&mut self) {
        match self.session.phase() {
            ReviewPhase::Running => {
                self.notice = Some("Review still running.".to_owned());
                return;
            }
            ReviewPhase::Failed(_) => {
                self.notice = Some("Review failed. Re-run with r or abort with q.".to_owned());
                return;
            }
            ReviewPhase::NotStarted => {
                self.notice = Some("Run a review first (r).".to_owned());
                return;
            }
            ReviewPhase::Finished => {}
        }
        if self.session.units().is_empty() {
            self.notice = Some("Nothing staged to commit.".to_owned());
            return;
        }

        match self.session.decision() {
            CommitDecision::Blocked => {
                self.notice =
                    Some("Commit blocked by CRITICAL findings. Discuss, fix or abort.".to_owned());
            }
            CommitDecision::AllowedWithSuggestions => self.mode = Mode::ConfirmCommit,
            CommitDecision::Allowed => self.proceed_with_commit(),
        }
    }

    /// Gate already passed (or overridden).
    pub fn proceed_with_commit(&mut self) {
        match self.launch {
            Launch::Hook => {
                self.mode = Mode::Normal;
                self.session.set_status("Proceeding with commit...");
                self.session.request_shutdown(EXIT_PROCEED);
            }
            Launch::Standalone { .. } => {
                self.mode = Mode::CommitMessage;
            }
        }
    }

    /// Creates the commit from the typed message (standalone sessions).
    pub fn submit_commit_message(&mut self) {
        let Launch::Standalone { workdir } = &self.launch else {
            return;
        };
        if self.commit_message.trim().is_empty() {
            self.notice = Some("Commit message is empty.".to_owned());
            return;
        }
        match commit::commit_index(workdir, &self.commit_message) {
            Ok(oid) => {
                self.mode = Mode::Normal;
                self.session
                    .set_status(format!("Committed {}.", commit::short_id(oid)));
                self.session.request_shutdown(EXIT_PROCEED);
            }
            Err(e) => {
                tracing::error!(error = %e, "commit failed");
                self.notice = Some(format!("Commit failed: {}", e.message()));
            }
        }
    }

    pub fn abort(&mut self) {
        self.session.set_status("Aborting...");
        self.session.request_shutdown(EXIT_ABORT);
    }

    /// Forwards SIGTERM to the session once.
    pub fn on_terminate(&mut self) {
        if !self.terminated {
            self.terminated = true;
            tracing::info!("SIGTERM received");
            self.session.request_shutdown(EXIT_ABORT);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use hookrev_core::worker::enrich;
    use hookrev_core::{
        InferenceClient, InferenceError, ModelBackend, RawFinding, ReviewUnit, Severity,
        SourceError, StagedSource,
    };

    use super::*;
    use crate::git::testutil::{init_repo, stage};

    struct NoIndex;

    impl StagedSource for NoIndex {
        fn list_staged_filenames(&self) -> Result<Vec<String>, SourceError> {
            Ok(Vec::new())
        }
        fn staged_diff(&self) -> Result<String, SourceError> {
            Ok(String::new())
        }
        fn staged_file_content(&self, _: &str) -> Result<String, SourceError> {
            Ok(String::new())
        }
    }

    struct Offline;

    #[async_trait]
    impl ModelBackend for Offline {
        async fn generate(&self, _: &str, _: &str, _: bool) -> Result<String, InferenceError> {
            Err(InferenceError::Transport("offline".into()))
        }
    }

    pub(crate) fn seeded_state(launch: Launch, severities: &[Severity]) -> AppState {
        let client = InferenceClient::new(Arc::new(Offline), "test");
        let mut session = ReviewSession::new(Arc::new(NoIndex), client);
        let units = vec![
            ReviewUnit::full_file("a.py", "l1\nl2\nl3\nl4\nl5\nl6\nl7\nl8"),
            ReviewUnit::full_file("b.py", "m1\nm2"),
        ];
        let findings = severities
            .iter()
            .enumerate()
            .map(|(i, &severity)| {
                let unit = &units[i % 2];
                enrich(unit, true, RawFinding { severity, line_number: Some(6), message: format!("f{i}") })
            })
            .collect();
        session.seed(units, findings);
        AppState::new(session, launch, Theme::dark(), ReviewMode::Diff)
    }

    fn drain(state: &mut AppState) -> Tick {
        for _ in 0..10 {
            let tick = state.on_tick();
            if let Tick::ShuttingDown(_) = tick {
                return tick;
            }
        }
        Tick::Empty
    }

    #[test]
    fn seeded_state_selects_first_finding_and_scrolls_to_it() {
        let state = seeded_state(Launch::Hook, &[Severity::Suggestion]);
        assert_eq!(state.findings_state.selected(), Some(0));
        // a.py header at 0, line 6 at index 6, two rows of lead.
        assert_eq!(state.source_scroll, 4);
    }

    #[test]
    fn selecting_a_finding_in_another_unit_jumps_there() {
        let mut state = seeded_state(Launch::Hook, &[Severity::Suggestion, Severity::Suggestion]);
        state.select_next_finding(1);
        // b.py has only two lines; the scroll is clamped to the content.
        let b_offset = state.unit_offsets[1];
        assert!(state.source_scroll >= b_offset);
        assert!(state.source_scroll < state.source_lines.len());
    }

    #[test]
    fn clean_review_in_hook_mode_proceeds_with_zero() {
        let mut state = seeded_state(Launch::Hook, &[]);
        state.request_commit();
        assert_eq!(drain(&mut state), Tick::ShuttingDown(EXIT_PROCEED));
    }

    #[test]
    fn suggestions_need_confirmation() {
        let mut state = seeded_state(Launch::Hook, &[Severity::Suggestion]);
        state.request_commit();
        assert_eq!(state.mode, Mode::ConfirmCommit);
        assert_eq!(state.on_tick(), Tick::Empty);

        state.proceed_with_commit();
        assert_eq!(drain(&mut state), Tick::ShuttingDown(EXIT_PROCEED));
    }

    #[test]
    fn critical_finding_refuses_commit() {
        let mut state = seeded_state(Launch::Hook, &[Severity::Suggestion, Severity::Critical]);
        state.request_commit();
        assert_eq!(state.mode, Mode::Normal);
        assert!(state.notice.as_deref().unwrap().contains("blocked"));
        assert_eq!(state.on_tick(), Tick::Empty);
    }

    #[test]
    fn abort_exits_with_one() {
        let mut state = seeded_state(Launch::Hook, &[Severity::Critical]);
        state.abort();
        assert_eq!(drain(&mut state), Tick::ShuttingDown(EXIT_ABORT));
    }

    #[test]
    fn sigterm_is_forwarded_once() {
        let mut state = seeded_state(Launch::Hook, &[]);
        state.on_terminate();
        state.on_terminate();
        assert_eq!(drain(&mut state), Tick::ShuttingDown(EXIT_ABORT));
    }

    #[test]
    fn standalone_commit_creates_a_commit_then_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        stage(&repo, "a.py", "x = 1\n");

        let launch = Launch::Standalone { workdir: dir.path().to_path_buf() };
        let mut state = seeded_state(launch, &[]);
        state.request_commit();
        assert_eq!(state.mode, Mode::CommitMessage);

        state.commit_message = "Add a.py".into();
        state.submit_commit_message();
        assert!(state.session.status().starts_with("Committed "));
        assert_eq!(drain(&mut state), Tick::ShuttingDown(EXIT_PROCEED));

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.message(), Some("Add a.py"));
    }

    #[test]
    fn empty_commit_message_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let launch = Launch::Standalone { workdir: dir.path().to_path_buf() };
        let mut state = seeded_state(launch, &[]);
        state.mode = Mode::CommitMessage;
        state.submit_commit_message();
        assert_eq!(state.mode, Mode::CommitMessage);
        assert!(state.notice.is_some());
    }

    #[test]
    fn panel_resize_is_clamped() {
        let mut state = seeded_state(Launch::Hook, &[]);
        for _ in 0..20 {
            state.grow_source_panel();
        }
        assert_eq!(state.source_pct, 80);
        for _ in 0..20 {
            state.shrink_source_panel();
        }
        assert_eq!(state.source_pct, 20);
    }
}
