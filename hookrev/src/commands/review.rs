//! `hookrev review`: standalone interactive review of the index.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use hookrev_core::{ReviewMode, ReviewSession};

use super::Context;
use crate::app::{AppState, Launch};
use crate::git::{discover_workdir, staged::GitStaged};
use crate::runner;

#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Review every staged file in full instead of the diff
    #[arg(long)]
    pub full_files: bool,
}

impl ReviewArgs {
    fn mode(&self, ctx: &Context) -> ReviewMode {
        if self.full_files {
            ReviewMode::FullFile
        } else {
            ctx.config.initial_mode()
        }
    }

    /// Opens the TUI with a review already running. Committing from the UI
    /// creates the commit here, without re-running hooks.
    pub async fn execute(&self, ctx: &Context) -> Result<i32> {
        let workdir = discover_workdir(&std::env::current_dir()?)?;
        let source = Arc::new(GitStaged::new(workdir.clone()));
        let session = ReviewSession::new(source, ctx.client());

        let mode = self.mode(ctx);
        tracing::info!(workdir = %workdir.display(), mode = mode.label(), "standalone review");
        let mut state = AppState::new(session, Launch::Standalone { workdir }, ctx.theme(), mode);
        state.start_review();
        runner::run_tui(state, ctx.config.tick_interval()).await
    }
}
