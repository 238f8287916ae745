//! `hookrev hook`: the pre-commit entry point.
//!
//! Reviews the staged diff before any UI exists. Only when there is
//! something to discuss and a terminal to discuss it on does the TUI open;
//! otherwise the findings are printed and the commit gate decides the exit
//! code.

use std::fmt::Write as _;
use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::Result;
use hookrev_core::{
    decide, review_batch, BatchOutcome, Finding, ReviewMode, ReviewSession, Severity,
    StagedSource,
};

use super::Context;
use crate::app::{AppState, Launch, EXIT_ABORT, EXIT_PROCEED};
use crate::git::{discover_workdir, staged::GitStaged};
use crate::runner;

pub async fn execute(ctx: &Context) -> Result<i32> {
    let workdir = discover_workdir(&std::env::current_dir()?)?;
    let source: Arc<dyn StagedSource> = Arc::new(GitStaged::new(workdir));
    let client = ctx.client();

    eprintln!("hookrev: reviewing staged changes with {}...", client.model());
    let outcome = match review_batch(Arc::clone(&source), &client, ReviewMode::Diff).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "pre-commit review failed");
            eprintln!("hookrev: review failed: {e}");
            return Ok(EXIT_ABORT);
        }
    };

    let (units, findings) = match outcome {
        BatchOutcome::NoChanges => {
            eprintln!("hookrev: no staged changes.");
            return Ok(EXIT_PROCEED);
        }
        BatchOutcome::Reviewed { units, findings } => (units, findings),
    };
    if findings.is_empty() {
        eprintln!("hookrev: no issues found.");
        return Ok(EXIT_PROCEED);
    }

    if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() {
        let mut session = ReviewSession::new(source, client);
        session.seed(units, findings);
        let state = AppState::new(session, Launch::Hook, ctx.theme(), ReviewMode::Diff);
        return runner::run_tui(state, ctx.config.tick_interval()).await;
    }

    let decision = decide(&findings);
    tracing::info!(?decision, count = findings.len(), "no terminal; printing findings");
    eprint!("{}", format_findings(&findings));
    Ok(decision.exit_code())
}

/// Plain-text report for non-interactive runs.
fn format_findings(findings: &[Finding]) -> String {
    let mut out = String::new();
    for f in findings {
        let line = f.line_number.map(|n| format!("L{n} ")).unwrap_or_default();
        let _ = writeln!(out, "[{}] {line}{}", f.severity, f.message);
    }
    let critical = findings.iter().filter(|f| f.severity == Severity::Critical).count();
    if critical > 0 {
        let _ = writeln!(out, "hookrev: commit blocked by {critical} critical finding(s).");
    }
    out
}
