//! `hookrev check`: environment diagnostics, one line per check.

use std::path::Path;

use anyhow::Result;

use super::Context;
use crate::git::{discover_workdir, hook};

struct Report {
    all_passed: bool,
}

impl Report {
    fn line(&mut self, passed: bool, label: &str, detail: impl AsRef<str>) {
        let mark = if passed { "✓" } else { "✗" };
        println!("{mark} {label}: {}", detail.as_ref());
        self.all_passed &= passed;
    }

    /// Printed without affecting the result.
    fn info(&self, label: &str, detail: impl AsRef<str>) {
        println!("  {label}: {}", detail.as_ref());
    }
}

pub async fn execute(ctx: &Context) -> Result<i32> {
    let mut report = Report { all_passed: true };

    match discover_workdir(&std::env::current_dir()?) {
        Ok(workdir) => {
            report.line(true, "git repository", workdir.display().to_string());
            let installed = if hook::is_installed(&workdir) { "yes" } else { "no" };
            report.info("pre-commit hook installed", installed);
        }
        Err(e) => report.line(false, "git repository", e.message()),
    }

    match &ctx.config_warning {
        Some(warning) => report.line(false, "config", warning),
        None => report.line(true, "config", config_detail(&ctx.config_path)),
    }

    let backend = ctx.backend();
    let model = &ctx.config.model.name;
    match backend.list_models().await {
        Ok(models) => {
            report.line(true, "ollama", backend.base_url());
            let installed = model_installed(&models, model);
            let detail = if installed {
                model.clone()
            } else {
                format!("{model} not found (run `ollama pull {model}`)")
            };
            report.line(installed, "model", detail);
        }
        Err(e) => {
            report.line(false, "ollama", format!("{} unreachable: {e}", backend.base_url()));
            report.line(false, "model", format!("{model} (not checked)"));
        }
    }

    Ok(if report.all_passed { 0 } else { 1 })
}

fn config_detail(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    }
}

/// Ollama lists untagged pulls as `name:latest`.
fn model_installed(models: &[String], wanted: &str) -> bool {
    models
        .iter()
        .any(|m| m == wanted || m.strip_suffix(":latest") == Some(wanted))
}
