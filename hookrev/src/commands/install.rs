//! `hookrev install`: writes the pre-commit hook.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use crate::git::hook::{self, InstallOutcome};

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Repository to install into (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Replace an existing pre-commit hook, keeping a backup
    #[arg(short, long)]
    pub force: bool,
}

impl InstallArgs {
    pub fn execute(&self) -> Result<i32> {
        let start = match &self.path {
            Some(p) => p.clone(),
            None => std::env::current_dir()?,
        };
        let program = std::env::current_exe().context("locating the hookrev executable")?;

        match hook::install(&start, &program, self.force)? {
            InstallOutcome::Installed { hook, backup } => {
                if let Some(backup) = backup {
                    println!("Previous hook saved to {}", backup.display());
                }
                println!("Installed {}", hook.display());
                Ok(0)
            }
            InstallOutcome::AlreadyPresent(hook) => {
                eprintln!(
                    "A pre-commit hook already exists at {}. Re-run with --force to replace it.",
                    hook.display()
                );
                Ok(1)
            }
        }
    }
}
