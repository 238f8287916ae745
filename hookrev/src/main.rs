//! hookrev: a pre-commit gate that reviews staged changes with a local LLM.
//!
//! Entry point for the `hookrev` binary. Parses the CLI, starts file
//! logging, resolves configuration (CLI > env > file > defaults) and
//! dispatches to a subcommand. Every subcommand yields an exit code; the
//! process exits with it after the log guard has flushed.

mod app;
mod commands;
mod event;
mod git;
mod logging;
mod runner;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hookrev_core::Config;

use commands::{Context, InstallArgs, ReviewArgs};

/// Reviews staged changes with a local model before they are committed
#[derive(Parser, Debug)]
#[command(name = "hookrev")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Model to use (overrides config and HOOKREV_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Ollama server URL (overrides config and HOOKREV_OLLAMA_URL)
    #[arg(long, global = true)]
    ollama_url: Option<String>,

    /// Config file location
    #[arg(long, global = true, env = "HOOKREV_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as the pre-commit hook (installed by `hookrev install`)
    Hook,

    /// Review the staged changes interactively and commit from the UI
    #[command(visible_alias = "r")]
    Review(ReviewArgs),

    /// Install the pre-commit hook into a repository
    Install(InstallArgs),

    /// Check git, config, Ollama and the configured model
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_guard = match logging::init() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("hookrev: logging disabled: {e:#}");
            None
        }
    };

    let config_path = cli.config.clone().unwrap_or_else(Config::default_config_path);
    let (config, config_warning) = Config::load_or_default(&config_path);
    if let Some(warning) = &config_warning {
        eprintln!("hookrev: {warning}; using defaults");
    }
    let config = config
        .with_env_overrides()
        .with_cli_overrides(cli.model.clone(), cli.ollama_url.clone());
    tracing::info!(
        model = %config.model.name,
        url = %config.model.url,
        config = %config_path.display(),
        "configuration loaded"
    );

    let ctx = Context { config, config_path, config_warning };
    let result = match &cli.command {
        Commands::Hook => commands::hook::execute(&ctx).await,
        Commands::Review(args) => args.execute(&ctx).await,
        Commands::Install(args) => args.execute(),
        Commands::Check => commands::check::execute(&ctx).await,
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "command failed");
            eprintln!("hookrev: {e:#}");
            app::EXIT_ABORT
        }
    };

    // process::exit skips destructors.
    drop(log_guard);
    std::process::exit(code);
}
