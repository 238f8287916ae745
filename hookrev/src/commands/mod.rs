//! CLI command implementations.
//!
//! Each command returns the process exit code; `anyhow` errors are reserved
//! for failures the caller reports and turns into exit code 1.

pub mod check;
pub mod hook;
pub mod install;
pub mod review;

use std::path::PathBuf;
use std::sync::Arc;

use hookrev_core::{Config, InferenceClient, OllamaBackend};

pub use install::InstallArgs;
pub use review::ReviewArgs;

use crate::theme::Theme;

/// Resolved configuration shared by every command.
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    /// Set when the config file existed but could not be used.
    pub config_warning: Option<String>,
}

impl Context {
    pub fn backend(&self) -> OllamaBackend {
        OllamaBackend::new(&self.config.model.url, self.config.request_timeout())
    }

    pub fn client(&self) -> InferenceClient {
        InferenceClient::new(Arc::new(self.backend()), &self.config.model.name)
    }

    pub fn theme(&self) -> Theme {
        Theme::from_name(&self.config.ui.theme)
    }
}
