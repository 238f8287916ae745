//! Configuration for hookrev.
//!
//! Loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (`HOOKREV_MODEL`, `HOOKREV_OLLAMA_URL`)
//! 3. Config file (`$XDG_CONFIG_HOME/hookrev/config.toml`)
//! 4. Default values
//!
//! A malformed file is a soft failure: the caller gets defaults plus a
//! warning, so a typo never blocks a commit.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ollama::DEFAULT_OLLAMA_URL;
use crate::types::ReviewMode;

pub const ENV_MODEL: &str = "HOOKREV_MODEL";
pub const ENV_OLLAMA_URL: &str = "HOOKREV_OLLAMA_URL";

/// Ticks faster than this would just spin.
const MIN_TICK_MS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model tag as known to the inference server.
    pub name: String,
    /// Base URL of the Ollama server.
    pub url: String,
    /// Per-request timeout. Local models on a CPU can take minutes.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "llama3:8b".to_owned(),
            url: DEFAULT_OLLAMA_URL.to_owned(),
            timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Start standalone reviews in full-file mode.
    pub full_files: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: String,
    /// Consumer-loop cadence in milliseconds.
    pub tick_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { theme: "catppuccin-mocha".to_owned(), tick_ms: 100 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub review: ReviewConfig,
    pub ui: UiConfig,
}

impl Config {
    /// `$XDG_CONFIG_HOME/hookrev/config.toml`, falling back to
    /// `~/.config/hookrev/config.toml`.
    pub fn default_config_path() -> PathBuf {
        xdg_dir("XDG_CONFIG_HOME", ".config").join("hookrev").join("config.toml")
    }

    /// Strict load. A missing file is not an error and yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("parse error in {}: {e}", path.display())))
    }

    /// Soft load: any failure is returned as a warning next to the defaults.
    pub fn load_or_default(path: &Path) -> (Self, Option<String>) {
        match Self::load_from_file(path) {
            Ok(config) => (config, None),
            Err(e) => {
                tracing::warn!(error = %e, "config ignored, using defaults");
                (Self::default(), Some(e.to_string()))
            }
        }
    }

    /// Applies `HOOKREV_MODEL` and `HOOKREV_OLLAMA_URL` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.is_empty()) {
            self.model.name = model;
        }
        if let Some(url) = lookup(ENV_OLLAMA_URL).filter(|v| !v.is_empty()) {
            self.model.url = url;
        }
        self
    }

    pub fn with_cli_overrides(mut self, model: Option<String>, url: Option<String>) -> Self {
        if let Some(m) = model {
            self.model.name = m;
        }
        if let Some(u) = url {
            self.model.url = u;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.model.timeout_secs.max(1))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.ui.tick_ms.max(MIN_TICK_MS))
    }

    pub fn initial_mode(&self) -> ReviewMode {
        if self.review.full_files {
            ReviewMode::FullFile
        } else {
            ReviewMode::Diff
        }
    }
}

/// Resolves an XDG base directory from `var`, falling back to
/// `$HOME/<home_relative>`, then to `<home_relative>` itself.
pub fn xdg_dir(var: &str, home_relative: &str) -> PathBuf {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(home_relative)))
        .unwrap_or_else(|| PathBuf::from(home_relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.model.name, "llama3:8b");
        assert_eq!(config.model.url, "http://localhost:11434");
        assert_eq!(config.ui.tick_ms, 100);
        assert_eq!(config.initial_mode(), ReviewMode::Diff);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[model]
name = "codellama:7b"

[review]
full_files = true
"#,
        )
        .unwrap();
        assert_eq!(config.model.name, "codellama:7b");
        assert_eq!(config.model.timeout_secs, 300);
        assert_eq!(config.ui.theme, "catppuccin-mocha");
        assert_eq!(config.initial_mode(), ReviewMode::FullFile);
    }

    #[test]
    fn missing_file_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_file(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_file_is_soft_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model\nname = ").unwrap();

        assert!(matches!(Config::load_from_file(&path), Err(Error::Config(_))));
        let (config, warning) = Config::load_or_default(&path);
        assert_eq!(config, Config::default());
        assert!(warning.unwrap().contains("config.toml"));
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file: Config = toml::from_str("[model]\nname = \"from-file\"\nurl = \"http://file\"").unwrap();
        let env = |key: &str| match key {
            ENV_MODEL => Some("from-env".to_owned()),
            ENV_OLLAMA_URL => Some("http://env".to_owned()),
            _ => None,
        };

        let config = file.clone().with_env_from(env);
        assert_eq!(config.model.name, "from-env");
        assert_eq!(config.model.url, "http://env");

        let config = config.with_cli_overrides(Some("from-cli".into()), None);
        assert_eq!(config.model.name, "from-cli");
        assert_eq!(config.model.url, "http://env");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config = Config::default().with_env_from(|_| Some(String::new()));
        assert_eq!(config.model, ModelConfig::default());
    }

    #[test]
    fn tick_interval_has_a_floor() {
        let mut config = Config::default();
        config.ui.tick_ms = 0;
        assert_eq!(config.tick_interval(), Duration::from_millis(MIN_TICK_MS));
    }
}
