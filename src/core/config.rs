//! `aki.toml` configuration.

use crate::core::error::AkiError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "aki.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AkiConfig {
    pub local_server: String,
    pub local_model: String,
    pub remote_server: String,
    pub show_model_info: bool,
    pub show_server_info: bool,
    pub enable_sandbox: bool,
    /// Interpreter the sandbox runs; the code is appended after `sandbox_args`.
    pub sandbox_program: String,
    pub sandbox_args: Vec<String>,
    pub sandbox_timeout_secs: u64,
    pub log_file: PathBuf,
    pub log_encrypted: bool,
    pub dictionary_file: PathBuf,
    pub debug: bool,
    pub academic_databases: Vec<String>,
    pub juridical_databases: Vec<String>,
}

impl Default for AkiConfig {
    fn default() -> Self {
        Self {
            local_server: "ollama".to_string(),
            local_model: "deepseek".to_string(),
            remote_server: String::new(),
            show_model_info: true,
            show_server_info: true,
            enable_sandbox: false,
            sandbox_program: "python3".to_string(),
            sandbox_args: vec!["-c".to_string()],
            sandbox_timeout_secs: 5,
            log_file: PathBuf::from("aki.log"),
            log_encrypted: true,
            dictionary_file: PathBuf::from("dictionary.json"),
            debug: false,
            academic_databases: vec![
                "openedition.org".to_string(),
                "wikipedia.org".to_string(),
                "archive.org".to_string(),
            ],
            juridical_databases: vec!["legifrance.fr".to_string()],
        }
    }
}

impl AkiConfig {
    pub fn sandbox_timeout(&self) -> Duration {
        Duration::from_secs(self.sandbox_timeout_secs.max(1))
    }

    pub fn from_toml(content: &str) -> Result<Self, AkiError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, AkiError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Read `path`; a missing file yields the defaults without touching disk.
    pub fn load(path: &Path) -> Result<Self, AkiError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| AkiError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Read `path`, or write the defaults there first when it is missing.
    /// Returns the config and whether the file was created.
    pub fn load_or_create(path: &Path) -> Result<(Self, bool), AkiError> {
        if path.exists() {
            return Ok((Self::load(path)?, false));
        }

        let config = Self::default();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, config.to_toml()?)?;
        tracing::info!(path = %path.display(), "created default config");
        Ok((config, true))
    }

    /// Resolve relative file settings against the directory holding the
    /// config file.
    pub fn rebase(mut self, config_path: &Path) -> Self {
        let Some(dir) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return self;
        };
        for p in [&mut self.log_file, &mut self.dictionary_file] {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        }
        self
    }
}
