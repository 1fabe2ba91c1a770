//! Doctor: read-only prerequisite checks.
//!
//! Probes the external tools the h@cky terminal can hand work to, plus the
//! local config and journal files. Nothing here installs or modifies
//! anything; missing tools are warnings because the core runs without them.

use crate::core::config::AkiConfig;
use crate::core::tui::{self, ItemStatus};
use crate::plugins::journal::Journal;
use crate::plugins::sandbox::command_exists;
use serde::Serialize;
use std::path::Path;

pub const INSTALL_GUIDE: &str = "\
=== PREREQUISITES INSTALLATION GUIDE ===

1. Homebrew (macOS package manager):
   /bin/bash -c \"$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)\"

2. Ollama (local LLM server):
   brew install ollama
   ollama pull deepseek

3. Tor Browser:
   brew install --cask tor-browser

4. nmap (network scanner):
   brew install nmap

5. Python 3 and pip (sandbox interpreter):
   brew install python

6. ChromeDriver:
   brew install --cask chromedriver
";

/// Tools probed by name; any one of the candidates is enough.
const TOOLS: &[(&str, &[&str])] = &[
    ("python", &["python3"]),
    ("pip", &["pip3", "pip"]),
    ("ollama", &["ollama"]),
    ("tor", &["tor"]),
    ("nmap", &["nmap"]),
    ("chromedriver", &["chromedriver"]),
    ("homebrew", &["brew"]),
];

#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl DoctorReport {
    fn from_checks(checks: Vec<CheckResult>) -> Self {
        let count = |s: CheckStatus| checks.iter().filter(|c| c.status == s).count();
        Self {
            passed: count(CheckStatus::Pass),
            failed: count(CheckStatus::Fail),
            warnings: count(CheckStatus::Warn),
            checks,
        }
    }

    pub fn all_ok(&self) -> bool {
        self.failed == 0 && self.warnings == 0
    }

    pub fn render_text(&self) -> String {
        let mut out = vec![tui::section("h@cky doctor: prerequisite checks")];
        for check in &self.checks {
            let status = match check.status {
                CheckStatus::Pass => ItemStatus::Pass,
                CheckStatus::Warn => ItemStatus::Warn,
                CheckStatus::Fail => ItemStatus::Fail,
            };
            out.push(tui::status_line(
                &format!("{}: {}", check.name, check.message),
                status,
            ));
        }
        out.push(String::new());
        out.push(tui::mini_status(self.passed, self.warnings, self.failed));
        out.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    fn new(name: impl Into<String>, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Warn,
}

pub fn run_checks(config_path: &Path, config: &AkiConfig) -> DoctorReport {
    let mut checks = vec![check_version()];
    checks.extend(
        TOOLS
            .iter()
            .map(|(name, candidates)| check_tool(name, candidates, command_exists)),
    );
    checks.push(check_config(config_path));
    checks.push(check_journal(config));
    checks.push(check_sandbox(config, command_exists));
    DoctorReport::from_checks(checks)
}

fn check_version() -> CheckResult {
    CheckResult::new(
        "Version",
        CheckStatus::Pass,
        format!("aki v{}", env!("CARGO_PKG_VERSION")),
    )
}

fn check_tool(name: &str, candidates: &[&str], exists: impl Fn(&str) -> bool) -> CheckResult {
    match candidates.iter().find(|c| exists(**c)) {
        Some(found) => CheckResult::new(name, CheckStatus::Pass, format!("found `{}`", found)),
        None => CheckResult::new(
            name,
            CheckStatus::Warn,
            format!("not found (looked for {})", candidates.join(", ")),
        ),
    }
}

fn check_config(config_path: &Path) -> CheckResult {
    if !config_path.is_file() {
        return CheckResult::new(
            "Config",
            CheckStatus::Pass,
            format!("{} absent (using defaults)", config_path.display()),
        );
    }
    match std::fs::read_to_string(config_path) {
        Ok(content) => match AkiConfig::from_toml(&content) {
            Ok(_) => CheckResult::new(
                "Config",
                CheckStatus::Pass,
                format!("{} is valid", config_path.display()),
            ),
            Err(e) => CheckResult::new("Config", CheckStatus::Fail, e.to_string()),
        },
        Err(e) => CheckResult::new(
            "Config",
            CheckStatus::Fail,
            format!("cannot read {}: {}", config_path.display(), e),
        ),
    }
}

fn check_journal(config: &AkiConfig) -> CheckResult {
    if !config.log_file.exists() {
        return CheckResult::new(
            "Journal",
            CheckStatus::Pass,
            format!("{} (created on first turn)", config.log_file.display()),
        );
    }
    let journal = match Journal::from_config(config) {
        Ok(j) => j,
        Err(e) => return CheckResult::new("Journal", CheckStatus::Fail, e.to_string()),
    };
    match journal.read(None) {
        Ok(entries) => CheckResult::new(
            "Journal",
            CheckStatus::Pass,
            format!(
                "{} readable entr{} ({})",
                entries.len(),
                if entries.len() == 1 { "y" } else { "ies" },
                if config.log_encrypted { "obfuscated" } else { "plain" }
            ),
        ),
        Err(e) => CheckResult::new("Journal", CheckStatus::Fail, e.to_string()),
    }
}

fn check_sandbox(config: &AkiConfig, exists: impl Fn(&str) -> bool) -> CheckResult {
    if !config.enable_sandbox {
        return CheckResult::new("Sandbox", CheckStatus::Pass, "disabled");
    }
    if exists(config.sandbox_program.as_str()) {
        CheckResult::new(
            "Sandbox",
            CheckStatus::Pass,
            format!(
                "`{}` with {}s timeout",
                config.sandbox_program, config.sandbox_timeout_secs
            ),
        )
    } else {
        CheckResult::new(
            "Sandbox",
            CheckStatus::Fail,
            format!("enabled but `{}` is not runnable", config.sandbox_program),
        )
    }
}
