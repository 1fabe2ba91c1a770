//! Interfaces to the subsystems a turn may hand work to.
//!
//! The pipeline never calls these. The session does, after dispatch, and
//! turns every failure into a value it can show.

use crate::core::error::AkiError;
use crate::core::output::compact_line;
use crate::core::record::LogEntry;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Produces a reply for a plain turn.
pub trait ResponseGenerator {
    fn generate(&self, system_prompt: &str, content: &str) -> Result<String, AkiError>;
}

/// Runs untrusted code with a deadline.
pub trait Sandbox {
    fn execute(&self, code: &str, timeout: Duration) -> SandboxOutcome;
}

pub trait SearchBackend {
    fn search(&self, query: &str, databases: &[String]) -> Result<Vec<SearchHit>, AkiError>;
}

/// Append-only journal writer.
pub trait LogSink {
    fn append(&self, entry: &LogEntry) -> Result<(), AkiError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxOutcome {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub timed_out: bool,
    pub error: Option<String>,
}

impl SandboxOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn timed_out(after: Duration) -> Self {
        Self {
            timed_out: true,
            error: Some(format!("Execution timeout ({}s)", after.as_secs())),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Stand-in generator: shows what would be sent to a model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextPreview {
    pub verbose: bool,
}

impl ResponseGenerator for ContextPreview {
    fn generate(&self, system_prompt: &str, content: &str) -> Result<String, AkiError> {
        if self.verbose {
            return Ok(format!("{}\n\nUSER: {}", system_prompt, content));
        }
        let persona_line = system_prompt
            .lines()
            .find(|l| l.starts_with("CURRENT PERSONA:"))
            .unwrap_or("CURRENT PERSONA: General assistant");
        Ok(format!(
            "[no model attached] {} | query: {}",
            persona_line,
            compact_line(content, 80)
        ))
    }
}

/// Search backend for offline sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSearch;

impl SearchBackend for OfflineSearch {
    fn search(&self, query: &str, databases: &[String]) -> Result<Vec<SearchHit>, AkiError> {
        Err(AkiError::CollaboratorUnavailable(format!(
            "no search backend configured for {:?} across {} database(s)",
            compact_line(query, 40),
            databases.len()
        )))
    }
}
