//! Journal records.
//!
//! The core only builds these; writing them is the job of a
//! [`LogSink`](crate::core::collaborators::LogSink).

use crate::core::output::compact_line;
use crate::core::time::now_iso8601;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Characters of query/response text shown by [`LogEntry::display_line`].
const DISPLAY_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    #[serde(flatten)]
    pub body: LogBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogBody {
    Query {
        query: String,
        persona: String,
        tone: String,
        output_type: String,
        commands: Vec<String>,
    },
    Response {
        response: String,
        persona: String,
    },
    Event {
        event_type: String,
        #[serde(default)]
        data: Value,
    },
    Error {
        error_type: String,
        error_message: String,
        #[serde(default)]
        context: Value,
    },
}

impl LogEntry {
    pub fn now(body: LogBody) -> Self {
        Self {
            timestamp: now_iso8601(),
            body,
        }
    }

    pub fn event(event_type: &str, data: Value) -> Self {
        Self::now(LogBody::Event {
            event_type: event_type.to_string(),
            data,
        })
    }

    pub fn error(error_type: &str, error_message: &str, context: Value) -> Self {
        Self::now(LogBody::Error {
            error_type: error_type.to_string(),
            error_message: error_message.to_string(),
            context,
        })
    }

    pub fn kind(&self) -> &'static str {
        match self.body {
            LogBody::Query { .. } => "query",
            LogBody::Response { .. } => "response",
            LogBody::Event { .. } => "event",
            LogBody::Error { .. } => "error",
        }
    }

    pub fn persona(&self) -> Option<&str> {
        match &self.body {
            LogBody::Query { persona, .. } | LogBody::Response { persona, .. } => Some(persona),
            _ => None,
        }
    }

    /// One-line summary, e.g. `[2026-02-16T05:43:12Z] QUERY (core): what is X`.
    pub fn display_line(&self) -> String {
        let ts = &self.timestamp;
        match &self.body {
            LogBody::Query { query, persona, .. } => {
                format!("[{}] QUERY ({}): {}", ts, persona, compact_line(query, DISPLAY_CHARS))
            }
            LogBody::Response { response, .. } => {
                format!("[{}] RESPONSE: {}", ts, compact_line(response, DISPLAY_CHARS))
            }
            LogBody::Event { event_type, .. } => format!("[{}] EVENT: {}", ts, event_type),
            LogBody::Error {
                error_type,
                error_message,
                ..
            } => format!("[{}] ERROR: {} - {}", ts, error_type, error_message),
        }
    }
}
