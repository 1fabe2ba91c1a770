//! Turn dispatch.
//!
//! Routes a parsed turn to one of three results: a threat block, a list of
//! command outcomes, or a plain context for response generation. Pure: the
//! successor state is handed back, never stored.

use crate::core::context::{self, ConversationState};
use crate::core::lexicon::{Lexicon, LexiconRef};
use crate::core::parser::CommandDescriptor;
use crate::core::persona::{PersonaRecord, PersonaRegistry};
use crate::core::threat::ThreatAssessment;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

pub const HONEYPOT_MESSAGE: &str =
    "[HONEYPOT] Injection attempt detected. h@cky maintains ethical boundaries.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Explain,
    Get,
    Find,
    Investigate,
    Deepscan,
    Whois,
    Scan,
    Target,
    Decrypt,
    Bamn,
    AcademicSearch,
    JuridicalResearch,
}

impl Command {
    pub const ALL: [Command; 12] = [
        Command::Explain,
        Command::Get,
        Command::Find,
        Command::Investigate,
        Command::Deepscan,
        Command::Whois,
        Command::Scan,
        Command::Target,
        Command::Decrypt,
        Command::Bamn,
        Command::AcademicSearch,
        Command::JuridicalResearch,
    ];

    /// Canonical keyword as written between `>` and `<`.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Explain => "explain",
            Command::Get => "get",
            Command::Find => "find",
            Command::Investigate => "investigate",
            Command::Deepscan => "deepscan",
            Command::Whois => "whois",
            Command::Scan => "scan",
            Command::Target => "target",
            Command::Decrypt => "decrypt",
            Command::Bamn => "bamn",
            Command::AcademicSearch => "academic search",
            Command::JuridicalResearch => "juridical research",
        }
    }

    pub fn from_token(token: &str) -> Option<Command> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(token))
    }

    /// Descriptive attributes reported for a recognized command.
    pub fn fields(&self) -> BTreeMap<String, Value> {
        let pairs: Vec<(&str, Value)> = match self {
            Command::Explain => vec![("mode", json!("metaphor"))],
            Command::Get => vec![("action", json!("fill_database"))],
            Command::Find => vec![("action", json!("internet_search"))],
            Command::Investigate => vec![("depth", json!("deep"))],
            Command::Deepscan => vec![("action", json!("legitimacy_check"))],
            Command::Whois => vec![("tool", json!("nmap"))],
            Command::Scan => vec![("safety", json!("verify_first"))],
            Command::Target => vec![
                ("scan_type", json!("basic_weakness")),
                ("honeypot", json!(true)),
            ],
            Command::Decrypt => vec![("action", json!("verify_truth"))],
            Command::Bamn => vec![("constraint", json!("by_any_means_necessary"))],
            Command::AcademicSearch => vec![(
                "databases",
                json!(["openedition.org", "wikipedia.org", "archive.org"]),
            )],
            Command::JuridicalResearch => vec![(
                "databases",
                json!(["legifrance.fr", "international_law_databases"]),
            )],
        };
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    pub fn requires_search(&self) -> bool {
        matches!(
            self,
            Command::Find
                | Command::Investigate
                | Command::AcademicSearch
                | Command::JuridicalResearch
        )
    }

    pub fn requires_sandbox(&self) -> bool {
        matches!(
            self,
            Command::Scan | Command::Whois | Command::Target | Command::Deepscan
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandOutcome {
    Recognized {
        command: String,
        fields: BTreeMap<String, Value>,
    },
    Unknown {
        command: String,
    },
}

impl CommandOutcome {
    pub fn for_token(token: &str) -> Self {
        match Command::from_token(token) {
            Some(cmd) => CommandOutcome::Recognized {
                command: cmd.name().to_string(),
                fields: cmd.fields(),
            },
            None => CommandOutcome::Unknown {
                command: token.to_string(),
            },
        }
    }

    pub fn command(&self) -> &str {
        match self {
            CommandOutcome::Recognized { command, .. } | CommandOutcome::Unknown { command } => {
                command
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchResult {
    ThreatBlocked {
        assessment: ThreatAssessment,
    },
    CommandExecution {
        outcomes: Vec<CommandOutcome>,
        persona: &'static PersonaRecord,
        content: String,
    },
    PlainContext {
        persona: &'static PersonaRecord,
        tone: String,
        output: String,
        content: String,
        lexicon_refs: Vec<LexiconRef>,
        requires_search: bool,
        requires_sandbox: bool,
    },
}

impl DispatchResult {
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchResult::ThreatBlocked { .. } => "threat_blocked",
            DispatchResult::CommandExecution { .. } => "command_execution",
            DispatchResult::PlainContext { .. } => "plain_context",
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, DispatchResult::ThreatBlocked { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub result: DispatchResult,
    pub state: ConversationState,
}

/// Borrowed view of the immutable tables a turn is resolved against.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    personas: &'a PersonaRegistry,
    lexicon: &'a Lexicon,
}

impl<'a> Dispatcher<'a> {
    pub fn new(personas: &'a PersonaRegistry, lexicon: &'a Lexicon) -> Self {
        Self { personas, lexicon }
    }

    pub fn resolve(
        &self,
        descriptor: &CommandDescriptor,
        assessment: &ThreatAssessment,
        state: &ConversationState,
    ) -> Resolution {
        if assessment.is_dangerous() {
            return Resolution {
                result: DispatchResult::ThreatBlocked {
                    assessment: assessment.clone(),
                },
                state: state.clone(),
            };
        }

        let next = context::update(state, descriptor);
        let persona = context::resolve_persona(self.personas, &next);

        let result = if descriptor.has_commands() {
            DispatchResult::CommandExecution {
                outcomes: descriptor
                    .command_tokens
                    .iter()
                    .map(|t| CommandOutcome::for_token(t))
                    .collect(),
                persona,
                content: descriptor.content.clone(),
            }
        } else {
            let commands: Vec<Command> = descriptor
                .command_tokens
                .iter()
                .filter_map(|t| Command::from_token(t))
                .collect();
            DispatchResult::PlainContext {
                persona,
                tone: next.current_tone.clone(),
                output: next.current_output.clone(),
                content: descriptor.content.clone(),
                lexicon_refs: self.lexicon.find_references(&descriptor.content),
                requires_search: commands.iter().any(Command::requires_search),
                requires_sandbox: commands.iter().any(Command::requires_sandbox),
            }
        };

        Resolution {
            result,
            state: next,
        }
    }
}
