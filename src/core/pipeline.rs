//! Per-turn façade over the classifier, parser and dispatcher.

use crate::core::context::{self, ConversationState};
use crate::core::dispatch::{DispatchResult, Dispatcher};
use crate::core::lexicon::Lexicon;
use crate::core::parser::{self, CommandDescriptor};
use crate::core::persona::PersonaRegistry;
use crate::core::record::{LogBody, LogEntry};
use crate::core::threat::{ThreatAssessment, ThreatClassifier};
use serde::Serialize;

/// Everything one turn produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub raw_text: String,
    /// `None` when the turn was blocked before parsing.
    pub descriptor: Option<CommandDescriptor>,
    pub assessment: ThreatAssessment,
    pub result: DispatchResult,
    pub state: ConversationState,
}

impl Turn {
    /// The `query` journal record for this turn. Blocked turns are recorded
    /// under the persona that was active before the turn.
    pub fn query_record(&self) -> LogEntry {
        let persona = context::resolve_persona(PersonaRegistry::global(), &self.state);
        LogEntry::now(LogBody::Query {
            query: self.raw_text.clone(),
            persona: persona.id.to_string(),
            tone: self.state.current_tone.clone(),
            output_type: self.state.current_output.clone(),
            commands: self
                .descriptor
                .as_ref()
                .map(|d| d.command_tokens.clone())
                .unwrap_or_default(),
        })
    }

    pub fn is_blocked(&self) -> bool {
        self.result.is_blocked()
    }
}

/// Owns the tables a session resolves turns against.
#[derive(Debug, Clone)]
pub struct Pipeline {
    personas: &'static PersonaRegistry,
    classifier: ThreatClassifier,
    lexicon: Lexicon,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Lexicon::new())
    }
}

impl Pipeline {
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            personas: PersonaRegistry::global(),
            classifier: ThreatClassifier::new(),
            lexicon,
        }
    }

    pub fn personas(&self) -> &'static PersonaRegistry {
        self.personas
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn process_turn(&self, raw_text: &str, state: &ConversationState) -> Turn {
        let assessment = self.classifier.score(raw_text);
        let dispatcher = Dispatcher::new(self.personas, &self.lexicon);

        if assessment.is_dangerous() {
            tracing::warn!(
                score = assessment.score,
                categories = ?assessment.categories_triggered,
                "turn blocked by honeypot"
            );
            let unparsed = CommandDescriptor::unparsed(raw_text);
            let resolution = dispatcher.resolve(&unparsed, &assessment, state);
            return Turn {
                raw_text: raw_text.to_string(),
                descriptor: None,
                assessment,
                result: resolution.result,
                state: resolution.state,
            };
        }

        if assessment.is_suspicious() {
            tracing::info!(score = assessment.score, "suspicious turn");
        }

        let descriptor = parser::parse(raw_text);
        let resolution = dispatcher.resolve(&descriptor, &assessment, state);
        tracing::debug!(
            kind = resolution.result.kind(),
            turn = resolution.state.turn_count,
            commands = descriptor.command_tokens.len(),
            "turn resolved"
        );

        Turn {
            raw_text: raw_text.to_string(),
            descriptor: Some(descriptor),
            assessment,
            result: resolution.result,
            state: resolution.state,
        }
    }
}
