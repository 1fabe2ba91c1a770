//! Per-session conversation state.
//!
//! State is threaded explicitly: [`update`] takes the previous state by
//! reference and returns its successor.

use crate::core::parser::CommandDescriptor;
use crate::core::persona::{DEFAULT_PERSONA_ID, PersonaRecord, PersonaRegistry};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TONE: &str = "neutral";
pub const DEFAULT_OUTPUT: &str = "based";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Unset until a turn carries a persona tag; resolves to the default persona.
    pub current_persona_id: Option<String>,
    pub current_tone: String,
    pub current_output: String,
    pub turn_count: u64,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            current_persona_id: None,
            current_tone: DEFAULT_TONE.to_string(),
            current_output: DEFAULT_OUTPUT.to_string(),
            turn_count: 0,
        }
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Successor state: each non-empty tag overwrites its field, the turn
/// counter always advances.
pub fn update(state: &ConversationState, descriptor: &CommandDescriptor) -> ConversationState {
    let present = |tag: &Option<String>| -> Option<String> {
        tag.as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    };
    let pick = |tag: &Option<String>, current: &str| -> String {
        present(tag).unwrap_or_else(|| current.to_string())
    };

    ConversationState {
        current_persona_id: present(&descriptor.persona_tag)
            .or_else(|| state.current_persona_id.clone()),
        current_tone: pick(&descriptor.tone_tag, &state.current_tone),
        current_output: pick(&descriptor.output_tag, &state.current_output),
        turn_count: state.turn_count + 1,
    }
}

pub fn resolve_persona(
    registry: &PersonaRegistry,
    state: &ConversationState,
) -> &'static PersonaRecord {
    registry.get(state.current_persona_id.as_deref())
}
