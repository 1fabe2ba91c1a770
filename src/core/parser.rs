//! Turn parser for the h@cky command syntax.
//!
//! A turn looks like `>command< /persona (tone) [output] free text`. Every
//! token kind may appear anywhere and in any order. Command tokens are all
//! collected; for the three singular tags only the first occurrence counts.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">([^<>]+)<").unwrap());
static PERSONA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/(\w+)").unwrap());
static TONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\w+)\)").unwrap());
static OUTPUT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(\w+)\]").unwrap());

/// Immutable result of parsing one raw turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub raw_text: String,
    /// Left-to-right, duplicates preserved.
    pub command_tokens: Vec<String>,
    pub persona_tag: Option<String>,
    pub tone_tag: Option<String>,
    pub output_tag: Option<String>,
    /// Raw text with every syntax token removed, then trimmed.
    pub content: String,
}

impl CommandDescriptor {
    /// Descriptor carrying only the raw text, for turns that are never parsed.
    pub fn unparsed(raw_text: &str) -> Self {
        Self {
            raw_text: raw_text.to_string(),
            command_tokens: Vec::new(),
            persona_tag: None,
            tone_tag: None,
            output_tag: None,
            content: String::new(),
        }
    }

    pub fn has_commands(&self) -> bool {
        !self.command_tokens.is_empty()
    }
}

/// Parse a raw turn. Never fails: syntax-free input yields empty tags and the
/// trimmed text as content.
pub fn parse(raw_text: &str) -> CommandDescriptor {
    let command_tokens = COMMAND_RE
        .captures_iter(raw_text)
        .map(|c| c[1].to_string())
        .collect();

    CommandDescriptor {
        raw_text: raw_text.to_string(),
        command_tokens,
        persona_tag: first_capture(&PERSONA_RE, raw_text),
        tone_tag: first_capture(&TONE_RE, raw_text),
        output_tag: first_capture(&OUTPUT_RE, raw_text),
        content: strip_syntax(raw_text),
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|c| c[1].to_string())
}

/// Remove all four token kinds, repeating until nothing matches: removing
/// `[x]` from `/[x]ab` leaves a fresh `/ab` behind. Whitespace is only
/// collapsed where a token was removed; line breaks and indentation elsewhere
/// survive, and the result is trimmed.
pub fn strip_syntax(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let mut next = current.clone();
        for re in [&*COMMAND_SITE_RE, &*PERSONA_SITE_RE, &*TONE_SITE_RE, &*OUTPUT_SITE_RE] {
            next = remove_sites(re, &next);
        }
        if next == current {
            break;
        }
        current = next;
    }
    current.trim().to_string()
}

static COMMAND_SITE_RE: LazyLock<Regex> = LazyLock::new(|| site_regex(r">[^<>]+<"));
static PERSONA_SITE_RE: LazyLock<Regex> = LazyLock::new(|| site_regex(r"/\w+"));
static TONE_SITE_RE: LazyLock<Regex> = LazyLock::new(|| site_regex(r"\(\w+\)"));
static OUTPUT_SITE_RE: LazyLock<Regex> = LazyLock::new(|| site_regex(r"\[\w+\]"));

/// A token together with the spaces and tabs on either side of it.
fn site_regex(token: &str) -> Regex {
    Regex::new(&format!(r"(?P<l>[ \t]*){}(?P<r>[ \t]*)", token)).unwrap()
}

/// A removed token leaves one space only when it sat between two words and
/// had whitespace next to it; at line edges the surrounding run disappears.
fn remove_sites(re: &Regex, text: &str) -> String {
    re.replace_all(text, |caps: &regex::Captures| {
        let (Some(site), Some(l), Some(r)) = (caps.get(0), caps.name("l"), caps.name("r")) else {
            return String::new();
        };
        let before = text[..site.start()].chars().next_back();
        let after = text[site.end()..].chars().next();
        let between_words = before.is_some_and(|c| !c.is_whitespace())
            && after.is_some_and(|c| !c.is_whitespace());
        if between_words && !(l.as_str().is_empty() && r.as_str().is_empty()) {
            " ".to_string()
        } else {
            String::new()
        }
    })
    .into_owned()
}
