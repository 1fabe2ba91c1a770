//! h@cky terminology.
//!
//! A fixed core table plus a user layer the caller owns. The user layer
//! overrides core definitions on lookup but never mutates the core table.
//! Keys are stored lower-cased.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

const CORE_TERMS: &[(&str, &str)] = &[
    ("AI", "Artificial Intelligence"),
    ("CI", "Collective Intelligence (humanity)"),
    ("zeitgeist", "Sum of all CI + AI exchanges globally"),
    ("bamn", "By Any Means Necessary - use all available tools"),
    ("h@cky-core", "Core identity and principles of h@cky AI"),
    ("rqmt", "Requirements - prerequisites, imports, database prerequisites"),
    ("etc", "Find other examples in memory OR quick internet search"),
    ("based", "Properly sourced information with citations and bibliography"),
    ("lynchean", "Perpetual oscillation between machinery and humanity"),
    ("materialist", "Deeply concerned with physical/material impact on CI environment"),
    ("habitus", "Ingrained habits, skills, and dispositions (Bourdieu)"),
    ("explain", "Use simple metaphor for understanding"),
    ("get", "Fill database with required information"),
    ("find", "Quick internet search for precise information"),
    ("investigate", "Deep contextual and factual investigation"),
    ("create", "Vision-dependent creation (feature to be added)"),
    ("crash", "Generate tokens until system crashes (key-dependent)"),
    ("akademik", "Academic/pedagogical persona"),
    ("shrink", "Mental health support persona"),
    ("whitehat", "Ethical hacker persona (restricted)"),
    ("concise", "Minimal tokens, brief response"),
    ("precise", "Maximum precision even if lengthy"),
    ("developed", "Comprehensive, detailed response"),
    ("honeypot", "Security system detecting malicious prompts"),
    ("deepscan", "Deep legitimacy verification"),
    ("whois", "Network scanning and identification"),
    ("target", "Basic weakness scan of specified target"),
    ("academic search", "Search validated academic databases"),
    ("juridical research", "Search legal databases and precedents"),
];

struct CoreEntry {
    term: String,
    definition: &'static str,
    matcher: Regex,
}

static CORE: LazyLock<Vec<CoreEntry>> = LazyLock::new(|| {
    CORE_TERMS
        .iter()
        .filter_map(|(term, definition)| {
            let term = normalize(term);
            word_matcher(&term).map(|matcher| CoreEntry {
                term,
                definition,
                matcher,
            })
        })
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LexiconSource {
    Core,
    User,
}

impl LexiconSource {
    pub fn label(&self) -> &'static str {
        match self {
            LexiconSource::Core => "CORE",
            LexiconSource::User => "USER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconRef {
    pub term: String,
    pub definition: String,
    pub source: LexiconSource,
}

/// Which layer [`Lexicon::list_terms`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TermScope {
    #[default]
    All,
    UserOnly,
    CoreOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    user: BTreeMap<String, String>,
}

pub fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}

fn word_matcher(term: &str) -> Option<Regex> {
    if term.is_empty() {
        return None;
    }
    RegexBuilder::new(&format!(r"(?:^|\W){}(?:\W|$)", regex::escape(term)))
        .case_insensitive(true)
        .build()
        .ok()
}

fn core_definition(term: &str) -> Option<&'static str> {
    CORE.iter()
        .find(|e| e.term == term)
        .map(|e| e.definition)
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_terms(user: BTreeMap<String, String>) -> Self {
        let mut lex = Self::new();
        lex.merge(user);
        lex
    }

    pub fn user_terms(&self) -> &BTreeMap<String, String> {
        &self.user
    }

    /// Add or overwrite a user definition. Returns the normalized key, or
    /// `None` when the term is blank.
    pub fn define(&mut self, term: &str, definition: &str) -> Option<String> {
        let key = normalize(term);
        if key.is_empty() {
            return None;
        }
        self.user.insert(key.clone(), definition.to_string());
        Some(key)
    }

    /// Remove a user definition. Core terms cannot be removed.
    pub fn remove(&mut self, term: &str) -> bool {
        self.user.remove(&normalize(term)).is_some()
    }

    pub fn lookup(&self, term: &str) -> Option<LexiconRef> {
        let key = normalize(term);
        if let Some(def) = self.user.get(&key) {
            return Some(LexiconRef {
                term: key,
                definition: def.clone(),
                source: LexiconSource::User,
            });
        }
        core_definition(&key).map(|def| LexiconRef {
            term: key,
            definition: def.to_string(),
            source: LexiconSource::Core,
        })
    }

    /// Terms and effective definitions. Core terms come first in their
    /// fixed order, then user-only terms sorted.
    pub fn list_terms(&self, scope: TermScope) -> Vec<LexiconRef> {
        match scope {
            TermScope::UserOnly => self
                .user
                .iter()
                .map(|(t, d)| LexiconRef {
                    term: t.clone(),
                    definition: d.clone(),
                    source: LexiconSource::User,
                })
                .collect(),
            TermScope::CoreOnly => CORE
                .iter()
                .map(|e| LexiconRef {
                    term: e.term.clone(),
                    definition: e.definition.to_string(),
                    source: LexiconSource::Core,
                })
                .collect(),
            TermScope::All => self.all_terms().collect(),
        }
    }

    /// Entries whose term or definition contains `query`, case-insensitively.
    pub fn search_definitions(&self, query: &str) -> Vec<LexiconRef> {
        let needle = query.to_lowercase();
        self.all_terms()
            .filter(|r| {
                r.term.contains(&needle) || r.definition.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Every term occurring in `text` as a whole word or phrase, each once.
    pub fn find_references(&self, text: &str) -> Vec<LexiconRef> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let mut refs = Vec::new();
        for entry in CORE.iter() {
            if entry.matcher.is_match(text) {
                refs.extend(self.lookup(&entry.term));
            }
        }
        for (term, definition) in &self.user {
            if core_definition(term).is_some() {
                continue;
            }
            if word_matcher(term).is_some_and(|m| m.is_match(text)) {
                refs.push(LexiconRef {
                    term: term.clone(),
                    definition: definition.clone(),
                    source: LexiconSource::User,
                });
            }
        }
        refs
    }

    pub fn merge(&mut self, terms: BTreeMap<String, String>) {
        for (term, definition) in terms {
            self.define(&term, &definition);
        }
    }

    pub fn replace(&mut self, terms: BTreeMap<String, String>) {
        self.user.clear();
        self.merge(terms);
    }

    /// Merged view as a plain map, user definitions winning.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.all_terms().map(|r| (r.term, r.definition)).collect()
    }

    fn all_terms(&self) -> impl Iterator<Item = LexiconRef> + '_ {
        let core = CORE.iter().filter_map(|e| self.lookup(&e.term));
        let user_only = self
            .user
            .iter()
            .filter(|(t, _)| core_definition(t).is_none())
            .map(|(t, d)| LexiconRef {
                term: t.clone(),
                definition: d.clone(),
                source: LexiconSource::User,
            });
        core.chain(user_only)
    }
}
