//! Honeypot threat classifier.
//!
//! Scores a raw turn for prompt-injection risk using five weighted pattern
//! categories. A category contributes half its weight for one distinct
//! matching pattern and its full weight for two or more; the sum is clamped
//! to `[0.0, 1.0]`. The pattern tables are compiled once and shared.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Above this score a turn is reported as suspicious.
pub const SUSPICIOUS_THRESHOLD: f64 = 0.3;
/// Above this score a turn is blocked.
pub const DANGEROUS_THRESHOLD: f64 = 0.7;
/// Replacement for every matched span in [`ThreatClassifier::sanitize`].
pub const REDACTION_MARKER: &str = "[REDACTED]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatCategory {
    DirectInjection,
    PersonaJailbreak,
    EncodingEvasion,
    ContextEscalation,
    TechnicalBypass,
}

impl ThreatCategory {
    pub const ALL: [ThreatCategory; 5] = [
        ThreatCategory::DirectInjection,
        ThreatCategory::PersonaJailbreak,
        ThreatCategory::EncodingEvasion,
        ThreatCategory::ContextEscalation,
        ThreatCategory::TechnicalBypass,
    ];

    pub fn weight(&self) -> f64 {
        match self {
            ThreatCategory::DirectInjection => 0.40,
            ThreatCategory::PersonaJailbreak => 0.30,
            ThreatCategory::EncodingEvasion => 0.20,
            ThreatCategory::ContextEscalation => 0.15,
            ThreatCategory::TechnicalBypass => 0.35,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatCategory::DirectInjection => "direct_injection",
            ThreatCategory::PersonaJailbreak => "persona_jailbreak",
            ThreatCategory::EncodingEvasion => "encoding_evasion",
            ThreatCategory::ContextEscalation => "context_escalation",
            ThreatCategory::TechnicalBypass => "technical_bypass",
        }
    }

    fn sources(&self) -> &'static [&'static str] {
        match self {
            ThreatCategory::DirectInjection => &[
                r"ignore\s+(previous|above|prior)\s+instructions?",
                r"forget\s+(everything|all|previous)",
                r"new\s+instructions?:",
                r"disregard\s+(previous|above)",
                r"you\s+are\s+now",
                r"pretend\s+(you\s+are|to\s+be)",
                r"act\s+as\s+if",
                r"roleplay\s+as",
            ],
            ThreatCategory::PersonaJailbreak => &[
                r"\bDAN\b",
                r"evil\s+(mode|confidant|advisor)",
                r"unrestricted\s+mode",
                r"developer\s+mode",
                r"jailbreak",
                r"opposite\s+mode",
                r"anti-[A-Z]+",
            ],
            ThreatCategory::EncodingEvasion => &[
                r"base64|b64encode",
                r"rot13|rot-13",
                r"l33t|1337",
                r"\\x[0-9a-fA-F]{2}",
                r"%[0-9a-fA-F]{2}",
            ],
            ThreatCategory::ContextEscalation => &[
                r"for\s+(research|educational)\s+purposes?\s+only",
                r"hypothetically",
                r"in\s+a\s+fictional\s+(world|scenario)",
                r"simulation\s+mode",
            ],
            ThreatCategory::TechnicalBypass => &[
                r"sudo\s+mode",
                r"admin\s+(mode|access|privileges)",
                r"root\s+access",
                r"kernel\s+mode",
                r"bypass\s+(filter|safety|restrictions?)",
            ],
        }
    }
}

impl std::fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compiled (category, patterns) table in fixed category order.
static PATTERN_TABLE: LazyLock<Vec<(ThreatCategory, Vec<Regex>)>> = LazyLock::new(|| {
    ThreatCategory::ALL
        .iter()
        .map(|cat| {
            let patterns = cat
                .sources()
                .iter()
                .map(|src| {
                    RegexBuilder::new(src)
                        .case_insensitive(true)
                        .build()
                        .unwrap()
                })
                .collect();
            (*cat, patterns)
        })
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Safe,
    Suspicious,
    Dangerous,
}

impl Recommendation {
    pub fn advice(&self) -> &'static str {
        match self {
            Recommendation::Safe => "SAFE - Process normally",
            Recommendation::Suspicious => "SUSPICIOUS - Process with caution",
            Recommendation::Dangerous => "DANGEROUS - Block or sanitize",
        }
    }
}

/// Weighted injection-risk verdict for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatAssessment {
    pub score: f64,
    pub categories_triggered: BTreeSet<ThreatCategory>,
    /// Number of distinct patterns that matched, per triggered category.
    pub detection_counts: BTreeMap<ThreatCategory, usize>,
}

impl ThreatAssessment {
    pub fn clean() -> Self {
        Self {
            score: 0.0,
            categories_triggered: BTreeSet::new(),
            detection_counts: BTreeMap::new(),
        }
    }

    pub fn is_suspicious(&self) -> bool {
        self.score > SUSPICIOUS_THRESHOLD
    }

    pub fn is_dangerous(&self) -> bool {
        self.score > DANGEROUS_THRESHOLD
    }

    pub fn recommendation(&self) -> Recommendation {
        if self.score < SUSPICIOUS_THRESHOLD {
            Recommendation::Safe
        } else if self.score < DANGEROUS_THRESHOLD {
            Recommendation::Suspicious
        } else {
            Recommendation::Dangerous
        }
    }

    /// JSON report including the derived flags.
    pub fn details(&self) -> serde_json::Value {
        serde_json::json!({
            "score": self.score,
            "is_suspicious": self.is_suspicious(),
            "is_dangerous": self.is_dangerous(),
            "categories_triggered": self.categories_triggered,
            "detection_counts": self.detection_counts,
            "recommendation": self.recommendation().advice(),
        })
    }
}

/// Stateless scorer over the shared pattern table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreatClassifier;

impl ThreatClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, text: &str) -> ThreatAssessment {
        if text.is_empty() {
            return ThreatAssessment::clean();
        }

        let mut assessment = ThreatAssessment::clean();
        let mut total = 0.0;
        for (category, patterns) in PATTERN_TABLE.iter() {
            let matched = patterns.iter().filter(|p| p.is_match(text)).count();
            if matched == 0 {
                continue;
            }
            total += category_contribution(*category, matched);
            assessment.categories_triggered.insert(*category);
            assessment.detection_counts.insert(*category, matched);
        }
        assessment.score = round_score(total).clamp(0.0, 1.0);
        assessment
    }

    /// Replace every matched span of every pattern with [`REDACTION_MARKER`].
    pub fn sanitize(&self, text: &str) -> String {
        let mut sanitized = text.to_string();
        for (_, patterns) in PATTERN_TABLE.iter() {
            for pattern in patterns {
                sanitized = pattern
                    .replace_all(&sanitized, REDACTION_MARKER)
                    .into_owned();
            }
        }
        sanitized
    }
}

fn category_contribution(category: ThreatCategory, matched: usize) -> f64 {
    category.weight() * (matched as f64 / 2.0).min(1.0)
}

/// Contributions are multiples of 0.025; rounding drops float noise so that
/// 0.4 + 0.3 compares equal to the 0.7 threshold instead of just above it.
fn round_score(raw: f64) -> f64 {
    (raw * 1_000_000.0).round() / 1_000_000.0
}
