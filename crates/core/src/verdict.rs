//! Classification verdicts.
//!
//! Two classifiers look at every utterance: a generative one (primary) and
//! a deterministic pattern matcher (secondary). Their raw outputs are
//! reconciled into one [`Verdict`] per turn. Verdicts are never persisted;
//! only their fact arrays are folded into the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::topic::Topic;

/// Which live data a turn calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalDataKind {
    #[default]
    None,
    Weather,
    Attractions,
    Both,
}

impl ExternalDataKind {
    /// Lenient parse. Anything outside the recognized set maps to `None`,
    /// so a malformed kind from the primary classifier degrades instead of
    /// failing the turn.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "weather" => ExternalDataKind::Weather,
            "attractions" => ExternalDataKind::Attractions,
            "both" => ExternalDataKind::Both,
            _ => ExternalDataKind::None,
        }
    }

    /// Whether `s` names one of the recognized kinds.
    pub fn is_recognized(s: &str) -> bool {
        matches!(
            s.trim().to_lowercase().as_str(),
            "none" | "weather" | "attractions" | "both"
        )
    }

    pub fn wants_weather(&self) -> bool {
        matches!(self, ExternalDataKind::Weather | ExternalDataKind::Both)
    }

    pub fn wants_attractions(&self) -> bool {
        matches!(self, ExternalDataKind::Attractions | ExternalDataKind::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalDataKind::None => "none",
            ExternalDataKind::Weather => "weather",
            ExternalDataKind::Attractions => "attractions",
            ExternalDataKind::Both => "both",
        }
    }
}

impl std::fmt::Display for ExternalDataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the combined verdict was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    /// Both classifiers agreed on the topic.
    Consensus,
    /// The classifiers disagreed and the primary's weight won.
    Primary,
    /// The classifiers disagreed and the secondary's weighted confidence won.
    Secondary,
    /// The primary failed outright; the secondary served alone.
    SecondaryFallback,
}

impl VerdictSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictSource::Consensus => "consensus",
            VerdictSource::Primary => "primary",
            VerdictSource::Secondary => "secondary",
            VerdictSource::SecondaryFallback => "secondary_fallback",
        }
    }
}

impl std::fmt::Display for VerdictSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The generative classifier's output after validation.
///
/// `topic_facts` may carry fragments for topics other than the classified
/// one; the classifier extracts cross-topic information in a single pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryVerdict {
    pub topic: Topic,

    /// The model's own explanation, kept for logs and prompts.
    pub reasoning: String,

    pub external_needed: bool,
    pub external_kind: ExternalDataKind,
    pub external_reason: String,

    /// Traveler-profile fragments that hold across topics.
    pub global_facts: Vec<String>,

    /// Topic-scoped fragments, keyed by topic.
    pub topic_facts: BTreeMap<Topic, Vec<String>>,
}

/// The deterministic pattern classifier's output. Never fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternVerdict {
    pub topic: Topic,

    /// Self-reported confidence in [0, 1], derived from pattern hit ratios.
    pub confidence: f64,

    pub external_needed: bool,
    pub external_kind: ExternalDataKind,
    pub reason: String,
}

/// The single authoritative classification for one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub topic: Topic,

    /// Combined confidence. Exceeds 1.0 when the agreement bonus applies.
    pub confidence: f64,

    pub source: VerdictSource,

    pub external_needed: bool,
    pub external_kind: ExternalDataKind,
    pub external_reason: String,

    pub global_facts: Vec<String>,
    pub topic_facts: BTreeMap<Topic, Vec<String>>,

    /// True when the primary classifier failed and the pattern verdict
    /// served alone.
    pub fallback_used: bool,

    pub reasoning: String,
}

impl Verdict {
    /// Fragments extracted for one topic, empty when none were.
    pub fn facts_for(&self, topic: Topic) -> &[String] {
        self.topic_facts
            .get(&topic)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
