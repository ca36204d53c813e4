//! Response strategy types: gate verdicts and the strategy descriptor.

use serde::{Deserialize, Serialize};

/// One gate decision for one external data kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateVerdict {
    pub relevant: bool,

    /// Why the data may or may not be shown. Stable strings, useful in logs
    /// and in the rendered prompt.
    pub reason: String,
}

impl GateVerdict {
    pub fn pass(reason: impl Into<String>) -> Self {
        Self {
            relevant: true,
            reason: reason.into(),
        }
    }

    pub fn withhold(reason: impl Into<String>) -> Self {
        Self {
            relevant: false,
            reason: reason.into(),
        }
    }
}

/// Gate decisions for every kind considered this turn. A kind the
/// classification did not request stays `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateReport {
    pub weather: Option<GateVerdict>,
    pub attractions: Option<GateVerdict>,
}

impl GateReport {
    pub fn weather_allowed(&self) -> bool {
        self.weather.as_ref().is_some_and(|v| v.relevant)
    }

    pub fn attractions_allowed(&self) -> bool {
        self.attractions.as_ref().is_some_and(|v| v.relevant)
    }

    /// How many kinds passed the gate.
    pub fn allowed_count(&self) -> usize {
        usize::from(self.weather_allowed()) + usize::from(self.attractions_allowed())
    }
}

/// The strategy families an answer can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Too little known: ask before recommending.
    QuestionFocused,
    /// Mix tentative recommendations with clarifying questions.
    Hybrid,
    /// Hybrid, enriched with gated external data.
    HybridWithExternal,
    /// Enough known: recommend with confidence.
    RecommendationFocused,
    /// Everything known: go deep.
    Detailed,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::QuestionFocused => "question_focused",
            StrategyKind::Hybrid => "hybrid",
            StrategyKind::HybridWithExternal => "hybrid_with_external",
            StrategyKind::RecommendationFocused => "recommendation_focused",
            StrategyKind::Detailed => "detailed",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long and thorough the rendered answer should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseDepth {
    Brief,
    Balanced,
    Detailed,
    Exhaustive,
}

/// Which external kinds the renderer may show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUse {
    pub weather: bool,
    pub attractions: bool,
}

impl ExternalUse {
    pub fn any(&self) -> bool {
        self.weather || self.attractions
    }
}

/// How the answer for this turn should be shaped. Consumed immediately by
/// the renderer, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyDescriptor {
    pub kind: StrategyKind,

    /// Whether clarifying questions belong in the answer.
    pub ask_questions: bool,

    pub target_depth: ResponseDepth,

    /// Mirrors the gate's per-kind verdicts.
    pub use_external: ExternalUse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_report_counts_allowed_kinds() {
        let report = GateReport {
            weather: Some(GateVerdict::pass("trip starts tomorrow")),
            attractions: Some(GateVerdict::withhold("no results")),
        };
        assert!(report.weather_allowed());
        assert!(!report.attractions_allowed());
        assert_eq!(report.allowed_count(), 1);
    }

    #[test]
    fn unrequested_kind_is_not_allowed() {
        let report = GateReport::default();
        assert!(!report.weather_allowed());
        assert_eq!(report.allowed_count(), 0);
    }

    #[test]
    fn depth_is_ordered() {
        assert!(ResponseDepth::Brief < ResponseDepth::Exhaustive);
    }

    #[test]
    fn strategy_kind_serializes_snake_case() {
        let json = serde_json::to_string(&StrategyKind::HybridWithExternal).unwrap();
        assert_eq!(json, "\"hybrid_with_external\"");
    }
}
