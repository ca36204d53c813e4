//! Information-completeness profiling.
//!
//! The scorer grades how much is known about the traveler against a fixed
//! four-category taxonomy. The resulting tier throttles how assertive the
//! answer may be.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The categories of traveler information the scorer tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoCategory {
    Location,
    TimeConstraints,
    Preferences,
    Accessibility,
}

impl InfoCategory {
    pub const ALL: [InfoCategory; 4] = [
        InfoCategory::Location,
        InfoCategory::TimeConstraints,
        InfoCategory::Preferences,
        InfoCategory::Accessibility,
    ];

    /// The fact keys that count toward this category.
    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            InfoCategory::Location => &["destination", "region"],
            InfoCategory::TimeConstraints => &["travel_dates", "duration"],
            InfoCategory::Preferences => &["interests", "budget", "travel_style"],
            InfoCategory::Accessibility => &["mobility", "accessibility_needs"],
        }
    }

    /// Human-facing tag used when this category is reported as a gap.
    pub fn gap_tag(&self) -> &'static str {
        match self {
            InfoCategory::Location => "destination_or_region",
            InfoCategory::TimeConstraints => "dates_or_duration",
            InfoCategory::Preferences => "interests_or_budget",
            InfoCategory::Accessibility => "mobility_or_access_needs",
        }
    }
}

impl std::fmt::Display for InfoCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InfoCategory::Location => "location",
            InfoCategory::TimeConstraints => "time_constraints",
            InfoCategory::Preferences => "preferences",
            InfoCategory::Accessibility => "accessibility",
        };
        f.write_str(name)
    }
}

/// Quality tier summarizing how much is known about the request.
///
/// Ordered: `Minimal < Partial < Sufficient < Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletenessTier {
    Minimal,
    Partial,
    Sufficient,
    Complete,
}

impl CompletenessTier {
    /// Tier cutoffs over the overall score, checked descending.
    pub fn from_score(score: f64) -> Self {
        if score >= 1.0 {
            CompletenessTier::Complete
        } else if score >= 0.8 {
            CompletenessTier::Sufficient
        } else if score >= 0.5 {
            CompletenessTier::Partial
        } else {
            CompletenessTier::Minimal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompletenessTier::Minimal => "minimal",
            CompletenessTier::Partial => "partial",
            CompletenessTier::Sufficient => "sufficient",
            CompletenessTier::Complete => "complete",
        }
    }
}

impl std::fmt::Display for CompletenessTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category and overall information coverage for one turn.
/// Recomputed from scratch every turn, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessProfile {
    pub category_scores: BTreeMap<InfoCategory, f64>,

    /// Unweighted mean of the category scores.
    pub overall: f64,

    pub tier: CompletenessTier,

    /// Categories scoring below the critical threshold.
    pub critical_gaps: Vec<InfoCategory>,
}

impl CompletenessProfile {
    /// An empty profile: nothing known, everything a gap.
    pub fn empty() -> Self {
        Self {
            category_scores: InfoCategory::ALL.iter().map(|c| (*c, 0.0)).collect(),
            overall: 0.0,
            tier: CompletenessTier::Minimal,
            critical_gaps: InfoCategory::ALL.to_vec(),
        }
    }

    /// Gap tags for every critical gap, in taxonomy order.
    pub fn gap_tags(&self) -> Vec<&'static str> {
        self.critical_gaps.iter().map(|c| c.gap_tag()).collect()
    }
}
