//! The completeness scorer.
//!
//! Recomputed from scratch every turn over stored facts plus this turn's
//! utterance. Adding facts can only raise scores, so the tier is monotone
//! over a session until a reset.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;
use wayfinder_core::fact::{Fact, FactExtractor};
use wayfinder_core::profile::{CompletenessProfile, CompletenessTier, InfoCategory};

/// A category scoring below this is a critical gap.
pub const CRITICAL_GAP_THRESHOLD: f64 = 0.3;

pub struct CompletenessScorer {
    extractor: Arc<dyn FactExtractor>,
}

impl CompletenessScorer {
    pub fn new(extractor: Arc<dyn FactExtractor>) -> Self {
        Self { extractor }
    }

    /// Score one turn.
    ///
    /// `stored` is the union of global and current-topic facts. Facts
    /// extracted from the utterance overlay them for this turn only;
    /// nothing is written back. A key counts as present regardless of its
    /// value, so "destination: somewhere warm" satisfies Location.
    pub fn score(&self, stored: &[Fact], utterance: &str) -> CompletenessProfile {
        let mut available: HashMap<String, String> = HashMap::new();
        for fact in stored {
            if let Fact::Keyed { key, value } = fact {
                available.insert(key.trim().to_lowercase(), value.clone());
            }
        }
        for fact in self.extractor.extract(utterance) {
            if let Fact::Keyed { key, value } = fact {
                available.insert(key.trim().to_lowercase(), value);
            }
        }

        let mut category_scores = BTreeMap::new();
        let mut critical_gaps = Vec::new();
        for category in InfoCategory::ALL {
            let required = category.required_keys();
            let present = required
                .iter()
                .filter(|key| available.contains_key(**key))
                .count();
            let score = present as f64 / required.len() as f64;
            if score < CRITICAL_GAP_THRESHOLD {
                critical_gaps.push(category);
            }
            category_scores.insert(category, score);
        }

        let overall = category_scores.values().sum::<f64>() / category_scores.len() as f64;
        let tier = CompletenessTier::from_score(overall);

        debug!(
            overall,
            tier = %tier,
            gaps = critical_gaps.len(),
            known_keys = available.len(),
            "Completeness scored"
        );

        CompletenessProfile {
            category_scores,
            overall,
            tier,
            critical_gaps,
        }
    }
}
