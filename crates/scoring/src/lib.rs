//! Information-completeness scoring for Wayfinder.
//!
//! Grades how much is known about the traveler against a fixed taxonomy.
//! Stored facts are overlaid with facts extracted from the current
//! utterance, so a detail the user just typed counts immediately, one turn
//! before the classifier's extraction lands in the store.

pub mod completeness;
pub mod extract;

pub use completeness::{CompletenessScorer, CRITICAL_GAP_THRESHOLD};
pub use extract::UtteranceExtractor;
