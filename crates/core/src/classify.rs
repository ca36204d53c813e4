//! The primary-classifier seam.

use async_trait::async_trait;

use crate::error::ClassifierError;
use crate::session::Turn;
use crate::verdict::PrimaryVerdict;

/// The generative (primary) classifier.
///
/// Takes the raw utterance plus a short window of recent turns and returns
/// a structured verdict. Every failure is recoverable: the combiner drops
/// to the pattern classifier's verdict instead of aborting the turn.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// A human-readable name for logs.
    fn name(&self) -> &str;

    async fn classify(
        &self,
        utterance: &str,
        recent_turns: &[Turn],
    ) -> Result<PrimaryVerdict, ClassifierError>;
}
