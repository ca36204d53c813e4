//! Verdict combination.
//!
//! Reconciles the generative and pattern verdicts into the single
//! classification the rest of the turn runs on. The generative classifier
//! carries a fixed trust weight; the pattern classifier's weight is scaled
//! by its self-reported confidence, so in practice the generative verdict
//! wins every disagreement and the pattern verdict only decides the turn
//! when the generative classifier failed outright.

use std::collections::BTreeMap;

use tracing::{info, warn};
use wayfinder_core::error::ClassifierError;
use wayfinder_core::verdict::{PatternVerdict, PrimaryVerdict, Verdict, VerdictSource};

/// Trust weight of the generative classifier.
pub const PRIMARY_WEIGHT: f64 = 0.8;
/// Trust weight of the pattern classifier, scaled by its confidence.
pub const SECONDARY_WEIGHT: f64 = 0.2;
/// Added on top when both classifiers name the same topic.
pub const AGREEMENT_BONUS: f64 = 0.3;

/// Combine both classifier outputs into one authoritative verdict.
///
/// External-data assessment and extracted facts always come from the
/// generative verdict when it exists; the pattern classifier only ever
/// contributes its topic vote. When the generative classifier failed, the
/// pattern verdict serves alone with empty fact arrays.
pub fn combine(
    primary: Result<PrimaryVerdict, ClassifierError>,
    secondary: PatternVerdict,
) -> Verdict {
    match primary {
        Ok(primary) => combine_verdicts(primary, secondary),
        Err(error) => {
            warn!(error = %error, "Primary classifier failed, pattern verdict serves alone");
            fallback_verdict(secondary)
        }
    }
}

fn combine_verdicts(primary: PrimaryVerdict, secondary: PatternVerdict) -> Verdict {
    let primary_confidence = PRIMARY_WEIGHT;
    let secondary_confidence = SECONDARY_WEIGHT * secondary.confidence;

    let (topic, confidence, source, reasoning) = if primary.topic == secondary.topic {
        (
            primary.topic,
            primary_confidence + secondary_confidence + AGREEMENT_BONUS,
            VerdictSource::Consensus,
            format!("both classifiers agree on {}", primary.topic),
        )
    } else if primary_confidence > secondary_confidence {
        (
            primary.topic,
            primary_confidence,
            VerdictSource::Primary,
            format!(
                "classifiers disagree ({} vs {}), generative verdict preferred",
                primary.topic, secondary.topic
            ),
        )
    } else {
        (
            secondary.topic,
            secondary_confidence,
            VerdictSource::Secondary,
            format!(
                "classifiers disagree ({} vs {}), pattern verdict preferred",
                primary.topic, secondary.topic
            ),
        )
    };

    info!(topic = %topic, confidence, source = %source, "Combined classification");

    Verdict {
        topic,
        confidence,
        source,
        external_needed: primary.external_needed,
        external_kind: primary.external_kind,
        external_reason: primary.external_reason,
        global_facts: primary.global_facts,
        topic_facts: primary.topic_facts,
        fallback_used: false,
        reasoning,
    }
}

/// The pattern verdict promoted to a full verdict. Its external-data
/// assessment survives, but it extracts no facts, so the fact arrays stay
/// empty rather than inventing anything.
fn fallback_verdict(secondary: PatternVerdict) -> Verdict {
    Verdict {
        topic: secondary.topic,
        confidence: secondary.confidence,
        source: VerdictSource::SecondaryFallback,
        external_needed: secondary.external_needed,
        external_kind: secondary.external_kind,
        external_reason: secondary.reason,
        global_facts: Vec::new(),
        topic_facts: BTreeMap::new(),
        fallback_used: true,
        reasoning: "primary classifier unavailable, pattern verdict served alone".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfinder_core::error::GeneratorError;
    use wayfinder_core::topic::Topic;
    use wayfinder_core::verdict::ExternalDataKind;

    fn primary(topic: Topic) -> PrimaryVerdict {
        PrimaryVerdict {
            topic,
            reasoning: "model reasoning".into(),
            external_needed: false,
            external_kind: ExternalDataKind::None,
            external_reason: "nothing live needed".into(),
            global_facts: vec!["destination: Kyoto".into()],
            topic_facts: BTreeMap::from([(topic, vec!["style: temples".into()])]),
        }
    }

    fn secondary(topic: Topic, confidence: f64) -> PatternVerdict {
        PatternVerdict {
            topic,
            confidence,
            external_needed: true,
            external_kind: ExternalDataKind::Weather,
            reason: "weather terms matched".into(),
        }
    }

    #[test]
    fn agreement_earns_the_bonus() {
        let verdict = combine(
            Ok(primary(Topic::PackingSuggestions)),
            secondary(Topic::PackingSuggestions, 0.5),
        );

        assert_eq!(verdict.topic, Topic::PackingSuggestions);
        assert_eq!(verdict.source, VerdictSource::Consensus);
        // 0.8 + 0.2 * 0.5 + 0.3
        assert!((verdict.confidence - 1.2).abs() < 1e-9);
        assert!(!verdict.fallback_used);
    }

    #[test]
    fn disagreement_goes_to_the_primary() {
        let verdict = combine(
            Ok(primary(Topic::PackingSuggestions)),
            secondary(Topic::DestinationRecommendations, 0.6),
        );

        assert_eq!(verdict.topic, Topic::PackingSuggestions);
        assert_eq!(verdict.source, VerdictSource::Primary);
        assert!((verdict.confidence - PRIMARY_WEIGHT).abs() < 1e-9);
    }

    #[test]
    fn external_assessment_comes_from_the_primary_only() {
        // The secondary wants weather; the primary said nothing is needed.
        let verdict = combine(
            Ok(primary(Topic::PackingSuggestions)),
            secondary(Topic::PackingSuggestions, 1.0),
        );

        assert!(!verdict.external_needed);
        assert_eq!(verdict.external_kind, ExternalDataKind::None);
        assert_eq!(verdict.global_facts, vec!["destination: Kyoto".to_string()]);
    }

    #[test]
    fn failed_primary_falls_back_without_facts() {
        let verdict = combine(
            Err(ClassifierError::Generation(GeneratorError::Timeout(
                "deadline".into(),
            ))),
            secondary(Topic::LocalAttractions, 0.4),
        );

        assert_eq!(verdict.topic, Topic::LocalAttractions);
        assert_eq!(verdict.source, VerdictSource::SecondaryFallback);
        assert!(verdict.fallback_used);
        assert!((verdict.confidence - 0.4).abs() < 1e-9);
        // The pattern verdict's external assessment survives the fallback.
        assert!(verdict.external_needed);
        assert_eq!(verdict.external_kind, ExternalDataKind::Weather);
        // But no facts are invented.
        assert!(verdict.global_facts.is_empty());
        assert!(verdict.topic_facts.is_empty());
    }

    #[test]
    fn pattern_confidence_never_outweighs_the_primary() {
        // Even at full confidence the secondary's weighted score is 0.2,
        // well under the primary's 0.8.
        let verdict = combine(
            Ok(primary(Topic::DestinationRecommendations)),
            secondary(Topic::LocalAttractions, 1.0),
        );

        assert_eq!(verdict.topic, Topic::DestinationRecommendations);
        assert_eq!(verdict.source, VerdictSource::Primary);
    }
}
