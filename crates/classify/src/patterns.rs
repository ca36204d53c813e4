//! Deterministic keyword classifier.
//!
//! Scores each topic by keyword and phrase hits over the lowercased
//! utterance. Keywords count once, phrases twice, and the sum is
//! normalized by the topic's total pattern count so topics with bigger
//! vocabularies don't win by volume. Pure string matching: no model, no
//! network, no failure path.

use tracing::debug;
use wayfinder_core::topic::Topic;
use wayfinder_core::verdict::{ExternalDataKind, PatternVerdict};

const DESTINATION_KEYWORDS: &[&str] = &[
    "where to go",
    "destination",
    "recommend",
    "visit",
    "travel to",
    "best places",
    "suggestions",
    "trip ideas",
    "vacation spots",
    "cities",
    "countries",
    "places to visit",
    "travel recommendations",
];
const DESTINATION_PHRASES: &[&str] = &[
    "where should i go",
    "recommend a destination",
    "best place to visit",
    "travel suggestions",
    "vacation ideas",
];

const PACKING_KEYWORDS: &[&str] = &[
    "pack",
    "packing",
    "bring",
    "luggage",
    "suitcase",
    "clothes",
    "clothing",
    "what to wear",
    "items",
    "essentials",
    "bag",
];
const PACKING_PHRASES: &[&str] = &[
    "what should i pack",
    "what to bring",
    "packing list",
    "what clothes",
    "what items",
];

const ATTRACTIONS_KEYWORDS: &[&str] = &[
    "attractions",
    "activities",
    "things to do",
    "sightseeing",
    "museums",
    "restaurants",
    "landmarks",
    "tours",
    "experiences",
    "entertainment",
    "culture",
    "local",
    "places to see",
];
const ATTRACTIONS_PHRASES: &[&str] = &[
    "things to do",
    "what to see",
    "attractions in",
    "activities in",
    "places to visit in",
];

/// Vocabulary that suggests live weather matters to the question.
const WEATHER_VOCABULARY: &[&str] = &[
    "weather",
    "temperature",
    "rain",
    "snow",
    "climate",
    "season",
    "pack",
    "packing",
    "clothes",
    "clothing",
    "what to wear",
];

/// Vocabulary that suggests current location-specific data matters.
const LOCATION_VOCABULARY: &[&str] = &[
    "current",
    "now",
    "today",
    "this week",
    "real-time",
    "latest",
    "activities",
    "attractions",
    "things to do",
    "restaurants",
];

/// Confidence reported when no pattern matched at all.
const NO_MATCH_CONFIDENCE: f64 = 0.1;

/// The secondary classifier. Stateless and infallible.
pub struct PatternClassifier;

impl PatternClassifier {
    pub fn new() -> Self {
        Self
    }

    fn patterns_for(topic: Topic) -> (&'static [&'static str], &'static [&'static str]) {
        match topic {
            Topic::DestinationRecommendations => (DESTINATION_KEYWORDS, DESTINATION_PHRASES),
            Topic::PackingSuggestions => (PACKING_KEYWORDS, PACKING_PHRASES),
            Topic::LocalAttractions => (ATTRACTIONS_KEYWORDS, ATTRACTIONS_PHRASES),
        }
    }

    /// Score one topic against the lowercased utterance.
    fn score_topic(lowered: &str, topic: Topic) -> f64 {
        let (keywords, phrases) = Self::patterns_for(topic);

        let mut hits = 0usize;
        for keyword in keywords {
            if lowered.contains(keyword) {
                hits += 1;
            }
        }
        for phrase in phrases {
            if lowered.contains(phrase) {
                hits += 2;
            }
        }

        hits as f64 / (keywords.len() + phrases.len()) as f64
    }

    pub fn classify(&self, utterance: &str) -> PatternVerdict {
        let lowered = utterance.to_lowercase();

        // Argmax in declaration order. Strictly-greater replacement means
        // the earlier topic wins an exact tie.
        let mut best_topic = Topic::ALL[0];
        let mut best_score = Self::score_topic(&lowered, best_topic);
        for topic in &Topic::ALL[1..] {
            let score = Self::score_topic(&lowered, *topic);
            if score > best_score {
                best_topic = *topic;
                best_score = score;
            }
        }

        if best_score == 0.0 {
            best_topic = Topic::default();
            best_score = NO_MATCH_CONFIDENCE;
        }

        let weather_terms = lowered_hits(&lowered, WEATHER_VOCABULARY);
        let location_terms = lowered_hits(&lowered, LOCATION_VOCABULARY);

        let (external_needed, external_kind, reason) =
            if weather_terms > 0 && best_topic == Topic::PackingSuggestions {
                (
                    true,
                    ExternalDataKind::Weather,
                    "packing question with weather-related terms".to_string(),
                )
            } else if location_terms > 0 && best_topic == Topic::LocalAttractions {
                (
                    true,
                    ExternalDataKind::Attractions,
                    "attractions question with location-specific terms".to_string(),
                )
            } else {
                (
                    false,
                    ExternalDataKind::None,
                    "no external-data vocabulary matched".to_string(),
                )
            };

        debug!(topic = %best_topic, confidence = best_score, "Pattern classification");

        PatternVerdict {
            topic: best_topic,
            confidence: best_score,
            external_needed,
            external_kind,
            reason,
        }
    }
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn lowered_hits(lowered: &str, vocabulary: &[&str]) -> usize {
    vocabulary.iter().filter(|term| lowered.contains(*term)).count()
}
