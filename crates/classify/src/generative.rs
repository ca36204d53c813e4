//! Generative (primary) classifier.
//!
//! Prompts a [`Generator`] for a strict-JSON analysis of the utterance,
//! then validates the output into a [`PrimaryVerdict`]. Validation is
//! deliberately strict about the topic and lenient about the external-data
//! kind: an unknown topic fails the whole verdict (the combiner falls back
//! to patterns), an unknown kind is coerced to `none` so one bad enum
//! doesn't throw away good fact extraction.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use wayfinder_core::classify::Classifier;
use wayfinder_core::error::{ClassifierError, GeneratorError};
use wayfinder_core::generate::{GenerateRequest, Generator};
use wayfinder_core::session::{Turn, TurnRole};
use wayfinder_core::topic::Topic;
use wayfinder_core::verdict::{ExternalDataKind, PrimaryVerdict};

/// Classification wants determinism, not creativity.
const CLASSIFY_TEMPERATURE: f32 = 0.2;
const CLASSIFY_MAX_TOKENS: u32 = 1024;

pub struct GenerativeClassifier {
    generator: Arc<dyn Generator>,
}

impl GenerativeClassifier {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    fn build_prompt(utterance: &str, recent_turns: &[Turn]) -> String {
        let mut prompt = String::from(
            "You are the classification and extraction stage of a travel assistant.\n\
             Analyze the user's latest message and respond with ONLY a JSON object, no prose.\n\n",
        );

        if !recent_turns.is_empty() {
            prompt.push_str("CONVERSATION SO FAR:\n");
            for turn in recent_turns {
                let speaker = match turn.role {
                    TurnRole::User => "User",
                    TurnRole::Assistant => "Assistant",
                };
                let _ = writeln!(prompt, "{speaker}: {}", turn.text);
            }
            prompt.push('\n');
        }

        let _ = writeln!(prompt, "USER MESSAGE: \"{utterance}\"");

        prompt.push_str(
            "\nStep 1 - classify the message into exactly one topic:\n\
             - \"destination_recommendations\": where to go, trip ideas, comparing places\n\
             - \"packing_suggestions\": what to pack, bring, or wear\n\
             - \"local_attractions\": things to do, see, or eat in a place\n\
             \n\
             Step 2 - decide whether live external data would materially improve the answer:\n\
             - \"weather\": current conditions or forecast for a known destination\n\
             - \"attractions\": up-to-date attraction listings for a known destination\n\
             - \"both\" when the message needs weather and attractions, \"none\" otherwise\n\
             \n\
             Step 3 - extract traveler facts stated in the message as \"key: value\" strings.\n\
             Global facts hold regardless of topic. Use these keys when they apply:\n\
             destination, region, travel_dates, duration, budget, group_size,\n\
             travel_style, mobility, accessibility_needs, interests.\n\
             Topic facts capture preferences that only matter inside one topic.\n\
             Extract facts for ANY topic they belong to, not only the classified one.\n\
             \n\
             Rules:\n\
             - Extract only what the message actually states. Never invent values and\n\
               never echo the key list as placeholders.\n\
             - Lowercase snake_case keys, one \"key: value\" string per fact.\n\
             - Use empty arrays when nothing was stated.\n\
             \n\
             Respond with exactly this JSON shape:\n\
             {\n\
               \"topic\": \"destination_recommendations\" | \"packing_suggestions\" | \"local_attractions\",\n\
               \"reasoning\": \"one sentence\",\n\
               \"external_data_needed\": true | false,\n\
               \"external_data_kind\": \"weather\" | \"attractions\" | \"both\" | \"none\",\n\
               \"external_data_reason\": \"one sentence\",\n\
               \"global_facts\": [\"key: value\"],\n\
               \"destination_facts\": [\"key: value\"],\n\
               \"packing_facts\": [\"key: value\"],\n\
               \"attractions_facts\": [\"key: value\"]\n\
             }\n",
        );

        prompt
    }

    /// Locate the JSON object in the model's output, tolerating markdown
    /// fences and stray prose around it.
    fn extract_json(response: &str) -> Result<&str, ClassifierError> {
        let trimmed = response.trim();

        let inner = if let Some(start) = trimmed.find("```json") {
            let rest = &trimmed[start + 7..];
            match rest.find("```") {
                Some(end) => &rest[..end],
                None => rest,
            }
        } else if let Some(start) = trimmed.find("```") {
            let rest = &trimmed[start + 3..];
            match rest.find("```") {
                Some(end) => &rest[..end],
                None => rest,
            }
        } else {
            trimmed
        };

        let start = inner.find('{').ok_or(ClassifierError::MissingJson)?;
        let end = inner.rfind('}').ok_or(ClassifierError::MissingJson)?;
        if end < start {
            return Err(ClassifierError::MissingJson);
        }
        Ok(&inner[start..=end])
    }

    fn parse_verdict(response: &str) -> Result<PrimaryVerdict, ClassifierError> {
        let json = Self::extract_json(response)?;
        let raw: RawVerdict =
            serde_json::from_str(json).map_err(|e| ClassifierError::Malformed(e.to_string()))?;
        raw.into_verdict()
    }
}

#[async_trait]
impl Classifier for GenerativeClassifier {
    fn name(&self) -> &str {
        "generative"
    }

    async fn classify(
        &self,
        utterance: &str,
        recent_turns: &[Turn],
    ) -> Result<PrimaryVerdict, ClassifierError> {
        let prompt = Self::build_prompt(utterance, recent_turns);
        let request = GenerateRequest::new(prompt)
            .with_temperature(CLASSIFY_TEMPERATURE)
            .with_max_tokens(CLASSIFY_MAX_TOKENS);

        let response = self.generator.generate(request).await?;
        let verdict = Self::parse_verdict(&response)?;

        debug!(
            topic = %verdict.topic,
            external = %verdict.external_kind,
            global_facts = verdict.global_facts.len(),
            "Generative classification"
        );

        Ok(verdict)
    }
}

/// The wire shape the prompt demands. Missing `external_data_needed` or an
/// unparseable body is a malformed verdict; everything else has defaults.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    topic: String,
    #[serde(default)]
    reasoning: String,
    external_data_needed: bool,
    #[serde(default)]
    external_data_kind: String,
    #[serde(default)]
    external_data_reason: String,
    #[serde(default)]
    global_facts: Vec<String>,
    #[serde(default)]
    destination_facts: Vec<String>,
    #[serde(default)]
    packing_facts: Vec<String>,
    #[serde(default)]
    attractions_facts: Vec<String>,
}

impl RawVerdict {
    fn into_verdict(self) -> Result<PrimaryVerdict, ClassifierError> {
        let normalized = self.topic.trim().to_lowercase();
        let topic = Topic::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ClassifierError::Malformed(format!("unknown topic {:?}", self.topic)))?;

        let (external_needed, external_kind) =
            if ExternalDataKind::is_recognized(&self.external_data_kind) {
                (
                    self.external_data_needed,
                    ExternalDataKind::parse_lenient(&self.external_data_kind),
                )
            } else {
                warn!(kind = %self.external_data_kind, "Unrecognized external data kind, forcing none");
                (false, ExternalDataKind::None)
            };

        let mut topic_facts = BTreeMap::new();
        for (topic, facts) in [
            (Topic::DestinationRecommendations, self.destination_facts),
            (Topic::PackingSuggestions, self.packing_facts),
            (Topic::LocalAttractions, self.attractions_facts),
        ] {
            if !facts.is_empty() {
                topic_facts.insert(topic, facts);
            }
        }

        Ok(PrimaryVerdict {
            topic,
            reasoning: self.reasoning,
            external_needed,
            external_kind,
            external_reason: self.external_data_reason,
            global_facts: self.global_facts,
            topic_facts,
        })
    }
}

/// A classifier that always fails.
///
/// Offline tooling uses it to exercise the pattern-fallback path without a
/// configured generator.
pub struct NullClassifier;

#[async_trait]
impl Classifier for NullClassifier {
    fn name(&self) -> &str {
        "null"
    }

    async fn classify(
        &self,
        _utterance: &str,
        _recent_turns: &[Turn],
    ) -> Result<PrimaryVerdict, ClassifierError> {
        Err(GeneratorError::NotConfigured("no generator attached".into()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns one canned response and counts calls.
    struct CannedGenerator {
        response: String,
        calls: Mutex<usize>,
    }

    impl CannedGenerator {
        fn new(response: &str) -> Self {
            Self {
                response: response.into(),
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl Generator for CannedGenerator {
        fn name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, _request: GenerateRequest) -> Result<String, GeneratorError> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.response.clone())
        }
    }

    const VALID_RESPONSE: &str = r#"{
        "topic": "packing_suggestions",
        "reasoning": "The user asks what to bring.",
        "external_data_needed": true,
        "external_data_kind": "weather",
        "external_data_reason": "Current conditions affect packing.",
        "global_facts": ["destination: Lisbon", "duration: 5 days"],
        "destination_facts": [],
        "packing_facts": ["packing_style: carry-on only"],
        "attractions_facts": []
    }"#;

    #[tokio::test]
    async fn classifies_from_valid_json() {
        let generator = Arc::new(CannedGenerator::new(VALID_RESPONSE));
        let classifier = GenerativeClassifier::new(generator.clone());

        let verdict = classifier.classify("what should I bring?", &[]).await.unwrap();

        assert_eq!(verdict.topic, Topic::PackingSuggestions);
        assert!(verdict.external_needed);
        assert_eq!(verdict.external_kind, ExternalDataKind::Weather);
        assert_eq!(verdict.global_facts.len(), 2);
        assert_eq!(
            verdict.topic_facts.get(&Topic::PackingSuggestions).unwrap(),
            &vec!["packing_style: carry-on only".to_string()]
        );
        assert!(!verdict.topic_facts.contains_key(&Topic::LocalAttractions));
        assert_eq!(*generator.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn strips_markdown_fences() {
        let fenced = format!("```json\n{VALID_RESPONSE}\n```");
        let classifier = GenerativeClassifier::new(Arc::new(CannedGenerator::new(&fenced)));

        let verdict = classifier.classify("what should I bring?", &[]).await.unwrap();
        assert_eq!(verdict.topic, Topic::PackingSuggestions);
    }

    #[tokio::test]
    async fn unknown_topic_is_malformed() {
        let response = r#"{"topic": "flight_booking", "external_data_needed": false}"#;
        let classifier = GenerativeClassifier::new(Arc::new(CannedGenerator::new(response)));

        let err = classifier.classify("book me a flight", &[]).await.unwrap_err();
        assert!(matches!(err, ClassifierError::Malformed(_)));
    }

    #[tokio::test]
    async fn unknown_kind_is_coerced_to_none() {
        let response = r#"{
            "topic": "local_attractions",
            "external_data_needed": true,
            "external_data_kind": "currency_rates",
            "global_facts": ["destination: Prague"]
        }"#;
        let classifier = GenerativeClassifier::new(Arc::new(CannedGenerator::new(response)));

        let verdict = classifier.classify("things to do in Prague", &[]).await.unwrap();
        assert_eq!(verdict.topic, Topic::LocalAttractions);
        assert!(!verdict.external_needed);
        assert_eq!(verdict.external_kind, ExternalDataKind::None);
        assert_eq!(verdict.global_facts, vec!["destination: Prague".to_string()]);
    }

    #[tokio::test]
    async fn prose_without_json_is_missing_json() {
        let classifier = GenerativeClassifier::new(Arc::new(CannedGenerator::new(
            "I could not classify that message.",
        )));

        let err = classifier.classify("hello", &[]).await.unwrap_err();
        assert!(matches!(err, ClassifierError::MissingJson));
    }

    #[tokio::test]
    async fn null_classifier_always_fails() {
        let err = NullClassifier.classify("anything", &[]).await.unwrap_err();
        assert!(matches!(err, ClassifierError::Generation(_)));
    }

    #[test]
    fn prompt_includes_history_and_utterance() {
        let turns = vec![Turn::user("I want to visit Japan"), Turn::assistant("Great choice!")];
        let prompt = GenerativeClassifier::build_prompt("what should I pack?", &turns);

        assert!(prompt.contains("CONVERSATION SO FAR:"));
        assert!(prompt.contains("User: I want to visit Japan"));
        assert!(prompt.contains("USER MESSAGE: \"what should I pack?\""));
        assert!(prompt.contains("\"external_data_kind\""));
    }

    #[test]
    fn prompt_omits_empty_history() {
        let prompt = GenerativeClassifier::build_prompt("where should I go?", &[]);
        assert!(!prompt.contains("CONVERSATION SO FAR:"));
    }
}
