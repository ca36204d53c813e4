//! The per-turn decision pipeline.
//!
//! One `process_turn` call runs the whole sequence: classify, merge facts,
//! gather external data, score, gate, select a strategy, and append the
//! turn to the transcript. Every stage degrades instead of failing, so the
//! pipeline always produces a [`TurnDecision`]; the worst outcome of any
//! single failure is a leaner decision for that one turn.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};
use wayfinder_classify::{combine, PatternClassifier};
use wayfinder_core::classify::Classifier;
use wayfinder_core::error::{ClassifierError, StoreError};
use wayfinder_core::external::{
    AttractionsSource, ExternalPayload, ExternalReport, PayloadCache, WeatherSource,
};
use wayfinder_core::fact::{Fact, FactExtractor, FactSet};
use wayfinder_core::session::{SessionId, Turn};
use wayfinder_core::store::{ContextStore, SessionStore, TranscriptStore};
use wayfinder_core::topic::Scope;
use wayfinder_core::verdict::{PrimaryVerdict, Verdict};
use wayfinder_scoring::{CompletenessScorer, UtteranceExtractor};
use wayfinder_strategy::{RelevanceGate, StrategySelector};

use crate::turn::TurnDecision;

const DEFAULT_HISTORY_WINDOW: usize = 6;
const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 20;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// The decision engine: one instance serves any number of sessions.
pub struct Engine {
    /// The generative (primary) classifier
    classifier: Arc<dyn Classifier>,

    /// The deterministic fallback classifier
    patterns: PatternClassifier,

    /// Session-keyed fact and transcript storage
    store: Arc<dyn SessionStore>,

    /// TTL cache for fetched payloads
    cache: Arc<dyn PayloadCache>,

    scorer: CompletenessScorer,

    /// Shared with the scorer; also resolves destinations from raw text
    extractor: Arc<dyn FactExtractor>,

    gate: RelevanceGate,
    selector: StrategySelector,

    /// Live weather, when configured
    weather: Option<Arc<dyn WeatherSource>>,

    /// Live attractions, when configured
    attractions: Option<Arc<dyn AttractionsSource>>,

    /// How many recent turns feed the classifier and the gate
    history_window: usize,

    /// Deadline for the primary classifier before the pattern fallback
    classifier_timeout_secs: u64,

    /// Per-fetch deadline for external data
    fetch_timeout_secs: u64,

    /// Freshness window for cached payloads
    cache_ttl_secs: u64,
}

impl Engine {
    /// Create an engine over a classifier, a store, and a payload cache.
    /// External data sources are attached separately; without them the
    /// engine still runs every turn, just without live payloads.
    pub fn new(
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn SessionStore>,
        cache: Arc<dyn PayloadCache>,
    ) -> Self {
        let extractor: Arc<dyn FactExtractor> = Arc::new(UtteranceExtractor::new());
        Self {
            classifier,
            patterns: PatternClassifier::new(),
            store,
            cache,
            scorer: CompletenessScorer::new(extractor.clone()),
            extractor,
            gate: RelevanceGate::new(),
            selector: StrategySelector::new(),
            weather: None,
            attractions: None,
            history_window: DEFAULT_HISTORY_WINDOW,
            classifier_timeout_secs: DEFAULT_CLASSIFIER_TIMEOUT_SECS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }

    /// Attach a live weather source.
    pub fn with_weather_source(mut self, source: Arc<dyn WeatherSource>) -> Self {
        self.weather = Some(source);
        self
    }

    /// Attach a live attractions source.
    pub fn with_attractions_source(mut self, source: Arc<dyn AttractionsSource>) -> Self {
        self.attractions = Some(source);
        self
    }

    /// Set how many recent turns feed the classifier and the gate.
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// Set the primary-classifier deadline in seconds.
    pub fn with_classifier_timeout_secs(mut self, secs: u64) -> Self {
        self.classifier_timeout_secs = secs;
        self
    }

    /// Set the per-fetch deadline in seconds.
    pub fn with_fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    /// Set how long fetched payloads stay fresh.
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Run the full pipeline for one utterance.
    ///
    /// Always produces a decision: classifier failures fall back to the
    /// pattern verdict, fetch failures drop the payload for the turn, and
    /// store failures lose at most this turn's writes.
    pub async fn process_turn(&self, session: &SessionId, utterance: &str) -> TurnDecision {
        info!(session = %session, "Processing turn");

        // ── Classification ──
        let recent_turns = match self.store.recent_turns(session, self.history_window).await {
            Ok(turns) => turns,
            Err(e) => {
                warn!(error = %e, "Transcript load failed, classifying without history");
                Vec::new()
            }
        };

        let primary = self.classify_primary(utterance, &recent_turns).await;
        let secondary = self.patterns.classify(utterance);
        let verdict = combine(primary, secondary);

        // ── Fact merge ──
        self.merge_verdict_facts(session, &verdict).await;

        // ── External data ──
        let (weather, attractions) = self.gather_external(session, &verdict, utterance).await;

        // ── Score, gate, select ──
        let global_facts = self.facts_or_empty(session, Scope::Global).await;
        let topic_facts = self
            .facts_or_empty(session, Scope::Topic(verdict.topic))
            .await;

        let mut scorable = global_facts.clone();
        scorable.extend(topic_facts.iter().cloned());
        let profile = self.scorer.score(&scorable, utterance);

        let gate = self.gate.evaluate(
            &verdict,
            utterance,
            &recent_turns,
            weather.as_ref(),
            attractions.as_ref(),
        );

        let prior_turns = match self.store.turn_count(session).await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Turn count unavailable, using the loaded window");
                recent_turns.len()
            }
        };
        let strategy = self.selector.select(profile.tier, &gate, prior_turns);

        // ── Transcript ──
        if let Err(e) = self.store.append_turn(session, Turn::user(utterance)).await {
            warn!(error = %e, "Failed to record the user turn");
        }

        info!(
            topic = %verdict.topic,
            source = %verdict.source,
            tier = %profile.tier,
            strategy = %strategy.kind,
            "Turn decided"
        );

        TurnDecision {
            session: session.clone(),
            utterance: utterance.to_string(),
            recent_turns,
            prior_turns,
            verdict,
            profile,
            gate,
            strategy,
            global_facts,
            topic_facts,
            weather,
            attractions,
        }
    }

    /// Record the assistant's answer in the transcript.
    pub async fn record_answer(&self, session: &SessionId, text: &str) -> Result<(), StoreError> {
        self.store.append_turn(session, Turn::assistant(text)).await
    }

    /// Clear everything stored for the session.
    pub async fn reset(&self, session: &SessionId) -> Result<(), StoreError> {
        info!(session = %session, "Resetting session");
        self.store.reset(session).await
    }

    async fn classify_primary(
        &self,
        utterance: &str,
        recent_turns: &[Turn],
    ) -> Result<PrimaryVerdict, ClassifierError> {
        let deadline = Duration::from_secs(self.classifier_timeout_secs);
        match timeout(deadline, self.classifier.classify(utterance, recent_turns)).await {
            Ok(result) => result,
            Err(_) => Err(ClassifierError::Timeout {
                timeout_secs: self.classifier_timeout_secs,
            }),
        }
    }

    /// Fold the verdict's fact arrays into the store, global scope first.
    /// A failed merge loses this turn's facts for that scope and nothing
    /// else.
    async fn merge_verdict_facts(&self, session: &SessionId, verdict: &Verdict) {
        let global = Fact::parse_all(&verdict.global_facts);
        if !global.is_empty() {
            if let Err(e) = self.store.merge_facts(session, Scope::Global, global).await {
                warn!(error = %e, "Global fact merge failed, facts lost for this turn");
            }
        }

        for (topic, fragments) in &verdict.topic_facts {
            let facts = Fact::parse_all(fragments);
            if facts.is_empty() {
                continue;
            }
            if let Err(e) = self
                .store
                .merge_facts(session, Scope::Topic(*topic), facts)
                .await
            {
                warn!(error = %e, topic = %topic, "Topic fact merge failed, facts lost for this turn");
            }
        }
    }

    /// Gather the payloads the verdict asked for, cache-first.
    async fn gather_external(
        &self,
        session: &SessionId,
        verdict: &Verdict,
        utterance: &str,
    ) -> (Option<ExternalPayload>, Option<ExternalPayload>) {
        if !verdict.external_needed {
            return (None, None);
        }

        let Some(location) = self.resolve_location(session, verdict, utterance).await else {
            debug!("External data requested but no destination is known yet");
            return (None, None);
        };

        let weather = if verdict.external_kind.wants_weather() {
            self.weather_payload(&location).await
        } else {
            None
        };
        let attractions = if verdict.external_kind.wants_attractions() {
            self.attractions_payload(&location).await
        } else {
            None
        };
        (weather, attractions)
    }

    /// Resolve a destination to fetch for: this turn's extraction first,
    /// then the accumulated profile, then the raw utterance.
    async fn resolve_location(
        &self,
        session: &SessionId,
        verdict: &Verdict,
        utterance: &str,
    ) -> Option<String> {
        // Fresh facts beat stored ones: "what about Osaka instead?" must
        // not fetch for the Tokyo learned three turns ago.
        for fragment in &verdict.global_facts {
            if let Some(Fact::Keyed { key, value }) = Fact::parse(fragment) {
                if key.eq_ignore_ascii_case("destination") {
                    return Some(value);
                }
            }
        }

        match self.store.facts(session, Scope::Global).await {
            Ok(facts) => {
                let set: FactSet = facts.into_iter().collect();
                if let Some(value) = set.get("destination") {
                    // Accumulated values read oldest-first; fetch for the
                    // latest mention.
                    if let Some(latest) = value.split(", ").last() {
                        return Some(latest.to_string());
                    }
                }
            }
            Err(e) => warn!(error = %e, "Fact load failed during destination lookup"),
        }

        self.extractor
            .extract(utterance)
            .into_iter()
            .find_map(|fact| match fact {
                Fact::Keyed { key, value } if key == "destination" => Some(value),
                _ => None,
            })
    }

    async fn weather_payload(&self, location: &str) -> Option<ExternalPayload> {
        let key = format!("weather:{}", location.to_lowercase());
        if let Some(hit) = self.cache.get(&key).await {
            debug!(location, "Weather served from cache");
            return Some(hit);
        }

        let Some(source) = &self.weather else {
            debug!("No weather source configured, payload omitted");
            return None;
        };

        let deadline = Duration::from_secs(self.fetch_timeout_secs);
        match timeout(deadline, source.fetch(location)).await {
            Ok(Ok(report)) => {
                let payload =
                    ExternalPayload::new(ExternalReport::Weather(report), self.cache_ttl_secs);
                self.cache.put(&key, payload.clone()).await;
                Some(payload)
            }
            Ok(Err(e)) => {
                warn!(error = %e, location, "Weather fetch failed, payload omitted");
                None
            }
            Err(_) => {
                warn!(location, "Weather fetch timed out, payload omitted");
                None
            }
        }
    }

    async fn attractions_payload(&self, location: &str) -> Option<ExternalPayload> {
        let key = format!("attractions:{}", location.to_lowercase());
        if let Some(hit) = self.cache.get(&key).await {
            debug!(location, "Attractions served from cache");
            return Some(hit);
        }

        let Some(source) = &self.attractions else {
            debug!("No attractions source configured, payload omitted");
            return None;
        };

        let deadline = Duration::from_secs(self.fetch_timeout_secs);
        match timeout(deadline, source.fetch(location)).await {
            Ok(Ok(report)) => {
                let payload =
                    ExternalPayload::new(ExternalReport::Attractions(report), self.cache_ttl_secs);
                self.cache.put(&key, payload.clone()).await;
                Some(payload)
            }
            Ok(Err(e)) => {
                warn!(error = %e, location, "Attractions fetch failed, payload omitted");
                None
            }
            Err(_) => {
                warn!(location, "Attractions fetch timed out, payload omitted");
                None
            }
        }
    }

    async fn facts_or_empty(&self, session: &SessionId, scope: Scope) -> Vec<Fact> {
        match self.store.facts(session, scope).await {
            Ok(facts) => facts,
            Err(e) => {
                warn!(error = %e, scope = %scope, "Fact load failed, proceeding without stored facts");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use wayfinder_core::error::{FetchError, GeneratorError};
    use wayfinder_core::external::{CurrentConditions, WeatherReport};
    use wayfinder_core::profile::CompletenessTier;
    use wayfinder_core::strategy::StrategyKind;
    use wayfinder_core::topic::Topic;
    use wayfinder_core::verdict::{ExternalDataKind, VerdictSource};
    use wayfinder_external::MemoryPayloadCache;
    use wayfinder_store::InMemoryStore;

    // ── Mocks ────────────────────────────────────────────────────────────

    /// Returns the same verdict (or error) every call and counts calls.
    struct ScriptedClassifier {
        verdict: Result<PrimaryVerdict, ClassifierError>,
        calls: Mutex<usize>,
    }

    impl ScriptedClassifier {
        fn ok(verdict: PrimaryVerdict) -> Arc<Self> {
            Arc::new(Self {
                verdict: Ok(verdict),
                calls: Mutex::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                verdict: Err(ClassifierError::MissingJson),
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl Classifier for ScriptedClassifier {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn classify(
            &self,
            _utterance: &str,
            _recent_turns: &[Turn],
        ) -> Result<PrimaryVerdict, ClassifierError> {
            *self.calls.lock().unwrap() += 1;
            self.verdict.clone()
        }
    }

    /// Never answers within any reasonable deadline.
    struct SleepyClassifier;

    #[async_trait]
    impl Classifier for SleepyClassifier {
        fn name(&self) -> &str {
            "sleepy"
        }

        async fn classify(
            &self,
            _utterance: &str,
            _recent_turns: &[Turn],
        ) -> Result<PrimaryVerdict, ClassifierError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(GeneratorError::Timeout("unreachable".into()).into())
        }
    }

    /// Serves a fixed report and records every fetch.
    struct CountingWeather {
        calls: Mutex<usize>,
        locations: Mutex<Vec<String>>,
    }

    impl CountingWeather {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(0),
                locations: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl WeatherSource for CountingWeather {
        async fn fetch(&self, location: &str) -> Result<WeatherReport, FetchError> {
            *self.calls.lock().unwrap() += 1;
            self.locations.lock().unwrap().push(location.to_string());
            Ok(WeatherReport {
                location: location.to_string(),
                current: Some(CurrentConditions {
                    temperature_c: 19.0,
                    feels_like_c: 18.0,
                    humidity_pct: 60,
                    description: "scattered clouds".into(),
                    wind_speed_ms: 4.1,
                }),
                forecast: Vec::new(),
            })
        }
    }

    struct FailingWeather;

    #[async_trait]
    impl WeatherSource for FailingWeather {
        async fn fetch(&self, _location: &str) -> Result<WeatherReport, FetchError> {
            Err(FetchError::Network("connection refused".into()))
        }
    }

    // ── Fixtures ─────────────────────────────────────────────────────────

    fn packing_verdict(kind: ExternalDataKind) -> PrimaryVerdict {
        PrimaryVerdict {
            topic: Topic::PackingSuggestions,
            reasoning: "asks what to bring".into(),
            external_needed: kind != ExternalDataKind::None,
            external_kind: kind,
            external_reason: "conditions affect packing".into(),
            global_facts: vec!["destination: Lisbon".into(), "duration: 5 days".into()],
            topic_facts: BTreeMap::from([(
                Topic::PackingSuggestions,
                vec!["packing_style: carry-on only".into()],
            )]),
        }
    }

    fn empty_verdict() -> PrimaryVerdict {
        PrimaryVerdict {
            topic: Topic::DestinationRecommendations,
            reasoning: "no details given".into(),
            external_needed: false,
            external_kind: ExternalDataKind::None,
            external_reason: String::new(),
            global_facts: Vec::new(),
            topic_facts: BTreeMap::new(),
        }
    }

    fn engine_with(classifier: Arc<dyn Classifier>) -> (Engine, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let engine = Engine::new(
            classifier,
            store.clone(),
            Arc::new(MemoryPayloadCache::new()),
        );
        (engine, store)
    }

    // ── Tests ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn consensus_turn_merges_facts_and_records_the_turn() {
        let classifier = ScriptedClassifier::ok(packing_verdict(ExternalDataKind::None));
        let (engine, store) = engine_with(classifier.clone());
        let session = SessionId::from("s1");

        let decision = engine
            .process_turn(&session, "what should I pack for my trip?")
            .await;

        assert_eq!(decision.verdict.source, VerdictSource::Consensus);
        assert!(!decision.verdict.fallback_used);
        assert_eq!(decision.prior_turns, 0);
        assert!(decision.recent_turns.is_empty());
        assert_eq!(*classifier.calls.lock().unwrap(), 1);

        // Merged into the store, and snapshotted on the decision.
        let global = store.facts(&session, Scope::Global).await.unwrap();
        assert!(global.contains(&Fact::keyed("destination", "Lisbon")));
        assert_eq!(decision.global_facts, global);
        assert_eq!(
            decision.topic_facts,
            vec![Fact::keyed("packing_style", "carry-on only")]
        );

        // The user turn landed in the transcript.
        assert_eq!(store.turn_count(&session).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_primary_falls_back_and_merges_nothing() {
        let (engine, store) = engine_with(ScriptedClassifier::failing());
        let session = SessionId::from("s1");

        let decision = engine.process_turn(&session, "what should I pack?").await;

        assert_eq!(decision.verdict.source, VerdictSource::SecondaryFallback);
        assert!(decision.verdict.fallback_used);
        assert_eq!(decision.verdict.topic, Topic::PackingSuggestions);
        assert!(store.facts(&session, Scope::Global).await.unwrap().is_empty());
        // The turn still completes: transcript gets the utterance.
        assert_eq!(store.turn_count(&session).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_primary_times_out_into_the_fallback() {
        let store = Arc::new(InMemoryStore::new());
        let engine = Engine::new(
            Arc::new(SleepyClassifier),
            store.clone(),
            Arc::new(MemoryPayloadCache::new()),
        )
        .with_classifier_timeout_secs(5);
        let session = SessionId::from("s1");

        let decision = engine.process_turn(&session, "what should I pack?").await;

        assert!(decision.verdict.fallback_used);
        assert_eq!(decision.verdict.source, VerdictSource::SecondaryFallback);
    }

    #[tokio::test]
    async fn weather_is_fetched_once_then_served_from_cache() {
        let source = CountingWeather::new();
        let classifier = ScriptedClassifier::ok(packing_verdict(ExternalDataKind::Weather));
        let store = Arc::new(InMemoryStore::new());
        let engine = Engine::new(
            classifier,
            store.clone(),
            Arc::new(MemoryPayloadCache::new()),
        )
        .with_weather_source(source.clone());
        let session = SessionId::from("s1");

        let first = engine
            .process_turn(&session, "leaving tomorrow, what should I pack?")
            .await;
        assert!(first.weather.is_some());
        assert!(first.gate.weather_allowed());
        assert!(first.strategy.use_external.weather);
        assert_eq!(source.calls(), 1);

        let second = engine
            .process_turn(&session, "anything else for tomorrow?")
            .await;
        assert!(second.weather.is_some());
        assert_eq!(source.calls(), 1, "second turn must hit the cache");
    }

    #[tokio::test]
    async fn fetch_failure_omits_the_payload_and_the_gate_withholds() {
        let classifier = ScriptedClassifier::ok(packing_verdict(ExternalDataKind::Weather));
        let store = Arc::new(InMemoryStore::new());
        let engine = Engine::new(
            classifier,
            store.clone(),
            Arc::new(MemoryPayloadCache::new()),
        )
        .with_weather_source(Arc::new(FailingWeather));
        let session = SessionId::from("s1");

        let decision = engine
            .process_turn(&session, "leaving tomorrow, what should I pack?")
            .await;

        assert!(decision.weather.is_none());
        let ruling = decision.gate.weather.as_ref().unwrap();
        assert!(!ruling.relevant);
        assert!(ruling.reason.contains("no weather data"));
        assert!(!decision.strategy.use_external.weather);
    }

    #[tokio::test]
    async fn unknown_destination_skips_the_fetch() {
        let mut verdict = packing_verdict(ExternalDataKind::Weather);
        verdict.global_facts = vec!["duration: 5 days".into()];
        let source = CountingWeather::new();
        let store = Arc::new(InMemoryStore::new());
        let engine = Engine::new(
            ScriptedClassifier::ok(verdict),
            store.clone(),
            Arc::new(MemoryPayloadCache::new()),
        )
        .with_weather_source(source.clone());
        let session = SessionId::from("s1");

        let decision = engine.process_turn(&session, "what should I pack?").await;

        assert_eq!(source.calls(), 0);
        assert!(decision.weather.is_none());
    }

    #[tokio::test]
    async fn stored_destination_serves_later_fetches() {
        let source = CountingWeather::new();
        let store = Arc::new(InMemoryStore::new());

        // Turn one stores a destination, no external data wanted.
        let mut first = packing_verdict(ExternalDataKind::None);
        first.global_facts = vec!["destination: Osaka".into()];
        let engine = Engine::new(
            ScriptedClassifier::ok(first),
            store.clone(),
            Arc::new(MemoryPayloadCache::new()),
        )
        .with_weather_source(source.clone());
        let session = SessionId::from("s1");
        engine.process_turn(&session, "I'm going to Osaka").await;

        // Turn two asks for weather without restating the destination.
        let mut second = packing_verdict(ExternalDataKind::Weather);
        second.global_facts = Vec::new();
        second.topic_facts = BTreeMap::new();
        let engine = Engine::new(
            ScriptedClassifier::ok(second),
            store.clone(),
            Arc::new(MemoryPayloadCache::new()),
        )
        .with_weather_source(source.clone());

        let decision = engine
            .process_turn(&session, "how's the weather right now?")
            .await;

        assert!(decision.weather.is_some());
        assert_eq!(source.locations.lock().unwrap().as_slice(), ["Osaka"]);
    }

    #[tokio::test]
    async fn fresh_destination_beats_the_stored_one() {
        let source = CountingWeather::new();
        let store = Arc::new(InMemoryStore::new());
        let session = SessionId::from("s1");

        let mut first = packing_verdict(ExternalDataKind::None);
        first.global_facts = vec!["destination: Tokyo".into()];
        let engine = Engine::new(
            ScriptedClassifier::ok(first),
            store.clone(),
            Arc::new(MemoryPayloadCache::new()),
        );
        engine.process_turn(&session, "thinking about Tokyo").await;

        let mut second = packing_verdict(ExternalDataKind::Weather);
        second.global_facts = vec!["destination: Osaka".into()];
        let engine = Engine::new(
            ScriptedClassifier::ok(second),
            store.clone(),
            Arc::new(MemoryPayloadCache::new()),
        )
        .with_weather_source(source.clone());

        engine
            .process_turn(&session, "what about Osaka right now instead?")
            .await;

        assert_eq!(source.locations.lock().unwrap().as_slice(), ["Osaka"]);
        // Both mentions accumulated in the profile.
        let global: FactSet = store
            .facts(&session, Scope::Global)
            .await
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(global.get("destination"), Some("Tokyo, Osaka"));
    }

    #[tokio::test]
    async fn record_answer_and_reset_round_trip() {
        let classifier = ScriptedClassifier::ok(packing_verdict(ExternalDataKind::None));
        let (engine, store) = engine_with(classifier);
        let session = SessionId::from("s1");

        engine.process_turn(&session, "what should I pack?").await;
        engine
            .record_answer(&session, "A light jacket and good shoes.")
            .await
            .unwrap();
        assert_eq!(store.turn_count(&session).await.unwrap(), 2);

        // The next decision sees both turns in its window.
        let decision = engine.process_turn(&session, "anything else?").await;
        assert_eq!(decision.recent_turns.len(), 2);
        assert_eq!(decision.prior_turns, 2);

        engine.reset(&session).await.unwrap();
        assert_eq!(store.turn_count(&session).await.unwrap(), 0);
        assert!(store.facts(&session, Scope::Global).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stalled_questioning_escalates_to_hybrid() {
        let classifier = ScriptedClassifier::ok(empty_verdict());
        let (engine, _store) = engine_with(classifier);
        let session = SessionId::from("s1");

        // Three exchanges that teach the engine nothing.
        for utterance in ["hmm", "still not sure", "you pick"] {
            let decision = engine.process_turn(&session, utterance).await;
            assert_eq!(decision.profile.tier, CompletenessTier::Minimal);
            assert_eq!(decision.strategy.kind, StrategyKind::QuestionFocused);
            engine
                .record_answer(&session, "Could you tell me a bit more?")
                .await
                .unwrap();
        }

        // Six prior turns now; the selector stops interrogating.
        let decision = engine.process_turn(&session, "anywhere is fine").await;
        assert_eq!(decision.prior_turns, 6);
        assert_eq!(decision.strategy.kind, StrategyKind::Hybrid);
    }
}
