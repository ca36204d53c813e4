//! `wayfinder inspect` — Dump the decision pipeline's output for one
//! utterance as pretty JSON.

use std::sync::Arc;

use wayfinder_classify::NullClassifier;
use wayfinder_core::session::SessionId;
use wayfinder_engine::Engine;
use wayfinder_external::MemoryPayloadCache;
use wayfinder_store::InMemoryStore;

pub async fn run(utterance: &str) -> Result<(), Box<dyn std::error::Error>> {
    // No model, no fetchers: the pattern classifier and the utterance
    // extractor carry the whole decision, so inspection works offline.
    let engine = Engine::new(
        Arc::new(NullClassifier),
        Arc::new(InMemoryStore::new()),
        Arc::new(MemoryPayloadCache::new()),
    );

    let session = SessionId::new();
    let decision = engine.process_turn(&session, utterance).await;

    println!("{}", serde_json::to_string_pretty(&decision)?);

    Ok(())
}
