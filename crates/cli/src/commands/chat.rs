//! `wayfinder chat` — Interactive or single-message travel chat.

use std::io::Write as _;
use std::sync::Arc;

use tokio::io::AsyncBufReadExt;
use wayfinder_classify::GenerativeClassifier;
use wayfinder_config::AppConfig;
use wayfinder_core::generate::{GenerateRequest, Generator};
use wayfinder_core::session::SessionId;
use wayfinder_core::store::{ContextStore, SessionStore};
use wayfinder_core::topic::{Scope, Topic};
use wayfinder_engine::{Engine, PromptRenderer};
use wayfinder_external::{GeoapifySource, MemoryPayloadCache, OpenWeatherSource};
use wayfinder_providers::GeminiGenerator;
use wayfinder_store::{FileStore, InMemoryStore};

pub async fn run(
    message: Option<String>,
    session: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    let Some(api_key) = config.api_key.clone() else {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    WAYFINDER_API_KEY=...    (generic)");
        eprintln!("    GOOGLE_AI_API_KEY=...    (Google AI Studio key)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        eprintln!("  Get a key at: https://aistudio.google.com/apikey");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    };

    // One generator serves both classification and answers
    let generator: Arc<dyn Generator> =
        Arc::new(GeminiGenerator::new(api_key, config.model.clone()));
    let classifier = Arc::new(GenerativeClassifier::new(generator.clone()));

    // The chat command keeps its own store handle for the /facts view
    let store: Arc<dyn SessionStore> = match config.store.backend.as_str() {
        "file" => Arc::new(FileStore::new(config.store.resolved_data_dir())),
        _ => Arc::new(InMemoryStore::new()),
    };

    let mut engine = Engine::new(classifier, store.clone(), Arc::new(MemoryPayloadCache::new()))
        .with_history_window(config.engine.history_window)
        .with_classifier_timeout_secs(config.engine.classifier_timeout_secs)
        .with_fetch_timeout_secs(config.external.fetch_timeout_secs)
        .with_cache_ttl_secs(config.external.cache_ttl_secs);

    if let Some(key) = &config.external.weather_api_key {
        engine = engine.with_weather_source(Arc::new(OpenWeatherSource::new(key.clone())));
    }
    if let Some(key) = &config.external.attractions_api_key {
        engine = engine.with_attractions_source(Arc::new(GeoapifySource::new(key.clone())));
    }

    let renderer = PromptRenderer::new();
    let session = match session {
        Some(name) => SessionId::from(&name),
        None => SessionId::new(),
    };

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let decision = engine.process_turn(&session, &msg).await;
        let request = GenerateRequest::new(renderer.render(&decision))
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens);
        let answer = generator.generate(request).await?;
        eprint!("\r              \r");
        println!("{answer}");
        engine.record_answer(&session, &answer).await?;
    } else {
        // Interactive mode
        let weather_status = if config.external.weather_api_key.is_some() {
            "live (OpenWeatherMap)"
        } else {
            "not configured"
        };
        let attractions_status = if config.external.attractions_api_key.is_some() {
            "live (Geoapify)"
        } else {
            "not configured"
        };

        println!();
        println!("  ╔══════════════════════════════════════════════╗");
        println!("  ║       Wayfinder — Travel Planning Chat       ║");
        println!("  ╚══════════════════════════════════════════════╝");
        println!();
        println!("  Model:        {}", config.model);
        println!("  Store:        {}", config.store.backend);
        println!("  Session:      {session}");
        println!("  Weather:      {weather_status}");
        println!("  Attractions:  {attractions_status}");
        println!();
        println!("  Ask about destinations, packing, or things to do.");
        println!("  /facts shows what Wayfinder has learned, /reset starts over.");
        println!("  Type 'exit' or Ctrl+C to quit.");
        println!();

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        print!("  You > ");
        std::io::stdout().flush()?;

        while let Some(line) = lines.next_line().await? {
            let input = line.trim();

            match input {
                "" => {}
                "exit" | "quit" => break,
                "/reset" => match engine.reset(&session).await {
                    Ok(()) => println!("  Session cleared.\n"),
                    Err(e) => eprintln!("  [Error] {e}"),
                },
                "/facts" => print_facts(store.as_ref(), &session).await,
                _ => {
                    eprint!("  ...");

                    let decision = engine.process_turn(&session, input).await;
                    let request = GenerateRequest::new(renderer.render(&decision))
                        .with_temperature(config.temperature)
                        .with_max_tokens(config.max_tokens);

                    match generator.generate(request).await {
                        Ok(answer) => {
                            eprint!("\r     \r");
                            println!();
                            for line in answer.lines() {
                                println!("  Wayfinder > {line}");
                            }
                            println!();
                            if let Err(e) = engine.record_answer(&session, &answer).await {
                                tracing::warn!(error = %e, "Failed to record the answer");
                            }
                        }
                        Err(e) => {
                            eprint!("\r     \r");
                            eprintln!("  [Error] {e}");
                            println!();
                        }
                    }
                }
            }

            print!("  You > ");
            std::io::stdout().flush()?;
        }

        println!();
        println!("  Safe travels! 👋");
        println!();
    }

    Ok(())
}

/// Print everything the session has learned, profile first, then each
/// topic's own preferences.
async fn print_facts(store: &dyn SessionStore, session: &SessionId) {
    let mut any = false;

    match store.facts(session, Scope::Global).await {
        Ok(facts) => {
            if !facts.is_empty() {
                any = true;
                println!("  Traveler profile:");
                for fact in &facts {
                    println!("    • {}", fact.render());
                }
            }
        }
        Err(e) => {
            eprintln!("  [Error] {e}");
            return;
        }
    }

    for topic in Topic::ALL {
        if let Ok(facts) = store.facts(session, Scope::Topic(topic)).await {
            if !facts.is_empty() {
                any = true;
                println!("  For {}:", topic.label());
                for fact in &facts {
                    println!("    • {}", fact.render());
                }
            }
        }
    }

    if !any {
        println!("  Nothing learned about this trip yet.");
    }
    println!();
}
