//! Prompt assembly for the answer generator.
//!
//! One rendered prompt per turn: a topic specialist preamble, the raw
//! query, a short conversation window, the accumulated traveler profile,
//! whatever external data passed the gate, and an instruction block shaped
//! by the selected strategy. Sections with nothing to say are omitted
//! entirely rather than rendered empty.

use std::fmt::Write as _;

use wayfinder_core::external::{AttractionsReport, ExternalReport, WeatherReport};
use wayfinder_core::session::TurnRole;
use wayfinder_core::strategy::{ResponseDepth, StrategyKind};
use wayfinder_core::topic::Topic;

use crate::turn::TurnDecision;

/// How many transcript entries the rendered prompt shows.
pub const RECENT_WINDOW: usize = 4;

/// Assistant answers are long; the window shows only their head.
const ASSISTANT_SNIPPET_CHARS: usize = 150;

/// Forecast points shown in the weather summary.
const FORECAST_SAMPLES: usize = 6;

pub struct PromptRenderer;

impl PromptRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render the full prompt for one decision.
    pub fn render(&self, decision: &TurnDecision) -> String {
        let topic = decision.verdict.topic;
        let mut prompt = String::new();

        prompt.push_str(Self::preamble(topic));
        prompt.push_str("\n\n");
        let _ = writeln!(prompt, "USER QUERY: \"{}\"", decision.utterance);
        prompt.push('\n');

        Self::push_conversation(&mut prompt, decision);
        Self::push_profile(&mut prompt, decision, topic);
        Self::push_external(&mut prompt, decision);
        Self::push_instructions(&mut prompt, decision, topic);

        prompt
    }

    fn preamble(topic: Topic) -> &'static str {
        match topic {
            Topic::DestinationRecommendations => {
                "You are an expert destination recommendation specialist with deep \
                 knowledge of global travel."
            }
            Topic::PackingSuggestions => {
                "You are an expert packing consultant with deep knowledge of travel \
                 gear, weather considerations, and activity-specific equipment."
            }
            Topic::LocalAttractions => {
                "You are an expert local attractions consultant with deep knowledge \
                 of destinations worldwide, current attractions, and visitor preferences."
            }
        }
    }

    fn push_conversation(prompt: &mut String, decision: &TurnDecision) {
        if decision.recent_turns.is_empty() {
            return;
        }
        prompt.push_str("RECENT CONVERSATION CONTEXT:\n");
        let start = decision.recent_turns.len().saturating_sub(RECENT_WINDOW);
        for turn in &decision.recent_turns[start..] {
            match turn.role {
                TurnRole::User => {
                    let _ = writeln!(prompt, "User: {}", turn.text);
                }
                TurnRole::Assistant => {
                    let _ = writeln!(prompt, "Assistant: {}", Self::snippet(&turn.text));
                }
            }
        }
        prompt.push('\n');
    }

    fn push_profile(prompt: &mut String, decision: &TurnDecision, topic: Topic) {
        if !decision.global_facts.is_empty() {
            prompt.push_str("GLOBAL TRAVELER INFORMATION:\n");
            for fact in &decision.global_facts {
                let _ = writeln!(prompt, "• {}", fact.render());
            }
            prompt.push('\n');
        }

        if !decision.topic_facts.is_empty() {
            let _ = writeln!(prompt, "{}:", Self::preferences_header(topic));
            for fact in &decision.topic_facts {
                let _ = writeln!(prompt, "• {}", fact.render());
            }
            prompt.push('\n');
        }
    }

    /// Only payloads the strategy permits are rendered; a withheld payload
    /// stays invisible no matter what was fetched.
    fn push_external(prompt: &mut String, decision: &TurnDecision) {
        let weather = decision
            .strategy
            .use_external
            .weather
            .then(|| decision.weather.as_ref())
            .flatten()
            .and_then(|payload| match &payload.report {
                ExternalReport::Weather(report) => Some(Self::weather_summary(report)),
                ExternalReport::Attractions(_) => None,
            });

        let attractions = decision
            .strategy
            .use_external
            .attractions
            .then(|| decision.attractions.as_ref())
            .flatten()
            .and_then(|payload| match &payload.report {
                ExternalReport::Attractions(report) => Some(Self::attractions_summary(report)),
                ExternalReport::Weather(_) => None,
            });

        if weather.is_none() && attractions.is_none() {
            return;
        }

        prompt.push_str("EXTERNAL DATA AVAILABLE:\n");
        if let Some(summary) = weather {
            let _ = writeln!(prompt, "• weather: {summary}");
        }
        if let Some(summary) = attractions {
            let _ = writeln!(prompt, "• attractions: {summary}");
        }
        prompt.push('\n');
    }

    fn push_instructions(prompt: &mut String, decision: &TurnDecision, topic: Topic) {
        let _ = writeln!(prompt, "{}:", Self::instructions_header(topic));
        prompt.push('\n');

        prompt.push_str("Chain-of-thought reasoning process:\n");
        for step in Self::reasoning_steps(topic) {
            let _ = writeln!(prompt, "{step}");
        }
        prompt.push('\n');

        prompt.push_str("RESPONSE STRATEGY:\n");
        let _ = writeln!(prompt, "• {}", Self::strategy_line(decision.strategy.kind));
        if decision.strategy.ask_questions && !decision.profile.critical_gaps.is_empty() {
            let _ = writeln!(
                prompt,
                "• Most useful details to ask for: {}",
                decision.profile.gap_tags().join(", ")
            );
        }
        if decision.strategy.use_external.any() {
            prompt.push_str("• Weave the external data above into your recommendations\n");
        }
        let _ = writeln!(
            prompt,
            "• Target length: {}",
            Self::depth_phrase(decision.strategy.target_depth)
        );
        prompt.push('\n');

        prompt.push_str("Response guidelines:\n");
        prompt.push_str("• Use ALL available information from the context above\n");
        for guideline in Self::guidelines(topic) {
            let _ = writeln!(prompt, "{guideline}");
        }
        prompt.push('\n');

        prompt.push_str(Self::closing_line(topic));
    }

    fn preferences_header(topic: Topic) -> &'static str {
        match topic {
            Topic::DestinationRecommendations => "DESTINATION-SPECIFIC PREFERENCES",
            Topic::PackingSuggestions => "PACKING-SPECIFIC PREFERENCES",
            Topic::LocalAttractions => "ATTRACTIONS-SPECIFIC PREFERENCES",
        }
    }

    fn instructions_header(topic: Topic) -> &'static str {
        match topic {
            Topic::DestinationRecommendations => "DESTINATION RECOMMENDATION INSTRUCTIONS",
            Topic::PackingSuggestions => "PACKING RECOMMENDATION INSTRUCTIONS",
            Topic::LocalAttractions => "ATTRACTIONS RECOMMENDATION INSTRUCTIONS",
        }
    }

    fn reasoning_steps(topic: Topic) -> &'static [&'static str] {
        match topic {
            Topic::DestinationRecommendations => &[
                "1. Analyze the traveler's stated preferences, constraints, and requirements",
                "2. Weigh seasonality, budget, and interests against candidate destinations",
            ],
            Topic::PackingSuggestions => &[
                "1. Analyze the destination, weather data (if available), planned activities, and trip duration",
                "2. Consider the traveler's specific needs, luggage type, and any special requirements",
            ],
            Topic::LocalAttractions => &[
                "1. Analyze the destination, traveler interests, available time, and any budget considerations",
                "2. Look for specific interests mentioned (culture, food, museums, nature) and time constraints",
            ],
        }
    }

    fn strategy_line(kind: StrategyKind) -> &'static str {
        match kind {
            StrategyKind::QuestionFocused => {
                "Too little is known to recommend confidently. Ask for the most \
                 important missing details first; limit to 3-4 key questions"
            }
            StrategyKind::Hybrid | StrategyKind::HybridWithExternal => {
                "Offer your best tentative suggestions, then ask 2-3 clarifying \
                 questions to sharpen them"
            }
            StrategyKind::RecommendationFocused => {
                "Enough is known: give confident, specific recommendations without \
                 asking further questions"
            }
            StrategyKind::Detailed => {
                "Everything needed is known: give a thorough, detailed plan that \
                 covers every stated preference"
            }
        }
    }

    fn depth_phrase(depth: ResponseDepth) -> &'static str {
        match depth {
            ResponseDepth::Brief => "a few short paragraphs",
            ResponseDepth::Balanced => "a focused, medium-length answer",
            ResponseDepth::Detailed => "a thorough answer",
            ResponseDepth::Exhaustive => "a comprehensive, deeply detailed answer",
        }
    }

    fn guidelines(topic: Topic) -> &'static [&'static str] {
        match topic {
            Topic::DestinationRecommendations => &[
                "• Be conversational and enthusiastic about travel",
                "• Explain why each recommendation matches their stated preferences",
                "• Keep the response focused and actionable",
                "• Use emojis sparingly but effectively",
            ],
            Topic::PackingSuggestions => &[
                "• Be practical and specific with packing advice",
                "• Use weather data when available for precise recommendations",
                "• Organize suggestions in clear categories (clothing, gear, essentials)",
                "• Use bullet points and emojis for easy scanning",
            ],
            Topic::LocalAttractions => &[
                "• Prioritize attractions based on stated interests and available time",
                "• Include practical details (hours, pricing, accessibility) when relevant",
                "• Organize recommendations logically (by priority, theme, or location)",
                "• Keep the tone enthusiastic and helpful",
            ],
        }
    }

    fn closing_line(topic: Topic) -> &'static str {
        match topic {
            Topic::DestinationRecommendations => {
                "Generate your destination recommendation response:"
            }
            Topic::PackingSuggestions => "Generate your packing recommendation response:",
            Topic::LocalAttractions => "Generate your attractions recommendation response:",
        }
    }

    fn snippet(text: &str) -> String {
        if text.chars().count() <= ASSISTANT_SNIPPET_CHARS {
            return text.to_string();
        }
        let head: String = text.chars().take(ASSISTANT_SNIPPET_CHARS).collect();
        format!("{head}...")
    }

    fn weather_summary(report: &WeatherReport) -> String {
        let mut summary = match &report.current {
            Some(current) => format!(
                "Current conditions in {}: {:.1}°C (feels like {:.1}°C), {}, humidity {}%, wind {:.1} m/s",
                report.location,
                current.temperature_c,
                current.feels_like_c,
                current.description,
                current.humidity_pct,
                current.wind_speed_ms,
            ),
            None => format!("Current conditions in {} unavailable", report.location),
        };

        if !report.forecast.is_empty() {
            let samples: Vec<String> = report
                .forecast
                .iter()
                .take(FORECAST_SAMPLES)
                .map(|entry| {
                    format!(
                        "{} {:.1}°C {}",
                        entry.at.format("%a %H:%M"),
                        entry.temperature_c,
                        entry.description
                    )
                })
                .collect();
            let _ = write!(summary, ". Forecast: {}", samples.join("; "));
        }

        summary
    }

    fn attractions_summary(report: &AttractionsReport) -> String {
        let names: Vec<String> = report
            .attractions
            .iter()
            .map(|attraction| match attraction.categories.first() {
                Some(category) => format!("{} ({})", attraction.name, category),
                None => attraction.name.clone(),
            })
            .collect();
        format!(
            "{} places near {}: {}",
            report.attractions.len(),
            report.location,
            names.join("; ")
        )
    }
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}
