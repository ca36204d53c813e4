//! The external-data relevance gate.
//!
//! Fetching data and surfacing it are separate decisions. The gate rules
//! on each payload kind the classification requested, and a withheld
//! payload stays cached but never reaches the prompt. Its reasons are
//! plain ASCII strings that go into logs and decision dumps.

use tracing::debug;
use wayfinder_core::external::{ExternalPayload, ExternalReport};
use wayfinder_core::session::{Turn, TurnRole};
use wayfinder_core::strategy::{GateReport, GateVerdict};
use wayfinder_core::verdict::Verdict;

/// Phrases signalling the trip starts within days, when live weather beats
/// seasonal knowledge.
const NEAR_TERM_VOCABULARY: &[&str] = &[
    "today",
    "tonight",
    "tomorrow",
    "this week",
    "this weekend",
    "next few days",
    "in a few days",
    "day after tomorrow",
];

/// Phrases asking about conditions as they are right now.
const CURRENT_CONDITIONS_VOCABULARY: &[&str] =
    &["current", "currently", "right now", "at the moment", "today"];

pub struct RelevanceGate;

impl RelevanceGate {
    pub fn new() -> Self {
        Self
    }

    /// Rule on every payload kind the classification requested.
    ///
    /// Kinds the classification did not request stay `None` in the report:
    /// the gate never volunteers data nobody asked for.
    pub fn evaluate(
        &self,
        verdict: &Verdict,
        utterance: &str,
        recent_turns: &[Turn],
        weather: Option<&ExternalPayload>,
        attractions: Option<&ExternalPayload>,
    ) -> GateReport {
        let mut report = GateReport::default();

        if !verdict.external_needed {
            return report;
        }

        if verdict.external_kind.wants_weather() {
            let ruling = Self::check_weather(utterance, recent_turns, weather);
            debug!(relevant = ruling.relevant, reason = %ruling.reason, "Weather gate");
            report.weather = Some(ruling);
        }
        if verdict.external_kind.wants_attractions() {
            let ruling = Self::check_attractions(attractions);
            debug!(relevant = ruling.relevant, reason = %ruling.reason, "Attractions gate");
            report.attractions = Some(ruling);
        }

        report
    }

    /// Weather is only worth surfacing for trips happening now or questions
    /// about current conditions. For a trip months out, the model's
    /// seasonal knowledge is more reliable than a 5-day forecast.
    fn check_weather(
        utterance: &str,
        recent_turns: &[Turn],
        payload: Option<&ExternalPayload>,
    ) -> GateVerdict {
        let Some(payload) = payload else {
            return GateVerdict::withhold("no weather data available");
        };
        let ExternalReport::Weather(report) = &payload.report else {
            return GateVerdict::withhold("cached payload is not weather data");
        };
        if !report.has_usable_current() {
            return GateVerdict::withhold("weather data lacks a usable current reading");
        }

        if Self::mentions_near_term(utterance, recent_turns) {
            GateVerdict::pass("trip starts within days, live conditions apply")
        } else if Self::asks_about_current_conditions(utterance) {
            GateVerdict::pass("question is about conditions right now")
        } else {
            GateVerdict::withhold(
                "trip is not near-term, seasonal knowledge beats a short forecast",
            )
        }
    }

    /// Attractions listings are timeless; the only question is whether the
    /// lookup produced anything.
    fn check_attractions(payload: Option<&ExternalPayload>) -> GateVerdict {
        let Some(payload) = payload else {
            return GateVerdict::withhold("no attractions data available");
        };
        let ExternalReport::Attractions(report) = &payload.report else {
            return GateVerdict::withhold("cached payload is not attractions data");
        };
        if report.attractions.is_empty() {
            GateVerdict::withhold("attractions lookup returned no results")
        } else {
            GateVerdict::pass(format!("{} attractions available", report.attractions.len()))
        }
    }

    /// Near-term vocabulary counts from the utterance or any recent user
    /// turn; a user who said "leaving tomorrow" two turns ago still means it.
    fn mentions_near_term(utterance: &str, recent_turns: &[Turn]) -> bool {
        let lowered = utterance.to_lowercase();
        if NEAR_TERM_VOCABULARY.iter().any(|w| lowered.contains(w)) {
            return true;
        }
        recent_turns
            .iter()
            .filter(|turn| turn.role == TurnRole::User)
            .any(|turn| {
                let text = turn.text.to_lowercase();
                NEAR_TERM_VOCABULARY.iter().any(|w| text.contains(w))
            })
    }

    fn asks_about_current_conditions(utterance: &str) -> bool {
        let lowered = utterance.to_lowercase();
        CURRENT_CONDITIONS_VOCABULARY
            .iter()
            .any(|w| lowered.contains(w))
    }
}

impl Default for RelevanceGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use wayfinder_core::external::{
        Attraction, AttractionsReport, CurrentConditions, WeatherReport,
    };
    use wayfinder_core::topic::Topic;
    use wayfinder_core::verdict::{ExternalDataKind, VerdictSource};

    fn verdict(kind: ExternalDataKind, needed: bool) -> Verdict {
        Verdict {
            topic: Topic::PackingSuggestions,
            confidence: 1.0,
            source: VerdictSource::Consensus,
            external_needed: needed,
            external_kind: kind,
            external_reason: "test".into(),
            global_facts: Vec::new(),
            topic_facts: BTreeMap::new(),
            fallback_used: false,
            reasoning: "test".into(),
        }
    }

    fn weather_payload() -> ExternalPayload {
        ExternalPayload::new(
            ExternalReport::Weather(WeatherReport {
                location: "Lisbon, PT".into(),
                current: Some(CurrentConditions {
                    temperature_c: 21.0,
                    feels_like_c: 20.0,
                    humidity_pct: 55,
                    description: "Clear sky".into(),
                    wind_speed_ms: 3.0,
                }),
                forecast: Vec::new(),
            }),
            3600,
        )
    }

    fn attractions_payload(count: usize) -> ExternalPayload {
        let attractions = (0..count)
            .map(|i| Attraction {
                name: format!("Spot {i}"),
                categories: vec!["tourism".into()],
                address: None,
                distance_m: None,
            })
            .collect::<Vec<_>>();
        ExternalPayload::new(
            ExternalReport::Attractions(AttractionsReport {
                location: "Lisbon".into(),
                total_found: attractions.len(),
                attractions,
            }),
            3600,
        )
    }

    #[test]
    fn near_term_trip_passes_weather() {
        let gate = RelevanceGate::new();
        let payload = weather_payload();
        let report = gate.evaluate(
            &verdict(ExternalDataKind::Weather, true),
            "I'm leaving tomorrow, what should I pack?",
            &[],
            Some(&payload),
            None,
        );

        assert!(report.weather_allowed());
        assert!(report.attractions.is_none());
    }

    #[test]
    fn far_future_trip_withholds_weather() {
        let gate = RelevanceGate::new();
        let payload = weather_payload();
        let report = gate.evaluate(
            &verdict(ExternalDataKind::Weather, true),
            "what should I pack for my trip next March?",
            &[],
            Some(&payload),
            None,
        );

        let weather = report.weather.as_ref().unwrap();
        assert!(!weather.relevant);
        assert!(weather.reason.contains("seasonal knowledge"));
    }

    #[test]
    fn current_conditions_question_passes_weather() {
        let gate = RelevanceGate::new();
        let payload = weather_payload();
        let report = gate.evaluate(
            &verdict(ExternalDataKind::Weather, true),
            "what's the weather like there currently?",
            &[],
            Some(&payload),
            None,
        );

        assert!(report.weather_allowed());
    }

    #[test]
    fn near_term_mention_in_recent_user_turn_counts() {
        let gate = RelevanceGate::new();
        let payload = weather_payload();
        let turns = vec![
            Turn::user("we fly out tomorrow morning"),
            Turn::assistant("Exciting! Where to?"),
        ];
        let report = gate.evaluate(
            &verdict(ExternalDataKind::Weather, true),
            "what should I pack?",
            &turns,
            Some(&payload),
            None,
        );

        assert!(report.weather_allowed());
    }

    #[test]
    fn assistant_turns_do_not_count_as_near_term() {
        let gate = RelevanceGate::new();
        let payload = weather_payload();
        let turns = vec![Turn::assistant("you could leave tomorrow!")];
        let report = gate.evaluate(
            &verdict(ExternalDataKind::Weather, true),
            "what should I pack for the trip?",
            &turns,
            Some(&payload),
            None,
        );

        assert!(!report.weather_allowed());
    }

    #[test]
    fn missing_payload_withholds() {
        let gate = RelevanceGate::new();
        let report = gate.evaluate(
            &verdict(ExternalDataKind::Weather, true),
            "leaving tomorrow, what should I pack?",
            &[],
            None,
            None,
        );

        let weather = report.weather.as_ref().unwrap();
        assert!(!weather.relevant);
        assert!(weather.reason.contains("no weather data"));
    }

    #[test]
    fn weather_without_current_reading_withholds() {
        let gate = RelevanceGate::new();
        let payload = ExternalPayload::new(
            ExternalReport::Weather(WeatherReport {
                location: "Lisbon, PT".into(),
                current: None,
                forecast: Vec::new(),
            }),
            3600,
        );
        let report = gate.evaluate(
            &verdict(ExternalDataKind::Weather, true),
            "leaving tomorrow, what should I pack?",
            &[],
            Some(&payload),
            None,
        );

        assert!(!report.weather_allowed());
    }

    #[test]
    fn attractions_pass_with_results_and_withhold_empty() {
        let gate = RelevanceGate::new();

        let full = attractions_payload(3);
        let report = gate.evaluate(
            &verdict(ExternalDataKind::Attractions, true),
            "things to do in Lisbon?",
            &[],
            None,
            Some(&full),
        );
        assert!(report.attractions_allowed());
        assert_eq!(report.allowed_count(), 1);

        let empty = attractions_payload(0);
        let report = gate.evaluate(
            &verdict(ExternalDataKind::Attractions, true),
            "things to do in Lisbon?",
            &[],
            None,
            Some(&empty),
        );
        assert!(!report.attractions_allowed());
    }

    #[test]
    fn both_kinds_ruled_independently() {
        let gate = RelevanceGate::new();
        let weather = weather_payload();
        let attractions = attractions_payload(2);
        let report = gate.evaluate(
            &verdict(ExternalDataKind::Both, true),
            "things to do and what to pack, we arrive tomorrow",
            &[],
            Some(&weather),
            Some(&attractions),
        );

        assert!(report.weather_allowed());
        assert!(report.attractions_allowed());
        assert_eq!(report.allowed_count(), 2);
    }

    #[test]
    fn nothing_requested_rules_on_nothing() {
        let gate = RelevanceGate::new();
        let weather = weather_payload();
        let report = gate.evaluate(
            &verdict(ExternalDataKind::None, false),
            "leaving tomorrow",
            &[],
            Some(&weather),
            None,
        );

        assert!(report.weather.is_none());
        assert!(report.attractions.is_none());
        assert_eq!(report.allowed_count(), 0);
    }

    #[test]
    fn unrequested_kind_never_surfaces() {
        // Attractions data exists but the classification asked for weather.
        let gate = RelevanceGate::new();
        let attractions = attractions_payload(5);
        let report = gate.evaluate(
            &verdict(ExternalDataKind::Weather, true),
            "leaving tomorrow, what should I pack?",
            &[],
            None,
            Some(&attractions),
        );

        assert!(report.attractions.is_none());
    }
}
