//! Deterministic fact extraction from raw utterances.
//!
//! A fixed set of rules, compiled once. The output feeds the completeness
//! overlay and the destination lookup for external fetches; it is never
//! written to the store, so a false positive costs one turn at most.

use regex_lite::Regex;
use wayfinder_core::fact::{Fact, FactExtractor};

/// Relative date phrases recognized as travel dates, checked in order.
const RELATIVE_DATE_PHRASES: &[&str] = &[
    "today",
    "tomorrow",
    "this weekend",
    "next weekend",
    "next week",
    "next month",
    "this summer",
    "next summer",
    "this winter",
    "next winter",
    "next spring",
    "next fall",
];

/// Interest vocabulary, matched on word boundaries.
const INTEREST_PATTERN: &str = r"(?i)\b(hiking|museums?|food|beach(?:es)?|nightlife|shopping|history|art|nature|adventure|ski(?:ing)?|snorkel(?:ing)?|diving|surfing|photography|architecture|wildlife|temples?|markets?|festivals?|camping|cycling|culture)\b";

pub struct UtteranceExtractor {
    destination_rules: Vec<Regex>,
    duration_rule: Regex,
    month_rule: Regex,
    budget_amount_rule: Regex,
    group_count_rule: Regex,
    interest_rule: Regex,
}

impl UtteranceExtractor {
    /// Compile the rule set. The patterns are fixed, so compilation cannot
    /// fail at runtime; a bad pattern would fail every test.
    pub fn new() -> Self {
        let destination_rules = vec![
            Regex::new(
                r"(?i)(?:fly|flying|travel|traveling|travelling|go|going)\s+to\s+([a-z][a-z ]*?)(?:\s+(?:but|and)\b|[,.?!]|$)",
            )
            .unwrap(),
            Regex::new(r"(?i)\bvisit(?:ing)?\s+([a-z][a-z ]*?)(?:\s+(?:but|and)\b|[,.?!]|$)")
                .unwrap(),
            Regex::new(r"(?i)\btrip\s+to\s+([a-z][a-z ]*?)(?:\s+(?:but|and)\b|[,.?!]|$)").unwrap(),
            Regex::new(r"(?i)\bin\s+([a-z][a-z ]*?)(?:[,.?!]|$)").unwrap(),
        ];

        Self {
            destination_rules,
            duration_rule: Regex::new(r"(?i)\b(\d+)\s*(days?|weeks?|months?|nights?)\b").unwrap(),
            month_rule: Regex::new(
                r"(?i)\b(?:in|next|this|during|for|early|late|mid)[- ](january|february|march|april|may|june|july|august|september|october|november|december)\b",
            )
            .unwrap(),
            budget_amount_rule: Regex::new(r"\$\s*(\d[\d,]*(?:\.\d+)?)").unwrap(),
            group_count_rule: Regex::new(
                r"(?i)\b(\d+)\s+(?:people|persons|adults|friends|travelers|travellers)\b|\bgroup\s+of\s+(\d+)\b",
            )
            .unwrap(),
            interest_rule: Regex::new(INTEREST_PATTERN).unwrap(),
        }
    }

    /// First destination rule that produces a plausible place name.
    fn destination(&self, utterance: &str) -> Option<String> {
        for rule in &self.destination_rules {
            if let Some(captures) = rule.captures(utterance) {
                let place = captures.get(1)?.as_str().trim();
                // Two letters or fewer is noise ("go to it").
                if place.len() > 2 {
                    return Some(place.to_string());
                }
            }
        }
        None
    }

    fn travel_dates(&self, lowered: &str) -> Option<String> {
        if let Some(phrase) = RELATIVE_DATE_PHRASES
            .iter()
            .find(|phrase| lowered.contains(*phrase))
        {
            return Some((*phrase).to_string());
        }
        self.month_rule
            .captures(lowered)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn duration(&self, utterance: &str, lowered: &str) -> Option<String> {
        if let Some(captures) = self.duration_rule.captures(utterance) {
            let count = captures.get(1)?.as_str();
            let unit = captures.get(2)?.as_str().to_lowercase();
            return Some(format!("{count} {unit}"));
        }
        if lowered.contains("long weekend") || lowered.contains("weekend trip") {
            return Some("weekend".to_string());
        }
        None
    }

    fn budget(&self, utterance: &str, lowered: &str) -> Option<String> {
        if let Some(captures) = self.budget_amount_rule.captures(utterance) {
            return Some(format!("${}", captures.get(1)?.as_str()));
        }
        if ["tight budget", "on a budget", "budget-friendly", "cheap"]
            .iter()
            .any(|phrase| lowered.contains(phrase))
        {
            return Some("tight".to_string());
        }
        if ["luxury", "high-end", "splurge"]
            .iter()
            .any(|phrase| lowered.contains(phrase))
        {
            return Some("luxury".to_string());
        }
        if lowered.contains("mid-range") {
            return Some("mid-range".to_string());
        }
        None
    }

    fn group_size(&self, utterance: &str, lowered: &str) -> Option<String> {
        if ["solo", "by myself", "travelling alone", "traveling alone"]
            .iter()
            .any(|phrase| lowered.contains(phrase))
        {
            return Some("solo".to_string());
        }
        if [
            "as a couple",
            "my partner",
            "my wife",
            "my husband",
            "my boyfriend",
            "my girlfriend",
        ]
        .iter()
        .any(|phrase| lowered.contains(phrase))
        {
            return Some("couple".to_string());
        }
        if ["family", "with kids", "with children", "with my kids"]
            .iter()
            .any(|phrase| lowered.contains(phrase))
        {
            return Some("family".to_string());
        }
        if let Some(captures) = self.group_count_rule.captures(utterance) {
            let count = captures.get(1).or_else(|| captures.get(2))?;
            return Some(format!("{} people", count.as_str()));
        }
        None
    }

    fn interests(&self, utterance: &str) -> Option<String> {
        let mut seen = Vec::new();
        for m in self.interest_rule.find_iter(utterance) {
            let interest = m.as_str().to_lowercase();
            if !seen.contains(&interest) {
                seen.push(interest);
            }
        }
        if seen.is_empty() {
            None
        } else {
            Some(seen.join(", "))
        }
    }
}

impl FactExtractor for UtteranceExtractor {
    fn extract(&self, utterance: &str) -> Vec<Fact> {
        let lowered = utterance.to_lowercase();
        let mut facts = Vec::new();

        if let Some(destination) = self.destination(utterance) {
            facts.push(Fact::keyed("destination", destination));
        }
        if let Some(dates) = self.travel_dates(&lowered) {
            facts.push(Fact::keyed("travel_dates", dates));
        }
        if let Some(duration) = self.duration(utterance, &lowered) {
            facts.push(Fact::keyed("duration", duration));
        }
        if let Some(budget) = self.budget(utterance, &lowered) {
            facts.push(Fact::keyed("budget", budget));
        }
        if let Some(group) = self.group_size(utterance, &lowered) {
            facts.push(Fact::keyed("group_size", group));
        }
        if let Some(interests) = self.interests(utterance) {
            facts.push(Fact::keyed("interests", interests));
        }

        facts
    }
}

impl Default for UtteranceExtractor {
    fn default() -> Self {
        Self::new()
    }
}
