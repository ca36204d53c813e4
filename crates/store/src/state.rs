//! The per-session state both backends share.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wayfinder_core::fact::{Fact, FactSet};
use wayfinder_core::session::Turn;
use wayfinder_core::topic::{Scope, Topic};

/// Everything stored for one session: the global fact set, one fact set per
/// topic that has any, and the transcript. This is also the on-disk
/// document shape of the file backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SessionState {
    #[serde(default)]
    pub global: FactSet,

    #[serde(default)]
    pub topics: BTreeMap<Topic, FactSet>,

    #[serde(default)]
    pub transcript: Vec<Turn>,
}

impl SessionState {
    /// Merge facts into one scope. Returns how many facts changed.
    pub fn merge_facts(&mut self, scope: Scope, facts: Vec<Fact>) -> usize {
        match scope {
            Scope::Global => self.global.merge(facts),
            Scope::Topic(topic) => self.topics.entry(topic).or_default().merge(facts),
        }
    }

    pub fn facts(&self, scope: Scope) -> Vec<Fact> {
        match scope {
            Scope::Global => self.global.to_vec(),
            Scope::Topic(topic) => self
                .topics
                .get(&topic)
                .map(FactSet::to_vec)
                .unwrap_or_default(),
        }
    }

    pub fn all_topic_facts(&self) -> BTreeMap<Topic, Vec<Fact>> {
        self.topics
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(topic, set)| (*topic, set.to_vec()))
            .collect()
    }

    pub fn append_turn(&mut self, turn: Turn) {
        self.transcript.push(turn);
    }

    /// The last `limit` turns, oldest first.
    pub fn recent_turns(&self, limit: usize) -> Vec<Turn> {
        let start = self.transcript.len().saturating_sub(limit);
        self.transcript[start..].to_vec()
    }

    pub fn turn_count(&self) -> usize {
        self.transcript.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_do_not_bleed() {
        let mut state = SessionState::default();
        state.merge_facts(Scope::Global, vec![Fact::keyed("destination", "Tokyo")]);
        state.merge_facts(
            Scope::Topic(Topic::PackingSuggestions),
            vec![Fact::keyed("luggage", "carry-on only")],
        );

        assert_eq!(state.facts(Scope::Global).len(), 1);
        assert_eq!(state.facts(Scope::Topic(Topic::PackingSuggestions)).len(), 1);
        assert!(state.facts(Scope::Topic(Topic::LocalAttractions)).is_empty());
    }

    #[test]
    fn recent_turns_windows_from_the_back() {
        let mut state = SessionState::default();
        for i in 0..5 {
            state.append_turn(Turn::user(format!("turn {i}")));
        }

        let recent = state.recent_turns(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].text, "turn 3");
        assert_eq!(recent[1].text, "turn 4");

        assert_eq!(state.recent_turns(100).len(), 5);
    }

    #[test]
    fn all_topic_facts_skips_empty_sets() {
        let mut state = SessionState::default();
        state.merge_facts(Scope::Topic(Topic::LocalAttractions), vec![]);
        assert!(state.all_topic_facts().is_empty());
    }
}
