//! Facts about the traveler and the ordered sets that accumulate them.
//!
//! A fact is either a `key: value` pair or opaque free text. Fact sets grow
//! across turns through `merge`, which never discards a previously learned
//! value: conflicting values for the same key accumulate as a
//! comma-separated list of distinct entries.

use serde::{Deserialize, Serialize};

/// A single piece of information extracted from the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fact {
    /// A `key: value` pair, e.g. `destination: Tokyo`.
    Keyed { key: String, value: String },
    /// Anything that did not parse as `key: value`, kept verbatim.
    FreeText { text: String },
}

impl Fact {
    /// Create a keyed fact. Key and value are trimmed, case preserved.
    pub fn keyed(key: impl Into<String>, value: impl Into<String>) -> Self {
        Fact::Keyed {
            key: key.into().trim().to_string(),
            value: value.into().trim().to_string(),
        }
    }

    /// Create a free-text fact.
    pub fn free_text(text: impl Into<String>) -> Self {
        Fact::FreeText {
            text: text.into().trim().to_string(),
        }
    }

    /// Parse a raw fragment.
    ///
    /// Empty or whitespace-only fragments parse to `None`. A fragment with a
    /// colon becomes `Keyed` unless the key or value side is empty after
    /// trimming, in which case the whole fragment degrades to `FreeText`.
    pub fn parse(fragment: &str) -> Option<Fact> {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.split_once(':') {
            Some((key, value)) => {
                let key = key.trim();
                let value = value.trim();
                if key.is_empty() || value.is_empty() {
                    Some(Fact::free_text(trimmed))
                } else {
                    Some(Fact::keyed(key, value))
                }
            }
            None => Some(Fact::free_text(trimmed)),
        }
    }

    /// Parse a batch of raw fragments, dropping the blank ones.
    pub fn parse_all<S: AsRef<str>>(fragments: &[S]) -> Vec<Fact> {
        fragments
            .iter()
            .filter_map(|f| Fact::parse(f.as_ref()))
            .collect()
    }

    /// The key lowered for comparison, if this fact is keyed.
    pub fn normalized_key(&self) -> Option<String> {
        match self {
            Fact::Keyed { key, .. } => Some(key.to_lowercase()),
            Fact::FreeText { .. } => None,
        }
    }

    /// Render back to the `key: value` or free-text wire form.
    pub fn render(&self) -> String {
        match self {
            Fact::Keyed { key, value } => format!("{key}: {value}"),
            Fact::FreeText { text } => text.clone(),
        }
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// An ordered collection of facts with key uniqueness.
///
/// Invariant: no two keyed facts share a normalized key. Insertion order is
/// preserved; updating an existing key never moves it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactSet {
    facts: Vec<Fact>,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }

    pub fn as_slice(&self) -> &[Fact] {
        &self.facts
    }

    pub fn to_vec(&self) -> Vec<Fact> {
        self.facts.clone()
    }

    /// The stored value for a key, compared case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        let wanted = key.trim().to_lowercase();
        self.facts.iter().find_map(|fact| match fact {
            Fact::Keyed { key, value } if key.to_lowercase() == wanted => Some(value.as_str()),
            _ => None,
        })
    }

    /// Merge one fact into the set. Returns `true` if the set changed.
    ///
    /// Keyed facts insert at the back when the key is new. On a key
    /// collision the incoming value accumulates onto the stored one as
    /// `old, new`, unless the stored value already carries it (exact match
    /// against the whole value or any comma-separated entry). Free text
    /// dedupes by exact match.
    pub fn merge_fact(&mut self, incoming: Fact) -> bool {
        match incoming {
            Fact::Keyed { key, value } => {
                let normalized = key.to_lowercase();
                for fact in &mut self.facts {
                    if let Fact::Keyed {
                        key: stored_key,
                        value: stored_value,
                    } = fact
                    {
                        if stored_key.to_lowercase() != normalized {
                            continue;
                        }
                        if value_already_present(stored_value, &value) {
                            return false;
                        }
                        *stored_value = format!("{stored_value}, {value}");
                        return true;
                    }
                }
                self.facts.push(Fact::Keyed { key, value });
                true
            }
            Fact::FreeText { text } => {
                let duplicate = self
                    .facts
                    .iter()
                    .any(|fact| matches!(fact, Fact::FreeText { text: t } if *t == text));
                if duplicate {
                    false
                } else {
                    self.facts.push(Fact::FreeText { text });
                    true
                }
            }
        }
    }

    /// Merge a batch of facts. Returns how many of them changed the set.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = Fact>) -> usize {
        incoming
            .into_iter()
            .filter(|fact| self.merge_fact(fact.clone()))
            .count()
    }

    /// Parse and merge raw fragments. Blank fragments are dropped.
    pub fn merge_fragments<S: AsRef<str>>(&mut self, fragments: &[S]) -> usize {
        self.merge(Fact::parse_all(fragments))
    }

    /// Wire-form lines for every fact, in insertion order.
    pub fn render_lines(&self) -> Vec<String> {
        self.facts.iter().map(Fact::render).collect()
    }
}

impl FromIterator<Fact> for FactSet {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        let mut set = FactSet::new();
        set.merge(iter);
        set
    }
}

impl<'a> IntoIterator for &'a FactSet {
    type Item = &'a Fact;
    type IntoIter = std::slice::Iter<'a, Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

fn value_already_present(stored: &str, incoming: &str) -> bool {
    stored == incoming || stored.split(", ").any(|entry| entry == incoming)
}

/// Extracts structured facts from a single raw utterance.
///
/// Implementations are deterministic and synchronous. The scorer overlays
/// their output on stored facts for the current turn only; nothing is
/// written back to the store.
pub trait FactExtractor: Send + Sync {
    fn extract(&self, utterance: &str) -> Vec<Fact>;
}
