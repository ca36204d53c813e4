//! Conversation topics and fact scopes.

use serde::{Deserialize, Serialize};

/// The closed set of topics the assistant answers.
///
/// Every turn is classified into exactly one of these. Unknown labels from
/// the generative classifier are rejected during deserialization, which
/// routes the turn through the pattern fallback instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    DestinationRecommendations,
    PackingSuggestions,
    LocalAttractions,
}

impl Topic {
    /// All topics in declaration order. The pattern classifier resolves
    /// score ties in favor of the earlier topic.
    pub const ALL: [Topic; 3] = [
        Topic::DestinationRecommendations,
        Topic::PackingSuggestions,
        Topic::LocalAttractions,
    ];

    /// The wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::DestinationRecommendations => "destination_recommendations",
            Topic::PackingSuggestions => "packing_suggestions",
            Topic::LocalAttractions => "local_attractions",
        }
    }

    /// Short human-facing label for prompts and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Topic::DestinationRecommendations => "destination recommendations",
            Topic::PackingSuggestions => "packing suggestions",
            Topic::LocalAttractions => "local attractions",
        }
    }
}

impl Default for Topic {
    fn default() -> Self {
        Topic::DestinationRecommendations
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a fact applies: across the whole session, or inside one topic's
/// thread of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Traveler profile facts that hold regardless of topic.
    Global,
    /// Facts tied to one topic.
    Topic(Topic),
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Topic(topic) => write!(f, "topic:{topic}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_serde_uses_snake_case() {
        let json = serde_json::to_string(&Topic::PackingSuggestions).unwrap();
        assert_eq!(json, "\"packing_suggestions\"");

        let parsed: Topic = serde_json::from_str("\"local_attractions\"").unwrap();
        assert_eq!(parsed, Topic::LocalAttractions);
    }

    #[test]
    fn unknown_topic_fails_deserialization() {
        let result: std::result::Result<Topic, _> = serde_json::from_str("\"general_chat\"");
        assert!(result.is_err());
    }

    #[test]
    fn default_topic_is_destination_recommendations() {
        assert_eq!(Topic::default(), Topic::DestinationRecommendations);
    }

    #[test]
    fn scope_display() {
        assert_eq!(Scope::Global.to_string(), "global");
        assert_eq!(
            Scope::Topic(Topic::PackingSuggestions).to_string(),
            "topic:packing_suggestions"
        );
    }
}
