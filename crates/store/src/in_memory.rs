//! In-memory backend, useful for testing and ephemeral sessions.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use wayfinder_core::error::StoreError;
use wayfinder_core::fact::Fact;
use wayfinder_core::session::{SessionId, Turn};
use wayfinder_core::store::{ContextStore, SessionStore, TranscriptStore};
use wayfinder_core::topic::{Scope, Topic};

use crate::state::SessionState;

/// An in-memory store keyed by session.
///
/// One lock guards the whole session map; merges hold the write lock for
/// their full duration, which makes them atomic per session.
pub struct InMemoryStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionState>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextStore for InMemoryStore {
    async fn merge_facts(
        &self,
        session: &SessionId,
        scope: Scope,
        facts: Vec<Fact>,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session.clone())
            .or_default()
            .merge_facts(scope, facts);
        Ok(())
    }

    async fn facts(&self, session: &SessionId, scope: Scope) -> Result<Vec<Fact>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session)
            .map(|state| state.facts(scope))
            .unwrap_or_default())
    }

    async fn all_topic_facts(
        &self,
        session: &SessionId,
    ) -> Result<BTreeMap<Topic, Vec<Fact>>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session)
            .map(SessionState::all_topic_facts)
            .unwrap_or_default())
    }
}

#[async_trait]
impl TranscriptStore for InMemoryStore {
    async fn append_turn(&self, session: &SessionId, turn: Turn) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.entry(session.clone()).or_default().append_turn(turn);
        Ok(())
    }

    async fn recent_turns(
        &self,
        session: &SessionId,
        limit: usize,
    ) -> Result<Vec<Turn>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session)
            .map(|state| state.recent_turns(limit))
            .unwrap_or_default())
    }

    async fn turn_count(&self, session: &SessionId) -> Result<usize, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session).map(SessionState::turn_count).unwrap_or(0))
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn reset(&self, session: &SessionId) -> Result<(), StoreError> {
        self.sessions.write().await.remove(session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn merge_and_read_back() {
        let store = InMemoryStore::new();
        let session = SessionId::new();

        store
            .merge_facts(
                &session,
                Scope::Global,
                vec![Fact::keyed("destination", "Tokyo")],
            )
            .await
            .unwrap();

        let facts = store.facts(&session, Scope::Global).await.unwrap();
        assert_eq!(facts, vec![Fact::keyed("destination", "Tokyo")]);
    }

    #[tokio::test]
    async fn merges_accumulate_across_calls() {
        let store = InMemoryStore::new();
        let session = SessionId::new();

        store
            .merge_facts(&session, Scope::Global, vec![Fact::keyed("budget", "$2000")])
            .await
            .unwrap();
        store
            .merge_facts(&session, Scope::Global, vec![Fact::keyed("budget", "$3000")])
            .await
            .unwrap();

        let facts = store.facts(&session, Scope::Global).await.unwrap();
        assert_eq!(facts, vec![Fact::keyed("budget", "$2000, $3000")]);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = InMemoryStore::new();
        let alpha = SessionId::from("alpha");
        let beta = SessionId::from("beta");

        store
            .merge_facts(&alpha, Scope::Global, vec![Fact::keyed("destination", "Oslo")])
            .await
            .unwrap();

        assert!(store.facts(&beta, Scope::Global).await.unwrap().is_empty());
        assert_eq!(store.facts(&alpha, Scope::Global).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn topic_scopes_are_separate() {
        let store = InMemoryStore::new();
        let session = SessionId::new();

        store
            .merge_facts(
                &session,
                Scope::Topic(Topic::PackingSuggestions),
                vec![Fact::keyed("luggage", "carry-on only")],
            )
            .await
            .unwrap();

        assert!(store.facts(&session, Scope::Global).await.unwrap().is_empty());
        let by_topic = store.all_topic_facts(&session).await.unwrap();
        assert_eq!(by_topic.len(), 1);
        assert!(by_topic.contains_key(&Topic::PackingSuggestions));
    }

    #[tokio::test]
    async fn transcript_appends_and_windows() {
        let store = InMemoryStore::new();
        let session = SessionId::new();

        store.append_turn(&session, Turn::user("first")).await.unwrap();
        store
            .append_turn(&session, Turn::assistant("second"))
            .await
            .unwrap();
        store.append_turn(&session, Turn::user("third")).await.unwrap();

        assert_eq!(store.turn_count(&session).await.unwrap(), 3);

        let recent = store.recent_turns(&session, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].text, "second");
        assert_eq!(recent[1].text, "third");
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let store = InMemoryStore::new();
        let session = SessionId::new();

        store
            .merge_facts(&session, Scope::Global, vec![Fact::keyed("destination", "Rome")])
            .await
            .unwrap();
        store.append_turn(&session, Turn::user("hello")).await.unwrap();

        store.reset(&session).await.unwrap();

        assert!(store.facts(&session, Scope::Global).await.unwrap().is_empty());
        assert_eq!(store.turn_count(&session).await.unwrap(), 0);
    }
}
