//! Session-keyed persistence seams.
//!
//! The store is the only component with conversation-length lifetime.
//! Everything is keyed by an explicit [`SessionId`] so independent sessions
//! can run concurrently without sharing state.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::fact::Fact;
use crate::session::{SessionId, Turn};
use crate::topic::{Scope, Topic};

/// Durable fact storage, keyed by session and scope.
///
/// `merge_facts` must be atomic per (session, scope): concurrent merges for
/// the same session never interleave, and readers never observe a
/// half-applied merge.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Merge facts into one scope of one session.
    async fn merge_facts(
        &self,
        session: &SessionId,
        scope: Scope,
        facts: Vec<Fact>,
    ) -> Result<(), StoreError>;

    /// All facts stored for one scope, in insertion order.
    async fn facts(&self, session: &SessionId, scope: Scope) -> Result<Vec<Fact>, StoreError>;

    /// Topic-scoped facts for every topic that has any.
    async fn all_topic_facts(
        &self,
        session: &SessionId,
    ) -> Result<BTreeMap<Topic, Vec<Fact>>, StoreError>;
}

/// Conversation transcript storage.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn append_turn(&self, session: &SessionId, turn: Turn) -> Result<(), StoreError>;

    /// The most recent `limit` turns, oldest first.
    async fn recent_turns(&self, session: &SessionId, limit: usize)
    -> Result<Vec<Turn>, StoreError>;

    /// Total turns recorded for the session.
    async fn turn_count(&self, session: &SessionId) -> Result<usize, StoreError>;
}

/// Everything the engine needs from a backend.
#[async_trait]
pub trait SessionStore: ContextStore + TranscriptStore {
    /// Drop everything stored for the session, facts and transcript alike.
    /// The only way session state ever clears.
    async fn reset(&self, session: &SessionId) -> Result<(), StoreError>;
}
