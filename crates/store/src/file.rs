//! File-backed session store, one JSON document per session.
//!
//! Storage location: `<dir>/<session>.json`. Documents are pretty-printed
//! so a session can be inspected or hand-edited. Sessions load lazily on
//! first touch and flush after every mutation. A corrupted document is
//! logged and treated as an empty session rather than failing the turn.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use wayfinder_core::error::StoreError;
use wayfinder_core::fact::Fact;
use wayfinder_core::session::{SessionId, Turn};
use wayfinder_core::store::{ContextStore, SessionStore, TranscriptStore};
use wayfinder_core::topic::{Scope, Topic};

use crate::state::SessionState;

/// A file-backed store with an in-memory cache of loaded sessions.
///
/// The write lock is held across load, mutate, and flush, so merges are
/// atomic per session even when turns overlap.
pub struct FileStore {
    dir: PathBuf,
    sessions: Arc<RwLock<HashMap<SessionId, SessionState>>>,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first
    /// write, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn session_file(&self, session: &SessionId) -> PathBuf {
        // Keep session filenames path-safe.
        let name: String = session
            .0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }

    fn load_from_disk(path: &Path) -> SessionState {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return SessionState::default(),
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupted session document, starting empty");
                SessionState::default()
            }
        }
    }

    /// Fetch the session from cache, loading it from disk on first touch.
    fn loaded<'a>(
        &self,
        cache: &'a mut HashMap<SessionId, SessionState>,
        session: &SessionId,
    ) -> &'a mut SessionState {
        cache.entry(session.clone()).or_insert_with(|| {
            let state = Self::load_from_disk(&self.session_file(session));
            debug!(session = %session, turns = state.turn_count(), "Session document loaded");
            state
        })
    }

    fn flush(&self, session: &SessionId, state: &SessionState) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| StoreError::Storage(format!("Failed to create session directory: {e}")))?;

        let content = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        std::fs::write(self.session_file(session), content)
            .map_err(|e| StoreError::Storage(format!("Failed to write session document: {e}")))
    }
}

#[async_trait]
impl ContextStore for FileStore {
    async fn merge_facts(
        &self,
        session: &SessionId,
        scope: Scope,
        facts: Vec<Fact>,
    ) -> Result<(), StoreError> {
        let mut cache = self.sessions.write().await;
        let state = self.loaded(&mut cache, session);
        let changed = state.merge_facts(scope, facts);
        if changed > 0 {
            let snapshot = state.clone();
            self.flush(session, &snapshot)?;
        }
        Ok(())
    }

    async fn facts(&self, session: &SessionId, scope: Scope) -> Result<Vec<Fact>, StoreError> {
        let mut cache = self.sessions.write().await;
        Ok(self.loaded(&mut cache, session).facts(scope))
    }

    async fn all_topic_facts(
        &self,
        session: &SessionId,
    ) -> Result<BTreeMap<Topic, Vec<Fact>>, StoreError> {
        let mut cache = self.sessions.write().await;
        Ok(self.loaded(&mut cache, session).all_topic_facts())
    }
}

#[async_trait]
impl TranscriptStore for FileStore {
    async fn append_turn(&self, session: &SessionId, turn: Turn) -> Result<(), StoreError> {
        let mut cache = self.sessions.write().await;
        let state = self.loaded(&mut cache, session);
        state.append_turn(turn);
        let snapshot = state.clone();
        self.flush(session, &snapshot)
    }

    async fn recent_turns(
        &self,
        session: &SessionId,
        limit: usize,
    ) -> Result<Vec<Turn>, StoreError> {
        let mut cache = self.sessions.write().await;
        Ok(self.loaded(&mut cache, session).recent_turns(limit))
    }

    async fn turn_count(&self, session: &SessionId) -> Result<usize, StoreError> {
        let mut cache = self.sessions.write().await;
        Ok(self.loaded(&mut cache, session).turn_count())
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn reset(&self, session: &SessionId) -> Result<(), StoreError> {
        let mut cache = self.sessions.write().await;
        cache.remove(session);

        let path = self.session_file(session);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Storage(format!(
                "Failed to remove session document: {e}"
            ))),
        }
    }
}
