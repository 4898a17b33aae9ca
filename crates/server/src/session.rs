//! Board sessions.
//!
//! Each session is one symbol board: its own sentence and its own
//! suggestion orchestrator (and therefore its own cache and breaker).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use pictovoz_core::suggest::{OrchestratorStatus, RemoteSuggester, RuleEngine};
use pictovoz_core::{Sentence, SuggestionConfig, SuggestionOrchestrator, SuggestionSnapshot, Word};

use crate::metrics::{SESSIONS_ACTIVE, SESSIONS_CREATED_TOTAL, SESSIONS_EXPIRED_TOTAL};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session limit reached ({0})")]
    LimitReached(usize),

    #[error("Sentence is full")]
    SentenceFull,
}

/// Serializable view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub sentence: Vec<Word>,
    pub text: String,
    pub suggestions: SuggestionSnapshot,
}

pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    /// Held across re-evaluation so edits reach the orchestrator in order.
    sentence: Mutex<Sentence>,
    orchestrator: SuggestionOrchestrator,
    last_active: Mutex<Instant>,
}

impl Session {
    fn new(orchestrator: SuggestionOrchestrator) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            sentence: Mutex::new(Sentence::new()),
            orchestrator,
            last_active: Mutex::new(Instant::now()),
        }
    }

    async fn touch(&self) {
        *self.last_active.lock().await = Instant::now();
    }

    async fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.last_active.lock().await)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn orchestrator(&self) -> &SuggestionOrchestrator {
        &self.orchestrator
    }

    /// Append a word and re-evaluate suggestions.
    pub async fn push_word(
        &self,
        word: Word,
        vocabulary: Arc<[Word]>,
    ) -> Result<SessionView, SessionError> {
        let mut sentence = self.sentence.lock().await;
        if !sentence.push(word) {
            return Err(SessionError::SentenceFull);
        }
        let suggestions = self
            .orchestrator
            .sentence_changed(sentence.words(), vocabulary)
            .await;
        Ok(self.view_of(&sentence, suggestions))
    }

    /// Remove the last word (if any) and re-evaluate.
    pub async fn pop_word(&self, vocabulary: Arc<[Word]>) -> SessionView {
        let mut sentence = self.sentence.lock().await;
        if let Some(word) = sentence.pop() {
            debug!(session = %self.id, word = %word.id, "Removed last word");
        }
        let suggestions = self
            .orchestrator
            .sentence_changed(sentence.words(), vocabulary)
            .await;
        self.view_of(&sentence, suggestions)
    }

    /// Clear the sentence and re-evaluate.
    pub async fn clear(&self, vocabulary: Arc<[Word]>) -> SessionView {
        let mut sentence = self.sentence.lock().await;
        sentence.clear();
        let suggestions = self
            .orchestrator
            .sentence_changed(sentence.words(), vocabulary)
            .await;
        self.view_of(&sentence, suggestions)
    }

    pub async fn view(&self) -> SessionView {
        let sentence = self.sentence.lock().await;
        let suggestions = self.orchestrator.snapshot().await;
        self.view_of(&sentence, suggestions)
    }

    pub async fn suggestions(&self) -> SuggestionSnapshot {
        self.orchestrator.snapshot().await
    }

    pub async fn status(&self) -> OrchestratorStatus {
        self.orchestrator.status().await
    }

    fn view_of(&self, sentence: &Sentence, suggestions: SuggestionSnapshot) -> SessionView {
        SessionView {
            id: self.id,
            created_at: self.created_at,
            sentence: sentence.words().to_vec(),
            text: sentence.spanish_text(),
            suggestions,
        }
    }
}

/// Open sessions, keyed by id.
///
/// A session counts as active whenever it is looked up. Sessions idle past
/// `idle_timeout` are closed by `expire_idle`, which also runs before every
/// `create` so a full registry can make room.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
    max_sessions: usize,
    idle_timeout: Option<Duration>,
    config: SuggestionConfig,
    rules: Arc<RuleEngine>,
    remote: Option<Arc<dyn RemoteSuggester>>,
}

impl SessionRegistry {
    pub fn new(
        max_sessions: usize,
        idle_timeout: Option<Duration>,
        config: SuggestionConfig,
        rules: Arc<RuleEngine>,
        remote: Option<Arc<dyn RemoteSuggester>>,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            idle_timeout,
            config,
            rules,
            remote,
        }
    }

    /// Open a new session with a fresh orchestrator.
    pub async fn create(&self) -> Result<Arc<Session>, SessionError> {
        self.expire_idle().await;

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            return Err(SessionError::LimitReached(self.max_sessions));
        }

        let mut orchestrator =
            SuggestionOrchestrator::new(self.config.clone(), Arc::clone(&self.rules));
        if let Some(remote) = &self.remote {
            orchestrator = orchestrator.with_remote(Arc::clone(remote));
        }

        let session = Arc::new(Session::new(orchestrator));
        sessions.insert(session.id, Arc::clone(&session));

        SESSIONS_CREATED_TOTAL.inc();
        SESSIONS_ACTIVE.set(sessions.len() as i64);
        info!(session = %session.id, "Session created");

        Ok(session)
    }

    /// Look up a session and mark it active.
    pub async fn get(&self, id: &Uuid) -> Option<Arc<Session>> {
        let session = self.sessions.read().await.get(id).cloned()?;
        session.touch().await;
        Some(session)
    }

    /// Close a session. Its pending suggestion work is cancelled.
    pub async fn remove(&self, id: &Uuid) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.remove(id) else {
            return false;
        };
        SESSIONS_ACTIVE.set(sessions.len() as i64);
        drop(sessions);

        session.orchestrator.cancel_pending().await;
        info!(session = %id, "Session closed");
        true
    }

    /// Close every session idle for at least the idle timeout. Returns the
    /// number closed.
    pub async fn expire_idle(&self) -> usize {
        let Some(timeout) = self.idle_timeout else {
            return 0;
        };
        let now = Instant::now();

        let mut sessions = self.sessions.write().await;
        let mut idle = Vec::new();
        for (id, session) in sessions.iter() {
            if session.idle_for(now).await >= timeout {
                idle.push(*id);
            }
        }
        if idle.is_empty() {
            return 0;
        }
        let expired: Vec<_> = idle.iter().filter_map(|id| sessions.remove(id)).collect();
        SESSIONS_ACTIVE.set(sessions.len() as i64);
        drop(sessions);

        for session in &expired {
            session.orchestrator.cancel_pending().await;
            info!(session = %session.id, "Session expired after {:?} idle", timeout);
        }
        SESSIONS_EXPIRED_TOTAL.inc_by(expired.len() as u64);
        expired.len()
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }
}
