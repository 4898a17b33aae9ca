//! Mock remote suggester for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::suggest::{RemoteError, RemoteSuggester};
use crate::vocabulary::Word;

/// What a scripted response resolves to.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Word ids, resolved against the vocabulary passed to the call.
    Ids(Vec<String>),
    Error(RemoteError),
}

/// A scripted response, optionally delayed.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub delay: Duration,
    pub reply: MockReply,
}

impl MockResponse {
    pub fn ids(ids: &[&str]) -> Self {
        Self {
            delay: Duration::ZERO,
            reply: MockReply::Ids(ids.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn error(error: RemoteError) -> Self {
        Self {
            delay: Duration::ZERO,
            reply: MockReply::Error(error),
        }
    }

    /// Resolve only after `delay` (or abort if cancelled first).
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A recorded call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Word ids of the sentence the call was made for.
    pub sentence_ids: Vec<String>,
    pub vocabulary_size: usize,
    /// When the call was made.
    pub timestamp: Instant,
}

/// Mock implementation of the RemoteSuggester trait.
///
/// Responses are consumed in order from a queue. Responses registered for a
/// specific sentence (by joined ids) take precedence. When nothing is
/// scripted the call fails with `Unavailable`.
///
/// # Example
///
/// ```rust,ignore
/// use pictovoz_core::testing::{MockRemoteSuggester, MockResponse};
///
/// let remote = MockRemoteSuggester::new();
/// remote.push_response(MockResponse::ids(&["agua", "comer"]).after(Duration::from_millis(50))).await;
///
/// // ... drive an orchestrator ...
///
/// assert_eq!(remote.call_count().await, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockRemoteSuggester {
    queue: Arc<RwLock<VecDeque<MockResponse>>>,
    by_sentence: Arc<RwLock<HashMap<String, MockResponse>>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
}

impl MockRemoteSuggester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next unmatched call.
    pub async fn push_response(&self, response: MockResponse) {
        self.queue.write().await.push_back(response);
    }

    /// Always answer calls for this sentence (ids in order) with `response`.
    pub async fn set_response_for(&self, sentence_ids: &[&str], response: MockResponse) {
        self.by_sentence
            .write()
            .await
            .insert(sentence_ids.join("_"), response);
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    pub async fn clear(&self) {
        self.queue.write().await.clear();
        self.by_sentence.write().await.clear();
        self.calls.write().await.clear();
    }

    async fn next_response(&self, key: &str) -> Option<MockResponse> {
        if let Some(response) = self.by_sentence.read().await.get(key) {
            return Some(response.clone());
        }
        self.queue.write().await.pop_front()
    }
}

#[async_trait]
impl RemoteSuggester for MockRemoteSuggester {
    fn name(&self) -> &str {
        "mock"
    }

    async fn suggest(
        &self,
        sentence: &[Word],
        vocabulary: &[Word],
        cancel: &CancellationToken,
    ) -> Result<Vec<Word>, RemoteError> {
        let sentence_ids: Vec<String> = sentence.iter().map(|w| w.id.clone()).collect();
        let key = sentence_ids.join("_");

        self.calls.write().await.push(RecordedCall {
            sentence_ids,
            vocabulary_size: vocabulary.len(),
            timestamp: Instant::now(),
        });

        let Some(response) = self.next_response(&key).await else {
            return Err(RemoteError::Unavailable("no scripted response".to_string()));
        };

        if !response.delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(RemoteError::Aborted),
                _ = tokio::time::sleep(response.delay) => {}
            }
        }
        if cancel.is_cancelled() {
            return Err(RemoteError::Aborted);
        }

        match response.reply {
            MockReply::Ids(ids) => Ok(ids
                .iter()
                .filter_map(|id| vocabulary.iter().find(|w| &w.id == id).cloned())
                .collect()),
            MockReply::Error(error) => Err(error),
        }
    }
}
