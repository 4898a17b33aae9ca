//! Suggestion orchestrator.
//!
//! Reconciles the rule engine, the suggestion cache, the circuit breaker and
//! an optional remote suggester into one output per sentence:
//! - Every sentence change cancels pending work and bumps a generation counter
//! - Cache hits and an open breaker resolve immediately
//! - Otherwise the remote call runs after a debounce in a spawned task
//! - A remote result is committed only if its generation is still current,
//!   checked under the same lock that applies the commit

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::breaker::CircuitBreaker;
use super::cache::{Fingerprint, SuggestionCache};
use super::config::SuggestionConfig;
use super::rules::RuleEngine;
use super::traits::{RemoteError, RemoteSuggester};
use super::types::{OrchestratorStatus, SuggestionPhase, SuggestionSnapshot, SuggestionSource};
use crate::metrics;
use crate::vocabulary::Word;

/// Remote work scheduled for one evaluation.
struct PendingRequest {
    generation: u64,
    cancel: CancellationToken,
}

struct State {
    cache: SuggestionCache,
    breaker: CircuitBreaker,
    sentence: Arc<[Word]>,
    vocabulary: Arc<[Word]>,
    /// Remote (or cached) words for the current sentence. Empty means the
    /// rule engine output is shown.
    remote_result: Vec<Word>,
    source: SuggestionSource,
    is_loading: bool,
    phase: SuggestionPhase,
    last_length: usize,
    generation: u64,
    pending: Option<PendingRequest>,
}

impl State {
    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Cancel any pending debounce or in-flight call and invalidate its generation.
    fn supersede(&mut self) -> u64 {
        if let Some(pending) = self.pending.take() {
            debug!(generation = pending.generation, "Cancelling pending remote request");
            pending.cancel.cancel();
        }
        self.generation += 1;
        self.generation
    }

    fn resolve(&mut self) {
        self.pending = None;
        self.is_loading = false;
        self.phase = SuggestionPhase::Resolved;
    }
}

struct Shared {
    config: SuggestionConfig,
    rules: Arc<RuleEngine>,
    state: Mutex<State>,
    updates: watch::Sender<SuggestionSnapshot>,
}

impl Shared {
    fn snapshot_of(&self, state: &State) -> SuggestionSnapshot {
        let (suggestions, source) = if state.remote_result.is_empty() {
            (
                self.rules.suggest(&state.sentence, &state.vocabulary),
                SuggestionSource::Rules,
            )
        } else {
            (state.remote_result.clone(), state.source)
        };

        SuggestionSnapshot {
            suggestions,
            is_loading: state.is_loading,
            source,
            phase: state.phase,
        }
    }

    /// Compute the current snapshot and push it to subscribers.
    fn publish(&self, state: &State) -> SuggestionSnapshot {
        let snapshot = self.snapshot_of(state);
        self.updates.send_replace(snapshot.clone());
        snapshot
    }
}

/// Drives next-word suggestions for one board.
///
/// Owns its cache and circuit breaker; nothing is shared between
/// orchestrators. Must be used from within a tokio runtime.
pub struct SuggestionOrchestrator {
    shared: Arc<Shared>,
    remote: Option<Arc<dyn RemoteSuggester>>,
    /// Parent of every request token; cancelled on drop.
    shutdown: CancellationToken,
}

impl SuggestionOrchestrator {
    /// Create an orchestrator with a cache and breaker sized from `config`.
    pub fn new(config: SuggestionConfig, rules: Arc<RuleEngine>) -> Self {
        let cache = SuggestionCache::new(config.cache_capacity);
        let breaker = CircuitBreaker::new(config.failure_threshold, config.cooldown());
        Self::with_components(config, rules, cache, breaker)
    }

    /// Create an orchestrator around explicit components.
    pub fn with_components(
        config: SuggestionConfig,
        rules: Arc<RuleEngine>,
        cache: SuggestionCache,
        breaker: CircuitBreaker,
    ) -> Self {
        let state = State {
            cache,
            breaker,
            sentence: Arc::from(Vec::new()),
            vocabulary: Arc::from(Vec::new()),
            remote_result: Vec::new(),
            source: SuggestionSource::Rules,
            is_loading: false,
            phase: SuggestionPhase::Idle,
            last_length: 0,
            generation: 0,
            pending: None,
        };
        let (updates, _) = watch::channel(SuggestionSnapshot::default());

        Self {
            shared: Arc::new(Shared {
                config,
                rules,
                state: Mutex::new(state),
                updates,
            }),
            remote: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Attach a remote suggester. Without one only the rule engine is used.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteSuggester>) -> Self {
        info!("Remote suggestions enabled via {}", remote.name());
        self.remote = Some(remote);
        self
    }

    /// Re-evaluate suggestions for a changed sentence.
    ///
    /// Never blocks on the remote suggester: returns the snapshot as of this
    /// evaluation (rule engine output while a remote call is pending).
    pub async fn sentence_changed(
        &self,
        sentence: &[Word],
        vocabulary: Arc<[Word]>,
    ) -> SuggestionSnapshot {
        let mut state = self.shared.state.lock().await;
        let generation = state.supersede();

        let length_changed = state.last_length != sentence.len();
        state.last_length = sentence.len();
        state.sentence = Arc::from(sentence);
        state.vocabulary = vocabulary;
        state.remote_result.clear();
        state.source = SuggestionSource::Rules;

        let remote = match &self.remote {
            Some(remote) if !sentence.is_empty() => Arc::clone(remote),
            _ => {
                metrics::SUGGESTION_EVALUATIONS
                    .with_label_values(&["rules_only"])
                    .inc();
                state.resolve();
                return self.shared.publish(&state);
            }
        };

        if state.breaker.is_open() {
            debug!(generation, "Circuit breaker open, using rule suggestions");
            metrics::SUGGESTION_EVALUATIONS
                .with_label_values(&["breaker_open"])
                .inc();
            state.resolve();
            return self.shared.publish(&state);
        }

        let key = Fingerprint::of(sentence);
        if let Some(cached) = state.cache.get(&key) {
            debug!(generation, fingerprint = %key, "Suggestion cache hit");
            state.remote_result = cached.to_vec();
            state.source = SuggestionSource::Cache;
            metrics::SUGGESTION_EVALUATIONS
                .with_label_values(&["cache_hit"])
                .inc();
            state.resolve();
            return self.shared.publish(&state);
        }

        if length_changed {
            state.is_loading = true;
        }
        state.phase = SuggestionPhase::Debouncing;

        let cancel = self.shutdown.child_token();
        state.pending = Some(PendingRequest {
            generation,
            cancel: cancel.clone(),
        });
        metrics::SUGGESTION_EVALUATIONS
            .with_label_values(&["remote_scheduled"])
            .inc();

        self.spawn_remote_request(
            remote,
            generation,
            cancel,
            key,
            Arc::clone(&state.sentence),
            Arc::clone(&state.vocabulary),
        );

        self.shared.publish(&state)
    }

    fn spawn_remote_request(
        &self,
        remote: Arc<dyn RemoteSuggester>,
        generation: u64,
        cancel: CancellationToken,
        key: Fingerprint,
        sentence: Arc<[Word]>,
        vocabulary: Arc<[Word]>,
    ) {
        let shared = Arc::clone(&self.shared);

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(generation, "Debounce cancelled");
                    return;
                }
                _ = tokio::time::sleep(shared.config.debounce()) => {}
            }

            {
                let mut state = shared.state.lock().await;
                if !state.is_current(generation) || cancel.is_cancelled() {
                    return;
                }
                state.phase = SuggestionPhase::AwaitingRemote;
                shared.publish(&state);
            }

            debug!(generation, fingerprint = %key, "Requesting remote suggestions from {}", remote.name());
            let start = Instant::now();
            let call = async {
                match shared.config.remote_timeout() {
                    Some(limit) => {
                        match tokio::time::timeout(limit, remote.suggest(&sentence, &vocabulary, &cancel)).await {
                            Ok(result) => result,
                            Err(_) => Err(RemoteError::Timeout(limit)),
                        }
                    }
                    None => remote.suggest(&sentence, &vocabulary, &cancel).await,
                }
            };
            let outcome = tokio::select! {
                _ = cancel.cancelled() => Err(RemoteError::Aborted),
                result = call => result,
            };
            metrics::REMOTE_LATENCY.observe(start.elapsed().as_secs_f64());

            let mut state = shared.state.lock().await;
            if !state.is_current(generation) || cancel.is_cancelled() {
                debug!(generation, "Discarding superseded remote result");
                metrics::REMOTE_REQUESTS
                    .with_label_values(&["superseded"])
                    .inc();
                return;
            }

            let outcome = match outcome {
                Ok(words) if words.is_empty() => Err(RemoteError::Empty),
                other => other,
            };

            match outcome {
                Ok(words) => {
                    debug!(generation, count = words.len(), "Remote suggestions received");
                    metrics::REMOTE_REQUESTS.with_label_values(&["success"]).inc();
                    state.breaker.record_success();
                    state.cache.put(key, words.clone());
                    state.remote_result = words;
                    state.source = SuggestionSource::Remote;
                }
                Err(e) if !e.is_failure() => {
                    debug!(generation, "Remote request aborted");
                    metrics::REMOTE_REQUESTS.with_label_values(&[e.kind()]).inc();
                    state.remote_result.clear();
                }
                Err(e) => {
                    warn!(generation, "Remote suggestions failed, using rules: {}", e);
                    metrics::REMOTE_REQUESTS
                        .with_label_values(&[e.kind()])
                        .inc();
                    state.breaker.record_failure();
                    state.remote_result.clear();
                }
            }

            state.resolve();
            shared.publish(&state);
        });
    }

    /// The latest snapshot.
    pub async fn snapshot(&self) -> SuggestionSnapshot {
        let state = self.shared.state.lock().await;
        self.shared.snapshot_of(&state)
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SuggestionSnapshot> {
        self.shared.updates.subscribe()
    }

    pub async fn status(&self) -> OrchestratorStatus {
        let state = self.shared.state.lock().await;
        OrchestratorStatus {
            phase: state.phase,
            is_loading: state.is_loading,
            breaker: state.breaker.status(),
            cache_entries: state.cache.len(),
            cache_capacity: state.cache.capacity(),
            remote_configured: self.remote.is_some(),
        }
    }

    /// Cancel any pending debounce or in-flight call, keeping the rule output.
    pub async fn cancel_pending(&self) {
        let mut state = self.shared.state.lock().await;
        if state.pending.is_none() {
            return;
        }
        state.supersede();
        state.resolve();
        self.shared.publish(&state);
    }
}

impl Drop for SuggestionOrchestrator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
