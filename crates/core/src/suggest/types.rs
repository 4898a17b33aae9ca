//! Types exposed by the suggestion orchestrator.

use serde::Serialize;

use super::breaker::BreakerStatus;
use crate::vocabulary::Word;

/// Where the orchestrator is in its evaluation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionPhase {
    /// Nothing evaluated yet.
    #[default]
    Idle,
    /// Waiting for input to settle before calling the remote suggester.
    Debouncing,
    /// Remote call in flight.
    AwaitingRemote,
    /// Current sentence fully evaluated.
    Resolved,
}

/// What produced the remote half of the current output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    /// Rule engine only (no remote result).
    #[default]
    Rules,
    /// Served from the suggestion cache.
    Cache,
    /// Fresh result from the remote suggester.
    Remote,
}

/// The suggestions a consumer should display, plus loading state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuggestionSnapshot {
    pub suggestions: Vec<Word>,
    pub is_loading: bool,
    pub source: SuggestionSource,
    pub phase: SuggestionPhase,
}

impl SuggestionSnapshot {
    pub fn word_ids(&self) -> Vec<&str> {
        self.suggestions.iter().map(|w| w.id.as_str()).collect()
    }
}

/// Current status of an orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    pub phase: SuggestionPhase,
    pub is_loading: bool,
    pub breaker: BreakerStatus,
    pub cache_entries: usize,
    pub cache_capacity: usize,
    pub remote_configured: bool,
}
