//! Predictive next-word suggestions.
//!
//! Components, leaf first:
//! - **RuleEngine**: deterministic sentence-tail rules, always available
//! - **SuggestionCache**: bounded fingerprint -> result store
//! - **CircuitBreaker**: pauses remote calls after repeated failures
//! - **RemoteSuggester**: context-aware suggestions from an external service
//! - **SuggestionOrchestrator**: debounces, cancels and reconciles all of the above

mod breaker;
mod cache;
mod config;
mod llm;
mod llm_suggester;
mod orchestrator;
mod rules;
mod templates;
mod traits;
mod types;

pub use breaker::{BreakerState, BreakerStatus, CircuitBreaker};
pub use cache::{Fingerprint, SuggestionCache};
pub use config::{LlmProvider, RemoteConfig, SuggestionConfig};
pub use llm::{
    create_llm_client, CompletionRequest, CompletionResponse, GeminiClient, LlmClient, LlmError,
    LlmUsage, OllamaClient,
};
pub use llm_suggester::{parse_suggestions, LlmSuggester};
pub use orchestrator::SuggestionOrchestrator;
pub use rules::{default_rules, RuleEngine, RuleTrigger, SuggestionRule, GENERIC_FALLBACK_IDS};
pub use templates::{default_templates, matching_templates, PhraseTemplate};
pub use traits::{RemoteError, RemoteSuggester};
pub use types::{OrchestratorStatus, SuggestionPhase, SuggestionSnapshot, SuggestionSource};
