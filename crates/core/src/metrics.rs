//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Suggestion evaluations (rules only, cache, breaker, remote)
//! - Remote suggester requests and latency
//! - Circuit breaker trips and LLM token usage

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Orchestrator
// =============================================================================

/// Sentence evaluations by outcome.
pub static SUGGESTION_EVALUATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "pictovoz_suggestion_evaluations_total",
            "Total sentence evaluations by the suggestion orchestrator",
        ),
        &["outcome"], // "rules_only", "breaker_open", "cache_hit", "remote_scheduled"
    )
    .unwrap()
});

/// Remote suggester requests by result.
pub static REMOTE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "pictovoz_remote_requests_total",
            "Total remote suggestion requests",
        ),
        // "success", "unavailable", "malformed", "empty", "timeout", "aborted", "superseded"
        &["result"],
    )
    .unwrap()
});

/// Remote suggester latency in seconds.
pub static REMOTE_LATENCY: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "pictovoz_remote_latency_seconds",
            "Duration of remote suggestion requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .unwrap()
});

/// Circuit breaker transitions to open.
pub static BREAKER_OPENED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "pictovoz_breaker_opened_total",
        "Total times the circuit breaker opened",
    )
    .unwrap()
});

// =============================================================================
// External services
// =============================================================================

/// LLM tokens used.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pictovoz_llm_tokens_total", "Total LLM tokens used"),
        &["provider", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SUGGESTION_EVALUATIONS.clone()),
        Box::new(REMOTE_REQUESTS.clone()),
        Box::new(REMOTE_LATENCY.clone()),
        Box::new(BREAKER_OPENED.clone()),
        Box::new(LLM_TOKENS.clone()),
    ]
}
