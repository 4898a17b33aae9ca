//! Testing utilities and mock implementations.
//!
//! Provides a scriptable `RemoteSuggester` so the orchestrator can be driven
//! deterministically (with paused tokio time) without a real LLM backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use pictovoz_core::testing::{fixtures, MockRemoteSuggester, MockResponse};
//!
//! let vocabulary = fixtures::seed_vocabulary();
//! let remote = Arc::new(MockRemoteSuggester::new());
//! remote.push_response(MockResponse::ids(&["agua"])).await;
//!
//! let orchestrator = SuggestionOrchestrator::new(config, rules).with_remote(remote.clone());
//! ```

mod mock_remote;

pub use mock_remote::{MockRemoteSuggester, MockReply, MockResponse, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;

    use crate::vocabulary::{InMemoryVocabulary, VocabularyProvider, Word, WordCategory};

    /// Create a test word with the id doubling as its text.
    pub fn word(id: &str, category: WordCategory) -> Word {
        Word::new(id, id, id, category)
    }

    /// The bundled seed vocabulary.
    pub fn seed_vocabulary() -> Arc<[Word]> {
        InMemoryVocabulary::seed()
            .expect("seed vocabulary must parse")
            .words()
    }

    /// Pick words by id, in order. Panics on an unknown id.
    pub fn sentence(vocabulary: &[Word], ids: &[&str]) -> Vec<Word> {
        ids.iter()
            .map(|id| {
                vocabulary
                    .iter()
                    .find(|w| w.id == *id)
                    .unwrap_or_else(|| panic!("unknown word id in fixture: {}", id))
                    .clone()
            })
            .collect()
    }
}
