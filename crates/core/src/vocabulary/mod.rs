//! Board vocabulary: words, categories, and the in-progress sentence.

mod provider;
mod sentence;
mod types;

pub use provider::{InMemoryVocabulary, VocabularyError, VocabularyProvider};
pub use sentence::{Sentence, MAX_SENTENCE_LENGTH};
pub use types::{Word, WordCategory, WordFrequency};
