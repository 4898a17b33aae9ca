//! The in-progress sentence built on the board.

use serde::Serialize;

use super::types::Word;
use crate::suggest::Fingerprint;

/// Maximum number of words allowed in a sentence.
pub const MAX_SENTENCE_LENGTH: usize = 20;

/// Ordered, append/truncate-only sequence of words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sentence {
    words: Vec<Word>,
}

impl Sentence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Append a word. Returns false (and leaves the sentence untouched) when full.
    pub fn push(&mut self, word: Word) -> bool {
        if self.is_full() {
            return false;
        }
        self.words.push(word);
        true
    }

    /// Remove the last word (backspace).
    pub fn pop(&mut self) -> Option<Word> {
        self.words.pop()
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.words.len() >= MAX_SENTENCE_LENGTH
    }

    /// Space-joined Spanish text, as it would be spoken.
    pub fn spanish_text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.spanish.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn word_ids(&self) -> Vec<&str> {
        self.words.iter().map(|w| w.id.as_str()).collect()
    }

    /// Cache key for the current word sequence.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.words)
    }
}
