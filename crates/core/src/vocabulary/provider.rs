//! Vocabulary providers.
//!
//! The board's vocabulary backend is an external collaborator; the suggestion
//! subsystem only needs a read-only snapshot of the words. `InMemoryVocabulary`
//! serves that snapshot from a JSON file or from the bundled seed vocabulary.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::types::{Word, WordCategory};

/// Seed vocabulary shipped with the crate.
const SEED_VOCABULARY: &str = include_str!("../../data/seed_vocabulary.json");

/// Errors that can occur while loading a vocabulary.
#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("Failed to read vocabulary file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse vocabulary: {0}")]
    Parse(String),

    #[error("Duplicate word id: {0}")]
    DuplicateId(String),

    #[error("Vocabulary is empty")]
    Empty,
}

/// Read-only access to the board vocabulary.
pub trait VocabularyProvider: Send + Sync {
    /// Snapshot of every word, in display order.
    fn words(&self) -> Arc<[Word]>;

    /// Look up a word by id.
    fn get(&self, id: &str) -> Option<Word>;
}

/// Vocabulary held in memory, indexed by id.
#[derive(Debug, Clone)]
pub struct InMemoryVocabulary {
    words: Arc<[Word]>,
    index: HashMap<String, usize>,
}

impl InMemoryVocabulary {
    /// Build a vocabulary from words. Ids must be unique.
    pub fn new(words: Vec<Word>) -> Result<Self, VocabularyError> {
        if words.is_empty() {
            return Err(VocabularyError::Empty);
        }

        let mut index = HashMap::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            if index.insert(word.id.clone(), i).is_some() {
                return Err(VocabularyError::DuplicateId(word.id.clone()));
            }
        }

        Ok(Self {
            words: words.into(),
            index,
        })
    }

    /// The bundled seed vocabulary.
    pub fn seed() -> Result<Self, VocabularyError> {
        Self::from_json_str(SEED_VOCABULARY)
    }

    /// Parse a JSON array of words.
    pub fn from_json_str(json: &str) -> Result<Self, VocabularyError> {
        let words: Vec<Word> =
            serde_json::from_str(json).map_err(|e| VocabularyError::Parse(e.to_string()))?;
        Self::new(words)
    }

    /// Load a JSON array of words from a file.
    pub fn from_path(path: &Path) -> Result<Self, VocabularyError> {
        let json = std::fs::read_to_string(path).map_err(|e| VocabularyError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let vocabulary = Self::from_json_str(&json)?;
        info!(
            "Loaded {} words from {}",
            vocabulary.len(),
            path.display()
        );
        Ok(vocabulary)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in the given category, in display order.
    pub fn by_category(&self, category: WordCategory) -> Vec<Word> {
        self.words
            .iter()
            .filter(|w| w.category == category)
            .cloned()
            .collect()
    }
}

impl VocabularyProvider for InMemoryVocabulary {
    fn words(&self) -> Arc<[Word]> {
        Arc::clone(&self.words)
    }

    fn get(&self, id: &str) -> Option<Word> {
        self.index.get(id).map(|&i| self.words[i].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_seed_vocabulary_loads() {
        let vocabulary = InMemoryVocabulary::seed().unwrap();
        assert!(vocabulary.len() > 50);
        assert_eq!(vocabulary.get("yo").unwrap().category, WordCategory::Pronombres);
        assert_eq!(vocabulary.get("bano").unwrap().spanish, "Baño");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let words = vec![
            Word::new("agua", "Agua", "Water", WordCategory::Sustantivos),
            Word::new("agua", "Agua", "Water", WordCategory::Sustantivos),
        ];
        let err = InMemoryVocabulary::new(words).unwrap_err();
        assert!(matches!(err, VocabularyError::DuplicateId(id) if id == "agua"));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            InMemoryVocabulary::new(vec![]),
            Err(VocabularyError::Empty)
        ));
    }

    #[test]
    fn test_invalid_json() {
        let err = InMemoryVocabulary::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, VocabularyError::Parse(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[{{"id":"hola","spanish":"Hola","english":"Hello","category":"sociales"}}]"#
        )
        .unwrap();

        let vocabulary = InMemoryVocabulary::from_path(file.path()).unwrap();
        assert_eq!(vocabulary.len(), 1);
        assert_eq!(vocabulary.words()[0].id, "hola");
    }

    #[test]
    fn test_from_missing_path() {
        let err = InMemoryVocabulary::from_path(Path::new("/nonexistent/words.json")).unwrap_err();
        assert!(matches!(err, VocabularyError::Io { .. }));
    }

    #[test]
    fn test_by_category() {
        let vocabulary = InMemoryVocabulary::seed().unwrap();
        let questions = vocabulary.by_category(WordCategory::Preguntas);
        assert!(questions.iter().all(|w| w.category == WordCategory::Preguntas));
        assert!(questions.iter().any(|w| w.id == "por_que"));
    }
}
