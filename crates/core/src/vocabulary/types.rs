//! Vocabulary word types.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Grammatical/semantic category of a word.
///
/// Serialized with the Spanish names used by the vocabulary data. Unknown
/// names coming from external data fall back to `Sustantivos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum WordCategory {
    Verbos,
    Sustantivos,
    Adjetivos,
    Pronombres,
    Preguntas,
    Sociales,
    Numeros,
    Colores,
    Tiempo,
    Emociones,
}

impl WordCategory {
    /// Number of categories.
    pub const COUNT: usize = 10;

    /// Categories in board display order.
    pub const ALL: [WordCategory; Self::COUNT] = [
        WordCategory::Pronombres,
        WordCategory::Verbos,
        WordCategory::Sociales,
        WordCategory::Preguntas,
        WordCategory::Sustantivos,
        WordCategory::Emociones,
        WordCategory::Adjetivos,
        WordCategory::Numeros,
        WordCategory::Colores,
        WordCategory::Tiempo,
    ];

    /// Stable slot for per-category tables.
    pub fn index(self) -> usize {
        match self {
            WordCategory::Verbos => 0,
            WordCategory::Sustantivos => 1,
            WordCategory::Adjetivos => 2,
            WordCategory::Pronombres => 3,
            WordCategory::Preguntas => 4,
            WordCategory::Sociales => 5,
            WordCategory::Numeros => 6,
            WordCategory::Colores => 7,
            WordCategory::Tiempo => 8,
            WordCategory::Emociones => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WordCategory::Verbos => "verbos",
            WordCategory::Sustantivos => "sustantivos",
            WordCategory::Adjetivos => "adjetivos",
            WordCategory::Pronombres => "pronombres",
            WordCategory::Preguntas => "preguntas",
            WordCategory::Sociales => "sociales",
            WordCategory::Numeros => "numeros",
            WordCategory::Colores => "colores",
            WordCategory::Tiempo => "tiempo",
            WordCategory::Emociones => "emociones",
        }
    }

    /// Parse a category name, returning `None` for unknown names.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl From<String> for WordCategory {
    fn from(value: String) -> Self {
        Self::parse(&value).unwrap_or_else(|| {
            warn!("Invalid category {:?}, defaulting to sustantivos", value);
            WordCategory::Sustantivos
        })
    }
}

impl std::fmt::Display for WordCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usage frequency, used to prioritize words on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum WordFrequency {
    High,
    #[default]
    Medium,
    Low,
}

impl From<String> for WordFrequency {
    fn from(value: String) -> Self {
        match value.as_str() {
            "high" => WordFrequency::High,
            "low" => WordFrequency::Low,
            _ => WordFrequency::Medium,
        }
    }
}

/// A vocabulary word (pictogram) on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Stable identifier, used as identity everywhere.
    pub id: String,
    /// Spanish word or phrase (what gets spoken).
    pub spanish: String,
    /// English translation.
    pub english: String,
    pub category: WordCategory,
    #[serde(default)]
    pub frequency: WordFrequency,
    /// Location contexts where the word is relevant ("all" = everywhere).
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

fn default_locations() -> Vec<String> {
    vec!["all".to_string()]
}

impl Word {
    pub fn new(
        id: impl Into<String>,
        spanish: impl Into<String>,
        english: impl Into<String>,
        category: WordCategory,
    ) -> Self {
        Self {
            id: id.into(),
            spanish: spanish.into(),
            english: english.into(),
            category,
            frequency: WordFrequency::default(),
            locations: default_locations(),
            symbol_url: None,
            audio_url: None,
        }
    }

    pub fn with_frequency(mut self, frequency: WordFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_symbol_url(mut self, url: impl Into<String>) -> Self {
        self.symbol_url = Some(url.into());
        self
    }

    pub fn with_locations(mut self, locations: Vec<String>) -> Self {
        self.locations = locations;
        self
    }

    /// Returns true if the word is shown at the given location.
    pub fn belongs_to_location(&self, location_id: &str) -> bool {
        self.locations
            .iter()
            .any(|l| l == "all" || l == location_id)
    }

    /// Case-insensitive substring match on the Spanish or English text.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.spanish.to_lowercase().contains(&query) || self.english.to_lowercase().contains(&query)
    }
}
