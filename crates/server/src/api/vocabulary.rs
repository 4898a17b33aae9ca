//! Vocabulary, rule-engine and template handlers.
//!
//! These are stateless: they read the shared vocabulary and rule table but
//! never touch a session.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use pictovoz_core::suggest::{default_templates, PhraseTemplate};
use pictovoz_core::{VocabularyProvider, Word, WordCategory};

use super::handlers::ErrorResponse;
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Deserialize)]
pub struct VocabularyParams {
    pub category: Option<String>,
    /// Location id; "all" disables the filter.
    pub location: Option<String>,
    /// Search text matched against the Spanish and English forms.
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VocabularyResponse {
    pub words: Vec<Word>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct RuleSuggestBody {
    pub word_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplateView {
    pub id: &'static str,
    pub label: &'static str,
    pub prefix_word_ids: &'static [&'static str],
    pub slot_hint: &'static str,
    pub fills: Vec<Word>,
}

impl TemplateView {
    fn new(template: &'static PhraseTemplate, vocabulary: &[Word]) -> Self {
        Self {
            id: template.id,
            label: template.label,
            prefix_word_ids: template.prefix_word_ids,
            slot_hint: template.slot_hint,
            fills: template.resolve_fills(vocabulary),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RuleSuggestResponse {
    pub suggestions: Vec<Word>,
    /// Templates whose prefix ends the sentence.
    pub templates: Vec<TemplateView>,
}

/// List the vocabulary, optionally filtered by category, location and search text.
pub async fn list_vocabulary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VocabularyParams>,
) -> Result<Json<VocabularyResponse>, ApiError> {
    let mut words = match params.category.as_deref() {
        Some(name) => {
            let category = WordCategory::parse(name).ok_or_else(|| {
                ErrorResponse::with_status(
                    StatusCode::BAD_REQUEST,
                    format!("Unknown category: {}", name),
                )
            })?;
            state.vocabulary().by_category(category)
        }
        None => state.vocabulary().words().to_vec(),
    };

    if let Some(location) = params.location.as_deref().filter(|l| *l != "all") {
        words.retain(|w| w.belongs_to_location(location));
    }
    if let Some(query) = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        words.retain(|w| w.matches_query(query));
    }

    Ok(Json(VocabularyResponse {
        total: words.len(),
        words,
    }))
}

/// Rule-engine output for an ad-hoc sentence, without a session.
pub async fn suggest_rules(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RuleSuggestBody>,
) -> Result<Json<RuleSuggestResponse>, ApiError> {
    let vocabulary = state.vocabulary();
    let mut sentence = Vec::with_capacity(body.word_ids.len());
    for id in &body.word_ids {
        let word = vocabulary.get(id).ok_or_else(|| {
            ErrorResponse::with_status(StatusCode::NOT_FOUND, format!("Word not found: {}", id))
        })?;
        sentence.push(word);
    }

    let words = vocabulary.words();
    let rules = state.rules();
    Ok(Json(RuleSuggestResponse {
        suggestions: rules.suggest(&sentence, &words),
        templates: rules
            .matching_templates(&sentence)
            .into_iter()
            .map(|t| TemplateView::new(t, &words))
            .collect(),
    }))
}

/// Every built-in phrase template with its fills resolved.
pub async fn list_templates(State(state): State<Arc<AppState>>) -> Json<Vec<TemplateView>> {
    let words = state.vocabulary().words();
    Json(
        default_templates()
            .iter()
            .map(|t| TemplateView::new(t, &words))
            .collect(),
    )
}
