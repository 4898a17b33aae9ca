//! Board session handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use pictovoz_core::suggest::OrchestratorStatus;
use pictovoz_core::{SuggestionSnapshot, VocabularyProvider};

use super::handlers::ErrorResponse;
use crate::session::{Session, SessionError, SessionView};
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Deserialize)]
pub struct AddWordBody {
    pub word_id: String,
}

async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<Session>, ApiError> {
    state.sessions().get(&id).await.ok_or_else(|| {
        ErrorResponse::with_status(StatusCode::NOT_FOUND, format!("Session not found: {}", id))
    })
}

impl From<SessionError> for (StatusCode, Json<ErrorResponse>) {
    fn from(e: SessionError) -> Self {
        let status = match e {
            SessionError::LimitReached(_) => StatusCode::SERVICE_UNAVAILABLE,
            SessionError::SentenceFull => StatusCode::CONFLICT,
        };
        ErrorResponse::with_status(status, e.to_string())
    }
}

/// Open a new board session.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let session = state.sessions().create().await?;
    Ok((StatusCode::CREATED, Json(session.view().await)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, id).await?;
    Ok(Json(session.view().await))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions().remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ErrorResponse::with_status(
            StatusCode::NOT_FOUND,
            format!("Session not found: {}", id),
        ))
    }
}

/// Append a word to the session's sentence.
pub async fn add_word(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddWordBody>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, id).await?;
    let word = state.vocabulary().get(&body.word_id).ok_or_else(|| {
        ErrorResponse::with_status(
            StatusCode::NOT_FOUND,
            format!("Word not found: {}", body.word_id),
        )
    })?;

    debug!(session = %id, word = %word.id, "Adding word");
    let view = session
        .push_word(word, state.vocabulary().words())
        .await?;
    Ok(Json(view))
}

/// Backspace.
pub async fn remove_last_word(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, id).await?;
    Ok(Json(session.pop_word(state.vocabulary().words()).await))
}

pub async fn clear_sentence(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, id).await?;
    Ok(Json(session.clear(state.vocabulary().words()).await))
}

pub async fn get_suggestions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuggestionSnapshot>, ApiError> {
    let session = find_session(&state, id).await?;
    Ok(Json(session.suggestions().await))
}

pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrchestratorStatus>, ApiError> {
    let session = find_session(&state, id).await?;
    Ok(Json(session.status().await))
}
