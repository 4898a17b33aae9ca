use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, sessions, vocabulary, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Vocabulary and stateless suggestions
        .route("/vocabulary", get(vocabulary::list_vocabulary))
        .route("/suggest/rules", post(vocabulary::suggest_rules))
        .route("/templates", get(vocabulary::list_templates))
        // Board sessions
        .route("/sessions", post(sessions::create_session))
        .route("/sessions/{id}", get(sessions::get_session))
        .route("/sessions/{id}", delete(sessions::delete_session))
        .route("/sessions/{id}/words", post(sessions::add_word))
        .route("/sessions/{id}/words", delete(sessions::clear_sentence))
        .route("/sessions/{id}/words/last", delete(sessions::remove_last_word))
        .route("/sessions/{id}/suggestions", get(sessions::get_suggestions))
        .route("/sessions/{id}/status", get(sessions::get_status))
        .route("/sessions/{id}/ws", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(metrics_middleware)),
        )
}
