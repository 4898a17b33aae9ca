//! WebSocket stream of a session's suggestion snapshots.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use pictovoz_core::SuggestionSnapshot;

use super::handlers::ErrorResponse;
use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_SNAPSHOTS_SENT};
use crate::state::AppState;

/// Message pushed to WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// The session's suggestions changed.
    Snapshot(SuggestionSnapshot),
    /// The session was closed; no further snapshots follow.
    SessionClosed,
}

/// WebSocket upgrade handler. Sends the current snapshot on connect and
/// every published snapshot after that.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Response {
    let Some(session) = state.sessions().get(&id).await else {
        return ErrorResponse::with_status(
            StatusCode::NOT_FOUND,
            format!("Session not found: {}", id),
        )
        .into_response();
    };

    // Only the receiver is held so a closed session ends the stream.
    let updates = session.orchestrator().subscribe();
    drop(session);

    ws.on_upgrade(move |socket| handle_socket(socket, id, updates))
}

async fn send_message(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &WsMessage,
) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            error!("Failed to serialize WsMessage: {}", e);
            true
        }
    }
}

async fn handle_socket(
    socket: WebSocket,
    session_id: Uuid,
    mut updates: watch::Receiver<SuggestionSnapshot>,
) {
    let (mut sender, mut receiver) = socket.split();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();
    info!(session = %session_id, "WebSocket client connected");

    let send_task = tokio::spawn(async move {
        let current = updates.borrow_and_update().clone();
        if !send_message(&mut sender, &WsMessage::Snapshot(current)).await {
            return;
        }
        WS_SNAPSHOTS_SENT.inc();

        loop {
            if updates.changed().await.is_err() {
                debug!("Snapshot channel closed");
                let _ = send_message(&mut sender, &WsMessage::SessionClosed).await;
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
            // Intermediate snapshots may be skipped; the latest one wins.
            let snapshot = updates.borrow_and_update().clone();
            if !send_message(&mut sender, &WsMessage::Snapshot(snapshot)).await {
                debug!("WebSocket send failed, client disconnected");
                break;
            }
            WS_SNAPSHOTS_SENT.inc();
        }
    });

    // Clients only ever close; anything else is logged and ignored.
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                debug!("Ignoring text message: {}", text.as_str());
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!(session = %session_id, "WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_message_serialization() {
        let json = serde_json::to_value(WsMessage::Snapshot(SuggestionSnapshot::default())).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["is_loading"], false);
        assert_eq!(json["source"], "rules");
        assert_eq!(json["phase"], "idle");

        let json = serde_json::to_value(WsMessage::SessionClosed).unwrap();
        assert_eq!(json, serde_json::json!({"type": "session_closed"}));
    }
}
