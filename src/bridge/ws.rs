//! WebSocket endpoint connecting a host document to the conversation store.
//!
//! Architecture:
//! - Each host connection gets its own socket loop. On connect the bridge
//!   sends `INIT_CONVERSATION` with the stored conversation, then handles
//!   inbound messages one at a time until the host disconnects.
//! - Replies go back on the same socket; saves and clears produce none.
//! - If an allowed origin is configured, upgrade requests from any other
//!   origin are rejected with 403 before the socket opens.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{debug, info, warn};

use crate::bridge::protocol::{FrameMessage, HostMessage};
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::store::ConversationStore;

/// State shared by the bridge handlers.
struct BridgeInner {
    store: Arc<ConversationStore>,
    allowed_origin: Option<String>,
}

/// Axum handler state (cloneable).
#[derive(Clone)]
struct BridgeState {
    inner: Arc<BridgeInner>,
}

/// Build the bridge router: `/ws/bridge` for hosts, `/health` for probes.
pub fn bridge_routes(store: Arc<ConversationStore>, allowed_origin: Option<String>) -> Router {
    let state = BridgeState {
        inner: Arc::new(BridgeInner {
            store,
            allowed_origin,
        }),
    };

    Router::new()
        .route("/ws/bridge", get(ws_bridge_handler))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind and serve the bridge until the process is stopped.
pub async fn serve(store: Arc<ConversationStore>, config: &BridgeConfig) -> Result<(), BridgeError> {
    let addr = format!("0.0.0.0:{}", config.port);
    let app = bridge_routes(store, config.allowed_origin.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BridgeError::Bind {
            addr: addr.clone(),
            source: e,
        })?;
    info!(port = config.port, "Bridge server started");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "convo-bridge",
    }))
}

async fn ws_bridge_handler(
    ws: WebSocketUpgrade,
    State(state): State<BridgeState>,
    headers: HeaderMap,
) -> Response {
    if let Some(expected) = &state.inner.allowed_origin {
        let origin = headers
            .get(header::ORIGIN)
            .and_then(|v| v.to_str().ok());
        if origin != Some(expected.as_str()) {
            warn!(origin = ?origin, "Rejected bridge connection from unexpected origin");
            return StatusCode::FORBIDDEN.into_response();
        }
    }

    info!("Host document connecting");
    ws.on_upgrade(move |socket| handle_bridge_socket(socket, state.inner))
        .into_response()
}

async fn handle_bridge_socket(mut socket: WebSocket, inner: Arc<BridgeInner>) {
    // Greet the host with the conversation as stored right now. Fires once
    // per connection.
    let conversation = inner.store.load().await;
    if send_frame(&mut socket, &FrameMessage::InitConversation { conversation })
        .await
        .is_err()
    {
        debug!("Host disconnected before init message");
        return;
    }

    while let Some(result) = socket.recv().await {
        match result {
            Ok(Message::Text(text)) => {
                let msg = match serde_json::from_str::<HostMessage>(&text) {
                    Ok(msg) => msg,
                    Err(e) => {
                        debug!(error = %e, "Ignoring unrecognized bridge message");
                        continue;
                    }
                };
                if let Some(reply) = dispatch(&inner.store, msg).await {
                    if send_frame(&mut socket, &reply).await.is_err() {
                        debug!("Host disconnected during send");
                        break;
                    }
                }
            }
            Ok(Message::Ping(data)) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!("Host document disconnected");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Bridge WebSocket error");
                break;
            }
            _ => {}
        }
    }

    info!("Bridge connection closed");
}

/// Route one inbound message, returning the reply to send, if any.
async fn dispatch(store: &ConversationStore, msg: HostMessage) -> Option<FrameMessage> {
    match msg {
        HostMessage::GetConversation => Some(FrameMessage::ConversationData {
            conversation: store.load().await,
        }),
        HostMessage::SaveConversation { conversation } => {
            store.save(&conversation).await;
            None
        }
        HostMessage::ClearConversation => {
            store.clear().await;
            None
        }
    }
}

async fn send_frame(socket: &mut WebSocket, msg: &FrameMessage) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!(error = %e, "Failed to serialize outbound bridge message");
            Ok(())
        }
    }
}
