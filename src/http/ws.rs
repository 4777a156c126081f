use super::handlers::error_response;
use super::state::AppState;
use crate::ingest::{AudioPushIngest, SenderIngest};
use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// What a WebSocket client does once connected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionRole {
    /// Receives the replay and then live broadcasts
    Viewer,
    /// Pushes its own recognition events
    Sender,
    /// Pushes compressed audio blobs for server-side recognition
    AudioSender,
}

impl FromStr for ConnectionRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viewer" => Ok(Self::Viewer),
            "sender" => Ok(Self::Sender),
            "audio_sender" => Ok(Self::AudioSender),
            _ => Err("role must be viewer, sender, or audio_sender".to_string()),
        }
    }
}

impl ConnectionRole {
    fn handler(self, state: &AppState) -> Box<dyn RoleHandler> {
        match self {
            Self::Viewer => Box::new(ViewerRole {
                hub: state.hub.clone(),
            }),
            Self::Sender => Box::new(SenderRole {
                ingest: state.sender.clone(),
            }),
            Self::AudioSender => Box::new(AudioSenderRole {
                ingest: state.audio_push.clone(),
            }),
        }
    }
}

/// Per-role connection contract. `serve` owns the socket until it closes.
#[async_trait]
pub trait RoleHandler: Send {
    async fn serve(self: Box<Self>, socket: WebSocket);
}

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub role: Option<String>,
}

/// GET /ws?role=viewer|sender|audio_sender
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Response {
    let role = match params.role.as_deref().unwrap_or("viewer").parse::<ConnectionRole>() {
        Ok(role) => role,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let handler = role.handler(&state);
    ws.max_message_size(state.max_message_bytes)
        .on_upgrade(move |socket| handler.serve(socket))
}

// ============================================================================
// Roles
// ============================================================================

struct ViewerRole {
    hub: crate::hub::BroadcastHub,
}

#[async_trait]
impl RoleHandler for ViewerRole {
    async fn serve(self: Box<Self>, mut socket: WebSocket) {
        let mut viewer = self.hub.register().await;
        let id = viewer.id();

        loop {
            tokio::select! {
                frame = viewer.recv() => {
                    let Some(frame) = frame else {
                        debug!(viewer = %id, "Hub dropped viewer");
                        break;
                    };
                    if socket.send(Message::Text(frame.json.to_string())).await.is_err() {
                        break; // Client disconnected
                    }
                }
                msg = socket.recv() => {
                    match msg {
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        _ => {} // Viewers send nothing upstream
                    }
                }
            }
        }

        self.hub.unregister(id).await;
    }
}

struct SenderRole {
    ingest: SenderIngest,
}

#[async_trait]
impl RoleHandler for SenderRole {
    async fn serve(self: Box<Self>, mut socket: WebSocket) {
        info!("Sender connected");

        while let Some(msg) = socket.recv().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(e) = self.ingest.handle_text(&text).await {
                        let reply = serde_json::json!({ "error": e.to_string() }).to_string();
                        if socket.send(Message::Text(reply)).await.is_err() {
                            break;
                        }
                    }
                }
                Ok(Message::Close(_)) | Err(_) => break,
                _ => {}
            }
        }

        info!("Sender disconnected");
    }
}

struct AudioSenderRole {
    ingest: AudioPushIngest,
}

#[async_trait]
impl RoleHandler for AudioSenderRole {
    async fn serve(self: Box<Self>, mut socket: WebSocket) {
        let connection = self.ingest.connection();
        info!(connection = %connection.id(), "Audio sender connected");

        while let Some(msg) = socket.recv().await {
            match msg {
                Ok(Message::Binary(blob)) => {
                    connection.handle_blob(&blob).await;
                }
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    warn!(connection = %connection.id(), "Audio sender socket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    }
}
