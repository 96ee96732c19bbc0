//! Real-time chat over WebSocket.
//!
//! `GET /ws/{client_id}` upgrades to a socket speaking the JSON frames of
//! [`chatbotx_session::protocol`]. Each socket gets a writer task fed by an
//! unbounded channel registered with the [`ConnectionManager`]; the reader
//! loop below parses client frames and answers through the manager.

pub mod manager;

pub use manager::{ConnectionInfo, ConnectionManager, ConnectionStats, Outbound};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use chatbotx_session::{ClientFrame, ServerFrame};
use futures::{SinkExt, StreamExt};
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::AppState;

/// Reply sent for frames that cannot be decoded.
pub const INVALID_FRAME_MESSAGE: &str = "Invalid message format";

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(client_id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, client_id, state))
}

async fn handle_socket(socket: WebSocket, client_id: String, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();
    let token = state.connections.connect(&client_id, tx);

    let writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Frame(frame) => {
                    let text = match frame.to_json() {
                        Ok(text) => text,
                        Err(e) => {
                            error!("Failed to encode frame: {}", e);
                            continue;
                        }
                    };
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    while let Some(message) = stream.next().await {
        if !state.connections.is_current(&client_id, token) {
            break;
        }
        match message {
            Ok(Message::Text(text)) => {
                state.connections.touch(&client_id);
                handle_text(&state, &client_id, text.as_str()).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => state.connections.touch(&client_id),
            Err(e) => {
                debug!(client_id = %client_id, "WebSocket error: {}", e);
                break;
            }
        }
    }

    state.connections.release(&client_id, token);
    // Dropping the registered sender lets the writer drain and stop
    let _ = writer.await;
}

async fn handle_text(state: &AppState, client_id: &str, text: &str) {
    let frame = match ClientFrame::parse(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(client_id = %client_id, "Rejected client frame: {}", e);
            state.connections.send_error(client_id, INVALID_FRAME_MESSAGE);
            return;
        }
    };

    match frame {
        ClientFrame::Message { message, metadata } => {
            respond(state, client_id, &message, &metadata).await;
        }
        ClientFrame::QuickReply { payload, .. } => {
            respond(state, client_id, &payload, &Map::new()).await;
        }
        ClientFrame::Typing { .. } => {}
        ClientFrame::JoinRoom { room } => {
            state.connections.join_room(client_id, &room);
            state
                .connections
                .send_system(client_id, &format!("Joined room {}", room), Some("info"));
        }
        ClientFrame::LeaveRoom { room } => {
            state.connections.leave_room(client_id, &room);
            state
                .connections
                .send_system(client_id, &format!("Left room {}", room), Some("info"));
        }
        ClientFrame::Ping => {
            state.connections.send_personal(client_id, ServerFrame::pong());
        }
    }
}

/// typing on, reply (or error), typing off.
async fn respond(state: &AppState, client_id: &str, message: &str, metadata: &Map<String, Value>) {
    let connections = &state.connections;
    connections.send_typing(client_id, true);

    let reply = state.respond(client_id, message, metadata).await;
    if reply.error {
        connections.send_error(client_id, &reply.text);
    } else {
        connections.send_bot_response(client_id, &reply);
    }

    connections.send_typing(client_id, false);
}
