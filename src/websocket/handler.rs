use std::sync::Arc;
use axum::{
    extract::{Query, State, ws::{Message, WebSocket, WebSocketUpgrade}},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use futures_util::{StreamExt, SinkExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, error, warn};
use uuid::Uuid;

use crate::models::{CommandKind, ErrorResponse, Identity, ReceivedMessage};
use crate::services::auth_service::get_auth_token;
use crate::state::AppState;
use crate::ws::room::{Room, OUTBOX_CAPACITY};
use super::leave_guard::LeaveGuard;
use super::msg_command_handler::handle_command_message;
use super::msg_ping_handler::handle_ping_message;
use super::msg_presence_handler::{handle_cursor_message, handle_selection_message};
use super::msg_status_handler::{handle_status_message, handle_watching_message};

#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// WebSocket handler. Authentication happens before the upgrade so a refused
/// operator gets a plain 401.
pub async fn websocket_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<ConnectParams>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let connection_id = Uuid::new_v4();
    info!("New WebSocket connection attempt {}", connection_id);

    let token = get_auth_token(&headers, params.token.as_deref()).ok();
    let identity = match app_state.resolver.resolve(token.as_deref()).await {
        Some(identity) => identity,
        None if app_state.config.is_production() => {
            warn!("Refusing connection {}: no valid session", connection_id);
            return ErrorResponse::reply(StatusCode::UNAUTHORIZED, "Valid session required").into_response();
        }
        None => {
            let identity = Identity::anonymous(connection_id);
            debug!("No session on connection {}, continuing as {}", connection_id, identity.id);
            identity
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, connection_id, identity, app_state))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, connection_id: Uuid, identity: Identity, app_state: Arc<AppState>) {
    let room = app_state.room.clone();

    // Split the socket into sender and receiver
    let (mut sender, mut receiver) = socket.split();
    let (outbox, mut inbox) = mpsc::channel::<String>(OUTBOX_CAPACITY);

    room.join(connection_id, identity, outbox, Utc::now());
    // Runs on every exit path, including this future being dropped at shutdown
    let _leave = LeaveGuard::new(room.clone(), connection_id);

    // Drain everything the room queued for this connection into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = inbox.recv().await {
            if sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    // Messages from one connection are handled strictly in arrival order
    let recv_room = room.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => dispatch_message(&text, connection_id, &recv_room),
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    debug!("WebSocket error on connection {}: {}", connection_id, e);
                    break;
                }
            }
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };
    info!("WebSocket connection {} terminated", connection_id);
}

/// Parse one text frame and route it to its handler.
pub fn dispatch_message(text: &str, connection_id: Uuid, room: &Room) {
    let json_msg: ReceivedMessage = match serde_json::from_str(text) {
        Ok(json_msg) => json_msg,
        Err(e) => {
            error!("Failed to parse message from connection {}: {}", connection_id, e);
            return;
        }
    };

    match json_msg {
        ReceivedMessage::CursorMove(cursor) => handle_cursor_message(cursor, connection_id, room),
        ReceivedMessage::Selection(selection) => handle_selection_message(selection, connection_id, room),
        ReceivedMessage::Watching(watching) => handle_watching_message(watching, connection_id, room),
        ReceivedMessage::StatusChange(status) => handle_status_message(status, connection_id, room),
        ReceivedMessage::CommandSling(cmd) => handle_command_message(CommandKind::Sling, cmd, connection_id, room),
        ReceivedMessage::CommandMail(cmd) => handle_command_message(CommandKind::Mail, cmd, connection_id, room),
        ReceivedMessage::CommandStop(cmd) => handle_command_message(CommandKind::Stop, cmd, connection_id, room),
        ReceivedMessage::Ping => handle_ping_message(connection_id, room),
    }
}
