use tracing::{debug, error};
use uuid::Uuid;
use chrono::Utc;
use crate::models::{PongMessage, SendMessage};
use crate::ws::room::Room;

/// Handle PingMessage
pub fn handle_ping_message(connection_id: Uuid, room: &Room) {
    debug!("Ping message received from connection {}", connection_id);

    // Reply with pong
    let pong = SendMessage::Pong(PongMessage { date: Utc::now().to_rfc3339() });
    if !room.reply(connection_id, &pong) {
        error!("Failed to send Pong message to connection {}", connection_id);
    }
}
