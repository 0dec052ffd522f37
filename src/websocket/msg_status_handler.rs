use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{StatusChangeMessage, WatchingMessage};
use crate::ws::room::Room;

/// Handle WatchingMessage
pub fn handle_watching_message(watching: WatchingMessage, connection_id: Uuid, room: &Room) {
    debug!("Connection {} now watching {:?}", connection_id, watching.agent_id);
    room.watch(connection_id, watching.agent_id, Utc::now());
}

/// Handle StatusChangeMessage. Invalid values are dropped by the room.
pub fn handle_status_message(status_msg: StatusChangeMessage, connection_id: Uuid, room: &Room) {
    if room.change_status(connection_id, &status_msg.status, Utc::now()) {
        debug!("Connection {} changed status to {}", connection_id, status_msg.status);
    }
}
