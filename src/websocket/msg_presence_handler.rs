use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Cursor, SelectionMessage};
use crate::ws::room::Room;

/// Handle a cursor move. Rate limiting is the client's job.
pub fn handle_cursor_message(cursor: Cursor, connection_id: Uuid, room: &Room) {
    room.move_cursor(connection_id, cursor, Utc::now());
}

/// Handle SelectionMessage
pub fn handle_selection_message(selection: SelectionMessage, connection_id: Uuid, room: &Room) {
    debug!("Selection of {} unit(s) from connection {}", selection.ids.len(), connection_id);
    room.select(connection_id, selection.ids, Utc::now());
}
