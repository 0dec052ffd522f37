use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::models::{CommandKind, CommandMessage};
use crate::ws::room::Room;

/// Handle a command announcement. The command itself runs elsewhere; the room
/// only hears about it on the feed.
pub fn handle_command_message(kind: CommandKind, command: CommandMessage, connection_id: Uuid, room: &Room) {
    info!("Command {} announced by connection {}", kind.as_str(), connection_id);
    room.relay_command(connection_id, kind, command.data, Utc::now());
}
