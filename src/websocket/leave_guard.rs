use std::sync::Arc;
use uuid::Uuid;

use crate::ws::room::Room;

/// Takes a connection's operator out of the room when dropped, however the
/// connection ends.
pub struct LeaveGuard {
    room: Arc<Room>,
    connection_id: Option<Uuid>,
}

impl LeaveGuard {
    pub fn new(room: Arc<Room>, connection_id: Uuid) -> Self {
        Self { room, connection_id: Some(connection_id) }
    }
}

impl Drop for LeaveGuard {
    fn drop(&mut self) {
        if let Some(connection_id) = self.connection_id.take() {
            self.room.leave(connection_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Identity, SendMessage};
    use chrono::Utc;
    use tokio::sync::mpsc::channel;
    use crate::ws::room::OUTBOX_CAPACITY;

    #[test]
    fn dropping_guard_leaves_once() {
        let room = Arc::new(Room::new());
        let (tx_a, _rx_a) = channel(OUTBOX_CAPACITY);
        let (tx_b, mut rx_b) = channel(OUTBOX_CAPACITY);
        let a = Uuid::new_v4();
        room.join(a, Identity { id: "a".into(), name: "a".into(), avatar: None }, tx_a, Utc::now());
        room.join(Uuid::new_v4(), Identity { id: "b".into(), name: "b".into(), avatar: None }, tx_b, Utc::now());
        let _room_state = rx_b.try_recv().unwrap();

        drop(LeaveGuard::new(room.clone(), a));
        // A stray second guard for the same connection must not announce again
        drop(LeaveGuard::new(room.clone(), a));

        let leaves: Vec<SendMessage> = std::iter::from_fn(|| rx_b.try_recv().ok())
            .map(|frame| serde_json::from_str(&frame).unwrap())
            .collect();
        assert_eq!(leaves.len(), 1);
        assert!(matches!(&leaves[0], SendMessage::UserLeave(leave) if leave.id == "a"));
        assert_eq!(room.len(), 1);
    }
}
