//! The shared operator room.
//!
//! One `Room` exists per process. It owns every operator session together with the
//! outbox of the connection that created it, and fans state changes out to the
//! other connections. All mutation happens under a single mutex; sends never block
//! because outboxes are bounded channels filled with `try_send`. A connection whose
//! writer falls `OUTBOX_CAPACITY` frames behind misses broadcasts until it catches up.
//!
//! An operator id may be held by several connections at once (one per tab). Those
//! connections are siblings: they are left out of each other's roster and join
//! announcements, and `user:leave` is only sent once the last of them is gone.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc::{error::TrySendError, Sender};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::models::{
    CommandKind, Cursor, FeedEventMessage, Identity, JoinedOperator, LeaveMessage, OperatorStatus,
    PaletteColor, PresenceMessage, PublicOperator, RoomStateMessage, SendMessage, UserStatusMessage,
    UserWatchingMessage,
};
use super::operator::Operator;

/// Serialized frames queued for one connection
pub type Outbox = Sender<String>;

/// Frames a connection may have queued before further broadcasts to it are dropped
pub const OUTBOX_CAPACITY: usize = 100;

/// Which connections a message is delivered to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Audience<'a> {
    All,
    AllExcept(Uuid),
    Only(Uuid),
    /// Every connection held by a different operator id
    OtherOperators(&'a str),
}

impl Audience<'_> {
    fn includes(&self, connection_id: &Uuid, operator: &Operator) -> bool {
        match self {
            Audience::All => true,
            Audience::AllExcept(excluded) => excluded != connection_id,
            Audience::Only(target) => target == connection_id,
            Audience::OtherOperators(id) => operator.id() != *id,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoomStats {
    pub connections: u32,
    pub active: u32,
    pub away: u32,
    pub busy: u32,
    pub colors_assigned: u64,
}

struct Member {
    operator: Operator,
    outbox: Outbox,
}

#[derive(Default)]
struct RoomState {
    members: HashMap<Uuid, Member>,
    /// Number of successful joins so far, never reset
    joins: u64,
}

impl RoomState {
    fn deliver(&self, audience: Audience<'_>, message: &SendMessage) -> u32 {
        let frame = match serde_json::to_string(message) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to serialize outgoing message: {}", e);
                return 0;
            }
        };

        let mut delivered = 0;
        for (connection_id, member) in self.members.iter() {
            if !audience.includes(connection_id, &member.operator) {
                continue;
            }
            match member.outbox.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    debug!("Outbox of connection {} is full, dropping message", connection_id);
                }
                // The writer task is gone; its leave is already on the way
                Err(TrySendError::Closed(_)) => {
                    debug!("Dropping message for closed connection {}", connection_id);
                }
            }
        }
        delivered
    }
}

#[derive(Default)]
pub struct Room {
    state: Mutex<RoomState>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RoomState> {
        // A panic while holding the lock leaves the map itself consistent
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new operator. The joiner receives the roster of every other
    /// operator, then the connections of other operators are told about the joiner.
    pub fn join(&self, connection_id: Uuid, identity: Identity, outbox: Outbox, now: DateTime<Utc>) -> JoinedOperator {
        let mut state = self.state();

        let color = PaletteColor::for_join(state.joins);
        state.joins += 1;

        let operator = Operator::new(connection_id, identity, color, now);
        let joined = operator.to_joined();

        let users: Vec<PublicOperator> = state
            .members
            .values()
            .filter(|m| m.operator.id() != joined.id)
            .map(|m| m.operator.to_public())
            .collect();
        let room_state = SendMessage::RoomState(RoomStateMessage {
            users,
            self_id: joined.id.clone(),
        });

        state.members.insert(connection_id, Member { operator, outbox });
        state.deliver(Audience::Only(connection_id), &room_state);
        state.deliver(Audience::OtherOperators(joined.id.as_str()), &SendMessage::UserJoin(joined.clone()));

        info!(
            "Operator {} joined on connection {} with color {:?} ({} connected)",
            joined.id, connection_id, joined.color, state.members.len()
        );
        joined
    }

    /// Remove the operator of a closed connection. The room is told once the
    /// operator id has no connection left.
    pub fn leave(&self, connection_id: Uuid) -> Option<JoinedOperator> {
        let mut state = self.state();
        let member = state.members.remove(&connection_id)?;
        let left = member.operator.to_joined();

        let still_connected = state.members.values().any(|m| m.operator.id() == left.id);
        if still_connected {
            debug!("Operator {} still has other connections, not announcing leave", left.id);
        } else {
            state.deliver(Audience::All, &SendMessage::UserLeave(LeaveMessage { id: left.id.clone() }));
        }
        info!(
            "Operator {} left from connection {} ({} connected)",
            left.id, connection_id, state.members.len()
        );
        Some(left)
    }

    pub fn move_cursor(&self, connection_id: Uuid, cursor: Cursor, now: DateTime<Utc>) {
        let mut state = self.state();
        let Some(member) = state.members.get_mut(&connection_id) else {
            return;
        };
        member.operator.cursor = cursor;
        member.operator.last_update = now;

        let presence = SendMessage::Presence(PresenceMessage {
            user_id: member.operator.id().to_string(),
            cursor: Some(cursor),
            selection: None,
        });
        state.deliver(Audience::AllExcept(connection_id), &presence);
    }

    pub fn select(&self, connection_id: Uuid, ids: Vec<String>, now: DateTime<Utc>) {
        let mut state = self.state();
        let Some(member) = state.members.get_mut(&connection_id) else {
            return;
        };
        member.operator.selection = ids.clone();
        member.operator.last_update = now;

        let presence = SendMessage::Presence(PresenceMessage {
            user_id: member.operator.id().to_string(),
            cursor: None,
            selection: Some(ids),
        });
        state.deliver(Audience::AllExcept(connection_id), &presence);
    }

    /// The sender gets its own `user:watching` too, so all of its panels agree.
    pub fn watch(&self, connection_id: Uuid, agent_id: Option<String>, now: DateTime<Utc>) {
        let mut state = self.state();
        let Some(member) = state.members.get_mut(&connection_id) else {
            return;
        };
        member.operator.watching = agent_id.clone();
        member.operator.last_activity = now;

        let watching = SendMessage::UserWatching(UserWatchingMessage {
            user_id: member.operator.id().to_string(),
            agent_id,
        });
        state.deliver(Audience::All, &watching);
    }

    /// Apply a client status change. Returns false, without touching anything,
    /// when the value is not one a client may set.
    pub fn change_status(&self, connection_id: Uuid, raw: &str, now: DateTime<Utc>) -> bool {
        let Some(status) = OperatorStatus::from_client(raw) else {
            debug!("Ignoring invalid status {:?} from connection {}", raw, connection_id);
            return false;
        };

        let mut state = self.state();
        let Some(member) = state.members.get_mut(&connection_id) else {
            return false;
        };
        member.operator.status = status;
        member.operator.last_activity = now;

        let update = SendMessage::UserStatus(UserStatusMessage {
            user_id: member.operator.id().to_string(),
            status,
        });
        state.deliver(Audience::All, &update);
        true
    }

    /// Announce a command on the feed. Execution belongs to the command surface.
    pub fn relay_command(&self, connection_id: Uuid, command: CommandKind, data: Value, now: DateTime<Utc>) {
        let state = self.state();
        let Some(member) = state.members.get(&connection_id) else {
            return;
        };
        let feed = SendMessage::FeedEvent(FeedEventMessage {
            timestamp: now.to_rfc3339(),
            event: command.as_str().to_string(),
            user: member.operator.id().to_string(),
            data,
        });
        state.deliver(Audience::All, &feed);
    }

    /// Publish a feed event that did not originate from a connection.
    /// Returns the number of connections it was handed to.
    pub fn publish_feed(&self, event: &str, user: &str, data: Value, now: DateTime<Utc>) -> u32 {
        let state = self.state();
        let feed = SendMessage::FeedEvent(FeedEventMessage {
            timestamp: now.to_rfc3339(),
            event: event.to_string(),
            user: user.to_string(),
            data,
        });
        state.deliver(Audience::All, &feed)
    }

    /// Send a message to one connection only.
    pub fn reply(&self, connection_id: Uuid, message: &SendMessage) -> bool {
        self.state().deliver(Audience::Only(connection_id), message) > 0
    }

    /// Mark every active operator idle for longer than `threshold` as away.
    pub fn sweep_idle(&self, now: DateTime<Utc>, threshold: Duration) -> usize {
        let mut state = self.state();

        let mut updates = Vec::new();
        for member in state.members.values_mut() {
            if member.operator.is_idle(now, threshold) {
                member.operator.status = OperatorStatus::Away;
                updates.push(member.operator.id().to_string());
            }
        }

        for user_id in updates.iter() {
            info!("Operator {} is now away after inactivity", user_id);
            let update = SendMessage::UserStatus(UserStatusMessage {
                user_id: user_id.clone(),
                status: OperatorStatus::Away,
            });
            state.deliver(Audience::All, &update);
        }
        updates.len()
    }

    pub fn roster(&self) -> Vec<PublicOperator> {
        self.state().members.values().map(|m| m.operator.to_public()).collect()
    }

    pub fn len(&self) -> usize {
        self.state().members.len()
    }

    pub fn stats(&self) -> RoomStats {
        let state = self.state();
        let mut stats = RoomStats {
            connections: state.members.len() as u32,
            colors_assigned: state.joins,
            ..Default::default()
        };
        for member in state.members.values() {
            match member.operator.status {
                OperatorStatus::Active => stats.active += 1,
                OperatorStatus::Away => stats.away += 1,
                OperatorStatus::Busy => stats.busy += 1,
                OperatorStatus::Offline => {}
            }
        }
        stats
    }
}
