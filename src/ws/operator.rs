use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Cursor, Identity, JoinedOperator, OperatorStatus, PaletteColor, PublicOperator};

/// Session state for one connected browser tab.
#[derive(Clone, Debug)]
pub struct Operator {
    pub connection_id: Uuid,
    pub identity: Identity,
    pub color: PaletteColor,
    pub cursor: Cursor,
    pub selection: Vec<String>,
    pub watching: Option<String>,
    pub status: OperatorStatus,
    pub last_update: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Operator {
    pub fn new(connection_id: Uuid, identity: Identity, color: PaletteColor, now: DateTime<Utc>) -> Self {
        Self {
            connection_id,
            identity,
            color,
            cursor: Cursor::default(),
            selection: Vec::new(),
            watching: None,
            status: OperatorStatus::Active,
            last_update: now,
            last_activity: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.identity.id
    }

    /// True when active and idle for strictly longer than `threshold`.
    pub fn is_idle(&self, now: DateTime<Utc>, threshold: std::time::Duration) -> bool {
        if self.status != OperatorStatus::Active {
            return false;
        }
        // A clock that went backwards yields a negative span, which never counts as idle
        match (now - self.last_activity).to_std() {
            Ok(idle) => idle > threshold,
            Err(_) => false,
        }
    }

    pub fn to_public(&self) -> PublicOperator {
        PublicOperator {
            id: self.identity.id.clone(),
            name: self.identity.name.clone(),
            avatar: self.identity.avatar.clone(),
            color: self.color,
            cursor: self.cursor,
            selection: self.selection.clone(),
            watching: self.watching.clone(),
            status: self.status,
        }
    }

    pub fn to_joined(&self) -> JoinedOperator {
        JoinedOperator {
            id: self.identity.id.clone(),
            name: self.identity.name.clone(),
            avatar: self.identity.avatar.clone(),
            color: self.color,
        }
    }
}
