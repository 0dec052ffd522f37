use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Who an operator is, as resolved from the session provider
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
}

impl Identity {
    /// Identity for a connection that carried no usable credentials.
    pub fn anonymous(connection_id: Uuid) -> Self {
        let simple = connection_id.simple().to_string();
        let id = format!("anon-{}", &simple[..8]);
        Self {
            name: id.clone(),
            id,
            avatar: None,
        }
    }
}

/// The fixed display palette, assigned round-robin on join
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaletteColor {
    Red,
    Blue,
    Green,
    Orange,
    Purple,
    Cyan,
}

impl PaletteColor {
    pub const ALL: [PaletteColor; 6] = [
        PaletteColor::Red,
        PaletteColor::Blue,
        PaletteColor::Green,
        PaletteColor::Orange,
        PaletteColor::Purple,
        PaletteColor::Cyan,
    ];

    /// Color for the join with the given zero-based sequence number.
    pub fn for_join(sequence: u64) -> Self {
        Self::ALL[(sequence % Self::ALL.len() as u64) as usize]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default, ToSchema)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OperatorStatus {
    #[default]
    Active,
    Away,
    Busy,
    Offline,
}

impl OperatorStatus {
    /// Parse a status sent by a client. Only `active`, `away` and `busy` are accepted.
    pub fn from_client(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(OperatorStatus::Active),
            "away" => Some(OperatorStatus::Away),
            "busy" => Some(OperatorStatus::Busy),
            _ => None,
        }
    }
}

/// Operator fields visible to other operators
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicOperator {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub color: PaletteColor,
    pub cursor: Cursor,
    pub selection: Vec<String>,
    pub watching: Option<String>,
    pub status: OperatorStatus,
}

/// Payload announcing a newly joined operator
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JoinedOperator {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub color: PaletteColor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_after_six_joins() {
        assert_eq!(PaletteColor::for_join(0), PaletteColor::Red);
        assert_eq!(PaletteColor::for_join(5), PaletteColor::Cyan);
        assert_eq!(PaletteColor::for_join(6), PaletteColor::Red);
        assert_eq!(PaletteColor::for_join(13), PaletteColor::Blue);
    }

    #[test]
    fn client_status_rejects_unknown_and_offline() {
        assert_eq!(OperatorStatus::from_client("busy"), Some(OperatorStatus::Busy));
        assert_eq!(OperatorStatus::from_client("sleeping"), None);
        assert_eq!(OperatorStatus::from_client("offline"), None);
        assert_eq!(OperatorStatus::from_client("Active"), None);
    }

    #[test]
    fn anonymous_identity_uses_connection_prefix() {
        let conn = Uuid::parse_str("0123abcd-0000-4000-8000-000000000000").unwrap();
        let identity = Identity::anonymous(conn);
        assert_eq!(identity.id, "anon-0123abcd");
        assert_eq!(identity.name, identity.id);
        assert!(identity.avatar.is_none());
    }

    #[test]
    fn public_operator_serializes_without_internal_fields() {
        let op = PublicOperator {
            id: "alice".to_string(),
            name: "Alice".to_string(),
            avatar: None,
            color: PaletteColor::Green,
            cursor: Cursor::default(),
            selection: vec![],
            watching: None,
            status: OperatorStatus::Active,
        };
        let json = serde_json::to_value(&op).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), 8);
        assert_eq!(json["color"], "green");
        assert_eq!(json["status"], "active");
        assert!(json.get("lastActivity").is_none());
    }
}
