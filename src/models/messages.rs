use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::models::{Cursor, JoinedOperator, OperatorStatus, PublicOperator};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SelectionMessage {
    pub ids: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchingMessage {
    #[serde(default)]
    pub agent_id: Option<String>,
}

/// Status is kept as the raw string so unknown values can be dropped quietly
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatusChangeMessage {
    pub status: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CommandMessage {
    #[serde(default)]
    pub data: Value,
}

/// Commands an operator can announce to the room
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Sling,
    Mail,
    Stop,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Sling => "sling",
            CommandKind::Mail => "mail",
            CommandKind::Stop => "stop",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ReceivedMessage {
    #[serde(rename = "cursor:move")]
    CursorMove(Cursor),
    #[serde(rename = "selection")]
    Selection(SelectionMessage),
    #[serde(rename = "watching")]
    Watching(WatchingMessage),
    #[serde(rename = "status:change")]
    StatusChange(StatusChangeMessage),
    #[serde(rename = "command:sling")]
    CommandSling(CommandMessage),
    #[serde(rename = "command:mail")]
    CommandMail(CommandMessage),
    #[serde(rename = "command:stop")]
    CommandStop(CommandMessage),
    #[serde(rename = "ping")]
    Ping,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomStateMessage {
    pub users: Vec<PublicOperator>,
    pub self_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LeaveMessage {
    pub id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresenceMessage {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserWatchingMessage {
    pub user_id: String,
    pub agent_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusMessage {
    pub user_id: String,
    pub status: OperatorStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FeedEventMessage {
    pub timestamp: String,
    pub event: String,
    pub user: String,
    pub data: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PongMessage {
    pub date: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum SendMessage {
    #[serde(rename = "room:state")]
    RoomState(RoomStateMessage),
    #[serde(rename = "user:join")]
    UserJoin(JoinedOperator),
    #[serde(rename = "user:leave")]
    UserLeave(LeaveMessage),
    #[serde(rename = "presence")]
    Presence(PresenceMessage),
    #[serde(rename = "user:watching")]
    UserWatching(UserWatchingMessage),
    #[serde(rename = "user:status")]
    UserStatus(UserStatusMessage),
    #[serde(rename = "feed:event")]
    FeedEvent(FeedEventMessage),
    #[serde(rename = "pong")]
    Pong(PongMessage),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_client_frames() {
        let msg: ReceivedMessage = serde_json::from_str(r#"{"type":"cursor:move","x":10,"y":20.5}"#).unwrap();
        assert_eq!(msg, ReceivedMessage::CursorMove(Cursor { x: 10.0, y: 20.5 }));

        let msg: ReceivedMessage = serde_json::from_str(r#"{"type":"watching","agentId":null}"#).unwrap();
        assert_eq!(msg, ReceivedMessage::Watching(WatchingMessage { agent_id: None }));

        let msg: ReceivedMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(msg, ReceivedMessage::Ping);
    }

    #[test]
    fn command_data_defaults_to_null() {
        let msg: ReceivedMessage = serde_json::from_str(r#"{"type":"command:stop"}"#).unwrap();
        assert_eq!(msg, ReceivedMessage::CommandStop(CommandMessage { data: Value::Null }));

        let msg: ReceivedMessage =
            serde_json::from_str(r#"{"type":"command:sling","data":{"issue":"gt-12","rig":"alpha"}}"#).unwrap();
        match msg {
            ReceivedMessage::CommandSling(cmd) => assert_eq!(cmd.data["rig"], "alpha"),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_str::<ReceivedMessage>(r#"{"type":"command:launch"}"#).is_err());
        assert!(serde_json::from_str::<ReceivedMessage>(r#"{"x":1,"y":2}"#).is_err());
    }

    #[test]
    fn presence_omits_absent_fields() {
        let msg = SendMessage::Presence(PresenceMessage {
            user_id: "alice".to_string(),
            cursor: Some(Cursor { x: 1.0, y: 2.0 }),
            selection: None,
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, json!({"type": "presence", "userId": "alice", "cursor": {"x": 1.0, "y": 2.0}}));
    }

    #[test]
    fn watching_event_keeps_null_target() {
        let msg = SendMessage::UserWatching(UserWatchingMessage {
            user_id: "bob".to_string(),
            agent_id: None,
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, json!({"type": "user:watching", "userId": "bob", "agentId": null}));
    }
}
