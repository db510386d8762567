// Wire protocol for the draft room WebSocket.
//
// Every frame is a JSON object with a `Kind` discriminator. Inbound kinds we
// do not recognise decode to `ServerMessage::Unknown` so newer servers can add
// message types without breaking older clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::draft::model::{LeagueId, ManagerId, PlayerId, TeamId};
use crate::draft::state::CommittedPick;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("frame has no string `Kind` field")]
    MissingKind,

    #[error("malformed `{kind}` payload: {source}")]
    BadPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Inbound (server -> client)
// ---------------------------------------------------------------------------

/// Presence delta for one manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(rename = "User")]
    pub user: ManagerId,
    #[serde(rename = "Active")]
    pub active: bool,
}

/// Broadcast of a pick the server has committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPayload {
    #[serde(rename = "Player")]
    pub player: PlayerId,
    #[serde(rename = "Pick")]
    pub pick: usize,
    #[serde(rename = "Team")]
    pub team: TeamId,
    /// Echo of the submitting client's request id, when the server supports it.
    #[serde(rename = "Request", default, skip_serializing_if = "Option::is_none")]
    pub request: Option<u64>,
}

impl DraftPayload {
    pub fn committed(&self) -> CommittedPick {
        CommittedPick {
            slot: self.pick,
            player: self.player,
            team: self.team,
        }
    }
}

/// Chat line relayed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPayload {
    #[serde(rename = "User")]
    pub user: ManagerId,
    #[serde(rename = "Payload")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct UsersPayload {
    #[serde(rename = "Users", default)]
    users: Option<Vec<ManagerId>>,
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Managers connected when we joined. Sent once, to the joining client.
    Users(Vec<ManagerId>),
    Status(StatusPayload),
    Draft(DraftPayload),
    Chat(ChatPayload),
    /// A kind this client does not understand.
    Unknown { kind: String },
}

impl ServerMessage {
    /// Decode one text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text).map_err(ProtocolError::InvalidJson)?;
        let kind = value
            .get("Kind")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingKind)?
            .to_string();

        fn payload<T: serde::de::DeserializeOwned>(
            kind: &str,
            value: Value,
        ) -> Result<T, ProtocolError> {
            serde_json::from_value(value).map_err(|source| ProtocolError::BadPayload {
                kind: kind.to_string(),
                source,
            })
        }

        Ok(match kind.as_str() {
            // Go marshals an empty user list as null.
            "users" => ServerMessage::Users(
                payload::<UsersPayload>(&kind, value)?
                    .users
                    .unwrap_or_default(),
            ),
            "status" => ServerMessage::Status(payload(&kind, value)?),
            "draft" => ServerMessage::Draft(payload(&kind, value)?),
            "chat" => ServerMessage::Chat(payload(&kind, value)?),
            _ => ServerMessage::Unknown { kind },
        })
    }

    pub fn kind(&self) -> &str {
        match self {
            ServerMessage::Users(_) => "users",
            ServerMessage::Status(_) => "status",
            ServerMessage::Draft(_) => "draft",
            ServerMessage::Chat(_) => "chat",
            ServerMessage::Unknown { kind } => kind,
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound (client -> server)
// ---------------------------------------------------------------------------

/// Pick submission. The server decides whether it is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickRequest {
    #[serde(rename = "Player")]
    pub player: PlayerId,
    #[serde(rename = "Pick")]
    pub pick: usize,
    #[serde(rename = "Team")]
    pub team: TeamId,
    #[serde(rename = "League")]
    pub league: LeagueId,
    #[serde(rename = "Request", default, skip_serializing_if = "Option::is_none")]
    pub request: Option<u64>,
}

/// An outbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Kind", content = "Payload", rename_all = "lowercase")]
pub enum ClientMessage {
    Message(String),
    Pick(PickRequest),
}

impl ClientMessage {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// User-facing notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A message for the user, e.g. a pick announcement or a fetch failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Notification {
            message: message.into(),
            severity,
            at: Utc::now(),
        }
    }
}
