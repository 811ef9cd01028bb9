//! Wire protocol types for maw multiplayer sessions.
//!
//! Every frame on the wire is one [`WireMessage`]: the sender's peer id
//! plus a tagged payload. There are exactly two payload kinds, lobby
//! state and player state, and each receiver simply overwrites what it
//! knew with whatever arrives most recently. Delivery is at-most-once,
//! unordered across peers, and unacknowledged; within one connection,
//! stream order is preserved.

use serde::{Deserialize, Serialize};

use maw_types::{PeerId, PlayerSnapshot};

/// Lobby state as exchanged between peers.
///
/// One authoritative copy lives on the host; clients mirror it and send
/// their own view back as a presence/readiness announcement. The
/// `host_ready` field carries the *sender's* ready flag, and only the
/// host fills `host_address`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LobbyState {
    #[serde(rename = "player_count")]
    pub participant_count: u32,
    #[serde(rename = "game_started")]
    pub match_started: bool,
    pub host_ready: bool,
    #[serde(
        rename = "server_ip",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub host_address: Option<String>,
}

/// Kind-specific payload of a wire message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MessageBody {
    LobbyUpdate(LobbyState),
    PlayerUpdate(PlayerSnapshot),
}

/// One framed message: who sent it plus a tagged payload.
///
/// Serializes as `{"type": ..., "player_id": ..., "data": {...}}`.
/// Unknown fields are ignored on decode (forward compatible); an unknown
/// `type` is a decode failure, which closes the producing connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(rename = "player_id")]
    pub sender: PeerId,
    #[serde(flatten)]
    pub body: MessageBody,
}

impl WireMessage {
    pub fn lobby_update(sender: PeerId, state: LobbyState) -> Self {
        Self {
            sender,
            body: MessageBody::LobbyUpdate(state),
        }
    }

    pub fn player_update(sender: PeerId, snapshot: PlayerSnapshot) -> Self {
        Self {
            sender,
            body: MessageBody::PlayerUpdate(snapshot),
        }
    }
}
