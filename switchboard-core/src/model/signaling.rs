use crate::model::error::{ErrorCode, SignalError};
use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// Kinds of messages that are relayed between peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
    Hangup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientMessageKind {
    Create,
    Join,
    Leave,
    Offer,
    Answer,
    IceCandidate,
    Hangup,
}

impl ClientMessageKind {
    pub fn signal_kind(self) -> Option<SignalKind> {
        match self {
            Self::Offer => Some(SignalKind::Offer),
            Self::Answer => Some(SignalKind::Answer),
            Self::IceCandidate => Some(SignalKind::IceCandidate),
            Self::Hangup => Some(SignalKind::Hangup),
            Self::Create | Self::Join | Self::Leave => None,
        }
    }
}

/// Frame sent by a client over the signaling socket.
///
/// `from` is accepted for compatibility with browser clients that fill it in,
/// but the coordinator always overwrites it with the connection's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMessage {
    #[serde(rename = "type")]
    pub kind: ClientMessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<PeerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<PeerId>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl ClientMessage {
    pub fn new(kind: ClientMessageKind) -> Self {
        Self {
            kind,
            room_id: None,
            from: None,
            to: None,
            payload: Value::Null,
        }
    }

    pub fn create() -> Self {
        Self::new(ClientMessageKind::Create)
    }

    pub fn join(room_id: RoomId) -> Self {
        Self::new(ClientMessageKind::Join).in_room(room_id)
    }

    pub fn leave(room_id: RoomId) -> Self {
        Self::new(ClientMessageKind::Leave).in_room(room_id)
    }

    pub fn in_room(mut self, room_id: RoomId) -> Self {
        self.room_id = Some(room_id);
        self
    }

    pub fn to(mut self, target: impl Into<PeerId>) -> Self {
        self.to = Some(target.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn parse(text: &str) -> Result<Self, SignalError> {
        serde_json::from_str(text).map_err(|e| SignalError::InvalidMessage(e.to_string()))
    }
}

/// A signal on its way through a room. `from` is always the authenticated
/// sender; `to == None` means every other participant.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalMessage {
    pub kind: SignalKind,
    pub room_id: RoomId,
    pub from: PeerId,
    pub to: Option<PeerId>,
    pub payload: Value,
}

impl SignalMessage {
    pub fn hangup(room_id: RoomId, from: PeerId) -> Self {
        Self {
            kind: SignalKind::Hangup,
            room_id,
            from,
            to: None,
            payload: Value::Null,
        }
    }

    pub fn to_server_message(&self) -> ServerMessage {
        let room_id = self.room_id;
        let from = self.from.clone();
        let to = self.to.clone();
        let payload = self.payload.clone();

        match self.kind {
            SignalKind::Offer => ServerMessage::Offer {
                room_id,
                from,
                to,
                payload,
            },
            SignalKind::Answer => ServerMessage::Answer {
                room_id,
                from,
                to,
                payload,
            },
            SignalKind::IceCandidate => ServerMessage::IceCandidate {
                room_id,
                from,
                to,
                payload,
            },
            SignalKind::Hangup => ServerMessage::Hangup {
                room_id,
                from,
                to,
                payload,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallEndReason {
    /// The room saw no activity for longer than the room TTL.
    Timeout,
}

/// Frame sent by the coordinator to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Welcome {
        peer_id: PeerId,
        ice_servers: Vec<IceServerConfig>,
    },
    RoomCreated {
        room_id: RoomId,
    },
    Joined {
        room_id: RoomId,
        participants: Vec<PeerId>,
    },
    Left {
        room_id: RoomId,
    },
    PeerJoined {
        room_id: RoomId,
        peer_id: PeerId,
    },
    PeerLeft {
        room_id: RoomId,
        peer_id: PeerId,
    },
    IncomingCall {
        room_id: RoomId,
        from: PeerId,
    },
    CallEnded {
        room_id: RoomId,
        reason: CallEndReason,
    },
    Offer {
        room_id: RoomId,
        from: PeerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<PeerId>,
        #[serde(default)]
        payload: Value,
    },
    Answer {
        room_id: RoomId,
        from: PeerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<PeerId>,
        #[serde(default)]
        payload: Value,
    },
    IceCandidate {
        room_id: RoomId,
        from: PeerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<PeerId>,
        #[serde(default)]
        payload: Value,
    },
    Hangup {
        room_id: RoomId,
        from: PeerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<PeerId>,
        #[serde(default)]
        payload: Value,
    },
    Rejected {
        code: ErrorCode,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
    },
}

impl ServerMessage {
    pub fn rejected(err: &SignalError, room_id: Option<RoomId>) -> Self {
        Self::Rejected {
            code: err.code(),
            message: err.to_string(),
            room_id,
        }
    }
}
