use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

/// Machine-readable reason carried by a `rejected` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    DuplicateConnection,
    RoomFull,
    RoomNotFound,
    TargetNotFound,
    NotInRoom,
    TransportError,
    InvalidMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    #[error("{0} already has an active connection")]
    DuplicateConnection(PeerId),

    #[error("room {0} is full")]
    RoomFull(RoomId),

    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    #[error("{0} is not connected")]
    TargetNotFound(PeerId),

    #[error("{0} is not in the room")]
    NotInRoom(PeerId),

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl SignalError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateConnection(_) => ErrorCode::DuplicateConnection,
            Self::RoomFull(_) => ErrorCode::RoomFull,
            Self::RoomNotFound(_) => ErrorCode::RoomNotFound,
            Self::TargetNotFound(_) => ErrorCode::TargetNotFound,
            Self::NotInRoom(_) => ErrorCode::NotInRoom,
            Self::TransportError(_) => ErrorCode::TransportError,
            Self::InvalidMessage(_) => ErrorCode::InvalidMessage,
        }
    }

    /// Only transport failures end the session; everything else is reported
    /// back to the sender and the connection stays up.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::TransportError(_))
    }
}
