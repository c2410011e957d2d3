use serde_json::Value;
use switchboard_core::{ConnectionId, PeerId, SignalError, SignalMessage};
use tokio::sync::oneshot;

pub type Reply<T> = oneshot::Sender<Result<T, SignalError>>;

/// Why a participant is leaving.
#[derive(Debug, Clone, PartialEq)]
pub enum LeaveReason {
    /// Explicit `leave`: the others get `peer-left`.
    Left,
    /// Client hangup or lost connection: the others get `hangup`.
    Hangup(Value),
}

/// Commands processed one at a time by a room's event loop.
#[derive(Debug)]
pub enum RoomCommand {
    Join {
        peer_id: PeerId,
        connection_id: ConnectionId,
        reply: Reply<Vec<PeerId>>,
    },

    /// Only removes the participant if it is still held by `connection_id`.
    Leave {
        peer_id: PeerId,
        connection_id: ConnectionId,
        reason: LeaveReason,
        reply: Reply<()>,
    },

    Relay {
        signal: SignalMessage,
        reply: Reply<usize>,
    },

    Participants {
        reply: Reply<Vec<PeerId>>,
    },
}

impl RoomCommand {
    /// Answers the command without running it, used when the room is gone.
    pub(crate) fn reject(self, err: SignalError) {
        match self {
            Self::Join { reply, .. } => {
                let _ = reply.send(Err(err));
            }
            Self::Leave { reply, .. } => {
                let _ = reply.send(Err(err));
            }
            Self::Relay { reply, .. } => {
                let _ = reply.send(Err(err));
            }
            Self::Participants { reply } => {
                let _ = reply.send(Err(err));
            }
        }
    }
}
