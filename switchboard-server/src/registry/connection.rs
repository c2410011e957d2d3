use switchboard_core::{ConnectionId, PeerId, RoomId, ServerMessage};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Outbound half of a client transport. The registry holds the only sender;
/// dropping it ends the client's socket writer.
pub type Transport = mpsc::UnboundedSender<ServerMessage>;

/// A live registration held by the registry.
#[derive(Debug)]
pub struct Connection {
    pub(crate) id: ConnectionId,
    pub(crate) peer_id: PeerId,
    pub(crate) transport: Transport,
    pub(crate) room: Option<RoomId>,
    pub(crate) connected_at: Instant,
    pub(crate) last_activity: Instant,
}

impl Connection {
    pub(crate) fn new(peer_id: PeerId, transport: Transport) -> Self {
        let now = Instant::now();
        Self {
            id: ConnectionId::new(),
            peer_id,
            transport,
            room: None,
            connected_at: now,
            last_activity: now,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn room(&self) -> Option<RoomId> {
        self.room
    }

    pub(crate) fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            peer_id: self.peer_id.clone(),
            room: self.room,
            connected_at: self.connected_at,
            last_activity: self.last_activity,
        }
    }
}

/// Snapshot of a connection, safe to hand out without the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    pub peer_id: PeerId,
    pub room: Option<RoomId>,
    pub connected_at: Instant,
    pub last_activity: Instant,
}
