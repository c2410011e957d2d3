use crate::lifecycle::liveness::DisconnectCause;
use crate::registry::{Connection, ConnectionRegistry};
use crate::room::RoomManager;
use switchboard_core::ConnectionId;
use tracing::{debug, info};

/// Tears down connections that reached `Disconnected`.
#[derive(Clone)]
pub struct LifecycleSupervisor {
    registry: ConnectionRegistry,
    rooms: RoomManager,
}

impl LifecycleSupervisor {
    pub fn new(registry: ConnectionRegistry, rooms: RoomManager) -> Self {
        Self { registry, rooms }
    }

    /// Returns false when the connection was already cleaned up, e.g. after
    /// being replaced by a newer one.
    pub async fn disconnect(&self, id: ConnectionId, cause: DisconnectCause) -> bool {
        match self.registry.unregister(id) {
            Some(connection) => {
                self.release(connection, cause).await;
                true
            }
            None => {
                debug!(connection = %id, ?cause, "Connection already released");
                false
            }
        }
    }

    /// Drops the transport and hangs up on whoever shared its room.
    pub async fn release(&self, connection: Connection, cause: DisconnectCause) {
        let id = connection.id();
        let peer_id = connection.peer_id().clone();
        let room = connection.room();
        drop(connection);

        if let Some(room_id) = room {
            match self.rooms.disconnect(room_id, peer_id.clone(), id).await {
                Ok(()) => info!(room = %room_id, peer = %peer_id, "Hung up on disconnect"),
                Err(e) => debug!(room = %room_id, peer = %peer_id, "No hangup needed: {}", e),
            }
        }

        info!(peer = %peer_id, ?cause, "Connection closed");
    }
}
