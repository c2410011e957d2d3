use crate::config::DuplicatePolicy;
use crate::registry::connection::{Connection, ConnectionInfo, Transport};
use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use switchboard_core::{ConnectionId, PeerId, RoomId, ServerMessage, SignalError};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Result of a successful [`ConnectionRegistry::register`].
#[derive(Debug)]
pub struct Registration {
    pub id: ConnectionId,
    /// The connection this one displaced, when the policy allows replacing.
    pub evicted: Option<Connection>,
}

struct RegistryInner {
    connections: DashMap<ConnectionId, Connection>,
    by_peer: DashMap<PeerId, ConnectionId>,
    policy: DuplicatePolicy,
}

/// Live transports keyed by identity.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                connections: DashMap::new(),
                by_peer: DashMap::new(),
                policy,
            }),
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.inner.policy
    }

    pub fn register(
        &self,
        peer_id: PeerId,
        transport: Transport,
    ) -> Result<Registration, SignalError> {
        let connection = Connection::new(peer_id.clone(), transport);
        let id = connection.id;

        match self.inner.by_peer.entry(peer_id.clone()) {
            Entry::Vacant(slot) => {
                self.inner.connections.insert(id, connection);
                slot.insert(id);
                info!(peer = %peer_id, connection = %id, "Connection registered");
                Ok(Registration { id, evicted: None })
            }
            Entry::Occupied(mut slot) => {
                let previous = *slot.get();
                // A closed transport whose cleanup has not run yet never blocks a reconnect.
                let stale = self
                    .inner
                    .connections
                    .get(&previous)
                    .is_none_or(|c| c.transport.is_closed());

                if !stale && self.inner.policy == DuplicatePolicy::Reject {
                    warn!(peer = %peer_id, "Rejected duplicate connection");
                    return Err(SignalError::DuplicateConnection(peer_id));
                }

                let evicted = self.inner.connections.remove(&previous).map(|(_, c)| c);
                self.inner.connections.insert(id, connection);
                slot.insert(id);
                info!(
                    peer = %peer_id,
                    connection = %id,
                    replaced = %previous,
                    "Connection registered, previous connection evicted"
                );
                Ok(Registration { id, evicted })
            }
        }
    }

    /// Removes the connection if it is still registered. Dropping the
    /// returned value releases its transport.
    pub fn unregister(&self, id: ConnectionId) -> Option<Connection> {
        let (_, connection) = self.inner.connections.remove(&id)?;
        self.inner
            .by_peer
            .remove_if(&connection.peer_id, |_, current| *current == id);
        debug!(peer = %connection.peer_id, connection = %id, "Connection unregistered");
        Some(connection)
    }

    pub fn lookup(&self, peer_id: &PeerId) -> Option<ConnectionInfo> {
        let id = *self.inner.by_peer.get(peer_id)?;
        self.inner.connections.get(&id).map(|c| c.info())
    }

    pub fn get(&self, id: ConnectionId) -> Option<ConnectionInfo> {
        self.inner.connections.get(&id).map(|c| c.info())
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.inner.connections.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.connections.is_empty()
    }

    pub fn touch(&self, id: ConnectionId) {
        if let Some(mut connection) = self.inner.connections.get_mut(&id) {
            connection.last_activity = Instant::now();
        }
    }

    pub fn current_room(&self, id: ConnectionId) -> Option<RoomId> {
        self.inner.connections.get(&id).and_then(|c| c.room)
    }

    /// Points the connection at `room`. Returns false if it is gone.
    pub fn assign_room(&self, id: ConnectionId, room: RoomId) -> bool {
        match self.inner.connections.get_mut(&id) {
            Some(mut connection) => {
                connection.room = Some(room);
                true
            }
            None => false,
        }
    }

    /// Clears the room reference only if it still points at `room`.
    pub fn clear_room(&self, id: ConnectionId, room: RoomId) {
        if let Some(mut connection) = self.inner.connections.get_mut(&id) {
            if connection.room == Some(room) {
                connection.room = None;
            }
        }
    }

    /// Sends to a specific registration of `peer_id`.
    pub fn send(
        &self,
        peer_id: &PeerId,
        id: ConnectionId,
        msg: ServerMessage,
    ) -> Result<(), SignalError> {
        let connection = self
            .inner
            .connections
            .get(&id)
            .ok_or_else(|| SignalError::TargetNotFound(peer_id.clone()))?;

        connection
            .transport
            .send(msg)
            .map_err(|_| SignalError::TargetNotFound(peer_id.clone()))
    }

    /// Sends to whichever connection currently represents `peer_id`.
    pub fn send_to_peer(&self, peer_id: &PeerId, msg: ServerMessage) -> Result<(), SignalError> {
        let id = self
            .inner
            .by_peer
            .get(peer_id)
            .map(|entry| *entry.value())
            .ok_or_else(|| SignalError::TargetNotFound(peer_id.clone()))?;

        self.send(peer_id, id, msg)
    }
}

#[async_trait]
impl SignalingOutput for ConnectionRegistry {
    async fn deliver(
        &self,
        peer_id: &PeerId,
        connection_id: ConnectionId,
        msg: ServerMessage,
    ) -> Result<(), SignalError> {
        self.send(peer_id, connection_id, msg)
    }
}
