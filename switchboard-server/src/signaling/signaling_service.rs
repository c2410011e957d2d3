use crate::config::SignalingConfig;
use crate::lifecycle::{DisconnectCause, LifecycleSupervisor};
use crate::registry::ConnectionRegistry;
use crate::room::{LeaveReason, RoomManager};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use switchboard_core::{
    ClientMessage, ClientMessageKind, ConnectionId, IceServerConfig, PeerId, RoomId,
    ServerMessage, SignalError, SignalMessage,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Identifies the connection a message came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub peer_id: PeerId,
}

/// A freshly registered connection: its handle plus the queue of messages
/// the transport has to write out.
#[derive(Debug)]
pub struct Session {
    handle: ConnectionHandle,
    outbound: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Session {
    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.outbound.recv().await
    }

    pub fn into_parts(self) -> (ConnectionHandle, mpsc::UnboundedReceiver<ServerMessage>) {
        (self.handle, self.outbound)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub status: &'static str,
    pub connections: usize,
    pub rooms: usize,
}

struct SignalingInner {
    registry: ConnectionRegistry,
    rooms: RoomManager,
    supervisor: LifecycleSupervisor,
    config: SignalingConfig,
}

/// Entry point for the transport layer. Cheap to clone; every clone shares
/// the same registry and rooms.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(config: SignalingConfig) -> Self {
        let registry = ConnectionRegistry::new(config.duplicate_policy);
        let rooms = RoomManager::new(registry.clone(), &config);
        let supervisor = LifecycleSupervisor::new(registry.clone(), rooms.clone());

        Self {
            inner: Arc::new(SignalingInner {
                registry,
                rooms,
                supervisor,
                config,
            }),
        }
    }

    pub fn config(&self) -> &SignalingConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.inner.registry
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.inner.rooms
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.config.ice_servers.clone()
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            status: "ok",
            connections: self.inner.registry.len(),
            rooms: self.inner.rooms.room_count(),
        }
    }

    /// Registers a transport for an already authenticated identity and
    /// queues its `welcome`.
    pub async fn connect(&self, peer_id: PeerId) -> Result<Session, SignalError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let registration = self.inner.registry.register(peer_id.clone(), tx)?;

        if let Some(evicted) = registration.evicted {
            let notice = SignalError::DuplicateConnection(peer_id.clone());
            let _ = evicted
                .transport
                .send(ServerMessage::rejected(&notice, evicted.room()));
            self.inner
                .supervisor
                .release(evicted, DisconnectCause::Replaced)
                .await;
        }

        let handle = ConnectionHandle {
            id: registration.id,
            peer_id: peer_id.clone(),
        };

        let _ = self.send(
            &handle,
            ServerMessage::Welcome {
                peer_id,
                ice_servers: self.get_ice_servers(),
            },
        );

        Ok(Session {
            handle,
            outbound: rx,
        })
    }

    /// Handles one client message. Failures are also reported to the sender
    /// as a `rejected` message.
    pub async fn process(
        &self,
        conn: &ConnectionHandle,
        msg: ClientMessage,
    ) -> Result<(), SignalError> {
        let room_id = msg.room_id;
        let kind = msg.kind;
        let result = self.dispatch(conn, msg).await;

        if let Err(e) = &result {
            warn!(peer = %conn.peer_id, ?kind, "Rejected: {}", e);
            self.reject(conn, e, room_id);

            if e.is_fatal() {
                self.disconnect(conn, DisconnectCause::TransportError).await;
            }
        }

        result
    }

    pub fn reject(&self, conn: &ConnectionHandle, err: &SignalError, room_id: Option<RoomId>) {
        let _ = self.send(conn, ServerMessage::rejected(err, room_id));
    }

    pub fn touch(&self, conn: &ConnectionHandle) {
        self.inner.registry.touch(conn.id);
    }

    pub async fn disconnect(&self, conn: &ConnectionHandle, cause: DisconnectCause) -> bool {
        self.inner.supervisor.disconnect(conn.id, cause).await
    }

    pub fn current_room(&self, conn: &ConnectionHandle) -> Option<RoomId> {
        self.inner.registry.current_room(conn.id)
    }

    fn send(&self, conn: &ConnectionHandle, msg: ServerMessage) -> Result<(), SignalError> {
        self.inner.registry.send(&conn.peer_id, conn.id, msg)
    }

    async fn dispatch(
        &self,
        conn: &ConnectionHandle,
        msg: ClientMessage,
    ) -> Result<(), SignalError> {
        match msg.kind {
            ClientMessageKind::Create => self.create_room(conn, msg.to).await,
            ClientMessageKind::Join => {
                let room_id = msg
                    .room_id
                    .ok_or_else(|| SignalError::InvalidMessage("join requires roomId".into()))?;
                self.join_room(conn, room_id).await
            }
            ClientMessageKind::Leave => self.leave_room(conn, msg.room_id).await,
            ClientMessageKind::Hangup => self.hang_up(conn, msg.room_id, msg.payload).await,
            ClientMessageKind::Offer | ClientMessageKind::Answer | ClientMessageKind::IceCandidate => {
                self.relay_signal(conn, msg).await
            }
        }
    }

    async fn create_room(
        &self,
        conn: &ConnectionHandle,
        callee: Option<PeerId>,
    ) -> Result<(), SignalError> {
        let previous = self.current_room(conn);
        let room_id = self.inner.rooms.create_room(conn.peer_id.clone(), conn.id)?;

        let _ = self.send(conn, ServerMessage::RoomCreated { room_id });
        self.leave_previous(conn, previous).await;

        if let Some(callee) = callee {
            self.inner.registry.send_to_peer(
                &callee,
                ServerMessage::IncomingCall {
                    room_id,
                    from: conn.peer_id.clone(),
                },
            )?;
            info!(room = %room_id, from = %conn.peer_id, to = %callee, "Incoming call sent");
        }

        Ok(())
    }

    async fn join_room(&self, conn: &ConnectionHandle, room_id: RoomId) -> Result<(), SignalError> {
        let previous = self.current_room(conn);
        let participants = self
            .inner
            .rooms
            .join(room_id, conn.peer_id.clone(), conn.id)
            .await?;

        let _ = self.send(
            conn,
            ServerMessage::Joined {
                room_id,
                participants,
            },
        );

        if previous != Some(room_id) {
            self.leave_previous(conn, previous).await;
        }

        Ok(())
    }

    async fn leave_room(
        &self,
        conn: &ConnectionHandle,
        requested: Option<RoomId>,
    ) -> Result<(), SignalError> {
        let room_id = self.own_room(conn, requested)?;
        self.exit_room(conn, room_id, LeaveReason::Left).await
    }

    async fn hang_up(
        &self,
        conn: &ConnectionHandle,
        requested: Option<RoomId>,
        payload: Value,
    ) -> Result<(), SignalError> {
        let room_id = self.own_room(conn, requested)?;
        self.exit_room(conn, room_id, LeaveReason::Hangup(payload)).await
    }

    async fn relay_signal(
        &self,
        conn: &ConnectionHandle,
        msg: ClientMessage,
    ) -> Result<(), SignalError> {
        let kind = msg
            .kind
            .signal_kind()
            .ok_or_else(|| SignalError::InvalidMessage(format!("{:?} is not a signal", msg.kind)))?;
        let room_id = msg
            .room_id
            .or_else(|| self.current_room(conn))
            .ok_or_else(|| SignalError::NotInRoom(conn.peer_id.clone()))?;

        let signal = SignalMessage {
            kind,
            room_id,
            from: conn.peer_id.clone(),
            to: msg.to,
            payload: msg.payload,
        };

        self.inner.rooms.relay(signal).await?;
        Ok(())
    }

    /// The room a leave or hangup applies to. Naming a room the connection is
    /// not in is `NotInRoom`, which also makes a repeated leave harmless.
    fn own_room(
        &self,
        conn: &ConnectionHandle,
        requested: Option<RoomId>,
    ) -> Result<RoomId, SignalError> {
        let current = self.current_room(conn);

        match (requested, current) {
            (Some(requested), Some(current)) if requested == current => Ok(current),
            (None, Some(current)) => Ok(current),
            _ => Err(SignalError::NotInRoom(conn.peer_id.clone())),
        }
    }

    async fn exit_room(
        &self,
        conn: &ConnectionHandle,
        room_id: RoomId,
        reason: LeaveReason,
    ) -> Result<(), SignalError> {
        match self
            .inner
            .rooms
            .leave(room_id, conn.peer_id.clone(), conn.id, reason)
            .await
        {
            Ok(()) => {}
            Err(SignalError::RoomNotFound(_)) => {
                // The room expired between the lookup and the leave.
                self.inner.registry.clear_room(conn.id, room_id);
                return Err(SignalError::NotInRoom(conn.peer_id.clone()));
            }
            Err(e) => return Err(e),
        }

        let _ = self.send(conn, ServerMessage::Left { room_id });
        Ok(())
    }

    async fn leave_previous(&self, conn: &ConnectionHandle, previous: Option<RoomId>) {
        let Some(room_id) = previous else {
            return;
        };

        if let Err(e) = self
            .inner
            .rooms
            .leave(room_id, conn.peer_id.clone(), conn.id, LeaveReason::Left)
            .await
        {
            debug!(room = %room_id, peer = %conn.peer_id, "Previous room already gone: {}", e);
        }
    }
}
