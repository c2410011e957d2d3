use crate::config::SignalingConfig;
use crate::registry::ConnectionRegistry;
use crate::relay::SignalRelay;
use crate::room::{LeaveReason, Participant, Reply, Room, RoomCommand, RoomSettings};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use switchboard_core::{ConnectionId, PeerId, RoomId, SignalError, SignalMessage};
use tokio::sync::{mpsc, oneshot};
use tracing::info;

/// Live rooms by id. A room removes its own entry when its loop ends.
pub type RoomDirectory = Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>;

#[derive(Clone)]
pub struct RoomManager {
    rooms: RoomDirectory,
    registry: ConnectionRegistry,
    relay: SignalRelay,
    settings: RoomSettings,
    queue_size: usize,
}

impl RoomManager {
    pub fn new(registry: ConnectionRegistry, config: &SignalingConfig) -> Self {
        let relay = SignalRelay::new(Arc::new(registry.clone()));

        Self {
            rooms: Arc::new(DashMap::new()),
            registry,
            relay,
            settings: RoomSettings {
                capacity: config.room_capacity.max(1),
                ttl: config.lifecycle.room_ttl,
            },
            queue_size: config.room_queue_size.max(1),
        }
    }

    /// Opens a room with `initiator` as its first participant.
    pub fn create_room(
        &self,
        initiator: PeerId,
        connection_id: ConnectionId,
    ) -> Result<RoomId, SignalError> {
        let room_id = RoomId::new();

        if !self.registry.assign_room(connection_id, room_id) {
            return Err(SignalError::TargetNotFound(initiator));
        }

        info!(room = %room_id, initiator = %initiator, "Creating new room");
        let (tx, rx) = mpsc::channel(self.queue_size);
        let room = Room::new(
            room_id,
            self.settings.clone(),
            Participant::new(initiator, connection_id),
            rx,
            self.relay.clone(),
            self.registry.clone(),
            self.rooms.clone(),
        );

        self.rooms.insert(room_id, tx);
        tokio::spawn(room.run());

        Ok(room_id)
    }

    /// Returns the participants in join order, including the new one.
    pub async fn join(
        &self,
        room_id: RoomId,
        peer_id: PeerId,
        connection_id: ConnectionId,
    ) -> Result<Vec<PeerId>, SignalError> {
        self.request(room_id, |reply| RoomCommand::Join {
            peer_id,
            connection_id,
            reply,
        })
        .await
    }

    pub async fn leave(
        &self,
        room_id: RoomId,
        peer_id: PeerId,
        connection_id: ConnectionId,
        reason: LeaveReason,
    ) -> Result<(), SignalError> {
        self.request(room_id, |reply| RoomCommand::Leave {
            peer_id,
            connection_id,
            reason,
            reply,
        })
        .await
    }

    /// Leaves on behalf of a connection that went away. The remaining
    /// participants get a `hangup` from it.
    pub async fn disconnect(
        &self,
        room_id: RoomId,
        peer_id: PeerId,
        connection_id: ConnectionId,
    ) -> Result<(), SignalError> {
        self.leave(room_id, peer_id, connection_id, LeaveReason::Hangup(Value::Null))
            .await
    }

    pub async fn relay(&self, signal: SignalMessage) -> Result<usize, SignalError> {
        self.request(signal.room_id, |reply| RoomCommand::Relay { signal, reply })
            .await
    }

    pub async fn participants(&self, room_id: RoomId) -> Result<Vec<PeerId>, SignalError> {
        self.request(room_id, |reply| RoomCommand::Participants { reply })
            .await
    }

    pub fn contains(&self, room_id: RoomId) -> bool {
        self.rooms.contains_key(&room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    async fn request<T>(
        &self,
        room_id: RoomId,
        command: impl FnOnce(Reply<T>) -> RoomCommand,
    ) -> Result<T, SignalError> {
        let sender = self
            .rooms
            .get(&room_id)
            .map(|entry| entry.value().clone())
            .ok_or(SignalError::RoomNotFound(room_id))?;

        let (reply, response) = oneshot::channel();
        sender
            .send(command(reply))
            .await
            .map_err(|_| SignalError::RoomNotFound(room_id))?;

        response
            .await
            .map_err(|_| SignalError::RoomNotFound(room_id))?
    }
}
