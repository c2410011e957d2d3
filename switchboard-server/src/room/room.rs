use crate::registry::ConnectionRegistry;
use crate::relay::SignalRelay;
use crate::room::participant::Participant;
use crate::room::room_command::{LeaveReason, RoomCommand};
use crate::room::room_manager::RoomDirectory;
use std::time::Duration;
use switchboard_core::{
    CallEndReason, ConnectionId, PeerId, RoomId, ServerMessage, SignalError, SignalMessage,
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct RoomSettings {
    pub capacity: usize,
    pub ttl: Duration,
}

enum Flow {
    Continue,
    Close,
}

/// Event loop owning one room's membership. Every join, leave and relay for
/// the room goes through `command_rx`, so they never race each other.
pub struct Room {
    id: RoomId,
    settings: RoomSettings,
    participants: Vec<Participant>,
    command_rx: mpsc::Receiver<RoomCommand>,
    relay: SignalRelay,
    registry: ConnectionRegistry,
    directory: RoomDirectory,
    created_at: Instant,
    last_activity: Instant,
}

impl Room {
    pub(crate) fn new(
        id: RoomId,
        settings: RoomSettings,
        initiator: Participant,
        command_rx: mpsc::Receiver<RoomCommand>,
        relay: SignalRelay,
        registry: ConnectionRegistry,
        directory: RoomDirectory,
    ) -> Self {
        let now = Instant::now();

        Self {
            id,
            settings,
            participants: vec![initiator],
            command_rx,
            relay,
            registry,
            directory,
            created_at: now,
            last_activity: now,
        }
    }

    pub async fn run(mut self) {
        info!(room = %self.id, "Room event loop started");

        loop {
            let expires_at = self.last_activity + self.settings.ttl;

            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => {
                            if let Flow::Close = self.handle_command(c).await {
                                break;
                            }
                        }
                        None => {
                            info!(room = %self.id, "Command channel closed. Shutting down room.");
                            break;
                        }
                    }
                }

                _ = tokio::time::sleep_until(expires_at) => {
                    // A member active on its socket keeps the room alive
                    // even when no signals pass through it.
                    let latest = self.latest_activity();
                    if latest + self.settings.ttl > Instant::now() {
                        self.last_activity = latest;
                    } else {
                        self.expire().await;
                        break;
                    }
                }
            }
        }

        self.shutdown();
        info!(
            room = %self.id,
            lifetime = ?self.created_at.elapsed(),
            "Room event loop finished"
        );
    }

    async fn handle_command(&mut self, cmd: RoomCommand) -> Flow {
        match cmd {
            RoomCommand::Join {
                peer_id,
                connection_id,
                reply,
            } => {
                let result = self.join(peer_id, connection_id).await;
                let _ = reply.send(result);
                Flow::Continue
            }

            RoomCommand::Leave {
                peer_id,
                connection_id,
                reason,
                reply,
            } => {
                let result = self.leave(&peer_id, connection_id, reason).await;
                let _ = reply.send(result);

                if self.participants.is_empty() {
                    info!(room = %self.id, "Last participant left");
                    Flow::Close
                } else {
                    Flow::Continue
                }
            }

            RoomCommand::Relay { signal, reply } => {
                let result = self.relay.relay(&self.participants, &signal).await;
                if result.is_ok() {
                    self.touch();
                }
                let _ = reply.send(result);
                Flow::Continue
            }

            RoomCommand::Participants { reply } => {
                let _ = reply.send(Ok(self.peer_ids()));
                Flow::Continue
            }
        }
    }

    async fn join(
        &mut self,
        peer_id: PeerId,
        connection_id: ConnectionId,
    ) -> Result<Vec<PeerId>, SignalError> {
        let existing = self.participants.iter().position(|p| p.peer_id == peer_id);

        if existing.is_none() && self.participants.len() >= self.settings.capacity {
            return Err(SignalError::RoomFull(self.id));
        }

        if !self.registry.assign_room(connection_id, self.id) {
            return Err(SignalError::TargetNotFound(peer_id));
        }

        if let Some(index) = existing {
            // Same identity on a newer registration; keep its place in the order.
            self.participants[index].connection_id = connection_id;
            return Ok(self.peer_ids());
        }

        let joined = ServerMessage::PeerJoined {
            room_id: self.id,
            peer_id: peer_id.clone(),
        };
        self.relay.notify(&self.participants, None, &joined).await;

        info!(room = %self.id, peer = %peer_id, "Participant joined");
        self.participants.push(Participant::new(peer_id, connection_id));
        self.touch();

        Ok(self.peer_ids())
    }

    async fn leave(
        &mut self,
        peer_id: &PeerId,
        connection_id: ConnectionId,
        reason: LeaveReason,
    ) -> Result<(), SignalError> {
        // A stale registration never removes the one that rejoined in its place.
        let index = self
            .participants
            .iter()
            .position(|p| &p.peer_id == peer_id && p.connection_id == connection_id)
            .ok_or_else(|| SignalError::NotInRoom(peer_id.clone()))?;

        let participant = self.participants.remove(index);
        self.registry.clear_room(participant.connection_id, self.id);

        let notice = match reason {
            LeaveReason::Left => ServerMessage::PeerLeft {
                room_id: self.id,
                peer_id: peer_id.clone(),
            },
            LeaveReason::Hangup(payload) => SignalMessage {
                payload,
                ..SignalMessage::hangup(self.id, peer_id.clone())
            }
            .to_server_message(),
        };
        let notified = self.relay.notify(&self.participants, None, &notice).await;

        info!(room = %self.id, peer = %peer_id, notified, "Participant left");
        self.touch();
        Ok(())
    }

    async fn expire(&mut self) {
        info!(
            room = %self.id,
            participants = self.participants.len(),
            "Room expired after inactivity"
        );

        let ended = ServerMessage::CallEnded {
            room_id: self.id,
            reason: CallEndReason::Timeout,
        };
        self.relay.notify(&self.participants, None, &ended).await;

        for participant in self.participants.drain(..) {
            self.registry.clear_room(participant.connection_id, self.id);
        }
    }

    /// Unlists the room and answers anything still queued, so no caller waits
    /// on a room that no longer exists.
    fn shutdown(&mut self) {
        self.directory.remove(&self.id);
        self.command_rx.close();

        while let Ok(cmd) = self.command_rx.try_recv() {
            debug!(room = %self.id, "Rejecting command queued after close");
            cmd.reject(SignalError::RoomNotFound(self.id));
        }
    }

    /// Most recent activity on the room itself or on any member's connection.
    fn latest_activity(&self) -> Instant {
        self.participants
            .iter()
            .filter_map(|p| self.registry.get(p.connection_id))
            .map(|info| info.last_activity)
            .fold(self.last_activity, Instant::max)
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn peer_ids(&self) -> Vec<PeerId> {
        self.participants.iter().map(|p| p.peer_id.clone()).collect()
    }
}
