use async_trait::async_trait;
use switchboard_core::{ConnectionId, PeerId, ServerMessage, SignalError};

/// Outbound side of the signaling transport, as seen by rooms and the relay.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Push a message to one registration of `peer_id`. Fails with
    /// `TargetNotFound` once that registration is gone or its transport closed.
    async fn deliver(
        &self,
        peer_id: &PeerId,
        connection_id: ConnectionId,
        msg: ServerMessage,
    ) -> Result<(), SignalError>;
}
