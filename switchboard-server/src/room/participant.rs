use switchboard_core::{ConnectionId, PeerId};

/// A room member, pinned to the registration that joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub peer_id: PeerId,
    pub connection_id: ConnectionId,
}

impl Participant {
    pub fn new(peer_id: PeerId, connection_id: ConnectionId) -> Self {
        Self {
            peer_id,
            connection_id,
        }
    }
}
