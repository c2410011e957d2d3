mod connection;
mod error;
mod peer;
mod room;
mod signaling;

pub use connection::ConnectionId;
pub use error::{ErrorCode, SignalError};
pub use peer::PeerId;
pub use room::RoomId;
pub use signaling::{
    CallEndReason, ClientMessage, ClientMessageKind, IceServerConfig, ServerMessage, SignalKind,
    SignalMessage,
};
