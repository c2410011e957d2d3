use std::time::Duration;

use switchboard_core::{ServerMessage, SignalKind};

/// Timeout for a single expected message (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 2000;

/// How long to listen before concluding nothing else is coming (ms).
pub const SILENCE_WINDOW_MS: u64 = 100;

pub fn signal_timeout() -> Duration {
    Duration::from_millis(SIGNAL_TIMEOUT_MS)
}

pub fn silence_window() -> Duration {
    Duration::from_millis(SILENCE_WINDOW_MS)
}

/// The relayed signal kind carried by a server message, if any.
pub fn signal_kind_of(msg: &ServerMessage) -> Option<SignalKind> {
    match msg {
        ServerMessage::Offer { .. } => Some(SignalKind::Offer),
        ServerMessage::Answer { .. } => Some(SignalKind::Answer),
        ServerMessage::IceCandidate { .. } => Some(SignalKind::IceCandidate),
        ServerMessage::Hangup { .. } => Some(SignalKind::Hangup),
        _ => None,
    }
}

/// Payload of a relayed signal.
pub fn payload_of(msg: &ServerMessage) -> Option<&serde_json::Value> {
    match msg {
        ServerMessage::Offer { payload, .. }
        | ServerMessage::Answer { payload, .. }
        | ServerMessage::IceCandidate { payload, .. }
        | ServerMessage::Hangup { payload, .. } => Some(payload),
        _ => None,
    }
}
