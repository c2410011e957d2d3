use crate::config::LifecycleConfig;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Active,
    Idle,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectCause {
    /// The client closed the socket.
    Closed,
    /// Nothing arrived within the disconnect timeout.
    TimedOut,
    /// The socket failed mid-session.
    TransportError,
    /// A newer connection for the same identity took over.
    Replaced,
}

/// Per-connection liveness: `Active -> Idle -> Disconnected`.
///
/// Any inbound frame moves an idle connection back to `Active`. Transport
/// failures go straight to `Disconnected`. `Disconnected` is terminal.
#[derive(Debug, Clone)]
pub struct Liveness {
    state: ConnectionState,
    cause: Option<DisconnectCause>,
    last_activity: Instant,
    idle_after: Duration,
    disconnect_after: Duration,
}

impl Liveness {
    pub fn new(config: &LifecycleConfig, now: Instant) -> Self {
        Self {
            state: ConnectionState::Active,
            cause: None,
            last_activity: now,
            idle_after: config.idle_after,
            disconnect_after: config.disconnect_after.max(config.idle_after),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn cause(&self) -> Option<DisconnectCause> {
        self.cause
    }

    /// Returns the new state if the frame changed it.
    pub fn record_activity(&mut self, now: Instant) -> Option<ConnectionState> {
        if self.state == ConnectionState::Disconnected {
            return None;
        }

        self.last_activity = now;
        self.transition(ConnectionState::Active)
    }

    /// Applies the timeouts as of `now`.
    pub fn poll(&mut self, now: Instant) -> Option<ConnectionState> {
        let silent_for = now.saturating_duration_since(self.last_activity);

        match self.state {
            ConnectionState::Disconnected => None,
            _ if silent_for >= self.disconnect_after => {
                self.disconnect(DisconnectCause::TimedOut)
            }
            ConnectionState::Active if silent_for >= self.idle_after => {
                self.transition(ConnectionState::Idle)
            }
            _ => None,
        }
    }

    /// When `poll` should next be called.
    pub fn next_deadline(&self) -> Instant {
        match self.state {
            ConnectionState::Active => self.last_activity + self.idle_after,
            _ => self.last_activity + self.disconnect_after,
        }
    }

    pub fn transport_closed(&mut self) -> Option<ConnectionState> {
        self.disconnect(DisconnectCause::Closed)
    }

    pub fn transport_failed(&mut self) -> Option<ConnectionState> {
        self.disconnect(DisconnectCause::TransportError)
    }

    fn disconnect(&mut self, cause: DisconnectCause) -> Option<ConnectionState> {
        let changed = self.transition(ConnectionState::Disconnected);
        if changed.is_some() {
            self.cause = Some(cause);
        }
        changed
    }

    fn transition(&mut self, next: ConnectionState) -> Option<ConnectionState> {
        if self.state == next || self.state == ConnectionState::Disconnected {
            return None;
        }
        self.state = next;
        Some(next)
    }
}
