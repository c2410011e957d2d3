use std::time::Duration;
use switchboard_core::IceServerConfig;

/// What to do when an identity connects while it already has a live
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Refuse the new connection with `duplicate-connection`.
    #[default]
    Reject,
    /// Evict the old connection and keep the new one.
    Replace,
}

#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Silence after which a connection is considered idle.
    pub idle_after: Duration,
    /// Silence after which a connection is dropped.
    pub disconnect_after: Duration,
    /// A room with no membership change or relay for this long is closed.
    pub room_ttl: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            idle_after: Duration::from_secs(30),
            disconnect_after: Duration::from_secs(90),
            room_ttl: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Maximum participants per room. 2 gives direct-call semantics.
    pub room_capacity: usize,
    pub duplicate_policy: DuplicatePolicy,
    /// Sent to every client in its `welcome` message.
    pub ice_servers: Vec<IceServerConfig>,
    /// Depth of each room's command queue.
    pub room_queue_size: usize,
    pub lifecycle: LifecycleConfig,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            room_capacity: 2,
            duplicate_policy: DuplicatePolicy::default(),
            ice_servers: vec![IceServerConfig::stun("stun:stun.l.google.com:19302")],
            room_queue_size: 100,
            lifecycle: LifecycleConfig::default(),
        }
    }
}
