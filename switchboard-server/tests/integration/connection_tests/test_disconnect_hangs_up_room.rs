use std::time::Duration;

use switchboard_core::{ServerMessage, SignalError};
use switchboard_server::DisconnectCause;

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestPeer;

#[tokio::test]
async fn test_disconnect_hangs_up_room() {
    init_tracing();

    let service = create_test_service();
    let mut alice = TestPeer::connect(&service, "alice")
        .await
        .expect("Failed to connect alice");
    let mut bob = TestPeer::connect(&service, "bob")
        .await
        .expect("Failed to connect bob");

    let room_id = alice.create_room().await.expect("Create failed");
    bob.join(room_id).await.expect("Join failed");
    alice.recv().await.expect("No peer-joined");

    assert!(alice.disconnect(DisconnectCause::Closed).await);

    match bob.recv().await.expect("No hangup") {
        ServerMessage::Hangup { from, to, .. } => {
            assert_eq!(from.as_str(), "alice");
            assert_eq!(to, None);
        }
        other => panic!("Expected hangup, got {other:?}"),
    }
    assert_eq!(bob.current_room(), Some(room_id));

    assert!(bob.disconnect(DisconnectCause::TimedOut).await);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!service.rooms().contains(room_id));
    assert_eq!(
        service.rooms().participants(room_id).await,
        Err(SignalError::RoomNotFound(room_id))
    );
    assert_eq!(service.stats().connections, 0);
    assert_eq!(service.stats().rooms, 0);
}
