use std::time::Duration;

use switchboard_core::{ClientMessage, ServerMessage, SignalError};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestPeer;

#[tokio::test]
async fn test_last_leave_destroys_room() {
    init_tracing();

    let service = create_test_service();
    let mut alice = TestPeer::connect(&service, "alice").await.expect("Connect failed");
    let mut bob = TestPeer::connect(&service, "bob").await.expect("Connect failed");
    let mut carol = TestPeer::connect(&service, "carol").await.expect("Connect failed");

    let room_id = alice.create_room().await.expect("Create failed");
    bob.join(room_id).await.expect("Join failed");
    alice.recv().await.expect("No peer-joined");

    alice.send(ClientMessage::leave(room_id)).await.expect("Leave failed");
    assert_eq!(
        alice.recv().await.expect("No left"),
        ServerMessage::Left { room_id }
    );
    assert_eq!(
        bob.recv().await.expect("No peer-left"),
        ServerMessage::PeerLeft {
            room_id,
            peer_id: alice.peer_id.clone(),
        }
    );
    assert!(service.rooms().contains(room_id));

    bob.send(ClientMessage::leave(room_id)).await.expect("Leave failed");
    assert_eq!(bob.recv().await.expect("No left"), ServerMessage::Left { room_id });
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!service.rooms().contains(room_id));
    assert_eq!(alice.current_room(), None);
    assert_eq!(bob.current_room(), None);

    let err = carol
        .send(ClientMessage::join(room_id))
        .await
        .expect_err("Destroyed room cannot be joined");
    assert_eq!(err, SignalError::RoomNotFound(room_id));
}
