use switchboard_core::ServerMessage;

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestPeer;

#[tokio::test]
async fn test_switching_rooms() {
    init_tracing();

    let service = create_test_service();
    let mut alice = TestPeer::connect(&service, "alice").await.expect("Connect failed");
    let mut bob = TestPeer::connect(&service, "bob").await.expect("Connect failed");
    let mut carol = TestPeer::connect(&service, "carol").await.expect("Connect failed");

    let first = alice.create_room().await.expect("Create failed");
    bob.join(first).await.expect("Join failed");
    alice.recv().await.expect("No peer-joined");

    let second = carol.create_room().await.expect("Create failed");
    let participants = bob.join(second).await.expect("Join failed");
    assert_eq!(participants, vec![carol.peer_id.clone(), bob.peer_id.clone()]);

    assert_eq!(
        carol.recv().await.expect("No peer-joined"),
        ServerMessage::PeerJoined {
            room_id: second,
            peer_id: bob.peer_id.clone(),
        }
    );
    assert_eq!(
        alice.recv().await.expect("No peer-left"),
        ServerMessage::PeerLeft {
            room_id: first,
            peer_id: bob.peer_id.clone(),
        }
    );

    assert_eq!(bob.current_room(), Some(second));
    assert_eq!(
        service.rooms().participants(first).await.expect("Room gone"),
        vec![alice.peer_id.clone()]
    );
}
