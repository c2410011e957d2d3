use switchboard_core::{ClientMessage, ErrorCode, ServerMessage, SignalError};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestPeer;

#[tokio::test]
async fn test_full_room_rejects_third_peer() {
    init_tracing();

    let service = create_test_service();
    let mut alice = TestPeer::connect(&service, "alice").await.expect("Connect failed");
    let mut bob = TestPeer::connect(&service, "bob").await.expect("Connect failed");
    let mut carol = TestPeer::connect(&service, "carol").await.expect("Connect failed");

    let room_id = alice.create_room().await.expect("Create failed");
    bob.join(room_id).await.expect("Join failed");
    alice.recv().await.expect("No peer-joined");

    let err = carol
        .send(ClientMessage::join(room_id))
        .await
        .expect_err("Third peer should be refused");
    assert_eq!(err, SignalError::RoomFull(room_id));

    match carol.recv_rejection().await.expect("No rejection") {
        ServerMessage::Rejected { code, room_id: r, .. } => {
            assert_eq!(code, ErrorCode::RoomFull);
            assert_eq!(r, Some(room_id));
        }
        _ => unreachable!(),
    }

    assert_eq!(carol.current_room(), None);
    alice.expect_silence().await.expect("Alice should hear nothing");
    bob.expect_silence().await.expect("Bob should hear nothing");
    assert_eq!(
        service.rooms().participants(room_id).await.expect("Room gone"),
        vec![alice.peer_id.clone(), bob.peer_id.clone()]
    );
}
