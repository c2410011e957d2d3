use switchboard_core::PeerId;
use switchboard_server::DisconnectCause;

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestPeer;

#[tokio::test]
async fn test_reconnect_after_disconnect() {
    init_tracing();

    let service = create_test_service();
    let alice = TestPeer::connect(&service, "alice")
        .await
        .expect("Failed to connect alice");
    assert!(alice.disconnect(DisconnectCause::Closed).await);

    let mut alice = TestPeer::connect(&service, "alice")
        .await
        .expect("Reconnect after a clean disconnect should work");
    alice.create_room().await.expect("Create failed");
}

#[tokio::test]
async fn test_dead_transport_does_not_block_reconnect() {
    init_tracing();

    let service = create_test_service();
    let session = service
        .connect(PeerId::from("alice"))
        .await
        .expect("Failed to connect alice");

    // Transport went away without a disconnect being processed.
    drop(session);

    let alice = TestPeer::connect(&service, "alice")
        .await
        .expect("A closed transport should not count as a live connection");
    assert_eq!(service.stats().connections, 1);
    assert!(alice.disconnect(DisconnectCause::Closed).await);
}
