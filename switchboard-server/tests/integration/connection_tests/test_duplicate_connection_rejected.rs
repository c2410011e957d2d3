use switchboard_core::{PeerId, SignalError};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestPeer;

#[tokio::test]
async fn test_duplicate_connection_rejected() {
    init_tracing();

    let service = create_test_service();
    let mut alice = TestPeer::connect(&service, "alice")
        .await
        .expect("Failed to connect alice");

    let err = service
        .connect(PeerId::from("alice"))
        .await
        .expect_err("Second connection should be refused");
    assert_eq!(err, SignalError::DuplicateConnection(PeerId::from("alice")));

    assert_eq!(service.stats().connections, 1);
    alice
        .create_room()
        .await
        .expect("Original connection should still work");
}
