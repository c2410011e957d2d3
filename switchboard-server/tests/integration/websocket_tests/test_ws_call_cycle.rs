use serde_json::json;
use switchboard_core::{ClientMessage, ClientMessageKind, ServerMessage};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::{WsClient, spawn_server};

#[tokio::test]
async fn test_ws_call_cycle() {
    init_tracing();

    let service = create_test_service();
    let addr = spawn_server(service.clone()).await.expect("Server failed");

    let mut alice = WsClient::connect(addr, "alice").await.expect("Connect failed");
    let mut bob = WsClient::connect(addr, "bob").await.expect("Connect failed");

    for client in [&mut alice, &mut bob] {
        match client.recv().await.expect("No welcome") {
            ServerMessage::Welcome { ice_servers, .. } => assert!(!ice_servers.is_empty()),
            other => panic!("Expected welcome, got {other:?}"),
        }
    }

    alice
        .send(&ClientMessage::create().to("bob"))
        .await
        .expect("Send failed");
    let room_id = match alice.recv().await.expect("No room-created") {
        ServerMessage::RoomCreated { room_id } => room_id,
        other => panic!("Expected room-created, got {other:?}"),
    };
    assert!(matches!(
        bob.recv().await.expect("No incoming-call"),
        ServerMessage::IncomingCall { room_id: r, .. } if r == room_id
    ));

    bob.send(&ClientMessage::join(room_id)).await.expect("Send failed");
    assert!(matches!(
        bob.recv().await.expect("No joined"),
        ServerMessage::Joined { participants, .. } if participants.len() == 2
    ));
    assert!(matches!(
        alice.recv().await.expect("No peer-joined"),
        ServerMessage::PeerJoined { .. }
    ));

    alice
        .send(
            &ClientMessage::new(ClientMessageKind::Offer)
                .in_room(room_id)
                .to("bob")
                .with_payload(json!({ "sdp": "v=0" })),
        )
        .await
        .expect("Send failed");
    match bob.recv().await.expect("No offer") {
        ServerMessage::Offer { from, payload, .. } => {
            assert_eq!(from.as_str(), "alice");
            assert_eq!(payload["sdp"], "v=0");
        }
        other => panic!("Expected offer, got {other:?}"),
    }

    bob.send(
        &ClientMessage::new(ClientMessageKind::Answer)
            .in_room(room_id)
            .to("alice")
            .with_payload(json!({ "sdp": "v=0 answer" })),
    )
    .await
    .expect("Send failed");
    assert!(matches!(
        alice.recv().await.expect("No answer"),
        ServerMessage::Answer { .. }
    ));

    alice.close().await.expect("Close failed");
    assert!(matches!(
        bob.recv().await.expect("No hangup"),
        ServerMessage::Hangup { from, .. } if from.as_str() == "alice"
    ));
    assert_eq!(service.stats().connections, 1);
}
