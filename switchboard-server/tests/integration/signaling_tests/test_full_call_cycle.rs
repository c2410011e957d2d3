use std::time::Duration;

use serde_json::json;
use switchboard_core::{ClientMessage, ClientMessageKind, ServerMessage, SignalKind};
use switchboard_server::DisconnectCause;

use crate::integration::{create_test_service, init_tracing};
use crate::utils::{TestPeer, payload_of, signal_kind_of};

#[tokio::test]
async fn test_full_call_cycle() {
    init_tracing();

    let service = create_test_service();
    let mut alice = TestPeer::connect(&service, "alice").await.expect("Connect failed");
    let mut bob = TestPeer::connect(&service, "bob").await.expect("Connect failed");

    alice
        .send(ClientMessage::create().to("bob"))
        .await
        .expect("Create failed");
    let room_id = match alice.recv().await.expect("No room-created") {
        ServerMessage::RoomCreated { room_id } => room_id,
        other => panic!("Expected room-created, got {other:?}"),
    };
    assert_eq!(
        bob.recv().await.expect("No incoming-call"),
        ServerMessage::IncomingCall {
            room_id,
            from: alice.peer_id.clone(),
        }
    );

    bob.join(room_id).await.expect("Join failed");
    alice.recv().await.expect("No peer-joined");

    let offer = json!({ "type": "offer", "sdp": "v=0 alice" });
    alice
        .send(
            ClientMessage::new(ClientMessageKind::Offer)
                .in_room(room_id)
                .to("bob")
                .with_payload(offer.clone()),
        )
        .await
        .expect("Offer failed");

    match bob.recv().await.expect("No offer") {
        ServerMessage::Offer {
            room_id: r,
            from,
            to,
            payload,
        } => {
            assert_eq!(r, room_id);
            assert_eq!(from, alice.peer_id);
            assert_eq!(to, Some(bob.peer_id.clone()));
            assert_eq!(payload, offer);
        }
        other => panic!("Expected offer, got {other:?}"),
    }

    let answer = json!({ "type": "answer", "sdp": "v=0 bob" });
    bob.send(
        ClientMessage::new(ClientMessageKind::Answer)
            .to("alice")
            .with_payload(answer.clone()),
    )
    .await
    .expect("Answer without roomId should use the current room");

    let msg = alice.recv().await.expect("No answer");
    assert_eq!(signal_kind_of(&msg), Some(SignalKind::Answer));
    assert_eq!(payload_of(&msg), Some(&answer));

    alice
        .send(
            ClientMessage::new(ClientMessageKind::IceCandidate)
                .in_room(room_id)
                .to("bob")
                .with_payload(json!({ "candidate": "candidate:1" })),
        )
        .await
        .expect("Candidate failed");
    let msg = bob.recv().await.expect("No candidate");
    assert_eq!(signal_kind_of(&msg), Some(SignalKind::IceCandidate));

    assert!(alice.disconnect(DisconnectCause::Closed).await);
    let msg = bob.recv().await.expect("No hangup");
    assert!(matches!(
        &msg,
        ServerMessage::Hangup { room_id: r, from, .. } if *r == room_id && from.as_str() == "alice"
    ));

    assert!(bob.disconnect(DisconnectCause::Closed).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!service.rooms().contains(room_id));
    assert_eq!(service.stats().connections, 0);
}

#[tokio::test]
async fn test_client_hangup_ends_call() {
    init_tracing();

    let service = create_test_service();
    let mut alice = TestPeer::connect(&service, "alice").await.expect("Connect failed");
    let mut bob = TestPeer::connect(&service, "bob").await.expect("Connect failed");

    let room_id = alice.create_room().await.expect("Create failed");
    bob.join(room_id).await.expect("Join failed");
    alice.recv().await.expect("No peer-joined");

    bob.send(
        ClientMessage::new(ClientMessageKind::Hangup)
            .in_room(room_id)
            .with_payload(json!({ "reason": "busy" })),
    )
    .await
    .expect("Hangup failed");

    assert_eq!(bob.recv().await.expect("No left"), ServerMessage::Left { room_id });
    let msg = alice.recv().await.expect("No hangup");
    assert_eq!(signal_kind_of(&msg), Some(SignalKind::Hangup));
    assert_eq!(payload_of(&msg), Some(&json!({ "reason": "busy" })));

    assert_eq!(bob.current_room(), None);
    assert_eq!(alice.current_room(), Some(room_id));
}
