use crate::lifecycle::{ConnectionState, DisconnectCause, Liveness};
use crate::signaling::SignalingService;
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use switchboard_core::{ClientMessage, PeerId, ServerMessage, SignalError};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(user_id): Path<String>,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    let peer_id = PeerId::from(user_id);

    ws.on_upgrade(move |socket| handle_socket(socket, peer_id, service))
}

async fn handle_socket(mut socket: WebSocket, peer_id: PeerId, service: SignalingService) {
    info!("New WebSocket connection: {}", peer_id);

    let session = match service.connect(peer_id.clone()).await {
        Ok(session) => session,
        Err(e) => {
            warn!("Refusing connection for {}: {}", peer_id, e);
            if let Ok(json) = serde_json::to_string(&ServerMessage::rejected(&e, None)) {
                let _ = socket.send(Message::Text(json.into())).await;
            }
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };

    let (handle, mut outbound) = session.into_parts();
    let (mut sender, mut receiver) = socket.split();
    let (control_tx, mut control_rx) = mpsc::unbounded_channel::<Message>();

    // Ends with Ok when the registry drops the transport, Err when the socket fails.
    let mut send_task = tokio::spawn(async move {
        loop {
            let frame = tokio::select! {
                msg = outbound.recv() => match msg {
                    Some(msg) => match serde_json::to_string(&msg) {
                        Ok(json) => Message::Text(json.into()),
                        Err(e) => {
                            error!("Failed to serialize signal message: {}", e);
                            continue;
                        }
                    },
                    None => {
                        let _ = sender.send(Message::Close(None)).await;
                        return Ok(());
                    }
                },
                Some(frame) = control_rx.recv() => frame,
            };

            if let Err(e) = sender.send(frame).await {
                return Err(e);
            }
        }
    });

    let mut liveness = Liveness::new(&service.config().lifecycle, Instant::now());

    while liveness.state() != ConnectionState::Disconnected {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(msg)) => {
                    if liveness.record_activity(Instant::now()).is_some() {
                        debug!("{} is active again", handle.peer_id);
                    }
                    service.touch(&handle);

                    match msg {
                        Message::Text(text) => match ClientMessage::parse(text.as_str()) {
                            Ok(signal) => {
                                let _ = service.process(&handle, signal).await;
                            }
                            Err(e) => {
                                warn!("Invalid ClientMessage from {}: {}", handle.peer_id, e);
                                service.reject(&handle, &e, None);
                            }
                        },
                        Message::Binary(_) => {
                            let e = SignalError::InvalidMessage(
                                "binary frames are not supported".into(),
                            );
                            service.reject(&handle, &e, None);
                        }
                        Message::Ping(data) => {
                            let _ = control_tx.send(Message::Pong(data));
                        }
                        Message::Pong(_) => {}
                        Message::Close(_) => {
                            liveness.transport_closed();
                        }
                    }
                }
                Some(Err(e)) => {
                    let err = SignalError::TransportError(e.to_string());
                    warn!("WebSocket error for {}: {}", handle.peer_id, err);
                    liveness.transport_failed();
                }
                None => {
                    liveness.transport_closed();
                }
            },

            result = &mut send_task => {
                match result {
                    Ok(Ok(())) => liveness.transport_closed(),
                    _ => liveness.transport_failed(),
                };
            }

            _ = tokio::time::sleep_until(liveness.next_deadline()) => {
                if liveness.poll(Instant::now()) == Some(ConnectionState::Idle) {
                    debug!("{} went idle, pinging", handle.peer_id);
                    let _ = control_tx.send(Message::Ping(Bytes::new()));
                }
            }
        }
    }

    let cause = liveness.cause().unwrap_or(DisconnectCause::Closed);
    service.disconnect(&handle, cause).await;
    send_task.abort();

    info!("WebSocket disconnected: {} ({:?})", handle.peer_id, cause);
}
