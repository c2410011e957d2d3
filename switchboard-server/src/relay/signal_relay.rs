use crate::room::Participant;
use crate::signaling::SignalingOutput;
use std::sync::Arc;
use switchboard_core::{PeerId, ServerMessage, SignalError, SignalMessage};
use tracing::debug;

/// Routes signals between the participants of a single room.
///
/// The relay keeps no queue of its own: each call delivers straight onto the
/// recipients' transports, so per-pair ordering is whatever order the room
/// hands messages in.
#[derive(Clone)]
pub struct SignalRelay {
    output: Arc<dyn SignalingOutput>,
}

impl SignalRelay {
    pub fn new(output: Arc<dyn SignalingOutput>) -> Self {
        Self { output }
    }

    /// Forwards `signal` and returns how many participants received it.
    ///
    /// Membership is checked before anything is sent, so a rejected signal
    /// has no effect on any recipient.
    pub async fn relay(
        &self,
        participants: &[Participant],
        signal: &SignalMessage,
    ) -> Result<usize, SignalError> {
        if !participants.iter().any(|p| p.peer_id == signal.from) {
            return Err(SignalError::NotInRoom(signal.from.clone()));
        }

        let msg = signal.to_server_message();

        match &signal.to {
            Some(target) => {
                let recipient = participants
                    .iter()
                    .find(|p| &p.peer_id == target)
                    .ok_or_else(|| SignalError::NotInRoom(target.clone()))?;

                self.output
                    .deliver(&recipient.peer_id, recipient.connection_id, msg)
                    .await?;

                debug!(
                    room = %signal.room_id,
                    from = %signal.from,
                    to = %target,
                    kind = ?signal.kind,
                    "Signal relayed"
                );
                Ok(1)
            }
            None => {
                let delivered = self
                    .notify(participants, Some(&signal.from), &msg)
                    .await;

                debug!(
                    room = %signal.room_id,
                    from = %signal.from,
                    kind = ?signal.kind,
                    delivered,
                    "Signal broadcast"
                );
                Ok(delivered)
            }
        }
    }

    /// Best-effort fan-out. Recipients whose transport is already gone are
    /// skipped; their own cleanup removes them from the room.
    pub async fn notify(
        &self,
        participants: &[Participant],
        except: Option<&PeerId>,
        msg: &ServerMessage,
    ) -> usize {
        let mut delivered = 0;

        for participant in participants {
            if Some(&participant.peer_id) == except {
                continue;
            }

            match self
                .output
                .deliver(&participant.peer_id, participant.connection_id, msg.clone())
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => debug!("Skipping {}: {}", participant.peer_id, e),
            }
        }

        delivered
    }
}
