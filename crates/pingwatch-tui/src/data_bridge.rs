//! Data bridge: forwards the server event channel into the app loop.
//!
//! Runs as a background task. Every [`SocketEvent`] the channel produces
//! becomes an [`Action::Socket`]; the loop applies it to the dashboard.

use std::sync::Arc;

use pingwatch_core::SocketEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::action::Action;

/// Forward `events` to `action_tx` until cancelled or either side closes.
///
/// Take the receiver with `EventSocket::subscribe` before spawning so no
/// event emitted in between is missed.
pub async fn spawn_data_bridge(
    mut events: broadcast::Receiver<Arc<SocketEvent>>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            received = events.recv() => match received {
                Ok(event) => {
                    if action_tx.send(Action::Socket(event)).is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event bridge fell behind; events dropped");
                }
                Err(RecvError::Closed) => {
                    debug!("event channel closed");
                    break;
                }
            },
        }
    }

    debug!("data bridge shut down");
}
