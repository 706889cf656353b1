//! Socket.IO event channel with auto-reconnect.
//!
//! Joins the monitoring server's default namespace over a raw WebSocket,
//! decodes every named event into a [`ServerEvent`] and fans it out through
//! a [`tokio::sync::broadcast`] channel. Reconnection uses exponential
//! backoff with jitter.
//!
//! # Example
//!
//! ```rust,ignore
//! use pingwatch_api::socket::{EventSocket, ReconnectConfig, SocketEvent, socket_url};
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let url = socket_url(&"http://localhost:5000".parse()?)?;
//! let socket = EventSocket::connect(url, ReconnectConfig::default(), cancel.clone());
//! let mut rx = socket.subscribe();
//!
//! while let Ok(event) = rx.recv().await {
//!     if let SocketEvent::Server(ev) = event.as_ref() {
//!         println!("{}", ev.name());
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::events::{ClientCommand, ServerEvent, SocketEvent, TransportState};
use super::packet::{
    EnginePacket, OpenInfo, SocketMessage, SocketPacket, encode_connect, encode_event,
};
use crate::error::Error;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Path the server mounts its Engine.IO endpoint on.
const SOCKET_PATH: &str = "/socket.io/";

/// Time allowed between opening the WebSocket and the `open` packet.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(20);

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for reconnecting the event channel.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum consecutive failed attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

/// Derive the WebSocket endpoint from the server's HTTP base URL.
///
/// `http://host:5000` becomes `ws://host:5000/socket.io/?EIO=4&transport=websocket`.
pub fn socket_url(base: &Url) -> Result<Url, Error> {
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::WebSocketConnect(format!(
                "unsupported URL scheme: {other}"
            )));
        }
    };

    let mut url = base.join(SOCKET_PATH)?;
    url.set_scheme(scheme)
        .map_err(|()| Error::WebSocketConnect(format!("cannot use scheme {scheme}")))?;
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url)
}

// ── EventSocket ──────────────────────────────────────────────────────

/// Handle to a running event channel.
///
/// Dropping the handle does not stop the background task; call
/// [`shutdown`](Self::shutdown) or cancel the token passed to
/// [`connect`](Self::connect).
pub struct EventSocket {
    event_rx: broadcast::Receiver<Arc<SocketEvent>>,
    command_tx: mpsc::UnboundedSender<ClientCommand>,
    connected: watch::Receiver<bool>,
    cancel: CancellationToken,
}

impl EventSocket {
    /// Spawn the connection loop and return immediately.
    ///
    /// The first connection attempt happens asynchronously. Subscribe to
    /// observe [`TransportState`] changes and server events.
    pub fn connect(ws_url: Url, reconnect: ReconnectConfig, cancel: CancellationToken) -> Self {
        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (connected_tx, connected) = watch::channel(false);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            socket_loop(
                ws_url,
                event_tx,
                command_rx,
                connected_tx,
                reconnect,
                task_cancel,
            )
            .await;
        });

        Self {
            event_rx,
            command_tx,
            connected,
            cancel,
        }
    }

    /// Get a new broadcast receiver for the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<SocketEvent>> {
        self.event_rx.resubscribe()
    }

    /// Send a command to the server.
    ///
    /// Fails with [`Error::NotConnected`] while the namespace is not joined.
    /// Success only means the command was queued; the server answers with
    /// the matching response event.
    pub fn emit(&self, command: ClientCommand) -> Result<(), Error> {
        if !*self.connected.borrow() {
            return Err(Error::NotConnected);
        }
        self.command_tx
            .send(command)
            .map_err(|_| Error::ChannelClosed)
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// A watch on the joined/not-joined state.
    pub fn connection_state(&self) -> watch::Receiver<bool> {
        self.connected.clone()
    }

    /// Signal the background task to shut down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

async fn socket_loop(
    ws_url: Url,
    event_tx: broadcast::Sender<Arc<SocketEvent>>,
    mut command_rx: mpsc::UnboundedReceiver<ClientCommand>,
    connected_tx: watch::Sender<bool>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&ws_url, &event_tx, &mut command_rx, &connected_tx, &cancel) => result,
        };

        let was_joined = connected_tx.send_replace(false);

        let reason = match result {
            Ok(()) => {
                tracing::info!(was_joined, "event channel closed by server");
                "server closed the connection".to_owned()
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "event channel error");
                e.to_string()
            }
        };

        // A joined session earns a fresh backoff. Clean closes back off too.
        if was_joined {
            attempt = 0;
            broadcast(
                &event_tx,
                SocketEvent::Transport(TransportState::Disconnected { reason }),
            );
        }

        if let Some(max) = reconnect.max_retries {
            if attempt >= max {
                tracing::error!(max_retries = max, "reconnection limit reached, giving up");
                break;
            }
        }

        let delay = calculate_backoff(attempt, &reconnect);
        tracing::info!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            attempt,
            "waiting before reconnect"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
    }

    if connected_tx.send_replace(false) {
        broadcast(
            &event_tx,
            SocketEvent::Transport(TransportState::Disconnected {
                reason: "shut down".into(),
            }),
        );
    }
    tracing::debug!("event channel loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Open one WebSocket, join the default namespace, and pump frames until
/// the connection drops.
async fn connect_and_read(
    url: &Url,
    event_tx: &broadcast::Sender<Arc<SocketEvent>>,
    command_rx: &mut mpsc::UnboundedReceiver<ClientCommand>,
    connected_tx: &watch::Sender<bool>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to event channel");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    // Commands queued against a previous connection are stale.
    while let Ok(stale) = command_rx.try_recv() {
        tracing::warn!(command = stale.event_name(), "dropping command queued while disconnected");
    }

    let (write, read) = ws_stream.split();
    pump(write, read, event_tx, command_rx, connected_tx, cancel).await
}

/// Move frames between one open WebSocket and the channels until the
/// connection drops.
///
/// The server must show signs of life: the handshake within
/// [`HANDSHAKE_TIMEOUT`], then some frame (normally its ping) within
/// `pingInterval + pingTimeout` of the previous one. Silence past that
/// window fails the connection.
async fn pump<W, R, E>(
    mut write: W,
    mut read: R,
    event_tx: &broadcast::Sender<Arc<SocketEvent>>,
    command_rx: &mut mpsc::UnboundedReceiver<ClientCommand>,
    connected_tx: &watch::Sender<bool>,
    cancel: &CancellationToken,
) -> Result<(), Error>
where
    W: Sink<Message> + Unpin,
    W::Error: fmt::Display,
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: fmt::Display,
{
    let mut joined = false;
    let mut window = HANDSHAKE_TIMEOUT;
    let idle = tokio::time::sleep(window);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                let _ = write.send(Message::Close(None)).await;
                return Ok(());
            }
            () = &mut idle => {
                return Err(Error::WebSocketConnect(format!(
                    "ping timeout: nothing from server for {}s",
                    window.as_secs()
                )));
            }
            Some(command) = command_rx.recv(), if joined => {
                tracing::debug!(command = command.event_name(), "emitting command");
                write
                    .send(Message::text(encode_event(command.event_name(), None)))
                    .await
                    .map_err(|e| Error::WebSocketConnect(e.to_string()))?;
            }
            frame = read.next() => {
                let reply = match frame {
                    Some(Ok(Message::Text(text))) => {
                        match handle_frame(text.as_str(), event_tx, connected_tx, &mut joined)? {
                            FrameOutcome::Continue => None,
                            FrameOutcome::Reply(out) => Some(out),
                            FrameOutcome::Handshake { reply, liveness } => {
                                window = liveness;
                                Some(reply)
                            }
                            FrameOutcome::Closed => return Ok(()),
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        if let Some(cf) = frame {
                            tracing::info!(code = %cf.code, reason = %cf.reason, "close frame received");
                        } else {
                            tracing::info!("close frame received (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => return Err(Error::WebSocketConnect(e.to_string())),
                    None => {
                        tracing::info!("event stream ended");
                        return Ok(());
                    }
                    // Binary, Ping, Pong, raw frames
                    Some(Ok(_)) => None,
                };

                idle.as_mut().reset(Instant::now() + window);

                if let Some(out) = reply {
                    write
                        .send(Message::text(out))
                        .await
                        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum FrameOutcome {
    Continue,
    Reply(String),
    /// The `open` packet: join the namespace and adopt the server's
    /// liveness window.
    Handshake { reply: String, liveness: Duration },
    Closed,
}

/// Decode one text frame, broadcasting whatever it carries.
fn handle_frame(
    text: &str,
    event_tx: &broadcast::Sender<Arc<SocketEvent>>,
    connected_tx: &watch::Sender<bool>,
    joined: &mut bool,
) -> Result<FrameOutcome, Error> {
    let packet = match EnginePacket::decode(text) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(error = %e, "skipping undecodable frame");
            return Ok(FrameOutcome::Continue);
        }
    };

    match packet {
        EnginePacket::Open(info) => {
            tracing::debug!(
                sid = %info.sid,
                ping_interval = info.ping_interval,
                ping_timeout = info.ping_timeout,
                "handshake open"
            );
            Ok(FrameOutcome::Handshake {
                reply: encode_connect(),
                liveness: liveness_window(&info),
            })
        }
        EnginePacket::Ping => Ok(FrameOutcome::Reply(EnginePacket::Pong.encode())),
        EnginePacket::Close => Ok(FrameOutcome::Closed),
        EnginePacket::Message(body) => {
            let message = match SocketMessage::decode(&body) {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping undecodable packet");
                    return Ok(FrameOutcome::Continue);
                }
            };
            if !message.is_default_namespace() {
                tracing::trace!(namespace = %message.namespace, "ignoring foreign namespace");
                return Ok(FrameOutcome::Continue);
            }

            match message.packet {
                SocketPacket::Connect { sid } => {
                    tracing::info!(sid = sid.as_deref().unwrap_or(""), "event channel joined");
                    *joined = true;
                    connected_tx.send_replace(true);
                    broadcast(event_tx, SocketEvent::Transport(TransportState::Connected));
                    Ok(FrameOutcome::Continue)
                }
                SocketPacket::Event { name, payload } => {
                    let event = ServerEvent::from_parts(&name, payload);
                    tracing::trace!(event = event.name(), "server event");
                    broadcast(event_tx, SocketEvent::Server(event));
                    Ok(FrameOutcome::Continue)
                }
                SocketPacket::Disconnect => Ok(FrameOutcome::Closed),
                SocketPacket::ConnectError { message } => Err(Error::Protocol(format!(
                    "namespace join refused: {message}"
                ))),
                SocketPacket::Ack { .. } => Ok(FrameOutcome::Continue),
            }
        }
        EnginePacket::Pong | EnginePacket::Upgrade | EnginePacket::Noop => {
            Ok(FrameOutcome::Continue)
        }
    }
}

/// How long the server may stay silent before the link counts as dead.
///
/// A handshake without ping settings gets the Engine.IO defaults
/// (25s interval, 20s timeout).
fn liveness_window(info: &OpenInfo) -> Duration {
    let interval = if info.ping_interval == 0 { 25_000 } else { info.ping_interval };
    let timeout = if info.ping_timeout == 0 { 20_000 } else { info.ping_timeout };
    Duration::from_millis(interval.saturating_add(timeout))
}

fn broadcast(event_tx: &broadcast::Sender<Arc<SocketEvent>>, event: SocketEvent) {
    // No subscribers right now is fine.
    let _ = event_tx.send(Arc::new(event));
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) * (1 +- 0.25)`
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────
