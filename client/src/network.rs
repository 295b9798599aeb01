//! Websocket transport bridging a background I/O thread to the render thread

use crate::error::ClientError;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, trace, warn};
use shared::ClientMessage;
use std::thread;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

/// Raw events produced by the socket side of the bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Opened,
    Frame(String),
    Closed { reason: String },
}

/// Events handed to the game, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The connection is established. Emitted exactly once per session.
    Ready,
    Message(String),
    Closed { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Connecting,
    Open,
    Closed,
}

/// One full-duplex connection to the game server.
///
/// All methods are non-blocking and meant to be called from the frame loop. Outbound
/// messages are fire-and-forget; `send` fails with [`ClientError::NotConnected`]
/// whenever the session has not reported [`SessionEvent::Ready`] yet or has closed.
pub struct TransportSession {
    outbound: UnboundedSender<String>,
    events: UnboundedReceiver<TransportEvent>,
    state: LinkState,
    ready_fired: bool,
}

impl TransportSession {
    /// Starts connecting to `endpoint` on a dedicated I/O thread.
    pub fn connect(endpoint: &Url) -> Result<Self, ClientError> {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let url = endpoint.to_string();

        thread::Builder::new()
            .name("transport".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!("Failed to start transport runtime: {}", e);
                        let _ = event_tx.send(TransportEvent::Closed {
                            reason: e.to_string(),
                        });
                        return;
                    }
                };
                runtime.block_on(drive_socket(url, outbound_rx, event_tx));
            })?;

        info!("Connecting to {}", endpoint);
        Ok(Self::from_channels(outbound_tx, event_rx))
    }

    /// Creates a session backed by an in-memory peer instead of a socket.
    pub fn loopback() -> (Self, LoopbackPeer) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let peer = LoopbackPeer {
            events: event_tx,
            outbound: outbound_rx,
        };
        (Self::from_channels(outbound_tx, event_rx), peer)
    }

    fn from_channels(
        outbound: UnboundedSender<String>,
        events: UnboundedReceiver<TransportEvent>,
    ) -> Self {
        Self {
            outbound,
            events,
            state: LinkState::Connecting,
            ready_fired: false,
        }
    }

    /// Returns the next pending event, if any.
    pub fn poll(&mut self) -> Option<SessionEvent> {
        loop {
            let event = match self.events.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    if self.state == LinkState::Closed {
                        return None;
                    }
                    self.state = LinkState::Closed;
                    return Some(SessionEvent::Closed {
                        reason: "transport thread exited".to_string(),
                    });
                }
            };

            match event {
                TransportEvent::Opened if !self.ready_fired => {
                    self.ready_fired = true;
                    self.state = LinkState::Open;
                    return Some(SessionEvent::Ready);
                }
                TransportEvent::Opened => {
                    warn!("Ignoring repeated open notification");
                }
                TransportEvent::Frame(text) => {
                    trace!("Inbound frame of {} bytes", text.len());
                    return Some(SessionEvent::Message(text));
                }
                TransportEvent::Closed { reason } => {
                    if self.state == LinkState::Closed {
                        continue;
                    }
                    self.state = LinkState::Closed;
                    return Some(SessionEvent::Closed { reason });
                }
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == LinkState::Open
    }

    pub fn send(&self, message: &ClientMessage) -> Result<(), ClientError> {
        if !self.is_open() {
            return Err(ClientError::NotConnected);
        }

        let text = message.to_json()?;
        debug!("Sending {}", text);
        self.outbound
            .send(text)
            .map_err(|_| ClientError::NotConnected)
    }
}

/// Test-side end of [`TransportSession::loopback`].
pub struct LoopbackPeer {
    events: UnboundedSender<TransportEvent>,
    outbound: UnboundedReceiver<String>,
}

impl LoopbackPeer {
    pub fn open(&self) {
        let _ = self.events.send(TransportEvent::Opened);
    }

    pub fn deliver(&self, text: impl Into<String>) {
        let _ = self.events.send(TransportEvent::Frame(text.into()));
    }

    pub fn close(&self, reason: impl Into<String>) {
        let _ = self.events.send(TransportEvent::Closed {
            reason: reason.into(),
        });
    }

    /// Drains everything the session has sent so far.
    pub fn sent(&mut self) -> Vec<String> {
        let mut sent = Vec::new();
        while let Ok(text) = self.outbound.try_recv() {
            sent.push(text);
        }
        sent
    }
}

async fn drive_socket(
    url: String,
    mut outbound: UnboundedReceiver<String>,
    events: UnboundedSender<TransportEvent>,
) {
    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            error!("Failed to connect to {}: {}", url, e);
            let _ = events.send(TransportEvent::Closed {
                reason: e.to_string(),
            });
            return;
        }
    };

    info!("Connected to {}", url);
    let _ = events.send(TransportEvent::Opened);
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if events.send(TransportEvent::Frame(text)).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.to_string())
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| "server closed the connection".to_string());
                    info!("Connection closed: {}", reason);
                    let _ = events.send(TransportEvent::Closed { reason });
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Connection error: {}", e);
                    let _ = events.send(TransportEvent::Closed { reason: e.to_string() });
                    break;
                }
                None => {
                    let _ = events.send(TransportEvent::Closed {
                        reason: "connection ended".to_string(),
                    });
                    break;
                }
            },

            text = outbound.recv() => match text {
                Some(text) => {
                    if let Err(e) = write.send(Message::Text(text)).await {
                        warn!("Failed to send message: {}", e);
                    }
                }
                None => {
                    let _ = write.close().await;
                    break;
                }
            },
        }
    }
}
