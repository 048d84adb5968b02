//! WebSocket transport for the client.
//!
//! Provides [`ConnectedClient`] which handles WebSocket I/O for envelope
//! transport. This is a thin layer that just moves frames; protocol logic
//! remains in the Sans-IO [`crate::Session`].
//!
//! One spawned task owns the socket and multiplexes outbound envelopes with
//! inbound frames, so frames are delivered in exactly the order the socket
//! yields them.

use futures_util::{SinkExt, StreamExt};
use rally_proto::Envelope;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

/// Capacity of the outbound and inbound queues.
const QUEUE_CAPACITY: usize = 64;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Envelope could not be encoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] rally_proto::ProtocolError),

    /// Outbound queue is full.
    #[error("outbound queue full")]
    QueueFull,

    /// Channel already closed.
    #[error("channel closed")]
    Closed,
}

/// Something the channel delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One inbound frame, undecoded.
    Frame(Vec<u8>),
    /// Channel ended. Delivered exactly once, after every frame.
    Closed {
        /// Close reason from the peer or the network error.
        reason: String,
    },
}

/// Handle to an open WebSocket channel.
pub struct ConnectedClient {
    to_server: mpsc::Sender<String>,
    from_server: mpsc::Receiver<TransportEvent>,
    abort_handle: tokio::task::AbortHandle,
    /// `Closed` was delivered or the handle was closed locally.
    finished: bool,
}

impl ConnectedClient {
    /// Queue an envelope for sending. Fire-and-forget: success means queued,
    /// not delivered.
    ///
    /// # Errors
    ///
    /// - `TransportError::Protocol` if the envelope cannot be encoded
    /// - `TransportError::QueueFull` if the outbound queue is full
    /// - `TransportError::Closed` if the channel is gone
    pub fn send(&self, envelope: &Envelope) -> Result<(), TransportError> {
        if self.finished {
            return Err(TransportError::Closed);
        }

        let text = envelope.encode()?;
        self.to_server.try_send(text).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::QueueFull,
            TrySendError::Closed(_) => TransportError::Closed,
        })
    }

    /// Next event, waiting if none is ready. `None` after `Closed` has been
    /// delivered or after [`ConnectedClient::close`].
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        if self.finished {
            return None;
        }

        let event = self.from_server.recv().await;
        Some(self.track(event))
    }

    /// Next event if one is ready.
    pub fn try_recv(&mut self) -> Option<TransportEvent> {
        if self.finished {
            return None;
        }

        match self.from_server.try_recv() {
            Ok(event) => Some(self.track(Some(event))),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.track(None)),
        }
    }

    /// Whether the channel has ended.
    pub fn is_closed(&self) -> bool {
        self.finished
    }

    /// Close the channel. No event is delivered after this returns.
    pub fn close(&mut self) {
        self.abort_handle.abort();
        self.from_server.close();
        while self.from_server.try_recv().is_ok() {}
        self.finished = true;
    }

    /// Record terminal delivery. A task that vanished without reporting is
    /// surfaced as a close.
    fn track(&mut self, event: Option<TransportEvent>) -> TransportEvent {
        match event {
            Some(TransportEvent::Frame(bytes)) => TransportEvent::Frame(bytes),
            Some(closed @ TransportEvent::Closed { .. }) => {
                self.finished = true;
                closed
            },
            None => {
                self.finished = true;
                TransportEvent::Closed { reason: "connection task ended".to_string() }
            },
        }
    }
}

impl Drop for ConnectedClient {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Connect to a Rally server.
///
/// # Errors
///
/// - `TransportError::Connection` if the WebSocket handshake fails
pub async fn connect(url: &str) -> Result<ConnectedClient, TransportError> {
    let (socket, _response) =
        connect_async(url).await.map_err(|e| TransportError::Connection(e.to_string()))?;
    tracing::info!(%url, "websocket connected");

    let (to_server_tx, to_server_rx) = mpsc::channel::<String>(QUEUE_CAPACITY);
    let (from_server_tx, from_server_rx) = mpsc::channel::<TransportEvent>(QUEUE_CAPACITY);

    let handle = tokio::spawn(run_connection(socket, to_server_rx, from_server_tx));

    Ok(ConnectedClient {
        to_server: to_server_tx,
        from_server: from_server_rx,
        abort_handle: handle.abort_handle(),
        finished: false,
    })
}

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Run the connection, bridging between the queues and the socket.
async fn run_connection(
    socket: Socket,
    mut to_server: mpsc::Receiver<String>,
    from_server: mpsc::Sender<TransportEvent>,
) {
    let (mut sink, mut stream) = socket.split();

    let reason = loop {
        tokio::select! {
            outbound = to_server.recv() => match outbound {
                Some(text) => {
                    if let Err(e) = sink.send(Message::text(text)).await {
                        break format!("send failed: {e}");
                    }
                },
                None => {
                    let _ = sink.close().await;
                    break "closed locally".to_string();
                },
            },
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if from_server.send(TransportEvent::Frame(text.into_bytes())).await.is_err() {
                        return;
                    }
                },
                Some(Ok(Message::Binary(data))) => {
                    if from_server.send(TransportEvent::Frame(data)).await.is_err() {
                        return;
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    break frame
                        .map(|f| f.reason.into_owned())
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| "server closed the connection".to_string());
                },
                Some(Ok(_)) => {},
                Some(Err(e)) => break e.to_string(),
                None => break "connection closed".to_string(),
            },
        }
    };

    tracing::info!(%reason, "websocket closed");
    let _ = from_server.send(TransportEvent::Closed { reason }).await;
}
