//! Typed line client: the bot's end of the connection.
//!
//! [`LineClient`] owns one [`TcpLineConnection`]. The flow is:
//!   1. `connect` opens the stream and spawns the receive loop
//!   2. the receive loop reads a frame, decodes it (never fails) and awaits
//!      the [`Handler`], one message at a time
//!   3. `send` encodes a message, writes it, then yields so the receive
//!      loop gets a turn before the caller continues
//!   4. the loop ends on EOF, I/O error or `close`, and reports why to the
//!      handler exactly once

use std::future::Future;
use std::sync::Arc;

use perudo_protocol::{Catalog, Codec, Inbound, MsgOut, ProtocolError};
use perudo_transport::{Connection, TcpLineConnection, TransportError};
use tokio::net::ToSocketAddrs;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Errors returned by [`LineClient`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// `send` was called before `connect` (or after `close`).
    #[error("not connected")]
    NotConnected,

    /// `connect` was called on a client that already has a connection.
    #[error("already connected")]
    AlreadyConnected,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connection(#[source] TransportError),

    /// Writing to an established connection failed.
    #[error("write failed: {0}")]
    Write(#[source] TransportError),

    /// The outgoing message could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Why the receive loop stopped.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionLost {
    /// The server closed the connection (end of stream).
    #[error("connection closed by server")]
    ClosedByPeer,

    /// [`LineClient::close`] was called, or the client was dropped.
    #[error("receive loop cancelled")]
    Cancelled,

    /// Reading from the socket failed.
    #[error("read failed: {0}")]
    Failed(#[source] TransportError),
}

/// Receives everything the receive loop produces.
///
/// The loop owns its handler and awaits each call before reading the next
/// frame, so calls never overlap.
pub trait Handler<I>: Send + 'static {
    /// Called once per decoded frame, in arrival order.
    fn handle(&mut self, msg: I) -> impl Future<Output = ()> + Send;

    /// Called exactly once, after the last `handle`.
    fn connection_lost(&mut self, reason: ConnectionLost) -> impl Future<Output = ()> + Send;
}

/// What a forwarding handler puts on its channel.
#[derive(Debug)]
pub enum ClientEvent<I> {
    Message(I),
    ConnectionLost(ConnectionLost),
}

/// Forwards every event to another task.
///
/// This is how the bot hands messages from the receive loop to its own
/// task without sharing state between the two.
impl<I: Send + 'static> Handler<I> for mpsc::UnboundedSender<ClientEvent<I>> {
    async fn handle(&mut self, msg: I) {
        if self.send(ClientEvent::Message(msg)).is_err() {
            tracing::debug!("event receiver dropped, discarding message");
        }
    }

    async fn connection_lost(&mut self, reason: ConnectionLost) {
        if let Err(mpsc::error::SendError(ClientEvent::ConnectionLost(reason))) =
            self.send(ClientEvent::ConnectionLost(reason))
        {
            tracing::debug!(%reason, "event receiver dropped, discarding connection loss");
        }
    }
}

/// The running receive loop: its task and the signal that stops it.
struct ReceiveLoop {
    cancel: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// A client for the newline-delimited JSON protocol.
pub struct LineClient<C: Codec> {
    codec: Arc<C>,
    conn: Option<Arc<TcpLineConnection>>,
    receiver: Option<ReceiveLoop>,
}

impl<C: Codec> LineClient<C> {
    /// Creates a client that is not connected yet.
    pub fn new(codec: C) -> Self {
        Self {
            codec: Arc::new(codec),
            conn: None,
            receiver: None,
        }
    }

    /// Returns `true` between a successful `connect` and `close`.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Connects to `addr` and starts dispatching inbound messages to
    /// `handler`.
    ///
    /// Every frame is decoded against the inbound set `I`.
    pub async fn connect<I, H>(&mut self, addr: impl ToSocketAddrs, handler: H) -> Result<(), ClientError>
    where
        I: Inbound + Send + 'static,
        H: Handler<I>,
    {
        if self.conn.is_some() {
            return Err(ClientError::AlreadyConnected);
        }

        let conn = Arc::new(
            TcpLineConnection::connect(addr)
                .await
                .map_err(ClientError::Connection)?,
        );
        tracing::info!(peer = %conn.peer_addr(), "connected");

        let (cancel, cancel_rx) = oneshot::channel();
        let task = tokio::spawn(receive_loop(
            Arc::clone(&conn),
            Arc::clone(&self.codec),
            handler,
            cancel_rx,
        ));

        self.conn = Some(conn);
        self.receiver = Some(ReceiveLoop { cancel, task });

        tokio::task::yield_now().await;
        Ok(())
    }

    /// Encodes and sends one message, then yields once.
    ///
    /// The yield guarantees the receive loop a scheduler turn between this
    /// send and whatever the caller does next.
    pub async fn send(&self, msg: impl Into<MsgOut>) -> Result<(), ClientError> {
        let conn = self.conn.as_ref().ok_or(ClientError::NotConnected)?;
        let msg = msg.into();
        let frame = self.codec.encode(&msg)?;

        conn.send(&frame).await.map_err(ClientError::Write)?;
        tracing::debug!(tag = msg.tag(), frame = %String::from_utf8_lossy(&frame), "sent");

        tokio::task::yield_now().await;
        Ok(())
    }

    /// Stops the receive loop and shuts down the connection.
    ///
    /// Does nothing if the client is not connected.
    pub async fn close(&mut self) -> Result<(), ClientError> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        let task = self.receiver.take().map(|ReceiveLoop { cancel, task }| {
            // Err means the loop already ended on its own.
            let _ = cancel.send(());
            task
        });
        let shutdown = conn.close().await.map_err(ClientError::Write);

        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "receive loop panicked");
            }
        }
        tracing::info!(peer = %conn.peer_addr(), "connection closed");
        shutdown
    }
}

/// Reads, decodes and dispatches frames until the connection ends.
async fn receive_loop<C, I, H>(
    conn: Arc<TcpLineConnection>,
    codec: Arc<C>,
    mut handler: H,
    mut cancel: oneshot::Receiver<()>,
) where
    C: Codec,
    I: Inbound + Send + 'static,
    H: Handler<I>,
{
    let peer = conn.peer_addr();

    let reason = loop {
        let frame = tokio::select! {
            biased;
            _ = &mut cancel => break ConnectionLost::Cancelled,
            frame = conn.recv() => frame,
        };

        match frame {
            Ok(Some(frame)) => {
                let msg: I = codec.decode(&frame);
                tracing::debug!(%peer, tag = msg.tag(), frame = %String::from_utf8_lossy(&frame), "received");
                handler.handle(msg).await;
            }
            Ok(None) => break ConnectionLost::ClosedByPeer,
            Err(e) => break ConnectionLost::Failed(e),
        }
    };

    match &reason {
        ConnectionLost::Failed(e) => tracing::warn!(%peer, error = %e, "receive loop stopped"),
        other => tracing::info!(%peer, reason = %other, "receive loop stopped"),
    }
    handler.connection_lost(reason).await;
}
