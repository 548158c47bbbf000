//! Newline-framed transport over plain TCP.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;

use crate::{Connection, Transport, TransportError};

/// Default upper bound on a frame's payload, terminator excluded.
///
/// The largest message the game sends is a `Round` with every hand
/// revealed, a few hundred bytes for a full table.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

const TERMINATOR: u8 = b'\n';

/// A TCP listener handing out [`TcpLineConnection`]s.
pub struct TcpLineTransport {
    listener: TcpListener,
}

impl TcpLineTransport {
    /// Binds a listener to the given address.
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr = ?listener.local_addr().ok(), "line transport listening");
        Ok(Self { listener })
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpLineTransport {
    type Connection = TcpLineConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        let conn = TcpLineConnection::from_stream(stream, addr);
        tracing::debug!(peer = %addr, "accepted line connection");
        Ok(conn)
    }
}

/// One TCP stream carrying `\n`-terminated frames.
///
/// The stream is split into halves behind separate locks, so one task can
/// sit in [`recv`](Connection::recv) while another calls
/// [`send`](Connection::send).
pub struct TcpLineConnection {
    peer: SocketAddr,
    max_frame_len: usize,
    reader: Mutex<BufReader<OwnedReadHalf>>,
    writer: Mutex<OwnedWriteHalf>,
    closed: AtomicBool,
}

impl TcpLineConnection {
    /// Opens a connection to `addr`.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(TransportError::ConnectFailed)?;
        let peer = stream.peer_addr().map_err(TransportError::ConnectFailed)?;
        let conn = Self::from_stream(stream, peer);
        tracing::debug!(%peer, "opened line connection");
        Ok(conn)
    }

    fn from_stream(stream: TcpStream, peer: SocketAddr) -> Self {
        // Frames are small and interactive; don't let Nagle hold them back.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "could not set TCP_NODELAY");
        }
        let (read, write) = stream.into_split();
        Self {
            peer,
            max_frame_len: MAX_FRAME_LEN,
            reader: Mutex::new(BufReader::new(read)),
            writer: Mutex::new(write),
            closed: AtomicBool::new(false),
        }
    }

    /// Sets the largest payload `recv` accepts (default [`MAX_FRAME_LEN`]).
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }
}

impl Connection for TcpLineConnection {
    type Error = TransportError;

    async fn send(&self, frame: &[u8]) -> Result<(), Self::Error> {
        if frame.contains(&TERMINATOR) {
            return Err(TransportError::EmbeddedNewline);
        }
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Shutdown);
        }

        let mut line = Vec::with_capacity(frame.len() + 1);
        line.extend_from_slice(frame);
        line.push(TERMINATOR);

        // One lock for write + flush keeps concurrent frames from
        // interleaving.
        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .map_err(TransportError::SendFailed)?;
        writer.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        // Room for the payload plus a "\r\n" ending.
        let limit = self.max_frame_len.saturating_add(2);
        let mut line = Vec::new();
        let mut reader = self.reader.lock().await;
        let read = (&mut *reader)
            .take(limit as u64)
            .read_until(TERMINATOR, &mut line)
            .await
            .map_err(TransportError::ReceiveFailed)?;

        if read == 0 {
            return Ok(None);
        }
        if line.last() == Some(&TERMINATOR) {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        if line.len() > self.max_frame_len {
            return Err(TransportError::FrameTooLong {
                limit: self.max_frame_len,
            });
        }
        Ok(Some(line))
    }

    async fn close(&self) -> Result<(), Self::Error> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}
