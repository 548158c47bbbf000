//! Transport layer for the Perudo bot.
//!
//! Provides the [`Connection`] and [`Transport`] traits and their TCP
//! implementation. A frame on the wire is any run of bytes terminated by a
//! single `\n`; the transport adds and strips that terminator and knows
//! nothing about what the bytes mean.

#![allow(async_fn_in_trait)]

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::{MAX_FRAME_LEN, TcpLineConnection, TcpLineTransport};

use std::net::SocketAddr;

/// Accepts new incoming connections.
///
/// The bot itself only dials out; the listening side exists for the
/// peer end of a connection (test servers, tooling).
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// A single ordered, reliable connection that exchanges frames.
///
/// `send` and `recv` may be called concurrently from different tasks;
/// implementations lock the read and write sides independently.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame (without terminator) and flushes it.
    async fn send(&self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame, with its terminator stripped.
    ///
    /// Returns `Ok(None)` when the peer closed the connection.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Shuts down the sending side. Frames already in flight from the
    /// peer can still be received.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the address of the remote end. Used to tell connections
    /// apart in logs.
    fn peer_addr(&self) -> SocketAddr;
}
