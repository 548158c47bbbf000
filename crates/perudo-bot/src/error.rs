//! Unified error type for the bot.

use perudo_protocol::ProtocolError;

use crate::client::{ClientError, ConnectionLost};

/// Top-level error returned by [`Bot::run`](crate::Bot::run).
///
/// Decode failures never show up here: the client turns them into
/// `UnknownMessage` values before the bot sees them.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Connecting or writing failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// An outgoing message could not be built.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The receive loop stopped before the game ended.
    #[error("connection lost: {0}")]
    ConnectionLost(ConnectionLost),

    /// The [`BotConfig`](crate::BotConfig) was rejected by `validate`.
    #[error("invalid configuration: {0}")]
    Config(String),
}
