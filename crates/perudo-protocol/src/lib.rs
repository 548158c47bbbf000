//! Wire protocol for the Perudo game server.
//!
//! This crate defines the "language" a bot and the server speak:
//!
//! - **Catalog** ([`MsgOut`], [`MsgIn`] and the four channel enums): the
//!   messages that travel on the wire, grouped by direction.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   turned into one line of JSON and back. Decoding inbound frames is
//!   total: anything unrecognized becomes `UnknownMessage`.
//! - **Errors** ([`ProtocolError`]): what can go wrong while encoding, or
//!   *why* a frame failed to decode.
//!
//! # Architecture
//!
//! ```text
//! Transport (lines of bytes) → Protocol (MsgIn / MsgOut) → Bot (state machine)
//! ```
//!
//! The protocol layer knows nothing about sockets or game strategy.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec, LOCAL_DIAGNOSTIC_PREFIX};
pub use error::ProtocolError;
pub use types::{
    Catalog, Claim, FACES, Inbound, MAX_NUMBER, MsgFromGameToPlayer, MsgFromLobbyToPlayer,
    MsgFromPlayerToGame, MsgFromPlayerToLobby, MsgIn, MsgOut,
};
