//! # perudo-bot
//!
//! A bot client for a Perudo (Liar's Dice) game server.
//!
//! The server speaks newline-delimited JSON over TCP. This crate joins its
//! lobby, follows the game, and answers every turn addressed to it with a
//! bid. The layers are split across crates:
//!
//! - `perudo-protocol`: the message catalog and its JSON codec,
//! - `perudo-transport`: newline framing over TCP,
//! - this crate: the typed [`LineClient`], the [`StateMachine`] and the
//!   [`Bot`] runner that drives both.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use perudo_bot::prelude::*;
//!
//! # async fn play() -> Result<(), BotError> {
//! let config = BotConfig::default().addr("127.0.0.1:5942").name("Dudo");
//! let outcome = Bot::new(config).run().await?;
//! println!("winner: {}", outcome.winner);
//! # Ok(())
//! # }
//! ```

pub mod bot;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod state;

pub use bot::{Bot, Outcome};
pub use client::{ClientError, ClientEvent, ConnectionLost, Handler, LineClient};
pub use config::BotConfig;
pub use error::BotError;
pub use state::{BotState, StateMachine};

/// Everything needed to run a bot or write a custom handler.
pub mod prelude {
    pub use crate::{
        Bot, BotConfig, BotError, BotState, ClientError, ClientEvent, ConnectionLost, Handler,
        LineClient, Outcome, StateMachine,
    };
    pub use perudo_protocol::{
        Claim, Codec, JsonCodec, MsgFromGameToPlayer, MsgFromLobbyToPlayer, MsgFromPlayerToGame,
        MsgFromPlayerToLobby, MsgIn, MsgOut,
    };
}
