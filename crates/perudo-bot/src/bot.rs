//! `Bot` runner: connects, plays one game, disconnects.
//!
//! The runner ties the layers together: [`LineClient`] (transport +
//! codec) feeds [`ClientEvent`]s over a channel to this task, which owns
//! the [`StateMachine`] and does all the sending.

use perudo_protocol::{Codec, JsonCodec, MsgFromPlayerToLobby, MsgIn};
use tokio::sync::mpsc;

use crate::client::{ClientEvent, ConnectionLost, LineClient};
use crate::state::{BotState, StateMachine};
use crate::{BotConfig, BotError};

/// How a finished game went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Name from `GameEnded`.
    pub winner: String,
    /// Whether `winner` is us.
    pub won: bool,
}

/// A bot playing one game over one connection.
///
/// # Example
///
/// ```rust,no_run
/// use perudo_bot::{Bot, BotConfig};
///
/// # async fn play() -> Result<(), perudo_bot::BotError> {
/// let outcome = Bot::new(BotConfig::default().name("Dudo")).run().await?;
/// println!("{} won", outcome.winner);
/// # Ok(())
/// # }
/// ```
pub struct Bot<C: Codec = JsonCodec> {
    config: BotConfig,
    client: LineClient<C>,
    machine: StateMachine,
}

impl Bot<JsonCodec> {
    /// Creates a bot speaking the JSON line protocol.
    pub fn new(config: BotConfig) -> Self {
        Self::with_codec(config, JsonCodec)
    }
}

impl<C: Codec> Bot<C> {
    /// Creates a bot with a custom codec.
    pub fn with_codec(config: BotConfig, codec: C) -> Self {
        let machine = StateMachine::new(config.name.clone());
        Self {
            config,
            client: LineClient::new(codec),
            machine,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn state(&self) -> &BotState {
        self.machine.state()
    }

    /// Runs the bot until the game ends or the connection drops.
    ///
    /// Sends `Connect`, then answers every `Turn` for us with one bid.
    /// On `GameEnded` it sends `Disconnect`, closes the connection and
    /// returns the winner.
    ///
    /// # Errors
    /// - `BotError::Config` if the config doesn't validate,
    /// - `BotError::Client` if connecting or sending fails,
    /// - `BotError::ConnectionLost` if the server goes away mid-game.
    pub async fn run(mut self) -> Result<Outcome, BotError> {
        self.config.validate()?;

        let (events, mut rx) = mpsc::unbounded_channel::<ClientEvent<MsgIn>>();
        self.client.connect(self.config.addr.as_str(), events).await?;

        tracing::info!(addr = %self.config.addr, name = %self.config.name, uuid = %self.config.uuid, "joining lobby");
        self.client
            .send(MsgFromPlayerToLobby::Connect {
                name: self.config.name.clone(),
                uuid: self.config.uuid.clone(),
            })
            .await?;

        while let Some(event) = rx.recv().await {
            match event {
                ClientEvent::Message(msg) => {
                    self.machine.on_message(msg);

                    if let Some(action) = self.machine.take_action()? {
                        self.client.send(action).await?;
                    }

                    if let BotState::GameEnded { winner } = self.machine.state() {
                        let winner = winner.clone();
                        return Ok(self.finish(winner).await);
                    }
                }
                ClientEvent::ConnectionLost(reason) => {
                    tracing::warn!(%reason, state = %self.machine.state(), "connection lost");
                    self.shutdown().await;
                    return Err(BotError::ConnectionLost(reason));
                }
            }
        }

        // The receive loop always reports before dropping its sender, so
        // this only happens if it panicked.
        self.shutdown().await;
        Err(BotError::ConnectionLost(ConnectionLost::Cancelled))
    }

    /// Leaves the lobby and closes the connection.
    ///
    /// The game is already decided, so failures here are only logged.
    async fn finish(&mut self, winner: String) -> Outcome {
        if let Err(e) = self.client.send(MsgFromPlayerToLobby::Disconnect).await {
            tracing::warn!(error = %e, "could not send Disconnect");
        }
        self.shutdown().await;

        let won = winner == self.config.name;
        tracing::info!(%winner, won, "done");
        Outcome { winner, won }
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.client.close().await {
            tracing::debug!(error = %e, "close failed");
        }
    }
}
