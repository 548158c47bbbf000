//! The bot's state machine and its placeholder bidding policy.
//!
//! [`StateMachine::on_message`] applies one inbound message;
//! [`StateMachine::take_action`] says what (if anything) to send in reply.
//! Neither touches the network, so both are tested without a socket.

use std::fmt;

use perudo_protocol::{
    Claim, FACES, MAX_NUMBER, MsgFromGameToPlayer, MsgFromLobbyToPlayer, MsgFromPlayerToGame, MsgIn,
    ProtocolError,
};
use tracing::{debug, info, warn};

/// Face bid when no claim has named one yet.
pub const OPENING_FACE: u8 = 6;

// ---------------------------------------------------------------------------
// BotState
// ---------------------------------------------------------------------------

/// Where the bot is in the lobby/game lifecycle.
///
/// ```text
/// Connecting → Connected → GameStarted → MyTurn ⇄ OtherPlayersTurn → GameEnded
///                                          │  ↑
///                                (bid sent)↓  │(Turn)
///                                        AwaitingTurn
/// ```
///
/// Each state carries only the data that is meaningful in it: there is no
/// claim before the first `Turn`, and no winner before `GameEnded`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotState {
    /// TCP is up, `Connect` sent, no reply yet.
    Connecting,
    /// The lobby accepted us; waiting for the game to start.
    Connected,
    /// The game is running but no `Turn` has arrived yet.
    GameStarted,
    /// We must bid on top of `claim`.
    MyTurn { claim: Claim },
    /// Someone else is deciding.
    OtherPlayersTurn { claim: Claim, next_player: String },
    /// We bid `bid` and wait for the game to move on.
    AwaitingTurn { bid: Claim },
    /// Terminal until a new `GameStarted`.
    GameEnded { winner: String },
}

impl BotState {
    /// Returns `true` if the bot owes the game a move.
    pub fn is_my_turn(&self) -> bool {
        matches!(self, Self::MyTurn { .. })
    }

    /// Returns `true` once the game has ended.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::GameEnded { .. })
    }
}

impl fmt::Display for BotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::GameStarted => write!(f, "GameStarted"),
            Self::MyTurn { claim } => write!(f, "MyTurn({claim})"),
            Self::OtherPlayersTurn { next_player, .. } => write!(f, "OtherPlayersTurn({next_player})"),
            Self::AwaitingTurn { bid } => write!(f, "AwaitingTurn({bid})"),
            Self::GameEnded { winner } => write!(f, "GameEnded({winner})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Bidding policy
// ---------------------------------------------------------------------------

/// The placeholder policy: one more of the same face.
///
/// `number` is capped at [`MAX_NUMBER`]. With no face named yet (or a face
/// that isn't a die face) the bid opens on [`OPENING_FACE`]. Never calls
/// `Liar` or `Exactly`.
pub fn next_bid(claim: Claim) -> Claim {
    let number = claim.number.saturating_add(1).min(MAX_NUMBER);
    let face = if FACES.contains(&claim.face) {
        claim.face
    } else {
        OPENING_FACE
    };
    Claim::new(number, face)
}

// ---------------------------------------------------------------------------
// StateMachine
// ---------------------------------------------------------------------------

/// The bot's view of the game.
#[derive(Debug, Clone)]
pub struct StateMachine {
    name: String,
    state: BotState,
    hand: Vec<u8>,
}

impl StateMachine {
    /// Creates a machine for the player called `name`, in `Connecting`.
    ///
    /// `name` must be the one sent in `Connect`; it's how `Turn` tells us
    /// it is our move.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: BotState::Connecting,
            hand: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    /// Our dice from the latest `YouRolled`.
    pub fn hand(&self) -> &[u8] {
        &self.hand
    }

    /// Applies one inbound message.
    pub fn on_message(&mut self, msg: MsgIn) {
        match msg {
            MsgIn::Game(MsgFromGameToPlayer::Connected {
                number_of_players,
                already_connected,
            }) => {
                info!(already_connected, number_of_players, "joined lobby");
                self.connected();
            }
            MsgIn::Lobby(MsgFromLobbyToPlayer::AlreadyConnected) => {
                info!("lobby says we are already connected");
                self.connected();
            }
            MsgIn::Game(MsgFromGameToPlayer::Reconnected) => {
                info!("reconnected to running game");
                self.connected();
            }
            MsgIn::Game(MsgFromGameToPlayer::GameStarted) => {
                info!("game started");
                self.transition(BotState::GameStarted);
            }
            MsgIn::Game(MsgFromGameToPlayer::YouRolled { hand }) => {
                info!(?hand, "rolled");
                self.hand = hand;
            }
            MsgIn::Game(MsgFromGameToPlayer::Turn {
                turn,
                number,
                face,
                next_player,
            }) => {
                let claim = Claim::new(number, face);
                debug!(turn, %claim, %next_player, "turn");
                let next = if next_player == self.name {
                    BotState::MyTurn { claim }
                } else {
                    BotState::OtherPlayersTurn { claim, next_player }
                };
                self.transition(next);
            }
            MsgIn::Game(MsgFromGameToPlayer::Round {
                result,
                revealed_hands,
            }) => {
                info!(%result, ?revealed_hands, "round over");
            }
            MsgIn::Game(MsgFromGameToPlayer::GameEnded { winner }) => {
                info!(%winner, won = winner == self.name, "game ended");
                self.transition(BotState::GameEnded { winner });
            }
            MsgIn::Game(MsgFromGameToPlayer::NotYourTurn) => {
                warn!(state = %self.state, "server says it is not our turn");
            }
            MsgIn::Game(MsgFromGameToPlayer::GameAlreadyStarted) => {
                warn!("game already started without us");
            }
            MsgIn::Game(MsgFromGameToPlayer::UnknownMessage { message }) => {
                warn!(%message, "unknown message");
            }
            MsgIn::Lobby(
                lobby @ (MsgFromLobbyToPlayer::Unconnected | MsgFromLobbyToPlayer::UnableToSendMsgToGame),
            ) => {
                warn!(?lobby, "lobby rejected a message");
            }
        }
    }

    /// Returns the move owed in `MyTurn`, and moves to `AwaitingTurn`.
    ///
    /// In every other state this is `Ok(None)`, so calling it after each
    /// message yields at most one bid per `Turn`.
    pub fn take_action(&mut self) -> Result<Option<MsgFromPlayerToGame>, ProtocolError> {
        let BotState::MyTurn { claim } = self.state else {
            return Ok(None);
        };
        let bid = next_bid(claim);
        let msg = MsgFromPlayerToGame::bid(bid.number, bid.face)?;
        info!(%claim, %bid, "bidding");
        self.transition(BotState::AwaitingTurn { bid });
        Ok(Some(msg))
    }

    fn connected(&mut self) {
        if self.state == BotState::Connecting {
            self.transition(BotState::Connected);
        }
    }

    fn transition(&mut self, next: BotState) {
        debug!(from = %self.state, to = %next, "state");
        self.state = next;
    }
}
