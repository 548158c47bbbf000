//! The message catalog: every value that travels on the wire.
//!
//! Messages are split into four one-directional channels. Each channel is
//! a closed Rust `enum`, so a `match` over it is checked for exhaustiveness
//! by the compiler:
//!
//! ```text
//!            MsgFromPlayerToLobby ─┐            ┌─ MsgFromLobbyToPlayer
//!  bot ──►                         ├─ MsgOut    │                         ──► bot
//!            MsgFromPlayerToGame  ─┘    MsgIn ──┴─ MsgFromGameToPlayer
//! ```
//!
//! All channels use serde's default "externally tagged" representation.
//! A unit variant is written as the bare tag (`"Liar"`), and a variant with
//! fields is a single-key object (`{"Turn": {"turn": 7, ...}}`).

use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ProtocolError;

/// Largest `number` a bid may name.
pub const MAX_NUMBER: u16 = 256;

/// Valid die faces.
pub const FACES: RangeInclusive<u8> = 1..=6;

// ---------------------------------------------------------------------------
// Catalog traits
// ---------------------------------------------------------------------------

/// A closed set of message variants addressable by tag.
///
/// Implemented by each of the four channels and by the two composite
/// groups [`MsgOut`] and [`MsgIn`]. `TAGS` is the static registry that the
/// codec scans when resolving a tag, and `tag()` is its inverse.
pub trait Catalog: Serialize + Sized {
    /// Name of the set, used in diagnostics (e.g. `"Game->Player"`).
    const NAME: &'static str;

    /// Every tag in the set, in declaration order.
    const TAGS: &'static [&'static str];

    /// The wire tag of this value.
    fn tag(&self) -> &'static str;

    /// Builds the variant named `tag` from its field object.
    ///
    /// `tag` is always one of [`Self::TAGS`]; `fields` is always a JSON
    /// object (possibly empty).
    fn from_parts(tag: &'static str, fields: Map<String, Value>) -> Result<Self, serde_json::Error>;
}

/// A catalog that can be the target of a total decode.
///
/// Every inbound set can represent `UnknownMessage`, which is what a
/// malformed or unrecognized frame decodes to.
pub trait Inbound: Catalog {
    /// Wraps a diagnostic into the set's `UnknownMessage` variant.
    fn unknown(message: String) -> Self;
}

/// Typed field extraction for a serde-derived channel enum.
///
/// The `(tag, fields)` pair is put back into serde's externally tagged
/// shape. An empty field object becomes the bare tag, so unit variants
/// accept both `"Tag"` and `{"Tag": {}}`.
fn from_tagged<T: DeserializeOwned>(
    tag: &'static str,
    fields: Map<String, Value>,
) -> Result<T, serde_json::Error> {
    let value = if fields.is_empty() {
        Value::String(tag.to_owned())
    } else {
        let mut outer = Map::with_capacity(1);
        outer.insert(tag.to_owned(), Value::Object(fields));
        Value::Object(outer)
    };
    serde_json::from_value(value)
}

// ---------------------------------------------------------------------------
// Claim
// ---------------------------------------------------------------------------

/// A `(number, face)` pair: "there are at least `number` dice showing
/// `face`".
///
/// Carried by `Turn` (the standing claim) and `IThinkThereAre` (our bid).
/// `face == 0` means no claim has been made yet in this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Claim {
    pub number: u16,
    pub face: u8,
}

impl Claim {
    /// The claim before anyone has bid.
    pub const UNSET: Claim = Claim { number: 0, face: 0 };

    pub fn new(number: u16, face: u8) -> Self {
        Self { number, face }
    }

    /// Returns `true` once a face has been named.
    pub fn has_face(&self) -> bool {
        self.face != 0
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.number, self.face)
    }
}

// ---------------------------------------------------------------------------
// Player → Lobby
// ---------------------------------------------------------------------------

/// Messages a player sends to the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum MsgFromPlayerToLobby {
    /// Join (or rejoin) the lobby. The server identifies players by `uuid`;
    /// `name` is what shows up in `Turn::next_player`.
    Connect { name: String, uuid: String },
    Disconnect,
}

impl Catalog for MsgFromPlayerToLobby {
    const NAME: &'static str = "Player->Lobby";
    const TAGS: &'static [&'static str] = &["Connect", "Disconnect"];

    fn tag(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "Connect",
            Self::Disconnect => "Disconnect",
        }
    }

    fn from_parts(tag: &'static str, fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        from_tagged(tag, fields)
    }
}

// ---------------------------------------------------------------------------
// Lobby → Player
// ---------------------------------------------------------------------------

/// Messages the lobby sends to a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum MsgFromLobbyToPlayer {
    /// We sent something other than `Connect` before connecting.
    Unconnected,
    /// The lobby could not forward our message to the game.
    UnableToSendMsgToGame,
    /// A player with our uuid is already in the lobby.
    AlreadyConnected,
}

impl Catalog for MsgFromLobbyToPlayer {
    const NAME: &'static str = "Lobby->Player";
    const TAGS: &'static [&'static str] = &["Unconnected", "UnableToSendMsgToGame", "AlreadyConnected"];

    fn tag(&self) -> &'static str {
        match self {
            Self::Unconnected => "Unconnected",
            Self::UnableToSendMsgToGame => "UnableToSendMsgToGame",
            Self::AlreadyConnected => "AlreadyConnected",
        }
    }

    fn from_parts(tag: &'static str, fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        from_tagged(tag, fields)
    }
}

// ---------------------------------------------------------------------------
// Player → Game
// ---------------------------------------------------------------------------

/// Moves a player makes during their turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum MsgFromPlayerToGame {
    /// Raise the claim: "there are at least `number` dice showing `face`".
    IThinkThereAre { number: u16, face: u8 },
    /// Challenge the previous claim as too high.
    Liar,
    /// Bet that the previous claim is exactly right.
    Exactly,
}

impl MsgFromPlayerToGame {
    /// Builds an `IThinkThereAre`, rejecting values outside
    /// `0..=MAX_NUMBER` and `FACES`.
    pub fn bid(number: u16, face: u8) -> Result<Self, ProtocolError> {
        if number > MAX_NUMBER {
            return Err(ProtocolError::InvalidMessage(format!(
                "bid number {number} exceeds {MAX_NUMBER}"
            )));
        }
        if !FACES.contains(&face) {
            return Err(ProtocolError::InvalidMessage(format!(
                "bid face {face} is not a die face"
            )));
        }
        Ok(Self::IThinkThereAre { number, face })
    }
}

impl Catalog for MsgFromPlayerToGame {
    const NAME: &'static str = "Player->Game";
    const TAGS: &'static [&'static str] = &["IThinkThereAre", "Liar", "Exactly"];

    fn tag(&self) -> &'static str {
        match self {
            Self::IThinkThereAre { .. } => "IThinkThereAre",
            Self::Liar => "Liar",
            Self::Exactly => "Exactly",
        }
    }

    fn from_parts(tag: &'static str, fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        from_tagged(tag, fields)
    }
}

// ---------------------------------------------------------------------------
// Game → Player
// ---------------------------------------------------------------------------

/// Everything the game tells a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum MsgFromGameToPlayer {
    /// Reply to `Connect` while the game is still gathering players.
    Connected {
        number_of_players: usize,
        already_connected: usize,
    },
    GameStarted,
    GameEnded { winner: String },
    /// Reply to `Connect` from a known uuid after the game started.
    Reconnected,
    /// Reply to `Connect` from an unknown uuid after the game started.
    GameAlreadyStarted,
    /// The other side could not make sense of a message. Also produced
    /// locally when an inbound frame can't be decoded.
    UnknownMessage { message: String },
    NotYourTurn,
    /// The standing claim after turn `turn`, and who moves next.
    Turn {
        turn: u64,
        number: u16,
        face: u8,
        next_player: String,
    },
    /// A round was resolved by a challenge; every hand is revealed.
    Round {
        result: String,
        revealed_hands: HashMap<String, Vec<u8>>,
    },
    /// Our dice for the new round.
    YouRolled { hand: Vec<u8> },
}

impl Catalog for MsgFromGameToPlayer {
    const NAME: &'static str = "Game->Player";
    const TAGS: &'static [&'static str] = &[
        "Connected",
        "GameStarted",
        "GameEnded",
        "Reconnected",
        "GameAlreadyStarted",
        "UnknownMessage",
        "NotYourTurn",
        "Turn",
        "Round",
        "YouRolled",
    ];

    fn tag(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "Connected",
            Self::GameStarted => "GameStarted",
            Self::GameEnded { .. } => "GameEnded",
            Self::Reconnected => "Reconnected",
            Self::GameAlreadyStarted => "GameAlreadyStarted",
            Self::UnknownMessage { .. } => "UnknownMessage",
            Self::NotYourTurn => "NotYourTurn",
            Self::Turn { .. } => "Turn",
            Self::Round { .. } => "Round",
            Self::YouRolled { .. } => "YouRolled",
        }
    }

    fn from_parts(tag: &'static str, fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        from_tagged(tag, fields)
    }
}

impl Inbound for MsgFromGameToPlayer {
    fn unknown(message: String) -> Self {
        Self::UnknownMessage { message }
    }
}

// ---------------------------------------------------------------------------
// Direction groups
// ---------------------------------------------------------------------------

/// Everything a player may send: Player→Lobby ∪ Player→Game.
///
/// `#[serde(untagged)]` makes the wrapper invisible on the wire; only the
/// inner channel value is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MsgOut {
    Lobby(MsgFromPlayerToLobby),
    Game(MsgFromPlayerToGame),
}

impl From<MsgFromPlayerToLobby> for MsgOut {
    fn from(msg: MsgFromPlayerToLobby) -> Self {
        Self::Lobby(msg)
    }
}

impl From<MsgFromPlayerToGame> for MsgOut {
    fn from(msg: MsgFromPlayerToGame) -> Self {
        Self::Game(msg)
    }
}

impl Catalog for MsgOut {
    const NAME: &'static str = "Player->Lobby | Player->Game";
    const TAGS: &'static [&'static str] = &["Connect", "Disconnect", "IThinkThereAre", "Liar", "Exactly"];

    fn tag(&self) -> &'static str {
        match self {
            Self::Lobby(msg) => msg.tag(),
            Self::Game(msg) => msg.tag(),
        }
    }

    fn from_parts(tag: &'static str, fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        if MsgFromPlayerToLobby::TAGS.contains(&tag) {
            MsgFromPlayerToLobby::from_parts(tag, fields).map(Self::Lobby)
        } else {
            MsgFromPlayerToGame::from_parts(tag, fields).map(Self::Game)
        }
    }
}

/// Everything a player may receive: Lobby→Player ∪ Game→Player.
///
/// This is the decode target of the bot's receive loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MsgIn {
    Lobby(MsgFromLobbyToPlayer),
    Game(MsgFromGameToPlayer),
}

impl From<MsgFromLobbyToPlayer> for MsgIn {
    fn from(msg: MsgFromLobbyToPlayer) -> Self {
        Self::Lobby(msg)
    }
}

impl From<MsgFromGameToPlayer> for MsgIn {
    fn from(msg: MsgFromGameToPlayer) -> Self {
        Self::Game(msg)
    }
}

impl Catalog for MsgIn {
    const NAME: &'static str = "Lobby->Player | Game->Player";
    const TAGS: &'static [&'static str] = &[
        "Unconnected",
        "UnableToSendMsgToGame",
        "AlreadyConnected",
        "Connected",
        "GameStarted",
        "GameEnded",
        "Reconnected",
        "GameAlreadyStarted",
        "UnknownMessage",
        "NotYourTurn",
        "Turn",
        "Round",
        "YouRolled",
    ];

    fn tag(&self) -> &'static str {
        match self {
            Self::Lobby(msg) => msg.tag(),
            Self::Game(msg) => msg.tag(),
        }
    }

    fn from_parts(tag: &'static str, fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        if MsgFromLobbyToPlayer::TAGS.contains(&tag) {
            MsgFromLobbyToPlayer::from_parts(tag, fields).map(Self::Lobby)
        } else {
            MsgFromGameToPlayer::from_parts(tag, fields).map(Self::Game)
        }
    }
}

impl Inbound for MsgIn {
    fn unknown(message: String) -> Self {
        Self::Game(MsgFromGameToPlayer::unknown(message))
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The server is written against exact JSON shapes, so these tests pin
    //! the serde output of each channel.

    use super::*;

    // =====================================================================
    // Tag registries
    // =====================================================================

    #[test]
    fn test_msg_in_tags_are_lobby_then_game() {
        let joined: Vec<&str> = MsgFromLobbyToPlayer::TAGS
            .iter()
            .chain(MsgFromGameToPlayer::TAGS)
            .copied()
            .collect();
        assert_eq!(MsgIn::TAGS, joined.as_slice());
    }

    #[test]
    fn test_msg_out_tags_are_lobby_then_game() {
        let joined: Vec<&str> = MsgFromPlayerToLobby::TAGS
            .iter()
            .chain(MsgFromPlayerToGame::TAGS)
            .copied()
            .collect();
        assert_eq!(MsgOut::TAGS, joined.as_slice());
    }

    #[test]
    fn test_inbound_tags_are_unique() {
        let mut tags = MsgIn::TAGS.to_vec();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), MsgIn::TAGS.len());
    }

    #[test]
    fn test_unknown_message_is_in_every_inbound_set() {
        assert!(MsgIn::TAGS.contains(&"UnknownMessage"));
        assert!(MsgFromGameToPlayer::TAGS.contains(&"UnknownMessage"));
    }

    #[test]
    fn test_tag_matches_serialized_key() {
        let msg = MsgFromGameToPlayer::GameEnded {
            winner: "Alice".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get(msg.tag()).is_some());
    }

    // =====================================================================
    // Wire shapes
    // =====================================================================

    #[test]
    fn test_unit_variant_serializes_as_bare_tag() {
        let json = serde_json::to_string(&MsgFromPlayerToGame::Liar).unwrap();
        assert_eq!(json, "\"Liar\"");
    }

    #[test]
    fn test_connect_json_format() {
        let msg = MsgOut::from(MsgFromPlayerToLobby::Connect {
            name: "RustBot".into(),
            uuid: "80f2fa9e-5fbd-4e73-a518-141cb0e1e2d5".into(),
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["Connect"]["name"], "RustBot");
        assert_eq!(json["Connect"]["uuid"], "80f2fa9e-5fbd-4e73-a518-141cb0e1e2d5");
    }

    #[test]
    fn test_msg_out_wrapper_is_invisible() {
        let wrapped = serde_json::to_string(&MsgOut::from(MsgFromPlayerToGame::Exactly)).unwrap();
        let bare = serde_json::to_string(&MsgFromPlayerToGame::Exactly).unwrap();
        assert_eq!(wrapped, bare);
    }

    #[test]
    fn test_round_revealed_hands_is_a_map_of_lists() {
        let msg = MsgFromGameToPlayer::Round {
            result: "Bob lost a die".into(),
            revealed_hands: HashMap::from([("Bob".to_string(), vec![1, 1, 6])]),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["Round"]["revealed_hands"]["Bob"], serde_json::json!([1, 1, 6]));
    }

    // =====================================================================
    // from_parts
    // =====================================================================

    #[test]
    fn test_from_parts_accepts_empty_fields_for_unit_variant() {
        let msg = MsgFromGameToPlayer::from_parts("GameStarted", Map::new()).unwrap();
        assert_eq!(msg, MsgFromGameToPlayer::GameStarted);
    }

    #[test]
    fn test_from_parts_rejects_empty_fields_for_struct_variant() {
        assert!(MsgFromGameToPlayer::from_parts("Turn", Map::new()).is_err());
    }

    #[test]
    fn test_msg_in_from_parts_routes_to_lobby_channel() {
        let msg = MsgIn::from_parts("AlreadyConnected", Map::new()).unwrap();
        assert_eq!(msg, MsgIn::Lobby(MsgFromLobbyToPlayer::AlreadyConnected));
    }

    // =====================================================================
    // Bids and claims
    // =====================================================================

    #[test]
    fn test_bid_accepts_bounds() {
        assert!(MsgFromPlayerToGame::bid(0, 1).is_ok());
        assert!(MsgFromPlayerToGame::bid(MAX_NUMBER, 6).is_ok());
    }

    #[test]
    fn test_bid_rejects_number_above_max() {
        let err = MsgFromPlayerToGame::bid(257, 3).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    #[test]
    fn test_bid_rejects_face_outside_die() {
        assert!(MsgFromPlayerToGame::bid(1, 0).is_err());
        assert!(MsgFromPlayerToGame::bid(1, 7).is_err());
    }

    #[test]
    fn test_claim_unset_has_no_face() {
        assert!(!Claim::UNSET.has_face());
        assert!(Claim::new(2, 5).has_face());
        assert_eq!(Claim::default(), Claim::UNSET);
    }

    #[test]
    fn test_claim_display() {
        assert_eq!(Claim::new(3, 4).to_string(), "3x4");
    }
}
