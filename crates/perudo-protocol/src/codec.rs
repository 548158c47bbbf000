//! Codec trait and the JSON implementation.
//!
//! A codec turns catalog values into frame payloads and back. Framing
//! itself (the trailing `\n`) belongs to the transport; a codec only ever
//! sees the bytes between two newlines.
//!
//! Decoding is split in two:
//!
//! - [`Codec::try_decode`] reports *why* a frame didn't match, and works for
//!   any [`Catalog`], outbound ones included.
//! - [`Codec::decode`] is total. It only targets [`Inbound`] sets and folds
//!   every failure into that set's `UnknownMessage`, so a receive loop
//!   never has an error path for bad input.

use serde_json::{Map, Value};

use crate::{Catalog, Inbound, ProtocolError};

/// Prefix of every diagnostic produced by a local decode failure, so they
/// can be told apart from `UnknownMessage`s the server sends us.
pub const LOCAL_DIAGNOSTIC_PREFIX: &str = "client side: ";

/// Converts catalog values to frame payloads and back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a message into a single frame payload (no terminator).
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Catalog>(&self, msg: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Resolves a frame payload against the catalog `T`.
    ///
    /// # Errors
    /// - `Decode` if the payload is not JSON or the fields don't fit the
    ///   variant,
    /// - `MalformedFrame` if the JSON has the wrong shape,
    /// - `UnknownTag` if the tag isn't one of `T::TAGS`.
    fn try_decode<T: Catalog>(&self, frame: &[u8]) -> Result<T, ProtocolError>;

    /// Resolves a frame payload against the inbound set `T`. Never fails.
    ///
    /// Anything [`try_decode`](Self::try_decode) rejects comes back as
    /// `UnknownMessage`, with the error text as its `message`.
    fn decode<T: Inbound>(&self, frame: &[u8]) -> T {
        self.try_decode(frame)
            .unwrap_or_else(|err| T::unknown(format!("{LOCAL_DIAGNOSTIC_PREFIX}{err}")))
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] for the newline-delimited JSON protocol the game server
/// speaks.
///
/// Zero-field variants are written as the bare tag string. On decode both
/// `"Tag"` and `{"Tag": {}}` are accepted.
///
/// ## Example
///
/// ```rust
/// use perudo_protocol::{Codec, JsonCodec, MsgFromGameToPlayer, MsgIn};
///
/// let codec = JsonCodec;
///
/// let msg: MsgIn = codec.decode(br#"{"GameEnded": {"winner": "Alice"}}"#);
/// assert_eq!(
///     msg,
///     MsgIn::Game(MsgFromGameToPlayer::GameEnded { winner: "Alice".into() })
/// );
///
/// // Garbage is data, not an error.
/// let msg: MsgIn = codec.decode(b"not json at all");
/// assert!(matches!(msg, MsgIn::Game(MsgFromGameToPlayer::UnknownMessage { .. })));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Catalog>(&self, msg: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(msg).map_err(ProtocolError::Encode)
    }

    fn try_decode<T: Catalog>(&self, frame: &[u8]) -> Result<T, ProtocolError> {
        let value: Value = serde_json::from_slice(frame).map_err(ProtocolError::Decode)?;
        let (tag, fields) = split_frame(value)?;

        // Linear scan of the registry. Tags are unique within a set, so the
        // first hit is the only hit.
        let Some(known) = T::TAGS.iter().copied().find(|known| *known == tag) else {
            return Err(ProtocolError::UnknownTag {
                tag,
                target: T::NAME,
            });
        };

        T::from_parts(known, fields).map_err(ProtocolError::Decode)
    }
}

/// Splits a parsed frame into `(tag, fields)`.
///
/// A bare string is a tag with no fields; a single-key object maps the
/// tag to its field object (`null` counts as empty).
fn split_frame(value: Value) -> Result<(String, Map<String, Value>), ProtocolError> {
    match value {
        Value::String(tag) => Ok((tag, Map::new())),
        Value::Object(map) if map.len() == 1 => match map.into_iter().next() {
            Some((tag, Value::Object(fields))) => Ok((tag, fields)),
            Some((tag, Value::Null)) => Ok((tag, Map::new())),
            Some((tag, fields)) => {
                let mut frame = Map::with_capacity(1);
                frame.insert(tag, fields);
                Err(ProtocolError::MalformedFrame(Value::Object(frame).to_string()))
            }
            None => Err(ProtocolError::MalformedFrame("{}".into())),
        },
        other => Err(ProtocolError::MalformedFrame(other.to_string())),
    }
}
