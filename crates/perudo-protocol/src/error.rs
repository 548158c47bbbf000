//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum. A
//! `ProtocolError` always means the problem is in the message format, not
//! in networking or in the bot's decisions.
//!
//! Decoding an inbound frame never surfaces one of these to the caller:
//! [`Codec::decode`](crate::Codec::decode) folds every failure into an
//! `UnknownMessage` value whose text is this error's `Display` output.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into JSON).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The frame is not JSON, or a variant's fields have the wrong
    /// names or types.
    ///
    /// The inner `serde_json::Error` is kept as-is so its line/column
    /// information ends up in the diagnostic.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame is valid JSON but neither a bare tag string nor a
    /// single-key object.
    #[error("malformed frame: `{0}` is not a tag string or a single-key object")]
    MalformedFrame(String),

    /// The tag is not part of the set being decoded.
    #[error("unknown tag `{tag}` for {target}")]
    UnknownTag {
        /// The tag as it appeared on the wire.
        tag: String,
        /// Name of the decode target set that was searched.
        target: &'static str,
    },

    /// The message violates a protocol rule even though it is well-formed,
    /// e.g. a bid with face 7.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
