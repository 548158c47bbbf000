/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Opening a connection to the server failed.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// Writing a frame failed; the connection is most likely broken.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// A line grew past the frame size limit without a `\n`. The rest of
    /// the stream can't be framed reliably after this.
    #[error("frame exceeds {limit} bytes")]
    FrameTooLong { limit: usize },

    /// The payload contains a `\n`, which would split it into two frames.
    #[error("frame contains a newline")]
    EmbeddedNewline,

    /// The write half was already shut down by `close()`.
    #[error("transport shut down")]
    Shutdown,
}
