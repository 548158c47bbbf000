//! Integration tests for the TCP line transport.
//!
//! Each test binds a listener on `127.0.0.1:0` and talks to it through a
//! real loopback socket. The "raw" side of a test uses tokio's plain
//! `TcpStream` so that framing is checked byte for byte.

use perudo_transport::{
    Connection, MAX_FRAME_LEN, TcpLineConnection, TcpLineTransport, Transport, TransportError,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Binds a transport on a random port and returns it with its address.
async fn bind() -> (TcpLineTransport, String) {
    let transport = TcpLineTransport::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = transport.local_addr().expect("should have addr").to_string();
    (transport, addr)
}

#[tokio::test]
async fn test_send_appends_single_newline() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let mut raw = TcpStream::connect(&addr).await.unwrap();
    let conn = server.await.unwrap();
    assert_eq!(conn.peer_addr(), raw.local_addr().unwrap());

    conn.send(br#""GameStarted""#).await.expect("send should succeed");
    conn.close().await.expect("close should succeed");

    let mut received = Vec::new();
    raw.read_to_end(&mut received).await.unwrap();
    assert_eq!(received, b"\"GameStarted\"\n");
}

#[tokio::test]
async fn test_recv_splits_frames_and_strips_terminators() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let mut raw = TcpStream::connect(&addr).await.unwrap();
    let conn = server.await.unwrap();

    // Two frames in one write, the second with a CRLF ending.
    raw.write_all(b"\"Liar\"\n\"Exactly\"\r\n").await.unwrap();

    assert_eq!(conn.recv().await.unwrap().unwrap(), b"\"Liar\"");
    assert_eq!(conn.recv().await.unwrap().unwrap(), b"\"Exactly\"");
}

#[tokio::test]
async fn test_recv_delivers_unterminated_tail_then_none() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let mut raw = TcpStream::connect(&addr).await.unwrap();
    let conn = server.await.unwrap();

    raw.write_all(b"\"Disconnect\"").await.unwrap();
    drop(raw);

    assert_eq!(conn.recv().await.unwrap().unwrap(), b"\"Disconnect\"");
    assert!(conn.recv().await.unwrap().is_none(), "EOF should be None");
}

#[tokio::test]
async fn test_recv_returns_none_when_peer_closes() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let client = TcpLineConnection::connect(&addr).await.expect("should connect");
    let server_conn = server.await.unwrap();

    client.close().await.unwrap();
    let result = server_conn.recv().await.expect("recv should not error");
    assert!(result.is_none());
}

#[tokio::test]
async fn test_client_and_server_exchange_frames() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let client = TcpLineConnection::connect(&addr).await.expect("should connect");
    let server_conn = server.await.unwrap();
    assert_eq!(client.peer_addr().to_string(), addr);

    client.send(b"ping").await.unwrap();
    assert_eq!(server_conn.recv().await.unwrap().unwrap(), b"ping");

    server_conn.send(b"pong").await.unwrap();
    assert_eq!(client.recv().await.unwrap().unwrap(), b"pong");
}

#[tokio::test]
async fn test_send_rejects_embedded_newline() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let client = TcpLineConnection::connect(&addr).await.unwrap();
    let _server_conn = server.await.unwrap();

    let err = client.send(b"two\nframes").await.unwrap_err();
    assert!(matches!(err, TransportError::EmbeddedNewline));
}

#[tokio::test]
async fn test_send_after_close_is_shutdown() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let client = TcpLineConnection::connect(&addr).await.unwrap();
    let _server_conn = server.await.unwrap();

    client.close().await.unwrap();
    // Closing twice is a no-op.
    client.close().await.unwrap();
    let err = client.send(b"late").await.unwrap_err();
    assert!(matches!(err, TransportError::Shutdown));
}

#[tokio::test]
async fn test_connect_to_closed_port_fails() {
    // Bind then drop so the port is (almost certainly) closed.
    let (transport, addr) = bind().await;
    drop(transport);

    let result = TcpLineConnection::connect(&addr).await;
    assert!(matches!(result, Err(TransportError::ConnectFailed(_))));
}

#[tokio::test]
async fn test_recv_accepts_frame_at_limit() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let mut raw = TcpStream::connect(&addr).await.unwrap();
    let conn = server.await.unwrap().with_max_frame_len(8);

    raw.write_all(b"12345678\r\nabcdefgh\n").await.unwrap();
    assert_eq!(conn.recv().await.unwrap().unwrap(), b"12345678");
    assert_eq!(conn.recv().await.unwrap().unwrap(), b"abcdefgh");
}

#[tokio::test]
async fn test_recv_rejects_oversized_frame() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let mut raw = TcpStream::connect(&addr).await.unwrap();
    let conn = server.await.unwrap().with_max_frame_len(8);

    raw.write_all(b"123456789\n").await.unwrap();
    let err = conn.recv().await.unwrap_err();
    assert!(matches!(err, TransportError::FrameTooLong { limit: 8 }));
}

#[tokio::test]
async fn test_recv_gives_up_on_line_without_terminator() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let mut raw = TcpStream::connect(&addr).await.unwrap();
    let conn = server.await.unwrap().with_max_frame_len(16);

    // The peer keeps the stream open and never ends the line.
    raw.write_all(&[b'x'; 64]).await.unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), conn.recv())
        .await
        .expect("recv should fail instead of buffering forever");
    assert!(matches!(result, Err(TransportError::FrameTooLong { limit: 16 })));
    drop(raw);
}

#[tokio::test]
async fn test_default_limit_fits_large_frames() {
    let (mut transport, addr) = bind().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let client = TcpLineConnection::connect(&addr).await.unwrap();
    let server_conn = server.await.unwrap();

    let frame = vec![b'a'; MAX_FRAME_LEN];
    let sender = tokio::spawn(async move {
        client.send(&frame).await.unwrap();
        client
    });
    assert_eq!(server_conn.recv().await.unwrap().unwrap().len(), MAX_FRAME_LEN);
    sender.await.unwrap();
}
