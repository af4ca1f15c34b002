//! Transport abstraction layer for Flipside.
//!
//! Provides the [`Transport`] and [`Connection`] traits that separate the
//! game server from the concrete network protocol, plus the WebSocket
//! implementation the server runs in production.
//!
//! Connection identity lives in `flipside-protocol` ([`ConnectionId`]):
//! the id a transport mints here is the same opaque value clients later
//! see in `Welcome` events and seat views.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

pub use flipside_protocol::ConnectionId;

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// The local address the transport is listening on.
    fn local_addr(&self) -> Result<std::net::SocketAddr, Self::Error>;
}

/// A single connection that can send and receive protocol payloads.
///
/// Send and receive are independently lockable: a writer task may pump
/// outbound events while a reader task sits in [`Connection::recv`].
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends an encoded payload to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next payload from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
