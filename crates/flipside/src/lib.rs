//! # Flipside
//!
//! A real-time multiplayer Othello server.
//!
//! Clients connect over WebSocket, address rooms by name, take seats,
//! and play. The server is authoritative: every move is validated
//! against the full rules before any state changes, and every member of
//! a room sees the same ordered stream of snapshots.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flipside::ServerBuilder;
//!
//! # async fn run() -> Result<(), flipside::FlipsideError> {
//! let server = ServerBuilder::new().bind("0.0.0.0:8080").build().await?;
//! server.run().await
//! # }
//! ```

mod directory;
mod error;
mod handler;
mod server;

pub use error::FlipsideError;
pub use server::{
    FlipsideServer, ServerBuilder, DEFAULT_SWEEP_INTERVAL,
};

pub use flipside_protocol as protocol;
pub use flipside_room as room;
pub use flipside_rules as rules;
