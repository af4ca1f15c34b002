//! Payload contracts for Flipside.
//!
//! This crate defines the language clients and the server speak:
//!
//! - **Types** ([`ClientRequest`], [`ServerEvent`], [`SessionSnapshot`],
//!   the id newtypes) — the structures that travel on the wire.
//! - **Codec** ([`Codec`], [`JsonCodec`]) — how those structures become
//!   bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong in between.
//!
//! The protocol layer sits between the transport (raw frames) and the
//! room layer (game state). It knows nothing about connections, seats, or
//! turn order — only shapes.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientRequest, ConnectionId, MoveRejection, RoomId, SeatResult,
    SeatView, SeatsView, ServerEvent, SessionSnapshot, SessionStatus,
};
