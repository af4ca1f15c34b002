//! Game sessions and room lifecycle for Flipside.
//!
//! Each room runs as an isolated Tokio task (actor model) owning one
//! [`GameSession`] — the seats, board, turn, and lifecycle status of a
//! single Othello game. The [`SessionRegistry`] owns every live room and
//! the connection→room membership index.
//!
//! # Key types
//!
//! - [`GameSession`] — the pure per-room state machine
//! - [`SessionRegistry`] — creates/destroys rooms, routes connections
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomConfig`] / [`RegistryConfig`] — retention and spectator policy

mod actor;
mod config;
mod error;
mod registry;
mod session;

pub use actor::{LeaveOutcome, MemberSender, RoomHandle, RoomInfo};
pub use config::{RegistryConfig, RoomConfig};
pub use error::RoomError;
pub use registry::SessionRegistry;
pub use session::{GameSession, MoveAccepted, Occupant, SeatOutcome};
