//! Error types for the room layer.

use flipside_protocol::{ConnectionId, RoomId};

/// Errors that can occur during room operations.
///
/// Deliberately small: room lookups are total (an unknown room id simply
/// creates a room), so there is no "not found" class. What remains are
/// membership violations and actor-channel failures.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The connection is not a member of the room it addressed.
    #[error("connection {0} is not a member of room {1}")]
    NotInRoom(ConnectionId, RoomId),

    /// The room's command channel is closed or full.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
