//! Unified error type for the Flipside server.

use flipside_protocol::ProtocolError;
use flipside_room::RoomError;
use flipside_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum FlipsideError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (membership, actor channel).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipside_protocol::{ConnectionId, RoomId};

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let top: FlipsideError = err.into();
        assert!(matches!(top, FlipsideError::Transport(_)));
        assert!(top.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let top: FlipsideError = err.into();
        assert!(matches!(top, FlipsideError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err =
            RoomError::NotInRoom(ConnectionId(1), RoomId::new("g1"));
        let top: FlipsideError = err.into();
        assert!(matches!(top, FlipsideError::Room(_)));
    }
}
