//! Payload contracts between clients and the Flipside server.
//!
//! These are the structures that travel on the wire: requests a client may
//! send, events the server fans out, and the session snapshot that carries
//! the complete externally-visible state of one room. Field sets are the
//! contract; the byte format is whatever the configured [`Codec`]
//! produces (JSON by default).
//!
//! [`Codec`]: crate::Codec

use std::fmt;

use serde::{Deserialize, Serialize};

use flipside_rules::{Board, Color, Outcome};

/// A unique, opaque identifier for a connected client.
///
/// Newtype over `u64` so connection ids cannot be confused with other
/// numeric fields. `#[serde(transparent)]` keeps the wire shape a plain
/// number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A room identifier. Rooms are addressed by name: any string a client
/// sends names a room, and an unknown name simply creates one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The lifecycle state of a game session.
///
/// ```text
/// Forming → InProgress → Finished
/// ```
///
/// - **Forming**: fewer than two seated players; only seat-assignment
///   events are accepted.
/// - **InProgress**: both seats occupied; move proposals are accepted.
/// - **Finished**: terminal board reached; the outcome is fixed and no
///   further mutation is possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Forming,
    InProgress,
    Finished,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forming => write!(f, "forming"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// The answer to a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "color", rename_all = "snake_case")]
pub enum SeatResult {
    /// The connection now holds (or already held) the seat for this color.
    Seated(Color),
    /// Both seats are taken but the room admits spectators.
    Spectator,
    /// Both seats are taken and the room does not admit spectators; the
    /// connection is asked to leave.
    SeatsFull,
}

/// Why a move proposal was rejected. Reasons are mutually exclusive: the
/// checks run in a fixed order and the first failure wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error,
)]
#[serde(rename_all = "snake_case")]
pub enum MoveRejection {
    /// The room has fewer than two seated players.
    #[error("the game has not started")]
    GameNotStarted,

    /// The session is finished; the outcome is fixed.
    #[error("the game is already over")]
    GameAlreadyOver,

    /// The claimed color is not the color to move.
    #[error("it is not that color's turn")]
    WrongTurn,

    /// The requester does not hold the seat for the claimed color.
    #[error("move did not come from the seated player for that color")]
    WrongPlayer,

    /// The placement violates the capture rules.
    #[error("that placement is not a legal move")]
    IllegalMove,
}

/// A seated player as seen in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub connection: ConnectionId,
    pub username: String,
}

/// Both seats of a room. `None` means the seat is unoccupied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatsView {
    pub light: Option<SeatView>,
    pub dark: Option<SeatView>,
}

/// The complete externally-visible state of one game session at one
/// instant. This is the unit of broadcast: one snapshot per seat change
/// or accepted move, delivered to every room member in event order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub room: RoomId,
    pub seats: SeatsView,
    /// 8×8 grid of `"empty" | "light" | "dark"`, row-major.
    pub board: Board,
    pub turn: Color,
    pub status: SessionStatus,
    /// Present once the session is finished, absent before.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Outcome>,
}

/// Requests a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRequest {
    /// Enter a room (creating it if it does not exist) under a display
    /// name, taking a seat if one is open.
    JoinRoom { room: RoomId, username: String },

    /// Propose placing a disc of `color` at `(row, col)`.
    ProposeMove {
        room: RoomId,
        row: usize,
        col: usize,
        color: Color,
    },

    /// Leave a room, vacating any held seat.
    LeaveRoom { room: RoomId },

    /// Send a chat line to everyone in the room.
    Chat { room: RoomId, message: String },

    /// Invite another connection to play.
    Invite { to: ConnectionId },

    /// Withdraw a previous invitation.
    Uninvite { to: ConnectionId },

    /// Agree to start a game with a connection that invited us. The
    /// server mints a match id both sides then join as a room.
    StartGame { to: ConnectionId },
}

/// Events the server sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// First event on every connection: the id the server will know this
    /// client by.
    Welcome { connection_id: ConnectionId },

    /// Direct answer to a join request.
    Joined { room: RoomId, seat: SeatResult },

    /// Broadcast to the room on every seat change and accepted move.
    Snapshot(SessionSnapshot),

    /// Broadcast exactly once per session, at the transition to Finished.
    GameOver {
        room: RoomId,
        board: Board,
        winner: Outcome,
    },

    /// A rejected move proposal. Sent to the requester only, never
    /// broadcast.
    Rejected { room: RoomId, reason: MoveRejection },

    /// A relayed chat line.
    Chat {
        room: RoomId,
        from: ConnectionId,
        username: String,
        message: String,
    },

    /// Another connection invited this one to play.
    Invited { from: ConnectionId, username: String },

    /// A previous invitation was withdrawn.
    Uninvited { from: ConnectionId },

    /// An invitation was accepted; both sides should join the room named
    /// by `match_id`.
    GameStarting {
        match_id: String,
        opponent: ConnectionId,
    },

    /// A member left the room (or disconnected).
    MemberLeft {
        room: RoomId,
        connection_id: ConnectionId,
        username: String,
    },

    /// The request could not be understood. Sent to the requester only.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    //! The wire contract defines exact JSON shapes; these tests pin the
    //! serde attributes so a client cannot be broken by an accidental
    //! rename.

    use super::*;
    use flipside_rules::Coord;

    #[test]
    fn test_connection_id_is_a_plain_number() {
        assert_eq!(
            serde_json::to_string(&ConnectionId(42)).unwrap(),
            "42"
        );
        let id: ConnectionId = serde_json::from_str("42").unwrap();
        assert_eq!(id, ConnectionId(42));
    }

    #[test]
    fn test_room_id_is_a_plain_string() {
        let id = RoomId::new("lobby");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"lobby\"");
    }

    #[test]
    fn test_client_request_join_room_shape() {
        let json = r#"{"type":"join_room","room":"lobby","username":"ada"}"#;
        let req: ClientRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            req,
            ClientRequest::JoinRoom {
                room: RoomId::new("lobby"),
                username: "ada".into(),
            }
        );
    }

    #[test]
    fn test_client_request_propose_move_shape() {
        let json =
            r#"{"type":"propose_move","room":"g1","row":2,"col":3,"color":"dark"}"#;
        let req: ClientRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            req,
            ClientRequest::ProposeMove {
                room: RoomId::new("g1"),
                row: 2,
                col: 3,
                color: Color::Dark,
            }
        );
    }

    #[test]
    fn test_unknown_request_type_fails() {
        let json = r#"{"type":"fly_to_moon","speed":9000}"#;
        assert!(serde_json::from_str::<ClientRequest>(json).is_err());
    }

    #[test]
    fn test_seat_result_shapes() {
        let seated = serde_json::to_value(SeatResult::Seated(Color::Light))
            .unwrap();
        assert_eq!(seated["kind"], "seated");
        assert_eq!(seated["color"], "light");

        let full = serde_json::to_value(SeatResult::SeatsFull).unwrap();
        assert_eq!(full["kind"], "seats_full");
    }

    #[test]
    fn test_move_rejection_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&MoveRejection::WrongTurn).unwrap(),
            "\"wrong_turn\""
        );
        assert_eq!(
            serde_json::to_string(&MoveRejection::GameAlreadyOver).unwrap(),
            "\"game_already_over\""
        );
    }

    #[test]
    fn test_snapshot_board_is_a_grid_of_strings() {
        let snapshot = SessionSnapshot {
            room: RoomId::new("g1"),
            seats: SeatsView::default(),
            board: Board::standard_start(),
            turn: Color::Dark,
            status: SessionStatus::Forming,
            winner: None,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["board"][3][3], "light");
        assert_eq!(json["board"][3][4], "dark");
        assert_eq!(json["board"][0][0], "empty");
        assert_eq!(json["turn"], "dark");
        assert_eq!(json["status"], "forming");
        // Winner is omitted entirely until the game finishes.
        assert!(json.get("winner").is_none());
    }

    #[test]
    fn test_snapshot_event_round_trip() {
        let board = Board::standard_start()
            .apply_move(Color::Dark, Coord::new(2, 3))
            .unwrap();
        let event = ServerEvent::Snapshot(SessionSnapshot {
            room: RoomId::new("g1"),
            seats: SeatsView {
                light: Some(SeatView {
                    connection: ConnectionId(1),
                    username: "ada".into(),
                }),
                dark: Some(SeatView {
                    connection: ConnectionId(2),
                    username: "grace".into(),
                }),
            },
            board,
            turn: Color::Light,
            status: SessionStatus::InProgress,
            winner: None,
        });
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_game_over_event_shape() {
        let event = ServerEvent::GameOver {
            room: RoomId::new("g1"),
            board: Board::standard_start(),
            winner: Outcome::Draw,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "game_over");
        assert_eq!(json["winner"], "draw");
    }

    #[test]
    fn test_rejected_event_round_trip() {
        let event = ServerEvent::Rejected {
            room: RoomId::new("g1"),
            reason: MoveRejection::WrongPlayer,
        };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_invite_events_round_trip() {
        for event in [
            ServerEvent::Invited {
                from: ConnectionId(3),
                username: "ada".into(),
            },
            ServerEvent::Uninvited { from: ConnectionId(3) },
            ServerEvent::GameStarting {
                match_id: "a3f2".into(),
                opponent: ConnectionId(3),
            },
        ] {
            let bytes = serde_json::to_vec(&event).unwrap();
            let decoded: ServerEvent =
                serde_json::from_slice(&bytes).unwrap();
            assert_eq!(event, decoded);
        }
    }
}
