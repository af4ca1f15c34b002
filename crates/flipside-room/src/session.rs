//! The authoritative state of one game: seats, board, turn, lifecycle.
//!
//! `GameSession` is a plain synchronous state machine. It never touches
//! a socket or a clock of its own — callers pass `Instant::now()` in —
//! so the whole turn contract is testable without an executor. The room
//! actor owns exactly one `GameSession` and serializes all access to it.

use std::time::{Duration, Instant};

use flipside_protocol::{
    ConnectionId, MoveRejection, RoomId, SeatView, SeatsView,
    SessionSnapshot, SessionStatus,
};
use flipside_rules::{Board, Color, Coord, Outcome, CELLS};

/// Accepted moves that fill the board, given the four starting discs.
const MOVES_TO_FILL: u32 = (CELLS - 4) as u32;

/// A connection holding a seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupant {
    pub connection: ConnectionId,
    pub username: String,
}

/// The result of a seat-assignment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatOutcome {
    /// The connection took this seat just now.
    Seated(Color),
    /// The connection already held this seat; nothing changed.
    AlreadySeated(Color),
    /// Both seats are held by other connections.
    Full,
}

/// The result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveAccepted {
    /// The move was applied and play continues.
    Played,
    /// The move was applied and ended the game. The session transitioned
    /// to Finished exactly once; the caller should emit its game-over
    /// notification now and never again.
    Finished(Outcome),
}

/// One room's authoritative game state.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: RoomId,
    light: Option<Occupant>,
    dark: Option<Occupant>,
    board: Board,
    turn: Color,
    status: SessionStatus,
    last_move_at: Instant,
    finished_at: Option<Instant>,
    move_count: u32,
    outcome: Option<Outcome>,
}

impl GameSession {
    /// Creates a fresh Forming session with the standard start board and
    /// Dark to move first.
    pub fn new(id: RoomId, now: Instant) -> Self {
        Self {
            id,
            light: None,
            dark: None,
            board: Board::standard_start(),
            turn: Color::Dark,
            status: SessionStatus::Forming,
            last_move_at: now,
            finished_at: None,
            move_count: 0,
            outcome: None,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// The occupant of the given seat, if any.
    pub fn seat(&self, color: Color) -> Option<&Occupant> {
        match color {
            Color::Light => self.light.as_ref(),
            Color::Dark => self.dark.as_ref(),
        }
    }

    /// The seat held by `connection`, if any.
    pub fn seat_of(&self, connection: ConnectionId) -> Option<Color> {
        for color in [Color::Light, Color::Dark] {
            if self
                .seat(color)
                .is_some_and(|o| o.connection == connection)
            {
                return Some(color);
            }
        }
        None
    }

    /// Number of occupied seats (0–2).
    pub fn seated(&self) -> usize {
        usize::from(self.light.is_some()) + usize::from(self.dark.is_some())
    }

    /// Returns `true` when both seats are empty.
    pub fn is_unseated(&self) -> bool {
        self.light.is_none() && self.dark.is_none()
    }

    /// Time since the last accepted move (or since creation).
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_move_at)
    }

    /// Time since the session finished, if it has.
    pub fn finished_for(&self, now: Instant) -> Option<Duration> {
        self.finished_at
            .map(|at| now.saturating_duration_since(at))
    }

    /// Seats a connection, first-come: the first distinct connection takes
    /// Light, the second takes Dark, later ones are told the seats are
    /// full. Re-seating an occupant is idempotent — same color back, no
    /// displacement. Occupying the second seat moves the session from
    /// Forming to InProgress.
    pub fn assign_seat(
        &mut self,
        connection: ConnectionId,
        username: &str,
    ) -> SeatOutcome {
        if let Some(color) = self.seat_of(connection) {
            return SeatOutcome::AlreadySeated(color);
        }

        let color = if self.light.is_none() {
            Color::Light
        } else if self.dark.is_none() {
            Color::Dark
        } else {
            return SeatOutcome::Full;
        };

        let occupant = Occupant {
            connection,
            username: username.to_string(),
        };
        match color {
            Color::Light => self.light = Some(occupant),
            Color::Dark => self.dark = Some(occupant),
        }

        if self.status == SessionStatus::Forming && self.seated() == 2 {
            self.status = SessionStatus::InProgress;
            tracing::info!(room_id = %self.id, "game started");
        }
        SeatOutcome::Seated(color)
    }

    /// Clears the seat held by `connection`, if any. Returns the vacated
    /// color. Seats are only ever vacated through this explicit call,
    /// never inferred from transport state.
    pub fn vacate_seat(&mut self, connection: ConnectionId) -> Option<Color> {
        let color = self.seat_of(connection)?;
        match color {
            Color::Light => self.light = None,
            Color::Dark => self.dark = None,
        }
        tracing::debug!(room_id = %self.id, %connection, %color, "seat vacated");
        Some(color)
    }

    /// Applies a move proposal against the turn contract.
    ///
    /// Checks run in a fixed order — lifecycle, turn, seat, legality —
    /// and the first failure determines the rejection; later checks are
    /// never evaluated. On success the board is replaced and the turn
    /// passes to the opponent, or stays with the mover when the opponent
    /// has no legal reply. When neither side can move the terminal state
    /// is detected and latched.
    pub fn propose_move(
        &mut self,
        requester: ConnectionId,
        color: Color,
        coord: Coord,
        now: Instant,
    ) -> Result<MoveAccepted, MoveRejection> {
        match self.status {
            SessionStatus::Finished => {
                return Err(MoveRejection::GameAlreadyOver);
            }
            SessionStatus::Forming => {
                return Err(MoveRejection::GameNotStarted);
            }
            SessionStatus::InProgress => {}
        }
        if color != self.turn {
            return Err(MoveRejection::WrongTurn);
        }
        let seated = self
            .seat(color)
            .is_some_and(|o| o.connection == requester);
        if !seated {
            return Err(MoveRejection::WrongPlayer);
        }
        let next = self
            .board
            .apply_move(color, coord)
            .map_err(|_| MoveRejection::IllegalMove)?;

        self.board = next;
        self.last_move_at = now;
        self.move_count += 1;

        // Every accepted move adds exactly one disc, so the counter
        // hitting MOVES_TO_FILL means a full board with no move scan.
        // Otherwise the opponent moves next unless they have no legal
        // reply, in which case the turn stays with the mover (a forced
        // pass). Neither side able to move ends the game.
        if self.move_count < MOVES_TO_FILL {
            if self.board.has_legal_move(color.opposite()) {
                self.turn = color.opposite();
                return Ok(MoveAccepted::Played);
            }
            if self.board.has_legal_move(color) {
                self.turn = color;
                return Ok(MoveAccepted::Played);
            }
        }

        let outcome = self.board.winner();
        self.status = SessionStatus::Finished;
        self.outcome = Some(outcome);
        self.finished_at = Some(now);
        tracing::info!(
            room_id = %self.id,
            moves = self.move_count,
            winner = ?outcome,
            "game finished"
        );
        Ok(MoveAccepted::Finished(outcome))
    }

    /// The complete externally-visible state at this instant. Snapshots
    /// are taken after every seat change and accepted move; nothing
    /// mid-mutation is ever exposed.
    pub fn snapshot(&self) -> SessionSnapshot {
        let seat_view = |occupant: &Option<Occupant>| {
            occupant.as_ref().map(|o| SeatView {
                connection: o.connection,
                username: o.username.clone(),
            })
        };
        SessionSnapshot {
            room: self.id.clone(),
            seats: SeatsView {
                light: seat_view(&self.light),
                dark: seat_view(&self.dark),
            },
            board: self.board,
            turn: self.turn,
            status: self.status,
            winner: self.outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId(id)
    }

    fn session() -> GameSession {
        GameSession::new(RoomId::new("test"), Instant::now())
    }

    /// Both players seated: first → Light, second → Dark.
    fn seated_session() -> GameSession {
        let mut s = session();
        assert_eq!(
            s.assign_seat(conn(1), "ada"),
            SeatOutcome::Seated(Color::Light)
        );
        assert_eq!(
            s.assign_seat(conn(2), "grace"),
            SeatOutcome::Seated(Color::Dark)
        );
        s
    }

    #[test]
    fn test_fresh_session_is_forming_with_dark_to_move() {
        let s = session();
        assert_eq!(s.status(), SessionStatus::Forming);
        assert_eq!(s.turn(), Color::Dark);
        assert_eq!(s.board(), &Board::standard_start());
        assert_eq!(s.move_count(), 0);
    }

    #[test]
    fn test_seat_order_is_light_then_dark() {
        let mut s = session();
        assert_eq!(
            s.assign_seat(conn(1), "ada"),
            SeatOutcome::Seated(Color::Light)
        );
        assert_eq!(s.status(), SessionStatus::Forming);
        assert_eq!(
            s.assign_seat(conn(2), "grace"),
            SeatOutcome::Seated(Color::Dark)
        );
        assert_eq!(s.status(), SessionStatus::InProgress);
    }

    #[test]
    fn test_seating_is_idempotent() {
        let mut s = seated_session();
        // Re-addressing by a seated connection: same color, no
        // displacement of the other seat.
        assert_eq!(
            s.assign_seat(conn(1), "ada"),
            SeatOutcome::AlreadySeated(Color::Light)
        );
        assert_eq!(s.seat(Color::Dark).unwrap().connection, conn(2));
    }

    #[test]
    fn test_third_connection_gets_full() {
        let mut s = seated_session();
        assert_eq!(s.assign_seat(conn(3), "eve"), SeatOutcome::Full);
        // No seat state mutated.
        assert_eq!(s.seat(Color::Light).unwrap().connection, conn(1));
        assert_eq!(s.seat(Color::Dark).unwrap().connection, conn(2));
    }

    #[test]
    fn test_opening_move_accepted_and_turn_alternates() {
        let mut s = seated_session();
        let accepted = s
            .propose_move(conn(2), Color::Dark, Coord::new(2, 3), Instant::now())
            .unwrap();
        assert_eq!(accepted, MoveAccepted::Played);
        assert_eq!(s.turn(), Color::Light);
        assert_eq!(s.move_count(), 1);
        // The captured disc flipped.
        assert_eq!(
            s.board().cell(Coord::new(3, 3)),
            Some(flipside_rules::Cell::Disc(Color::Dark))
        );
    }

    #[test]
    fn test_turn_strictly_alternates_over_a_game_prefix() {
        let mut s = seated_session();
        let players = [(conn(2), Color::Dark), (conn(1), Color::Light)];
        for i in 0..6 {
            let (who, color) = players[i % 2];
            assert_eq!(s.turn(), color);
            let coord = *s.board().legal_moves(color).first().unwrap();
            s.propose_move(who, color, coord, Instant::now()).unwrap();
        }
        assert_eq!(s.move_count(), 6);
    }

    #[test]
    fn test_move_before_both_seated_is_game_not_started() {
        let mut s = session();
        s.assign_seat(conn(1), "ada");
        let err = s
            .propose_move(conn(1), Color::Dark, Coord::new(2, 3), Instant::now())
            .unwrap_err();
        assert_eq!(err, MoveRejection::GameNotStarted);
        assert_eq!(s.board(), &Board::standard_start());
    }

    #[test]
    fn test_off_turn_color_is_wrong_turn() {
        // Scenario: the Light-seat player proposes a Light move while it
        // is Dark's turn.
        let mut s = seated_session();
        let err = s
            .propose_move(conn(1), Color::Light, Coord::new(2, 4), Instant::now())
            .unwrap_err();
        assert_eq!(err, MoveRejection::WrongTurn);
        assert_eq!(s.board(), &Board::standard_start());
        assert_eq!(s.turn(), Color::Dark);
    }

    #[test]
    fn test_wrong_turn_wins_over_wrong_player() {
        // An off-turn color claimed by a connection that doesn't even hold
        // that seat: the turn check fires first per the fixed order.
        let mut s = seated_session();
        let err = s
            .propose_move(conn(1), Color::Light, Coord::new(2, 4), Instant::now())
            .unwrap_err();
        assert_eq!(err, MoveRejection::WrongTurn);
        // conn(1) holds Light, so this is also a WrongTurn-then-WrongPlayer
        // stack for conn(3):
        let err = s
            .propose_move(conn(3), Color::Light, Coord::new(2, 4), Instant::now())
            .unwrap_err();
        assert_eq!(err, MoveRejection::WrongTurn);
    }

    #[test]
    fn test_right_color_wrong_connection_is_wrong_player() {
        let mut s = seated_session();
        // conn(1) holds Light but claims Dark, whose turn it is.
        let err = s
            .propose_move(conn(1), Color::Dark, Coord::new(2, 3), Instant::now())
            .unwrap_err();
        assert_eq!(err, MoveRejection::WrongPlayer);
        // An entirely unknown connection is treated the same way.
        let err = s
            .propose_move(conn(9), Color::Dark, Coord::new(2, 3), Instant::now())
            .unwrap_err();
        assert_eq!(err, MoveRejection::WrongPlayer);
    }

    #[test]
    fn test_illegal_placement_is_rejected_last() {
        let mut s = seated_session();
        let err = s
            .propose_move(conn(2), Color::Dark, Coord::new(0, 0), Instant::now())
            .unwrap_err();
        assert_eq!(err, MoveRejection::IllegalMove);
        let err = s
            .propose_move(conn(2), Color::Dark, Coord::new(3, 3), Instant::now())
            .unwrap_err();
        assert_eq!(err, MoveRejection::IllegalMove);
        assert_eq!(s.move_count(), 0);
    }

    #[test]
    fn test_finishing_move_latches_outcome() {
        // A nearly-settled board: one empty cell left, and filling it
        // leaves no legal continuation. The session must latch Finished
        // and the outcome exactly once.
        let mut s = seated_session();
        let board: Board = "
            .oxxxxxx
            xxxxxxxx
            xxxxxxxx
            xxxxxxxx
            xxxxxxxx
            xxxxxxxx
            xxxxxxxx
            xxxxxxxx
        "
        .parse()
        .unwrap();
        s.board = board;
        s.turn = Color::Dark;
        // 63 discs placed means 59 accepted moves since the start
        // position; the 60th fills the board and must finish the game
        // off the move counter alone.
        s.move_count = MOVES_TO_FILL - 1;

        let accepted = s
            .propose_move(conn(2), Color::Dark, Coord::new(0, 0), Instant::now())
            .unwrap();
        assert_eq!(accepted, MoveAccepted::Finished(Outcome::Dark));
        assert_eq!(s.status(), SessionStatus::Finished);
        assert_eq!(s.outcome(), Some(Outcome::Dark));
        assert_eq!(s.move_count(), MOVES_TO_FILL);
        assert_eq!(s.board().occupied(), 64);

        // Any further proposal is rejected before everything else.
        let err = s
            .propose_move(conn(1), Color::Light, Coord::new(0, 0), Instant::now())
            .unwrap_err();
        assert_eq!(err, MoveRejection::GameAlreadyOver);
        assert_eq!(s.outcome(), Some(Outcome::Dark));
    }

    #[test]
    fn test_turn_stays_with_mover_when_opponent_cannot_reply() {
        // After Dark plays (0,3), Light still owns (7,7) but has no
        // capture anywhere, while Dark can still play (5,3). The turn
        // must stay with Dark rather than deadlocking on Light.
        let mut s = seated_session();
        s.board = "
            .xo.....
            ........
            ........
            ........
            ........
            xoo.....
            ........
            .......o
        "
        .parse()
        .unwrap();
        s.turn = Color::Dark;

        let accepted = s
            .propose_move(conn(2), Color::Dark, Coord::new(0, 3), Instant::now())
            .unwrap();
        assert_eq!(accepted, MoveAccepted::Played);
        assert_eq!(s.turn(), Color::Dark);

        // Dark's follow-up leaves neither side a move: game over with
        // the board far from full.
        let accepted = s
            .propose_move(conn(2), Color::Dark, Coord::new(5, 3), Instant::now())
            .unwrap();
        assert_eq!(accepted, MoveAccepted::Finished(Outcome::Dark));
        assert_eq!(s.status(), SessionStatus::Finished);
        assert!(s.board().occupied() < 64);
    }

    #[test]
    fn test_vacate_and_reseat() {
        let mut s = seated_session();
        assert_eq!(s.vacate_seat(conn(1)), Some(Color::Light));
        assert!(!s.is_unseated());
        assert_eq!(s.vacate_seat(conn(2)), Some(Color::Dark));
        assert!(s.is_unseated());
        // Vacating a non-member is a no-op.
        assert_eq!(s.vacate_seat(conn(3)), None);
        // A newcomer takes the first open seat in fixed order.
        assert_eq!(
            s.assign_seat(conn(3), "eve"),
            SeatOutcome::Seated(Color::Light)
        );
    }

    #[test]
    fn test_snapshot_reflects_seats_and_winner() {
        let mut s = seated_session();
        let snap = s.snapshot();
        assert_eq!(snap.status, SessionStatus::InProgress);
        assert_eq!(snap.seats.light.as_ref().unwrap().username, "ada");
        assert_eq!(snap.seats.dark.as_ref().unwrap().username, "grace");
        assert_eq!(snap.winner, None);

        s.vacate_seat(conn(2));
        let snap = s.snapshot();
        assert!(snap.seats.dark.is_none());
    }

    #[test]
    fn test_idle_and_finished_durations() {
        let t0 = Instant::now();
        let mut s = GameSession::new(RoomId::new("t"), t0);
        s.assign_seat(conn(1), "ada");
        s.assign_seat(conn(2), "grace");
        assert_eq!(s.finished_for(t0), None);

        let t1 = t0 + Duration::from_secs(5);
        s.propose_move(conn(2), Color::Dark, Coord::new(2, 3), t1)
            .unwrap();
        assert_eq!(s.idle_for(t1 + Duration::from_secs(10)), Duration::from_secs(10));
    }
}
