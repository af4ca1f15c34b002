//! Room actor: an isolated Tokio task that owns one [`GameSession`].
//!
//! Each room runs in its own task and communicates with the outside world
//! through an mpsc channel, so every seat change and move proposal for a
//! room is applied by exactly one task in arrival order. Broadcasts go out
//! through per-member unbounded channels; a send never blocks the actor,
//! and events pushed into one member's channel arrive in the order they
//! were pushed.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use flipside_protocol::{
    ConnectionId, RoomId, SeatResult, ServerEvent, SessionStatus,
};
use flipside_rules::{Color, Coord};
use tokio::sync::{mpsc, oneshot};

use crate::session::{GameSession, MoveAccepted, SeatOutcome};
use crate::{RoomConfig, RoomError};

/// Channel sender for delivering server events to one room member.
pub type MemberSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in some variants is a reply channel: the caller
/// sends a command and awaits the answer. Move and chat are
/// fire-and-forget; their results travel through the member channels.
pub(crate) enum RoomCommand {
    /// Seat (or admit as spectator) a connection.
    Join {
        connection: ConnectionId,
        username: String,
        sender: MemberSender,
        reply: oneshot::Sender<SeatResult>,
    },

    /// Remove a connection, vacating any held seat.
    Leave {
        connection: ConnectionId,
        reply: oneshot::Sender<LeaveOutcome>,
    },

    /// A move proposal from a connection.
    Move {
        connection: ConnectionId,
        color: Color,
        coord: Coord,
    },

    /// A chat line to relay to every member.
    Chat {
        connection: ConnectionId,
        message: String,
    },

    /// Request the current room metadata.
    Info { reply: oneshot::Sender<RoomInfo> },

    /// Shut down the room.
    Shutdown,
}

/// What a leave request changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// Whether the connection was a member at all.
    pub was_member: bool,
    /// Whether the room has no members left.
    pub now_empty: bool,
}

/// A snapshot of room metadata, used by the registry's sweep.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub status: SessionStatus,
    /// Members currently connected to the room (seated or spectating).
    pub members: usize,
    /// Occupied seats (0–2).
    pub seated: usize,
    /// Time since the session finished, if it has.
    pub finished_for: Option<Duration>,
    /// Time since the last accepted move (or since creation).
    pub idle_for: Duration,
}

/// Handle to a running room actor.
///
/// Cheap to clone — it's just an `mpsc::Sender` wrapper. The registry
/// holds one of these per room.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Asks the room to seat a connection. The returned [`SeatResult`] is
    /// the direct answer; snapshots fan out through the member channels.
    pub async fn join(
        &self,
        connection: ConnectionId,
        username: String,
        sender: MemberSender,
    ) -> Result<SeatResult, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                connection,
                username,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Asks the room to remove a connection.
    pub async fn leave(
        &self,
        connection: ConnectionId,
    ) -> Result<LeaveOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                connection,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Forwards a move proposal (fire-and-forget). The verdict — a fresh
    /// snapshot or a [`ServerEvent::Rejected`] — arrives on the member
    /// channels.
    pub async fn propose_move(
        &self,
        connection: ConnectionId,
        color: Color,
        coord: Coord,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Move {
                connection,
                color,
                coord,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Forwards a chat line (fire-and-forget).
    pub async fn chat(
        &self,
        connection: ConnectionId,
        message: String,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Chat {
                connection,
                message,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Requests the current room metadata.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// A connection present in the room.
struct Member {
    username: String,
    sender: MemberSender,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    session: GameSession,
    config: RoomConfig,
    members: HashMap<ConnectionId, Member>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room_id = %self.session.id(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    connection,
                    username,
                    sender,
                    reply,
                } => {
                    let result =
                        self.handle_join(connection, username, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { connection, reply } => {
                    let outcome = self.handle_leave(connection);
                    let _ = reply.send(outcome);
                }
                RoomCommand::Move {
                    connection,
                    color,
                    coord,
                } => {
                    self.handle_move(connection, color, coord);
                }
                RoomCommand::Chat {
                    connection,
                    message,
                } => {
                    self.handle_chat(connection, message);
                }
                RoomCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(
                        room_id = %self.session.id(),
                        "room shutting down"
                    );
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.session.id(), "room actor stopped");
    }

    fn handle_join(
        &mut self,
        connection: ConnectionId,
        username: String,
        sender: MemberSender,
    ) -> SeatResult {
        match self.session.assign_seat(connection, &username) {
            SeatOutcome::Seated(color) => {
                self.members
                    .insert(connection, Member { username, sender });
                tracing::info!(
                    room_id = %self.session.id(),
                    %connection,
                    %color,
                    members = self.members.len(),
                    "seat taken"
                );
                // Everyone, the joiner included, sees the new seating.
                self.broadcast(ServerEvent::Snapshot(self.session.snapshot()));
                SeatResult::Seated(color)
            }
            SeatOutcome::AlreadySeated(color) => {
                // Idempotent re-address: refresh the channel, resend the
                // state directly, disturb nobody else.
                self.members
                    .insert(connection, Member { username, sender });
                self.send_to(
                    connection,
                    ServerEvent::Snapshot(self.session.snapshot()),
                );
                SeatResult::Seated(color)
            }
            SeatOutcome::Full if self.config.allow_spectators => {
                self.members
                    .insert(connection, Member { username, sender });
                self.send_to(
                    connection,
                    ServerEvent::Snapshot(self.session.snapshot()),
                );
                SeatResult::Spectator
            }
            SeatOutcome::Full => {
                tracing::debug!(
                    room_id = %self.session.id(),
                    %connection,
                    "seats full, turning connection away"
                );
                SeatResult::SeatsFull
            }
        }
    }

    fn handle_leave(&mut self, connection: ConnectionId) -> LeaveOutcome {
        let Some(member) = self.members.remove(&connection) else {
            return LeaveOutcome {
                was_member: false,
                now_empty: self.members.is_empty(),
            };
        };

        let vacated = self.session.vacate_seat(connection);
        tracing::info!(
            room_id = %self.session.id(),
            %connection,
            members = self.members.len(),
            "member left"
        );

        self.broadcast(ServerEvent::MemberLeft {
            room: self.session.id().clone(),
            connection_id: connection,
            username: member.username,
        });
        if vacated.is_some() {
            self.broadcast(ServerEvent::Snapshot(self.session.snapshot()));
        }

        LeaveOutcome {
            was_member: true,
            now_empty: self.members.is_empty(),
        }
    }

    fn handle_move(
        &mut self,
        connection: ConnectionId,
        color: Color,
        coord: Coord,
    ) {
        if !self.members.contains_key(&connection) {
            tracing::warn!(
                room_id = %self.session.id(),
                %connection,
                "move from non-member, ignoring"
            );
            return;
        }

        match self
            .session
            .propose_move(connection, color, coord, Instant::now())
        {
            Ok(accepted) => {
                self.broadcast(ServerEvent::Snapshot(self.session.snapshot()));
                if let MoveAccepted::Finished(winner) = accepted {
                    self.broadcast(ServerEvent::GameOver {
                        room: self.session.id().clone(),
                        board: *self.session.board(),
                        winner,
                    });
                }
            }
            Err(reason) => {
                tracing::debug!(
                    room_id = %self.session.id(),
                    %connection,
                    %reason,
                    "move rejected"
                );
                self.send_to(
                    connection,
                    ServerEvent::Rejected {
                        room: self.session.id().clone(),
                        reason,
                    },
                );
            }
        }
    }

    fn handle_chat(&mut self, connection: ConnectionId, message: String) {
        let Some(member) = self.members.get(&connection) else {
            tracing::warn!(
                room_id = %self.session.id(),
                %connection,
                "chat from non-member, ignoring"
            );
            return;
        };
        // Echoed to everyone, the sender included.
        self.broadcast(ServerEvent::Chat {
            room: self.session.id().clone(),
            from: connection,
            username: member.username.clone(),
            message,
        });
    }

    /// Sends an event to every member. A full or closed channel means the
    /// member's connection is on its way out; the event is dropped for
    /// that member only.
    fn broadcast(&self, event: ServerEvent) {
        for member in self.members.values() {
            let _ = member.sender.send(event.clone());
        }
    }

    /// Sends an event to a single member. Silently drops if the receiver
    /// is gone.
    fn send_to(&self, connection: ConnectionId, event: ServerEvent) {
        if let Some(member) = self.members.get(&connection) {
            let _ = member.sender.send(event);
        }
    }

    fn info(&self) -> RoomInfo {
        let now = Instant::now();
        RoomInfo {
            room_id: self.session.id().clone(),
            status: self.session.status(),
            members: self.members.len(),
            seated: self.session.seated(),
            finished_for: self.session.finished_for(now),
            idle_for: self.session.idle_for(now),
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// `channel_size` bounds the command channel: if it fills up, senders
/// wait, which backpressures clients instead of the actor.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: RoomConfig,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        session: GameSession::new(room_id.clone(), Instant::now()),
        config,
        members: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
