//! Session registry: creates, tracks, and routes connections to rooms.
//!
//! The registry is the single owner of the `roomId → RoomHandle` map and
//! the `connection → room` membership index. Higher layers wrap it in one
//! lock, so creation, lookup, and destruction can never race each other
//! or the periodic sweep.

use std::collections::HashMap;

use flipside_protocol::{ConnectionId, RoomId, SeatResult};
use flipside_rules::{Color, Coord};

use crate::actor::spawn_room;
use crate::{MemberSender, RegistryConfig, RoomError, RoomHandle, RoomInfo};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Owns every live room and tracks which connection is in which room.
///
/// Room lookup is total: addressing an unknown room id creates the room.
/// A connection is in at most one room at a time; joining a second room
/// leaves the first.
pub struct SessionRegistry {
    config: RegistryConfig,

    /// Live rooms, keyed by room id.
    rooms: HashMap<RoomId, RoomHandle>,

    /// Maps each connection to the room it is currently in.
    member_rooms: HashMap<ConnectionId, RoomId>,
}

impl SessionRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            rooms: HashMap::new(),
            member_rooms: HashMap::new(),
        }
    }

    /// Returns the handle for `room_id`, spawning the room if it does not
    /// exist yet. The configured lobby admits spectators; every other
    /// room uses the registry's room settings as-is.
    fn get_or_create(&mut self, room_id: &RoomId) -> &RoomHandle {
        if !self.rooms.contains_key(room_id) {
            let mut room_config = self.config.room.clone();
            if self.config.lobby.as_ref() == Some(room_id) {
                room_config.allow_spectators = true;
            }
            let handle = spawn_room(
                room_id.clone(),
                room_config,
                DEFAULT_CHANNEL_SIZE,
            );
            self.rooms.insert(room_id.clone(), handle);
            tracing::info!(%room_id, "room created");
        }
        &self.rooms[room_id]
    }

    /// Puts a connection into a room, creating the room on first mention.
    ///
    /// Enforces the one-room-at-a-time invariant: if the connection is in
    /// a different room it leaves that room first. A `SeatsFull` answer
    /// does not make the connection a member; the caller is expected to
    /// tell the client to go elsewhere.
    pub async fn join(
        &mut self,
        connection: ConnectionId,
        room_id: RoomId,
        username: String,
        sender: MemberSender,
    ) -> Result<SeatResult, RoomError> {
        if let Some(current) = self.member_rooms.get(&connection) {
            if *current != room_id {
                let previous = current.clone();
                self.leave(connection, &previous).await?;
            }
        }

        let handle = self.get_or_create(&room_id).clone();
        let seat = handle.join(connection, username, sender).await?;

        match seat {
            SeatResult::Seated(_) | SeatResult::Spectator => {
                self.member_rooms.insert(connection, room_id);
            }
            SeatResult::SeatsFull => {}
        }
        Ok(seat)
    }

    /// Removes a connection from a room, destroying the room if it ends
    /// up with no members.
    pub async fn leave(
        &mut self,
        connection: ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), RoomError> {
        if self.member_rooms.get(&connection) != Some(room_id) {
            return Err(RoomError::NotInRoom(connection, room_id.clone()));
        }

        let outcome = match self.rooms.get(room_id) {
            Some(handle) => handle.leave(connection).await?,
            // Index said the connection was here, but the room is gone;
            // drop the stale entry.
            None => {
                self.member_rooms.remove(&connection);
                return Ok(());
            }
        };
        self.member_rooms.remove(&connection);

        if outcome.now_empty {
            self.destroy(room_id).await;
        }
        Ok(())
    }

    /// Handles a dropped connection: leaves whatever room it was in.
    /// Seats are vacated here and only here, never inferred from
    /// transport state elsewhere.
    pub async fn disconnect(&mut self, connection: ConnectionId) {
        if let Some(room_id) = self.member_rooms.get(&connection).cloned() {
            if let Err(error) = self.leave(connection, &room_id).await {
                tracing::warn!(%connection, %room_id, %error, "leave on disconnect failed");
            }
        }
    }

    /// Routes a move proposal to the room the connection addressed.
    ///
    /// Membership is checked synchronously against the index; a proposal
    /// for a room the connection is not in never reaches an actor.
    pub async fn propose_move(
        &self,
        connection: ConnectionId,
        room_id: &RoomId,
        color: Color,
        coord: Coord,
    ) -> Result<(), RoomError> {
        let handle = self.member_handle(connection, room_id)?;
        handle.propose_move(connection, color, coord).await
    }

    /// Routes a chat line to the room the connection addressed.
    pub async fn chat(
        &self,
        connection: ConnectionId,
        room_id: &RoomId,
        message: String,
    ) -> Result<(), RoomError> {
        let handle = self.member_handle(connection, room_id)?;
        handle.chat(connection, message).await
    }

    /// Looks up the handle for `room_id`, verifying the connection is a
    /// member of that exact room.
    fn member_handle(
        &self,
        connection: ConnectionId,
        room_id: &RoomId,
    ) -> Result<&RoomHandle, RoomError> {
        if self.member_rooms.get(&connection) != Some(room_id) {
            return Err(RoomError::NotInRoom(connection, room_id.clone()));
        }
        self.rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotInRoom(connection, room_id.clone()))
    }

    /// Returns the room a connection is currently in, if any.
    pub fn room_of(&self, connection: ConnectionId) -> Option<&RoomId> {
        self.member_rooms.get(&connection)
    }

    /// Returns info about a specific room, if it exists.
    pub async fn room_info(&self, room_id: &RoomId) -> Option<RoomInfo> {
        let handle = self.rooms.get(room_id)?;
        handle.info().await.ok()
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Reaps expired rooms; called periodically by the server.
    ///
    /// Destroys finished sessions whose retention grace period has
    /// lapsed, and forming rooms that have sat fully unseated past the
    /// idle timeout. Rooms that fail to answer an info query are mid
    /// shutdown and are skipped; the next sweep sees them gone.
    pub async fn sweep(&mut self) -> usize {
        let mut expired: Vec<RoomId> = Vec::new();
        for handle in self.rooms.values() {
            let Ok(info) = handle.info().await else {
                continue;
            };
            if self.is_expired(&info) {
                expired.push(info.room_id);
            }
        }

        for room_id in &expired {
            tracing::info!(%room_id, "sweeping expired room");
            self.destroy(room_id).await;
        }
        expired.len()
    }

    fn is_expired(&self, info: &RoomInfo) -> bool {
        if info
            .finished_for
            .is_some_and(|d| d >= self.config.room.finished_retention)
        {
            return true;
        }
        info.seated == 0
            && info.members == 0
            && info.idle_for >= self.config.room.forming_idle_timeout
    }

    /// Shuts a room down and removes it from the maps.
    async fn destroy(&mut self, room_id: &RoomId) {
        let Some(handle) = self.rooms.remove(room_id) else {
            return;
        };
        let _ = handle.shutdown().await;
        self.member_rooms.retain(|_, rid| rid != room_id);
        tracing::info!(%room_id, "room destroyed");
    }
}
