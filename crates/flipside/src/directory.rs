//! Connection directory: who is online, and who has invited whom.
//!
//! Invitations are a server-wide concern rather than a room concern — a
//! player in the lobby invites another connection by id, and the match
//! they agree on becomes a brand-new room. The directory owns the
//! connection→outbox map that makes those cross-room deliveries possible.

use std::collections::{HashMap, HashSet};

use flipside_protocol::{ConnectionId, ServerEvent};
use flipside_room::MemberSender;

struct Entry {
    /// Display name from the connection's most recent room join. Absent
    /// until the client has joined a room under a name.
    username: Option<String>,
    sender: MemberSender,
}

/// Tracks every live connection's outbox and the set of pending
/// invitations between connections.
#[derive(Default)]
pub(crate) struct Directory {
    entries: HashMap<ConnectionId, Entry>,
    /// Pending invitations, directed `(from, to)`.
    invites: HashSet<(ConnectionId, ConnectionId)>,
}

impl Directory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection and its outbox.
    pub(crate) fn register(
        &mut self,
        connection: ConnectionId,
        sender: MemberSender,
    ) {
        self.entries.insert(
            connection,
            Entry {
                username: None,
                sender,
            },
        );
    }

    /// Drops a connection and every invitation it is a party to.
    pub(crate) fn unregister(&mut self, connection: ConnectionId) {
        self.entries.remove(&connection);
        self.invites
            .retain(|(from, to)| *from != connection && *to != connection);
    }

    pub(crate) fn set_username(
        &mut self,
        connection: ConnectionId,
        username: &str,
    ) {
        if let Some(entry) = self.entries.get_mut(&connection) {
            entry.username = Some(username.to_string());
        }
    }

    pub(crate) fn username_of(
        &self,
        connection: ConnectionId,
    ) -> Option<&str> {
        self.entries
            .get(&connection)?
            .username
            .as_deref()
    }

    /// Pushes an event into a connection's outbox. Returns `false` when
    /// the connection is unknown or its outbox is closed.
    pub(crate) fn send_to(
        &self,
        connection: ConnectionId,
        event: ServerEvent,
    ) -> bool {
        match self.entries.get(&connection) {
            Some(entry) => entry.sender.send(event).is_ok(),
            None => false,
        }
    }

    /// Records an invitation. Returns `false` when the target is not a
    /// live connection.
    pub(crate) fn invite(
        &mut self,
        from: ConnectionId,
        to: ConnectionId,
    ) -> bool {
        if !self.entries.contains_key(&to) {
            return false;
        }
        self.invites.insert((from, to));
        true
    }

    /// Withdraws an invitation. Returns whether one was pending.
    pub(crate) fn uninvite(
        &mut self,
        from: ConnectionId,
        to: ConnectionId,
    ) -> bool {
        self.invites.remove(&(from, to))
    }

    /// Whether an invitation is pending between two connections, in
    /// either direction. Accepting a match requires one.
    pub(crate) fn invite_between(
        &self,
        a: ConnectionId,
        b: ConnectionId,
    ) -> bool {
        self.invites.contains(&(a, b)) || self.invites.contains(&(b, a))
    }

    /// Clears all invitations between two connections once their match
    /// starts.
    pub(crate) fn clear_invites_between(
        &mut self,
        a: ConnectionId,
        b: ConnectionId,
    ) {
        self.invites.remove(&(a, b));
        self.invites.remove(&(b, a));
    }
}
