//! Room and registry configuration.

use std::time::Duration;

use flipside_protocol::RoomId;

/// Settings for a single room.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Whether connections beyond the two seated players may stay in the
    /// room as spectators/chat participants. Game rooms reject them;
    /// the lobby admits them.
    pub allow_spectators: bool,

    /// How long a finished session is retained for final-state queries
    /// before the sweep destroys it.
    pub finished_retention: Duration,

    /// How long a Forming room with no occupied seats may sit idle before
    /// the sweep reaps it. The original server let such rooms live
    /// forever; here the policy is explicit.
    pub forming_idle_timeout: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            allow_spectators: false,
            finished_retention: Duration::from_secs(60 * 60),
            forming_idle_timeout: Duration::from_secs(60 * 60),
        }
    }
}

/// Settings for the session registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Settings applied to every room the registry creates.
    pub room: RoomConfig,

    /// A designated room that admits spectators regardless of
    /// `room.allow_spectators` — the chat lobby where players meet and
    /// exchange invitations before starting a game.
    pub lobby: Option<RoomId>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            room: RoomConfig::default(),
            lobby: Some(RoomId::new("lobby")),
        }
    }
}
