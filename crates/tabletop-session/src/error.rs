//! Error types for the session layer.

use tabletop_protocol::PlayerId;

/// Errors that can occur while mutating the player registry.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No player is registered under this id.
    #[error("player {0} not found")]
    NotFound(PlayerId),

    /// A player with this id is already registered.
    ///
    /// Ids come from a generator that checks for collisions, but the
    /// check and the insert take the lock separately; callers retry with
    /// a fresh id.
    #[error("player id {0} is already taken")]
    DuplicateId(PlayerId),

    /// No disconnected player matches the reconnect request.
    #[error("nothing to reconnect to")]
    NoReconnectTarget,
}
