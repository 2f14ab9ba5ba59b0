//! Error types for the room layer.

use tabletop_protocol::{GameId, PlayerId};

/// Errors that can occur during game operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The game does not exist.
    #[error("game {0} not found")]
    NotFound(GameId),

    /// A game with this id is already registered.
    #[error("game id {0} is already taken")]
    DuplicateId(GameId),

    /// Every seat is taken.
    #[error("game {0} is full")]
    GameFull(GameId),

    /// The player already has a seat in this game.
    #[error("player {0} already seated in game {1}")]
    AlreadySeated(PlayerId, GameId),

    /// The player has no seat in this game.
    #[error("player {0} not seated in game {1}")]
    NotSeated(PlayerId, GameId),

    /// The requested capacity is outside the variant's bounds.
    #[error("capacity {requested} outside {min}..={max}")]
    InvalidCapacity {
        requested: usize,
        min: usize,
        max: usize,
    },

    /// The game is in a state that doesn't allow this operation.
    #[error("invalid game state for this operation: {0}")]
    InvalidState(String),

    /// The game logic refused a turn.
    #[error("turn rejected: {0}")]
    Rejected(String),
}
