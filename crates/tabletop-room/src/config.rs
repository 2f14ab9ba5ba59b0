//! Game configuration and state machine.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Capacity bounds for a game variant.
///
/// A client picks the capacity when it creates a game; requests outside
/// these bounds are refused. Variants override the defaults through
/// [`GameLogic::game_config`](crate::GameLogic::game_config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Smallest capacity a client may ask for.
    pub min_capacity: usize,

    /// Largest capacity a client may ask for.
    pub max_capacity: usize,
}

impl GameConfig {
    /// Returns `true` if `capacity` is within bounds.
    pub fn accepts(&self, capacity: usize) -> bool {
        (self.min_capacity..=self.max_capacity).contains(&capacity)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_capacity: 2,
            max_capacity: 8,
        }
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// The lifecycle state of a game.
///
/// ```text
/// Waiting ──(last seat taken)──→ InProgress ──(logic says done)──→ Finished
/// ```
///
/// A game leaves the registry when its last player leaves, whatever its
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Seats are open.
    Waiting,
    /// Every seat was filled and turns are being played.
    InProgress,
    /// The logic declared the game over. Players may still leave.
    Finished,
}

impl GameState {
    /// Returns `true` if the game is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if turns are being played.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// The state that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Waiting => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => None,
        }
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}
