//! Identity types shared by every layer.

use std::fmt;

/// A unique identifier for a player.
///
/// Ids are decimal strings chosen by the server and echoed back by the
/// client as the first field of every line, so the newtype wraps a
/// `String` rather than a number: the server never does arithmetic on
/// them, and a client may legally send any text in that position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps a raw id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unique identifier for a game session.
///
/// Drawn from the same id space as [`PlayerId`]: no game id ever equals a
/// player id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameId(String);

impl GameId {
    /// Wraps a raw id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who a game event is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every player seated in the game.
    All,

    /// One specific player.
    Player(PlayerId),

    /// Everyone seated except the given player.
    AllExcept(PlayerId),
}

impl Recipient {
    /// Returns `true` if a seated `player` should receive the event.
    pub fn includes(&self, player: &PlayerId) -> bool {
        match self {
            Self::All => true,
            Self::Player(target) => target == player,
            Self::AllExcept(excluded) => excluded != player,
        }
    }
}
