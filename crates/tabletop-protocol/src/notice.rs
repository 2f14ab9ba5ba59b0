//! Server to client messages.

use std::fmt;

use crate::{GameId, PlayerId, DELIMITER};

/// Address field used for lines that concern no single player.
const LOBBY: &str = "0";

/// One row of the game list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameListEntry {
    pub name: String,
    pub game_id: GameId,
    pub capacity: usize,
}

/// One seat in a game's roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub player_id: PlayerId,
    pub nickname: String,
    pub color: &'static str,
}

/// A line the server sends.
///
/// `Display` renders the line without its terminator; the transport adds
/// `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// `<id>;_player_id`: registration acknowledged.
    Registered(PlayerId),

    /// `<id>;_player_id_reconnected`: reconnect acknowledged.
    Reconnected(PlayerId),

    /// `<id>;kick_player`: too many read errors, the server hangs up.
    Kick(PlayerId),

    /// `<id>;player_crash`: the server could not start serving the player.
    Crash(PlayerId),

    /// `<id>;cannot_join_game`: a join or create request failed.
    CannotJoinGame(PlayerId),

    /// `<id>;disconnect_player`: the player's own leave request is done.
    Disconnected(PlayerId),

    /// `0;update_games;<name>;<id>;<capacity>;...`
    GameList(Vec<GameListEntry>),

    /// `<id>;prepare_window_for_game;<gameId>;<name>;<capacity>`
    PrepareGame {
        player_id: PlayerId,
        game_id: GameId,
        name: String,
        capacity: usize,
    },

    /// `<gameId>;update_players;<id>;<nickname>;<color>;...`
    Roster {
        game_id: GameId,
        seats: Vec<RosterEntry>,
    },

    /// `<gameId>;<event>`: produced by game logic.
    GameEvent { game_id: GameId, event: String },
}

impl Notice {
    /// Renders the notice as a wire line (without `\n`).
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = DELIMITER;
        match self {
            Self::Registered(id) => write!(f, "{id}{d}_player_id"),
            Self::Reconnected(id) => {
                write!(f, "{id}{d}_player_id_reconnected")
            }
            Self::Kick(id) => write!(f, "{id}{d}kick_player"),
            Self::Crash(id) => write!(f, "{id}{d}player_crash"),
            Self::CannotJoinGame(id) => write!(f, "{id}{d}cannot_join_game"),
            Self::Disconnected(id) => write!(f, "{id}{d}disconnect_player"),
            Self::GameList(entries) => {
                write!(f, "{LOBBY}{d}update_games")?;
                for entry in entries {
                    write!(
                        f,
                        "{d}{}{d}{}{d}{}",
                        entry.name, entry.game_id, entry.capacity
                    )?;
                }
                Ok(())
            }
            Self::PrepareGame {
                player_id,
                game_id,
                name,
                capacity,
            } => write!(
                f,
                "{player_id}{d}prepare_window_for_game{d}{game_id}{d}{name}{d}{capacity}"
            ),
            Self::Roster { game_id, seats } => {
                write!(f, "{game_id}{d}update_players")?;
                for seat in seats {
                    write!(
                        f,
                        "{d}{}{d}{}{d}{}",
                        seat.player_id, seat.nickname, seat.color
                    )?;
                }
                Ok(())
            }
            Self::GameEvent { game_id, event } => {
                write!(f, "{game_id}{d}{event}")
            }
        }
    }
}
