//! Client to server messages.
//!
//! Two shapes exist: the single handshake line a fresh connection sends
//! ([`Handshake`]), and the command lines a registered player sends for
//! the rest of the session ([`ClientMessage`]).

use crate::{GameId, PlayerId, ProtocolError, Tokens};

/// Nickname given to players who register without one.
pub const DEFAULT_NICKNAME: &str = "Player";

const REGISTER: &str = "_player_nickname";
const RECONNECT: &str = "_player_reconnect";

/// The first line of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handshake {
    /// `<anything>;_player_nickname[;<nickname>]`: a new player.
    Register { nickname: String },

    /// `<id>;_player_reconnect`: resume an existing player. The id may be
    /// absent, in which case the server falls back to the peer address.
    Reconnect { player_id: Option<PlayerId> },
}

impl Handshake {
    /// Parses a handshake line.
    ///
    /// # Errors
    /// [`ProtocolError::MissingToken`] when there is no intent field,
    /// [`ProtocolError::UnknownCommand`] when it is neither keyword.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let tokens = Tokens::split(line);
        let intent = tokens.get(1).ok_or(ProtocolError::MissingToken {
            index: 1,
            name: "intent",
        })?;

        match intent {
            REGISTER => Ok(Self::Register {
                nickname: tokens
                    .get(2)
                    .unwrap_or(DEFAULT_NICKNAME)
                    .to_string(),
            }),
            RECONNECT => Ok(Self::Reconnect {
                player_id: tokens.get(0).map(PlayerId::new),
            }),
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}

/// A command a registered player can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `get_games`: ask for the game list to be broadcast.
    GetGames,

    /// `create_new_game;<capacity>`: open a game and take its first seat.
    CreateNewGame { capacity: usize },

    /// `join_player_to_game;<gameId>`: take a seat in a game.
    JoinPlayerToGame { game_id: GameId },

    /// `disconnect_player`: leave the server.
    DisconnectPlayer,

    /// `disconnect_player_from_game;<gameId>`: return to the lobby.
    DisconnectPlayerFromGame { game_id: GameId },

    /// `game_choice_selected;<choice>`: play a turn.
    GameChoiceSelected { choice: u32 },
}

/// A parsed command line: who sent it and what they asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMessage {
    /// The sender's claimed id. Not yet checked against the registry.
    pub sender: PlayerId,
    pub command: Command,
}

impl ClientMessage {
    /// Parses a command line.
    ///
    /// A command whose argument is missing is an error, never a command
    /// with a default argument.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let tokens = Tokens::split(line);
        let sender = tokens.get(0).ok_or(ProtocolError::MissingToken {
            index: 0,
            name: "sender",
        })?;
        let name = tokens.get(1).ok_or(ProtocolError::MissingToken {
            index: 1,
            name: "command",
        })?;

        let command = match name {
            "get_games" => Command::GetGames,
            "create_new_game" => Command::CreateNewGame {
                capacity: number(&tokens, "capacity")?,
            },
            "join_player_to_game" => Command::JoinPlayerToGame {
                game_id: GameId::new(argument(&tokens, "game id")?),
            },
            "disconnect_player" => Command::DisconnectPlayer,
            "disconnect_player_from_game" => {
                Command::DisconnectPlayerFromGame {
                    game_id: GameId::new(argument(&tokens, "game id")?),
                }
            }
            "game_choice_selected" => Command::GameChoiceSelected {
                choice: number(&tokens, "choice")?,
            },
            other => {
                return Err(ProtocolError::UnknownCommand(other.to_string()));
            }
        };

        Ok(Self {
            sender: PlayerId::new(sender),
            command,
        })
    }
}

fn argument<'a>(
    tokens: &Tokens<'a>,
    name: &'static str,
) -> Result<&'a str, ProtocolError> {
    tokens
        .get(2)
        .ok_or(ProtocolError::MissingToken { index: 2, name })
}

fn number<T: std::str::FromStr>(
    tokens: &Tokens<'_>,
    name: &'static str,
) -> Result<T, ProtocolError> {
    let raw = argument(tokens, name)?;
    raw.parse().map_err(|_| ProtocolError::InvalidArgument {
        name,
        value: raw.to_string(),
    })
}
