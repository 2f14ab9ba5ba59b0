//! Command dispatch for registered players.
//!
//! [`process`] takes one line from a receiver, resolves the sender, and
//! runs the command. Anything it cannot make sense of is a bad message:
//! counted, handed back to the receiver for logging, and otherwise
//! ignored.

use tabletop_protocol::{ClientMessage, Command, GameId, Notice, PlayerId};
use tabletop_room::{Game, GameError, GameLogic};
use tabletop_session::{Player, SessionError};

use crate::ids;
use crate::sender;
use crate::server::ServerState;

/// What happened to a dispatched line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Dispatch {
    /// The command ran. It may still have been refused by the game, which
    /// the client learns from the notices it receives.
    Handled,
    /// The line was dropped as a bad message.
    Bad(String),
}

/// Parses and runs one command line.
pub(crate) async fn process<G: GameLogic>(state: &ServerState<G>, line: &str) -> Dispatch {
    let message = match ClientMessage::parse(line) {
        Ok(message) => message,
        Err(e) => return bad(state, line, e.to_string()),
    };
    let Some(player) = state.players.find(&message.sender).await else {
        return bad(state, line, format!("unknown player {}", message.sender));
    };

    match message.command {
        Command::GetGames => {
            sender::broadcast_game_list(state).await;
            Dispatch::Handled
        }
        Command::CreateNewGame { capacity } => {
            create_game(state, &player, capacity, line).await
        }
        Command::JoinPlayerToGame { game_id } => {
            join_game(state, &player, game_id).await;
            Dispatch::Handled
        }
        Command::DisconnectPlayer => {
            disconnect_player(state, &player).await;
            Dispatch::Handled
        }
        Command::DisconnectPlayerFromGame { game_id } => {
            if player.game.as_ref() != Some(&game_id) {
                return bad(
                    state,
                    line,
                    format!("player {} is not in game {game_id}", player.id),
                );
            }
            leave_game(state, &player.id, &game_id).await;
            Dispatch::Handled
        }
        Command::GameChoiceSelected { choice } => {
            let Some(game_id) = player.game.clone() else {
                return bad(state, line, format!("player {} is not in a game", player.id));
            };
            play_turn(state, &player.id, &game_id, choice).await;
            Dispatch::Handled
        }
    }
}

fn bad<G: GameLogic>(state: &ServerState<G>, line: &str, reason: String) -> Dispatch {
    state.stats.record_bad();
    Dispatch::Bad(format!("{reason}: {line}"))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn create_game<G: GameLogic>(
    state: &ServerState<G>,
    player: &Player,
    capacity: usize,
    line: &str,
) -> Dispatch {
    if player.game.is_some() {
        sender::send(player.link(), &Notice::CannotJoinGame(player.id.clone()));
        return Dispatch::Handled;
    }
    let config = G::game_config();
    if !config.accepts(capacity) {
        return bad(
            state,
            line,
            format!(
                "capacity {capacity} outside {}..={}",
                config.min_capacity, config.max_capacity
            ),
        );
    }

    let game_id = loop {
        let game_id = GameId::new(ids::generate(&state.players, &state.games).await);
        let game = match Game::new(
            game_id.clone(),
            player.nickname.clone(),
            player.id.clone(),
            capacity,
        ) {
            Ok(game) => game,
            Err(e) => return bad(state, line, e.to_string()),
        };
        match state.games.insert(game).await {
            Ok(()) => break game_id,
            Err(GameError::DuplicateId(_)) => continue,
            Err(e) => return bad(state, line, e.to_string()),
        }
    };
    tracing::info!(player_id = %player.id, %game_id, capacity, "game created");

    join_game(state, player, game_id).await;
    Dispatch::Handled
}

/// Seats `player` in its current game if it has one, otherwise in
/// `requested`.
async fn join_game<G: GameLogic>(state: &ServerState<G>, player: &Player, requested: GameId) {
    let game_id = player.game.clone().unwrap_or(requested);

    let outcome = match state.games.seat(&game_id, player.id.clone()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::debug!(player_id = %player.id, %game_id, error = %e, "join refused");
            sender::send(player.link(), &Notice::CannotJoinGame(player.id.clone()));
            return;
        }
    };

    if let Err(SessionError::NotFound(_)) =
        state.players.set_game(&player.id, Some(game_id.clone())).await
    {
        // Removed while we were seating it; give the seat back.
        tracing::debug!(player_id = %player.id, %game_id, "player vanished while joining");
        if let Ok(outcome) = state.games.unseat(&game_id, &player.id).await {
            announce_departure(state, &outcome).await;
        }
        return;
    }

    sender::send(
        player.link(),
        &Notice::PrepareGame {
            player_id: player.id.clone(),
            game_id: game_id.clone(),
            name: outcome.info.name.clone(),
            capacity: outcome.info.capacity,
        },
    );
    sender::send_roster(state, &outcome.info).await;
    sender::deliver_events(state, &outcome).await;
    sender::broadcast_game_list(state).await;
}

async fn disconnect_player<G: GameLogic>(state: &ServerState<G>, player: &Player) {
    if let Some(game_id) = &player.game {
        leave_game(state, &player.id, game_id).await;
    }
    state.players.remove(&player.id).await;
    state.release_slot(&player.id).await;
    tracing::info!(player_id = %player.id, "player left the server");
    sender::send(player.link(), &Notice::Disconnected(player.id.clone()));
}

/// Frees the player's seat and clears its game reference.
///
/// Used both for an explicit leave and for a player that is being
/// removed, in which case clearing the reference is a no-op.
pub(crate) async fn leave_game<G: GameLogic>(
    state: &ServerState<G>,
    player_id: &PlayerId,
    game_id: &GameId,
) {
    let outcome = match state.games.unseat(game_id, player_id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::debug!(%player_id, %game_id, error = %e, "leave ignored");
            return;
        }
    };
    // Err only if the player is already gone.
    let _ = state.players.set_game(player_id, None).await;
    announce_departure(state, &outcome).await;
}

async fn announce_departure<G: GameLogic>(
    state: &ServerState<G>,
    outcome: &tabletop_room::Outcome<G>,
) {
    if !outcome.closed {
        sender::send_roster(state, &outcome.info).await;
        sender::deliver_events(state, outcome).await;
    }
    sender::broadcast_game_list(state).await;
}

async fn play_turn<G: GameLogic>(
    state: &ServerState<G>,
    player_id: &PlayerId,
    game_id: &GameId,
    choice: u32,
) {
    match state.games.record_choice(game_id, player_id, choice).await {
        Ok(outcome) => sender::deliver_events(state, &outcome).await,
        Err(e) => {
            tracing::debug!(%player_id, %game_id, choice, error = %e, "turn refused");
        }
    }
}
