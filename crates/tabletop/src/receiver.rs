//! Per-player read loop.
//!
//! One receiver runs per player link. It keeps reading until the peer is
//! gone for good, the player is removed, or a reconnect hands the player
//! to a newer receiver. Only the first two end the player's lifecycle.

use std::sync::Arc;

use tabletop_protocol::{Notice, PlayerId};
use tabletop_room::GameLogic;
use tabletop_session::LinkStatus;
use tabletop_transport::LineReader;

use crate::dispatch::{self, Dispatch};
use crate::sender;
use crate::server::ServerState;

/// Why a receiver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    /// A reconnect bound the player to a newer link.
    Superseded,
    /// The player was removed, e.g. by `disconnect_player`.
    Gone,
    /// The peer kept the stream closed past the retry budget.
    Lost,
    /// Too many read errors in a row.
    Kicked,
}

/// Runs the read loop for `player_id` on the link with `generation`.
pub(crate) async fn run<G: GameLogic>(
    state: Arc<ServerState<G>>,
    player_id: PlayerId,
    mut reader: LineReader,
    generation: u64,
) {
    let config = &state.config;
    let mut lost: u32 = 0;
    let mut errors: u32 = 0;

    let exit = loop {
        match state.players.link_status(&player_id, generation).await {
            LinkStatus::Current => {}
            LinkStatus::Superseded => break Exit::Superseded,
            LinkStatus::Gone => break Exit::Gone,
        }

        match reader.read_line_within(config.read_timeout()).await {
            Ok(Some(line)) => {
                state.stats.record_received(line.len() + 1);
                // A line that arrives on a superseded link is not dispatched.
                match state.players.mark_connected(&player_id, generation, true).await {
                    LinkStatus::Current => {}
                    LinkStatus::Superseded => break Exit::Superseded,
                    LinkStatus::Gone => break Exit::Gone,
                }
                tracing::info!(%player_id, "<<-- {line}");
                if let Dispatch::Bad(reason) = dispatch::process(&state, &line).await {
                    tracing::debug!(%player_id, %reason, "bad message dropped");
                }
                errors = 0;
            }
            Ok(None) => {
                state.players.mark_connected(&player_id, generation, false).await;
                tracing::debug!(%player_id, lost, "stream closed, waiting for reconnect");
                tokio::time::sleep(config.lost_retry_delay()).await;
                lost += 1;
                if lost > config.max_lost_connection {
                    break Exit::Lost;
                }
            }
            Err(e) => {
                state.players.mark_connected(&player_id, generation, false).await;
                errors += 1;
                tracing::debug!(%player_id, errors, error = %e, "read failed");
                if errors > config.max_read_errors {
                    let player = state.players.find(&player_id).await;
                    if let Some(player) = player.filter(|p| p.link().generation() == generation) {
                        sender::send(player.link(), &Notice::Kick(player_id.clone()));
                    }
                    break Exit::Kicked;
                }
            }
        }
    };

    match exit {
        Exit::Superseded => {
            tracing::info!(%player_id, generation, "receiver handed over to reconnect");
        }
        Exit::Gone => {
            tracing::info!(%player_id, generation, "receiver stopped, player removed");
        }
        Exit::Lost | Exit::Kicked => {
            tracing::info!(%player_id, generation, reason = ?exit, "connection lost");
            end_player(&state, &player_id, generation).await;
        }
    }
}

/// Removes the player if `generation` is still its link, then frees its
/// receiver slot and its seat.
///
/// Removal and the link check happen under one registry lock, so a
/// reconnect that lands first keeps the player alive. The seat is freed
/// after that lock is dropped, so for a moment the game can still list an
/// id that is no longer registered. Deliveries to that seat find no player
/// and are skipped with a warning.
pub(crate) async fn end_player<G: GameLogic>(
    state: &ServerState<G>,
    player_id: &PlayerId,
    generation: u64,
) {
    let Some(player) = state.players.retire(player_id, generation).await else {
        tracing::debug!(%player_id, generation, "player already rebound or removed");
        return;
    };
    state.release_slot(player_id).await;
    if let Some(game_id) = &player.game {
        dispatch::leave_game(state, player_id, game_id).await;
    }
}
