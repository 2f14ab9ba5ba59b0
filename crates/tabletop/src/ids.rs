//! Identifier generation.
//!
//! Players and games share one id space. Ids are random non-negative
//! 31-bit integers in decimal, short enough to type into a test client.

use rand::Rng;
use tabletop_room::{GameLogic, GameRegistry};
use tabletop_session::PlayerRegistry;

/// Returns an id that no player and no game currently uses.
///
/// The random draw happens outside any lock. The collision check then
/// asks the player registry and the game registry, in that order, each
/// under its own lock. Two concurrent callers can still draw the same
/// unused id; registry inserts reject duplicates and callers draw again.
pub async fn generate<G: GameLogic>(
    players: &PlayerRegistry,
    games: &GameRegistry<G>,
) -> String {
    loop {
        let candidate = rand::rng().random_range(0..=i32::MAX).to_string();
        if is_free(players, games, &candidate).await {
            return candidate;
        }
        tracing::debug!(%candidate, "id collision, drawing again");
    }
}

async fn is_free<G: GameLogic>(
    players: &PlayerRegistry,
    games: &GameRegistry<G>,
    candidate: &str,
) -> bool {
    let player_id = tabletop_protocol::PlayerId::new(candidate);
    let game_id = tabletop_protocol::GameId::new(candidate);
    !players.contains(&player_id).await && !games.contains(&game_id).await
}
