//! The `GameLogic` trait: the extension point for game variants.
//!
//! The server owns seating, lifecycle, and delivery. A variant only
//! decides what a turn means.

use std::fmt;

use tabletop_protocol::{PlayerId, Recipient};

use crate::GameConfig;

/// The rules of one game variant.
///
/// - `State`: whatever the variant tracks between turns.
/// - `Event`: what it tells players. Rendered with `Display` after the
///   game id, so `Display` must produce `;`-separated fields.
///
/// The framework calls `init` when the last seat is taken, routes each
/// `game_choice_selected` through `validate_choice` and `handle_choice`,
/// and checks `is_finished` after every turn and every departure.
pub trait GameLogic: Send + Sync + 'static {
    /// Per-game state.
    type State: Send + Sync;

    /// A message for players.
    type Event: Send + Sync + fmt::Display;

    /// Creates the state when the game starts. `seats` is in join order.
    fn init(seats: &[PlayerId]) -> Self::State;

    /// Events to send right after `init`. Default: none.
    fn on_start(_state: &Self::State) -> Vec<(Recipient, Self::Event)> {
        Vec::new()
    }

    /// Checks a turn before it is applied. Default: accept all.
    fn validate_choice(
        _state: &Self::State,
        _sender: &PlayerId,
        _choice: u32,
    ) -> Result<(), String> {
        Ok(())
    }

    /// Applies a turn and returns what to tell whom.
    fn handle_choice(
        state: &mut Self::State,
        sender: &PlayerId,
        choice: u32,
    ) -> Vec<(Recipient, Self::Event)>;

    /// Returns `true` once the game is over.
    fn is_finished(state: &Self::State) -> bool;

    /// Called when a seated player leaves a running game. Default: no-op.
    fn on_player_disconnect(
        _state: &mut Self::State,
        _player: &PlayerId,
    ) -> Vec<(Recipient, Self::Event)> {
        Vec::new()
    }

    /// Capacity bounds for this variant. Default: 2 to 8 players.
    fn game_config() -> GameConfig {
        GameConfig::default()
    }
}
