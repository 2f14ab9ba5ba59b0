//! Integration tests for seating, turns, and departures using a mock game.

use std::fmt;

use tabletop_protocol::{GameId, PlayerId, Recipient};
use tabletop_room::{
    Game, GameConfig, GameError, GameLogic, GameRegistry, GameState,
};

// =========================================================================
// Mock game: players add their choice to a shared total, in seat order,
// until the total reaches 10.
// =========================================================================

struct SumGame;

struct SumState {
    seats: Vec<PlayerId>,
    turn: usize,
    total: u32,
}

#[derive(Debug, PartialEq)]
enum SumEvent {
    Started,
    Added(u32),
    Left(String),
}

impl fmt::Display for SumEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::Added(total) => write!(f, "total;{total}"),
            Self::Left(who) => write!(f, "left;{who}"),
        }
    }
}

impl GameLogic for SumGame {
    type State = SumState;
    type Event = SumEvent;

    fn init(seats: &[PlayerId]) -> SumState {
        SumState {
            seats: seats.to_vec(),
            turn: 0,
            total: 0,
        }
    }

    fn on_start(_state: &SumState) -> Vec<(Recipient, SumEvent)> {
        vec![(Recipient::All, SumEvent::Started)]
    }

    fn validate_choice(
        state: &SumState,
        sender: &PlayerId,
        _choice: u32,
    ) -> Result<(), String> {
        if &state.seats[state.turn] != sender {
            return Err("not your turn".into());
        }
        Ok(())
    }

    fn handle_choice(
        state: &mut SumState,
        _sender: &PlayerId,
        choice: u32,
    ) -> Vec<(Recipient, SumEvent)> {
        state.total += choice;
        state.turn = (state.turn + 1) % state.seats.len();
        vec![(Recipient::All, SumEvent::Added(state.total))]
    }

    fn is_finished(state: &SumState) -> bool {
        state.total >= 10 || state.seats.len() < 2
    }

    fn on_player_disconnect(
        state: &mut SumState,
        player: &PlayerId,
    ) -> Vec<(Recipient, SumEvent)> {
        state.seats.retain(|p| p != player);
        if !state.seats.is_empty() {
            state.turn %= state.seats.len();
        }
        vec![(
            Recipient::AllExcept(player.clone()),
            SumEvent::Left(player.to_string()),
        )]
    }

    fn game_config() -> GameConfig {
        GameConfig {
            min_capacity: 2,
            max_capacity: 3,
        }
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: &str) -> PlayerId {
    PlayerId::new(id)
}

fn gid(id: &str) -> GameId {
    GameId::new(id)
}

async fn registry_with_game(id: &str, capacity: usize) -> GameRegistry<SumGame> {
    let registry = GameRegistry::new();
    let game = Game::new(gid(id), "test", pid("1"), capacity).unwrap();
    registry.insert(game).await.unwrap();
    registry
}

// =========================================================================
// Tests
// =========================================================================

#[test]
fn test_new_game_rejects_capacity_out_of_bounds() {
    let too_big = Game::<SumGame>::new(gid("9"), "x", pid("1"), 4);
    assert!(matches!(
        too_big,
        Err(GameError::InvalidCapacity { requested: 4, min: 2, max: 3 })
    ));
    assert!(Game::<SumGame>::new(gid("9"), "x", pid("1"), 1).is_err());
}

#[tokio::test]
async fn test_find_after_insert_and_remove() {
    let registry = registry_with_game("9", 2).await;

    let info = registry.find(&gid("9")).await.expect("inserted");
    assert_eq!(info.capacity, 2);
    assert_eq!(info.state, GameState::Waiting);
    assert!(info.has_free_seat());

    assert!(registry.remove(&gid("9")).await.is_some());
    assert!(registry.find(&gid("9")).await.is_none());
}

#[tokio::test]
async fn test_insert_duplicate_id_is_rejected() {
    let registry = registry_with_game("9", 2).await;
    let again = Game::new(gid("9"), "other", pid("2"), 2).unwrap();
    assert!(matches!(
        registry.insert(again).await,
        Err(GameError::DuplicateId(_))
    ));
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn test_seat_until_full_starts_game() {
    let registry = registry_with_game("9", 2).await;

    let first = registry.seat(&gid("9"), pid("1")).await.unwrap();
    assert!(first.events.is_empty());
    assert_eq!(first.info.state, GameState::Waiting);

    let second = registry.seat(&gid("9"), pid("2")).await.unwrap();
    assert_eq!(second.info.state, GameState::InProgress);
    assert_eq!(second.info.seats, vec![pid("1"), pid("2")]);
    assert_eq!(second.events, vec![(Recipient::All, SumEvent::Started)]);
}

#[tokio::test]
async fn test_seat_twice_is_rejected() {
    let registry = registry_with_game("9", 3).await;
    registry.seat(&gid("9"), pid("1")).await.unwrap();

    assert!(matches!(
        registry.seat(&gid("9"), pid("1")).await,
        Err(GameError::AlreadySeated(..))
    ));
}

#[tokio::test]
async fn test_seat_in_started_game_is_rejected() {
    let registry = registry_with_game("9", 2).await;
    registry.seat(&gid("9"), pid("1")).await.unwrap();
    registry.seat(&gid("9"), pid("2")).await.unwrap();

    assert!(matches!(
        registry.seat(&gid("9"), pid("3")).await,
        Err(GameError::InvalidState(_))
    ));
}

#[tokio::test]
async fn test_seat_unknown_game_is_not_found() {
    let registry: GameRegistry<SumGame> = GameRegistry::new();
    assert!(matches!(
        registry.seat(&gid("404"), pid("1")).await,
        Err(GameError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_record_choice_enforces_turn_order() {
    let registry = registry_with_game("9", 2).await;
    registry.seat(&gid("9"), pid("1")).await.unwrap();
    registry.seat(&gid("9"), pid("2")).await.unwrap();

    let out_of_turn = registry.record_choice(&gid("9"), &pid("2"), 3).await;
    assert!(matches!(out_of_turn, Err(GameError::Rejected(_))));

    let played = registry.record_choice(&gid("9"), &pid("1"), 3).await.unwrap();
    assert_eq!(played.events, vec![(Recipient::All, SumEvent::Added(3))]);
}

#[tokio::test]
async fn test_record_choice_before_start_is_rejected() {
    let registry = registry_with_game("9", 2).await;
    registry.seat(&gid("9"), pid("1")).await.unwrap();

    assert!(matches!(
        registry.record_choice(&gid("9"), &pid("1"), 1).await,
        Err(GameError::InvalidState(_))
    ));
}

#[tokio::test]
async fn test_record_choice_reaching_goal_finishes_game() {
    let registry = registry_with_game("9", 2).await;
    registry.seat(&gid("9"), pid("1")).await.unwrap();
    registry.seat(&gid("9"), pid("2")).await.unwrap();

    registry.record_choice(&gid("9"), &pid("1"), 6).await.unwrap();
    let last = registry.record_choice(&gid("9"), &pid("2"), 4).await.unwrap();
    assert_eq!(last.info.state, GameState::Finished);
}

#[tokio::test]
async fn test_unseat_during_game_notifies_remaining_players() {
    let registry = registry_with_game("9", 3).await;
    for p in ["1", "2", "3"] {
        registry.seat(&gid("9"), pid(p)).await.unwrap();
    }

    let outcome = registry.unseat(&gid("9"), &pid("2")).await.unwrap();
    assert!(!outcome.closed);
    assert_eq!(outcome.info.seats, vec![pid("1"), pid("3")]);
    assert_eq!(
        outcome.events,
        vec![(Recipient::AllExcept(pid("2")), SumEvent::Left("2".into()))]
    );
    assert_eq!(outcome.info.state, GameState::InProgress);
}

#[tokio::test]
async fn test_unseat_last_player_removes_game() {
    let registry = registry_with_game("9", 2).await;
    registry.seat(&gid("9"), pid("1")).await.unwrap();

    let outcome = registry.unseat(&gid("9"), &pid("1")).await.unwrap();
    assert!(outcome.closed);
    assert!(!registry.contains(&gid("9")).await);
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_unseat_player_not_in_game_is_rejected() {
    let registry = registry_with_game("9", 2).await;
    assert!(matches!(
        registry.unseat(&gid("9"), &pid("7")).await,
        Err(GameError::NotSeated(..))
    ));
}

#[tokio::test]
async fn test_list_is_ordered_by_id() {
    let registry: GameRegistry<SumGame> = GameRegistry::new();
    for id in ["30", "10", "20"] {
        registry
            .insert(Game::new(gid(id), "g", pid("1"), 2).unwrap())
            .await
            .unwrap();
    }

    let ids: Vec<_> = registry.list().await.into_iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![gid("10"), gid("20"), gid("30")]);
}

#[tokio::test]
async fn test_for_each_visits_every_game() {
    let registry = registry_with_game("10", 2).await;
    registry
        .insert(Game::new(gid("20"), "g", pid("2"), 3).unwrap())
        .await
        .unwrap();
    registry.seat(&gid("20"), pid("2")).await.unwrap();

    let mut seen = Vec::new();
    registry
        .for_each(|game| seen.push((game.id().clone(), game.seats().len())))
        .await;
    seen.sort();

    assert_eq!(seen, vec![(gid("10"), 0), (gid("20"), 1)]);
}
