//! The game registry: every open game, behind one lock.

use std::collections::HashMap;

use tabletop_protocol::{GameId, PlayerId};
use tokio::sync::Mutex;

use crate::{Game, GameError, GameInfo, GameLogic, Outcome};

/// All games, keyed by id.
///
/// Same discipline as the player registry: one `tokio::sync::Mutex`, held
/// only for the duration of a method, never across I/O. Operations hand
/// back [`Outcome`]s whose events the caller delivers after the lock is
/// released.
pub struct GameRegistry<G: GameLogic> {
    games: Mutex<HashMap<GameId, Game<G>>>,
}

impl<G: GameLogic> GameRegistry<G> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            games: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a game.
    ///
    /// # Errors
    /// [`GameError::DuplicateId`] if the id is taken.
    pub async fn insert(&self, game: Game<G>) -> Result<(), GameError> {
        let mut games = self.games.lock().await;
        if games.contains_key(game.id()) {
            return Err(GameError::DuplicateId(game.id().clone()));
        }
        tracing::info!(game_id = %game.id(), "game created");
        games.insert(game.id().clone(), game);
        Ok(())
    }

    /// Removes a game, returning its final snapshot.
    pub async fn remove(&self, id: &GameId) -> Option<GameInfo> {
        let removed = self.games.lock().await.remove(id).map(|g| g.info());
        if removed.is_some() {
            tracing::info!(game_id = %id, "game removed");
        }
        removed
    }

    /// Looks up a game by id.
    pub async fn find(&self, id: &GameId) -> Option<GameInfo> {
        self.games.lock().await.get(id).map(Game::info)
    }

    /// Returns `true` if a game with this id is registered.
    pub async fn contains(&self, id: &GameId) -> bool {
        self.games.lock().await.contains_key(id)
    }

    /// Snapshots every game, ordered by id so listings are stable.
    pub async fn list(&self) -> Vec<GameInfo> {
        let mut infos: Vec<_> =
            self.games.lock().await.values().map(Game::info).collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }

    /// Visits every game under the lock.
    pub async fn for_each(&self, mut visit: impl FnMut(&Game<G>)) {
        let games = self.games.lock().await;
        for game in games.values() {
            visit(game);
        }
    }

    /// Seats `player` in game `id`.
    pub async fn seat(
        &self,
        id: &GameId,
        player: PlayerId,
    ) -> Result<Outcome<G>, GameError> {
        let mut games = self.games.lock().await;
        let game = games
            .get_mut(id)
            .ok_or_else(|| GameError::NotFound(id.clone()))?;
        let events = game.seat(player)?;
        Ok(Outcome {
            info: game.info(),
            events,
            closed: false,
        })
    }

    /// Frees `player`'s seat in game `id`; removes the game once empty.
    pub async fn unseat(
        &self,
        id: &GameId,
        player: &PlayerId,
    ) -> Result<Outcome<G>, GameError> {
        let mut games = self.games.lock().await;
        let game = games
            .get_mut(id)
            .ok_or_else(|| GameError::NotFound(id.clone()))?;
        let events = game.unseat(player)?;
        let info = game.info();

        let closed = info.seats.is_empty();
        if closed {
            games.remove(id);
            tracing::info!(game_id = %id, "last player left, game removed");
        }
        Ok(Outcome {
            info,
            events,
            closed,
        })
    }

    /// Plays a turn for `player` in game `id`.
    pub async fn record_choice(
        &self,
        id: &GameId,
        player: &PlayerId,
        choice: u32,
    ) -> Result<Outcome<G>, GameError> {
        let mut games = self.games.lock().await;
        let game = games
            .get_mut(id)
            .ok_or_else(|| GameError::NotFound(id.clone()))?;
        let events = game.record_choice(player, choice)?;
        Ok(Outcome {
            info: game.info(),
            events,
            closed: false,
        })
    }

    /// Returns the number of games.
    pub async fn len(&self) -> usize {
        self.games.lock().await.len()
    }

    /// Returns `true` if there are no games.
    pub async fn is_empty(&self) -> bool {
        self.games.lock().await.is_empty()
    }
}

impl<G: GameLogic> Default for GameRegistry<G> {
    fn default() -> Self {
        Self::new()
    }
}
