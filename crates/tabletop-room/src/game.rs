//! A single game session.

use tabletop_protocol::{GameId, PlayerId, Recipient};

use crate::{GameError, GameLogic, GameState};

/// A snapshot of game metadata (not the logic state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    pub id: GameId,
    pub name: String,
    pub owner: PlayerId,
    pub capacity: usize,
    /// Seated players in join order.
    pub seats: Vec<PlayerId>,
    pub state: GameState,
}

impl GameInfo {
    /// Returns `true` if a new player could take a seat right now.
    pub fn has_free_seat(&self) -> bool {
        self.state.is_joinable() && self.seats.len() < self.capacity
    }
}

/// What a game operation produced.
pub struct Outcome<G: GameLogic> {
    /// The game right after the operation.
    pub info: GameInfo,
    /// Logic events to deliver, addressed relative to `info.seats`.
    pub events: Vec<(Recipient, G::Event)>,
    /// `true` if the operation left the game empty and it was removed.
    pub closed: bool,
}

/// One match: seats, lifecycle, and the variant's state once started.
pub struct Game<G: GameLogic> {
    id: GameId,
    name: String,
    owner: PlayerId,
    capacity: usize,
    seats: Vec<PlayerId>,
    state: GameState,
    logic: Option<G::State>,
}

impl<G: GameLogic> Game<G> {
    /// Creates an empty, waiting game.
    ///
    /// # Errors
    /// [`GameError::InvalidCapacity`] if `capacity` is outside
    /// `G::game_config()`.
    pub fn new(
        id: GameId,
        name: impl Into<String>,
        owner: PlayerId,
        capacity: usize,
    ) -> Result<Self, GameError> {
        let config = G::game_config();
        if !config.accepts(capacity) {
            return Err(GameError::InvalidCapacity {
                requested: capacity,
                min: config.min_capacity,
                max: config.max_capacity,
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            owner,
            capacity,
            seats: Vec::with_capacity(capacity),
            state: GameState::Waiting,
            logic: None,
        })
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn seats(&self) -> &[PlayerId] {
        &self.seats
    }

    /// Returns a metadata snapshot.
    pub fn info(&self) -> GameInfo {
        GameInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            owner: self.owner.clone(),
            capacity: self.capacity,
            seats: self.seats.clone(),
            state: self.state,
        }
    }

    /// Gives `player` the next free seat; starts the game when it fills.
    pub(crate) fn seat(
        &mut self,
        player: PlayerId,
    ) -> Result<Vec<(Recipient, G::Event)>, GameError> {
        if self.seats.contains(&player) {
            return Err(GameError::AlreadySeated(player, self.id.clone()));
        }
        if !self.state.is_joinable() {
            return Err(GameError::InvalidState(format!(
                "cannot join game in state {}",
                self.state
            )));
        }
        if self.seats.len() >= self.capacity {
            return Err(GameError::GameFull(self.id.clone()));
        }

        self.seats.push(player);
        tracing::info!(
            game_id = %self.id,
            seats = self.seats.len(),
            capacity = self.capacity,
            "player seated"
        );

        if self.seats.len() == self.capacity {
            return Ok(self.start());
        }
        Ok(Vec::new())
    }

    /// Frees `player`'s seat, letting the logic react if the game is live.
    pub(crate) fn unseat(
        &mut self,
        player: &PlayerId,
    ) -> Result<Vec<(Recipient, G::Event)>, GameError> {
        let index = self
            .seats
            .iter()
            .position(|p| p == player)
            .ok_or_else(|| GameError::NotSeated(player.clone(), self.id.clone()))?;
        self.seats.remove(index);

        tracing::info!(
            game_id = %self.id,
            %player,
            seats = self.seats.len(),
            "player left game"
        );

        let mut events = Vec::new();
        if self.state.is_active() {
            if let Some(logic) = &mut self.logic {
                events = G::on_player_disconnect(logic, player);
            }
            self.finish_if_done();
        }
        Ok(events)
    }

    /// Plays one turn for `player`.
    pub(crate) fn record_choice(
        &mut self,
        player: &PlayerId,
        choice: u32,
    ) -> Result<Vec<(Recipient, G::Event)>, GameError> {
        if !self.seats.contains(player) {
            return Err(GameError::NotSeated(player.clone(), self.id.clone()));
        }
        let logic = match (&self.state, &mut self.logic) {
            (GameState::InProgress, Some(logic)) => logic,
            _ => {
                return Err(GameError::InvalidState(format!(
                    "no turns in state {}",
                    self.state
                )));
            }
        };

        G::validate_choice(logic, player, choice).map_err(GameError::Rejected)?;
        let events = G::handle_choice(logic, player, choice);
        self.finish_if_done();
        Ok(events)
    }

    fn start(&mut self) -> Vec<(Recipient, G::Event)> {
        let logic = G::init(&self.seats);
        let events = G::on_start(&logic);
        self.logic = Some(logic);
        self.state = GameState::InProgress;
        tracing::info!(game_id = %self.id, "game started");
        events
    }

    fn finish_if_done(&mut self) {
        if self.logic.as_ref().is_some_and(G::is_finished) {
            self.state = GameState::Finished;
            tracing::info!(game_id = %self.id, "game finished");
        }
    }
}
