//! "Race to the goal": the game variant this binary ships.
//!
//! Players take turns adding 1, 2 or 3 to a shared total. Whoever brings
//! the total to [`GOAL`] or beyond wins. If everyone else leaves, the last
//! player standing wins.

use std::fmt;

use tabletop::{GameLogic, PlayerId, Recipient};

/// Total that ends the game.
pub const GOAL: u32 = 21;

/// Largest step a player may take.
pub const MAX_STEP: u32 = 3;

pub struct RaceToGoal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceState {
    seats: Vec<PlayerId>,
    turn: usize,
    total: u32,
    winner: Option<PlayerId>,
}

impl RaceState {
    fn current(&self) -> Option<&PlayerId> {
        self.seats.get(self.turn)
    }
}

/// What players are told. Rendered as `;`-separated fields after the
/// game id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceEvent {
    /// `turn;<playerId>`
    Turn(PlayerId),
    /// `progress;<playerId>;<choice>;<total>`
    Progress {
        player: PlayerId,
        choice: u32,
        total: u32,
    },
    /// `winner;<playerId>`
    Winner(PlayerId),
}

impl fmt::Display for RaceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Turn(player) => write!(f, "turn;{player}"),
            Self::Progress {
                player,
                choice,
                total,
            } => write!(f, "progress;{player};{choice};{total}"),
            Self::Winner(player) => write!(f, "winner;{player}"),
        }
    }
}

impl GameLogic for RaceToGoal {
    type State = RaceState;
    type Event = RaceEvent;

    fn init(seats: &[PlayerId]) -> RaceState {
        RaceState {
            seats: seats.to_vec(),
            turn: 0,
            total: 0,
            winner: None,
        }
    }

    fn on_start(state: &RaceState) -> Vec<(Recipient, RaceEvent)> {
        state
            .current()
            .map(|first| vec![(Recipient::All, RaceEvent::Turn(first.clone()))])
            .unwrap_or_default()
    }

    fn validate_choice(
        state: &RaceState,
        sender: &PlayerId,
        choice: u32,
    ) -> Result<(), String> {
        if state.winner.is_some() {
            return Err("game is over".into());
        }
        if state.current() != Some(sender) {
            return Err(format!("not {sender}'s turn"));
        }
        if !(1..=MAX_STEP).contains(&choice) {
            return Err(format!("choice {choice} outside 1..={MAX_STEP}"));
        }
        Ok(())
    }

    fn handle_choice(
        state: &mut RaceState,
        sender: &PlayerId,
        choice: u32,
    ) -> Vec<(Recipient, RaceEvent)> {
        state.total += choice;
        let mut events = vec![(
            Recipient::All,
            RaceEvent::Progress {
                player: sender.clone(),
                choice,
                total: state.total,
            },
        )];

        if state.total >= GOAL {
            state.winner = Some(sender.clone());
            events.push((Recipient::All, RaceEvent::Winner(sender.clone())));
        } else {
            state.turn = (state.turn + 1) % state.seats.len();
            if let Some(next) = state.current() {
                events.push((Recipient::All, RaceEvent::Turn(next.clone())));
            }
        }
        events
    }

    fn is_finished(state: &RaceState) -> bool {
        state.winner.is_some() || state.seats.is_empty()
    }

    fn on_player_disconnect(
        state: &mut RaceState,
        player: &PlayerId,
    ) -> Vec<(Recipient, RaceEvent)> {
        let Some(index) = state.seats.iter().position(|p| p == player) else {
            return Vec::new();
        };
        let had_turn = index == state.turn;
        state.seats.remove(index);
        if index < state.turn {
            state.turn -= 1;
        }
        if state.turn >= state.seats.len() {
            state.turn = 0;
        }

        if state.winner.is_some() {
            return Vec::new();
        }
        if let [last] = state.seats.as_slice() {
            state.winner = Some(last.clone());
            return vec![(Recipient::All, RaceEvent::Winner(last.clone()))];
        }
        match state.current() {
            Some(next) if had_turn => {
                vec![(Recipient::All, RaceEvent::Turn(next.clone()))]
            }
            _ => Vec::new(),
        }
    }
}
