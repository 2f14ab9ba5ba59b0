//! Game session management for Tabletop.
//!
//! A game is a set of seats that players take one by one. When every seat
//! is filled the game starts and the [`GameLogic`] implementation takes
//! over turn handling. The server only ever talks to games through the
//! [`GameRegistry`].
//!
//! # Key types
//!
//! - [`GameLogic`]: the trait a game variant implements
//! - [`Game`]: one match: seats, lifecycle, logic state
//! - [`GameRegistry`]: the locked map of all games
//! - [`GameState`]: lifecycle state machine
//! - [`GameConfig`]: capacity bounds for a variant

mod config;
mod error;
mod game;
mod logic;
mod registry;

pub use config::{GameConfig, GameState};
pub use error::GameError;
pub use game::{Game, GameInfo, Outcome};
pub use logic::GameLogic;
pub use registry::GameRegistry;
