//! # Tabletop
//!
//! Lobby and session server for turn-based multiplayer games spoken over
//! a line-based TCP protocol.
//!
//! Clients register (or reconnect) as players, list and create games,
//! take seats, and exchange turns. Game developers implement a single
//! [`GameLogic`] trait and the server handles connections, player and
//! game registries, reconnection, and delivery.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tabletop::prelude::*;
//!
//! // Implement GameLogic for your game, then:
//! // let server = TabletopServerBuilder::new()
//! //     .port(10000)
//! //     .build::<MyGame>()
//! //     .await?;
//! // server.run().await
//! ```

mod config;
mod dispatch;
mod error;
mod handler;
pub mod ids;
mod receiver;
mod sender;
mod server;
mod stats;

pub use config::{ServerConfig, DEFAULT_PORT};
pub use error::TabletopError;
pub use sender::{seat_color, SEAT_COLORS};
pub use server::{ServerState, TabletopServer, TabletopServerBuilder};
pub use stats::{Stats, StatsSnapshot};

pub use tabletop_protocol::{GameId, Notice, PlayerId, Recipient};
pub use tabletop_room::{GameConfig, GameInfo, GameLogic, GameState};
pub use tabletop_session::Player;

/// Everything a game variant and its binary usually need.
pub mod prelude {
    pub use crate::{
        GameConfig, GameId, GameInfo, GameLogic, GameState, PlayerId, Recipient,
        ServerConfig, TabletopError, TabletopServer, TabletopServerBuilder,
    };
}
