//! Player session management for Tabletop.
//!
//! This crate knows who is on the server and how to reach them:
//!
//! 1. **Players**: the identity a client registers once and keeps
//!    across reconnects ([`Player`]).
//! 2. **Links**: the live socket a player is currently bound to, as an
//!    outbound line queue plus a generation number ([`Link`]).
//! 3. **Registry**: the locked map of all players ([`PlayerRegistry`]).
//!
//! # Reconnection and generations
//!
//! Every [`Link`] gets a fresh generation when it is created. Reconnecting
//! replaces a player's link under the registry lock, so the generation a
//! receiver task was started with tells it whether it still owns the
//! player:
//!
//! ```text
//!  register ──→ link g1 ──(socket lost)──→ reconnect ──→ link g2
//!                 │                                        │
//!          receiver(g1) sees Superseded, exits      receiver(g2) owns player
//! ```

mod error;
mod player;
mod registry;

pub use error::SessionError;
pub use player::{Link, LinkStatus, Player};
pub use registry::PlayerRegistry;
