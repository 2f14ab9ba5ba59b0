//! Wire protocol for Tabletop.
//!
//! Every message is one line of ASCII text, fields separated by `;`,
//! terminated by `\n`. The first field addresses a player (client to
//! server: the sender; server to client: the recipient or subject), the
//! second names the command.
//!
//! - **Types** ([`PlayerId`], [`GameId`], [`Recipient`]): identities.
//! - **Tokens** ([`Tokens`]): splitting a line into optional fields.
//! - **Client messages** ([`Handshake`], [`ClientMessage`], [`Command`]):
//!   what the server accepts.
//! - **Notices** ([`Notice`]): what the server sends back.
//!
//! ```text
//! Transport (lines) → Protocol (typed messages) → Session / Room
//! ```

mod error;
mod message;
mod notice;
mod tokens;
mod types;

pub use error::ProtocolError;
pub use message::{ClientMessage, Command, Handshake, DEFAULT_NICKNAME};
pub use notice::{GameListEntry, Notice, RosterEntry};
pub use tokens::{Tokens, DELIMITER, MAX_CLIENT_TOKENS};
pub use types::{GameId, PlayerId, Recipient};
