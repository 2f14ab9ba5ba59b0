//! Unified error type for the Tabletop server.

use tabletop_protocol::{PlayerId, ProtocolError};
use tabletop_room::GameError;
use tabletop_session::SessionError;
use tabletop_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Per-connection failures end up here as the result of a handler or
/// receiver task and are logged there; only startup and accept-loop
/// errors reach `main`.
#[derive(Debug, thiserror::Error)]
pub enum TabletopError {
    /// A transport-level error (bind, accept, read, write).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A line that could not be parsed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A player registry error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A game registry error.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Every receiver slot is taken; the player could not be served.
    #[error("no receiver available for player {0}")]
    ReceiverUnavailable(PlayerId),

    /// Reading the configuration file failed.
    #[error("cannot read config: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// The configuration file is not valid TOML for [`ServerConfig`](crate::ServerConfig).
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
