//! Server configuration.
//!
//! Every field has a default, so an empty TOML file (or none at all) is a
//! valid configuration. Durations are plain integers with their unit in
//! the field name, which keeps the file format obvious.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::TabletopError;

/// Port used when none is given or the given one is out of bounds.
pub const DEFAULT_PORT: u16 = 10000;

/// Runtime settings for the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to listen on.
    pub host: IpAddr,

    /// Port to listen on. Out-of-bounds values fall back to
    /// [`DEFAULT_PORT`] (see [`ServerConfig::effective_port`]).
    pub port: u16,

    /// Lowest port a caller may pick.
    pub port_min: u16,

    /// Highest port a caller may pick.
    pub port_max: u16,

    /// How long a read may block before it counts as a read error. Also
    /// bounds the wait for the handshake line.
    pub read_timeout_secs: u64,

    /// Byte bound on the handshake line.
    pub handshake_max_len: usize,

    /// Byte bound on any later line.
    pub line_max_len: usize,

    /// Read errors (including timeouts) tolerated in a row before the
    /// player is kicked.
    pub max_read_errors: u32,

    /// Closed-stream observations tolerated before the player is dropped.
    pub max_lost_connection: u32,

    /// Pause after observing a closed stream, giving the client time to
    /// reconnect.
    pub lost_retry_delay_ms: u64,

    /// Maximum number of players served at once.
    pub max_players: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            port_min: 1024,
            port_max: 65535,
            read_timeout_secs: 60,
            handshake_max_len: 64,
            line_max_len: 1024,
            max_read_errors: 3,
            max_lost_connection: 3,
            lost_retry_delay_ms: 1000,
            max_players: 1024,
        }
    }
}

impl ServerConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, TabletopError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, TabletopError> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&text)
    }

    /// Sets the port from an untrusted number, such as a command-line
    /// argument. Values that don't fit the bounds are kept as-is and
    /// resolved by [`effective_port`](Self::effective_port).
    pub fn with_requested_port(mut self, requested: i64) -> Self {
        self.port = u16::try_from(requested).unwrap_or(0);
        self
    }

    /// The port the server will actually bind.
    pub fn effective_port(&self) -> u16 {
        if (self.port_min..=self.port_max).contains(&self.port) {
            self.port
        } else {
            tracing::warn!(
                requested = self.port,
                min = self.port_min,
                max = self.port_max,
                fallback = DEFAULT_PORT,
                "port out of range, using default"
            );
            DEFAULT_PORT
        }
    }

    /// The socket address the server will bind.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.effective_port())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn lost_retry_delay(&self) -> Duration {
        Duration::from_millis(self.lost_retry_delay_ms)
    }
}
