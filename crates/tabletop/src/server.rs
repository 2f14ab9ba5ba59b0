//! `TabletopServer` builder and accept loop.
//!
//! This is the entry point for running a Tabletop server. It ties
//! together all the layers: transport → protocol → session → room.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tabletop_protocol::PlayerId;
use tabletop_room::{GameLogic, GameRegistry};
use tabletop_session::PlayerRegistry;
use tabletop_transport::{TcpLineTransport, Transport};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

use crate::handler::handle_connection;
use crate::stats::Stats;
use crate::{ServerConfig, TabletopError};

/// Shared server state passed to every connection task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. Each
/// registry carries its own lock.
///
/// Receiver slots belong to players, not to receiver tasks: a player
/// claims one when it registers and keeps it across reconnects until it
/// is removed. At most `max_players` players are served at once.
pub struct ServerState<G: GameLogic> {
    pub(crate) players: PlayerRegistry,
    pub(crate) games: GameRegistry<G>,
    pub(crate) stats: Arc<Stats>,
    pub(crate) config: ServerConfig,
    receivers: Arc<Semaphore>,
    slots: Mutex<HashMap<PlayerId, OwnedSemaphorePermit>>,
}

impl<G: GameLogic> ServerState<G> {
    pub(crate) fn new(config: ServerConfig) -> Self {
        Self {
            players: PlayerRegistry::new(),
            games: GameRegistry::new(),
            stats: Arc::new(Stats::new()),
            receivers: Arc::new(Semaphore::new(config.max_players)),
            slots: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Makes sure `id` holds a receiver slot. Returns `false` if it has
    /// none and none is free.
    pub(crate) async fn claim_slot(&self, id: &PlayerId) -> bool {
        let mut slots = self.slots.lock().await;
        if slots.contains_key(id) {
            return true;
        }
        match Arc::clone(&self.receivers).try_acquire_owned() {
            Ok(permit) => {
                slots.insert(id.clone(), permit);
                true
            }
            Err(_) => false,
        }
    }

    /// Gives back the slot of a removed player.
    pub(crate) async fn release_slot(&self, id: &PlayerId) {
        self.slots.lock().await.remove(id);
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn games(&self) -> &GameRegistry<G> {
        &self.games
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of receiver slots in use, one per served player.
    pub fn active_receivers(&self) -> usize {
        self.config.max_players - self.receivers.available_permits()
    }
}

/// Builder for configuring and starting a Tabletop server.
///
/// # Example
///
/// ```rust,ignore
/// use tabletop::prelude::*;
///
/// let server = TabletopServerBuilder::new()
///     .port(10000)
///     .build::<MyGame>()
///     .await?;
/// server.run().await
/// ```
pub struct TabletopServerBuilder {
    config: ServerConfig,
}

impl TabletopServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the port. Out-of-bounds values fall back to the default port.
    pub fn port(mut self, port: i64) -> Self {
        self.config = self.config.with_requested_port(port);
        self
    }

    /// Binds the listening socket.
    ///
    /// # Errors
    /// [`TabletopError::Transport`] if the address cannot be bound.
    pub async fn build<G: GameLogic>(self) -> Result<TabletopServer<G>, TabletopError> {
        let transport = TcpLineTransport::bind(self.config.bind_addr()).await?;
        let state = Arc::new(ServerState::new(self.config));
        Ok(TabletopServer { transport, state })
    }
}

impl Default for TabletopServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Tabletop server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TabletopServer<G: GameLogic> {
    transport: TcpLineTransport,
    state: Arc<ServerState<G>>,
}

impl<G: GameLogic> TabletopServer<G> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a handle on the shared state, for the operator console.
    pub fn state(&self) -> Arc<ServerState<G>> {
        Arc::clone(&self.state)
    }

    /// Runs the accept loop.
    ///
    /// Each accepted socket is handed to its own handler task; the loop
    /// never waits on one. Returns only when `accept` fails.
    pub async fn run(mut self) -> Result<(), TabletopError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Tabletop server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection::<G>(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                    return Err(e.into());
                }
            }
        }
    }
}
