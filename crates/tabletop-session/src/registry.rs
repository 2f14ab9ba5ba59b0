//! The player registry: every registered player, behind one lock.
//!
//! # Concurrency note
//!
//! The map sits behind a `tokio::sync::Mutex`. Every method takes the lock
//! for its whole duration and releases it before returning, so callers
//! never hold it across network I/O (sending on a [`Link`] only queues a
//! line). Methods return clones of players rather than references; a
//! snapshot may be stale a moment later, which is fine for the fields the
//! server reads (`connected` in particular is advisory).

use std::collections::HashMap;
use std::net::IpAddr;

use tabletop_protocol::{GameId, PlayerId};
use tokio::sync::Mutex;

use crate::{Link, LinkStatus, Player, SessionError};

/// All registered players, keyed by id.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: Mutex<HashMap<PlayerId, Player>>,
}

impl PlayerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a player.
    ///
    /// # Errors
    /// [`SessionError::DuplicateId`] if the id is taken; the registry is
    /// left untouched.
    pub async fn insert(&self, player: Player) -> Result<(), SessionError> {
        let mut players = self.players.lock().await;
        if players.contains_key(&player.id) {
            return Err(SessionError::DuplicateId(player.id));
        }
        tracing::info!(player_id = %player.id, nickname = %player.nickname, "player registered");
        players.insert(player.id.clone(), player);
        Ok(())
    }

    /// Removes a player unconditionally, returning the removed record.
    pub async fn remove(&self, id: &PlayerId) -> Option<Player> {
        let removed = self.players.lock().await.remove(id);
        if removed.is_some() {
            tracing::info!(player_id = %id, "player removed");
        }
        removed
    }

    /// Looks up a player by id.
    pub async fn find(&self, id: &PlayerId) -> Option<Player> {
        self.players.lock().await.get(id).cloned()
    }

    /// Returns `true` if a player with this id is registered.
    pub async fn contains(&self, id: &PlayerId) -> bool {
        self.players.lock().await.contains_key(id)
    }

    /// Finds the player a client at `address` may silently reconnect to.
    ///
    /// Only matches when exactly one player is known at that address and
    /// that player is currently disconnected. Two players behind the same
    /// address are ambiguous, and a connected player is not waiting for a
    /// reconnect.
    pub async fn find_by_address(&self, address: IpAddr) -> Option<Player> {
        let players = self.players.lock().await;
        let mut at_address = players.values().filter(|p| p.address == address);
        let candidate = at_address.next()?;
        if at_address.next().is_some() || candidate.connected {
            return None;
        }
        Some(candidate.clone())
    }

    /// Binds a player to a new link after a reconnect.
    ///
    /// The player keeps its id, nickname, and game; it is marked connected
    /// and its address updated. The returned snapshot reflects the player
    /// right after this rebind, under the same lock, so concurrent
    /// reconnects for one player are applied one after the other.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the player is not registered.
    pub async fn rebind(
        &self,
        id: &PlayerId,
        link: Link,
        address: IpAddr,
    ) -> Result<Player, SessionError> {
        let mut players = self.players.lock().await;
        let player = players
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;

        let old = player.replace_link(link);
        player.connected = true;
        player.address = address;

        tracing::info!(
            player_id = %id,
            old_generation = old.generation(),
            new_generation = player.link().generation(),
            "player rebound to new link"
        );
        Ok(player.clone())
    }

    /// Reports whether `generation` is still the player's current link.
    pub async fn link_status(&self, id: &PlayerId, generation: u64) -> LinkStatus {
        match self.players.lock().await.get(id) {
            Some(player) => player.link_status(generation),
            None => LinkStatus::Gone,
        }
    }

    /// Sets the `connected` flag, but only on behalf of the current link.
    ///
    /// A superseded receiver must not flip the flag of a player that has
    /// already moved to a new socket.
    pub async fn mark_connected(
        &self,
        id: &PlayerId,
        generation: u64,
        connected: bool,
    ) -> LinkStatus {
        let mut players = self.players.lock().await;
        let Some(player) = players.get_mut(id) else {
            return LinkStatus::Gone;
        };
        let status = player.link_status(generation);
        if status == LinkStatus::Current {
            player.connected = connected;
        }
        status
    }

    /// Records which game the player is seated in.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the player is not registered.
    pub async fn set_game(
        &self,
        id: &PlayerId,
        game: Option<GameId>,
    ) -> Result<(), SessionError> {
        let mut players = self.players.lock().await;
        let player = players
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;
        player.game = game;
        Ok(())
    }

    /// Removes the player if its current link still has `generation`.
    ///
    /// This is how a receiver ends its player's lifecycle: if a reconnect
    /// got in first, the player stays and `None` is returned.
    pub async fn retire(&self, id: &PlayerId, generation: u64) -> Option<Player> {
        let mut players = self.players.lock().await;
        let current = players
            .get(id)
            .is_some_and(|p| p.link_status(generation) == LinkStatus::Current);
        if !current {
            return None;
        }

        let mut player = players.remove(id)?;
        player.connected = false;
        tracing::info!(player_id = %id, generation, "player retired");
        Some(player)
    }

    /// Snapshots the links of every connected player.
    pub async fn connected_links(&self) -> Vec<Link> {
        self.players
            .lock()
            .await
            .values()
            .filter(|p| p.connected)
            .map(|p| p.link().clone())
            .collect()
    }

    /// Snapshots the given players that are still registered, in the order
    /// asked for.
    pub async fn find_many(&self, ids: &[PlayerId]) -> Vec<Player> {
        let players = self.players.lock().await;
        ids.iter().filter_map(|id| players.get(id).cloned()).collect()
    }

    /// Visits every player under the lock.
    ///
    /// The visitor is synchronous, so it cannot await I/O while the lock
    /// is held.
    pub async fn for_each(&self, mut visit: impl FnMut(&Player)) {
        let players = self.players.lock().await;
        for player in players.values() {
            visit(player);
        }
    }

    /// Returns the number of registered players.
    pub async fn len(&self) -> usize {
        self.players.lock().await.len()
    }

    /// Returns `true` if no players are registered.
    pub async fn is_empty(&self) -> bool {
        self.players.lock().await.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
