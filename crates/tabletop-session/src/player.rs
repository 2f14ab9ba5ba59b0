//! The player record and its socket link.

use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tabletop_protocol::{GameId, PlayerId};
use tokio::sync::mpsc;

/// Counter for link generations. Starts at 1 so 0 never names a link.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// A player's binding to one live socket.
///
/// Lines pushed into the link are written to the socket by a writer task
/// that owns the write half. Sending never blocks, so a link can be used
/// while a registry lock is held without holding that lock across I/O.
///
/// Cloning a link clones the queue handle. The writer task stops once
/// every clone is gone, which closes the write direction of the socket.
#[derive(Debug, Clone)]
pub struct Link {
    generation: u64,
    outbound: mpsc::UnboundedSender<String>,
}

impl Link {
    /// Wraps the sending side of a writer task's queue.
    pub fn new(outbound: mpsc::UnboundedSender<String>) -> Self {
        Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            outbound,
        }
    }

    /// The generation this link was created with.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Queues a line for the socket. Returns `false` if the writer is gone.
    pub fn send(&self, line: impl Into<String>) -> bool {
        self.outbound.send(line.into()).is_ok()
    }

    /// Returns `true` while the writer task is still draining the queue.
    pub fn is_open(&self) -> bool {
        !self.outbound.is_closed()
    }
}

/// What a receiver learns when it asks about its link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// The player is still bound to the asking receiver's link.
    Current,
    /// A reconnect installed a newer link.
    Superseded,
    /// The player has been removed from the registry.
    Gone,
}

/// A registered client identity.
#[derive(Debug, Clone)]
pub struct Player {
    /// Primary key and protocol address. Never changes.
    pub id: PlayerId,

    /// Display name, `Player` unless the client chose one.
    pub nickname: String,

    /// Peer IP the player last connected from.
    pub address: IpAddr,

    /// `true` while the receiver is successfully reading from the socket.
    /// Broadcasts skip players for whom this is `false`.
    pub connected: bool,

    /// The game the player is seated in; `None` means the lobby.
    pub game: Option<GameId>,

    link: Link,
}

impl Player {
    /// Creates a connected player in the lobby.
    pub fn new(
        id: PlayerId,
        nickname: impl Into<String>,
        address: IpAddr,
        link: Link,
    ) -> Self {
        Self {
            id,
            nickname: nickname.into(),
            address,
            connected: true,
            game: None,
            link,
        }
    }

    /// The currently bound link.
    pub fn link(&self) -> &Link {
        &self.link
    }

    /// Queues a line on the current link. Returns `false` if its writer
    /// is gone.
    pub fn send(&self, line: impl Into<String>) -> bool {
        self.link.send(line)
    }

    /// Compares the current link against a receiver's generation.
    pub fn link_status(&self, generation: u64) -> LinkStatus {
        if self.link.generation() == generation {
            LinkStatus::Current
        } else {
            LinkStatus::Superseded
        }
    }

    /// Binds a new link, returning the one it replaces.
    pub(crate) fn replace_link(&mut self, link: Link) -> Link {
        std::mem::replace(&mut self.link, link)
    }
}
