//! Per-connection handler: handshake, registration or reconnect, and
//! receiver start-up.
//!
//! Each accepted socket gets its own Tokio task running this handler.
//! The flow is:
//!   1. Read the handshake line under the read timeout
//!   2. Reconnect an existing player or register a new one
//!   3. Take a receiver slot and hand the read half to a receiver task
//!
//! The pending connection is moved in. Every early return drops what is
//! left of it, which closes the socket.

use std::net::IpAddr;
use std::sync::Arc;

use tabletop_protocol::{Handshake, Notice, PlayerId};
use tabletop_room::GameLogic;
use tabletop_session::{Link, Player, SessionError};
use tabletop_transport::{PendingConnection, TransportError};

use crate::receiver;
use crate::sender;
use crate::server::ServerState;
use crate::{ids, TabletopError};

/// Handles a single connection from accept to receiver start.
pub(crate) async fn handle_connection<G: GameLogic>(
    conn: PendingConnection,
    state: Arc<ServerState<G>>,
) -> Result<(), TabletopError> {
    let conn_id = conn.id();
    let address = conn.peer_addr().ip();
    tracing::debug!(%conn_id, %address, "handling new connection");

    let (mut reader, writer) = conn.into_split(state.config.handshake_max_len);

    // --- Step 1: Handshake ---
    let line = match reader.read_line_within(state.config.read_timeout()).await {
        Ok(Some(line)) => line,
        Ok(None) => {
            return Err(reject(
                &state,
                TransportError::ConnectionClosed("closed before handshake".into()).into(),
            ));
        }
        Err(e) => return Err(reject(&state, e.into())),
    };
    state.stats.record_received(line.len() + 1);
    tracing::info!(%conn_id, "<<-- {line}");

    let handshake = match Handshake::parse(&line) {
        Ok(handshake) => handshake,
        Err(e) => return Err(reject(&state, e.into())),
    };

    // --- Step 2: Reconnect or register ---
    let link = sender::open_link(writer, Arc::clone(&state.stats));
    let generation = link.generation();
    let player = match handshake {
        Handshake::Reconnect { player_id } => {
            let Some(target) = reconnect_target(&state, player_id, address).await else {
                return Err(reject(&state, SessionError::NoReconnectTarget.into()));
            };
            // The player keeps its slot, so this only fails for a target
            // removed since the lookup.
            if !state.claim_slot(&target).await {
                return Err(reject(&state, TabletopError::ReceiverUnavailable(target)));
            }
            match reconnect(&state, &target, link, address).await {
                Ok(player) => player,
                Err(e) => {
                    state.release_slot(&target).await;
                    return Err(reject(&state, e));
                }
            }
        }
        Handshake::Register { nickname } => {
            match state.players.find_by_address(address).await {
                Some(previous) => match reconnect(&state, &previous.id, link, address).await {
                    Ok(player) => player,
                    Err(e) => return Err(reject(&state, e)),
                },
                None => register(&state, nickname, address, link).await,
            }
        }
    };

    // --- Step 3: Receiver ---
    if !state.claim_slot(&player.id).await {
        tracing::warn!(player_id = %player.id, "no receiver slot, dropping player");
        sender::send(player.link(), &Notice::Crash(player.id.clone()));
        receiver::end_player(&state, &player.id, generation).await;
        return Err(TabletopError::ReceiverUnavailable(player.id));
    }

    reader.set_max_line(state.config.line_max_len);
    tracing::info!(%conn_id, player_id = %player.id, generation, "receiver started");
    tokio::spawn(receiver::run(
        Arc::clone(&state),
        player.id,
        reader,
        generation,
    ));
    Ok(())
}

/// Logs a refused connection and counts it as a bad message.
fn reject<G: GameLogic>(state: &ServerState<G>, error: TabletopError) -> TabletopError {
    state.stats.record_bad();
    tracing::warn!(error = %error, "player could not be added");
    error
}

/// Picks the player a `_player_reconnect` handshake refers to: the named
/// one if it exists, otherwise the one disconnected player at `address`.
async fn reconnect_target<G: GameLogic>(
    state: &ServerState<G>,
    named: Option<PlayerId>,
    address: IpAddr,
) -> Option<PlayerId> {
    if let Some(id) = named {
        if state.players.contains(&id).await {
            return Some(id);
        }
    }
    state.players.find_by_address(address).await.map(|p| p.id)
}

async fn reconnect<G: GameLogic>(
    state: &ServerState<G>,
    id: &PlayerId,
    link: Link,
    address: IpAddr,
) -> Result<Player, TabletopError> {
    let player = state.players.rebind(id, link, address).await?;
    tracing::info!(player_id = %player.id, nickname = %player.nickname, "player reconnected");
    sender::send(player.link(), &Notice::Reconnected(player.id.clone()));
    Ok(player)
}

async fn register<G: GameLogic>(
    state: &ServerState<G>,
    nickname: String,
    address: IpAddr,
    link: Link,
) -> Player {
    loop {
        let id = PlayerId::new(ids::generate(&state.players, &state.games).await);
        let player = Player::new(id.clone(), nickname.clone(), address, link.clone());
        match state.players.insert(player.clone()).await {
            Ok(()) => {
                sender::send(player.link(), &Notice::Registered(id));
                return player;
            }
            Err(e) => {
                tracing::debug!(error = %e, "id taken before insert, drawing again");
            }
        }
    }
}
