//! Outbound delivery: per-link writer tasks, single sends, and broadcast.
//!
//! Nothing in here touches a socket while a registry lock is held. Sends
//! only enqueue on a [`Link`]; the writer task spawned by [`open_link`]
//! owns the write half and does the actual I/O.

use std::sync::Arc;

use tabletop_protocol::{Notice, PlayerId, Recipient};
use tabletop_room::{GameInfo, GameLogic, Outcome};
use tabletop_session::{Link, Player};
use tabletop_transport::LineWriter;
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::stats::Stats;

/// Colors handed out to seats in join order.
pub const SEAT_COLORS: [&str; 8] = [
    "RED", "BLUE", "GREEN", "ORANGE", "PURPLE", "YELLOW", "PINK", "BROWN",
];

/// Spawns the writer task for `writer` and returns the link feeding it.
///
/// The task ends when every clone of the link is dropped or a write
/// fails; either way the socket's write half is closed.
pub(crate) fn open_link(writer: LineWriter, stats: Arc<Stats>) -> Link {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(write_loop(writer, rx, stats));
    Link::new(tx)
}

async fn write_loop(
    mut writer: LineWriter,
    mut queue: mpsc::UnboundedReceiver<String>,
    stats: Arc<Stats>,
) {
    let conn_id = writer.id();
    while let Some(line) = queue.recv().await {
        match writer.write_line(&line).await {
            Ok(bytes) => stats.record_sent(bytes),
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "write failed, closing writer");
                return;
            }
        }
    }
    if let Err(e) = writer.close().await {
        tracing::debug!(%conn_id, error = %e, "shutdown failed");
    }
}

/// Sends one notice on one link.
pub(crate) fn send(link: &Link, notice: &Notice) {
    let line = notice.to_line();
    tracing::info!("-->> {line}");
    if !link.send(line) {
        tracing::debug!(generation = link.generation(), "link closed, notice dropped");
    }
}

/// Sends one notice to every connected player.
pub(crate) async fn broadcast<G: GameLogic>(state: &ServerState<G>, notice: &Notice) {
    let links = state.players.connected_links().await;
    let line = notice.to_line();
    tracing::info!(recipients = links.len(), "-->> (BC) {line}");
    for link in links {
        link.send(line.clone());
    }
}

// ---------------------------------------------------------------------------
// Game notices
// ---------------------------------------------------------------------------

/// Broadcasts the list of games that still have a free seat.
pub(crate) async fn broadcast_game_list<G: GameLogic>(state: &ServerState<G>) {
    let entries = state
        .games
        .list()
        .await
        .into_iter()
        .filter(GameInfo::has_free_seat)
        .map(|info| tabletop_protocol::GameListEntry {
            name: info.name,
            game_id: info.id,
            capacity: info.capacity,
        })
        .collect();
    broadcast(state, &Notice::GameList(entries)).await;
}

/// Tells every seated player who sits where.
pub(crate) async fn send_roster<G: GameLogic>(state: &ServerState<G>, info: &GameInfo) {
    let seated = state.players.find_many(&info.seats).await;
    let notice = Notice::Roster {
        game_id: info.id.clone(),
        seats: seated
            .iter()
            .enumerate()
            .map(|(i, player)| tabletop_protocol::RosterEntry {
                player_id: player.id.clone(),
                nickname: player.nickname.clone(),
                color: seat_color(i),
            })
            .collect(),
    };
    for player in &seated {
        send(player.link(), &notice);
    }
}

/// Delivers the events a game produced to the seats they address.
pub(crate) async fn deliver_events<G: GameLogic>(
    state: &ServerState<G>,
    outcome: &Outcome<G>,
) {
    if outcome.events.is_empty() {
        return;
    }
    let seated = state.players.find_many(&outcome.info.seats).await;
    for (recipient, event) in &outcome.events {
        let notice = Notice::GameEvent {
            game_id: outcome.info.id.clone(),
            event: event.to_string(),
        };
        for player in seated.iter().filter(|p| recipient.includes(&p.id)) {
            send(player.link(), &notice);
        }
        if let Recipient::Player(id) = recipient {
            warn_if_unseated(id, &seated);
        }
    }
}

fn warn_if_unseated(id: &PlayerId, seated: &[Player]) {
    if !seated.iter().any(|p| &p.id == id) {
        tracing::warn!(player_id = %id, "game event addressed to a player without a seat");
    }
}

/// Color of the seat at `index`, cycling through [`SEAT_COLORS`].
pub fn seat_color(index: usize) -> &'static str {
    SEAT_COLORS[index % SEAT_COLORS.len()]
}
