//! Integration tests for the Tabletop server over real loopback sockets.

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tabletop::prelude::*;
use tabletop::ServerState;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

// =========================================================================
// Mock game and helpers
// =========================================================================

/// Every choice is announced to the whole table.
struct EchoGame;

impl GameLogic for EchoGame {
    type State = ();
    type Event = String;

    fn init(_seats: &[PlayerId]) {}

    fn handle_choice(
        _state: &mut (),
        sender: &PlayerId,
        choice: u32,
    ) -> Vec<(Recipient, String)> {
        vec![(Recipient::All, format!("echo;{sender};{choice}"))]
    }

    fn is_finished(_state: &()) -> bool {
        false
    }
}

const WAIT: Duration = Duration::from_secs(3);

fn test_config() -> ServerConfig {
    ServerConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        port_min: 0,
        read_timeout_secs: 5,
        lost_retry_delay_ms: 20,
        max_lost_connection: 1,
        ..ServerConfig::default()
    }
}

async fn start(config: ServerConfig) -> (SocketAddr, Arc<ServerState<EchoGame>>) {
    let server = TabletopServerBuilder::new()
        .config(config)
        .build::<EchoGame>()
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    let state = server.state();
    tokio::spawn(server.run());
    (addr, state)
}

struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        let (read, writer) = TcpStream::connect(addr).await.unwrap().into_split();
        Self {
            reader: BufReader::new(read),
            writer,
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .unwrap();
    }

    /// Next line, or `None` once the server has closed the socket.
    async fn recv(&mut self) -> Option<String> {
        let mut line = String::new();
        let read = tokio::time::timeout(WAIT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for a line")
            .unwrap_or(0);
        (read > 0).then(|| line.trim_end().to_string())
    }

    /// Skips lines until one contains `needle`.
    async fn recv_containing(&mut self, needle: &str) -> String {
        loop {
            let line = self.recv().await.expect("socket closed");
            if line.contains(needle) {
                return line;
            }
        }
    }

    /// Registers and returns the assigned id.
    async fn register(&mut self, nickname: &str) -> String {
        self.send(&format!("0;_player_nickname;{nickname}")).await;
        let reply = self.recv().await.expect("registration reply");
        let (id, keyword) = reply.split_once(';').unwrap();
        assert_eq!(keyword, "_player_id");
        id.to_string()
    }
}

async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + WAIT;
    while !check().await {
        assert!(tokio::time::Instant::now() < deadline, "condition never held");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// =========================================================================
// Registration and lobby
// =========================================================================

#[tokio::test]
async fn test_register_assigns_decimal_id() {
    let (addr, state) = start(test_config()).await;
    let mut client = TestClient::connect(addr).await;

    let id = client.register("alice").await;

    assert!(id.parse::<u32>().is_ok(), "id {id} is not decimal");
    let player = state.players().find(&PlayerId::new(&id)).await.unwrap();
    assert_eq!(player.nickname, "alice");
}

#[tokio::test]
async fn test_register_without_nickname_uses_default() {
    let (addr, state) = start(test_config()).await;
    let mut client = TestClient::connect(addr).await;

    client.send("0;_player_nickname").await;
    let reply = client.recv().await.unwrap();
    let id = reply.split(';').next().unwrap();

    let player = state.players().find(&PlayerId::new(id)).await.unwrap();
    assert_eq!(player.nickname, "Player");
}

#[tokio::test]
async fn test_unknown_handshake_creates_no_player() {
    let (addr, state) = start(test_config()).await;
    let mut client = TestClient::connect(addr).await;

    client.send("0;hello_there").await;

    assert_eq!(client.recv().await, None);
    assert!(state.players().is_empty().await);
    assert_eq!(state.stats().snapshot().messages_bad, 1);
}

#[tokio::test]
async fn test_reconnect_without_target_is_rejected() {
    let (addr, state) = start(test_config()).await;
    let mut client = TestClient::connect(addr).await;

    client.send("12345;_player_reconnect").await;

    assert_eq!(client.recv().await, None);
    assert!(state.players().is_empty().await);
}

#[tokio::test]
async fn test_create_and_join_game() {
    let (addr, state) = start(test_config()).await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;
    let alice_id = alice.register("alice").await;
    let bob_id = bob.register("bob").await;

    alice.send(&format!("{alice_id};create_new_game;2")).await;
    let prepare = alice.recv_containing("prepare_window_for_game").await;
    let game_id = prepare.split(';').nth(2).unwrap().to_string();
    assert_eq!(
        prepare,
        format!("{alice_id};prepare_window_for_game;{game_id};alice;2")
    );

    bob.send(&format!("{bob_id};get_games")).await;
    let list = bob.recv_containing(&game_id).await;
    assert_eq!(list, format!("0;update_games;alice;{game_id};2"));

    bob.send(&format!("{bob_id};join_player_to_game;{game_id}")).await;
    let roster = format!("{game_id};update_players;{alice_id};alice;RED;{bob_id};bob;BLUE");
    assert_eq!(bob.recv_containing("update_players").await, roster);
    assert_eq!(alice.recv_containing(";bob;").await, roster);

    bob.send(&format!("{bob_id};game_choice_selected;2")).await;
    let echo = format!("{game_id};echo;{bob_id};2");
    assert_eq!(alice.recv_containing("echo").await, echo);
    assert_eq!(bob.recv_containing("echo").await, echo);

    let info = state.games().find(&GameId::new(&game_id)).await.unwrap();
    assert_eq!(info.state, GameState::InProgress);
}

#[tokio::test]
async fn test_join_unknown_game_cannot_join() {
    let (addr, _state) = start(test_config()).await;
    let mut client = TestClient::connect(addr).await;
    let id = client.register("alice").await;

    client.send(&format!("{id};join_player_to_game;1")).await;

    assert_eq!(client.recv().await, Some(format!("{id};cannot_join_game")));
}

#[tokio::test]
async fn test_bogus_command_counts_bad_and_keeps_connection() {
    let (addr, state) = start(test_config()).await;
    let mut client = TestClient::connect(addr).await;
    let id = client.register("alice").await;

    client.send(&format!("{id};teleport;9")).await;
    client.send(&format!("{id};get_games")).await;

    assert_eq!(client.recv().await, Some("0;update_games".to_string()));
    assert_eq!(state.stats().snapshot().messages_bad, 1);
    assert_eq!(state.players().len().await, 1);
}

// =========================================================================
// Leaving and losing connections
// =========================================================================

#[tokio::test]
async fn test_disconnect_player_removes_and_closes() {
    let (addr, state) = start(test_config()).await;
    let mut client = TestClient::connect(addr).await;
    let id = client.register("alice").await;

    client.send(&format!("{id};disconnect_player")).await;

    assert_eq!(client.recv().await, Some(format!("{id};disconnect_player")));
    assert_eq!(client.recv().await, None);
    assert!(state.players().is_empty().await);
    assert_eq!(state.active_receivers(), 0);
}

#[tokio::test]
async fn test_abrupt_close_removes_player_and_frees_seat() {
    let (addr, state) = start(test_config()).await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;
    let alice_id = alice.register("alice").await;
    let bob_id = bob.register("bob").await;

    alice.send(&format!("{alice_id};create_new_game;3")).await;
    let prepare = alice.recv_containing("prepare_window_for_game").await;
    let game_id = GameId::new(prepare.split(';').nth(2).unwrap());
    bob.send(&format!("{bob_id};join_player_to_game;{game_id}")).await;
    bob.recv_containing("update_players").await;
    alice.recv_containing(";bob;").await;

    drop(bob);

    let alice_pid = PlayerId::new(&alice_id);
    let players = state.players();
    eventually(|| async move { players.len().await == 1 }).await;
    let info = state.games().find(&game_id).await.unwrap();
    assert_eq!(info.seats, vec![alice_pid]);
    assert_eq!(
        alice.recv_containing("update_players").await,
        format!("{game_id};update_players;{alice_id};alice;RED")
    );
}

#[tokio::test]
async fn test_silent_client_is_kicked() {
    let config = ServerConfig {
        read_timeout_secs: 1,
        max_read_errors: 0,
        ..test_config()
    };
    let (addr, state) = start(config).await;
    let mut client = TestClient::connect(addr).await;
    let id = client.register("alice").await;

    assert_eq!(client.recv().await, Some(format!("{id};kick_player")));
    let players = state.players();
    eventually(|| async move { players.is_empty().await }).await;
}

// =========================================================================
// Reconnection
// =========================================================================

fn patient_config() -> ServerConfig {
    ServerConfig {
        lost_retry_delay_ms: 200,
        max_lost_connection: 10,
        ..test_config()
    }
}

#[tokio::test]
async fn test_reconnect_by_id_keeps_player_and_game() {
    let (addr, state) = start(patient_config()).await;
    let mut first = TestClient::connect(addr).await;
    let id = first.register("alice").await;
    first.send(&format!("{id};create_new_game;2")).await;
    let prepare = first.recv_containing("prepare_window_for_game").await;
    let game_id = GameId::new(prepare.split(';').nth(2).unwrap());
    drop(first);

    let mut second = TestClient::connect(addr).await;
    second.send(&format!("{id};_player_reconnect")).await;
    assert_eq!(
        second.recv().await,
        Some(format!("{id};_player_id_reconnected"))
    );

    // Outlive the old receiver's retry budget.
    tokio::time::sleep(Duration::from_millis(600)).await;

    let player = state.players().find(&PlayerId::new(&id)).await.unwrap();
    assert_eq!(player.game, Some(game_id));
    assert_eq!(state.players().len().await, 1);

    second.send(&format!("{id};get_games")).await;
    assert!(second.recv_containing("update_games").await.starts_with("0;"));
    assert_eq!(state.active_receivers(), 1);
}

#[tokio::test]
async fn test_reconnect_at_capacity_keeps_player() {
    let config = ServerConfig {
        max_players: 1,
        ..patient_config()
    };
    let (addr, state) = start(config).await;
    let mut first = TestClient::connect(addr).await;
    let id = first.register("alice").await;
    drop(first);

    let mut second = TestClient::connect(addr).await;
    second.send(&format!("{id};_player_reconnect")).await;
    assert_eq!(
        second.recv().await,
        Some(format!("{id};_player_id_reconnected"))
    );

    second.send(&format!("{id};get_games")).await;
    assert_eq!(second.recv().await, Some("0;update_games".to_string()));
    assert!(state.players().contains(&PlayerId::new(&id)).await);
    assert_eq!(state.players().len().await, 1);
    assert_eq!(state.active_receivers(), 1);
}

#[tokio::test]
async fn test_register_without_free_slot_crashes_and_rolls_back() {
    let config = ServerConfig {
        max_players: 1,
        ..test_config()
    };
    let (addr, state) = start(config).await;
    let mut alice = TestClient::connect(addr).await;
    let alice_id = alice.register("alice").await;

    let mut bob = TestClient::connect(addr).await;
    let bob_id = bob.register("bob").await;

    assert_eq!(bob.recv().await, Some(format!("{bob_id};player_crash")));
    assert_eq!(bob.recv().await, None);
    assert!(!state.players().contains(&PlayerId::new(&bob_id)).await);
    assert!(state.players().contains(&PlayerId::new(&alice_id)).await);
    assert_eq!(state.players().len().await, 1);
    assert_eq!(state.active_receivers(), 1);
}

#[tokio::test]
async fn test_reconnect_by_address_finds_disconnected_player() {
    let (addr, state) = start(patient_config()).await;
    let mut first = TestClient::connect(addr).await;
    let id = first.register("alice").await;
    drop(first);

    let pid = &PlayerId::new(&id);
    let players = state.players();
    eventually(|| async move {
        players.find(pid).await.is_some_and(|p| !p.connected)
    })
    .await;

    let mut second = TestClient::connect(addr).await;
    second.send("0;_player_reconnect").await;
    assert_eq!(
        second.recv().await,
        Some(format!("{id};_player_id_reconnected"))
    );
    assert_eq!(state.players().len().await, 1);
}
