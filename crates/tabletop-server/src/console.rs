//! Operator console on stdin.
//!
//! One command per line: `quit`, `info`, `memory`, `games`, `players`.

use std::fmt::Write as _;
use std::sync::Arc;

use tabletop::{GameLogic, ServerState};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Quit,
    Info,
    Memory,
    Games,
    Players,
    Unknown(String),
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "quit" => Self::Quit,
            "info" => Self::Info,
            "memory" => Self::Memory,
            "games" => Self::Games,
            "players" => Self::Players,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Reads commands until `quit`.
///
/// If stdin closes (the server runs detached) the console goes quiet and
/// never returns, leaving the server running.
pub async fn run<G: GameLogic>(state: Arc<ServerState<G>>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::info!("stdin closed, console disabled");
                std::future::pending::<()>().await;
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "console read failed, console disabled");
                std::future::pending::<()>().await;
                return;
            }
        };

        match ConsoleCommand::parse(&line) {
            ConsoleCommand::Quit => return,
            ConsoleCommand::Unknown(other) if other.is_empty() => {}
            command => println!("{}", render(&command, &state).await),
        }
    }
}

/// Produces the console output for a command.
pub async fn render<G: GameLogic>(command: &ConsoleCommand, state: &ServerState<G>) -> String {
    match command {
        ConsoleCommand::Quit => "bye".to_string(),
        ConsoleCommand::Info => state.stats().snapshot().to_string(),
        ConsoleCommand::Memory => format!(
            "players:   {}\ngames:     {}\nreceivers: {}/{}",
            state.players().len().await,
            state.games().len().await,
            state.active_receivers(),
            state.config().max_players,
        ),
        ConsoleCommand::Games => {
            let mut out = String::new();
            for game in state.games().list().await {
                let _ = writeln!(
                    out,
                    "{:>10}  {:<16} owner {:>10}  {}/{}  {}",
                    game.id,
                    game.name,
                    game.owner,
                    game.seats.len(),
                    game.capacity,
                    game.state,
                );
            }
            if out.is_empty() {
                out.push_str("no games");
            }
            out.trim_end().to_string()
        }
        ConsoleCommand::Players => {
            let mut out = String::new();
            state
                .players()
                .for_each(|player| {
                    let game = player.game.as_ref().map_or("-".to_string(), ToString::to_string);
                    let _ = writeln!(
                        out,
                        "{:>10}  {:<16} {:<15} {:<12} game {}",
                        player.id,
                        player.nickname,
                        player.address,
                        if player.connected { "connected" } else { "disconnected" },
                        game,
                    );
                })
                .await;
            if out.is_empty() {
                out.push_str("no players");
            }
            out.trim_end().to_string()
        }
        ConsoleCommand::Unknown(other) => {
            format!("unknown command '{other}' (quit, info, memory, games, players)")
        }
    }
}
