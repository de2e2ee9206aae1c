//! Gravity Four - terminal client
//!
//! Joins a game on a Gravity Four server and plays it in the terminal.

#![warn(missing_docs)]

mod cli;
mod tui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use gravity_four::{ClientConfig, SessionClient, WebSocketConnector, validate_player_name};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ClientConfig::load_or_default(&cli.config)?;

    match cli.command {
        Command::Play {
            game,
            name,
            server_url,
        } => run_play(apply_overrides(config, server_url), game, name).await,
        Command::Target {
            game,
            name,
            server_url,
        } => print_target(&apply_overrides(config, server_url), &game, &name),
    }
}

fn apply_overrides(config: ClientConfig, server_url: Option<String>) -> ClientConfig {
    match server_url {
        Some(url) => config.with_server_url(url),
        None => config,
    }
}

/// Run the terminal client
#[instrument(skip(config))]
async fn run_play(config: ClientConfig, game: String, name: Option<String>) -> Result<()> {
    let endpoint = config.endpoint()?;

    let player_name = match name.or_else(|| config.player_name().clone()) {
        Some(raw) => validate_player_name(&raw)?,
        None => prompt_player_name()?,
    };

    initialize_tracing(config.log_file())?;
    info!(game_id = %game, player = %player_name, "Starting game client");

    let client = SessionClient::new(WebSocketConnector, endpoint)
        .with_shutdown_timeout(config.shutdown_timeout());
    tui::run_tui(client, game, player_name).await
}

/// Print the connection URL
fn print_target(config: &ClientConfig, game: &str, name: &str) -> Result<()> {
    let endpoint = config.endpoint()?;
    let name = validate_player_name(name)?;
    println!("{}", endpoint.target(game, &name));
    Ok(())
}

/// Ask on stdin until a usable name is entered.
fn prompt_player_name() -> Result<String> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("Player name: ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            anyhow::bail!("No player name given");
        }
        match validate_player_name(&line) {
            Ok(name) => return Ok(name),
            Err(e) => {
                warn!(error = %e, "Rejected player name");
                println!("{e}");
            }
        }
    }
}

/// Log to a file; the terminal belongs to the UI.
fn initialize_tracing(path: &Path) -> Result<()> {
    let log_file = std::fs::File::create(path)?;
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gravity_four=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(log_file))
                .with_ansi(false),
        )
        .try_init()?;
    Ok(())
}
