//! Command-line interface for gravity_four.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gravity Four - terminal client for a networked gravity-drop grid game
#[derive(Parser, Debug)]
#[command(name = "gravity_four")]
#[command(about = "Play a networked gravity-drop grid game in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the client config file
    #[arg(short, long, global = true, default_value = "gravity_four.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Join a game in the terminal UI
    Play {
        /// Game id to join
        #[arg(short, long)]
        game: String,

        /// Player name (prompted for when absent from flags and config)
        #[arg(short, long)]
        name: Option<String>,

        /// Override the server URL from the config file
        #[arg(long)]
        server_url: Option<String>,
    },

    /// Print the connection URL that `play` would use
    Target {
        /// Game id
        #[arg(short, long)]
        game: String,

        /// Player name
        #[arg(short, long)]
        name: String,

        /// Override the server URL from the config file
        #[arg(long)]
        server_url: Option<String>,
    },
}
