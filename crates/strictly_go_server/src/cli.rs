//! Command-line interface for strictly_go.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Go - two-player Go rules and sessions
#[derive(Parser, Debug)]
#[command(name = "strictly_go")]
#[command(about = "Replay and inspect two-player Go games", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file (falls back to STRICTLY_GO_CONFIG)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a JSON move list and print the final position
    Replay {
        /// Move list file
        file: PathBuf,

        /// Print the final session view as JSON instead of a board
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay() {
        let cli = Cli::parse_from(["strictly_go", "--config", "go.toml", "replay", "game.json", "--json"]);
        assert_eq!(cli.config, Some(PathBuf::from("go.toml")));
        match cli.command {
            Command::Replay { file, json } => {
                assert_eq!(file, PathBuf::from("game.json"));
                assert!(json);
            }
            other => panic!("Expected replay, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_config() {
        let cli = Cli::parse_from(["strictly_go", "config"]);
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Command::Config));
    }
}
