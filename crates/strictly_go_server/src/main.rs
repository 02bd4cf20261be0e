//! Strictly Go - command-line entry point.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strictly_go_server::{MoveList, ServerConfig, SessionManager, TracingSink};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var_os("STRICTLY_GO_CONFIG").map(PathBuf::from));
    let config = ServerConfig::load(config_path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Replay { file, json } => run_replay(&config, &file, json),
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Replays a move list in a fresh session and prints the result.
#[instrument(skip(config))]
fn run_replay(config: &ServerConfig, file: &Path, json: bool) -> Result<()> {
    let list = MoveList::load(file)?;
    let sessions = SessionManager::new(config.clone(), Arc::new(TracingSink));
    let game = sessions.create_session("replay".to_string())?;
    let view = list.replay_into(&game)?;
    info!(moves = list.moves.len(), phase = %view.phase(), "Replay finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", view.board().display());
        println!(
            "phase: {}  to move: {}  captures: black {} / white {}",
            view.phase(),
            view.current(),
            view.captures().black(),
            view.captures().white(),
        );
    }
    Ok(())
}
