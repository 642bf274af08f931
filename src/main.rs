use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use standupbot::cli::commands::Cli;
use standupbot::cli::console::{self, ConsoleSession};
use standupbot::engine::StandupEngine;
use standupbot::io::config_io::{ConfigError, read_config};
use standupbot::io::memory_transport::MemoryTransport;
use standupbot::io::retry::{ReliableTransport, RetryPolicy};
use standupbot::io::settings_store::MemorySettingsStore;
use standupbot::io::state_file::{SavedState, StateFileError, read_state, write_state};
use standupbot::model::event::{RoomId, UserId};
use standupbot::ops::calendar::SystemClock;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    StateFile(#[from] StateFileError),
    #[error("invalid bot username: {0}")]
    Username(#[from] regex::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) -> Result<(), StartupError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_level.clone().into());
    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let config = read_config(&cli.config)?;
    let bot = UserId::new(config.username.clone());
    let user = UserId::new(cli.user.clone());
    let room = RoomId::new(cli.room.clone());
    info!(bot = %bot, user = %user, room = %room, "starting standupbot");

    let network = Arc::new(MemoryTransport::echoing());
    network.set_default_members(vec![user.clone()]).await;
    let transport = Arc::new(ReliableTransport::new(
        network,
        RetryPolicy::from(&config.retry),
    ));
    let settings = Arc::new(MemorySettingsStore::new());
    let engine = StandupEngine::new(bot, transport, settings.clone(), Arc::new(SystemClock))?;

    if let Some(path) = &config.state_file {
        restore(&engine, &settings, path).await?;
    }

    let mut session = ConsoleSession::new(user, room);
    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = console::run(&engine, &mut session, stdin) => result?,
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }

    if let Some(path) = &config.state_file {
        let state = SavedState {
            flows: engine.flows().snapshot().await,
            settings: settings.snapshot().await,
        };
        write_state(path, &state)?;
        info!(path = %path.display(), flows = state.flows.len(), "state saved");
    }
    Ok(())
}

async fn restore(
    engine: &StandupEngine,
    settings: &MemorySettingsStore,
    path: &Path,
) -> Result<(), StartupError> {
    match read_state(path)? {
        Some(state) => {
            info!(path = %path.display(), flows = state.flows.len(), "state restored");
            engine.flows().restore(state.flows).await;
            settings.restore(state.settings).await;
        }
        None => warn!(path = %path.display(), "no saved state, starting fresh"),
    }
    Ok(())
}
