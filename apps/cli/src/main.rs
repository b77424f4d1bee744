mod app;
mod commands;
mod env;
mod layout;
mod source;
mod synth;
mod transport;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use kara_lyrics_sync::Config;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "karaoke", about = "Karaoke lyrics sync player")]
struct Cli {
    /// JSON file overriding sync, scroll and energy tunables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Jump between lines instead of animating the scroll.
    #[arg(long, global = true)]
    reduced_motion: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play lyrics in the terminal.
    Replay(commands::replay::Args),
    /// Step through a track headlessly and print every line and word change.
    Inspect(commands::inspect::Args),
}

fn load_config(path: Option<&Path>, reduced_motion: bool) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Config::from_json(&json).with_context(|| format!("invalid config {}", path.display()))?
        }
        None => Config::default(),
    };
    if reduced_motion {
        config.scroll.reduced_motion = true;
    }
    Ok(config)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
}

/// The terminal belongs to the UI while replaying, so logs go to a file.
fn init_file_logging(path: &Path) -> anyhow::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.reduced_motion)?;

    match cli.command {
        Commands::Replay(args) => {
            init_file_logging(&args.log_path())?;
            commands::replay::run(args, config).await
        }
        Commands::Inspect(args) => {
            init_stderr_logging();
            commands::inspect::run(args, config).await
        }
    }
}
