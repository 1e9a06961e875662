use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use regent_application::{ControllerOptions, GameSessionController};
use regent_core::config::{ClientConfig, TranscriptVerbosity};
use regent_infrastructure::config_service::credentials_from_env;
use regent_infrastructure::{ConfigService, FileKeyValueStore, RegentPaths};
use regent_interaction::HttpGameGateway;

mod command;
mod helper;
mod logging;
mod render;
mod repl;

#[derive(Parser)]
#[command(name = "regent")]
#[command(about = "Shadow Regent - rule a city-state with a council you cannot trust", long_about = None)]
struct Cli {
    /// Game server API root (overrides config.toml and REGENT_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Keep config, saved game and logs under this directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Show judgments and other per-turn notes as they happen
    #[arg(long)]
    verbose_transcript: bool,

    /// Ask the server to skip the opening narration
    #[arg(long)]
    skip_intro: bool,
}

impl Cli {
    fn apply(&self, config: &mut ClientConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if self.verbose_transcript {
            config.transcript = TranscriptVerbosity::Verbose;
        }
        if self.skip_intro {
            config.skip_intro = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = match &cli.data_dir {
        Some(dir) => RegentPaths::rooted(dir),
        None => RegentPaths::platform()?,
    };
    let _log_guard = logging::init(&paths.logs_dir())?;

    let mut config = ConfigService::new(paths.config_file()).load()?;
    cli.apply(&mut config);
    tracing::info!(
        "[regent] Starting (server: {}, transcript: {})",
        config.base_url,
        config.transcript
    );

    let gateway = Arc::new(HttpGameGateway::new(config.base_url.clone()));
    let store = Arc::new(FileKeyValueStore::new(paths.storage_file()));
    let options = ControllerOptions {
        transcript: config.transcript,
        skip_intro: config.skip_intro,
        fallback_credentials: credentials_from_env(|name| std::env::var(name).ok()),
    };

    let controller = Arc::new(GameSessionController::load(gateway, store, options).await);

    repl::Repl::new(controller).run().await
}
