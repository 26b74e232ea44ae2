use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use critique_core::config::DEFAULT_SECRETS_FILE;
use critique_core::{Config, Critic, OpenAIClient, Secrets};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser, Debug)]
#[command(name = "critique", about = "Witty, sardonic critiques of movies, music, books, games and more", version)]
struct Cli {
    /// JSON file holding `openai_api_key`
    #[arg(long, env = "CRITIQUE_SECRETS", default_value = DEFAULT_SECRETS_FILE)]
    secrets: PathBuf,

    /// Chat model to use (overrides the config file)
    #[arg(short, long)]
    model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "CRITIQUE_BASE_URL")]
    base_url: Option<String>,

    /// Give up on a critique after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Where to write logs (the terminal belongs to the UI)
    #[arg(long, env = "CRITIQUE_LOG_FILE")]
    log_file: Option<PathBuf>,
}

fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("critique").join("critique.log"))
        .unwrap_or_else(|| PathBuf::from("critique.log"))
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

/// Everything that must succeed before the terminal is taken over.
fn build_critic(cli: &Cli) -> Result<Critic> {
    let secrets = Secrets::load(&cli.secrets).context("cannot start without an API key")?;
    let config = Config::load()?;

    let model = cli.model.clone().unwrap_or_else(|| config.model().to_string());
    let timeout = cli.timeout.or(config.request_timeout_secs);

    let mut client = OpenAIClient::new(secrets.openai_api_key());
    if let Some(base_url) = cli.base_url.as_ref().or(config.base_url.as_ref()) {
        client = client.with_base_url(base_url);
    }

    info!(model = %model, base_url = client.base_url(), timeout_secs = ?timeout, "configured completion client");

    let critic = Critic::new(Arc::new(client), &model);
    Ok(match timeout {
        Some(secs) => critic.with_deadline(Duration::from_secs(secs)),
        None => critic,
    })
}

async fn run(app: &mut App) -> Result<()> {
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(Duration::from_millis(300));

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file.clone().unwrap_or_else(default_log_path))?;

    let critic = match build_critic(&cli) {
        Ok(critic) => critic,
        Err(e) => {
            error!(error = %format!("{:#}", e), "startup failed");
            return Err(e);
        }
    };

    info!("starting session");
    tui::install_panic_hook();
    let mut app = App::new(critic);
    let result = run(&mut app).await;
    tui::restore()?;

    info!("session ended");
    result
}
