use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

use ladle::api::{ApiClient, AuthState};
use ladle::app::{App, AppEvent};
use ladle::config::Config;
use ladle::ui;

/// Get the config directory path (~/.config/ladle/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("ladle"))
}

#[derive(Parser, Debug)]
#[command(name = "ladle", about = "Terminal client for a recipe-box server")]
struct Args {
    /// Server root URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Path to an alternate config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path).context("Failed to load configuration")?;

    let server_url = args.server.as_deref().unwrap_or(&config.server_url);
    let base = Url::parse(server_url)
        .with_context(|| format!("Invalid server URL: {server_url}"))?;
    match base.scheme() {
        "http" | "https" => {}
        other => anyhow::bail!("Unsupported server URL scheme: {other}"),
    }

    let client = ApiClient::new(base, Duration::from_secs(config.request_timeout_secs))
        .context("Failed to build HTTP client")?;

    let mut app = App::new(client.clone(), &config);

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    // Kick off the startup session check; the gate shows a splash until
    // the backend answers.
    app.auth = AuthState::Checking;
    ui::spawn_session_check(client, event_tx.clone());

    // Run the TUI
    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
