//! PolyStats server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), applies
//! `POLYSTATS_*` environment overrides, opens the SQLite store and serves the
//! JSON API over HTTP.

mod config;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use polystats_api::AppState;
use polystats_ruz::RuzClient;
use polystats_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "PolyStats study progress server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(
    ::config::File::from(cli.config).required(false),
    ::config::Environment::with_prefix("POLYSTATS"),
  )
  .context("failed to load configuration")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let directory =
    RuzClient::new(server_cfg.ruz()).context("failed to build schedule directory client")?;

  let app = polystats_api::app(AppState::new(store, directory), &server_cfg.api_prefix);
  let address = server_cfg.address();

  tracing::info!(prefix = %server_cfg.api_prefix, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
