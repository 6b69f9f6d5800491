//! gamblefree-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) plus
//! `GAMBLEFREE_*` environment overrides, opens the configured store, builds
//! the coach, and serves the JSON API over HTTP.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use gamblefree_api::ApiState;
use gamblefree_core::store::RecoveryStore;
use gamblefree_server::{ServerConfig, StoreBackend, build_coach, router};
use gamblefree_store_remote::RemoteStore;
use gamblefree_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Gamble-free recovery companion API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("GAMBLEFREE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let coach = build_coach(&server_cfg.coach)?;
  let tz = server_cfg.default_tz()?;

  // Pick exactly one store for the lifetime of the process.
  if server_cfg.store.backend == StoreBackend::Remote {
    match server_cfg.store.remote_config() {
      Some(remote_cfg) => {
        tracing::info!(url = %remote_cfg.base_url, "using remote store");
        let store = RemoteStore::new(remote_cfg).context("failed to build remote store")?;
        let state = ApiState::new(store, coach).with_default_tz(tz);
        return serve(&server_cfg, state).await;
      }
      None => tracing::warn!(
        "remote store selected but remote_url or remote_api_key is missing; \
         falling back to sqlite"
      ),
    }
  }

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store.sqlite_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  tracing::info!(path = %store_path.display(), "using sqlite store");
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let state = ApiState::new(store, coach).with_default_tz(tz);
  serve(&server_cfg, state).await
}

async fn serve<S>(server_cfg: &ServerConfig, state: ApiState<S>) -> anyhow::Result<()>
where
  S: RecoveryStore + 'static,
{
  let app = router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
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
