//! Server wiring for the gamble-free recovery companion: configuration,
//! backend construction, and the top-level router.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context as _, anyhow};
use axum::Router;
use chrono_tz::Tz;
use gamblefree_api::{ApiState, api_router};
use gamblefree_coach::{
  Coach,
  gemini::{GeminiClient, GeminiConfig},
  relay::RelayClient,
};
use gamblefree_core::store::RecoveryStore;
use gamblefree_store_remote::RemoteConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `GAMBLEFREE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  /// IANA zone used for calendar days when a request does not name one.
  #[serde(default = "default_time_zone")]
  pub default_time_zone: String,
  #[serde(default)]
  pub store:             StoreConfig,
  #[serde(default)]
  pub coach:             CoachConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  #[default]
  Sqlite,
  Remote,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
  pub backend:        StoreBackend,
  pub sqlite_path:    PathBuf,
  pub remote_url:     Option<String>,
  pub remote_api_key: Option<String>,
  pub timeout_secs:   u64,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      backend:        StoreBackend::Sqlite,
      sqlite_path:    PathBuf::from("~/.local/share/gamblefree/gamblefree.db"),
      remote_url:     None,
      remote_api_key: None,
      timeout_secs:   30,
    }
  }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CoachConfig {
  pub relay_url:       Option<String>,
  pub gemini_api_key:  Option<String>,
  pub gemini_model:    String,
  pub gemini_base_url: Option<String>,
  pub timeout_secs:    u64,
}

impl Default for CoachConfig {
  fn default() -> Self {
    Self {
      relay_url:       None,
      gemini_api_key:  None,
      gemini_model:    gamblefree_coach::gemini::DEFAULT_MODEL.to_owned(),
      gemini_base_url: None,
      timeout_secs:    30,
    }
  }
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8787 }

fn default_time_zone() -> String { "UTC".to_owned() }

/// `Some(value)` unless the value is missing or blank.
fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ServerConfig {
  pub fn default_tz(&self) -> anyhow::Result<Tz> {
    self
      .default_time_zone
      .parse::<Tz>()
      .map_err(|_| {
        anyhow!("default_time_zone {:?} is not a known IANA zone", self.default_time_zone)
      })
  }
}

impl StoreConfig {
  /// Remote connection settings, or `None` if the URL or key is missing.
  pub fn remote_config(&self) -> Option<RemoteConfig> {
    Some(RemoteConfig {
      base_url: present(&self.remote_url)?.to_owned(),
      api_key:  present(&self.remote_api_key)?.to_owned(),
      timeout:  Duration::from_secs(self.timeout_secs),
    })
  }
}

// ─── Construction ─────────────────────────────────────────────────────────────

/// Build the coach with whichever backends are configured.
pub fn build_coach(cfg: &CoachConfig) -> anyhow::Result<Coach> {
  let timeout = Duration::from_secs(cfg.timeout_secs);

  let relay = present(&cfg.relay_url)
    .map(|url| RelayClient::new(url, timeout))
    .transpose()
    .context("failed to build relay client")?;

  let direct = present(&cfg.gemini_api_key)
    .map(|key| {
      let mut gemini = GeminiConfig::new(key);
      gemini.model = cfg.gemini_model.clone();
      gemini.timeout = timeout;
      if let Some(base_url) = present(&cfg.gemini_base_url) {
        gemini.base_url = base_url.to_owned();
      }
      GeminiClient::new(gemini)
    })
    .transpose()
    .context("failed to build gemini client")?;

  let coach = Coach::new(relay, direct);
  tracing::info!(
    relay = coach.has_relay(),
    direct = coach.has_direct(),
    rules_version = coach.rules().version(),
    "coach configured"
  );
  Ok(coach)
}

/// The API router with request tracing.
pub fn router<S>(state: ApiState<S>) -> Router
where
  S: RecoveryStore + 'static,
{
  api_router(state).layer(TraceLayer::new_for_http())
}
