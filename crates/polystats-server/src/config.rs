//! Runtime configuration, layered from an optional TOML file and
//! `POLYSTATS_*` environment variables.

use std::path::PathBuf;

use polystats_ruz::{DEFAULT_BASE_URL, RuzConfig};
use serde::Deserialize;

/// Every field has a default, so an absent config file is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  /// Mount point for the API routes; empty mounts them at the root.
  pub api_prefix:       String,
  pub ruz_base_url:     String,
  pub ruz_timeout_secs: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_string(),
      port:             8000,
      store_path:       PathBuf::from("polystats.db"),
      api_prefix:       "/api/v1".to_string(),
      ruz_base_url:     DEFAULT_BASE_URL.to_string(),
      ruz_timeout_secs: 10,
    }
  }
}

impl ServerConfig {
  /// Build from the given sources, later ones overriding earlier ones.
  pub fn load<F, E>(file: F, env: E) -> Result<Self, config::ConfigError>
  where
    F: config::Source + Send + Sync + 'static,
    E: config::Source + Send + Sync + 'static,
  {
    config::Config::builder()
      .add_source(file)
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn ruz(&self) -> RuzConfig {
    RuzConfig {
      base_url:     self.ruz_base_url.clone(),
      timeout_secs: self.ruz_timeout_secs,
    }
  }
}
