//! Error types for `polystats-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("group not found: {0:?}")]
  GroupNotFound(String),

  #[error("progress {current} is outside 0..={max}")]
  InvalidProgress { current: u32, max: u32 },

  #[error("schedule directory error: {0}")]
  Directory(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
