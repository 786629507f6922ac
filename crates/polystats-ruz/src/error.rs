//! Error type for `polystats-ruz`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  /// Connection failure, timeout, non-2xx status or undecodable body.
  #[error("GET {path} failed: {source}")]
  Request {
    path:   String,
    #[source]
    source: reqwest::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
