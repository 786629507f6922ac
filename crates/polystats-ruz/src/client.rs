//! Async HTTP client wrapping the RUZ JSON API.

use std::time::Duration;

use chrono::NaiveDate;
use polystats_core::schedule::{Group, GroupSearch, Schedule, ScheduleDirectory};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://ruz.spbstu.ru/api/v1/ruz";

/// Connection settings for the RUZ API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuzConfig {
  pub base_url:     String,
  /// Upper bound on each request, connect through body.
  pub timeout_secs: u64,
}

impl Default for RuzConfig {
  fn default() -> Self {
    Self { base_url: DEFAULT_BASE_URL.to_owned(), timeout_secs: 10 }
  }
}

/// Async HTTP client for the RUZ schedule directory.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RuzClient {
  client:   Client,
  base_url: String,
}

impl RuzClient {
  pub fn new(config: RuzConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(Error::Client)?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_owned(),
    })
  }

  fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: String,
    query: &[(&str, String)],
  ) -> Result<T> {
    debug!(%path, ?query, "ruz request");
    let fail = |source| Error::Request { path: path.clone(), source };

    let resp = self
      .client
      .get(self.url(&path))
      .query(query)
      .send()
      .await
      .map_err(fail)?
      .error_for_status()
      .map_err(fail)?;

    resp.json().await.map_err(fail)
  }
}

impl ScheduleDirectory for RuzClient {
  type Error = Error;

  /// `GET /search/groups?q=<query>`
  async fn search_groups(&self, query: &str) -> Result<Vec<Group>> {
    let found: GroupSearch = self
      .get_json("/search/groups".to_owned(), &[("q", query.to_owned())])
      .await?;
    Ok(found.groups)
  }

  /// `GET /scheduler/<group_id>?date=YYYY-MM-DD`
  async fn schedule(&self, group_id: i64, date: NaiveDate) -> Result<Schedule> {
    self
      .get_json(
        format!("/scheduler/{group_id}"),
        &[("date", date.format("%Y-%m-%d").to_string())],
      )
      .await
  }
}
