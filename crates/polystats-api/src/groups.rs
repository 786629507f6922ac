//! `GET /groups/search?q=<name>`: resolve a group name against the schedule
//! directory.
//!
//! Unlike onboarding, directory failures surface here as 503.

use axum::{
  Json,
  extract::{Query, State},
};
use polystats_core::{
  schedule::{Group, ScheduleDirectory},
  store::ProgressStore,
};
use serde::Deserialize;
use tracing::warn;

use crate::{AppState, auth::CurrentUser, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub q: String,
}

/// Returns the directory's first match for `q`.
pub async fn search<S, D>(
  State(state): State<AppState<S, D>>,
  CurrentUser(_user): CurrentUser,
  Query(params): Query<SearchParams>,
) -> Result<Json<Group>, ApiError>
where
  S: ProgressStore + 'static,
  D: ScheduleDirectory + 'static,
{
  let q = params.q.trim();
  if q.is_empty() {
    return Err(ApiError::Validation("q must not be empty".into()));
  }

  let groups = state.directory.search_groups(q).await.map_err(|e| {
    warn!(query = q, error = %e, "group search failed");
    ApiError::UpstreamUnavailable
  })?;

  groups
    .into_iter()
    .next()
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("group {q:?} not found")))
}
