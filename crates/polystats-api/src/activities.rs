//! Handlers for activities and their progress counters.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/subjects/:id/activity-add` | Body: `{"name","max_progress"}`; 201 |
//! | `GET`    | `/subjects/activities/:id` | Single activity |
//! | `DELETE` | `/subjects/activities/:id` | 204 |
//! | `PATCH`  | `/subjects/activities/:id/plus` | +1, saturating at `max_progress` |
//! | `PATCH`  | `/subjects/activities/:id/minus` | -1, saturating at 0 |
//!
//! Stepping a counter that is already at a bound is not an error: the
//! unchanged activity comes back with 200.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use polystats_core::{
  progress::Step,
  schedule::ScheduleDirectory,
  store::ProgressStore,
  subject::{Activity, NewActivity},
};
use serde::Deserialize;
use tracing::debug;

use crate::{AppState, auth::CurrentUser, error::ApiError};

fn not_found(id: i64) -> ApiError { ApiError::NotFound(format!("activity {id} not found")) }

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:         String,
  pub max_progress: u32,
}

/// `POST /subjects/:id/activity-add`
pub async fn create<S, D>(
  State(state): State<AppState<S, D>>,
  CurrentUser(user): CurrentUser,
  Path(subject_id): Path<i64>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore + 'static,
  D: ScheduleDirectory + 'static,
{
  let input = NewActivity {
    name:         body.name.trim().to_owned(),
    max_progress: body.max_progress,
  };
  if input.name.is_empty() {
    return Err(ApiError::Validation("name must not be empty".into()));
  }
  input
    .validate()
    .map_err(|_| ApiError::Validation("max_progress must be at least 1".into()))?;

  let activity = state
    .store
    .add_activity(user.id, subject_id, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("subject {subject_id} not found")))?;
  Ok((StatusCode::CREATED, Json(activity)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /subjects/activities/:id`
pub async fn get_one<S, D>(
  State(state): State<AppState<S, D>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<i64>,
) -> Result<Json<Activity>, ApiError>
where
  S: ProgressStore + 'static,
  D: ScheduleDirectory + 'static,
{
  let activity = state
    .store
    .get_activity(user.id, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(activity))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /subjects/activities/:id`
pub async fn delete_one<S, D>(
  State(state): State<AppState<S, D>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: ProgressStore + 'static,
  D: ScheduleDirectory + 'static,
{
  let deleted = state
    .store
    .delete_activity(user.id, id)
    .await
    .map_err(ApiError::store)?;

  if deleted {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(not_found(id))
  }
}

// ─── Progress ────────────────────────────────────────────────────────────────

async fn apply_step<S>(store: &S, user_id: i64, id: i64, step: Step) -> Result<Json<Activity>, ApiError>
where
  S: ProgressStore,
{
  let activity = store
    .step_progress(user_id, id, step)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;

  debug!(
    activity_id = id,
    ?step,
    current = activity.current_progress,
    max = activity.max_progress,
    "progress stepped"
  );
  Ok(Json(activity))
}

/// `PATCH /subjects/activities/:id/plus`
pub async fn plus<S, D>(
  State(state): State<AppState<S, D>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<i64>,
) -> Result<Json<Activity>, ApiError>
where
  S: ProgressStore + 'static,
  D: ScheduleDirectory + 'static,
{
  apply_step(&*state.store, user.id, id, Step::Increment).await
}

/// `PATCH /subjects/activities/:id/minus`
pub async fn minus<S, D>(
  State(state): State<AppState<S, D>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<i64>,
) -> Result<Json<Activity>, ApiError>
where
  S: ProgressStore + 'static,
  D: ScheduleDirectory + 'static,
{
  apply_step(&*state.store, user.id, id, Step::Decrement).await
}
