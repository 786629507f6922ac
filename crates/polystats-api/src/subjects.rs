//! Handlers for `/subjects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/subjects/add` | Body: `{"name":"Physics"}`; 201 |
//! | `GET`    | `/subjects/list` | Caller's subjects with activities |
//! | `GET`    | `/subjects/:id` | 404 if absent or not owned |
//! | `DELETE` | `/subjects/:id` | 204; deletes the subject's activities too |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use polystats_core::{schedule::ScheduleDirectory, store::ProgressStore, subject::Subject};
use serde::Deserialize;

use crate::{AppState, auth::CurrentUser, error::ApiError};

fn not_found(id: i64) -> ApiError { ApiError::NotFound(format!("subject {id} not found")) }

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /subjects/add`
pub async fn create<S, D>(
  State(state): State<AppState<S, D>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore + 'static,
  D: ScheduleDirectory + 'static,
{
  let name = body.name.trim();
  if name.is_empty() {
    return Err(ApiError::Validation("name must not be empty".into()));
  }

  let subject = state
    .store
    .create_subject(user.id, name.to_owned())
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(subject)))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /subjects/list`
pub async fn list<S, D>(
  State(state): State<AppState<S, D>>,
  CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Subject>>, ApiError>
where
  S: ProgressStore + 'static,
  D: ScheduleDirectory + 'static,
{
  let subjects = state
    .store
    .list_subjects(user.id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(subjects))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /subjects/:id`
pub async fn get_one<S, D>(
  State(state): State<AppState<S, D>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<i64>,
) -> Result<Json<Subject>, ApiError>
where
  S: ProgressStore + 'static,
  D: ScheduleDirectory + 'static,
{
  let subject = state
    .store
    .get_subject(user.id, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(subject))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /subjects/:id`
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
    .delete_subject(user.id, id)
    .await
    .map_err(ApiError::store)?;

  if deleted {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(not_found(id))
  }
}
