//! Handlers for registration, login and the current user.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | Body: `{"email","password","group_name"}`; 201; seeds subjects |
//! | `POST` | `/auth/login` | Form: `username`, `password`; returns a bearer token |
//! | `GET`  | `/users/me` | The authenticated user |

use axum::{
  Form, Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Local;
use polystats_core::{
  onboarding,
  schedule::ScheduleDirectory,
  store::ProgressStore,
  user::{NewUser, User},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
  AppState,
  auth::{CurrentUser, hash_password, new_token, token_digest, verify_password},
  error::ApiError,
};

// ─── Register ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub email:      String,
  pub password:   String,
  pub group_name: String,
}

impl RegisterBody {
  fn validate(self) -> Result<Self, ApiError> {
    let email = self.email.trim().to_owned();
    let group_name = self.group_name.trim().to_owned();

    if !email.contains('@') {
      return Err(ApiError::Validation("email must contain '@'".into()));
    }
    if self.password.is_empty() {
      return Err(ApiError::Validation("password must not be empty".into()));
    }
    if group_name.is_empty() {
      return Err(ApiError::Validation("group_name must not be empty".into()));
    }
    Ok(Self { email, password: self.password, group_name })
  }
}

/// `POST /auth/register`
///
/// The user row is committed before onboarding starts. Onboarding failures
/// are logged and otherwise ignored; the user is still created.
pub async fn register<S, D>(
  State(state): State<AppState<S, D>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore + 'static,
  D: ScheduleDirectory + 'static,
{
  let body = body.validate()?;

  let password_hash = hash_password(&body.password)?;
  let user = state
    .store
    .create_user(NewUser {
      email: body.email,
      password_hash,
      group_name: body.group_name,
    })
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::BadRequest("user already exists".into()))?;
  info!(user_id = user.id, "user registered");

  let today = Local::now().date_naive();
  let user = match onboarding::onboard(&*state.store, &*state.directory, &user, today).await {
    Some(done) => User { group_id: Some(done.group_id), ..user },
    None => user,
  };

  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Login ───────────────────────────────────────────────────────────────────

/// OAuth2 password-flow style login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
  pub access_token: String,
  pub token_type:   String,
}

/// `POST /auth/login`
pub async fn login<S, D>(
  State(state): State<AppState<S, D>>,
  Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError>
where
  S: ProgressStore + 'static,
  D: ScheduleDirectory + 'static,
{
  let creds = state
    .store
    .find_credentials(form.username.trim())
    .await
    .map_err(ApiError::store)?
    .filter(|c| verify_password(&form.password, &c.password_hash))
    .ok_or_else(|| ApiError::BadRequest("bad credentials".into()))?;

  let token = new_token();
  state
    .store
    .insert_token(creds.user.id, token_digest(&token))
    .await
    .map_err(ApiError::store)?;

  Ok(Json(TokenResponse { access_token: token, token_type: "bearer".into() }))
}

// ─── Me ──────────────────────────────────────────────────────────────────────

/// `GET /users/me`
pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> { Json(user) }
