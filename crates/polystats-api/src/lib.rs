//! JSON REST API for PolyStats.
//!
//! Exposes an axum [`Router`] backed by any
//! [`polystats_core::store::ProgressStore`] and
//! [`polystats_core::schedule::ScheduleDirectory`]. TLS and process concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = polystats_api::app(AppState::new(store, directory), "/api/v1");
//! axum::serve(listener, app).await?;
//! ```

pub mod accounts;
pub mod activities;
pub mod auth;
pub mod error;
pub mod groups;
pub mod subjects;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, patch, post},
};
use polystats_core::{schedule::ScheduleDirectory, store::ProgressStore};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, D> {
  pub store:     Arc<S>,
  pub directory: Arc<D>,
}

impl<S, D> AppState<S, D> {
  pub fn new(store: S, directory: D) -> Self {
    Self { store: Arc::new(store), directory: Arc::new(directory) }
  }
}

impl<S, D> Clone for AppState<S, D> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      directory: Arc::clone(&self.directory),
    }
  }
}

// ─── Routers ─────────────────────────────────────────────────────────────────

/// Build the API routes, unprefixed.
pub fn api_router<S, D>(state: AppState<S, D>) -> Router<()>
where
  S: ProgressStore + 'static,
  D: ScheduleDirectory + 'static,
{
  Router::new()
    // Accounts
    .route("/auth/register", post(accounts::register::<S, D>))
    .route("/auth/login", post(accounts::login::<S, D>))
    .route("/users/me", get(accounts::me))
    // Schedule directory
    .route("/groups/search", get(groups::search::<S, D>))
    // Subjects
    .route("/subjects/add", post(subjects::create::<S, D>))
    .route("/subjects/list", get(subjects::list::<S, D>))
    .route(
      "/subjects/{id}",
      get(subjects::get_one::<S, D>).delete(subjects::delete_one::<S, D>),
    )
    // Activities
    .route("/subjects/{id}/activity-add", post(activities::create::<S, D>))
    .route(
      "/subjects/activities/{id}",
      get(activities::get_one::<S, D>).delete(activities::delete_one::<S, D>),
    )
    .route("/subjects/activities/{id}/plus", patch(activities::plus::<S, D>))
    .route("/subjects/activities/{id}/minus", patch(activities::minus::<S, D>))
    .with_state(state)
}

/// The full application: the unauthenticated banner at `/`, the API under
/// `prefix`, and request tracing.
///
/// Leading and trailing slashes on `prefix` are optional; `"api/v1"`,
/// `"/api/v1/"` and `"/api/v1"` mount the same routes.
pub fn app<S, D>(state: AppState<S, D>, prefix: &str) -> Router
where
  S: ProgressStore + 'static,
  D: ScheduleDirectory + 'static,
{
  let prefix = prefix.trim_matches('/');
  let root = Router::new().route("/", get(banner));

  let routes = if prefix.is_empty() {
    root.merge(api_router(state))
  } else {
    root.nest(&format!("/{prefix}"), api_router(state))
  };

  routes.layer(TraceLayer::new_for_http())
}

/// `GET /`
async fn banner() -> Json<Value> {
  Json(json!({ "message": "PolyStats API", "version": "v1" }))
}

#[cfg(test)]
mod tests;
