//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// `NotFound` covers both missing rows and rows owned by another user.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid input: {0}")]
  Validation(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("schedule directory unavailable")]
  UpstreamUnavailable,

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Internal(_) | ApiError::Store(_) => {
        tracing::error!(error = %self, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}
