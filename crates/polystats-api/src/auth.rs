//! Password hashing, bearer tokens, and the authenticated-user extractor.
//!
//! Tokens are 32 random bytes, hex-encoded and handed to the client once.
//! The store only ever sees their SHA-256 digest.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use polystats_core::{schedule::ScheduleDirectory, store::ProgressStore, user::User};
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest as _, Sha256};

use crate::{AppState, error::ApiError};

/// Produce an argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

/// A fresh random bearer token.
pub fn new_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// The form in which a token is stored and looked up.
pub fn token_digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  let token = token.trim();
  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The authenticated caller. Rejects with 401 when the bearer token is
/// missing or unknown.
pub struct CurrentUser(pub User);

impl<S, D> FromRequestParts<AppState<S, D>> for CurrentUser
where
  S: ProgressStore + 'static,
  D: ScheduleDirectory + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, D>,
  ) -> Result<Self, Self::Rejection> {
    let digest = bearer_token(&parts.headers)
      .map(token_digest)
      .ok_or(ApiError::Unauthorized)?;

    let user = state
      .store
      .user_for_token(digest)
      .await
      .map_err(ApiError::store)?
      .ok_or(ApiError::Unauthorized)?;

    Ok(CurrentUser(user))
  }
}
