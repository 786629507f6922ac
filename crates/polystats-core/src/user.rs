//! Registered users and their credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered student.
///
/// `group_id` stays `None` until the onboarding synchronizer resolves
/// `group_name` against the schedule directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:         i64,
  pub email:      String,
  pub group_name: String,
  pub group_id:   Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input for creating a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub password_hash: String,
  pub group_name:    String,
}

/// A user together with the stored argon2 PHC string, used only for login.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user:          User,
  pub password_hash: String,
}
