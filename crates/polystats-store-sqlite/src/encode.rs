//! Encoding and decoding helpers between Rust domain types and the values
//! stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Ids are SQLite rowids. Progress
//! counters are stored as plain integers and re-validated on the way out.

use chrono::{DateTime, Utc};
use polystats_core::{
  subject::{Activity, Subject},
  user::User,
};
use rusqlite::Row;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str =
  "u.id, u.email, u.group_name, u.group_id, u.created_at";

pub const ACTIVITY_COLUMNS: &str =
  "a.id, a.subject_id, a.name, a.current_progress, a.max_progress";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row selected with
/// [`USER_COLUMNS`].
pub struct RawUser {
  pub id:         i64,
  pub email:      String,
  pub group_name: String,
  pub group_id:   Option<String>,
  pub created_at: String,
}

impl RawUser {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      email:      row.get(1)?,
      group_name: row.get(2)?,
      group_id:   row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:         self.id,
      email:      self.email,
      group_name: self.group_name,
      group_id:   self.group_id,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Map a row selected with [`ACTIVITY_COLUMNS`].
pub fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<Activity> {
  Ok(Activity {
    id:               row.get(0)?,
    subject_id:       row.get(1)?,
    name:             row.get(2)?,
    current_progress: row.get(3)?,
    max_progress:     row.get(4)?,
  })
}

/// Map `id, user_id, name` into a subject with no activities loaded yet.
pub fn subject_from_row(row: &Row<'_>) -> rusqlite::Result<Subject> {
  Ok(Subject {
    id:         row.get(0)?,
    user_id:    row.get(1)?,
    name:       row.get(2)?,
    activities: Vec::new(),
  })
}
