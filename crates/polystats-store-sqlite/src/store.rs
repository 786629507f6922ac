//! The SQLite implementation of [`ProgressStore`], [`SqliteStore`].

use std::path::Path;

use chrono::Utc;
use polystats_core::{
  progress::Step,
  store::ProgressStore,
  subject::{Activity, NewActivity, Subject},
  user::{Credentials, NewUser, User},
};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::debug;

use crate::{
  Error, Result,
  encode::{
    ACTIVITY_COLUMNS, RawUser, USER_COLUMNS, activity_from_row, encode_dt,
    subject_from_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A PolyStats store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every
/// operation runs as one closure on the connection thread, so a
/// read-modify-write inside a single `call` cannot interleave with another.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Synchronous helpers (run on the connection thread) ──────────────────────

fn load_activities(
  conn: &rusqlite::Connection,
  subject_id: i64,
) -> rusqlite::Result<Vec<Activity>> {
  let mut stmt = conn.prepare_cached(&format!(
    "SELECT {ACTIVITY_COLUMNS} FROM activities a
     WHERE a.subject_id = ?1
     ORDER BY a.id"
  ))?;
  let rows = stmt
    .query_map(rusqlite::params![subject_id], activity_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn owned_subject(
  conn: &rusqlite::Connection,
  user_id: i64,
  subject_id: i64,
) -> rusqlite::Result<Option<Subject>> {
  let subject = conn
    .query_row(
      "SELECT id, user_id, name FROM subjects WHERE id = ?1 AND user_id = ?2",
      rusqlite::params![subject_id, user_id],
      subject_from_row,
    )
    .optional()?;

  match subject {
    Some(mut s) => {
      s.activities = load_activities(conn, s.id)?;
      Ok(Some(s))
    }
    None => Ok(None),
  }
}

fn owned_activity(
  conn: &rusqlite::Connection,
  user_id: i64,
  activity_id: i64,
) -> rusqlite::Result<Option<Activity>> {
  conn
    .query_row(
      &format!(
        "SELECT {ACTIVITY_COLUMNS} FROM activities a
         JOIN subjects s ON s.id = a.subject_id
         WHERE a.id = ?1 AND s.user_id = ?2"
      ),
      rusqlite::params![activity_id, user_id],
      activity_from_row,
    )
    .optional()
}

// ─── ProgressStore impl ──────────────────────────────────────────────────────

impl ProgressStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<Option<User>> {
    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);
    let NewUser { email, password_hash, group_name } = input;
    let email_col  = email.clone();
    let group_col  = group_name.clone();

    let id = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO users (email, password_hash, group_name, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![email_col, password_hash, group_col, at_str],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          // `email` is the only UNIQUE column on `users`.
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
          {
            Ok(None)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let Some(id) = id else {
      debug!("email already registered");
      return Ok(None);
    };
    debug!(user_id = id, "user created");
    Ok(Some(User { id, email, group_name, group_id: None, created_at }))
  }

  async fn get_user(&self, id: i64) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1"),
            rusqlite::params![id],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>> {
    let email = email.to_owned();

    let raw: Option<(RawUser, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {USER_COLUMNS}, u.password_hash FROM users u WHERE u.email = ?1"
            ),
            rusqlite::params![email],
            |row| Ok((RawUser::from_row(row)?, row.get(5)?)),
          )
          .optional()?)
      })
      .await?;

    raw
      .map(|(user, password_hash)| {
        Ok(Credentials { user: user.into_user()?, password_hash })
      })
      .transpose()
  }

  async fn apply_onboarding(
    &self,
    user_id: i64,
    group_id: &str,
    subject_names: &[String],
  ) -> Result<Vec<Subject>> {
    let group_id = group_id.to_owned();
    let names    = subject_names.to_vec();

    let subjects: Option<Vec<Subject>> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let updated = tx.execute(
          "UPDATE users SET group_id = ?1 WHERE id = ?2",
          rusqlite::params![group_id, user_id],
        )?;
        if updated == 0 {
          // Dropping `tx` rolls back.
          return Ok(None);
        }

        let mut subjects = Vec::with_capacity(names.len());
        {
          let mut stmt =
            tx.prepare("INSERT INTO subjects (user_id, name) VALUES (?1, ?2)")?;
          for name in names {
            let id = stmt.insert(rusqlite::params![user_id, name])?;
            subjects.push(Subject { id, user_id, name, activities: Vec::new() });
          }
        }

        tx.commit()?;
        Ok(Some(subjects))
      })
      .await?;

    subjects.ok_or(Error::UserNotFound(user_id))
  }

  // ── Access tokens ─────────────────────────────────────────────────────────

  async fn insert_token(&self, user_id: i64, token_digest: String) -> Result<()> {
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO access_tokens (token_digest, user_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![token_digest, user_id, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn user_for_token(&self, token_digest: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {USER_COLUMNS} FROM users u
               JOIN access_tokens t ON t.user_id = u.id
               WHERE t.token_digest = ?1"
            ),
            rusqlite::params![token_digest],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn create_subject(&self, user_id: i64, name: String) -> Result<Subject> {
    let name_col = name.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (user_id, name) VALUES (?1, ?2)",
          rusqlite::params![user_id, name_col],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Subject { id, user_id, name, activities: Vec::new() })
  }

  async fn list_subjects(&self, user_id: i64) -> Result<Vec<Subject>> {
    let subjects = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, user_id, name FROM subjects WHERE user_id = ?1 ORDER BY id",
        )?;
        let mut subjects = stmt
          .query_map(rusqlite::params![user_id], subject_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        for subject in &mut subjects {
          subject.activities = load_activities(conn, subject.id)?;
        }
        Ok(subjects)
      })
      .await?;

    Ok(subjects)
  }

  async fn get_subject(&self, user_id: i64, subject_id: i64) -> Result<Option<Subject>> {
    let subject = self
      .conn
      .call(move |conn| Ok(owned_subject(conn, user_id, subject_id)?))
      .await?;
    Ok(subject)
  }

  async fn delete_subject(&self, user_id: i64, subject_id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        // Activities go with it via ON DELETE CASCADE.
        Ok(conn.execute(
          "DELETE FROM subjects WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![subject_id, user_id],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Activities ────────────────────────────────────────────────────────────

  async fn add_activity(
    &self,
    user_id: i64,
    subject_id: i64,
    input: NewActivity,
  ) -> Result<Option<Activity>> {
    let progress = input.validate()?;
    let NewActivity { name, max_progress } = input;

    let activity = self
      .conn
      .call(move |conn| {
        let owned: Option<bool> = conn
          .query_row(
            "SELECT 1 FROM subjects WHERE id = ?1 AND user_id = ?2",
            rusqlite::params![subject_id, user_id],
            |_| Ok(true),
          )
          .optional()?;
        if owned.is_none() {
          return Ok(None);
        }

        conn.execute(
          "INSERT INTO activities (subject_id, name, current_progress, max_progress)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![subject_id, name, progress.current(), max_progress],
        )?;

        Ok(Some(Activity {
          id: conn.last_insert_rowid(),
          subject_id,
          name,
          current_progress: progress.current(),
          max_progress,
        }))
      })
      .await?;

    Ok(activity)
  }

  async fn get_activity(&self, user_id: i64, activity_id: i64) -> Result<Option<Activity>> {
    let activity = self
      .conn
      .call(move |conn| Ok(owned_activity(conn, user_id, activity_id)?))
      .await?;
    Ok(activity)
  }

  async fn delete_activity(&self, user_id: i64, activity_id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM activities
           WHERE id = ?1
             AND subject_id IN (SELECT id FROM subjects WHERE user_id = ?2)",
          rusqlite::params![activity_id, user_id],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn step_progress(
    &self,
    user_id: i64,
    activity_id: i64,
    step: Step,
  ) -> Result<Option<Activity>> {
    let activity = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(mut activity) = owned_activity(&tx, user_id, activity_id)? else {
          return Ok(None);
        };

        let changed = activity
          .step(step)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
        if changed {
          tx.execute(
            "UPDATE activities SET current_progress = ?1 WHERE id = ?2",
            rusqlite::params![activity.current_progress, activity.id],
          )?;
        }

        tx.commit()?;
        Ok(Some(activity))
      })
      .await?;

    Ok(activity)
  }
}
