//! Seeding a new user's subjects from the schedule directory.
//!
//! All remote lookups happen first; the resolved group id and the subject
//! rows are then written in one store transaction. A failure anywhere leaves
//! the user exactly as registration created it.
//!
//! Sampling two weeks is a heuristic: subjects that only meet outside those
//! weeks are missed, and the user adds them by hand.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  schedule::{ScheduleDirectory, sample_dates, subject_names},
  store::ProgressStore,
  subject::Subject,
  user::User,
};

/// What a successful synchronisation wrote.
#[derive(Debug, Clone)]
pub struct Onboarded {
  pub group_id: String,
  pub subjects: Vec<Subject>,
}

/// Resolve the user's group, collect subject names for the term containing
/// `today`, and persist both. Errors are returned to the caller.
pub async fn synchronize<S, D>(
  store: &S,
  directory: &D,
  user: &User,
  today: NaiveDate,
) -> Result<Onboarded>
where
  S: ProgressStore,
  D: ScheduleDirectory,
{
  let group = directory
    .search_groups(&user.group_name)
    .await
    .map_err(|e| Error::Directory(Box::new(e)))?
    .into_iter()
    .next()
    .ok_or_else(|| Error::GroupNotFound(user.group_name.clone()))?;

  let mut schedules = Vec::with_capacity(2);
  for date in sample_dates(today) {
    debug!(group_id = group.id, %date, "fetching schedule");
    let schedule = directory
      .schedule(group.id, date)
      .await
      .map_err(|e| Error::Directory(Box::new(e)))?;
    schedules.push(schedule);
  }

  let names: Vec<String> = subject_names(&schedules).into_iter().collect();
  let group_id = group.id.to_string();

  let subjects = store
    .apply_onboarding(user.id, &group_id, &names)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  Ok(Onboarded { group_id, subjects })
}

/// Run [`synchronize`], absorbing any failure.
///
/// Registration must succeed regardless of the directory, so errors are
/// logged and reported as `None`.
pub async fn onboard<S, D>(
  store: &S,
  directory: &D,
  user: &User,
  today: NaiveDate,
) -> Option<Onboarded>
where
  S: ProgressStore,
  D: ScheduleDirectory,
{
  match synchronize(store, directory, user, today).await {
    Ok(onboarded) => {
      info!(
        user_id = user.id,
        group_id = %onboarded.group_id,
        subjects = onboarded.subjects.len(),
        "onboarding sync complete"
      );
      Some(onboarded)
    }
    Err(e) => {
      warn!(
        user_id = user.id,
        group_name = %user.group_name,
        error = %e,
        "onboarding sync failed"
      );
      None
    }
  }
}
