//! The schedule directory: the university API that maps group names to ids
//! and lists lessons per week.
//!
//! Only the fields PolyStats reads are modelled; everything else in the
//! directory's payloads is ignored on deserialisation.

use std::{collections::BTreeSet, future::Future};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

// ─── Payloads ────────────────────────────────────────────────────────────────

/// A study group as returned by the directory's search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub id:   i64,
  #[serde(default)]
  pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupSearch {
  #[serde(default)]
  pub groups: Vec<Group>,
}

/// One week of lessons for a group.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Schedule {
  #[serde(default)]
  pub days: Vec<Day>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Day {
  #[serde(default)]
  pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Lesson {
  pub subject: Option<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Read-only access to the university schedule directory.
///
/// Implementations must bound every call with a timeout and must not retry.
pub trait ScheduleDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Free-text group search. Results are in the directory's relevance order.
  fn search_groups<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + 'a;

  /// The week of lessons containing `date` for `group_id`.
  fn schedule(
    &self,
    group_id: i64,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Schedule, Self::Error>> + Send + '_;
}

// ─── Term sampling ───────────────────────────────────────────────────────────

/// A date in the middle of the academic term that contains `today`.
///
/// September through December and January belong to the fall term (sampled
/// on November 10); February through August to the spring term (April 10).
pub fn mid_term_date(today: NaiveDate) -> NaiveDate {
  let (year, month, day) = match today.month() {
    9..=12 => (today.year(), 11, 10),
    1 => (today.year() - 1, 11, 10),
    _ => (today.year(), 4, 10),
  };
  NaiveDate::from_ymd_opt(year, month, day).unwrap_or(today)
}

/// The two dates sampled during onboarding: the mid-term date and the same
/// day a week later, so both halves of a biweekly rotation are seen.
pub fn sample_dates(today: NaiveDate) -> [NaiveDate; 2] {
  let first = mid_term_date(today);
  let second = first.checked_add_days(Days::new(7)).unwrap_or(first);
  [first, second]
}

/// Every distinct subject name across `schedules`, trimmed, empties dropped.
pub fn subject_names<'a>(
  schedules: impl IntoIterator<Item = &'a Schedule>,
) -> BTreeSet<String> {
  schedules
    .into_iter()
    .flat_map(|s| &s.days)
    .flat_map(|d| &d.lessons)
    .filter_map(|l| l.subject.as_deref())
    .map(str::trim)
    .filter(|name| !name.is_empty())
    .map(str::to_owned)
    .collect()
}
