//! The `ProgressStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `polystats-store-sqlite`). Higher layers (`polystats-api`, the onboarding
//! synchronizer) depend on this abstraction, not on any concrete backend.
//!
//! Every subject and activity operation takes the caller's `user_id`. A row
//! owned by someone else is reported exactly like a missing row (`None` or
//! `false`), so callers cannot probe for the existence of other users' data.

use std::future::Future;

use crate::{
  progress::Step,
  subject::{Activity, NewActivity, Subject},
  user::{Credentials, NewUser, User},
};

/// Abstraction over a PolyStats store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ProgressStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new user. Returns `None` if the email is already
  /// registered.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up a user and their password hash by email.
  fn find_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;

  /// Persist the resolved `group_id` and create one subject per name, all
  /// in a single transaction. Nothing is written if any part fails.
  fn apply_onboarding<'a>(
    &'a self,
    user_id: i64,
    group_id: &'a str,
    subject_names: &'a [String],
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + 'a;

  // ── Access tokens ─────────────────────────────────────────────────────

  /// Record a token digest issued to `user_id`.
  fn insert_token(
    &self,
    user_id: i64,
    token_digest: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Resolve a token digest to its owner.
  fn user_for_token(
    &self,
    token_digest: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// Create a subject with no activities.
  fn create_subject(
    &self,
    user_id: i64,
    name: String,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// All subjects owned by `user_id`, activities nested, insertion order.
  fn list_subjects(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  fn get_subject(
    &self,
    user_id: i64,
    subject_id: i64,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// Delete a subject and, transitively, its activities. Returns `false` if
  /// no such subject is owned by `user_id`.
  fn delete_subject(
    &self,
    user_id: i64,
    subject_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Activities ────────────────────────────────────────────────────────

  /// Add an activity at zero progress. Returns `None` if the subject is not
  /// owned by `user_id`.
  fn add_activity(
    &self,
    user_id: i64,
    subject_id: i64,
    input: NewActivity,
  ) -> impl Future<Output = Result<Option<Activity>, Self::Error>> + Send + '_;

  fn get_activity(
    &self,
    user_id: i64,
    activity_id: i64,
  ) -> impl Future<Output = Result<Option<Activity>, Self::Error>> + Send + '_;

  fn delete_activity(
    &self,
    user_id: i64,
    activity_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Apply a saturating step to an activity's counter as one atomic
  /// read-modify-write. Returns the activity as stored afterwards; a step
  /// at either bound returns it unchanged.
  fn step_progress(
    &self,
    user_id: i64,
    activity_id: i64,
    step: Step,
  ) -> impl Future<Output = Result<Option<Activity>, Self::Error>> + Send + '_;
}
