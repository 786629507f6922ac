//! Subjects and the activities tracked within them.
//!
//! A subject belongs to exactly one user and owns its activities; deleting a
//! subject deletes every activity under it.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  progress::{Progress, Step},
};

/// A course the user is tracking, with its activities nested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub id:         i64,
  pub user_id:    i64,
  pub name:       String,
  #[serde(default)]
  pub activities: Vec<Activity>,
}

/// A gradable requirement within a subject (e.g. a set of labs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
  pub id:               i64,
  pub subject_id:       i64,
  pub name:             String,
  pub current_progress: u32,
  pub max_progress:     u32,
}

impl Activity {
  pub fn progress(&self) -> Result<Progress> {
    Progress::try_from_parts(self.current_progress, self.max_progress)
  }

  /// Apply a saturating step to this activity's counter. Returns `true` if
  /// the stored value needs writing back.
  pub fn step(&mut self, step: Step) -> Result<bool> {
    let mut progress = self.progress()?;
    let changed = progress.apply(step);
    self.current_progress = progress.current();
    Ok(changed)
  }
}

/// Input for creating an activity. New activities always start at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
  pub name:         String,
  pub max_progress: u32,
}

impl NewActivity {
  /// Check the target count forms a valid counter.
  pub fn validate(&self) -> Result<Progress> { Progress::new(self.max_progress) }
}
