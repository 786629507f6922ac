//! The bounded progress counter.
//!
//! An activity's progress is a single integer clamped to `0..=max`. The only
//! transitions are a saturating `+1` and a saturating `-1`; stepping past
//! either bound is a no-op rather than an error.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A transition applied to a [`Progress`] counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
  Increment,
  Decrement,
}

/// A saturating counter with `0 <= current <= max` and `max >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
  current: u32,
  max:     u32,
}

impl Progress {
  /// A fresh counter at zero.
  pub fn new(max: u32) -> Result<Self> { Self::try_from_parts(0, max) }

  /// Rebuild a counter from stored parts, rejecting values that violate the
  /// invariant.
  pub fn try_from_parts(current: u32, max: u32) -> Result<Self> {
    if max == 0 || current > max {
      return Err(Error::InvalidProgress { current, max });
    }
    Ok(Self { current, max })
  }

  pub fn current(&self) -> u32 { self.current }

  pub fn max(&self) -> u32 { self.max }

  pub fn is_complete(&self) -> bool { self.current == self.max }

  /// Apply `step`, clamping at the bounds. Returns `true` if the counter
  /// changed.
  pub fn apply(&mut self, step: Step) -> bool {
    let next = match step {
      Step::Increment => self.current.saturating_add(1).min(self.max),
      Step::Decrement => self.current.saturating_sub(1),
    };
    let changed = next != self.current;
    self.current = next;
    changed
  }
}
