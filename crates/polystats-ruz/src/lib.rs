//! Client for the SPbPU RUZ schedule API.
//!
//! [`RuzClient`] implements [`polystats_core::schedule::ScheduleDirectory`]
//! so the onboarding synchronizer and the group lookup endpoint can talk to
//! the real directory. Every request carries a timeout and is never retried.

mod client;

pub mod error;

pub use client::{DEFAULT_BASE_URL, RuzClient, RuzConfig};
pub use error::{Error, Result};
