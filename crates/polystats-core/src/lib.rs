//! Core types and trait definitions for PolyStats.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::ProgressStore`]; schedule clients
//! implement [`schedule::ScheduleDirectory`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod onboarding;
pub mod progress;
pub mod schedule;
pub mod store;
pub mod subject;
pub mod user;

pub use error::{Error, Result};
