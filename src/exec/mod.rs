// src/exec/mod.rs

//! Job execution layer.
//!
//! This module is responsible for actually running the bulk evaluation job,
//! using `tokio::process::Command`, and reporting how it ended.
//!
//! - [`backend`] provides the `JobRunner` trait and the `JobOutcome` value
//!   the coordinator consumes.
//! - [`process`] provides `ProcessJobRunner`, the implementation used in
//!   production, which tests replace with a fake.

pub mod backend;
pub mod process;

pub use backend::{JobOutcome, JobRunner};
pub use process::{ProcessJobRunner, BACKEND_URL_ENV};
