// src/health/mod.rs

//! Health gate for the downstream classification backend.
//!
//! - [`endpoint`] derives the `/health` endpoint from the configured classify URL.
//! - [`probe`] holds the `HealthProbe` trait and the `reqwest`-based
//!   implementation used in production.

pub mod probe;
pub mod endpoint;

pub use probe::{interpret_health_body, HealthProbe, HealthStatus, HttpHealthProbe};
pub use endpoint::derive_health_url;
