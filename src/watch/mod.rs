// src/watch/mod.rs

//! File watching and input detection.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`) on the input
//!   directory.
//! - Filtering appeared paths by file type.
//! - Debouncing bursts of arrivals into coalesced triggers.
//!
//! It does **not** know about health checks or job state; it only turns
//! filesystem changes into trigger requests.

pub mod event_handler;
pub mod filter;
pub mod watcher;

pub use event_handler::{accept_path, appeared_paths, forward_events};
pub use filter::{ExtensionFilter, ALLOWED_EXTENSIONS};
pub use watcher::{spawn_watcher, WatcherHandle};
