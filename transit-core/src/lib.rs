//! Board-agnostic core logic for the transit tracker display
//!
//! This crate contains all application logic that does not depend on a
//! specific board, network stack or panel:
//!
//! - Collaborator traits (display, clocks, scheduler, transport, system)
//! - Connection lifecycle with backoff, heartbeat and restart policy
//! - Lock-guarded schedule store
//! - Row composition, scroll timing and paging
//! - Rendering of rows and placeholders
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

// Must come first so the logging macros are visible to every module
mod fmt;

pub mod compose;
pub mod config;
pub mod connection;
pub mod localization;
pub mod render;
pub mod schedule;
pub mod scroll;
pub mod timer;
pub mod tracker;
pub mod traits;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{ConfigError, TrackerConfig};
pub use schedule::{ScheduleStore, Trip};
pub use timer::TimerQueue;
pub use tracker::{Env, TransitTracker};
