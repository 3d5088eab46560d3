//! Collaborator traits
//!
//! These traits define the interface between the tracker logic and the
//! platform it runs on. Each has one production implementation (in
//! `transit-drivers` / `transit-display`) and one test double (in
//! [`crate::testing`]).

pub mod clock;
pub mod display;
pub mod scheduler;
pub mod system;
pub mod transport;

pub use clock::{RealTimeClock, Uptime};
pub use display::{ClipRect, Color, DisplaySurface, GlyphMetrics, TextAlign, TextMetrics};
pub use scheduler::{Scheduler, TimerId};
pub use system::{Connectivity, StatusSink, SystemControl, WatchdogGuard};
pub use transport::{MessageTransport, TransportEvent};
