//! Feed connection management
//!
//! - `state`: lifecycle state machine
//! - `manager`: connect/backoff/heartbeat policy around a transport

pub mod manager;
pub mod state;

pub use manager::{
    retry_delay_ms, ConnectOutcome, ConnectionManager, LinkUpdate, RetryPlan, SkipReason,
    CONNECT_ERROR, CONNECT_WATCHDOG_MS, ERROR_AFTER_ATTEMPTS, HEALTH_CHECK_INTERVAL_MS,
    HEARTBEAT_TIMEOUT_MS, MAX_RETRY_DELAY_MS, RESTART_AFTER_ATTEMPTS, RETRY_STEP_MS,
    STALE_SCHEDULE_S,
};
pub use state::{ConnectionState, LinkEvent};
