//! Host platform: system clocks and process-level services

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use transit_core::traits::{Connectivity, RealTimeClock, StatusSink, SystemControl, Uptime};

/// Wall-clock times before this are treated as unsynchronized
/// (2020-01-01T00:00:00Z)
pub const MIN_VALID_TIMESTAMP: i64 = 1_577_836_800;

/// Wall clock from the OS, uptime from process start
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl RealTimeClock for SystemClock {
    fn timestamp(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    fn is_valid(&self) -> bool {
        self.timestamp() >= MIN_VALID_TIMESTAMP
    }
}

impl Uptime for SystemClock {
    fn uptime_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Network that is up whenever the OS has it up
///
/// A host has no link state worth polling; connect failures are handled
/// by the retry policy instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostNetwork;

impl Connectivity for HostNetwork {
    fn is_connected(&self) -> bool {
        true
    }
}

/// Error status reported through the log
#[derive(Debug, Clone, Default)]
pub struct LogStatus {
    error: Option<&'static str>,
}

impl LogStatus {
    pub fn error(&self) -> Option<&'static str> {
        self.error
    }
}

impl StatusSink for LogStatus {
    fn set_error(&mut self, message: &'static str) {
        if self.error != Some(message) {
            error!("{}", message);
        }
        self.error = Some(message);
    }

    fn clear_error(&mut self) {
        if self.error.take().is_some() {
            info!("Error status cleared");
        }
    }

    fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Process-level restart handling
///
/// A restart request is latched for the main loop to act on, usually by
/// exiting so a supervisor starts the process again. There is no
/// hardware watchdog; the timeout is only recorded.
#[derive(Debug, Clone, Default)]
pub struct HostSystem {
    restart_requested: bool,
    watchdog_ms: u32,
}

impl HostSystem {
    pub fn new(watchdog_ms: u32) -> Self {
        Self {
            restart_requested: false,
            watchdog_ms,
        }
    }

    pub fn restart_requested(&self) -> bool {
        self.restart_requested
    }
}

impl SystemControl for HostSystem {
    fn restart(&mut self) {
        warn!("Restart requested");
        self.restart_requested = true;
    }

    fn set_watchdog_timeout(&mut self, timeout_ms: u32) {
        trace!("Watchdog timeout {} ms", timeout_ms);
        self.watchdog_ms = timeout_ms;
    }

    fn watchdog_timeout(&self) -> u32 {
        self.watchdog_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_synced() {
        let clock = SystemClock::new();
        assert!(clock.is_valid());
        assert!(clock.uptime_ms() < 60_000);
    }

    #[test]
    fn test_status_and_restart() {
        let mut status = LogStatus::default();
        status.set_error("Failed to connect to WebSocket server");
        assert!(status.has_error());
        status.clear_error();
        assert_eq!(status.error(), None);

        let mut system = HostSystem::new(5000);
        system.set_watchdog_timeout(20000);
        assert_eq!(system.watchdog_timeout(), 20000);
        system.restart();
        assert!(system.restart_requested());
    }
}
