//! Device-level services: network state, status reporting, restart

/// Network link state
pub trait Connectivity {
    fn is_connected(&self) -> bool;
}

/// Device error status
pub trait StatusSink {
    /// Raise an error with a human-readable message
    fn set_error(&mut self, message: &'static str);

    /// Clear the error, if any
    fn clear_error(&mut self);

    fn has_error(&self) -> bool;
}

/// Restart and watchdog control
pub trait SystemControl {
    /// Request a full device restart
    fn restart(&mut self);

    /// Set the hardware watchdog timeout
    fn set_watchdog_timeout(&mut self, timeout_ms: u32);

    /// Current hardware watchdog timeout
    fn watchdog_timeout(&self) -> u32;
}

/// Extends the watchdog timeout for as long as it is alive
///
/// The timeout is only ever raised, never shortened, and the previous
/// value is restored on drop.
pub struct WatchdogGuard<'a> {
    system: &'a mut dyn SystemControl,
    previous_ms: u32,
}

impl<'a> WatchdogGuard<'a> {
    pub fn new(system: &'a mut dyn SystemControl, timeout_ms: u32) -> Self {
        let previous_ms = system.watchdog_timeout();
        if timeout_ms > previous_ms {
            system.set_watchdog_timeout(timeout_ms);
        }
        Self {
            system,
            previous_ms,
        }
    }
}

impl Drop for WatchdogGuard<'_> {
    fn drop(&mut self) {
        if self.system.watchdog_timeout() != self.previous_ms {
            self.system.set_watchdog_timeout(self.previous_ms);
        }
    }
}
