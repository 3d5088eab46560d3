//! Time sources

/// Wall clock, synchronized from the network
pub trait RealTimeClock {
    /// Current time in seconds since the Unix epoch
    fn timestamp(&self) -> i64;

    /// Whether the clock has been synchronized yet
    fn is_valid(&self) -> bool;
}

/// Monotonic uptime counter
pub trait Uptime {
    /// Milliseconds since boot
    fn uptime_ms(&self) -> u64;
}
