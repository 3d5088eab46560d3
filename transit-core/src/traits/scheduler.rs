//! Cooperative timer scheduling

/// Named timers used by the tracker
///
/// Registering a timer under an id that is already pending replaces the
/// pending entry, so each id is scheduled at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerId {
    /// Connect on the next loop iteration after an unexpected close
    Connect,
    /// Retry after a failed connection attempt
    Reconnect,
    /// Periodic heartbeat / staleness check
    HealthCheck,
}

/// Deferred and periodic callbacks, cancellable by id
///
/// Times are uptime milliseconds supplied by the caller, so
/// implementations stay deterministic.
pub trait Scheduler {
    /// Fire `id` once, `delay_ms` after `now_ms`
    fn set_timeout(&mut self, id: TimerId, now_ms: u64, delay_ms: u32);

    /// Fire `id` every `period_ms`, first at `now_ms + period_ms`
    fn set_interval(&mut self, id: TimerId, now_ms: u64, period_ms: u32);

    /// Cancel `id`; returns whether it was pending
    fn cancel(&mut self, id: TimerId) -> bool;

    /// Whether `id` is pending
    fn is_pending(&self, id: TimerId) -> bool;

    /// Number of pending timers
    fn pending(&self) -> usize;

    /// Cancel everything
    fn cancel_all(&mut self);

    /// Take the next timer due at `now_ms`, if any
    fn pop_due(&mut self, now_ms: u64) -> Option<TimerId>;

    /// Fire `id` on the next loop iteration
    fn defer(&mut self, id: TimerId, now_ms: u64) {
        self.set_timeout(id, now_ms, 0);
    }
}
