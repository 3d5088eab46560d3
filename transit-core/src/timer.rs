//! Fixed-capacity timer queue
//!
//! The production [`Scheduler`]: a small list of named deadlines polled
//! from the main loop. Each [`TimerId`] appears at most once.

use heapless::Vec as HVec;

use crate::traits::{Scheduler, TimerId};

/// Capacity of the queue
pub const MAX_TIMERS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    id: TimerId,
    due_ms: u64,
    /// `Some` for intervals
    period_ms: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    entries: HVec<Entry, MAX_TIMERS>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deadline of `id`, if pending
    pub fn due_ms(&self, id: TimerId) -> Option<u64> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.due_ms)
    }

    fn insert(&mut self, entry: Entry) {
        self.cancel(entry.id);
        if self.entries.push(entry).is_err() {
            error!("Timer queue full, dropping {:?}", entry.id);
        }
    }
}

impl Scheduler for TimerQueue {
    fn set_timeout(&mut self, id: TimerId, now_ms: u64, delay_ms: u32) {
        self.insert(Entry {
            id,
            due_ms: now_ms + u64::from(delay_ms),
            period_ms: None,
        });
    }

    fn set_interval(&mut self, id: TimerId, now_ms: u64, period_ms: u32) {
        let period_ms = period_ms.max(1);
        self.insert(Entry {
            id,
            due_ms: now_ms + u64::from(period_ms),
            period_ms: Some(period_ms),
        });
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                self.entries.swap_remove(index);
                true
            }
            None => false,
        }
    }

    fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    fn pending(&self) -> usize {
        self.entries.len()
    }

    fn cancel_all(&mut self) {
        self.entries.clear();
    }

    fn pop_due(&mut self, now_ms: u64) -> Option<TimerId> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due_ms <= now_ms)
            .min_by_key(|(_, entry)| (entry.due_ms, entry.id))
            .map(|(index, _)| index)?;

        let entry = self.entries[index];
        match entry.period_ms {
            Some(period) => {
                // Skip missed periods instead of firing a burst
                let period = u64::from(period);
                let missed = (now_ms - entry.due_ms) / period;
                self.entries[index].due_ms = entry.due_ms + (missed + 1) * period;
            }
            None => {
                self.entries.swap_remove(index);
            }
        }
        Some(entry.id)
    }
}
