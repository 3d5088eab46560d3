//! Shared schedule snapshot
//!
//! The trip list is an `Arc<[Trip]>` replaced wholesale under a blocking
//! mutex. Readers clone the `Arc` under the lock and work on their own
//! handle afterwards, so they never observe a partial update and never
//! hold the lock while laying out rows.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;

use super::Trip;

/// Lock-guarded current schedule
pub struct ScheduleStore<M: RawMutex = CriticalSectionRawMutex> {
    trips: Mutex<M, RefCell<Arc<[Trip]>>>,
}

impl<M: RawMutex> Default for ScheduleStore<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> ScheduleStore<M> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            trips: Mutex::new(RefCell::new(Arc::from(Vec::new()))),
        }
    }

    /// Replace the schedule
    pub fn update(&self, trips: Vec<Trip>) {
        let next: Arc<[Trip]> = Arc::from(trips);
        let previous = self.trips.lock(|cell| cell.replace(next));
        // Last handle to the old list may be ours; free it outside the lock
        drop(previous);
    }

    /// Current schedule
    pub fn snapshot(&self) -> Arc<[Trip]> {
        self.trips.lock(|cell| Arc::clone(&cell.borrow()))
    }

    pub fn len(&self) -> usize {
        self.trips.lock(|cell| cell.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Latest departure time among all trips
    pub fn newest_departure(&self) -> Option<i64> {
        self.trips
            .lock(|cell| cell.borrow().iter().map(|trip| trip.departure_time).max())
    }

    /// Whether even the newest trip departed more than `max_age_s` before `now`
    ///
    /// An empty schedule is never stale.
    pub fn is_stale(&self, now: i64, max_age_s: i64) -> bool {
        self.newest_departure()
            .is_some_and(|departure| now.saturating_sub(departure) > max_age_s)
    }
}
