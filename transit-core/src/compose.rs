//! Row composition
//!
//! Turns the flat trip snapshot into display rows. Every row groups trips
//! sharing a `(route_id, stop_id)` key; the first trip is the primary (name,
//! color, headsign) and the slots hold the trips whose times are shown.
//!
//! Rows refer to trips by index into the snapshot they were built from,
//! and [`ComposedRows`] keeps that snapshot alive next to them.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use heapless::Vec as HVec;

use crate::config::{DisplayConfig, DisplayMode};
use crate::schedule::Trip;

/// Time slots per row in dual-time mode
pub const MAX_SLOTS: usize = 2;

/// One rendered schedule line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    /// Index of the trip providing name, color and headsign
    pub primary: usize,
    /// Indices of the trips whose times are shown, in order
    pub slots: HVec<usize, MAX_SLOTS>,
}

impl DisplayRow {
    fn new(primary: usize) -> Self {
        let mut slots = HVec::new();
        // Capacity is at least one
        let _ = slots.push(primary);
        Self { primary, slots }
    }
}

/// Composition settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeOptions {
    pub mode: DisplayMode,
    pub dual_time: bool,
    pub row_limit: usize,
}

impl ComposeOptions {
    /// Slots per row: 2 in dual-time mode, else 1
    pub fn slot_count(&self) -> usize {
        if self.dual_time {
            MAX_SLOTS
        } else {
            1
        }
    }

    /// Aggregation only applies in dual-time mode
    pub fn effective_mode(&self) -> DisplayMode {
        if self.dual_time {
            self.mode
        } else {
            DisplayMode::Sequential
        }
    }
}

impl From<&DisplayConfig> for ComposeOptions {
    fn from(config: &DisplayConfig) -> Self {
        Self {
            mode: config.mode,
            dual_time: config.dual_time,
            row_limit: config.row_limit,
        }
    }
}

/// Rows plus the snapshot they index into
#[derive(Debug, Clone)]
pub struct ComposedRows {
    trips: Arc<[Trip]>,
    rows: Vec<DisplayRow>,
}

impl Default for ComposedRows {
    fn default() -> Self {
        Self {
            trips: Arc::from(Vec::new()),
            rows: Vec::new(),
        }
    }
}

/// Borrowed view of one row
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    trips: &'a [Trip],
    row: &'a DisplayRow,
}

impl<'a> RowView<'a> {
    pub fn primary(&self) -> &'a Trip {
        &self.trips[self.row.primary]
    }

    /// Trips whose times are shown, in slot order
    pub fn slots(&self) -> impl DoubleEndedIterator<Item = &'a Trip> + ExactSizeIterator + 'a {
        let trips = self.trips;
        self.row.slots.iter().map(move |&i| &trips[i])
    }

    pub fn has_realtime(&self) -> bool {
        self.slots().any(|trip| trip.is_realtime)
    }
}

impl ComposedRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn get(&self, index: usize) -> Option<RowView<'_>> {
        self.rows.get(index).map(|row| RowView {
            trips: &self.trips,
            row,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |row| RowView {
            trips: &self.trips,
            row,
        })
    }
}

/// Group `trips` into rows
pub fn compose(trips: Arc<[Trip]>, options: &ComposeOptions) -> ComposedRows {
    let slot_count = options.slot_count();
    let rows = match options.effective_mode() {
        DisplayMode::Sequential => sequential(&trips, options.row_limit, slot_count),
        DisplayMode::Aggregated => aggregated(&trips, options.row_limit, slot_count),
    };
    ComposedRows { trips, rows }
}

/// Rows in first-seen key order; new keys past the limit are dropped
fn sequential(trips: &[Trip], row_limit: usize, slot_count: usize) -> Vec<DisplayRow> {
    let mut rows: Vec<DisplayRow> = Vec::new();

    for (i, trip) in trips.iter().enumerate() {
        if let Some(row) = rows.iter_mut().find(|row| trips[row.primary].key() == trip.key()) {
            if row.slots.len() < slot_count {
                let _ = row.slots.push(i);
            }
            continue;
        }
        if rows.len() < row_limit {
            rows.push(DisplayRow::new(i));
        }
    }

    rows
}

/// Rows in ascending key order, limit applied after sorting
fn aggregated(trips: &[Trip], row_limit: usize, slot_count: usize) -> Vec<DisplayRow> {
    let mut groups: BTreeMap<(&str, &str), HVec<usize, MAX_SLOTS>> = BTreeMap::new();

    for (i, trip) in trips.iter().enumerate() {
        let slots = groups.entry(trip.key()).or_default();
        if slots.len() < slot_count {
            let _ = slots.push(i);
        }
    }

    groups
        .into_values()
        .take(row_limit)
        .map(|slots| DisplayRow {
            primary: slots[0],
            slots,
        })
        .collect()
}
