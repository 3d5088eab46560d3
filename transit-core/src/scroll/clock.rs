//! Per-frame scroll state

use super::{blink_frame, ScrollConfig};

/// Shared scroll phase of the visible rows
///
/// All rows on a page run from the same anchor and the page cycle is the
/// slowest row's cycle, so the rows stay phase-aligned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollClock {
    config: ScrollConfig,
    anchor_ms: u64,
    cycle_ms: u64,
    blink_frame: u8,
}

impl ScrollClock {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            anchor_ms: 0,
            cycle_ms: 0,
            blink_frame: 0,
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Restart the cycle at `now_ms` (idle-left)
    pub fn reset(&mut self, now_ms: u64) {
        self.anchor_ms = now_ms;
    }

    pub fn anchor_ms(&self) -> u64 {
        self.anchor_ms
    }

    /// Compute the shared values for a frame at `now_ms`
    pub fn begin_frame(&mut self, now_ms: u64) {
        self.blink_frame = blink_frame(now_ms);
    }

    /// Realtime icon frame for the current frame
    pub fn blink_frame(&self) -> u8 {
        self.blink_frame
    }

    /// Set the page cycle from the overflow of every visible row
    pub fn set_overflows(&mut self, overflows: impl IntoIterator<Item = i32>) {
        self.cycle_ms = overflows
            .into_iter()
            .map(|overflow| self.config.row_cycle_ms(overflow))
            .max()
            .unwrap_or(0);
    }

    /// Page cycle, 0 when nothing overflows
    pub fn cycle_ms(&self) -> u64 {
        self.cycle_ms
    }

    /// Position within the page cycle
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        if self.cycle_ms == 0 {
            return 0;
        }
        now_ms.saturating_sub(self.anchor_ms) % self.cycle_ms
    }

    /// Horizontal offset of a row with `overflow` at `now_ms`
    pub fn offset(&self, overflow: i32, now_ms: u64) -> i32 {
        self.config.offset_at(overflow, self.elapsed_ms(now_ms))
    }
}
