//! Scroll and paging timing
//!
//! Everything here is a pure function of uptime and the row overflows,
//! so a frame can be reproduced from `(config, anchor, now)`.
//!
//! Row cycle, for a headsign `overflow` pixels wider than its space:
//! ```text
//! idle-left | scroll-left | idle-right | scroll-right | wait for slowest row
//!  offset 0 |  0 -> max   |    max     |   max -> 0   |  0
//! ```

pub mod blink;
pub mod clock;
pub mod pager;

use serde::Deserialize;

pub use blink::{blink_frame, segment_lit, BLINK_FRAMES};
pub use clock::ScrollClock;
pub use pager::Pager;

/// Scroll and paging constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct ScrollConfig {
    /// Scroll overflowing headsigns at all
    pub scrolling: bool,
    pub speed_px_per_s: u32,
    /// Dwell before scrolling left
    pub idle_left_ms: u32,
    /// Dwell at the far end before scrolling back
    pub idle_right_ms: u32,
    /// Overflow below this many pixels is ignored
    pub jitter_threshold_px: i32,
    /// Split rows into pages
    pub paging: bool,
    pub trips_per_page: usize,
    /// Minimum time a page stays up
    pub page_min_dwell_ms: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            scrolling: true,
            speed_px_per_s: 15,
            idle_left_ms: 3000,
            idle_right_ms: 1500,
            jitter_threshold_px: 3,
            paging: false,
            trips_per_page: 3,
            page_min_dwell_ms: 5000,
        }
    }
}

impl ScrollConfig {
    /// Pixels a headsign of `text_width` overflows `available`, 0 when
    /// within the jitter threshold or scrolling is off
    pub fn overflow(&self, text_width: i32, available: i32) -> i32 {
        let overflow = text_width - available;
        if !self.scrolling || overflow < self.jitter_threshold_px.max(1) {
            0
        } else {
            overflow
        }
    }

    /// Duration of one scroll pass
    pub fn scroll_ms(&self, overflow: i32) -> u64 {
        if overflow <= 0 {
            return 0;
        }
        overflow as u64 * 1000 / u64::from(self.speed_px_per_s.max(1))
    }

    /// Full cycle of one row, 0 when it does not scroll
    pub fn row_cycle_ms(&self, overflow: i32) -> u64 {
        if overflow <= 0 {
            return 0;
        }
        u64::from(self.idle_left_ms) + 2 * self.scroll_ms(overflow) + u64::from(self.idle_right_ms)
    }

    /// Offset of a row `elapsed_ms` into its cycle
    pub fn offset_at(&self, overflow: i32, elapsed_ms: u64) -> i32 {
        if overflow <= 0 {
            return 0;
        }

        let scroll = self.scroll_ms(overflow);
        let idle_left = u64::from(self.idle_left_ms);
        let idle_right = u64::from(self.idle_right_ms);

        let scroll_left_end = idle_left + scroll;
        let idle_right_end = scroll_left_end + idle_right;
        let scroll_right_end = idle_right_end + scroll;

        let ramp = |t: u64| -> i32 {
            if scroll == 0 {
                overflow
            } else {
                (t * overflow as u64 / scroll) as i32
            }
        };

        if elapsed_ms < idle_left {
            0
        } else if elapsed_ms < scroll_left_end {
            ramp(elapsed_ms - idle_left)
        } else if elapsed_ms < idle_right_end {
            overflow
        } else if elapsed_ms < scroll_right_end {
            overflow - ramp(elapsed_ms - idle_right_end)
        } else {
            0
        }
    }
}
