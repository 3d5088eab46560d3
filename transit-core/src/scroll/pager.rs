//! Page rotation

use core::ops::Range;

/// Which page of rows is visible
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    shown_at_ms: u64,
}

impl Pager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages for `rows` rows
    pub fn page_count(rows: usize, per_page: usize) -> usize {
        if per_page == 0 {
            return 1;
        }
        rows.div_ceil(per_page).max(1)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Advance when the current page has been up for `dwell_ms`
    ///
    /// Returns `true` when the visible page changed (including a reset
    /// to the first page after the row count shrank).
    pub fn update(&mut self, now_ms: u64, rows: usize, per_page: usize, dwell_ms: u64) -> bool {
        let pages = Self::page_count(rows, per_page);

        if self.page >= pages {
            self.page = 0;
            self.shown_at_ms = now_ms;
            return true;
        }
        if pages == 1 {
            self.shown_at_ms = now_ms;
            return false;
        }
        if now_ms.saturating_sub(self.shown_at_ms) < dwell_ms {
            return false;
        }

        self.page = (self.page + 1) % pages;
        self.shown_at_ms = now_ms;
        trace!("Showing page {} of {}", self.page + 1, pages);
        true
    }

    /// Row indices on the visible page
    pub fn visible(&self, rows: usize, per_page: usize) -> Range<usize> {
        if per_page == 0 {
            return 0..rows;
        }
        let start = (self.page * per_page).min(rows);
        start..(start + per_page).min(rows)
    }
}
