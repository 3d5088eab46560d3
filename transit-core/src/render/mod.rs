//! Schedule rendering
//!
//! Either a full row layout or a single centered placeholder is drawn,
//! never a mix. Row layout, left to right:
//! ```text
//! | route | headsign (clipped, scrolled) | icon | 5min, 12min |
//! ```

pub mod icon;

use alloc::string::String;
use heapless::Vec as HVec;

use crate::compose::{RowView, MAX_SLOTS};
use crate::config::TimeDisplay;
use crate::localization::Localization;
use crate::traits::{ClipRect, Color, DisplaySurface, GlyphMetrics, TextAlign};

pub use icon::{draw_realtime_icon, REALTIME_ICON};

pub const PLACEHOLDER_COLOR: Color = Color(0x252627);
pub const ERROR_COLOR: Color = Color(0xFE4C5C);
pub const REALTIME_COLOR: Color = Color(0x20FF00);
pub const SCHEDULED_COLOR: Color = Color(0xA7A7A7);
pub const HEADSIGN_COLOR: Color = Color::WHITE;

/// First row's top edge
pub const TOP_MARGIN: i32 = 2;
/// Gap between route name and headsign
pub const ROUTE_MARGIN: i32 = 3;
/// Gap between headsign (or icon) and the time column
pub const TIME_MARGIN: i32 = 2;
/// Space taken by the realtime icon
pub const ICON_SPACE: i32 = 8;

const SLOT_SEPARATOR: &str = ", ";

/// Why no schedule can be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Placeholder {
    WaitingForNetwork,
    WaitingForTimeSync,
    NoBaseUrl,
    ErrorLoading,
    Loading,
    NoUpcoming(TimeDisplay),
}

/// Inputs for the placeholder decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub network_connected: bool,
    pub time_synced: bool,
    pub has_base_url: bool,
    pub has_error: bool,
    pub ever_connected: bool,
    pub schedule_empty: bool,
}

impl Placeholder {
    /// First unmet precondition, in priority order
    pub fn select(readiness: &Readiness, time_display: TimeDisplay) -> Option<Self> {
        if !readiness.network_connected {
            Some(Placeholder::WaitingForNetwork)
        } else if !readiness.time_synced {
            Some(Placeholder::WaitingForTimeSync)
        } else if !readiness.has_base_url {
            Some(Placeholder::NoBaseUrl)
        } else if readiness.has_error {
            Some(Placeholder::ErrorLoading)
        } else if !readiness.ever_connected {
            Some(Placeholder::Loading)
        } else if readiness.schedule_empty {
            Some(Placeholder::NoUpcoming(time_display))
        } else {
            None
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Placeholder::WaitingForNetwork => "Waiting for network",
            Placeholder::WaitingForTimeSync => "Waiting for time sync",
            Placeholder::NoBaseUrl => "No base URL set",
            Placeholder::ErrorLoading => "Error loading schedule",
            Placeholder::Loading => "Loading...",
            Placeholder::NoUpcoming(TimeDisplay::Departure) => "No upcoming departures",
            Placeholder::NoUpcoming(TimeDisplay::Arrival) => "No upcoming arrivals",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Placeholder::ErrorLoading => ERROR_COLOR,
            _ => PLACEHOLDER_COLOR,
        }
    }
}

/// One time label, positioned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLabel {
    pub text: String,
    pub color: Color,
    pub x: i32,
}

/// Measured positions of one row
#[derive(Debug, Clone)]
pub struct RowLayout<'a> {
    pub row: RowView<'a>,
    pub line_height: i32,
    /// Baseline offset from the row top
    pub baseline: i32,
    pub labels: HVec<TimeLabel, MAX_SLOTS>,
    /// Right edge of the realtime icon, if shown
    pub icon_right: Option<i32>,
    pub headsign_left: i32,
    pub headsign_right: i32,
    pub headsign_width: i32,
}

impl RowLayout<'_> {
    /// Pixels available to the headsign
    pub fn available_width(&self) -> i32 {
        (self.headsign_right - self.headsign_left).max(0)
    }
}

/// Draws placeholders and schedule rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    time_display: TimeDisplay,
}

impl Renderer {
    pub fn new(time_display: TimeDisplay) -> Self {
        Self { time_display }
    }

    pub fn time_display(&self) -> TimeDisplay {
        self.time_display
    }

    /// Centered placeholder message
    pub fn draw_placeholder(&self, surface: &mut dyn DisplaySurface, placeholder: Placeholder) {
        let x = surface.width() / 2;
        let y = surface.height() / 2;
        surface.print(x, y, placeholder.color(), TextAlign::Center, placeholder.text());
    }

    /// Measure one row for a surface `width` pixels wide
    ///
    /// Time labels are laid out right to left; all but the rightmost
    /// carry a `, ` separator.
    pub fn layout<'a>(
        &self,
        row: RowView<'a>,
        glyphs: &dyn GlyphMetrics,
        localization: &Localization,
        now: i64,
        width: i32,
    ) -> RowLayout<'a> {
        let primary = row.primary();
        let route = glyphs.measure(&primary.route_name);

        let slot_count = row.slots().len();
        let mut right = width;
        let mut labels: HVec<TimeLabel, MAX_SLOTS> = HVec::new();
        for (i, trip) in row.slots().enumerate().rev() {
            let mut text =
                localization.fmt_duration_from_now(trip.display_time(self.time_display), now);
            if i + 1 != slot_count {
                text.push_str(SLOT_SEPARATOR);
            }
            right -= glyphs.measure(&text).width;
            let color = if trip.is_realtime {
                REALTIME_COLOR
            } else {
                SCHEDULED_COLOR
            };
            // At most MAX_SLOTS slots per row
            let _ = labels.push(TimeLabel { text, color, x: right });
        }
        labels.reverse();

        let mut headsign_right = right - TIME_MARGIN;
        let icon_right = if row.has_realtime() {
            let icon_right = headsign_right;
            headsign_right -= ICON_SPACE;
            Some(icon_right)
        } else {
            None
        };

        RowLayout {
            row,
            line_height: route.height,
            baseline: route.baseline,
            labels,
            icon_right,
            headsign_left: route.width + ROUTE_MARGIN,
            headsign_right,
            headsign_width: glyphs.measure(&primary.headsign).width,
        }
    }

    /// Draw a measured row with its top at `y`
    pub fn draw_row(
        &self,
        surface: &mut dyn DisplaySurface,
        layout: &RowLayout<'_>,
        y: i32,
        offset: i32,
        blink_frame: u8,
    ) {
        let primary = layout.row.primary();
        surface.print(0, y, primary.route_color, TextAlign::TopLeft, &primary.route_name);

        for label in &layout.labels {
            surface.print(label.x, y, label.color, TextAlign::TopLeft, &label.text);
        }

        if let Some(right) = layout.icon_right {
            draw_realtime_icon(surface, right, y + layout.baseline - 1, blink_frame);
        }

        let height = surface.height();
        surface.start_clipping(ClipRect {
            left: layout.headsign_left,
            top: 0,
            right: layout.headsign_right,
            bottom: height,
        });
        surface.print(
            layout.headsign_left - offset,
            y,
            HEADSIGN_COLOR,
            TextAlign::TopLeft,
            &primary.headsign,
        );
        surface.end_clipping();
    }
}
