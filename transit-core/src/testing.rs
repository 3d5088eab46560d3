//! Test doubles for the collaborator traits
//!
//! Available to this crate's tests and, through the `testing` feature,
//! to downstream crates.

use alloc::collections::VecDeque;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::Cell;

use crate::config::DEFAULT_ROUTE_COLOR;
use crate::schedule::Trip;
use crate::traits::{
    ClipRect, Color, Connectivity, DisplaySurface, GlyphMetrics, MessageTransport, RealTimeClock,
    StatusSink, SystemControl, TextAlign, TextMetrics, TransportEvent, Uptime,
};

/// Scheduled trip departing (and arriving) at `departure`
pub fn trip(route: &str, stop: &str, departure: i64) -> Trip {
    Trip {
        route_id: route.to_string(),
        stop_id: stop.to_string(),
        route_name: route.to_string(),
        route_color: DEFAULT_ROUTE_COLOR,
        headsign: "Downtown".to_string(),
        arrival_time: departure,
        departure_time: departure,
        is_realtime: false,
    }
}

/// Wall clock and uptime under test control
#[derive(Debug, Default)]
pub struct FakeClock {
    timestamp: Cell<i64>,
    valid: Cell<bool>,
    uptime_ms: Cell<u64>,
}

impl FakeClock {
    /// Synchronized clock at `timestamp`, uptime 0
    pub fn synced(timestamp: i64) -> Self {
        Self {
            timestamp: Cell::new(timestamp),
            valid: Cell::new(true),
            uptime_ms: Cell::new(0),
        }
    }

    pub fn set_timestamp(&self, timestamp: i64) {
        self.timestamp.set(timestamp);
    }

    pub fn set_valid(&self, valid: bool) {
        self.valid.set(valid);
    }

    pub fn set_uptime_ms(&self, uptime_ms: u64) {
        self.uptime_ms.set(uptime_ms);
    }

    /// Move both clocks forward
    pub fn advance_ms(&self, ms: u64) {
        self.uptime_ms.set(self.uptime_ms.get() + ms);
        self.timestamp
            .set(self.timestamp.get() + (ms / 1000) as i64);
    }
}

impl RealTimeClock for FakeClock {
    fn timestamp(&self) -> i64 {
        self.timestamp.get()
    }

    fn is_valid(&self) -> bool {
        self.valid.get()
    }
}

impl Uptime for FakeClock {
    fn uptime_ms(&self) -> u64 {
        self.uptime_ms.get()
    }
}

#[derive(Debug)]
pub struct FakeNetwork {
    connected: Cell<bool>,
}

impl FakeNetwork {
    pub fn new(connected: bool) -> Self {
        Self {
            connected: Cell::new(connected),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.set(connected);
    }
}

impl Connectivity for FakeNetwork {
    fn is_connected(&self) -> bool {
        self.connected.get()
    }
}

/// Keeps the last error message
#[derive(Debug, Default)]
pub struct RecordingStatus {
    pub error: Option<&'static str>,
}

impl StatusSink for RecordingStatus {
    fn set_error(&mut self, message: &'static str) {
        self.error = Some(message);
    }

    fn clear_error(&mut self) {
        self.error = None;
    }

    fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Counts restarts and logs watchdog changes
#[derive(Debug)]
pub struct FakeSystem {
    pub restarts: u32,
    pub watchdog_ms: u32,
    /// Every value passed to `set_watchdog_timeout`
    pub watchdog_history: Vec<u32>,
}

impl FakeSystem {
    pub fn new(watchdog_ms: u32) -> Self {
        Self {
            restarts: 0,
            watchdog_ms,
            watchdog_history: Vec::new(),
        }
    }
}

impl SystemControl for FakeSystem {
    fn restart(&mut self) {
        self.restarts += 1;
    }

    fn set_watchdog_timeout(&mut self, timeout_ms: u32) {
        self.watchdog_ms = timeout_ms;
        self.watchdog_history.push(timeout_ms);
    }

    fn watchdog_timeout(&self) -> u32 {
        self.watchdog_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedError {
    Refused,
    NotOpen,
}

/// Transport fed from a script of inbound events
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    /// Texts sent while open
    pub sent: Vec<String>,
    /// Every URL a connect was attempted on
    pub connected_urls: Vec<String>,
    pub fail_connects: bool,
    pub fail_sends: bool,
    pub open: bool,
    inbound: VecDeque<TransportEvent>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TransportEvent) {
        self.inbound.push_back(event);
    }

    pub fn push_text(&mut self, text: &str) {
        self.push(TransportEvent::Text(text.to_string()));
    }

    /// Peer closes the connection
    pub fn remote_close(&mut self) {
        self.open = false;
        self.push(TransportEvent::Closed);
    }
}

impl MessageTransport for ScriptedTransport {
    type Error = ScriptedError;

    fn connect(&mut self, url: &str) -> Result<(), Self::Error> {
        if !self.fail_connects {
            self.connected_urls.push(url.to_string());
            self.open = true;
            return Ok(());
        }
        Err(ScriptedError::Refused)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn send_text(&mut self, text: &str) -> Result<(), Self::Error> {
        if !self.open || self.fail_sends {
            return Err(ScriptedError::NotOpen);
        }
        self.sent.push(text.to_string());
        Ok(())
    }

    fn poll(&mut self) -> Option<TransportEvent> {
        self.inbound.pop_front()
    }

    fn close(&mut self) {
        self.open = false;
    }
}

/// One call made on a [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Clear,
    Pixel {
        x: i32,
        y: i32,
        color: Color,
    },
    Print {
        x: i32,
        y: i32,
        color: Color,
        align: TextAlign,
        text: String,
    },
    Clip(ClipRect),
    EndClip,
}

/// Surface that records draw calls instead of drawing
#[derive(Debug)]
pub struct RecordingSurface {
    pub width: i32,
    pub height: i32,
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    /// Text of every print call, in order
    pub fn printed(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Print { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DisplaySurface for RecordingSurface {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.ops.push(DrawOp::Pixel { x, y, color });
    }

    fn print(&mut self, x: i32, y: i32, color: Color, align: TextAlign, text: &str) {
        self.ops.push(DrawOp::Print {
            x,
            y,
            color,
            align,
            text: text.to_string(),
        });
    }

    fn start_clipping(&mut self, clip: ClipRect) {
        self.ops.push(DrawOp::Clip(clip));
    }

    fn end_clipping(&mut self) {
        self.ops.push(DrawOp::EndClip);
    }
}

/// Monospace metrics
#[derive(Debug, Clone, Copy)]
pub struct FixedGlyphs {
    pub char_width: i32,
    pub height: i32,
    pub baseline: i32,
}

impl Default for FixedGlyphs {
    fn default() -> Self {
        Self {
            char_width: 5,
            height: 8,
            baseline: 7,
        }
    }
}

impl GlyphMetrics for FixedGlyphs {
    fn measure(&self, text: &str) -> TextMetrics {
        TextMetrics {
            width: text.chars().count() as i32 * self.char_width,
            x_offset: 0,
            baseline: self.baseline,
            height: self.height,
        }
    }
}
