//! Realtime indicator animation
//!
//! Frame 0 is held for the idle period, then frames 1..=5 run at a fixed
//! rate. The icon has three arc segments; each is lit for three
//! consecutive frames, staggered by one, so the signal appears to ripple
//! outwards.

pub const BLINK_FRAMES: u8 = 6;
pub const BLINK_IDLE_MS: u64 = 3000;
pub const BLINK_FRAME_MS: u64 = 200;
pub const BLINK_CYCLE_MS: u64 = BLINK_IDLE_MS + (BLINK_FRAMES as u64 - 1) * BLINK_FRAME_MS;

/// Animation frame at `uptime_ms`
pub fn blink_frame(uptime_ms: u64) -> u8 {
    let t = uptime_ms % BLINK_CYCLE_MS;
    if t < BLINK_IDLE_MS {
        0
    } else {
        1 + ((t - BLINK_IDLE_MS) / BLINK_FRAME_MS) as u8
    }
}

/// Whether icon segment 1..=3 is lit in `frame`
pub fn segment_lit(frame: u8, segment: u8) -> bool {
    match segment {
        1 => (1..=3).contains(&frame),
        2 => (2..=4).contains(&frame),
        3 => (3..=5).contains(&frame),
        _ => false,
    }
}
