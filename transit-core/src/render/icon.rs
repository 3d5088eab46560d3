//! Realtime indicator icon

use crate::scroll::segment_lit;
use crate::traits::{Color, DisplaySurface};

pub const ICON_SIZE: i32 = 6;

pub const ICON_LIT: Color = Color(0x20FF00);
pub const ICON_UNLIT: Color = Color(0x00A700);

/// Signal arcs; 0 is background, 1..=3 are segments from inner to outer
pub const REALTIME_ICON: [[u8; 6]; 6] = [
    [0, 0, 0, 3, 3, 3],
    [0, 0, 3, 0, 0, 0],
    [0, 3, 0, 0, 2, 2],
    [3, 0, 0, 2, 0, 0],
    [3, 0, 2, 0, 0, 1],
    [3, 0, 2, 0, 1, 1],
];

/// Draw the icon with its bottom-right pixel at `(right, bottom)`
pub fn draw_realtime_icon(surface: &mut dyn DisplaySurface, right: i32, bottom: i32, frame: u8) {
    for (i, row) in REALTIME_ICON.iter().enumerate() {
        for (j, &segment) in row.iter().enumerate() {
            if segment == 0 {
                continue;
            }
            let color = if segment_lit(frame, segment) {
                ICON_LIT
            } else {
                ICON_UNLIT
            };
            let x = right - (ICON_SIZE - 1 - j as i32);
            let y = bottom - (ICON_SIZE - 1 - i as i32);
            surface.draw_pixel(x, y, color);
        }
    }
}
