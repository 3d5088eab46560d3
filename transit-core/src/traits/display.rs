//! Drawing surface and font metrics

/// 24-bit RGB color, `0xRRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xFFFFFF);
    pub const BLACK: Color = Color(0x000000);

    /// Parse a hex RGB string such as `028E51` or `#ff0000`
    pub fn from_hex(text: &str) -> Option<Self> {
        let text = text.trim();
        let digits = text.strip_prefix('#').unwrap_or(text);
        if digits.is_empty() || digits.len() > 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Color)
    }

    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(self) -> u8 {
        self.0 as u8
    }
}

/// Anchor point of printed text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextAlign {
    /// `(x, y)` is the top-left corner of the text box
    TopLeft,
    /// `(x, y)` is the top-right corner of the text box
    TopRight,
    /// `(x, y)` is the center of the text box
    Center,
}

/// Clipping rectangle, right and bottom edges exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClipRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ClipRect {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Measured extent of a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextMetrics {
    /// Advance width in pixels
    pub width: i32,
    /// Horizontal offset of the first lit pixel
    pub x_offset: i32,
    /// Distance from the top to the baseline
    pub baseline: i32,
    /// Line height in pixels
    pub height: i32,
}

/// Pixel display the schedule is drawn on
///
/// Drawing is infallible from the caller's point of view; a surface that
/// can fail drops the error itself.
pub trait DisplaySurface {
    /// Width in pixels
    fn width(&self) -> i32;

    /// Height in pixels
    fn height(&self) -> i32;

    /// Clear the whole surface to black
    fn clear(&mut self);

    /// Set a single pixel (honors the active clip)
    fn draw_pixel(&mut self, x: i32, y: i32, color: Color);

    /// Print text anchored at `(x, y)` (honors the active clip)
    fn print(&mut self, x: i32, y: i32, color: Color, align: TextAlign, text: &str);

    /// Restrict drawing to `clip` until `end_clipping`
    fn start_clipping(&mut self, clip: ClipRect);

    /// Remove the active clip
    fn end_clipping(&mut self);
}

/// Font measurement
pub trait GlyphMetrics {
    fn measure(&self, text: &str) -> TextMetrics;
}
