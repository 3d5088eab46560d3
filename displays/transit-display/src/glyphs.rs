//! Text measurement for monospace fonts

use embedded_graphics::mono_font::MonoFont;

use transit_core::traits::{GlyphMetrics, TextMetrics};

/// Metrics of an `embedded-graphics` monospace font
#[derive(Clone, Copy)]
pub struct MonoGlyphs {
    font: &'static MonoFont<'static>,
}

impl MonoGlyphs {
    pub const fn new(font: &'static MonoFont<'static>) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &'static MonoFont<'static> {
        self.font
    }

    /// Horizontal distance from one glyph to the next
    pub fn advance(&self) -> i32 {
        (self.font.character_size.width + self.font.character_spacing) as i32
    }
}

impl GlyphMetrics for MonoGlyphs {
    fn measure(&self, text: &str) -> TextMetrics {
        TextMetrics {
            width: text.chars().count() as i32 * self.advance(),
            x_offset: 0,
            baseline: self.font.baseline as i32,
            height: self.font.character_size.height as i32,
        }
    }
}
