//! [`DisplaySurface`] over an `embedded-graphics` draw target

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};

use transit_core::traits::{ClipRect, Color, DisplaySurface, TextAlign};

/// Draws text and pixels on a draw target, honoring one active clip
///
/// Draw errors from the target are dropped; a frame that fails to draw
/// is simply replaced by the next one.
pub struct EgSurface<D> {
    target: D,
    font: &'static MonoFont<'static>,
    clip: Option<Rectangle>,
}

impl<D> EgSurface<D>
where
    D: DrawTarget,
    D::Color: From<Rgb888>,
{
    pub fn new(target: D, font: &'static MonoFont<'static>) -> Self {
        Self {
            target,
            font,
            clip: None,
        }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }

    /// Area drawing is currently allowed in
    fn area(&self) -> Rectangle {
        let bounds = self.target.bounding_box();
        match self.clip {
            Some(clip) => clip.intersection(&bounds),
            None => bounds,
        }
    }

    fn text_width(&self, text: &str) -> i32 {
        let advance = self.font.character_size.width + self.font.character_spacing;
        text.chars().count() as i32 * advance as i32
    }
}

fn convert(color: Color) -> Rgb888 {
    Rgb888::new(color.r(), color.g(), color.b())
}

fn to_rectangle(clip: ClipRect) -> Rectangle {
    let width = (clip.right - clip.left).max(0) as u32;
    let height = (clip.bottom - clip.top).max(0) as u32;
    Rectangle::new(Point::new(clip.left, clip.top), Size::new(width, height))
}

impl<D> DisplaySurface for EgSurface<D>
where
    D: DrawTarget,
    D::Color: From<Rgb888>,
{
    fn width(&self) -> i32 {
        self.target.bounding_box().size.width as i32
    }

    fn height(&self) -> i32 {
        self.target.bounding_box().size.height as i32
    }

    fn clear(&mut self) {
        let _ = self.target.clear(Rgb888::new(0, 0, 0).into());
    }

    fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        let area = self.area();
        let pixel = Pixel(Point::new(x, y), D::Color::from(convert(color)));
        let _ = pixel.draw(&mut self.target.clipped(&area));
    }

    fn print(&mut self, x: i32, y: i32, color: Color, align: TextAlign, text: &str) {
        let width = self.text_width(text);
        let height = self.font.character_size.height as i32;
        let top_left = match align {
            TextAlign::TopLeft => Point::new(x, y),
            TextAlign::TopRight => Point::new(x - width, y),
            TextAlign::Center => Point::new(x - width / 2, y - height / 2),
        };

        let area = self.area();
        let style = MonoTextStyle::new(self.font, D::Color::from(convert(color)));
        let _ = Text::with_baseline(text, top_left, style, Baseline::Top)
            .draw(&mut self.target.clipped(&area));
    }

    fn start_clipping(&mut self, clip: ClipRect) {
        self.clip = Some(to_rectangle(clip));
    }

    fn end_clipping(&mut self) {
        self.clip = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;
    use embedded_graphics::mono_font::ascii::FONT_6X10;
    use embedded_graphics::pixelcolor::Rgb565;

    fn surface() -> EgSurface<MockDisplay<Rgb888>> {
        let mut display = MockDisplay::new();
        display.set_allow_overdraw(true);
        EgSurface::new(display, &FONT_6X10)
    }

    fn lit(display: &MockDisplay<Rgb888>) -> impl Iterator<Item = Point> + '_ {
        display
            .bounding_box()
            .points()
            .filter(move |p| matches!(display.get_pixel(*p), Some(c) if c != Rgb888::new(0, 0, 0)))
    }

    #[test]
    fn test_pixel_color() {
        let mut s = surface();
        s.draw_pixel(3, 4, Color(0x20FF00));
        assert_eq!(
            s.target().get_pixel(Point::new(3, 4)),
            Some(Rgb888::new(0x20, 0xFF, 0x00))
        );
    }

    #[test]
    fn test_pixel_outside_clip_dropped() {
        let mut s = surface();
        s.start_clipping(ClipRect {
            left: 10,
            top: 0,
            right: 20,
            bottom: 8,
        });
        s.draw_pixel(5, 4, Color::WHITE);
        s.draw_pixel(12, 4, Color::WHITE);
        s.end_clipping();

        assert_eq!(s.target().get_pixel(Point::new(5, 4)), None);
        assert_eq!(s.target().get_pixel(Point::new(12, 4)), Some(Rgb888::new(255, 255, 255)));
    }

    #[test]
    fn test_pixel_off_screen_dropped() {
        let mut s = surface();
        s.draw_pixel(-1, 0, Color::WHITE);
        s.draw_pixel(0, 200, Color::WHITE);
        assert_eq!(lit(s.target()).count(), 0);
    }

    #[test]
    fn test_print_clipped_to_rect() {
        let mut s = surface();
        s.start_clipping(ClipRect {
            left: 0,
            top: 0,
            right: 6,
            bottom: 10,
        });
        s.print(0, 0, Color::WHITE, TextAlign::TopLeft, "MMMM");
        s.end_clipping();

        assert!(lit(s.target()).count() > 0);
        assert!(lit(s.target()).all(|p| p.x < 6 && p.y < 10));
    }

    #[test]
    fn test_print_top_right_ends_at_anchor() {
        let mut s = surface();
        s.print(60, 0, Color::WHITE, TextAlign::TopRight, "8min");
        assert!(lit(s.target()).all(|p| p.x >= 36 && p.x < 60));
        assert!(lit(s.target()).any(|p| p.x >= 54));
    }

    #[test]
    fn test_print_centered() {
        let mut s = surface();
        s.print(32, 16, Color::WHITE, TextAlign::Center, "Load");
        assert!(lit(s.target()).all(|p| (20..44).contains(&p.x) && (11..21).contains(&p.y)));
    }

    #[test]
    fn test_clear_blanks_surface() {
        let mut s = surface();
        s.print(0, 0, Color::WHITE, TextAlign::TopLeft, "Hi");
        s.clear();
        assert_eq!(lit(s.target()).count(), 0);
        assert_eq!((s.width(), s.height()), (64, 64));
    }

    #[test]
    fn test_converts_to_target_color() {
        let mut display: MockDisplay<Rgb565> = MockDisplay::new();
        display.set_allow_overdraw(true);
        let mut s = EgSurface::new(display, &FONT_6X10);
        s.draw_pixel(0, 0, Color(0xFF0000));
        assert_eq!(
            s.target().get_pixel(Point::new(0, 0)),
            Some(Rgb565::from(Rgb888::new(0xFF, 0, 0)))
        );
    }
}
