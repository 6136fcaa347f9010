//! Numeric scale labels drawn beside the graph

use core::fmt::Write;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use super::constants::{LABEL_BUFFER_LENGTH, LABEL_FONT};

/// Renders a signed integer at an anchor position.
///
/// The anchor is the top-left corner of the text.
pub trait ValueLabel {
    /// Size of the box a label of `chars` characters occupies
    fn label_size(&self, chars: u32) -> Size;

    /// Draw `value` and return the area it covered
    fn draw_value<D>(&self, value: i32, anchor: Point, color: Rgb565, display: &mut D) -> Result<Rectangle, D::Error>
    where
        D: DrawTarget<Color = Rgb565>;
}

/// [`ValueLabel`] using an embedded-graphics monospace font
#[derive(Clone, Copy)]
pub struct MonoValueLabel {
    font: &'static MonoFont<'static>,
}

impl Default for MonoValueLabel {
    fn default() -> Self {
        Self::new(LABEL_FONT)
    }
}

impl MonoValueLabel {
    /// Create a label renderer for the given font
    pub const fn new(font: &'static MonoFont<'static>) -> Self {
        Self { font }
    }
}

impl ValueLabel for MonoValueLabel {
    fn label_size(&self, chars: u32) -> Size {
        Size::new(
            self.font.character_size.width * chars,
            self.font.character_size.height,
        )
    }

    fn draw_value<D>(&self, value: i32, anchor: Point, color: Rgb565, display: &mut D) -> Result<Rectangle, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        // Formatting into a fixed buffer keeps the render path allocation-free
        let mut text: String<LABEL_BUFFER_LENGTH> = String::new();
        let _ = write!(text, "{}", value);

        let label = Text::with_baseline(
            text.as_str(),
            anchor,
            MonoTextStyle::new(self.font, color),
            Baseline::Top,
        );
        let area = label.bounding_box();
        label.draw(display)?;
        Ok(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;

    #[test]
    fn test_label_size_follows_font() {
        let label = MonoValueLabel::default();
        assert_eq!(label.label_size(4), Size::new(24, 10));
    }

    #[test]
    fn test_draw_value_covers_text_box() {
        let label = MonoValueLabel::default();
        let mut fb = FrameBuffer::try_new(Size::new(64, 32)).unwrap();

        let area = label
            .draw_value(-500, Point::new(2, 3), Rgb565::WHITE, &mut fb)
            .unwrap();

        assert_eq!(area.top_left, Point::new(2, 3));
        assert_eq!(area.size, Size::new(24, 10));

        let lit = (0..64)
            .flat_map(|x| (0..32).map(move |y| (x, y)))
            .filter(|&(x, y)| fb.pixel(x, y) == Some(Rgb565::WHITE))
            .count();
        assert!(lit > 0, "label must light at least one pixel");
        assert!(
            (0..64).all(|x| fb.pixel(x, 0) != Some(Rgb565::WHITE)),
            "nothing is drawn above the anchor"
        );
    }
}
