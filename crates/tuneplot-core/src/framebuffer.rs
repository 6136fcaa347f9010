//! RAM framebuffer with per-pixel change detection.
//!
//! The tuning screen is composed in this buffer (graph canvas, scale labels)
//! instead of on the display controller. After a refresh tick only the
//! rectangle containing changed pixels is pushed to the hardware display in a
//! single transfer.

extern crate alloc;

use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

use crate::graph::{GraphError, GraphResult};

/// Bounding box of pixels that have changed since the last flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DirtyRect {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl DirtyRect {
    fn from_point(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    fn to_rectangle(self) -> Rectangle {
        Rectangle::new(
            Point::new(self.min_x as i32, self.min_y as i32),
            Size::new(self.width() as u32, self.height() as u32),
        )
    }
}

/// Heap-backed `DrawTarget<Color = Rgb565>` sized once at construction.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb565>,
    dirty: Option<DirtyRect>,
}

impl FrameBuffer {
    /// Allocate a black framebuffer of the given size.
    ///
    /// Fails instead of aborting when the pixel storage cannot be obtained.
    pub fn try_new(size: Size) -> GraphResult<Self> {
        let failed = GraphError::FrameBufferAllocationFailed {
            width: size.width,
            height: size.height,
        };
        let len = (size.width as usize)
            .checked_mul(size.height as usize)
            .ok_or(failed)?;

        let mut pixels = Vec::new();
        if pixels.try_reserve_exact(len).is_err() {
            return Err(failed);
        }
        pixels.resize(len, Rgb565::BLACK);

        Ok(Self {
            width: size.width as usize,
            height: size.height as usize,
            pixels,
            dirty: None,
        })
    }

    /// Colour of a pixel, `None` outside the buffer
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb565> {
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Region changed since the last flush, if any
    pub fn dirty_area(&self) -> Option<Rectangle> {
        self.dirty.map(DirtyRect::to_rectangle)
    }

    /// Write a single pixel, expanding the dirty rect only if the color changed.
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb565) {
        let idx = y * self.width + x;
        if self.pixels[idx] != color {
            self.pixels[idx] = color;
            match &mut self.dirty {
                Some(rect) => rect.expand(x, y),
                None => self.dirty = Some(DirtyRect::from_point(x, y)),
            }
        }
    }

    /// Push the dirty region to a hardware display, then reset the dirty state.
    ///
    /// If nothing changed, this is a no-op.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(rect) = self.dirty.take() else {
            return Ok(());
        };

        debug!(
            "Flushing {}x{} dirty region at ({}, {})",
            rect.width(),
            rect.height(),
            rect.min_x,
            rect.min_y
        );

        // Borrow the pixel slice so the closure captures a shared reference
        let pixels = &self.pixels;
        let stride = self.width;
        let width = rect.width();
        let pixel_iter = (rect.min_y..=rect.max_y).flat_map(move |y| {
            let row_start = y * stride + rect.min_x;
            pixels[row_start..row_start + width].iter().copied()
        });

        display.fill_contiguous(&rect.to_rectangle(), pixel_iter)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= 0
                && coord.y >= 0
                && (coord.x as usize) < self.width
                && (coord.y as usize) < self.height
            {
                self.set_pixel(coord.x as usize, coord.y as usize, color);
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // Colours are consumed row-major over the whole area, including the
        // parts that fall outside the buffer.
        let mut colors = colors.into_iter();
        for row in 0..area.size.height as i32 {
            let y = area.top_left.y + row;
            for col in 0..area.size.width as i32 {
                let x = area.top_left.x + col;
                let Some(color) = colors.next() else {
                    return Ok(());
                };
                if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
                    self.set_pixel(x as usize, y as usize, color);
                }
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let visible = area.intersection(&self.bounding_box());
        if visible.size.width == 0 || visible.size.height == 0 {
            return Ok(());
        }

        let x_start = visible.top_left.x as usize;
        let y_start = visible.top_left.y as usize;
        let x_end = x_start + visible.size.width as usize;
        let y_end = y_start + visible.size.height as usize;

        for y in y_start..y_end {
            for x in x_start..x_end {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for y in 0..self.height {
            for x in 0..self.width {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    #[test]
    fn test_new_buffer_is_clean() {
        let fb = FrameBuffer::try_new(Size::new(16, 8)).unwrap();
        assert!(fb.dirty_area().is_none());
        assert_eq!(fb.pixel(15, 7), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(16, 0), None);
    }

    #[test]
    fn test_dirty_area_tracks_changes_only() {
        let mut fb = FrameBuffer::try_new(Size::new(16, 8)).unwrap();
        fb.fill_solid(&Rectangle::new(Point::new(2, 1), Size::new(3, 2)), Rgb565::BLACK)
            .unwrap();
        assert!(fb.dirty_area().is_none(), "same colour leaves the buffer clean");

        Pixel(Point::new(3, 2), Rgb565::RED).draw(&mut fb).unwrap();
        Pixel(Point::new(6, 5), Rgb565::RED).draw(&mut fb).unwrap();
        assert_eq!(
            fb.dirty_area(),
            Some(Rectangle::new(Point::new(3, 2), Size::new(4, 4)))
        );
    }

    #[test]
    fn test_fill_contiguous_clips_but_keeps_row_order() {
        let mut fb = FrameBuffer::try_new(Size::new(4, 4)).unwrap();
        let colors = [Rgb565::RED, Rgb565::GREEN, Rgb565::BLUE, Rgb565::WHITE];
        fb.fill_contiguous(&Rectangle::new(Point::new(-1, 0), Size::new(2, 2)), colors)
            .unwrap();

        assert_eq!(fb.pixel(0, 0), Some(Rgb565::GREEN));
        assert_eq!(fb.pixel(0, 1), Some(Rgb565::WHITE));
    }

    #[test]
    fn test_flush_sends_dirty_region_once() {
        let mut fb = FrameBuffer::try_new(Size::new(8, 8)).unwrap();
        Pixel(Point::new(1, 1), Rgb565::RED).draw(&mut fb).unwrap();

        let mut display: MockDisplay<Rgb565> = MockDisplay::new();
        fb.flush(&mut display).unwrap();
        assert_eq!(display.get_pixel(Point::new(1, 1)), Some(Rgb565::RED));
        assert!(fb.dirty_area().is_none());

        // Nothing changed, so the second flush must not touch the display
        let mut untouched: MockDisplay<Rgb565> = MockDisplay::new();
        fb.flush(&mut untouched).unwrap();
        assert_eq!(untouched.get_pixel(Point::new(1, 1)), None);
    }

    #[test]
    fn test_oversized_buffer_reports_failure() {
        assert!(FrameBuffer::try_new(Size::new(u32::MAX, u32::MAX)).is_err());
    }
}
