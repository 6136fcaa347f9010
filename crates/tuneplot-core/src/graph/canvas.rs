//! Palette-indexed pixel canvas
//!
//! The renderer paints into a [`Canvas`] using a small set of palette codes
//! instead of full colours. [`IndexedCanvas`] is the in-RAM implementation;
//! its pixels are only turned into `Rgb565` when blitted to the display.

extern crate alloc;

use alloc::vec::Vec;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::warn;

use crate::config::PaletteConfig;

use super::{GraphError, GraphResult};

/// Number of entries in the canvas palette
const PALETTE_SIZE: usize = 4;

/// Indexed colour understood by the canvas
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaletteCode {
    /// Empty canvas
    #[default]
    Background = 0,
    /// Axes and borders
    Foreground = 1,
    /// First channel (temperature error)
    ChannelA = 2,
    /// Second channel (dispersion)
    ChannelB = 3,
}

/// Mapping from palette codes to display colours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    colors: [Rgb565; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_config(&PaletteConfig::default())
    }
}

impl Palette {
    /// Build a palette from raw RGB565 config values
    pub fn from_config(config: &PaletteConfig) -> Self {
        let color = |raw: u16| Rgb565::from(RawU16::new(raw));
        Self {
            colors: [
                color(config.background),
                color(config.foreground),
                color(config.channel_a),
                color(config.channel_b),
            ],
        }
    }

    /// Display colour for a palette code
    pub fn color(&self, code: PaletteCode) -> Rgb565 {
        self.colors[code as usize]
    }
}

/// Pixel surface the graph renderer draws on.
///
/// Runs are inclusive at both ends and given in either order. Anything
/// outside the surface is clipped.
pub trait Canvas {
    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Fill rows `row_start..=row_end` of one column
    fn fill_vertical_run(&mut self, column: u32, row_start: u32, row_end: u32, code: PaletteCode);

    /// Fill columns `col_start..=col_end` of one row
    fn fill_horizontal_run(&mut self, row: u32, col_start: u32, col_end: u32, code: PaletteCode);

    /// Reset every pixel to [`PaletteCode::Background`]
    fn clear(&mut self);
}

/// Heap-backed canvas storing one palette code per pixel, row-major.
///
/// Dimensions are fixed at creation; the pixel storage is allocated once and
/// never grows.
#[derive(Debug)]
pub struct IndexedCanvas {
    width: u32,
    height: u32,
    pixels: Vec<PaletteCode>,
}

impl IndexedCanvas {
    /// Allocate a cleared canvas, reporting failure instead of aborting
    pub fn try_new(width: u32, height: u32) -> GraphResult<Self> {
        let failed = GraphError::CanvasAllocationFailed { width, height };
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(failed)?;

        let mut pixels = Vec::new();
        if pixels.try_reserve_exact(len).is_err() {
            warn!("Canvas allocation of {}x{} failed", width, height);
            return Err(failed);
        }
        pixels.resize(len, PaletteCode::Background);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Canvas size in pixels
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Palette code at a pixel, `None` outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<PaletteCode> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.index(x, y)).copied()
    }

    /// Raw row-major pixel codes
    pub fn pixels(&self) -> &[PaletteCode] {
        &self.pixels
    }

    /// Blit the canvas to a display with its top-left corner at `top_left`
    pub fn draw_into<D>(&self, display: &mut D, top_left: Point, palette: &Palette) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let area = Rectangle::new(top_left, self.size());
        display.fill_contiguous(&area, self.pixels.iter().map(|&code| palette.color(code)))
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl Canvas for IndexedCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_vertical_run(&mut self, column: u32, row_start: u32, row_end: u32, code: PaletteCode) {
        if column >= self.width || self.height == 0 {
            return;
        }
        let top = row_start.min(row_end);
        let bottom = row_start.max(row_end).min(self.height - 1);

        for row in top..=bottom {
            let idx = self.index(column, row);
            self.pixels[idx] = code;
        }
    }

    fn fill_horizontal_run(&mut self, row: u32, col_start: u32, col_end: u32, code: PaletteCode) {
        if row >= self.height || self.width == 0 {
            return;
        }
        let left = col_start.min(col_end);
        let right = col_start.max(col_end).min(self.width - 1);

        for col in left..=right {
            let idx = self.index(col, row);
            self.pixels[idx] = code;
        }
    }

    fn clear(&mut self) {
        self.pixels.fill(PaletteCode::Background);
    }
}
