//! Two-channel tuning graph
//!
//! Renders the sample history as a line plot on a small palette-indexed
//! canvas, one sample per pixel column:
//!
//! - Temperature error is drawn symmetrically around a zero line at mid
//!   height, scaled to the largest excursion in either direction.
//! - Dispersion grows upward from the bottom row, scaled to its maximum and
//!   kept clear of the label row at the top.
//!
//! The filled canvas is then blitted into the display at a fixed anchor,
//! with the two scale maxima printed beside it.
//!
//! # Examples
//!
//! ```ignore
//! use tuneplot_core::graph::*;
//!
//! let mut renderer = GraphRenderer::new(GraphConfig::default(), Palette::default());
//! renderer.ensure_canvas(store.capacity() as u32)?;
//! renderer.render(&store, &mut framebuffer)?;
//! ```

use thiserror_no_std::Error;

mod canvas;
pub mod constants;
mod labels;
mod normalize;
mod renderer;

pub use canvas::{Canvas, IndexedCanvas, Palette, PaletteCode};
pub use labels::{MonoValueLabel, ValueLabel};
pub use normalize::{Geometry, NormalizedPoint, Normalizer, RangeSummary, round_div};
pub use renderer::{GraphRenderer, rasterize};

pub use crate::config::GraphConfig;

/// Error types for graph operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Pixel storage for the canvas could not be obtained
    #[error("Canvas allocation failed ({width}x{height})")]
    CanvasAllocationFailed {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },

    /// Pixel storage for the display framebuffer could not be obtained
    #[error("Framebuffer allocation failed ({width}x{height})")]
    FrameBufferAllocationFailed {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },

    /// The canvas has fewer columns than the store has samples
    #[error("Canvas too narrow ({width} columns for {capacity} samples)")]
    CanvasTooNarrow {
        /// Canvas width in pixels
        width: u32,
        /// Store capacity in samples
        capacity: usize,
    },

    /// The canvas cannot fit both channel bands and the label row
    #[error("Canvas too short ({height} rows, label row {label_row_height})")]
    CanvasTooShort {
        /// Canvas height in pixels
        height: u32,
        /// Rows reserved for the maximum label
        label_row_height: u32,
    },
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;
