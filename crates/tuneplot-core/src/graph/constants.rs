//! Constants for graph rendering
//!
//! All magic numbers are defined here with descriptive names and units.

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::ascii::FONT_6X10;

/// Default canvas height in pixels
pub const DEFAULT_GRAPH_HEIGHT_PX: u32 = 128;

/// Default horizontal anchor of the canvas on the display in pixels
pub const DEFAULT_GRAPH_ANCHOR_X_PX: i32 = 8;

/// Default vertical anchor of the canvas on the display in pixels
pub const DEFAULT_GRAPH_ANCHOR_Y_PX: i32 = 56;

/// Font used for the scale labels
pub const LABEL_FONT: &MonoFont<'static> = &FONT_6X10;

/// Rows reserved above the dispersion band for the maximum label
///
/// Matches the glyph height of [`LABEL_FONT`].
pub const DEFAULT_LABEL_ROW_HEIGHT_PX: u32 = 10;

/// Gap between the canvas right edge and the labels in pixels
pub const DEFAULT_LABEL_GAP_PX: u32 = 4;

/// Widest label text in characters ("-500")
pub const MAX_LABEL_CHARS: u32 = 4;

/// Capacity of the formatted label buffer (fits any `i32`)
pub const LABEL_BUFFER_LENGTH: usize = 12;

/// Smallest canvas height that still has a top border, a zero line and a
/// bottom row
pub const MIN_GRAPH_HEIGHT_PX: u32 = 3;
