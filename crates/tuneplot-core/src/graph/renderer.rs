//! Graph renderer
//!
//! A render pass is two scans over the store:
//!
//! 1. Range discovery: temperature extents and dispersion maximum.
//! 2. Normalize each sample to a pair of rows and connect it to the previous
//!    sample with one vertical run per channel in the previous sample's
//!    column. Each sample therefore advances the trace by exactly one pixel.
//!
//! The temperature zero axis is drawn last, over both traces.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_layout::align::{Align, horizontal, vertical};
use log::{debug, warn};

use crate::config::GraphConfig;
use crate::telemetry::SampleStore;

use super::canvas::{Canvas, IndexedCanvas, Palette, PaletteCode};
use super::constants::MAX_LABEL_CHARS;
use super::labels::{MonoValueLabel, ValueLabel};
use super::normalize::{Geometry, NormalizedPoint, Normalizer, RangeSummary};
use super::{GraphError, GraphResult};

/// Paint the store's history onto `canvas`.
///
/// The canvas is cleared first, so the result depends only on the store
/// contents. Returns `Ok(None)` when the store is empty.
pub fn rasterize<C: Canvas>(
    store: &SampleStore,
    canvas: &mut C,
    label_row_height: u32,
) -> GraphResult<Option<RangeSummary>> {
    let width = canvas.width();
    if (width as usize) < store.capacity() {
        return Err(GraphError::CanvasTooNarrow {
            width,
            capacity: store.capacity(),
        });
    }
    let geometry = Geometry::new(canvas.height(), label_row_height)?;

    canvas.clear();

    // One snapshot for both passes keeps the ordering stable
    let snapshot = store.snapshot();
    let Some(summary) = RangeSummary::scan_at(store, &snapshot) else {
        return Ok(None);
    };
    let normalizer = Normalizer::new(geometry, &summary);

    let mut previous: Option<NormalizedPoint> = None;
    for index in 0..snapshot.count() {
        let Some(sample) = store.get_at(&snapshot, index) else {
            break;
        };
        let point = normalizer.point(sample);

        if let Some(prev) = previous {
            let column = (index - 1) as u32;
            canvas.fill_vertical_run(column, prev.temp_row, point.temp_row, PaletteCode::ChannelA);
            canvas.fill_vertical_run(column, prev.disp_row, point.disp_row, PaletteCode::ChannelB);
        }
        previous = Some(point);
    }

    canvas.fill_horizontal_run(
        geometry.temp_zero,
        0,
        width.saturating_sub(1),
        PaletteCode::Foreground,
    );

    Ok(Some(summary))
}

/// Owns the graph canvas and draws it, with its scale labels, to a display
pub struct GraphRenderer<L: ValueLabel = MonoValueLabel> {
    config: GraphConfig,
    palette: Palette,
    label: L,
    canvas: Option<IndexedCanvas>,
}

impl GraphRenderer<MonoValueLabel> {
    /// Create a renderer without a canvas, labelling in [`LABEL_FONT`]
    ///
    /// [`LABEL_FONT`]: super::constants::LABEL_FONT
    pub fn new(config: GraphConfig, palette: Palette) -> Self {
        Self {
            config,
            palette,
            label: MonoValueLabel::default(),
            canvas: None,
        }
    }
}

impl<L: ValueLabel> GraphRenderer<L> {
    /// Draw the scale labels with `label` instead
    pub fn with_label<M: ValueLabel>(self, label: M) -> GraphRenderer<M> {
        GraphRenderer {
            config: self.config,
            palette: self.palette,
            label,
            canvas: self.canvas,
        }
    }

    /// Current canvas, if one has been allocated
    pub fn canvas(&self) -> Option<&IndexedCanvas> {
        self.canvas.as_ref()
    }

    /// Layout configuration
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Size the canvas to `width` columns (one per stored sample).
    ///
    /// An existing canvas of the right width is kept. Otherwise the old one
    /// is dropped and a new one allocated; on failure the renderer is left
    /// without a canvas and later renders are no-ops. A width of 0 just
    /// drops the canvas.
    pub fn ensure_canvas(&mut self, width: u32) -> GraphResult<()> {
        if self.canvas.as_ref().is_some_and(|c| c.width() == width) {
            return Ok(());
        }
        self.canvas = None;
        if width == 0 {
            return Ok(());
        }

        Geometry::new(self.config.height, self.config.label_row_height)?;
        let canvas = IndexedCanvas::try_new(width, self.config.height)?;
        debug!("Graph canvas allocated ({}x{})", width, self.config.height);
        self.canvas = Some(canvas);
        Ok(())
    }

    /// Drop the canvas storage
    pub fn release_canvas(&mut self) {
        self.canvas = None;
    }

    /// Screen area the canvas occupies
    pub fn canvas_area(&self) -> Option<Rectangle> {
        self.canvas
            .as_ref()
            .map(|c| Rectangle::new(self.config.anchor(), c.size()))
    }

    /// Run a full render pass and draw the result to `display`.
    ///
    /// Returns the scale extents that were used, or `None` when nothing was
    /// drawn (no canvas, empty store, or a canvas that does not fit the
    /// store).
    pub fn render<D>(&mut self, store: &SampleStore, display: &mut D) -> Result<Option<RangeSummary>, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(canvas) = self.canvas.as_mut() else {
            debug!("No graph canvas, skipping render");
            return Ok(None);
        };

        let summary = match rasterize(store, canvas, self.config.label_row_height) {
            Ok(Some(summary)) => summary,
            Ok(None) => return Ok(None),
            Err(err) => {
                warn!("Skipping graph render: {}", err);
                return Ok(None);
            }
        };

        let area = Rectangle::new(self.config.anchor(), canvas.size());
        canvas.draw_into(display, area.top_left, &self.palette)?;
        self.draw_labels(&summary, area, display)?;

        Ok(Some(summary))
    }

    /// Print the scale maxima to the right of the canvas: temperature at the
    /// top, dispersion at the bottom.
    fn draw_labels<D>(&self, summary: &RangeSummary, area: Rectangle, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let gap = Point::new(self.config.label_gap as i32, 0);
        let label_box = Rectangle::new(Point::zero(), self.label.label_size(MAX_LABEL_CHARS));

        let temp_box = label_box.align_to(&area, horizontal::LeftToRight, vertical::Top);
        let disp_box = label_box.align_to(&area, horizontal::LeftToRight, vertical::Bottom);

        self.label.draw_value(
            summary.max_temp_magnitude as i32,
            temp_box.top_left + gap,
            self.palette.color(PaletteCode::ChannelA),
            display,
        )?;
        self.label.draw_value(
            summary.max_disp as i32,
            disp_box.top_left + gap,
            self.palette.color(PaletteCode::ChannelB),
            display,
        )?;
        Ok(())
    }
}
