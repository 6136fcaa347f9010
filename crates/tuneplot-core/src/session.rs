//! Tuning session: the owner of the sample history and graph canvas
//!
//! A session is created when the auto-tune procedure starts. The tuning loop
//! feeds it one sample per control cycle through [`TuningSession::put`] and
//! the display tick calls [`TuningSession::render`]. Both storage blocks are
//! freed again by [`TuningSession::release`] when the procedure ends.
//!
//! `put` and `render` must not interleave: a render scanning the store while
//! the cursor wraps would see a torn ordering. A `TuningSession` is therefore
//! either confined to one task, or wrapped in a [`SharedSession`] whose
//! critical-section mutex serialises every call.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::{debug, info, warn};

use crate::config::TuningConfig;
use crate::error::{TuneError, TuneResult};
use crate::graph::{GraphError, GraphRenderer, Palette, RangeSummary};
use crate::telemetry::SampleStore;

/// Exclusive owner of one tuning run's telemetry and graph
pub struct TuningSession {
    store: SampleStore,
    renderer: GraphRenderer,
}

impl TuningSession {
    /// Create a session with no storage allocated yet
    pub fn new(config: &TuningConfig) -> Self {
        Self {
            store: SampleStore::new(),
            renderer: GraphRenderer::new(config.graph, Palette::from_config(&config.palette)),
        }
    }

    /// Create a session from a stored config blob.
    ///
    /// The blob is decoded and validated before anything is built.
    pub fn from_config_bytes(bytes: &[u8]) -> TuneResult<Self> {
        let config = TuningConfig::from_bytes(bytes)?;
        Ok(Self::new(&config))
    }

    /// Reserve room for `capacity` samples and a matching canvas.
    ///
    /// Follows the store's grow-only policy: a smaller request keeps the
    /// current history. Errors are reported once; after a failure both
    /// `put` and `render` are harmless no-ops until a later `allocate`
    /// succeeds.
    pub fn allocate(&mut self, capacity: usize) -> TuneResult<()> {
        if let Err(err) = self.store.allocate(capacity) {
            self.renderer.release_canvas();
            return Err(err.into());
        }

        let width = self.store.capacity();
        let canvas_width = u32::try_from(width).map_err(|_| GraphError::CanvasAllocationFailed {
            width: u32::MAX,
            height: self.renderer.config().height,
        });
        let result = canvas_width.and_then(|w| self.renderer.ensure_canvas(w));
        if let Err(err) = result {
            warn!("Graph canvas unavailable: {}", err);
            return Err(TuneError::Graph(err));
        }

        info!("Tuning session ready for {} samples", width);
        Ok(())
    }

    /// Record one control-cycle sample
    pub fn put(&mut self, temp: i32, disp: u32) {
        self.store.put(temp, disp);
    }

    /// Number of samples currently held
    pub fn count(&self) -> usize {
        self.store.count()
    }

    /// Read access to the sample history
    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Read access to the renderer
    pub fn renderer(&self) -> &GraphRenderer {
        &self.renderer
    }

    /// Redraw the graph into `display`
    pub fn render<D>(&mut self, display: &mut D) -> Result<Option<RangeSummary>, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let summary = self.renderer.render(&self.store, display)?;
        if let Some(summary) = &summary {
            debug!(
                "Rendered {} samples (temp {}..{}, disp max {})",
                summary.count, summary.min_temp, summary.max_temp, summary.max_disp
            );
        }
        Ok(summary)
    }

    /// Free the sample history and canvas. Safe to call more than once.
    pub fn release(&mut self) {
        self.store.release();
        self.renderer.release_canvas();
        debug!("Tuning session released");
    }
}

/// A [`TuningSession`] shared between the control task and the display task.
///
/// Every call runs inside one critical section, so a `put` can never land in
/// the middle of a render pass.
pub struct SharedSession {
    inner: Mutex<CriticalSectionRawMutex, RefCell<TuningSession>>,
}

impl SharedSession {
    /// Wrap a session for shared use
    pub fn new(session: TuningSession) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(session)),
        }
    }

    /// Run `f` with exclusive access to the session.
    ///
    /// `f` must not call back into the same `SharedSession`.
    pub fn lock<R>(&self, f: impl FnOnce(&mut TuningSession) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// See [`TuningSession::allocate`]
    pub fn allocate(&self, capacity: usize) -> TuneResult<()> {
        self.lock(|session| session.allocate(capacity))
    }

    /// See [`TuningSession::put`]
    pub fn put(&self, temp: i32, disp: u32) {
        self.lock(|session| session.put(temp, disp));
    }

    /// See [`TuningSession::count`]
    pub fn count(&self) -> usize {
        self.lock(|session| session.count())
    }

    /// See [`TuningSession::render`]
    pub fn render<D>(&self, display: &mut D) -> Result<Option<RangeSummary>, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.lock(|session| session.render(display))
    }

    /// See [`TuningSession::release`]
    pub fn release(&self) {
        self.lock(|session| session.release());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::framebuffer::FrameBuffer;
    use crate::graph::Canvas;
    use crate::telemetry::StoreError;

    fn framebuffer() -> FrameBuffer {
        FrameBuffer::try_new(Size::new(320, 240)).unwrap()
    }

    #[test]
    fn test_session_lifecycle() {
        let mut session = TuningSession::new(&TuningConfig::default());
        let mut fb = framebuffer();

        // Nothing allocated yet: everything degrades to a no-op
        session.put(10, 10);
        assert_eq!(session.count(), 0);
        assert_eq!(session.render(&mut fb), Ok(None));

        session.allocate(200).unwrap();
        assert_eq!(session.renderer().canvas().map(|c| c.width()), Some(200));
        for i in 0..250 {
            session.put(i % 40 - 20, (i % 7) as u32);
        }
        assert_eq!(session.count(), 200);

        let summary = session.render(&mut fb).unwrap().unwrap();
        assert_eq!(summary.count, 200);
        assert!(fb.dirty_area().is_some());

        session.release();
        session.release();
        assert_eq!(session.count(), 0);
        assert!(session.renderer().canvas().is_none());
    }

    #[test]
    fn test_smaller_allocate_keeps_history_and_canvas() {
        let mut session = TuningSession::new(&TuningConfig::default());
        session.allocate(64).unwrap();
        session.put(5, 5);
        session.put(6, 6);

        session.allocate(32).unwrap();

        assert_eq!(session.count(), 2);
        assert_eq!(session.store().capacity(), 64);
        assert_eq!(session.renderer().canvas().map(|c| c.width()), Some(64));
    }

    #[test]
    fn test_growing_allocate_resizes_canvas() {
        let mut session = TuningSession::new(&TuningConfig::default());
        session.allocate(64).unwrap();
        session.put(5, 5);

        session.allocate(128).unwrap();

        assert_eq!(session.count(), 0);
        assert_eq!(session.renderer().canvas().map(|c| c.width()), Some(128));
    }

    #[test]
    fn test_failed_allocate_is_reported_and_absorbed() {
        let mut session = TuningSession::new(&TuningConfig::default());
        session.allocate(64).unwrap();

        let err = session.allocate(usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            TuneError::Store(StoreError::AllocationFailed { .. })
        ));
        assert!(session.renderer().canvas().is_none());

        let mut fb = framebuffer();
        session.put(1, 1);
        assert_eq!(session.render(&mut fb), Ok(None));
        assert!(fb.dirty_area().is_none());
    }

    #[test]
    fn test_canvas_failure_keeps_samples_but_skips_render() {
        let mut config = TuningConfig::default();
        config.graph.label_row_height = config.graph.height;
        let mut session = TuningSession::new(&config);

        let err = session.allocate(64).unwrap_err();
        assert!(matches!(
            err,
            TuneError::Graph(GraphError::CanvasTooShort { .. })
        ));
        assert_eq!(session.store().capacity(), 64);
        assert!(session.renderer().canvas().is_none());

        session.put(12, 3);
        session.put(-7, 9);
        assert_eq!(session.count(), 2);

        let mut fb = framebuffer();
        assert_eq!(session.render(&mut fb), Ok(None));
        assert_eq!(session.render(&mut fb), Ok(None));
        assert!(fb.dirty_area().is_none());
    }

    #[test]
    fn test_session_from_stored_config() {
        let mut config = TuningConfig::default();
        config.graph.height = 96;
        let bytes = config.to_vec().unwrap();

        let mut session = TuningSession::from_config_bytes(&bytes).unwrap();
        assert_eq!(session.renderer().config().height, 96);
        session.allocate(32).unwrap();
        assert_eq!(session.renderer().canvas().map(|c| c.height()), Some(96));

        let err = TuningSession::from_config_bytes(&bytes[..2]).err();
        assert!(matches!(err, Some(TuneError::Config(ConfigError::Decode(_)))));

        config.graph.label_row_height = config.graph.height;
        let bytes = config.to_vec().unwrap();
        let err = TuningSession::from_config_bytes(&bytes).err();
        assert!(matches!(err, Some(TuneError::Config(ConfigError::Invalid { .. }))));
    }

    #[test]
    fn test_shared_session_serialises_access() {
        let shared = SharedSession::new(TuningSession::new(&TuningConfig::default()));
        shared.allocate(16).unwrap();
        for i in 0..20 {
            shared.put(i, 0);
        }
        assert_eq!(shared.count(), 16);

        let oldest = shared.lock(|session| session.store().temp(0));
        assert_eq!(oldest, 4);

        let mut fb = framebuffer();
        assert!(shared.render(&mut fb).unwrap().is_some());

        shared.release();
        assert_eq!(shared.count(), 0);
    }
}
