//! Desktop simulator for the tuneplot auto-tuning graph.
//!
//! Runs a synthetic relay auto-tune through `tuneplot-core` and writes the
//! 320x240 screen to a PNG after every redraw, so the graph can be inspected
//! without hardware.
//!
//! ```text
//! tuneplot-simulator [OUTPUT_DIR] [CONFIG_BLOB]
//! ```
//!
//! `OUTPUT_DIR` defaults to `./frames`. `CONFIG_BLOB` is an optional
//! postcard-encoded `TuningConfig`; the built-in defaults are used without it.
//!
//! Set `RUST_LOG=debug` to see every render pass.

use std::path::PathBuf;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay};
use log::{error, info};

use tuneplot_core::TuningSession;
use tuneplot_core::brightness::{BrightnessRamp, IntensityOutput};
use tuneplot_core::config::TuningConfig;
use tuneplot_core::framebuffer::FrameBuffer;

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

/// Simulated panel width in pixels
const DISPLAY_WIDTH_PX: u32 = 320;

/// Simulated panel height in pixels
const DISPLAY_HEIGHT_PX: u32 = 240;

/// Pixel scale factor for the PNG output
const OUTPUT_SCALE: u32 = 2;

/// Samples kept on screen (one pixel column each)
const HISTORY_CAPACITY: usize = 240;

/// Control cycles between two redraws
const CYCLES_PER_FRAME: usize = 20;

/// Number of frames to write
const FRAME_COUNT: usize = 40;

/// Backlight level the ramp fades toward
const BACKLIGHT_TARGET: u8 = 200;

/// Top edge of the backlight level bar
const BACKLIGHT_BAR_Y_PX: i32 = 220;

/// Height of the backlight level bar
const BACKLIGHT_BAR_HEIGHT_PX: u32 = 6;

// ---------------------------------------------------------------------------
// Mock hardware
// ---------------------------------------------------------------------------

/// Generates the temperature error of an under-damped relay auto-tune.
struct MockTuningLoop {
    cycle: u64,
}

impl MockTuningLoop {
    fn new() -> Self {
        Self { cycle: 0 }
    }

    /// Advance one control cycle and return `(temp_error, dispersion)`.
    fn next_sample(&mut self) -> (i32, u32) {
        self.cycle += 1;
        let t = self.cycle as f64;

        // Oscillation decays as the loop settles, with some sensor ripple
        let envelope = 420.0 * (-t / 400.0).exp() + 40.0;
        let temp = envelope * (t / 9.0).sin() + 6.0 * (t / 3.7).cos();

        // Dispersion follows the oscillation amplitude
        let disp = envelope * 1.6 + 30.0 * (t / 23.0).sin().powi(2);

        (temp.round() as i32, disp.max(0.0) as u32)
    }
}

/// Backlight whose level is only tracked in memory
struct SimBacklight {
    level: u8,
}

impl IntensityOutput for SimBacklight {
    fn level(&self) -> u8 {
        self.level
    }

    fn set_level(&mut self, level: u8) {
        self.level = level;
    }
}

/// Draw the current backlight level as a bar under the graph
fn draw_backlight_bar<D>(display: &mut D, level: u8) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let full_width = DISPLAY_WIDTH_PX - 16;
    let top_left = Point::new(8, BACKLIGHT_BAR_Y_PX);

    Rectangle::new(top_left, Size::new(full_width, BACKLIGHT_BAR_HEIGHT_PX))
        .into_styled(PrimitiveStyle::with_fill(Rgb565::new(4, 8, 4)))
        .draw(display)?;

    let width = full_width * level as u32 / u8::MAX as u32;
    Rectangle::new(top_left, Size::new(width, BACKLIGHT_BAR_HEIGHT_PX))
        .into_styled(PrimitiveStyle::with_fill(Rgb565::new(31, 63, 31)))
        .draw(display)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("frames"));
    let config_path = args.next().map(PathBuf::from);
    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        error!("Cannot create {}: {}", out_dir.display(), e);
        return;
    }

    info!("Starting tuneplot simulator");
    info!(
        "Display: {}x{}, history {} samples, {} frames -> {}",
        DISPLAY_WIDTH_PX,
        DISPLAY_HEIGHT_PX,
        HISTORY_CAPACITY,
        FRAME_COUNT,
        out_dir.display()
    );

    let config = match config_path {
        Some(path) => {
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!("Cannot read {}: {}", path.display(), e);
                    return;
                }
            };
            match TuningConfig::from_bytes(&bytes) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    error!("Rejected config {}: {}", path.display(), e);
                    return;
                }
            }
        }
        None => TuningConfig::default(),
    };
    let mut session = TuningSession::new(&config);
    if let Err(e) = session.allocate(HISTORY_CAPACITY) {
        error!("Session allocation failed: {}", e);
        return;
    }

    let mut framebuffer = match FrameBuffer::try_new(Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX)) {
        Ok(fb) => fb,
        Err(e) => {
            error!("Framebuffer allocation failed: {}", e);
            return;
        }
    };
    let mut display = SimulatorDisplay::<Rgb565>::new(Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX));
    let output_settings = OutputSettingsBuilder::new().scale(OUTPUT_SCALE).build();

    let ramp = BrightnessRamp::new(BACKLIGHT_TARGET, config.ramp);
    let mut backlight = SimBacklight { level: 0 };
    let mut tuning = MockTuningLoop::new();

    for frame in 0..FRAME_COUNT {
        // --- Control cycles ---------------------------------------------
        for _ in 0..CYCLES_PER_FRAME {
            let (temp, disp) = tuning.next_sample();
            session.put(temp, disp);
        }

        // --- Backlight tick ---------------------------------------------
        if ramp.tick(&mut backlight) {
            if let Err(never) = draw_backlight_bar(&mut framebuffer, backlight.level) {
                match never {}
            }
        }

        // --- Render -----------------------------------------------------
        let summary = match session.render(&mut framebuffer) {
            Ok(summary) => summary,
            Err(never) => match never {},
        };
        if let Some(summary) = summary {
            info!(
                "Frame {:03}: {} samples, temp scale {}, disp scale {}, backlight {}",
                frame, summary.count, summary.max_temp_magnitude, summary.max_disp, backlight.level
            );
        }
        if let Err(never) = framebuffer.flush(&mut display) {
            match never {}
        }

        let path = out_dir.join(format!("frame_{:03}.png", frame));
        if let Err(e) = display.to_rgb_output_image(&output_settings).save_png(&path) {
            error!("Cannot write {}: {}", path.display(), e);
            return;
        }
    }

    session.release();
    info!("Simulator exiting");
}
