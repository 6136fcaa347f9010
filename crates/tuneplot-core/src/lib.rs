//! Hardware-independent core library for tuneplot
//!
//! This crate contains the platform-agnostic half of the auto-tuning display:
//! the per-cycle telemetry history, the two-channel graph renderer, the
//! display framebuffer, the backlight brightness ramp and the session object
//! that ties them together.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod brightness;
pub mod config;
pub mod error;
pub mod framebuffer;
pub mod graph;
pub mod session;
pub mod telemetry;

pub use error::{TuneError, TuneResult};
pub use session::{SharedSession, TuningSession};
