//! Per-cycle telemetry capture
//!
//! The tuning loop produces one [`Sample`] per control cycle. Samples are kept
//! in a [`SampleStore`], a fixed-capacity ring that exposes its contents in
//! oldest-to-newest order for the graph renderer.

use thiserror_no_std::Error;

pub mod sample;
pub mod store;

pub use sample::{DISP_MAX, DISP_MIN, Sample, TEMP_MAX, TEMP_MIN};
pub use store::{SampleStore, Snapshot};

/// Error types for sample store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backing storage for the requested number of samples could not be obtained
    #[error("Sample storage allocation failed ({requested} samples)")]
    AllocationFailed {
        /// Number of samples that was requested
        requested: usize,
    },
}

/// Result type for sample store operations
pub type StoreResult<T> = Result<T, StoreError>;
