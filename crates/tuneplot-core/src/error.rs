//! Session-level error type
//!
//! Each subsystem owns its own error enum; [`TuneError`] wraps them for the
//! session layer so callers only have to match on one type.

use thiserror_no_std::Error;

use crate::config::ConfigError;
use crate::graph::GraphError;
use crate::telemetry::StoreError;

/// Errors surfaced by [`crate::TuningSession`]
#[derive(Debug, Error)]
pub enum TuneError {
    /// The sample history could not be allocated
    #[error("Sample store error: {0}")]
    Store(StoreError),

    /// The graph canvas or framebuffer could not be set up
    #[error("Graph error: {0}")]
    Graph(GraphError),

    /// The stored configuration blob was unusable
    #[error("Config error: {0}")]
    Config(ConfigError),
}

impl From<StoreError> for TuneError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<GraphError> for TuneError {
    fn from(err: GraphError) -> Self {
        Self::Graph(err)
    }
}

impl From<ConfigError> for TuneError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Result type for session operations
pub type TuneResult<T> = Result<T, TuneError>;
