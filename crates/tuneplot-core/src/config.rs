//! Persistent display configuration
//!
//! The configuration is a small postcard-encoded blob kept alongside the
//! firmware; it only describes how the graph and backlight behave, never any
//! captured samples.

extern crate alloc;

use alloc::vec::Vec;
use embedded_graphics::prelude::Point;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::graph::constants::{
    DEFAULT_GRAPH_ANCHOR_X_PX, DEFAULT_GRAPH_ANCHOR_Y_PX, DEFAULT_GRAPH_HEIGHT_PX,
    DEFAULT_LABEL_GAP_PX, DEFAULT_LABEL_ROW_HEIGHT_PX, MIN_GRAPH_HEIGHT_PX,
};

/// Pack an 8-bit-per-channel colour into raw RGB565
///
/// R(5 bits), G(6 bits), B(5 bits): R>>3, G>>2, B>>3
pub const fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

/// Errors raised while loading or storing the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The blob could not be decoded
    #[error("Config decode failed: {0}")]
    Decode(postcard::Error),

    /// The config could not be encoded
    #[error("Config encode failed: {0}")]
    Encode(postcard::Error),

    /// The decoded values are out of range
    #[error("Invalid config: {reason}")]
    Invalid {
        /// Which constraint was violated
        reason: &'static str,
    },
}

/// Complete configuration for a tuning display
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TuningConfig {
    pub graph: GraphConfig,
    pub palette: PaletteConfig,
    pub ramp: RampConfig,
}

/// Placement and layout of the graph canvas
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphConfig {
    /// Canvas height in pixels
    pub height: u32,
    /// Left edge of the canvas on the display
    pub anchor_x: i32,
    /// Top edge of the canvas on the display
    pub anchor_y: i32,
    /// Rows kept free above the dispersion band for its maximum label
    pub label_row_height: u32,
    /// Horizontal gap between canvas and labels
    pub label_gap: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_GRAPH_HEIGHT_PX,
            anchor_x: DEFAULT_GRAPH_ANCHOR_X_PX,
            anchor_y: DEFAULT_GRAPH_ANCHOR_Y_PX,
            label_row_height: DEFAULT_LABEL_ROW_HEIGHT_PX,
            label_gap: DEFAULT_LABEL_GAP_PX,
        }
    }
}

impl GraphConfig {
    /// Top-left corner of the canvas on the display
    pub const fn anchor(&self) -> Point {
        Point::new(self.anchor_x, self.anchor_y)
    }
}

/// Raw RGB565 values for the four canvas palette entries
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteConfig {
    pub background: u16,
    pub foreground: u16,
    /// Temperature error trace
    pub channel_a: u16,
    /// Dispersion trace
    pub channel_b: u16,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            // very dark gray-blue
            background: rgb565(18, 23, 24),
            // medium gray
            foreground: rgb565(130, 140, 142),
            // warm orange
            channel_a: rgb565(200, 145, 85),
            // bright teal-green
            channel_b: rgb565(95, 185, 141),
        }
    }
}

/// Step sizes for the backlight brightness ramp
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampConfig {
    /// Step taken while far from the target
    pub large_step: u8,
    /// Distance above which the large step is used
    pub threshold: u8,
    /// Lowest level a target may be set to
    pub min_level: u8,
    /// Highest level a target may be set to
    pub max_level: u8,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            large_step: 8,
            threshold: 8,
            min_level: 0,
            max_level: u8::MAX,
        }
    }
}

impl TuningConfig {
    /// Decode and validate a stored config blob
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(ConfigError::Decode)?;
        config.validate()?;
        Ok(config)
    }

    /// Encode the config for storage
    pub fn to_vec(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(ConfigError::Encode)
    }

    /// Check value ranges the renderer and ramp rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.graph.height < MIN_GRAPH_HEIGHT_PX {
            return Err(ConfigError::Invalid {
                reason: "graph height below minimum",
            });
        }
        if self.graph.label_row_height >= self.graph.height {
            return Err(ConfigError::Invalid {
                reason: "label row does not fit in graph height",
            });
        }
        if self.ramp.large_step == 0 {
            return Err(ConfigError::Invalid {
                reason: "ramp step must be non-zero",
            });
        }
        if self.ramp.min_level > self.ramp.max_level {
            return Err(ConfigError::Invalid {
                reason: "ramp min level above max level",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565_packing() {
        assert_eq!(rgb565(255, 255, 255), 0xFFFF);
        assert_eq!(rgb565(0, 0, 0), 0);
        assert_eq!(rgb565(255, 0, 0), 0xF800);
        assert_eq!(rgb565(0, 255, 0), 0x07E0);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(TuningConfig::default().validate().is_ok());
    }

    #[test]
    fn test_stored_config_loads_back() {
        let mut config = TuningConfig::default();
        config.graph.height = 96;
        config.ramp.large_step = 16;

        let bytes = config.to_vec().unwrap();
        let loaded = TuningConfig::from_bytes(&bytes).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_truncated_blob_is_rejected() {
        let bytes = TuningConfig::default().to_vec().unwrap();
        let err = TuningConfig::from_bytes(&bytes[..2]).unwrap_err();
        assert!(matches!(err, ConfigError::Decode(_)));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = TuningConfig::default();
        config.graph.label_row_height = config.graph.height;
        let bytes = config.to_vec().unwrap();
        assert!(matches!(
            TuningConfig::from_bytes(&bytes),
            Err(ConfigError::Invalid { .. })
        ));

        let mut config = TuningConfig::default();
        config.ramp.large_step = 0;
        assert!(config.validate().is_err());
    }
}
