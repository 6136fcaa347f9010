//! A single control-cycle observation

/// Lowest storable temperature error
pub const TEMP_MIN: i16 = -500;

/// Highest storable temperature error
pub const TEMP_MAX: i16 = 500;

/// Lowest storable dispersion value
pub const DISP_MIN: u16 = 0;

/// Highest storable dispersion value
pub const DISP_MAX: u16 = 999;

/// One observation per control cycle
///
/// Values are clamped on construction, so every `Sample` in a store is
/// already within `[TEMP_MIN, TEMP_MAX]` and `[DISP_MIN, DISP_MAX]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sample {
    /// Temperature error relative to the setpoint
    pub temp: i16,
    /// Dispersion (variance) metric
    pub disp: u16,
}

impl Sample {
    /// Build a sample, clamping both channels to their storable range
    pub fn clamped(temp: i32, disp: u32) -> Self {
        Self {
            temp: temp.clamp(TEMP_MIN as i32, TEMP_MAX as i32) as i16,
            disp: disp.min(DISP_MAX as u32) as u16,
        }
    }

    /// Magnitude of the temperature error
    pub const fn temp_magnitude(&self) -> u16 {
        self.temp.unsigned_abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_values_are_kept() {
        let sample = Sample::clamped(-123, 456);
        assert_eq!(sample.temp, -123);
        assert_eq!(sample.disp, 456);
    }

    #[test]
    fn test_out_of_range_values_clamp_to_nearest_bound() {
        assert_eq!(Sample::clamped(501, 0).temp, TEMP_MAX);
        assert_eq!(Sample::clamped(-501, 0).temp, TEMP_MIN);
        assert_eq!(Sample::clamped(i32::MAX, 0).temp, TEMP_MAX);
        assert_eq!(Sample::clamped(i32::MIN, 0).temp, TEMP_MIN);
        assert_eq!(Sample::clamped(0, 1000).disp, DISP_MAX);
        assert_eq!(Sample::clamped(0, u32::MAX).disp, DISP_MAX);
    }

    #[test]
    fn test_temp_magnitude() {
        assert_eq!(Sample::clamped(-500, 0).temp_magnitude(), 500);
        assert_eq!(Sample::clamped(42, 0).temp_magnitude(), 42);
    }
}
