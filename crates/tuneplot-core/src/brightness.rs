//! Backlight brightness ramp
//!
//! Moves the display backlight toward a target level a bounded step per
//! tick instead of jumping, so brightness changes fade in. The ramp is
//! driven from an external fixed-rate tick and never blocks: each call reads
//! the current hardware level, writes at most one new level and returns.

use log::trace;

use crate::config::RampConfig;

/// Hardware intensity output (backlight PWM, LED driver, ...)
pub trait IntensityOutput {
    /// Level currently applied by the hardware
    fn level(&self) -> u8;

    /// Apply a new level
    fn set_level(&mut self, level: u8);
}

/// Bounded-step convergence toward a target intensity
#[derive(Debug, Clone, Copy)]
pub struct BrightnessRamp {
    target: u8,
    config: RampConfig,
}

impl BrightnessRamp {
    /// Create a ramp heading for `target`
    pub fn new(target: u8, config: RampConfig) -> Self {
        let mut ramp = Self { target: 0, config };
        ramp.set_target(target);
        ramp
    }

    /// Level the ramp is converging to
    pub const fn target(&self) -> u8 {
        self.target
    }

    /// Change the target, limited to the configured level range.
    ///
    /// An inverted range (`min_level > max_level`) is treated as the range
    /// between the two bounds.
    pub fn set_target(&mut self, target: u8) {
        let (min, max) = (self.config.min_level, self.config.max_level);
        self.target = target.clamp(min.min(max), min.max(max));
    }

    /// Whether the output already sits at the target
    pub fn is_settled<O: IntensityOutput>(&self, output: &O) -> bool {
        output.level() == self.target
    }

    /// Advance the output one step toward the target.
    ///
    /// Uses the large step while the remaining distance exceeds the threshold
    /// and single-unit steps after that. A step never passes the target.
    /// Returns `true` if the output level was changed.
    pub fn tick<O: IntensityOutput>(&self, output: &mut O) -> bool {
        let current = output.level();
        if current == self.target {
            return false;
        }

        let distance = current.abs_diff(self.target);
        let step = if distance > self.config.threshold {
            self.config.large_step.max(1)
        } else {
            1
        }
        .min(distance);

        let next = if current < self.target {
            current + step
        } else {
            current - step
        };
        trace!("Brightness {} -> {} (target {})", current, next, self.target);
        output.set_level(next);
        true
    }
}
