//! Range discovery and row normalization
//!
//! All scaling is done in integer arithmetic with an explicit rounding rule
//! (half away from zero), so the same history renders to the same pixels on
//! every target, with or without an FPU.

use crate::telemetry::{Sample, SampleStore, Snapshot};

use super::constants::MIN_GRAPH_HEIGHT_PX;
use super::{GraphError, GraphResult};

/// Integer division rounding half away from zero.
///
/// `denominator` must be non-zero.
pub const fn round_div(numerator: i64, denominator: i64) -> i64 {
    let n = numerator.unsigned_abs();
    let d = denominator.unsigned_abs();
    let q = ((2 * n + d) / (2 * d)) as i64;
    if (numerator < 0) != (denominator < 0) { -q } else { q }
}

/// Scale extents found by the range-discovery pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeSummary {
    /// Number of samples scanned
    pub count: usize,
    /// Most positive temperature error
    pub max_temp: i16,
    /// Most negative temperature error
    pub min_temp: i16,
    /// Larger of the two excursions, used as the symmetric temperature scale
    pub max_temp_magnitude: u16,
    /// Largest dispersion value
    pub max_disp: u16,
}

impl RangeSummary {
    /// Scan the store once, oldest to newest.
    ///
    /// Returns `None` when there is nothing to render.
    pub fn scan(store: &SampleStore) -> Option<Self> {
        Self::scan_at(store, &store.snapshot())
    }

    /// Scan the samples visible through `snapshot`
    pub fn scan_at(store: &SampleStore, snapshot: &Snapshot) -> Option<Self> {
        let mut samples = (0..snapshot.count()).filter_map(|i| store.get_at(snapshot, i));
        let first = samples.next()?;

        let mut summary = Self {
            count: 1,
            max_temp: first.temp,
            min_temp: first.temp,
            max_temp_magnitude: 0,
            max_disp: first.disp,
        };
        for sample in samples {
            summary.count += 1;
            summary.max_temp = summary.max_temp.max(sample.temp);
            summary.min_temp = summary.min_temp.min(sample.temp);
            summary.max_disp = summary.max_disp.max(sample.disp);
        }

        // Scale to whichever excursion is larger so both fit
        summary.max_temp_magnitude = summary
            .max_temp
            .unsigned_abs()
            .max(summary.min_temp.unsigned_abs());
        Some(summary)
    }
}

/// Row layout of the two channel bands on a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Canvas height in pixels
    pub height: u32,
    /// Row of the temperature zero line
    pub temp_zero: u32,
    /// Baseline row of the dispersion band
    pub disp_zero: u32,
    /// Usable height of the dispersion band
    pub disp_height: u32,
}

impl Geometry {
    /// Lay out the bands for a canvas of `height` rows, leaving
    /// `label_row_height` rows at the top of the dispersion band free.
    pub fn new(height: u32, label_row_height: u32) -> GraphResult<Self> {
        if height < MIN_GRAPH_HEIGHT_PX || label_row_height >= height {
            return Err(GraphError::CanvasTooShort {
                height,
                label_row_height,
            });
        }

        Ok(Self {
            height,
            temp_zero: height / 2,
            disp_zero: height - 1,
            disp_height: height - label_row_height,
        })
    }
}

/// Pixel rows for one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedPoint {
    /// Row of the temperature channel
    pub temp_row: u32,
    /// Row of the dispersion channel
    pub disp_row: u32,
}

/// Maps sample values to canvas rows for one render pass
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    geometry: Geometry,
    max_temp_magnitude: u32,
    max_disp: u32,
}

impl Normalizer {
    /// Create a normalizer from the layout and the scanned extents
    pub fn new(geometry: Geometry, summary: &RangeSummary) -> Self {
        Self {
            geometry,
            max_temp_magnitude: summary.max_temp_magnitude as u32,
            max_disp: summary.max_disp as u32,
        }
    }

    /// Row for a temperature error.
    ///
    /// Positive errors rise from the zero line but never reach row 0 (the top
    /// border); negative errors fall toward the bottom row.
    pub fn temp_row(&self, temp: i16) -> u32 {
        let zero = self.geometry.temp_zero;
        if self.max_temp_magnitude == 0 {
            return zero;
        }

        let offset = round_div(
            temp.unsigned_abs() as i64 * zero as i64,
            self.max_temp_magnitude as i64,
        ) as u32;

        if temp > 0 {
            zero.saturating_sub(offset).max(1)
        } else {
            (zero + offset).min(self.geometry.height - 1)
        }
    }

    /// Row for a dispersion value, measured up from the baseline
    pub fn disp_row(&self, disp: u16) -> u32 {
        let zero = self.geometry.disp_zero;
        if self.max_disp == 0 {
            return zero;
        }

        let height = self.geometry.disp_height;
        let rise = round_div(disp as i64 * height as i64, self.max_disp as i64) as u32;
        zero - rise.min(height - 1)
    }

    /// Rows for both channels of a sample
    pub fn point(&self, sample: Sample) -> NormalizedPoint {
        NormalizedPoint {
            temp_row: self.temp_row(sample.temp),
            disp_row: self.disp_row(sample.disp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer(height: u32, label: u32, max_t: u16, max_d: u16) -> Normalizer {
        let summary = RangeSummary {
            max_temp_magnitude: max_t,
            max_disp: max_d,
            ..RangeSummary::default()
        };
        Normalizer::new(Geometry::new(height, label).unwrap(), &summary)
    }

    #[test]
    fn test_round_div_half_away_from_zero() {
        assert_eq!(round_div(5, 2), 3);
        assert_eq!(round_div(-5, 2), -3);
        assert_eq!(round_div(5, -2), -3);
        assert_eq!(round_div(7, 3), 2);
        assert_eq!(round_div(8, 3), 3);
        assert_eq!(round_div(0, 9), 0);
        assert_eq!(round_div(6, 3), 2);
    }

    #[test]
    fn test_scan_empty_store() {
        let store = SampleStore::new();
        assert!(RangeSummary::scan(&store).is_none());
    }

    #[test]
    fn test_scan_uses_larger_negative_excursion() {
        let mut store = SampleStore::new();
        store.allocate(8).unwrap();
        store.put(120, 3);
        store.put(-300, 40);
        store.put(10, 7);

        let summary = RangeSummary::scan(&store).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.max_temp, 120);
        assert_eq!(summary.min_temp, -300);
        assert_eq!(summary.max_temp_magnitude, 300);
        assert_eq!(summary.max_disp, 40);
    }

    #[test]
    fn test_scan_at_sees_only_the_snapshot() {
        let mut store = SampleStore::new();
        store.allocate(8).unwrap();
        store.put(5, 1);
        store.put(-20, 2);
        let snapshot = store.snapshot();

        store.put(400, 900);

        let summary = RangeSummary::scan_at(&store, &snapshot).unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.max_temp_magnitude, 20);
        assert_eq!(summary.max_disp, 2);
        assert_eq!(RangeSummary::scan(&store).map(|s| s.count), Some(3));
    }

    #[test]
    fn test_geometry_rejects_short_canvas() {
        assert!(Geometry::new(2, 0).is_err());
        assert!(Geometry::new(10, 10).is_err());

        let g = Geometry::new(64, 10).unwrap();
        assert_eq!(g.temp_zero, 32);
        assert_eq!(g.disp_zero, 63);
        assert_eq!(g.disp_height, 54);
    }

    #[test]
    fn test_flat_channels_sit_on_baselines() {
        let n = normalizer(64, 10, 0, 0);
        assert_eq!(n.temp_row(0), 32);
        assert_eq!(n.disp_row(0), 63);
    }

    #[test]
    fn test_temp_rows_are_symmetric_and_clamped() {
        let n = normalizer(64, 10, 100, 0);
        // Full-scale positive would hit row 0, which is reserved
        assert_eq!(n.temp_row(100), 1);
        // Full-scale negative would be row 64, past the bottom
        assert_eq!(n.temp_row(-100), 63);
        assert_eq!(n.temp_row(50), 16);
        assert_eq!(n.temp_row(-50), 48);
        // 1 * 32 / 100 = 0.32 rounds to 0
        assert_eq!(n.temp_row(1), 32);
        // 2 * 32 / 100 = 0.64 rounds to 1
        assert_eq!(n.temp_row(-2), 33);
    }

    #[test]
    fn test_disp_rows_stay_below_label_row() {
        let n = normalizer(64, 10, 0, 200);
        // Full scale rises 54 rows, clamped to 53
        assert_eq!(n.disp_row(200), 10);
        assert_eq!(n.disp_row(100), 36);
        assert_eq!(n.disp_row(0), 63);
    }
}
