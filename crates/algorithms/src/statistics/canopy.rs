//! Canopy height statistics
//!
//! Reduces a canopy height model to min / max / mean / count over the cells
//! that hold a real vegetation height: above a height cut-off and not the
//! raster's NoData sentinel.

use canopy_core::raster::{Raster, RasterElement};
use serde::{Deserialize, Serialize};

/// Which cells count as vegetation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightFilter {
    /// Cells must be strictly above this height (metres)
    pub min_height: f64,
}

impl HeightFilter {
    /// Whole-tile analysis keeps every strictly positive height
    pub const STRICTLY_POSITIVE: HeightFilter = HeightFilter { min_height: 0.0 };

    /// Area analysis drops ground returns below half a metre
    pub const CANOPY: HeightFilter = HeightFilter { min_height: 0.5 };

    pub fn new(min_height: f64) -> Self {
        Self { min_height }
    }

    /// Validity test for one cell
    #[inline]
    pub fn accepts<T: RasterElement>(&self, value: T, nodata: Option<T>) -> bool {
        if value.is_nodata(nodata) {
            return false;
        }
        match value.to_f64() {
            Some(v) => v > self.min_height,
            None => false,
        }
    }
}

impl Default for HeightFilter {
    fn default() -> Self {
        Self::STRICTLY_POSITIVE
    }
}

/// Statistics over the valid cells of a raster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

impl HeightStats {
    /// Copy with min, max and mean rounded to centimetres
    pub fn rounded(&self) -> Self {
        Self {
            min: round2(self.min),
            max: round2(self.max),
            mean: round2(self.mean),
            count: self.count,
        }
    }
}

/// Round to two decimal places.
///
/// Rounding is done on the exact binary value with ties to even, so `10.125`
/// gives `10.12` and `1.115` (stored just below the tie) gives `1.11`.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Compute height statistics over the cells accepted by `filter`.
///
/// Returns `None` when no cell is valid. Accumulation is done in `f64`
/// whatever the cell type.
pub fn height_statistics<T: RasterElement>(raster: &Raster<T>, filter: &HeightFilter) -> Option<HeightStats> {
    let nodata = raster.nodata();

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut count = 0usize;

    for &value in raster.data().iter() {
        if !filter.accepts(value, nodata) {
            continue;
        }
        let Some(v) = value.to_f64() else { continue };

        min = min.min(v);
        max = max.max(v);
        sum += v;
        count += 1;
    }

    if count == 0 {
        return None;
    }

    Some(HeightStats {
        min,
        max,
        mean: sum / count as f64,
        count,
    })
}
