//! Elevation to print-height normalization.
//!
//! Valid samples are shifted so the lowest one sits at zero (when the
//! terrain dips below zero), scaled so the highest one reaches
//! `print_height`, and lifted by `base_offset`. Samples at or below zero
//! after the shift, and no-data samples, get no lift. Every sample then
//! sits on top of the `base_thickness` plate.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{TerrainError, TerrainResult};
use crate::grid::is_no_data;
use crate::params::TerrainParams;

/// Minimum and maximum of the valid (non-sentinel) elevations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightRange {
    /// Lowest valid elevation.
    pub min: f64,
    /// Highest valid elevation.
    pub max: f64,
}

impl HeightRange {
    /// Amount subtracted from every valid sample before scaling.
    ///
    /// Only terrain reaching below zero is shifted; otherwise heights are
    /// scaled from zero so sea level stays at the base.
    #[inline]
    #[must_use]
    pub fn shift(&self) -> f64 {
        if self.min < 0.0 { self.min } else { 0.0 }
    }

    /// Highest elevation after the shift, the value mapped to `print_height`.
    #[inline]
    #[must_use]
    pub fn scale_divisor(&self) -> f64 {
        self.max - self.shift()
    }
}

/// Find the valid elevation range, ignoring no-data samples.
///
/// Returns `None` if every sample is no-data (or the slice is empty).
///
/// # Example
///
/// ```
/// use mesh_terrain::{height_range, NO_DATA_ELEVATION};
///
/// let range = height_range(&[12.0, NO_DATA_ELEVATION, 40.0, -3.0]).unwrap();
/// assert_eq!(range.min, -3.0);
/// assert_eq!(range.max, 40.0);
/// ```
#[must_use]
pub fn height_range(elevation: &[f64]) -> Option<HeightRange> {
    elevation
        .par_iter()
        .copied()
        .filter(|&e| !is_no_data(e))
        .map(|e| HeightRange { min: e, max: e })
        .reduce_with(|a, b| HeightRange {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        })
}

/// Convert raw elevations to z-coordinates in millimeters.
///
/// Returns the z-values (same order as the input) and the raw range they
/// were scaled from. Every output lies in
/// `[base_thickness, base_thickness + base_offset + print_height]`; no-data
/// samples are exactly `base_thickness`.
///
/// # Errors
///
/// - [`TerrainError::NoValidSamples`] if every sample is no-data
/// - [`TerrainError::FlatTerrain`] if the highest shifted elevation is zero,
///   which leaves nothing to scale against
pub fn normalize_heights(
    elevation: &[f64],
    params: &TerrainParams,
) -> TerrainResult<(Vec<f64>, HeightRange)> {
    let range = height_range(elevation).ok_or(TerrainError::NoValidSamples)?;
    let shift = range.shift();
    let divisor = range.scale_divisor();

    if divisor <= 0.0 {
        return Err(TerrainError::FlatTerrain {
            max_height: range.max,
        });
    }

    debug!(
        min = range.min,
        max = range.max,
        shift,
        divisor,
        "Normalizing elevations"
    );

    let z = elevation
        .par_iter()
        .map(|&e| {
            let lifted = if is_no_data(e) {
                0.0
            } else {
                let shifted = e - shift;
                if shifted > 0.0 {
                    params.base_offset + params.print_height * shifted / divisor
                } else {
                    0.0
                }
            };
            lifted + params.base_thickness
        })
        .collect();

    Ok((z, range))
}
