//! Planar scaling and the scaled grid snapshot.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{TerrainError, TerrainResult};
use crate::grid::HeightGrid;
use crate::normalize::{HeightRange, normalize_heights};
use crate::params::TerrainParams;

/// Horizontal extent of the raw grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarExtent {
    /// Smallest east coordinate.
    pub min_east: f64,
    /// Smallest north coordinate.
    pub min_north: f64,
    /// East range (max - min).
    pub east_range: f64,
    /// North range (max - min).
    pub north_range: f64,
}

impl PlanarExtent {
    /// The longer of the two ranges.
    #[inline]
    #[must_use]
    pub fn max_range(&self) -> f64 {
        self.east_range.max(self.north_range)
    }
}

/// Grid in print units: millimeters on all three axes, origin at zero.
///
/// Same shape and ordering as the [`HeightGrid`] it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledGrid {
    width: usize,
    height: usize,
    east: Vec<f64>,
    north: Vec<f64>,
    elevation: Vec<f64>,
}

impl ScaledGrid {
    /// Number of samples per row.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total number of samples.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.width * self.height
    }

    /// East coordinate in mm, starting at zero.
    #[inline]
    #[must_use]
    pub fn east(&self) -> &[f64] {
        &self.east
    }

    /// North coordinate in mm, starting at zero.
    #[inline]
    #[must_use]
    pub fn north(&self) -> &[f64] {
        &self.north
    }

    /// Height above the print bed in mm.
    #[inline]
    #[must_use]
    pub fn elevation(&self) -> &[f64] {
        &self.elevation
    }

    /// Always false for a grid built by [`scale_grid`].
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .par_iter()
        .map(|&v| (v, v))
        .reduce(
            || (f64::INFINITY, f64::NEG_INFINITY),
            |a, b| (a.0.min(b.0), a.1.max(b.1)),
        )
}

/// Compute the horizontal extent of a set of coordinates.
#[must_use]
pub fn planar_extent(east: &[f64], north: &[f64]) -> PlanarExtent {
    let (min_east, max_east) = min_max(east);
    let (min_north, max_north) = min_max(north);
    PlanarExtent {
        min_east,
        min_north,
        east_range: max_east - min_east,
        north_range: max_north - min_north,
    }
}

/// Move the origin to zero and scale both axes uniformly so the longer
/// side spans `print_width`.
///
/// # Errors
///
/// Returns [`TerrainError::DegenerateExtent`] if all points share the same
/// east and north coordinates.
///
/// # Example
///
/// ```
/// use mesh_terrain::scale_planar;
///
/// let (east, north) = scale_planar(&[10.0, 30.0, 50.0], &[5.0, 15.0, 5.0], 100.0).unwrap();
/// assert_eq!(east, vec![0.0, 50.0, 100.0]);
/// assert_eq!(north, vec![0.0, 25.0, 0.0]);
/// ```
pub fn scale_planar(
    east: &[f64],
    north: &[f64],
    print_width: f64,
) -> TerrainResult<(Vec<f64>, Vec<f64>)> {
    let extent = planar_extent(east, north);
    let max_range = extent.max_range();
    if !(max_range.is_finite() && max_range > 0.0) {
        return Err(TerrainError::DegenerateExtent {
            east_range: extent.east_range,
            north_range: extent.north_range,
        });
    }

    let factor = print_width / max_range;
    debug!(
        east_range = extent.east_range,
        north_range = extent.north_range,
        factor,
        "Scaling plan to print width"
    );

    let scale = |values: &[f64], origin: f64| -> Vec<f64> {
        values.par_iter().map(|&v| (v - origin) * factor).collect()
    };
    Ok((
        scale(east, extent.min_east),
        scale(north, extent.min_north),
    ))
}

/// Convert a raw grid into print units.
///
/// Runs height normalization and planar scaling and returns the scaled
/// grid together with the raw elevation range it was scaled from.
///
/// # Errors
///
/// Returns a validation error from [`normalize_heights`] or
/// [`scale_planar`].
pub fn scale_grid(
    grid: &HeightGrid,
    params: &TerrainParams,
) -> TerrainResult<(ScaledGrid, HeightRange)> {
    let (elevation, range) = normalize_heights(grid.elevation(), params)?;
    let (east, north) = scale_planar(grid.east(), grid.north(), params.print_width)?;
    Ok((
        ScaledGrid {
            width: grid.width(),
            height: grid.height(),
            east,
            north,
            elevation,
        },
        range,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wide_grid_scales_east_to_width() {
        let east = [100.0, 200.0, 300.0, 100.0, 200.0, 300.0];
        let north = [50.0, 50.0, 50.0, 0.0, 0.0, 0.0];
        let (e, n) = scale_planar(&east, &north, 130.0).unwrap();

        assert_eq!(e[0], 0.0);
        assert_relative_eq!(e[2], 130.0);
        assert_relative_eq!(n[0], 32.5);
        assert_eq!(n[3], 0.0);
    }

    #[test]
    fn tall_grid_scales_north_to_width() {
        let east = [0.0, 1.0, 0.0, 1.0];
        let north = [4.0, 4.0, 0.0, 0.0];
        let (e, n) = scale_planar(&east, &north, 100.0).unwrap();

        let max_e = e.iter().copied().fold(f64::MIN, f64::max);
        let max_n = n.iter().copied().fold(f64::MIN, f64::max);
        assert_relative_eq!(max_n, 100.0);
        assert_relative_eq!(max_e, 25.0);
    }

    #[test]
    fn negative_coordinates_reorigin() {
        let (e, n) = scale_planar(&[-10.0, -5.0], &[-3.0, -3.0], 10.0).unwrap();
        assert_eq!(e, vec![0.0, 10.0]);
        assert_eq!(n, vec![0.0, 0.0]);
    }

    #[test]
    fn degenerate_extent_rejected() {
        let err = scale_planar(&[1.0, 1.0], &[2.0, 2.0], 100.0).unwrap_err();
        assert!(matches!(err, TerrainError::DegenerateExtent { .. }));
    }

    #[test]
    fn scale_grid_keeps_shape() {
        let grid = HeightGrid::new(
            2,
            2,
            vec![0.0, 10.0, 0.0, 10.0],
            vec![10.0, 10.0, 0.0, 0.0],
            vec![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        let (scaled, range) = scale_grid(&grid, &TerrainParams::default()).unwrap();

        assert_eq!(scaled.width(), 2);
        assert_eq!(scaled.height(), 2);
        assert_eq!(scaled.len(), 4);
        assert_eq!(range.max, 4.0);
        assert_relative_eq!(scaled.east()[1], 130.0);
        assert_relative_eq!(scaled.elevation()[3], 6.5);
    }
}
