//! Conversion summary.

use std::path::PathBuf;

use crate::normalize::HeightRange;

/// Summary of one grid-to-STL conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    /// Samples per row.
    pub width: usize,
    /// Rows.
    pub height: usize,
    /// Number of grid samples.
    pub points: usize,
    /// Samples carrying the no-data sentinel.
    pub no_data_points: usize,
    /// Raw elevation range before scaling.
    pub height_range: HeightRange,
    /// Triangles written.
    pub triangle_count: usize,
    /// Size of the written file in bytes.
    pub file_size: u64,
    /// Where the STL was written.
    pub output: PathBuf,
}

impl std::fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Terrain {}x{} ({} points, {} no-data, heights {} to {}) → {} triangles, {} bytes in {}",
            self.width,
            self.height,
            self.points,
            self.no_data_points,
            self.height_range.min,
            self.height_range.max,
            self.triangle_count,
            self.file_size,
            self.output.display()
        )
    }
}
