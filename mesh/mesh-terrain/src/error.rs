//! Error types for terrain conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for terrain conversion operations.
pub type TerrainResult<T> = Result<T, TerrainError>;

/// Broad category of a [`TerrainError`].
///
/// Every error is fatal to the conversion that raised it; the kind only
/// tells the caller whose fault it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input table is malformed.
    Format,
    /// A parameter or the data makes the arithmetic undefined.
    Validation,
    /// Reading the input or writing the output failed.
    Io,
}

/// Errors that can occur while converting an elevation grid to STL.
#[derive(Debug, Error)]
pub enum TerrainError {
    /// The input contains no header row.
    #[error("input is empty: expected a header row with width, height and max height")]
    EmptyInput,

    /// A row does not have the expected number of columns.
    #[error("line {line}: expected {expected} comma-separated columns, got {got}")]
    MalformedRow {
        /// 1-based line number in the input.
        line: usize,
        /// Number of columns required.
        expected: usize,
        /// Number of columns found.
        got: usize,
    },

    /// A field is not a finite number.
    #[error("line {line}: {field} value {value:?} is not a finite number")]
    InvalidNumber {
        /// 1-based line number in the input.
        line: usize,
        /// Name of the offending column.
        field: &'static str,
        /// Raw text of the field.
        value: String,
    },

    /// Header dimensions are not integers of at least 2.
    #[error("invalid grid dimensions {width} x {height}: both must be integers >= 2")]
    InvalidDimensions {
        /// Declared width.
        width: f64,
        /// Declared height.
        height: f64,
    },

    /// The grid has more vertices than a `u32` index can address.
    #[error("grid {width} x {height} is too large to index with 32-bit vertex indices")]
    GridTooLarge {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
    },

    /// Number of sample rows differs from `width * height`.
    #[error("grid {width} x {height} needs {expected} samples, found {got}")]
    SampleCountMismatch {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
        /// `width * height`.
        expected: usize,
        /// Number of sample rows read.
        got: usize,
    },

    /// A configuration value is out of range.
    #[error("invalid {name}: {value} ({requirement})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Supplied value.
        value: f64,
        /// Human-readable constraint.
        requirement: &'static str,
    },

    /// A required configuration value was not supplied.
    #[error("missing required parameter: {name}")]
    MissingParameter {
        /// Parameter name.
        name: &'static str,
    },

    /// Every sample is the no-data sentinel.
    #[error("grid contains no valid elevation samples")]
    NoValidSamples,

    /// The maximum (shifted) elevation is zero, so heights cannot be scaled.
    #[error("cannot scale heights: maximum elevation is {max_height} above the minimum")]
    FlatTerrain {
        /// Raw maximum valid elevation.
        max_height: f64,
    },

    /// East and north coordinates span no distance.
    #[error("cannot scale plan: east range {east_range}, north range {north_range}")]
    DegenerateExtent {
        /// Range of the east coordinates.
        east_range: f64,
        /// Range of the north coordinates.
        north_range: f64,
    },

    /// The triangle count does not fit the STL count field.
    #[error("{count} triangles exceed the binary STL limit of {limit}", limit = u32::MAX)]
    TooManyTriangles {
        /// Number of triangles in the mesh.
        count: usize,
    },

    /// The built solid failed the printability check.
    #[error(
        "solid is not printable: {boundary_edges} boundary, {non_manifold_edges} non-manifold, \
         {inconsistent_edges} inconsistently wound edges, inside-out: {inside_out}"
    )]
    UnprintableSolid {
        /// Edges used by only one face.
        boundary_edges: usize,
        /// Edges used by more than two faces.
        non_manifold_edges: usize,
        /// Shared edges walked the same way by both faces.
        inconsistent_edges: usize,
        /// Faces point inward.
        inside_out: bool,
    },

    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TerrainError {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput
            | Self::MalformedRow { .. }
            | Self::InvalidNumber { .. }
            | Self::InvalidDimensions { .. }
            | Self::GridTooLarge { .. }
            | Self::SampleCountMismatch { .. } => ErrorKind::Format,
            Self::InvalidParameter { .. }
            | Self::MissingParameter { .. }
            | Self::NoValidSamples
            | Self::FlatTerrain { .. }
            | Self::DegenerateExtent { .. }
            | Self::TooManyTriangles { .. }
            | Self::UnprintableSolid { .. } => ErrorKind::Validation,
            Self::FileNotFound { .. } | Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Create an `InvalidNumber` error for the given line and field.
    #[must_use]
    pub fn invalid_number(line: usize, field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            line,
            field,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TerrainError::SampleCountMismatch {
            width: 3,
            height: 3,
            expected: 9,
            got: 8,
        };
        let msg = format!("{err}");
        assert!(msg.contains("3 x 3"));
        assert!(msg.contains('9'));
        assert!(msg.contains('8'));

        let err = TerrainError::invalid_number(4, "north", "abc");
        assert_eq!(
            format!("{err}"),
            "line 4: north value \"abc\" is not a finite number"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(TerrainError::EmptyInput.kind(), ErrorKind::Format);
        assert_eq!(TerrainError::NoValidSamples.kind(), ErrorKind::Validation);
        assert_eq!(
            TerrainError::MissingParameter {
                name: "print_height"
            }
            .kind(),
            ErrorKind::Validation
        );
        let unprintable = TerrainError::UnprintableSolid {
            boundary_edges: 3,
            non_manifold_edges: 0,
            inconsistent_edges: 0,
            inside_out: true,
        };
        assert_eq!(unprintable.kind(), ErrorKind::Validation);
        assert!(format!("{unprintable}").contains("3 boundary"));
        assert!(format!("{unprintable}").ends_with("inside-out: true"));

        let io = std::io::Error::other("disk full");
        assert_eq!(TerrainError::from(io).kind(), ErrorKind::Io);
    }
}
