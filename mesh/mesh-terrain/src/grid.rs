//! Elevation grid loading.
//!
//! # Input Format
//!
//! ```text
//! width,height,max_height     – header; max_height is ignored
//! east,north,elevation        – width * height samples, row-major
//! ...
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Coordinates are
//! whatever the extraction step emitted (degrees, meters); only their
//! relative spacing matters.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{TerrainError, TerrainResult};

/// Elevation value marking a sample with no data.
pub const NO_DATA_ELEVATION: f64 = -32768.0;

/// Whether an elevation is the no-data sentinel (or below it).
#[inline]
#[must_use]
pub fn is_no_data(elevation: f64) -> bool {
    elevation <= NO_DATA_ELEVATION
}

const COLUMNS: usize = 3;

/// Upper bound on samples reserved up front; the header is not trusted.
const MAX_RESERVE: usize = 1 << 16;
const FIELDS: [&str; COLUMNS] = ["east", "north", "elevation"];
const HEADER_FIELDS: [&str; COLUMNS] = ["width", "height", "max_height"];

/// A rectangular grid of elevation samples, stored row-major.
///
/// All three arrays have exactly `width * height` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    width: usize,
    height: usize,
    east: Vec<f64>,
    north: Vec<f64>,
    elevation: Vec<f64>,
}

impl HeightGrid {
    /// Create a grid from its columns.
    ///
    /// # Errors
    ///
    /// Returns a format error if either dimension is below 2, the grid is
    /// too large for 32-bit indices, or any column length differs from
    /// `width * height`.
    pub fn new(
        width: usize,
        height: usize,
        east: Vec<f64>,
        north: Vec<f64>,
        elevation: Vec<f64>,
    ) -> TerrainResult<Self> {
        let expected = checked_sample_count(width, height)?;
        for got in [east.len(), north.len(), elevation.len()] {
            if got != expected {
                return Err(TerrainError::SampleCountMismatch {
                    width,
                    height,
                    expected,
                    got,
                });
            }
        }
        Ok(Self {
            width,
            height,
            east,
            north,
            elevation,
        })
    }

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

    /// Always false; a valid grid has at least 2 x 2 samples.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// East coordinate of each sample.
    #[inline]
    #[must_use]
    pub fn east(&self) -> &[f64] {
        &self.east
    }

    /// North coordinate of each sample.
    #[inline]
    #[must_use]
    pub fn north(&self) -> &[f64] {
        &self.north
    }

    /// Raw elevation of each sample; may contain [`NO_DATA_ELEVATION`].
    #[inline]
    #[must_use]
    pub fn elevation(&self) -> &[f64] {
        &self.elevation
    }

    /// Number of samples carrying the no-data sentinel.
    #[must_use]
    pub fn no_data_count(&self) -> usize {
        self.elevation.iter().filter(|&&e| is_no_data(e)).count()
    }
}

/// Validate dimensions and return `width * height`.
///
/// Both layers of the solid are addressed with `u32` indices, so
/// `2 * width * height` must fit.
#[allow(clippy::cast_precision_loss)]
fn checked_sample_count(width: usize, height: usize) -> TerrainResult<usize> {
    if width < 2 || height < 2 {
        return Err(TerrainError::InvalidDimensions {
            width: width as f64,
            height: height as f64,
        });
    }
    width
        .checked_mul(height)
        .filter(|&p| p.checked_mul(2).is_some_and(|v| u32::try_from(v).is_ok()))
        .ok_or(TerrainError::GridTooLarge { width, height })
}

/// Load a grid from a CSV file.
///
/// # Errors
///
/// Returns [`TerrainError::FileNotFound`] if the file does not exist, an
/// I/O error if it cannot be read, or a format error as described in
/// [`read_grid`].
///
/// # Example
///
/// ```no_run
/// use mesh_terrain::load_grid;
///
/// let grid = load_grid("N54W004.csv").unwrap();
/// println!("{} x {} samples", grid.width(), grid.height());
/// ```
pub fn load_grid<P: AsRef<Path>>(path: P) -> TerrainResult<HeightGrid> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TerrainError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            TerrainError::Io(e)
        }
    })?;
    read_grid(BufReader::new(file))
}

/// Parse a grid from CSV text.
///
/// # Errors
///
/// See [`read_grid`].
///
/// # Example
///
/// ```
/// use mesh_terrain::parse_grid;
///
/// let grid = parse_grid("2,2,10\n0,1,5\n1,1,6\n0,0,7\n1,0,8\n").unwrap();
/// assert_eq!(grid.width(), 2);
/// assert_eq!(grid.elevation(), [5.0, 6.0, 7.0, 8.0]);
/// ```
pub fn parse_grid(content: &str) -> TerrainResult<HeightGrid> {
    read_grid(content.as_bytes())
}

/// Read a grid from any buffered reader.
///
/// # Errors
///
/// Returns a format error if:
/// - the input has no header row
/// - a row does not have exactly three columns
/// - a field is not a finite number
/// - the header width or height is not an integer of at least 2
/// - the number of samples differs from `width * height`
pub fn read_grid<R: BufRead>(reader: R) -> TerrainResult<HeightGrid> {
    let mut rows = data_rows(reader);

    let (header_line, [width, height, _max_height]) = match rows.next() {
        Some(row) => row.and_then(|(line, text)| {
            parse_row(line, &text, &HEADER_FIELDS).map(|fields| (line, fields))
        })?,
        None => return Err(TerrainError::EmptyInput),
    };

    let (width, height) = grid_dimensions(width, height)?;
    let expected = checked_sample_count(width, height)?;
    debug!(width, height, line = header_line, "Read grid header");

    let reserve = expected.min(MAX_RESERVE);
    let mut east = Vec::with_capacity(reserve);
    let mut north = Vec::with_capacity(reserve);
    let mut elevation = Vec::with_capacity(reserve);

    for row in rows {
        let (line, text) = row?;
        let [e, n, z] = parse_row(line, &text, &FIELDS)?;
        east.push(e);
        north.push(n);
        elevation.push(z);
    }

    if elevation.len() != expected {
        return Err(TerrainError::SampleCountMismatch {
            width,
            height,
            expected,
            got: elevation.len(),
        });
    }

    HeightGrid::new(width, height, east, north, elevation)
}

/// Non-blank, non-comment lines with their 1-based line numbers.
fn data_rows<R: BufRead>(reader: R) -> impl Iterator<Item = TerrainResult<(usize, String)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(index, line)| match line {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    None
                } else {
                    Some(Ok((index + 1, trimmed.to_string())))
                }
            }
            Err(e) => Some(Err(TerrainError::Io(e))),
        })
}

fn parse_row(
    line: usize,
    text: &str,
    names: &[&'static str; COLUMNS],
) -> TerrainResult<[f64; COLUMNS]> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() != COLUMNS {
        return Err(TerrainError::MalformedRow {
            line,
            expected: COLUMNS,
            got: fields.len(),
        });
    }

    let mut values = [0.0; COLUMNS];
    for ((value, field), name) in values.iter_mut().zip(&fields).zip(names) {
        *value = field
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| TerrainError::invalid_number(line, *name, *field))?;
    }
    Ok(values)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
// Truncation: values are checked to be integral and within usize range first
fn grid_dimensions(width: f64, height: f64) -> TerrainResult<(usize, usize)> {
    let valid = |v: f64| v.fract() == 0.0 && (2.0..=f64::from(u32::MAX)).contains(&v);
    if valid(width) && valid(height) {
        Ok((width as usize, height as usize))
    } else {
        Err(TerrainError::InvalidDimensions { width, height })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    const GRID_3X3: &str = "\
3,3,100
0,60,10
30,60,20
60,60,-32768
0,30,30
30,30,40
60,30,50
0,0,60
30,0,70
60,0,80
";

    #[test]
    fn parse_valid_grid() {
        let grid = parse_grid(GRID_3X3).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.len(), 9);
        assert_eq!(grid.east()[1], 30.0);
        assert_eq!(grid.north()[0], 60.0);
        assert_eq!(grid.elevation()[2], NO_DATA_ELEVATION);
        assert_eq!(grid.no_data_count(), 1);
    }

    #[test]
    fn header_max_height_is_ignored() {
        let with_hint = GRID_3X3.replacen("3,3,100", "3,3,-1.5", 1);
        let grid = parse_grid(&with_hint).unwrap();
        assert_eq!(grid.elevation(), parse_grid(GRID_3X3).unwrap().elevation());
    }

    #[test]
    fn float_header_dimensions() {
        let grid = parse_grid("2.0,2.0,9.0\n0,1,1\n1,1,2\n0,0,3\n1,0,4\n").unwrap();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 2);
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let text = "# exported grid\n2,2,10\n\n0,1,1\n1,1,2\n   \n0,0,3\n1,0,4\n";
        let grid = parse_grid(text).unwrap();
        assert_eq!(grid.elevation(), [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn sample_count_mismatch() {
        let short = GRID_3X3.trim_end().rsplit_once('\n').unwrap().0;
        let err = parse_grid(short).unwrap_err();
        assert!(matches!(
            err,
            TerrainError::SampleCountMismatch {
                expected: 9,
                got: 8,
                ..
            }
        ));
    }

    #[test]
    fn huge_header_with_short_body() {
        // 46340^2 samples still fit 32-bit indices; nothing is reserved for them
        let err = parse_grid("46340,46340,1\n0,0,1\n").unwrap_err();
        assert!(matches!(
            err,
            TerrainError::SampleCountMismatch {
                width: 46340,
                height: 46340,
                got: 1,
                ..
            }
        ));
        assert_eq!(err.kind(), crate::error::ErrorKind::Format);
    }

    #[test]
    fn columns_match_dimensions() {
        let grid = parse_grid(GRID_3X3).unwrap();
        for column in [grid.east(), grid.north(), grid.elevation()] {
            assert_eq!(column.len(), grid.width() * grid.height());
        }
    }

    #[test]
    fn empty_input() {
        assert!(matches!(parse_grid(""), Err(TerrainError::EmptyInput)));
        assert!(matches!(
            parse_grid("# only a comment\n"),
            Err(TerrainError::EmptyInput)
        ));
    }

    #[test]
    fn malformed_row_reports_line() {
        let text = "2,2,10\n0,1,1\n1,1\n0,0,3\n1,0,4\n";
        let err = parse_grid(text).unwrap_err();
        assert!(matches!(
            err,
            TerrainError::MalformedRow {
                line: 3,
                expected: 3,
                got: 2
            }
        ));
    }

    #[test]
    fn non_numeric_field_reports_line_and_field() {
        let text = "2,2,10\n0,1,1\n1,1,2\n0,abc,3\n1,0,4\n";
        match parse_grid(text).unwrap_err() {
            TerrainError::InvalidNumber { line, field, value } => {
                assert_eq!(line, 4);
                assert_eq!(field, "north");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_field_rejected() {
        let text = "2,2,10\n0,1,NaN\n1,1,2\n0,0,3\n1,0,4\n";
        assert!(matches!(
            parse_grid(text),
            Err(TerrainError::InvalidNumber {
                field: "elevation",
                ..
            })
        ));
    }

    #[test]
    fn invalid_dimensions() {
        assert!(matches!(
            parse_grid("1,4,10\n0,0,1\n0,1,1\n0,2,1\n0,3,1\n"),
            Err(TerrainError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            parse_grid("2.5,2,10\n"),
            Err(TerrainError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            parse_grid("-3,3,10\n"),
            Err(TerrainError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn grid_too_large() {
        assert!(matches!(
            parse_grid("100000,100000,10\n"),
            Err(TerrainError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn new_checks_column_lengths() {
        let err = HeightGrid::new(2, 2, vec![0.0; 4], vec![0.0; 3], vec![0.0; 4]).unwrap_err();
        assert!(matches!(err, TerrainError::SampleCountMismatch { got: 3, .. }));
    }

    #[test]
    fn load_missing_file() {
        let result = load_grid("nonexistent_grid_12345.csv");
        match result {
            Err(TerrainError::FileNotFound { path }) => {
                assert!(path.to_string_lossy().contains("nonexistent"));
            }
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn sentinel_helper() {
        assert!(is_no_data(NO_DATA_ELEVATION));
        assert!(is_no_data(-40000.0));
        assert!(!is_no_data(-32767.0));
        assert!(!is_no_data(0.0));
    }
}
