//! Print parameters for terrain conversion.

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::error::{TerrainError, TerrainResult};

/// Default header text written into the STL file.
pub const DEFAULT_HEADER: &str = "Generated from NASA SRTM data";

/// Physical print dimensions, all in millimeters.
///
/// # Example
///
/// ```
/// use mesh_terrain::TerrainParams;
///
/// let params = TerrainParams::default()
///     .with_print_height(7.5)
///     .with_print_width(150.0);
/// assert!(params.validate().is_ok());
///
/// let flat = TerrainParams::default().with_print_height(0.0);
/// assert!(flat.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainParams {
    /// Height of the tallest valid sample above the base offset. Default: 5.0
    pub print_height: f64,

    /// Length of the longer horizontal side of the print. Default: 130.0
    pub print_width: f64,

    /// Extra height added to every sample above the minimum, so coastlines
    /// stand out from sea level. May be zero. Default: 0.5
    pub base_offset: f64,

    /// Thickness of the solid plate under the whole terrain. Default: 1.0
    pub base_thickness: f64,

    /// Free-form text for the 80-byte STL header.
    pub header: String,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            print_height: 5.0,
            print_width: 130.0,
            base_offset: 0.5,
            base_thickness: 1.0,
            header: DEFAULT_HEADER.to_string(),
        }
    }
}

impl TerrainParams {
    /// Set the print height.
    #[must_use]
    pub fn with_print_height(mut self, print_height: f64) -> Self {
        self.print_height = print_height;
        self
    }

    /// Set the print width.
    #[must_use]
    pub fn with_print_width(mut self, print_width: f64) -> Self {
        self.print_width = print_width;
        self
    }

    /// Set the base offset.
    #[must_use]
    pub fn with_base_offset(mut self, base_offset: f64) -> Self {
        self.base_offset = base_offset;
        self
    }

    /// Set the base thickness.
    #[must_use]
    pub fn with_base_thickness(mut self, base_thickness: f64) -> Self {
        self.base_thickness = base_thickness;
        self
    }

    /// Set the STL header text.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Highest z-coordinate a vertex can reach.
    #[must_use]
    pub fn max_z(&self) -> f64 {
        self.base_thickness + self.base_offset + self.print_height
    }

    /// Check every dimension is finite and in range.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidParameter`] naming the first value that
    /// is non-finite, non-positive (`print_height`, `print_width`,
    /// `base_thickness`) or negative (`base_offset`).
    pub fn validate(&self) -> TerrainResult<()> {
        require_positive("print_height", self.print_height)?;
        require_positive("print_width", self.print_width)?;
        require_non_negative("base_offset", self.base_offset)?;
        require_positive("base_thickness", self.base_thickness)?;
        Ok(())
    }
}

fn require_positive(name: &'static str, value: f64) -> TerrainResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TerrainError::InvalidParameter {
            name,
            value,
            requirement: "must be a finite value greater than zero",
        })
    }
}

fn require_non_negative(name: &'static str, value: f64) -> TerrainResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TerrainError::InvalidParameter {
            name,
            value,
            requirement: "must be a finite value of zero or more",
        })
    }
}

/// Print parameters as supplied by a configuration source, any of which may
/// be unset.
///
/// With the `serde` feature this deserializes from a flat JSON object such as:
///
/// ```json
/// {
///     "print_height": 5.0,
///     "print_width": 130.0,
///     "base_offset": 0.5,
///     "base_thickness": 1.0,
///     "header": "Lake District from NASA SRTM"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct PartialParams {
    /// Print height in mm.
    pub print_height: Option<f64>,
    /// Print width in mm.
    pub print_width: Option<f64>,
    /// Base offset in mm.
    pub base_offset: Option<f64>,
    /// Base thickness in mm.
    pub base_thickness: Option<f64>,
    /// STL header text.
    pub header: Option<String>,
}

impl PartialParams {
    /// Overlay every value set in `other` onto `self`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            print_height: other.print_height.or(self.print_height),
            print_width: other.print_width.or(self.print_width),
            base_offset: other.base_offset.or(self.base_offset),
            base_thickness: other.base_thickness.or(self.base_thickness),
            header: other.header.or(self.header),
        }
    }

    /// Turn into validated [`TerrainParams`].
    ///
    /// The header falls back to [`DEFAULT_HEADER`]; every numeric value is
    /// required.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::MissingParameter`] for the first unset
    /// numeric value, or any error from [`TerrainParams::validate`].
    pub fn resolve(self) -> TerrainResult<TerrainParams> {
        let params = TerrainParams {
            print_height: required("print_height", self.print_height)?,
            print_width: required("print_width", self.print_width)?,
            base_offset: required("base_offset", self.base_offset)?,
            base_thickness: required("base_thickness", self.base_thickness)?,
            header: self.header.unwrap_or_else(|| DEFAULT_HEADER.to_string()),
        };
        params.validate()?;
        Ok(params)
    }
}

impl From<TerrainParams> for PartialParams {
    fn from(params: TerrainParams) -> Self {
        Self {
            print_height: Some(params.print_height),
            print_width: Some(params.print_width),
            base_offset: Some(params.base_offset),
            base_thickness: Some(params.base_thickness),
            header: Some(params.header),
        }
    }
}

fn required(name: &'static str, value: Option<f64>) -> TerrainResult<f64> {
    value.ok_or(TerrainError::MissingParameter { name })
}
