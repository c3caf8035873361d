//! Elevation grids to printable terrain solids.
//!
//! This crate turns a rectangular grid of (east, north, elevation) samples
//! into a closed, watertight triangle mesh and writes it as binary STL for
//! 3D printing:
//!
//! - [`load_grid`] / [`parse_grid`] - Read and validate the CSV grid
//! - [`normalize_heights`] - Map elevations to print heights
//! - [`scale_planar`] - Map east/north to print width
//! - [`build_solid`] - Surface, base and walls as one closed mesh
//! - [`save_stl`] / [`write_stl_binary`] - Binary STL output
//! - [`validate_solid`] - Watertightness and winding checks
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - CLI tools
//! - Servers
//! - Batch pipelines
//!
//! # Units
//!
//! Output coordinates are millimeters. Input coordinates may be in any
//! unit; only their relative spacing is kept.
//!
//! # Example
//!
//! ```
//! use mesh_terrain::{convert_grid, parse_grid, write_stl_binary, TerrainParams};
//!
//! let csv = "\
//! 3,3,100
//! 0,60,10
//! 30,60,20
//! 60,60,-32768
//! 0,30,30
//! 30,30,40
//! 60,30,50
//! 0,0,60
//! 30,0,70
//! 60,0,80
//! ";
//!
//! let params = TerrainParams::default();
//! let grid = parse_grid(csv).unwrap();
//! let mesh = convert_grid(&grid, &params).unwrap();
//! assert_eq!(mesh.face_count(), 32);
//!
//! let mut stl = Vec::new();
//! write_stl_binary(&mesh, &params.header, &mut stl).unwrap();
//! assert_eq!(stl.len(), 1684);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod build;
mod error;
mod grid;
mod normalize;
mod params;
mod result;
mod scale;
mod stl;
mod validate;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub use build::{TerrainMesh, build_solid, expected_triangle_count};
pub use error::{ErrorKind, TerrainError, TerrainResult};
pub use grid::{HeightGrid, NO_DATA_ELEVATION, is_no_data, load_grid, parse_grid, read_grid};
pub use normalize::{HeightRange, height_range, normalize_heights};
pub use params::{DEFAULT_HEADER, PartialParams, TerrainParams};
pub use result::ConversionReport;
pub use scale::{PlanarExtent, ScaledGrid, planar_extent, scale_grid, scale_planar};
pub use stl::{
    HEADER_SIZE, TRIANGLE_SIZE, binary_stl_size, save_stl, stl_header, write_stl_binary,
};
pub use validate::{SolidReport, validate_solid};

/// Build the terrain solid for a loaded grid.
///
/// # Errors
///
/// Returns a validation error if the parameters are out of range, every
/// sample is no-data, the terrain is flat, or the plan has no extent.
pub fn convert_grid(grid: &HeightGrid, params: &TerrainParams) -> TerrainResult<TerrainMesh> {
    params.validate()?;
    let (scaled, _) = scale_grid(grid, params)?;
    build_solid(&scaled)
}

/// Default output path for an input grid: same name, `.stl` extension.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use mesh_terrain::default_output_path;
///
/// assert_eq!(
///     default_output_path("data/N50E015.csv"),
///     Path::new("data/N50E015.stl")
/// );
/// ```
#[must_use]
pub fn default_output_path<P: AsRef<Path>>(input: P) -> PathBuf {
    input.as_ref().with_extension("stl")
}

/// Convert a CSV grid file into a binary STL file.
///
/// Parameters are validated before the input is read. The output file is
/// only created once the whole mesh has been encoded; on any error nothing
/// is left at `output`.
///
/// # Errors
///
/// Returns a format error for a malformed grid, a validation error for bad
/// parameters or degenerate data, and an I/O error if the input cannot be
/// read or the output cannot be written.
///
/// # Example
///
/// ```no_run
/// use mesh_terrain::{convert_file, TerrainParams};
///
/// let params = TerrainParams::default().with_print_width(150.0);
/// let report = convert_file("S35E018.csv", "S35E018.stl", &params).unwrap();
/// println!("{report}");
/// ```
pub fn convert_file<P, Q>(
    input: P,
    output: Q,
    params: &TerrainParams,
) -> TerrainResult<ConversionReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    run_conversion(input.as_ref(), output.as_ref(), params, |_| Ok(()))
        .map(|(report, ())| report)
}

/// Convert a CSV grid file into a binary STL file, checking the solid
/// with [`validate_solid`] before anything is written.
///
/// # Errors
///
/// Everything [`convert_file`] returns, plus
/// [`TerrainError::UnprintableSolid`] if the check fails. Nothing is
/// written in that case.
pub fn convert_file_validated<P, Q>(
    input: P,
    output: Q,
    params: &TerrainParams,
) -> TerrainResult<(ConversionReport, SolidReport)>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    run_conversion(input.as_ref(), output.as_ref(), params, |mesh| {
        let solid = validate_solid(mesh);
        info!(
            edges = solid.edge_count,
            watertight = solid.is_watertight(),
            manifold = solid.is_manifold(),
            volume = solid.signed_volume,
            "Validated solid"
        );
        if !solid.is_printable() {
            warn!("{solid}");
        }
        solid.ensure_printable().map(|()| solid)
    })
}

/// Load, scale and build once, run `inspect` on the mesh, then save.
fn run_conversion<T, F>(
    input: &Path,
    output: &Path,
    params: &TerrainParams,
    inspect: F,
) -> TerrainResult<(ConversionReport, T)>
where
    F: FnOnce(&TerrainMesh) -> TerrainResult<T>,
{
    params.validate()?;

    info!(input = %input.display(), "Processing elevation grid");
    let grid = load_grid(input)?;

    let (scaled, height_range) = scale_grid(&grid, params)?;
    info!(
        points = grid.len(),
        min_height = height_range.min,
        max_height = height_range.max,
        "Scaled grid to print units"
    );

    let mesh = build_solid(&scaled)?;
    let inspected = inspect(&mesh)?;
    let triangle_count = mesh.face_count();
    info!(
        triangles = triangle_count,
        expected_bytes = binary_stl_size(triangle_count),
        "Writing STL"
    );

    let file_size = save_stl(&mesh, output, &params.header)?;
    info!(output = %output.display(), bytes = file_size, "Conversion complete");

    let report = ConversionReport {
        width: grid.width(),
        height: grid.height(),
        points: grid.len(),
        no_data_points: grid.no_data_count(),
        height_range,
        triangle_count,
        file_size,
        output: output.to_path_buf(),
    };
    Ok((report, inspected))
}
