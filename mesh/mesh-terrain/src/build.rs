//! Closed solid construction from a scaled grid.
//!
//! The solid has two layers of `w * h` vertices: the terrain surface and a
//! flat copy at z = 0. Faces are emitted in a fixed order:
//!
//! ```text
//! surface   2 (w-1)(h-1)   top layer, one quad per grid cell
//! base      2 (w-1)(h-1)   bottom layer, reversed winding
//! walls     4 (w-1)        first and last row
//!           4 (h-1)        first and last column
//! ```
//!
//! Quads are split along the same diagonal everywhere. Faces are
//! counter-clockwise seen from outside when north decreases along rows,
//! the usual raster layout; mirrored grids are re-wound after assembly.

// Grid sizes are checked against u32 indices before reaching this module
#![allow(clippy::cast_possible_truncation)]

use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::error::{TerrainError, TerrainResult};
use crate::scale::ScaledGrid;

/// A closed triangle mesh of a terrain print.
///
/// `vertices` holds the top layer followed by the base layer; `faces` index
/// into it with outward (counter-clockwise) winding.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMesh {
    /// Top-layer vertices, then base-layer vertices.
    pub vertices: Vec<Point3<f64>>,
    /// Triangles as vertex indices.
    pub faces: Vec<[u32; 3]>,
    grid_width: usize,
    grid_height: usize,
}

impl TerrainMesh {
    /// Samples per row of the source grid.
    #[inline]
    #[must_use]
    pub const fn grid_width(&self) -> usize {
        self.grid_width
    }

    /// Rows of the source grid.
    #[inline]
    #[must_use]
    pub const fn grid_height(&self) -> usize {
        self.grid_height
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Corner positions of a face.
    ///
    /// # Panics
    ///
    /// Panics if `face` refers to a vertex outside the buffer, which cannot
    /// happen for meshes built by [`build_solid`].
    #[inline]
    #[must_use]
    pub fn face_positions(&self, face: [u32; 3]) -> [&Point3<f64>; 3] {
        face.map(|i| &self.vertices[i as usize])
    }

    /// Signed volume by the divergence theorem.
    ///
    /// Positive when faces wind counter-clockwise seen from outside.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let sum: f64 = self
            .faces
            .iter()
            .map(|&face| {
                let [v0, v1, v2] = self.face_positions(face);
                v0.coords.dot(&v1.coords.cross(&v2.coords))
            })
            .sum();
        sum / 6.0
    }

    /// Lowest and highest z of the top layer.
    #[must_use]
    pub fn surface_z_range(&self) -> (f64, f64) {
        let top = self.grid_width * self.grid_height;
        self.vertices[..top]
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v.z), hi.max(v.z))
            })
    }

    /// Reverse the winding of every face, keeping face order.
    pub fn flip_winding(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
    }
}

/// Number of triangles in the solid built from a `width` x `height` grid.
///
/// # Example
///
/// ```
/// use mesh_terrain::expected_triangle_count;
///
/// assert_eq!(expected_triangle_count(3, 3), 32);
/// assert_eq!(expected_triangle_count(2, 2), 12);
/// ```
#[must_use]
pub const fn expected_triangle_count(width: usize, height: usize) -> usize {
    if width < 2 || height < 2 {
        return 0;
    }
    let cells = (width - 1) * (height - 1);
    2 * cells + 2 * cells + 4 * (width - 1) + 4 * (height - 1)
}

/// Two triangles per cell on the top layer.
fn surface_faces(w: u32, h: u32) -> Vec<[u32; 3]> {
    let mut faces = Vec::with_capacity(2 * ((w - 1) * (h - 1)) as usize);
    for row in 0..h - 1 {
        for col in 0..w - 1 {
            let o = row * w + col;
            faces.push([o, o + w, o + 1]);
            faces.push([o + 1, o + w, o + w + 1]);
        }
    }
    faces
}

/// Two triangles per cell on the base layer, facing down.
fn base_faces(w: u32, h: u32) -> Vec<[u32; 3]> {
    let p = w * h;
    let mut faces = Vec::with_capacity(2 * ((w - 1) * (h - 1)) as usize);
    for row in 0..h - 1 {
        for col in 0..w - 1 {
            let o = row * w + col + p;
            faces.push([o, o + 1, o + w]);
            faces.push([o + 1, o + w + 1, o + w]);
        }
    }
    faces
}

/// Strips joining the top and base layers along the four borders.
fn wall_faces(w: u32, h: u32) -> Vec<[u32; 3]> {
    let p = w * h;
    let mut faces = Vec::with_capacity((4 * (w - 1) + 4 * (h - 1)) as usize);

    // First row
    for col in 0..w - 1 {
        let o = col;
        faces.push([o, o + 1, o + p]);
        faces.push([o + 1, o + p + 1, o + p]);
    }

    // Last row
    for col in 0..w - 1 {
        let o = (h - 1) * w + col;
        faces.push([o, o + p, o + 1]);
        faces.push([o + 1, o + p, o + p + 1]);
    }

    // First column
    for row in 0..h - 1 {
        let o = row * w;
        faces.push([o, o + p, o + w]);
        faces.push([o + w, o + p, o + w + p]);
    }

    // Last column
    for row in 0..h - 1 {
        let o = row * w + w - 1;
        faces.push([o, o + w, o + p]);
        faces.push([o + w, o + w + p, o + p]);
    }

    faces
}

/// Build the closed solid for a scaled grid.
///
/// # Errors
///
/// Returns [`TerrainError::GridTooLarge`] if the two vertex layers cannot
/// be addressed with `u32` indices.
///
/// # Example
///
/// ```
/// use mesh_terrain::{build_solid, parse_grid, scale_grid, TerrainParams};
///
/// let grid = parse_grid("2,2,10\n0,1,5\n1,1,6\n0,0,7\n1,0,8\n").unwrap();
/// let (scaled, _) = scale_grid(&grid, &TerrainParams::default()).unwrap();
/// let mesh = build_solid(&scaled).unwrap();
///
/// assert_eq!(mesh.vertex_count(), 8);
/// assert_eq!(mesh.face_count(), 12);
/// assert!(mesh.signed_volume() > 0.0);
/// ```
pub fn build_solid(grid: &ScaledGrid) -> TerrainResult<TerrainMesh> {
    let (width, height) = (grid.width(), grid.height());
    let points = grid.len();

    let index = |n: usize| {
        u32::try_from(n).map_err(|_| TerrainError::GridTooLarge { width, height })
    };
    let w = index(width)?;
    let h = index(height)?;
    index(points.checked_mul(2).unwrap_or(usize::MAX))?;

    info!(width, height, "Building terrain solid");

    let mut vertices = Vec::with_capacity(2 * points);
    let plan = || grid.east().iter().zip(grid.north());
    vertices.extend(
        plan()
            .zip(grid.elevation())
            .map(|((&e, &n), &z)| Point3::new(e, n, z)),
    );
    vertices.extend(plan().map(|(&e, &n)| Point3::new(e, n, 0.0)));

    let ((surface, base), walls) = rayon::join(
        || rayon::join(|| surface_faces(w, h), || base_faces(w, h)),
        || wall_faces(w, h),
    );

    let mut faces = Vec::with_capacity(surface.len() + base.len() + walls.len());
    faces.extend(surface);
    faces.extend(base);
    faces.extend(walls);

    let mut mesh = TerrainMesh {
        vertices,
        faces,
        grid_width: width,
        grid_height: height,
    };

    if mesh.signed_volume() < 0.0 {
        warn!("Grid rows run south to north; reversing face winding");
        mesh.flip_winding();
    }

    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Built terrain solid"
    );

    Ok(mesh)
}
