//! Printability checks for built solids.

use hashbrown::HashMap;

use crate::build::TerrainMesh;
use crate::error::{TerrainError, TerrainResult};

/// Edge and orientation statistics of a terrain solid.
#[derive(Debug, Clone, Default)]
pub struct SolidReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Total number of faces.
    pub face_count: usize,
    /// Number of distinct undirected edges.
    pub edge_count: usize,

    /// Edges used by only one face.
    pub boundary_edge_count: usize,
    /// Edges used by more than two faces.
    pub non_manifold_edge_count: usize,
    /// Two-face edges traversed in the same direction by both faces.
    pub inconsistent_edge_count: usize,

    /// Signed volume in cubic millimeters.
    pub signed_volume: f64,
}

impl SolidReport {
    /// No boundary edges.
    #[must_use]
    pub const fn is_watertight(&self) -> bool {
        self.boundary_edge_count == 0
    }

    /// No edge shared by more than two faces.
    #[must_use]
    pub const fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Every shared edge is walked in opposite directions by its two faces.
    #[must_use]
    pub const fn is_consistently_oriented(&self) -> bool {
        self.inconsistent_edge_count == 0
    }

    /// Faces point inward.
    #[must_use]
    pub fn is_inside_out(&self) -> bool {
        self.signed_volume < 0.0
    }

    /// Watertight, manifold, consistently wound and facing outward.
    #[must_use]
    pub fn is_printable(&self) -> bool {
        self.is_watertight()
            && self.is_manifold()
            && self.is_consistently_oriented()
            && !self.is_inside_out()
    }

    /// Turn a failed check into an error.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::UnprintableSolid`] unless [`Self::is_printable`].
    pub fn ensure_printable(&self) -> TerrainResult<()> {
        if self.is_printable() {
            Ok(())
        } else {
            Err(TerrainError::UnprintableSolid {
                boundary_edges: self.boundary_edge_count,
                non_manifold_edges: self.non_manifold_edge_count,
                inconsistent_edges: self.inconsistent_edge_count,
                inside_out: self.is_inside_out(),
            })
        }
    }
}

impl std::fmt::Display for SolidReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let yes_no = |b: bool| if b { "Yes" } else { "No" };
        writeln!(f, "Solid Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;
        writeln!(f, "  Volume: {:.3} mm^3", self.signed_volume.abs())?;
        writeln!(f, "  Watertight: {}", yes_no(self.is_watertight()))?;
        writeln!(f, "  Manifold: {}", yes_no(self.is_manifold()))?;
        let winding = if self.is_consistently_oriented() {
            if self.is_inside_out() { "Inside-out" } else { "Correct" }
        } else {
            "Inconsistent"
        };
        writeln!(f, "  Winding: {winding}")?;
        if self.boundary_edge_count > 0 {
            writeln!(f, "  Boundary edges: {}", self.boundary_edge_count)?;
        }
        if self.non_manifold_edge_count > 0 {
            writeln!(f, "  Non-manifold edges: {}", self.non_manifold_edge_count)?;
        }
        if self.inconsistent_edge_count > 0 {
            writeln!(f, "  Inconsistent edges: {}", self.inconsistent_edge_count)?;
        }
        Ok(())
    }
}

/// Uses of one undirected edge, split by traversal direction.
#[derive(Debug, Default, Clone, Copy)]
struct EdgeUse {
    forward: usize,
    backward: usize,
}

/// Check a terrain solid for printability.
///
/// # Example
///
/// ```
/// use mesh_terrain::{build_solid, parse_grid, scale_grid, validate_solid, TerrainParams};
///
/// let grid = parse_grid("2,2,10\n0,1,5\n1,1,6\n0,0,7\n1,0,8\n").unwrap();
/// let (scaled, _) = scale_grid(&grid, &TerrainParams::default()).unwrap();
/// let report = validate_solid(&build_solid(&scaled).unwrap());
///
/// assert!(report.is_printable());
/// assert_eq!(report.edge_count, 18);
/// ```
#[must_use]
pub fn validate_solid(mesh: &TerrainMesh) -> SolidReport {
    let mut edges: HashMap<(u32, u32), EdgeUse> =
        HashMap::with_capacity(mesh.face_count() * 3 / 2);

    for &[a, b, c] in &mesh.faces {
        for (from, to) in [(a, b), (b, c), (c, a)] {
            let entry = edges.entry((from.min(to), from.max(to))).or_default();
            if from < to {
                entry.forward += 1;
            } else {
                entry.backward += 1;
            }
        }
    }

    let mut report = SolidReport {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        edge_count: edges.len(),
        signed_volume: mesh.signed_volume(),
        ..SolidReport::default()
    };

    for usage in edges.values() {
        match usage.forward + usage.backward {
            1 => report.boundary_edge_count += 1,
            2 if usage.forward != 1 => report.inconsistent_edge_count += 1,
            2 => {}
            _ => report.non_manifold_edge_count += 1,
        }
    }

    report
}
