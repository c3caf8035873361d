//! Binary STL encoding.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (free text, padded with spaces)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector (written as zero; readers use winding)
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (0)
//! end
//! ```
//!
//! All values are little-endian.

use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::build::TerrainMesh;
use crate::error::{TerrainError, TerrainResult};

/// STL binary header size in bytes.
pub const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
pub const TRIANGLE_SIZE: usize = 50;

/// Size of the triangle count field.
const COUNT_SIZE: usize = 4;

/// Exact file size of a binary STL with `triangle_count` triangles.
///
/// # Example
///
/// ```
/// assert_eq!(mesh_terrain::binary_stl_size(32), 1684);
/// ```
#[must_use]
pub const fn binary_stl_size(triangle_count: usize) -> u64 {
    (HEADER_SIZE + COUNT_SIZE) as u64 + (TRIANGLE_SIZE as u64) * triangle_count as u64
}

/// Build the 80-byte header from free text.
///
/// Text longer than 80 bytes is cut at the last character boundary that
/// fits; shorter text is padded with spaces.
#[must_use]
pub fn stl_header(text: &str) -> [u8; HEADER_SIZE] {
    let mut end = text.len().min(HEADER_SIZE);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    if end < text.len() {
        warn!(
            length = text.len(),
            "STL header longer than {HEADER_SIZE} bytes; truncating"
        );
    }

    let mut header = [b' '; HEADER_SIZE];
    header[..end].copy_from_slice(&text.as_bytes()[..end]);
    header
}

/// Stream a mesh as binary STL.
///
/// Triangles are written in face order with zero normals.
///
/// # Errors
///
/// Returns [`TerrainError::TooManyTriangles`] if the face count does not fit
/// in 32 bits, or an I/O error if writing fails.
pub fn write_stl_binary<W: Write>(
    mesh: &TerrainMesh,
    header: &str,
    mut writer: W,
) -> TerrainResult<()> {
    let face_count = u32::try_from(mesh.face_count()).map_err(|_| {
        TerrainError::TooManyTriangles {
            count: mesh.face_count(),
        }
    })?;

    writer.write_all(&stl_header(header))?;
    writer.write_all(&face_count.to_le_bytes())?;

    let mut record = [0u8; TRIANGLE_SIZE];
    for &face in &mesh.faces {
        // Normal (bytes 0..12) and attribute (48..50) stay zero
        for (slot, vertex) in mesh.face_positions(face).into_iter().enumerate() {
            let offset = 12 + slot * 12;
            encode_vertex(&mut record[offset..offset + 12], vertex);
        }
        writer.write_all(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write a vertex as 3 f32s in little-endian.
#[allow(clippy::cast_possible_truncation)]
// Truncation: f64 to f32 is intentional for STL format
fn encode_vertex(buf: &mut [u8], vertex: &Point3<f64>) {
    for (chunk, value) in buf.chunks_exact_mut(4).zip([vertex.x, vertex.y, vertex.z]) {
        chunk.copy_from_slice(&(value as f32).to_le_bytes());
    }
}

/// Save a mesh as binary STL.
///
/// The file is written next to `path` under a temporary name and renamed
/// into place once complete, so a failed write never leaves a partial file
/// at `path`. Returns the number of bytes written.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, written or
/// renamed, or if the mesh has too many triangles.
///
/// # Example
///
/// ```no_run
/// use mesh_terrain::{build_solid, load_grid, save_stl, scale_grid, TerrainParams};
///
/// let params = TerrainParams::default();
/// let grid = load_grid("N54W004.csv").unwrap();
/// let (scaled, _) = scale_grid(&grid, &params).unwrap();
/// let mesh = build_solid(&scaled).unwrap();
/// save_stl(&mesh, "N54W004.stl", &params.header).unwrap();
/// ```
pub fn save_stl<P: AsRef<Path>>(
    mesh: &TerrainMesh,
    path: P,
    header: &str,
) -> TerrainResult<u64> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    write_stl_binary(mesh, header, BufWriter::new(temp.as_file_mut()))?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| TerrainError::Io(e.error))?;

    let size = binary_stl_size(mesh.face_count());
    debug!(path = %path.display(), bytes = size, "Wrote binary STL");
    Ok(size)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::cast_possible_truncation
)]
mod tests {
    use super::*;
    use crate::build::build_solid;
    use crate::grid::parse_grid;
    use crate::params::TerrainParams;
    use crate::scale::scale_grid;

    fn small_mesh() -> TerrainMesh {
        let grid = parse_grid("2,2,10\n0,1,5\n1,1,6\n0,0,7\n1,0,8\n").unwrap();
        let (scaled, _) = scale_grid(&grid, &TerrainParams::default()).unwrap();
        build_solid(&scaled).unwrap()
    }

    fn read_f32(bytes: &[u8], offset: usize) -> f32 {
        f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn header_is_padded() {
        let header = stl_header("Hello");
        assert_eq!(&header[..5], b"Hello");
        assert!(header[5..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn long_header_is_truncated_on_char_boundary() {
        let text = format!("{}é", "x".repeat(79));
        let header = stl_header(&text);
        assert_eq!(header.len(), HEADER_SIZE);
        assert!(header[..79].iter().all(|&b| b == b'x'));
        assert_eq!(header[79], b' ');
    }

    #[test]
    fn layout_matches_format() {
        let mesh = small_mesh();
        let mut bytes = Vec::new();
        write_stl_binary(&mesh, "test", &mut bytes).unwrap();

        assert_eq!(bytes.len() as u64, binary_stl_size(mesh.face_count()));
        let count = u32::from_le_bytes(bytes[80..84].try_into().unwrap());
        assert_eq!(count as usize, mesh.face_count());

        // First record: zero normal, then the first face's vertices
        let record = &bytes[84..84 + TRIANGLE_SIZE];
        assert!(record[..12].iter().all(|&b| b == 0));
        assert!(record[48..].iter().all(|&b| b == 0));

        let [v0, v1, v2] = mesh.face_positions(mesh.faces[0]);
        for (slot, v) in [v0, v1, v2].into_iter().enumerate() {
            let base = 84 + 12 + slot * 12;
            assert_eq!(read_f32(&bytes, base), v.x as f32);
            assert_eq!(read_f32(&bytes, base + 4), v.y as f32);
            assert_eq!(read_f32(&bytes, base + 8), v.z as f32);
        }
    }

    #[test]
    fn save_creates_exact_file() {
        let mesh = small_mesh();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terrain.stl");

        let written = save_stl(&mesh, &path, "test").unwrap();
        let on_disk = std::fs::metadata(&path).unwrap().len();
        assert_eq!(written, on_disk);
        assert_eq!(on_disk, 84 + 50 * 12);

        // Only the final file remains in the directory
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let mesh = small_mesh();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("terrain.stl");

        let err = save_stl(&mesh, &path, "test").unwrap_err();
        assert!(matches!(err, TerrainError::Io(_)));
        assert!(!path.exists());
    }
}
