//! Property-based tests for solid topology.
//!
//! These tests generate random grids and check that every built solid is
//! closed, consistently wound and sized as expected.
//!
//! Run with: cargo test -p mesh-terrain -- proptest

#![allow(clippy::unwrap_used)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]

use mesh_terrain::{
    HeightGrid, NO_DATA_ELEVATION, TerrainParams, binary_stl_size, build_solid,
    expected_triangle_count, scale_grid, validate_solid, write_stl_binary,
};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Elevation that is occasionally the no-data sentinel.
fn arb_elevation() -> impl Strategy<Value = f64> {
    prop_oneof![
        9 => -500.0..4000.0f64,
        1 => Just(NO_DATA_ELEVATION),
    ]
}

/// Regular grid with random spacing, orientation and elevations.
///
/// At least two samples carry distinct valid elevations, so the terrain is
/// never flat.
fn arb_grid() -> impl Strategy<Value = HeightGrid> {
    (2..12usize, 2..12usize, 1.0..100.0f64, any::<bool>()).prop_flat_map(
        |(width, height, spacing, north_down)| {
            prop::collection::vec(arb_elevation(), width * height).prop_map(move |mut elevation| {
                elevation[0] = 0.0;
                elevation[width * height - 1] = 10.0;

                let mut east = Vec::with_capacity(width * height);
                let mut north = Vec::with_capacity(width * height);
                for row in 0..height {
                    let r = if north_down { height - 1 - row } else { row };
                    for col in 0..width {
                        east.push(col as f64 * spacing);
                        north.push(r as f64 * spacing);
                    }
                }
                HeightGrid::new(width, height, east, north, elevation).unwrap()
            })
        },
    )
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_triangle_count_matches_formula(grid in arb_grid()) {
        let (scaled, _) = scale_grid(&grid, &TerrainParams::default()).unwrap();
        let mesh = build_solid(&scaled).unwrap();

        let (w, h) = (grid.width(), grid.height());
        prop_assert_eq!(mesh.face_count(), expected_triangle_count(w, h));
        prop_assert_eq!(mesh.face_count(), 4 * (w - 1) * (h - 1) + 4 * (w - 1) + 4 * (h - 1));
        prop_assert_eq!(mesh.vertex_count(), 2 * w * h);
    }

    #[test]
    fn proptest_solid_is_printable(grid in arb_grid()) {
        let (scaled, _) = scale_grid(&grid, &TerrainParams::default()).unwrap();
        let mesh = build_solid(&scaled).unwrap();
        let report = validate_solid(&mesh);

        prop_assert!(report.is_watertight(), "{}", report);
        prop_assert!(report.is_manifold(), "{}", report);
        prop_assert!(report.is_consistently_oriented(), "{}", report);
        prop_assert!(report.signed_volume > 0.0, "{}", report);
    }

    #[test]
    fn proptest_heights_within_print_volume(grid in arb_grid(), print_height in 0.5..50.0f64) {
        let params = TerrainParams::default().with_print_height(print_height);
        let (scaled, _) = scale_grid(&grid, &params).unwrap();

        for (&z, &raw) in scaled.elevation().iter().zip(grid.elevation()) {
            prop_assert!(z >= params.base_thickness);
            prop_assert!(z <= params.max_z() + 1e-9);
            if raw == NO_DATA_ELEVATION {
                prop_assert!((z - params.base_thickness).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn proptest_stl_size_exact(grid in arb_grid()) {
        let params = TerrainParams::default();
        let (scaled, _) = scale_grid(&grid, &params).unwrap();
        let mesh = build_solid(&scaled).unwrap();

        let mut bytes = Vec::new();
        write_stl_binary(&mesh, &params.header, &mut bytes).unwrap();
        prop_assert_eq!(bytes.len() as u64, binary_stl_size(mesh.face_count()));
    }
}
