//! Tests for Loop subdivision.

use super::{signed_area_xy, single_triangle, tetrahedron};
use crate::geom::{SubdivisionError, TriangleMesh, loop_beta, subdivide_loop};

#[test]
fn loop_weights() {
    assert!((loop_beta(3) - 3.0 / 16.0).abs() < f64::EPSILON);
    assert!((loop_beta(6) - 1.0 / 16.0).abs() < f64::EPSILON);
    assert!((loop_beta(4) - 3.0 / 32.0).abs() < f64::EPSILON);
}

#[test]
fn zero_levels_is_a_copy() {
    let mesh = tetrahedron();
    let (refined, diagnostics) = subdivide_loop(&mesh, 0).expect("subdivide");
    assert_eq!(refined, mesh);
    assert_eq!(diagnostics.levels, 0);
    assert_eq!(diagnostics.output_triangle_count, 4);
}

#[test]
fn one_level_splits_each_triangle_in_four() {
    let (refined, diagnostics) = subdivide_loop(&single_triangle(), 1).expect("subdivide");

    assert_eq!(refined.triangle_count(), 4);
    assert_eq!(refined.vertex_count(), 6);
    assert_eq!(diagnostics.levels, 1);
    assert_eq!(diagnostics.input_triangle_count, 1);
    assert_eq!(diagnostics.output_vertex_count, 6);
    refined.validate().expect("valid");

    // First new vertex is the midpoint of edge 0-1.
    assert_eq!(refined.positions[3], [0.5, 0.0, 0.0]);

    for [a, b, c] in refined.triangles() {
        let area = signed_area_xy(
            refined.positions[a as usize],
            refined.positions[b as usize],
            refined.positions[c as usize],
        );
        assert!(area > 0.0, "winding flipped: {area}");
    }
}

#[test]
fn two_levels_give_sixteen_triangles() {
    let (refined, diagnostics) = subdivide_loop(&single_triangle(), 2).expect("subdivide");
    assert_eq!(refined.triangle_count(), 16);
    // 6 vertices and 9 edges after the first level.
    assert_eq!(refined.vertex_count(), 15);
    assert_eq!(diagnostics.levels, 2);
    assert_eq!(refined.normals.as_ref().map(Vec::len), Some(15));
}

#[test]
fn closed_mesh_stays_closed_and_shrinks() {
    let mesh = tetrahedron();
    let (refined, _) = subdivide_loop(&mesh, 1).expect("subdivide");

    assert_eq!(refined.vertex_count(), 4 + 6);
    assert_eq!(refined.triangle_count(), 16);
    assert!(refined.edge_topology().is_closed_manifold());

    let volume = refined.signed_volume();
    assert!(volume > 0.0);
    assert!(volume < mesh.signed_volume());
}

#[test]
fn malformed_meshes_are_rejected() {
    let ragged = TriangleMesh::new(vec![[0.0; 3]; 3], vec![0, 1]);
    assert_eq!(
        subdivide_loop(&ragged, 1),
        Err(SubdivisionError::NotATriangleList(2))
    );

    let dangling = TriangleMesh::new(vec![[0.0; 3]; 3], vec![0, 1, 5]);
    let err = subdivide_loop(&dangling, 1).expect_err("dangling index");
    assert_eq!(
        err,
        SubdivisionError::InvalidIndex {
            triangle: 0,
            index: 5,
            vertex_count: 3,
        }
    );
    assert_eq!(
        err.to_string(),
        "Invalid index: triangle 0 references vertex 5 of 3"
    );
}

#[test]
fn malformed_meshes_pass_through_at_zero_levels() {
    let ragged = TriangleMesh::new(vec![[0.0; 3]; 3], vec![0, 1]);
    let (refined, _) = subdivide_loop(&ragged, 0).expect("no work");
    assert_eq!(refined, ragged);
}

#[test]
fn surface_parameters_are_averaged_onto_edge_points() {
    let mesh = single_triangle().with_uvs(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
    let (refined, _) = subdivide_loop(&mesh, 1).expect("subdivide");
    refined.validate().expect("valid");

    let uvs = refined.uvs.expect("uvs");
    assert_eq!(uvs.len(), 6);
    assert_eq!(&uvs[..3], &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
    assert_eq!(uvs[3], [0.5, 0.0]);
    assert!(uvs[3..].iter().all(|uv| uv.iter().all(|&c| (0.0..=1.0).contains(&c))));
}

#[test]
fn mismatched_surface_parameters_are_not_carried() {
    let mut mesh = single_triangle();
    mesh.uvs = Some(vec![[0.0, 0.0]]);
    let (refined, _) = subdivide_loop(&mesh, 1).expect("subdivide");
    assert!(refined.uvs.is_none());
}
