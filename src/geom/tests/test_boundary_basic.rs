//! Tests for boundary triangle detection.

use super::unit_cube;
use crate::geom::{
    FaceIndexMapping, GeomContext, IncrementalMesher, MeshParameters, TriangleSegment,
    convert_to_mesh_with_face_mapping, identify_boundary_triangles, triangle_face_map,
};

#[test]
fn assembled_cube_has_no_boundary_triangles() {
    let (_, mapping, _) = convert_to_mesh_with_face_mapping(
        &unit_cube(),
        &MeshParameters::new(0.1, 0.5),
        &IncrementalMesher::default(),
        &mut GeomContext::new(),
    )
    .expect("convert");

    assert!(identify_boundary_triangles(&mapping).is_empty());
    let owners = triangle_face_map(&mapping);
    assert_eq!(owners.len(), 12);
    assert!(owners.values().all(|faces| faces.len() == 1));
}

#[test]
fn triangles_claimed_by_two_faces_are_reported() {
    let mapping = FaceIndexMapping::from_segments(vec![
        TriangleSegment::new(0, vec![0, 1, 2]),
        TriangleSegment::new(1, vec![2, 3]),
        TriangleSegment::new(2, vec![3, 4, 2]),
    ]);

    let boundary = identify_boundary_triangles(&mapping);
    assert_eq!(boundary.len(), 2);

    assert_eq!(boundary[0].triangle_index, 2);
    assert_eq!(boundary[0].face_ids, vec![0, 1, 2]);
    assert!(boundary[0].is_boundary);

    assert_eq!(boundary[1].triangle_index, 3);
    assert_eq!(boundary[1].face_ids, vec![1, 2]);
}

#[test]
fn repeated_claims_by_one_face_are_not_a_boundary() {
    let mapping = FaceIndexMapping::from_segments(vec![
        TriangleSegment::new(4, vec![0, 0]),
        TriangleSegment::new(4, vec![0]),
    ]);

    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping.triangles_for_face(4), &[0]);
    assert!(identify_boundary_triangles(&mapping).is_empty());
    assert_eq!(triangle_face_map(&mapping)[&0], vec![4]);
}

#[test]
fn empty_mapping_has_no_boundary() {
    assert!(identify_boundary_triangles(&FaceIndexMapping::default()).is_empty());
}
