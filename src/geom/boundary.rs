//! Triangles shared between faces.
//!
//! The assembler gives every triangle exactly one owner, so on its own
//! output this finds nothing. Mappings merged from other sources (or edited
//! for picking) can list a triangle under several faces; those triangles
//! sit on a face boundary and are reported here.

use std::collections::{BTreeMap, BTreeSet};

use super::assembler::FaceIndexMapping;

/// A triangle and every face that claims it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryTriangle {
    pub triangle_index: usize,
    /// Sorted, without repeats.
    pub face_ids: Vec<usize>,
    /// More than one distinct owner.
    pub is_boundary: bool,
}

/// Inverse of the face mapping: triangle index to its sorted owning faces.
#[must_use]
pub fn triangle_face_map(mapping: &FaceIndexMapping) -> BTreeMap<usize, Vec<usize>> {
    let mut owners: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
    for segment in mapping.segments() {
        for &triangle in &segment.triangle_indices {
            owners.entry(triangle).or_default().insert(segment.face_id);
        }
    }
    owners
        .into_iter()
        .map(|(triangle, faces)| (triangle, faces.into_iter().collect()))
        .collect()
}

/// Triangles with two or more distinct owning faces, by ascending index.
#[must_use]
pub fn identify_boundary_triangles(mapping: &FaceIndexMapping) -> Vec<BoundaryTriangle> {
    let boundary: Vec<BoundaryTriangle> = triangle_face_map(mapping)
        .into_iter()
        .filter(|(_, faces)| faces.len() > 1)
        .map(|(triangle_index, face_ids)| BoundaryTriangle {
            triangle_index,
            face_ids,
            is_boundary: true,
        })
        .collect();
    log::debug!("found {} boundary triangles", boundary.len());
    boundary
}
