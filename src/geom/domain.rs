//! Independent per-face meshes.
//!
//! A [`FaceDomain`] holds one face's triangulation with its own point array,
//! so a face can be rendered, picked or exported without the global mesh.
//! Domains are built from the same [`FaceTessellation`]s the assembler
//! consumes; nothing is meshed twice and the winding matches.

use super::core::Point3;
use super::tessellation::FaceTessellation;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FaceDomain {
    pub face_id: usize,
    /// Placed (world) coordinates.
    pub points: Vec<Point3>,
    /// Indices into `points`.
    pub triangles: Vec<[u32; 3]>,
    /// False when the face produced no triangulation.
    pub is_valid: bool,
}

impl FaceDomain {
    /// Placeholder for a face that failed to tessellate.
    #[must_use]
    pub fn invalid(face_id: usize) -> Self {
        Self {
            face_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Flat position and index buffers, ready for upload.
    #[must_use]
    pub fn to_buffers(&self) -> (Vec<[f64; 3]>, Vec<u32>) {
        let positions = self.points.iter().map(|&p| p.to_array()).collect();
        let indices = self.triangles.iter().flatten().copied().collect();
        (positions, indices)
    }
}

/// One domain per tessellated face, in face id order.
#[must_use]
pub fn build_face_domains(tessellations: &[FaceTessellation]) -> Vec<FaceDomain> {
    tessellations
        .iter()
        .map(|tessellation| {
            if !tessellation.is_meshed() {
                return FaceDomain::invalid(tessellation.face_id);
            }
            FaceDomain {
                face_id: tessellation.face_id,
                points: tessellation.placed_nodes(),
                triangles: tessellation.oriented_triangles(),
                is_valid: true,
            }
        })
        .collect()
}
