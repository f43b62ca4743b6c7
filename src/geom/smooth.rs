//! Crease-aware vertex normal smoothing.
//!
//! Each pass replaces a vertex normal with the average of the adjacent face
//! normals that lie within the crease angle of it. Passes read a snapshot
//! taken at the start of the pass, so the result does not depend on vertex
//! order. Vertices on an open boundary are never touched.
//!
//! ```ignore
//! use brep_mesh::geom::smooth_normals;
//!
//! let (smoothed, diagnostics) = smooth_normals(&mesh, 30.0, 2);
//! println!("{} boundary vertices frozen", diagnostics.boundary_vertex_count);
//! ```

use super::core::{Point3, Tolerance, Vec3};
use super::mesh::{TriangleMesh, compute_vertex_normals, edge_use_counts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SmoothingDiagnostics {
    pub iterations: usize,
    /// Vertices frozen because they touch an edge used by one triangle.
    pub boundary_vertex_count: usize,
    /// Triangles left out of every average.
    pub degenerate_triangle_count: usize,
    /// Vertices whose normal changed in the last pass.
    pub updated_vertex_count: usize,
}

/// Smooths vertex normals across edges flatter than `crease_angle_deg`.
///
/// Normals are computed first when the mesh has none. `iterations == 0`
/// returns the mesh unchanged.
#[must_use]
pub fn smooth_normals(
    mesh: &TriangleMesh,
    crease_angle_deg: f64,
    iterations: usize,
) -> (TriangleMesh, SmoothingDiagnostics) {
    let mut diagnostics = SmoothingDiagnostics::default();
    if iterations == 0 {
        return (mesh.clone(), diagnostics);
    }

    let vertex_count = mesh.vertex_count();
    let mut normals = match &mesh.normals {
        Some(normals) if normals.len() == vertex_count => normals.clone(),
        _ => compute_vertex_normals(&mesh.positions, &mesh.indices),
    };

    let face_normals = face_normals(mesh);
    diagnostics.degenerate_triangle_count = face_normals.iter().filter(|n| n.is_none()).count();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
    for (t, tri) in mesh.triangles().enumerate() {
        if face_normals[t].is_none() {
            continue;
        }
        for v in tri {
            adjacency[v as usize].push(t);
        }
    }

    let mut frozen = vec![false; vertex_count];
    for ((a, b), count) in edge_use_counts(&mesh.indices) {
        if count == 1 {
            for v in [a, b] {
                if let Some(flag) = frozen.get_mut(v as usize) {
                    *flag = true;
                }
            }
        }
    }
    diagnostics.boundary_vertex_count = frozen.iter().filter(|&&f| f).count();

    let cos_crease = crease_angle_deg.clamp(0.0, 180.0).to_radians().cos();

    for _ in 0..iterations {
        let snapshot = normals.clone();
        let mut updated = 0;

        for v in 0..vertex_count {
            if frozen[v] {
                continue;
            }
            let Some(current) = Vec3::from(snapshot[v]).normalized() else {
                continue;
            };

            let mut sum = Vec3::ZERO;
            let mut accepted = 0usize;
            for &t in &adjacency[v] {
                let Some(face) = face_normals[t] else {
                    continue;
                };
                if face.dot(current) >= cos_crease {
                    sum = sum + face;
                    accepted += 1;
                }
            }
            if accepted == 0 {
                continue;
            }
            if let Some(average) = sum.normalized() {
                let average = average.to_array();
                if average != snapshot[v] {
                    updated += 1;
                }
                normals[v] = average;
            }
        }

        diagnostics.iterations += 1;
        diagnostics.updated_vertex_count = updated;
    }

    log::debug!(
        "smoothed normals: {} passes, {} boundary vertices frozen, {} degenerate triangles skipped",
        diagnostics.iterations,
        diagnostics.boundary_vertex_count,
        diagnostics.degenerate_triangle_count
    );

    let smoothed = TriangleMesh {
        positions: mesh.positions.clone(),
        indices: mesh.indices.clone(),
        normals: Some(normals),
        uvs: mesh.uvs.clone(),
    };
    (smoothed, diagnostics)
}

/// Unit normal per triangle; `None` for degenerate or out-of-range triangles.
fn face_normals(mesh: &TriangleMesh) -> Vec<Option<Vec3>> {
    mesh.triangles()
        .map(|[a, b, c]| triangle_unit_normal(mesh.point(a)?, mesh.point(b)?, mesh.point(c)?))
        .collect()
}

fn triangle_unit_normal(a: Point3, b: Point3, c: Point3) -> Option<Vec3> {
    let n = b.sub_point(a).cross(c.sub_point(a));
    if n.length() <= Tolerance::ZERO_LENGTH.eps {
        None
    } else {
        n.normalized()
    }
}
