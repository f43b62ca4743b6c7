//! Loop subdivision for display refinement.
//!
//! Each level moves every original vertex towards its 1-ring with the Loop
//! weights, inserts one midpoint vertex per undirected edge, and splits each
//! triangle into four with the same winding. Vertex normals are recomputed
//! once after the last level. Surface parameters, when present, stay on
//! the original vertices and are averaged onto the edge points.
//!
//! Edge points sit at plain edge midpoints, not the 3/8-1/8 Loop stencil.
//!
//! # Example
//! ```ignore
//! use brep_mesh::geom::subdivide_loop;
//!
//! let (refined, diagnostics) = subdivide_loop(&mesh, 2)?;
//! assert_eq!(refined.triangle_count(), mesh.triangle_count() * 16);
//! ```

use std::collections::{BTreeSet, HashMap};

use super::core::{Point3, Vec3};
use super::mesh::{TriangleMesh, compute_vertex_normals, edge_key};

// ============================================================================
// Error types
// ============================================================================

/// Errors that can occur during subdivision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubdivisionError {
    /// Index list is not a multiple of three.
    NotATriangleList(usize),
    /// A triangle references a vertex that does not exist.
    InvalidIndex {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
    /// The refined mesh would not fit in `u32` indices.
    TooManyVertices(usize),
}

impl std::fmt::Display for SubdivisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotATriangleList(len) => {
                write!(f, "Not a triangle list: {len} indices")
            }
            Self::InvalidIndex {
                triangle,
                index,
                vertex_count,
            } => write!(
                f,
                "Invalid index: triangle {triangle} references vertex {index} of {vertex_count}"
            ),
            Self::TooManyVertices(count) => {
                write!(f, "Too many vertices: {count} exceeds the u32 index range")
            }
        }
    }
}

impl std::error::Error for SubdivisionError {}

// ============================================================================
// Diagnostics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubdivisionDiagnostics {
    pub levels: usize,
    pub input_vertex_count: usize,
    pub input_triangle_count: usize,
    pub output_vertex_count: usize,
    pub output_triangle_count: usize,
}

// ============================================================================
// Loop subdivision
// ============================================================================

/// Loop vertex weight β for a vertex with `valence` neighbours.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn loop_beta(valence: usize) -> f64 {
    if valence == 3 {
        3.0 / 16.0
    } else {
        3.0 / (8.0 * valence as f64)
    }
}

/// Applies `levels` rounds of Loop subdivision.
///
/// `levels == 0` returns the mesh unchanged (normals included).
///
/// # Errors
/// Returns [`SubdivisionError`] for malformed index buffers or when the
/// result would overflow `u32` indices.
pub fn subdivide_loop(
    mesh: &TriangleMesh,
    levels: usize,
) -> Result<(TriangleMesh, SubdivisionDiagnostics), SubdivisionError> {
    let mut diagnostics = SubdivisionDiagnostics {
        levels: 0,
        input_vertex_count: mesh.vertex_count(),
        input_triangle_count: mesh.triangle_count(),
        output_vertex_count: mesh.vertex_count(),
        output_triangle_count: mesh.triangle_count(),
    };
    if levels == 0 {
        return Ok((mesh.clone(), diagnostics));
    }

    validate_indices(mesh)?;

    let mut positions: Vec<Point3> = mesh.positions.iter().copied().map(Point3::from).collect();
    let mut triangles: Vec<[u32; 3]> = mesh.triangles().collect();
    let mut uvs = mesh
        .uvs
        .clone()
        .filter(|uvs| uvs.len() == mesh.vertex_count());

    for _ in 0..levels {
        let level = subdivide_once(&positions, uvs.as_deref(), &triangles)?;
        positions = level.positions;
        uvs = level.uvs;
        triangles = level.triangles;
        diagnostics.levels += 1;
    }

    let positions: Vec<[f64; 3]> = positions.into_iter().map(Point3::to_array).collect();
    let indices: Vec<u32> = triangles.into_iter().flatten().collect();
    let normals = compute_vertex_normals(&positions, &indices);
    let refined = TriangleMesh {
        positions,
        indices,
        normals: Some(normals),
        uvs,
    };

    diagnostics.output_vertex_count = refined.vertex_count();
    diagnostics.output_triangle_count = refined.triangle_count();
    log::debug!(
        "loop subdivision x{}: {} -> {} triangles",
        diagnostics.levels,
        diagnostics.input_triangle_count,
        diagnostics.output_triangle_count
    );
    Ok((refined, diagnostics))
}

fn validate_indices(mesh: &TriangleMesh) -> Result<(), SubdivisionError> {
    if !mesh.has_triangle_indices() {
        return Err(SubdivisionError::NotATriangleList(mesh.indices.len()));
    }
    let vertex_count = mesh.vertex_count();
    for (triangle, tri) in mesh.triangles().enumerate() {
        if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(SubdivisionError::InvalidIndex {
                triangle,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}

fn to_index(i: usize) -> Result<u32, SubdivisionError> {
    u32::try_from(i).map_err(|_| SubdivisionError::TooManyVertices(i))
}

struct Level {
    positions: Vec<Point3>,
    uvs: Option<Vec<[f64; 2]>>,
    triangles: Vec<[u32; 3]>,
}

/// One level; indices must already be valid.
fn subdivide_once(
    positions: &[Point3],
    uvs: Option<&[[f64; 2]]>,
    triangles: &[[u32; 3]],
) -> Result<Level, SubdivisionError> {
    let mut neighbours: Vec<BTreeSet<u32>> = vec![BTreeSet::new(); positions.len()];
    for &[a, b, c] in triangles {
        for (p, q) in [(a, b), (b, c), (c, a)] {
            if p != q {
                neighbours[p as usize].insert(q);
                neighbours[q as usize].insert(p);
            }
        }
    }

    let mut next: Vec<Point3> = positions
        .iter()
        .zip(&neighbours)
        .map(|(&v, ring)| {
            let n = ring.len();
            if n == 0 {
                return v;
            }
            let beta = loop_beta(n);
            let sum = ring
                .iter()
                .fold(Vec3::ZERO, |acc, &q| acc + positions[q as usize].to_vec3());
            #[allow(clippy::cast_precision_loss)]
            let weight = 1.0 - n as f64 * beta;
            Point3::from_array((v.to_vec3() * weight + sum * beta).to_array())
        })
        .collect();

    let mut next_uvs = uvs.map(<[[f64; 2]]>::to_vec);
    let mut edge_points: HashMap<(u32, u32), u32> = HashMap::new();
    let mut midpoint = |a: u32,
                        b: u32,
                        next: &mut Vec<Point3>,
                        next_uvs: &mut Option<Vec<[f64; 2]>>|
     -> Result<u32, SubdivisionError> {
        let key = edge_key(a, b);
        if let Some(&index) = edge_points.get(&key) {
            return Ok(index);
        }
        let index = to_index(next.len())?;
        next.push(positions[a as usize].lerp(positions[b as usize], 0.5));
        if let (Some(out), Some(uvs)) = (next_uvs.as_mut(), uvs) {
            let (p, q) = (uvs[a as usize], uvs[b as usize]);
            out.push([0.5 * (p[0] + q[0]), 0.5 * (p[1] + q[1])]);
        }
        edge_points.insert(key, index);
        Ok(index)
    };

    let mut refined = Vec::with_capacity(triangles.len() * 4);
    for &[a, b, c] in triangles {
        let ab = midpoint(a, b, &mut next, &mut next_uvs)?;
        let bc = midpoint(b, c, &mut next, &mut next_uvs)?;
        let ca = midpoint(c, a, &mut next, &mut next_uvs)?;
        refined.push([a, ab, ca]);
        refined.push([ab, b, bc]);
        refined.push([ca, bc, c]);
        refined.push([ab, bc, ca]);
    }

    Ok(Level {
        positions: next,
        uvs: next_uvs,
        triangles: refined,
    })
}
