//! Global mesh assembly with a face-to-triangle mapping.
//!
//! Per-face triangulations are concatenated into one [`TriangleMesh`]. A
//! single writer appends each face's placed nodes behind a running base
//! offset, appends its oriented triangles, and records which global
//! triangle indices came from which face in a [`FaceIndexMapping`].
//!
//! ```ignore
//! use brep_mesh::geom::{GeomContext, IncrementalMesher, MeshParameters, convert_to_mesh_with_face_mapping};
//!
//! let mut ctx = GeomContext::new();
//! let (mesh, mapping, diagnostics) = convert_to_mesh_with_face_mapping(
//!     &shape,
//!     &MeshParameters::default(),
//!     &IncrementalMesher::default(),
//!     &mut ctx,
//! )?;
//! for segment in mapping.segments() {
//!     println!("face {}: {} triangles", segment.face_id, segment.triangle_count());
//! }
//! ```

use std::collections::{HashMap, HashSet};

use super::diagnostics::ConversionDiagnostics;
use super::mesh::{GeomContext, TriangleMesh, compute_vertex_normals};
use super::metrics::TimingBucket;
use super::tessellation::{
    FaceMesher, FaceTessellation, MeshParameters, ShapeTessellation, TessellationError,
    tessellate_shape,
};
use super::topology::Shape;

/// Global triangle indices produced by one face.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TriangleSegment {
    pub face_id: usize,
    pub triangle_indices: Vec<usize>,
}

impl TriangleSegment {
    #[must_use]
    pub fn new(face_id: usize, triangle_indices: Vec<usize>) -> Self {
        Self {
            face_id,
            triangle_indices,
        }
    }

    /// Segment for the contiguous range `start..start + count`.
    #[must_use]
    pub fn contiguous(face_id: usize, start: usize, count: usize) -> Self {
        Self::new(face_id, (start..start + count).collect())
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangle_indices.is_empty()
    }

    #[must_use]
    pub fn contains(&self, triangle_index: usize) -> bool {
        self.triangle_indices.contains(&triangle_index)
    }
}

/// Face id to triangle indices, stored as one segment per face.
///
/// Built by the assembler, every extracted face has a segment (empty if the
/// face failed) and `segments()[id].face_id == id`. Mappings built with
/// [`FaceIndexMapping::from_segments`] may break that and may list a
/// triangle under several faces, but each face id has exactly one segment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FaceIndexMapping {
    segments: Vec<TriangleSegment>,
}

impl FaceIndexMapping {
    /// Segments sharing a face id are merged into the first one, in order;
    /// a triangle repeated for the same face is kept once.
    #[must_use]
    pub fn from_segments(segments: Vec<TriangleSegment>) -> Self {
        let mut merged: Vec<TriangleSegment> = Vec::with_capacity(segments.len());
        let mut position: HashMap<usize, usize> = HashMap::with_capacity(segments.len());
        let mut seen: HashSet<(usize, usize)> = HashSet::new();

        for segment in segments {
            let slot = *position.entry(segment.face_id).or_insert_with(|| {
                merged.push(TriangleSegment::new(segment.face_id, Vec::new()));
                merged.len() - 1
            });
            let target = &mut merged[slot].triangle_indices;
            target.reserve(segment.triangle_indices.len());
            for t in segment.triangle_indices {
                if seen.insert((segment.face_id, t)) {
                    target.push(t);
                }
            }
        }
        Self { segments: merged }
    }

    #[must_use]
    pub fn segments(&self) -> &[TriangleSegment] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment recorded for `face_id`.
    #[must_use]
    pub fn segment(&self, face_id: usize) -> Option<&TriangleSegment> {
        match self.segments.get(face_id) {
            Some(segment) if segment.face_id == face_id => Some(segment),
            _ => self.segments.iter().find(|s| s.face_id == face_id),
        }
    }

    /// Triangles of `face_id`; empty for unknown faces.
    #[must_use]
    pub fn triangles_for_face(&self, face_id: usize) -> &[usize] {
        self.segment(face_id)
            .map_or(&[], |s| s.triangle_indices.as_slice())
    }

    /// First face owning `triangle_index`.
    #[must_use]
    pub fn face_for_triangle(&self, triangle_index: usize) -> Option<usize> {
        self.segments
            .iter()
            .find(|s| s.contains(triangle_index))
            .map(|s| s.face_id)
    }

    /// Sum of segment sizes.
    #[must_use]
    pub fn total_triangle_count(&self) -> usize {
        self.segments.iter().map(TriangleSegment::triangle_count).sum()
    }

    /// All mapped indices are below `triangle_count`.
    #[must_use]
    pub fn is_within(&self, triangle_count: usize) -> bool {
        self.segments
            .iter()
            .flat_map(|s| s.triangle_indices.iter())
            .all(|&t| t < triangle_count)
    }
}

/// Concatenates per-face tessellations into one mesh with vertex normals.
///
/// # Errors
/// [`TessellationError::IndexOverflow`] when the vertex count leaves the
/// `u32` range.
pub fn assemble_face_meshes(
    tessellations: &[FaceTessellation],
) -> Result<(TriangleMesh, FaceIndexMapping), TessellationError> {
    let vertex_total: usize = tessellations
        .iter()
        .map(|t| t.triangulation.as_ref().map_or(0, |r| r.node_count()))
        .sum();
    if u32::try_from(vertex_total).is_err() {
        return Err(TessellationError::IndexOverflow {
            vertex_count: vertex_total,
        });
    }

    let triangle_total: usize = tessellations.iter().map(FaceTessellation::triangle_count).sum();
    let mut positions = Vec::with_capacity(vertex_total);
    let mut indices = Vec::with_capacity(triangle_total * 3);
    let mut segments = Vec::with_capacity(tessellations.len());
    // Dropped as soon as one meshed face comes without parameters.
    let mut uvs = Some(Vec::with_capacity(vertex_total));

    for tessellation in tessellations {
        let base = super::mesh::vertex_index(positions.len());
        let start = indices.len() / 3;

        let nodes = tessellation.placed_nodes();
        if let Some(buffer) = uvs.as_mut() {
            let face_uvs = tessellation.node_uvs();
            if face_uvs.len() == nodes.len() {
                buffer.extend(face_uvs);
            } else {
                uvs = None;
            }
        }
        positions.extend(nodes.into_iter().map(<[f64; 3]>::from));
        let triangles = tessellation.oriented_triangles();
        for [a, b, c] in &triangles {
            indices.extend_from_slice(&[base + a, base + b, base + c]);
        }

        segments.push(TriangleSegment::contiguous(
            tessellation.face_id,
            start,
            triangles.len(),
        ));
    }

    let normals = compute_vertex_normals(&positions, &indices);
    let mesh = TriangleMesh {
        positions,
        indices,
        normals: Some(normals),
        uvs,
    };
    Ok((mesh, FaceIndexMapping::from_segments(segments)))
}

/// Fills the face, mesh and cache fields of a diagnostics record.
pub(crate) fn conversion_diagnostics(
    tessellation: &ShapeTessellation,
    mesh: &TriangleMesh,
    mapping: &FaceIndexMapping,
    cache_before: (usize, usize),
    ctx: &GeomContext,
) -> ConversionDiagnostics {
    let topology = mesh.edge_topology();
    let stats = ctx.cache.stats();
    let mut diagnostics = ConversionDiagnostics {
        face_count: tessellation.faces.len(),
        duplicate_face_count: tessellation.duplicate_count,
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        mapped_triangle_count: mapping.total_triangle_count(),
        open_edge_count: topology.open_edges,
        non_manifold_edge_count: topology.non_manifold_edges,
        cache_hits: stats.hits.saturating_sub(cache_before.0),
        cache_misses: stats.misses.saturating_sub(cache_before.1),
        ..ConversionDiagnostics::default()
    };

    for face_id in tessellation.failed_face_ids() {
        diagnostics.failed_face_count += 1;
        diagnostics.add_warning(format!("face {face_id} produced no triangulation"));
    }
    if diagnostics.failed_face_count > 0 {
        log::warn!(
            "{} of {} faces produced no triangulation",
            diagnostics.failed_face_count,
            diagnostics.face_count
        );
    }

    diagnostics
}

/// Tessellates `shape` and assembles the global mesh and face mapping.
///
/// An empty shape yields an empty mesh, an empty mapping and a warning.
///
/// # Errors
/// Propagates [`TessellationError`] from the tessellator or assembler.
pub fn convert_to_mesh_with_face_mapping(
    shape: &Shape,
    params: &MeshParameters,
    mesher: &dyn FaceMesher,
    ctx: &mut GeomContext,
) -> Result<(TriangleMesh, FaceIndexMapping, ConversionDiagnostics), TessellationError> {
    ctx.metrics.begin();
    let stats = ctx.cache.stats();
    let cache_before = (stats.hits, stats.misses);

    let tessellation = tessellate_shape(shape, params, mesher, ctx)?;
    let (mesh, mapping) = ctx
        .metrics
        .time(TimingBucket::Assembly, || assemble_face_meshes(&tessellation.faces))?;

    let mut diagnostics = conversion_diagnostics(&tessellation, &mesh, &mapping, cache_before, ctx);
    if tessellation.faces.is_empty() {
        log::warn!("shape has no faces; returning an empty mesh");
        diagnostics.add_warning("shape has no faces");
    }
    diagnostics.timing = ctx.metrics.end();
    Ok((mesh, mapping, diagnostics))
}
