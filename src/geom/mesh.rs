//! Indexed triangle meshes and the conversion context.
//!
//! [`TriangleMesh`] is the flat output buffer: positions, a triangle index
//! list, and optional per-vertex normals and surface parameters. Around it
//! sit the analysis helpers (area, signed volume, edge topology,
//! statistics) and the repair helpers (degenerate removal, vertex welding).
//! [`GeomContext`] carries the tolerance, triangulation cache and metrics
//! through a conversion.

use std::collections::HashMap;
use std::fmt;

use super::cache::TriangulationCache;
use super::core::{BBox, Point3, Tolerance, Vec3};
use super::metrics::GeomMetrics;

/// Indexed triangle mesh: flat triangle list, three indices per triangle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriangleMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
    /// Per-vertex unit normals, when computed.
    pub normals: Option<Vec<[f64; 3]>>,
    /// Per-vertex surface parameters `(u, v)` of the face each vertex was
    /// sampled from, when every face reported them.
    pub uvs: Option<Vec<[f64; 2]>>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("mesh indices are not a triangle list (len {0} is not a multiple of 3)")]
    NotATriangleList(usize),
    #[error("mesh has invalid vertex coordinates (NaN/Inf)")]
    InvalidVertices,
    #[error("index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: u32, vertex_count: usize },
    #[error("normal buffer has {normals} entries for {vertex_count} vertices")]
    NormalCountMismatch { normals: usize, vertex_count: usize },
    #[error("uv buffer has {uvs} entries for {vertex_count} vertices")]
    UvCountMismatch { uvs: usize, vertex_count: usize },
}

impl TriangleMesh {
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            normals: None,
            uvs: None,
        }
    }

    #[must_use]
    pub fn with_normals(mut self, normals: Vec<[f64; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    #[must_use]
    pub fn with_uvs(mut self, uvs: Vec<[f64; 2]>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[must_use]
    pub fn triangle(&self, index: usize) -> Option<[u32; 3]> {
        let start = index.checked_mul(3)?;
        let tri = self.indices.get(start..start + 3)?;
        Some([tri[0], tri[1], tri[2]])
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    #[must_use]
    pub fn point(&self, index: u32) -> Option<Point3> {
        self.positions.get(index as usize).copied().map(Point3::from)
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
    }

    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < n)
    }

    #[must_use]
    pub fn has_triangle_indices(&self) -> bool {
        self.indices.len() % 3 == 0
    }

    /// # Errors
    /// Returns the first structural problem found.
    pub fn validate(&self) -> Result<(), MeshError> {
        if !self.has_triangle_indices() {
            return Err(MeshError::NotATriangleList(self.indices.len()));
        }
        if self.has_invalid_vertices() {
            return Err(MeshError::InvalidVertices);
        }
        let vertex_count = self.positions.len();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfBounds {
                index,
                vertex_count,
            });
        }
        if let Some(normals) = &self.normals {
            if normals.len() != vertex_count {
                return Err(MeshError::NormalCountMismatch {
                    normals: normals.len(),
                    vertex_count,
                });
            }
        }
        if let Some(uvs) = &self.uvs {
            if uvs.len() != vertex_count {
                return Err(MeshError::UvCountMismatch {
                    uvs: uvs.len(),
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Unnormalised `(b - a) × (c - a)`; its length is twice the area.
    #[must_use]
    pub fn triangle_cross(&self, index: usize) -> Option<Vec3> {
        let [a, b, c] = self.triangle(index)?;
        let (a, b, c) = (self.point(a)?, self.point(b)?, self.point(c)?);
        Some(b.sub_point(a).cross(c.sub_point(a)))
    }

    /// Recomputes area-weighted vertex normals in place.
    pub fn compute_normals(&mut self) {
        self.normals = Some(compute_vertex_normals(&self.positions, &self.indices));
    }

    #[must_use]
    pub fn bounding_box(&self) -> Option<BBox> {
        let mut points = self.positions.iter().copied().map(Point3::from);
        let first = points.next()?;
        Some(points.fold(BBox::new(first, first), BBox::expand_point))
    }

    #[must_use]
    pub fn surface_area(&self) -> f64 {
        (0..self.triangle_count())
            .filter_map(|t| self.triangle_cross(t))
            .map(|n| 0.5 * n.length())
            .sum()
    }

    /// Signed enclosed volume; positive for closed meshes wound outward.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;
        for [a, b, c] in self.triangles() {
            let (Some(a), Some(b), Some(c)) = (self.point(a), self.point(b), self.point(c)) else {
                continue;
            };
            volume += a.to_vec3().dot(b.to_vec3().cross(c.to_vec3()));
        }
        volume / 6.0
    }

    /// Area-weighted centroid of the triangles.
    #[must_use]
    pub fn centroid(&self) -> Option<Point3> {
        let mut weighted = Vec3::ZERO;
        let mut total = 0.0;
        for (t, [a, b, c]) in self.triangles().enumerate() {
            let (Some(a), Some(b), Some(c)) = (self.point(a), self.point(b), self.point(c)) else {
                continue;
            };
            let area = self.triangle_cross(t).map_or(0.0, |n| 0.5 * n.length());
            let center = (a.to_vec3() + b.to_vec3() + c.to_vec3()) / 3.0;
            weighted = weighted + center * area;
            total += area;
        }
        if total > 0.0 {
            Some(Point3::from_array((weighted / total).to_array()))
        } else {
            None
        }
    }

    /// Reverses every triangle and negates stored normals.
    pub fn flip_normals(&mut self) {
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        if let Some(normals) = &mut self.normals {
            for n in normals {
                *n = [-n[0], -n[1], -n[2]];
            }
        }
    }

    /// Triangles with repeated indices or doubled area at most `tol.eps`.
    #[must_use]
    pub fn find_degenerate_triangles(&self, tol: Tolerance) -> Vec<usize> {
        self.triangles()
            .enumerate()
            .filter(|&(t, [a, b, c])| {
                a == b
                    || b == c
                    || a == c
                    || self.triangle_cross(t).is_none_or(|n| n.length() <= tol.eps)
            })
            .map(|(t, _)| t)
            .collect()
    }

    /// Copy without degenerate triangles, plus the number removed.
    #[must_use]
    pub fn remove_degenerate_triangles(&self, tol: Tolerance) -> (Self, usize) {
        let degenerate = self.find_degenerate_triangles(tol);
        if degenerate.is_empty() {
            return (self.clone(), 0);
        }
        let mut skip = degenerate.iter().copied().peekable();
        let mut indices = Vec::with_capacity(self.indices.len());
        for (t, tri) in self.triangles().enumerate() {
            if skip.peek() == Some(&t) {
                skip.next();
                continue;
            }
            indices.extend_from_slice(&tri);
        }
        let mesh = Self {
            positions: self.positions.clone(),
            indices,
            normals: self.normals.clone(),
            uvs: self.uvs.clone(),
        };
        (mesh, degenerate.len())
    }

    /// Pairs `(kept, duplicate)` of vertices closer than `tol.eps`.
    #[must_use]
    pub fn find_duplicate_vertices(&self, tol: Tolerance) -> Vec<(u32, u32)> {
        let remap = weld_remap(&self.positions, tol);
        remap
            .iter()
            .enumerate()
            .filter(|&(i, &target)| target as usize != i)
            .map(|(i, &target)| (target, vertex_index(i)))
            .collect()
    }

    /// Merges vertices closer than `tol.eps`, returning the welded mesh and
    /// the number of vertices removed. Normals are recomputed if present;
    /// each kept vertex keeps its own uv.
    #[must_use]
    pub fn weld_vertices(&self, tol: Tolerance) -> (Self, usize) {
        let remap = weld_remap(&self.positions, tol);
        let mut compact = vec![u32::MAX; self.positions.len()];
        let mut positions = Vec::with_capacity(self.positions.len());
        for (i, &target) in remap.iter().enumerate() {
            if target as usize == i {
                compact[i] = vertex_index(positions.len());
                positions.push(self.positions[i]);
            }
        }
        let indices = self
            .indices
            .iter()
            .map(|&i| {
                remap
                    .get(i as usize)
                    .map_or(i, |&target| compact[target as usize])
            })
            .collect::<Vec<_>>();
        let welded = self.positions.len() - positions.len();
        let mut mesh = Self::new(positions, indices);
        if self.normals.is_some() {
            mesh.compute_normals();
        }
        if let Some(uvs) = &self.uvs {
            let kept = remap
                .iter()
                .enumerate()
                .filter(|&(i, &target)| target as usize == i)
                .filter_map(|(i, _)| uvs.get(i).copied())
                .collect();
            mesh.uvs = Some(kept);
        }
        (mesh, welded)
    }

    #[must_use]
    pub fn edge_topology(&self) -> EdgeTopology {
        let counts = edge_use_counts(&self.indices);
        let mut topology = EdgeTopology::default();
        for count in counts.into_values() {
            if count == 1 {
                topology.open_edges += 1;
            } else if count > 2 {
                topology.non_manifold_edges += 1;
            }
        }
        topology
    }

    #[must_use]
    pub fn statistics(&self) -> MeshStatistics {
        let topology = self.edge_topology();
        MeshStatistics {
            vertex_count: self.vertex_count(),
            triangle_count: self.triangle_count(),
            surface_area: self.surface_area(),
            volume: self.signed_volume().abs(),
            bounding_box_diagonal: self.bounding_box().map_or(0.0, BBox::diagonal),
            open_edge_count: topology.open_edges,
            non_manifold_edge_count: topology.non_manifold_edges,
            degenerate_triangle_count: self
                .find_degenerate_triangles(Tolerance::ZERO_LENGTH)
                .len(),
        }
    }
}

/// Open (one use) and non-manifold (more than two uses) edge counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeTopology {
    pub open_edges: usize,
    pub non_manifold_edges: usize,
}

impl EdgeTopology {
    #[must_use]
    pub const fn is_closed_manifold(&self) -> bool {
        self.open_edges == 0 && self.non_manifold_edges == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeshStatistics {
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub surface_area: f64,
    pub volume: f64,
    pub bounding_box_diagonal: f64,
    pub open_edge_count: usize,
    pub non_manifold_edge_count: usize,
    pub degenerate_triangle_count: usize,
}

impl fmt::Display for MeshStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vertices, {} triangles, area {:.6}, volume {:.6}, diagonal {:.6}",
            self.vertex_count,
            self.triangle_count,
            self.surface_area,
            self.volume,
            self.bounding_box_diagonal
        )?;
        if self.open_edge_count > 0 || self.non_manifold_edge_count > 0 {
            write!(
                f,
                ", {} open / {} non-manifold edges",
                self.open_edge_count, self.non_manifold_edge_count
            )?;
        }
        if self.degenerate_triangle_count > 0 {
            write!(f, ", {} degenerate triangles", self.degenerate_triangle_count)?;
        }
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn vertex_index(i: usize) -> u32 {
    i as u32
}

/// Unordered edge key.
#[must_use]
pub(crate) const fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Use count of every undirected edge, skipping triangles with repeated indices.
#[must_use]
pub(crate) fn edge_use_counts(indices: &[u32]) -> HashMap<(u32, u32), u32> {
    let mut counts: HashMap<(u32, u32), u32> = HashMap::new();
    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0], tri[1], tri[2]);
        if i0 == i1 || i1 == i2 || i0 == i2 {
            continue;
        }
        for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
            *counts.entry(edge_key(a, b)).or_insert(0) += 1;
        }
    }
    counts
}

/// Area-weighted vertex normals from face cross products.
///
/// Vertices whose accumulated normal vanishes (unreferenced, or only in
/// degenerate triangles) get `[0, 0, 1]`.
#[must_use]
pub fn compute_vertex_normals(positions: &[[f64; 3]], indices: &[u32]) -> Vec<[f64; 3]> {
    let mut sums = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (Some(&a), Some(&b), Some(&c)) = (positions.get(i0), positions.get(i1), positions.get(i2))
        else {
            continue;
        };
        let (a, b, c) = (Point3::from(a), Point3::from(b), Point3::from(c));
        let n = b.sub_point(a).cross(c.sub_point(a));
        for i in [i0, i1, i2] {
            sums[i] = sums[i] + n;
        }
    }

    sums.into_iter()
        .map(|n| match n.normalized() {
            Some(unit) if unit.is_finite() => unit.to_array(),
            _ => [0.0, 0.0, 1.0],
        })
        .collect()
}

/// For every vertex, the index of the first earlier vertex within `tol`
/// (or itself).
fn weld_remap(positions: &[[f64; 3]], tol: Tolerance) -> Vec<u32> {
    let mut remap: Vec<u32> = (0..positions.len()).map(vertex_index).collect();
    if !tol.eps.is_finite() || tol.eps <= 0.0 {
        return remap;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn quantize(value: f64, inv: f64) -> Option<i64> {
        if !value.is_finite() {
            return None;
        }
        let q = (value * inv).floor();
        Some(q.clamp(i64::MIN as f64, i64::MAX as f64) as i64)
    }

    let inv = 1.0 / tol.eps;
    let mut buckets: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();

    for (i, &p) in positions.iter().enumerate() {
        let point = Point3::from(p);
        let (Some(kx), Some(ky), Some(kz)) =
            (quantize(p[0], inv), quantize(p[1], inv), quantize(p[2], inv))
        else {
            continue;
        };

        let mut found = None;
        'search: for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                for dz in -1i64..=1 {
                    let (Some(x), Some(y), Some(z)) =
                        (kx.checked_add(dx), ky.checked_add(dy), kz.checked_add(dz))
                    else {
                        continue;
                    };
                    let Some(candidates) = buckets.get(&(x, y, z)) else {
                        continue;
                    };
                    if let Some(&cand) = candidates
                        .iter()
                        .find(|&&c| tol.approx_eq_point3(Point3::from(positions[c as usize]), point))
                    {
                        found = Some(cand);
                        break 'search;
                    }
                }
            }
        }

        match found {
            Some(existing) => remap[i] = existing,
            None => buckets.entry((kx, ky, kz)).or_default().push(vertex_index(i)),
        }
    }

    remap
}

/// Shared state for a conversion: tolerance, triangulation cache and timing.
#[derive(Debug)]
pub struct GeomContext {
    pub tolerance: Tolerance,
    pub cache: TriangulationCache,
    pub metrics: GeomMetrics,
}

impl GeomContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tolerance: Tolerance::default(),
            cache: TriangulationCache::default(),
            metrics: GeomMetrics::default(),
        }
    }
}

impl Default for GeomContext {
    fn default() -> Self {
        Self::new()
    }
}
