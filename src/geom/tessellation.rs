//! Per-face tessellation of B-rep shapes.
//!
//! Each unique face is handed to a [`FaceMesher`], which returns a
//! [`RawTriangulation`] in face-local coordinates. Results are cached in
//! the [`GeomContext`]'s [`TriangulationCache`] keyed by face geometry,
//! [`MeshParameters`] and the mesher's [`FaceMesher::cache_tag`], then
//! placed and oriented per face.
//!
//! The default mesher, [`IncrementalMesher`], samples the face on a UV grid
//! and doubles the grid until the chord deviation and the normal angle
//! between neighbouring samples fall under the requested bounds.
//!
//! ```ignore
//! use brep_mesh::geom::{GeomContext, IncrementalMesher, MeshParameters, tessellate_shape};
//!
//! let mut ctx = GeomContext::new();
//! let params = MeshParameters::default();
//! let tessellation = tessellate_shape(&shape, &params, &IncrementalMesher::default(), &mut ctx)?;
//! for face in &tessellation.faces {
//!     println!("face {} -> {} triangles", face.face_id, face.triangle_count());
//! }
//! ```

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::cache::TriangulationKey;
use super::core::{BBox, Point3, Tolerance, Vec3};
use super::mesh::GeomContext;
use super::metrics::TimingBucket;
use super::surface::Surface;
use super::topology::{Face, FaceGeometry, Shape, explore_faces};
use super::triangulation::{
    GridTopology, compact_nodes, cull_degenerate_triangles, triangulate_surface_grid,
};

// ─────────────────────────────────────────────────────────────────────────────
// Parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Meshing tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshParameters {
    /// Maximum chord deviation; absolute, or a fraction of face size when
    /// `relative` is set.
    pub deflection: f64,
    /// Maximum angle in radians between normals of neighbouring samples.
    pub angular_deflection: f64,
    pub relative: bool,
    /// Mesh faces concurrently (needs the `parallel` feature).
    pub in_parallel: bool,
}

impl Default for MeshParameters {
    fn default() -> Self {
        Self {
            deflection: 0.1,
            angular_deflection: 0.5,
            relative: false,
            in_parallel: true,
        }
    }
}

impl MeshParameters {
    #[must_use]
    pub fn new(deflection: f64, angular_deflection: f64) -> Self {
        Self {
            deflection,
            angular_deflection,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_relative(mut self, relative: bool) -> Self {
        self.relative = relative;
        self
    }

    #[must_use]
    pub const fn with_parallel(mut self, in_parallel: bool) -> Self {
        self.in_parallel = in_parallel;
        self
    }

    /// Cache identity; `in_parallel` does not change results and is left out.
    #[must_use]
    pub(crate) fn cache_bits(&self) -> ([u64; 2], bool) {
        (
            [self.deflection.to_bits(), self.angular_deflection.to_bits()],
            self.relative,
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failure of the meshing kernel on a single face.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum KernelError {
    #[error("uv domain is malformed: [{u_min}, {u_max}] x [{v_min}, {v_max}]")]
    MalformedDomain {
        u_min: f64,
        u_max: f64,
        v_min: f64,
        v_max: f64,
    },
    #[error("surface evaluates to non-finite points")]
    NonFiniteGeometry,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum TessellationError {
    #[error("face {face_id}: {source}")]
    Kernel {
        face_id: usize,
        #[source]
        source: KernelError,
    },
    #[error("face {face_id} has a singular or non-finite placement")]
    SingularPlacement { face_id: usize },
    #[error("mesh has {vertex_count} vertices, beyond the u32 index range")]
    IndexOverflow { vertex_count: usize },
}

// ─────────────────────────────────────────────────────────────────────────────
// Mesher
// ─────────────────────────────────────────────────────────────────────────────

/// Triangulation of one face in face-local coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTriangulation {
    pub nodes: Vec<Point3>,
    /// Counter-clockwise in UV, so normals follow `∂u × ∂v`.
    pub triangles: Vec<[u32; 3]>,
    /// Surface parameters of each node; empty when the mesher has none.
    pub uvs: Vec<[f64; 2]>,
}

impl RawTriangulation {
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// One uv per node.
    #[must_use]
    pub fn has_uvs(&self) -> bool {
        !self.nodes.is_empty() && self.uvs.len() == self.nodes.len()
    }
}

/// The meshing kernel: triangulates a single face.
///
/// `Ok(None)` means the face yields no triangles (degenerate domain or every
/// triangle culled); it is not an error.
pub trait FaceMesher: Send + Sync {
    fn triangulate(
        &self,
        face: &FaceGeometry,
        params: &MeshParameters,
    ) -> Result<Option<RawTriangulation>, KernelError>;

    /// Identifies this mesher's output in the triangulation cache.
    ///
    /// Defaults to the implementing type. Meshers whose output depends on
    /// their own settings must mix those in.
    fn cache_tag(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        std::any::type_name::<Self>().hash(&mut hasher);
        hasher.finish()
    }
}

/// Limits for [`choose_surface_grid_counts`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceTessellationOptions {
    /// Chord deviation bound. Non-finite or `<= 0` disables the check.
    pub max_deviation: f64,
    /// Normal angle bound in radians. Non-finite or `<= 0` disables the check.
    pub max_angle: f64,
    pub max_u_count: usize,
    pub max_v_count: usize,
    pub max_iterations: usize,
}

impl Default for SurfaceTessellationOptions {
    fn default() -> Self {
        Self::new(0.1, 0.5)
    }
}

impl SurfaceTessellationOptions {
    #[must_use]
    pub const fn new(max_deviation: f64, max_angle: f64) -> Self {
        Self {
            max_deviation,
            max_angle,
            max_u_count: 256,
            max_v_count: 256,
            max_iterations: 16,
        }
    }
}

/// Grid-refining mesher used by default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncrementalMesher {
    pub max_u_count: usize,
    pub max_v_count: usize,
    pub max_iterations: usize,
    /// Triangles with a smaller doubled area are culled.
    pub tolerance: Tolerance,
}

impl Default for IncrementalMesher {
    fn default() -> Self {
        Self {
            max_u_count: 256,
            max_v_count: 256,
            max_iterations: 16,
            tolerance: Tolerance::ZERO_LENGTH,
        }
    }
}

impl FaceMesher for IncrementalMesher {
    fn triangulate(
        &self,
        face: &FaceGeometry,
        params: &MeshParameters,
    ) -> Result<Option<RawTriangulation>, KernelError> {
        let domain = face.domain();
        if !domain.is_valid() {
            return Err(KernelError::MalformedDomain {
                u_min: domain.u_min,
                u_max: domain.u_max,
                v_min: domain.v_min,
                v_max: domain.v_max,
            });
        }
        if domain.is_degenerate() {
            return Ok(None);
        }

        let deflection = if params.relative {
            let size = face_size(face);
            if size > 0.0 { params.deflection * size } else { params.deflection }
        } else {
            params.deflection
        };

        let options = SurfaceTessellationOptions {
            max_deviation: deflection,
            max_angle: params.angular_deflection,
            max_u_count: self.max_u_count,
            max_v_count: self.max_v_count,
            max_iterations: self.max_iterations,
        };
        let (u_count, v_count) = choose_surface_grid_counts(face, options);
        let topology = grid_topology(face);

        let params_uv = sample_grid_parameters(face, u_count, v_count, topology);
        let points: Vec<Point3> = params_uv.iter().map(|&[u, v]| face.point_at(u, v)).collect();
        if points.iter().any(|p| !p.is_finite()) {
            return Err(KernelError::NonFiniteGeometry);
        }

        let triangles = triangulate_surface_grid(u_count, v_count, topology);
        let (mut triangles, culled) = cull_degenerate_triangles(&points, &triangles, self.tolerance);
        if culled > 0 {
            log::debug!("culled {culled} degenerate triangles from {:?} face", face.kind());
        }
        if triangles.is_empty() {
            return Ok(None);
        }
        let samples: Vec<(Point3, [f64; 2])> = points.into_iter().zip(params_uv).collect();
        let (nodes, uvs) = compact_nodes(&samples, &mut triangles).into_iter().unzip();

        Ok(Some(RawTriangulation {
            nodes,
            triangles,
            uvs,
        }))
    }

    fn cache_tag(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        std::any::type_name::<Self>().hash(&mut hasher);
        self.max_u_count.hash(&mut hasher);
        self.max_v_count.hash(&mut hasher);
        self.max_iterations.hash(&mut hasher);
        self.tolerance.eps.to_bits().hash(&mut hasher);
        hasher.finish()
    }
}

fn grid_topology(surface: &impl Surface) -> GridTopology {
    GridTopology {
        wrap_u: surface.is_u_closed(),
        wrap_v: surface.is_v_closed(),
        pole_v_start: surface.pole_v_start(),
        pole_v_end: surface.pole_v_end(),
    }
}

/// Largest bounding-box extent of a coarse sample of the face.
fn face_size(surface: &impl Surface) -> f64 {
    const SAMPLES: usize = 9;
    let (u0, u1) = surface.domain_u();
    let (v0, v1) = surface.domain_v();
    let mut points = Vec::with_capacity(SAMPLES * SAMPLES);
    for j in 0..SAMPLES {
        let v = v0 + (v1 - v0) * fraction(j, SAMPLES - 1);
        for i in 0..SAMPLES {
            let u = u0 + (u1 - u0) * fraction(i, SAMPLES - 1);
            points.push(surface.point_at(u, v));
        }
    }
    BBox::from_points(&points).map_or(0.0, BBox::max_extent)
}

#[allow(clippy::cast_precision_loss)]
fn fraction(index: usize, count: usize) -> f64 {
    if count == 0 { 0.0 } else { index as f64 / count as f64 }
}

// ─────────────────────────────────────────────────────────────────────────────
// Adaptive grid resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Chooses grid sample counts for `surface`.
///
/// Starts at the minimal grid for the surface's seam/pole layout and
/// doubles the segment count of each direction whose chord deviation or
/// normal angle is over bound. Stops when all bounds hold, when both
/// directions hit their cap, or after `max_iterations`.
#[must_use]
pub fn choose_surface_grid_counts(
    surface: &impl Surface,
    options: SurfaceTessellationOptions,
) -> (usize, usize) {
    let topology = grid_topology(surface);
    let (mut u_count, mut v_count) = topology.min_counts();
    let u_max = options.max_u_count.max(u_count);
    let v_max = options.max_v_count.max(v_count);

    let within = |value: f64, bound: f64| !bound.is_finite() || bound <= 0.0 || value <= bound;

    for _ in 0..options.max_iterations.max(1) {
        let error = estimate_surface_grid_error(surface, u_count, v_count, topology);

        let refine_u = !within(error.deviation_u, options.max_deviation)
            || !within(error.angle_u, options.max_angle);
        let refine_v = !within(error.deviation_v, options.max_deviation)
            || !within(error.angle_v, options.max_angle);
        let twisted = !within(error.deviation_center, options.max_deviation);

        if !refine_u && !refine_v && !twisted {
            break;
        }

        let prev = (u_count, v_count);
        let (refine_u, refine_v) = if refine_u || refine_v {
            (refine_u, refine_v)
        } else {
            (true, true)
        };
        if refine_u {
            u_count = double_count(u_count, topology.wrap_u, u_max);
        }
        if refine_v {
            v_count = double_count(v_count, topology.wrap_v, v_max);
        }
        if (u_count, v_count) == prev {
            break;
        }
    }

    (u_count, v_count)
}

/// Doubles the number of segments, keeping existing samples.
fn double_count(count: usize, wrap: bool, max: usize) -> usize {
    let next = if wrap {
        count.saturating_mul(2)
    } else {
        count.saturating_sub(1).saturating_mul(2) + 1
    };
    next.min(max).max(count)
}

#[derive(Debug, Clone, Copy, Default)]
struct GridError {
    deviation_u: f64,
    deviation_v: f64,
    deviation_center: f64,
    angle_u: f64,
    angle_v: f64,
}

/// Samples up to 16x16 cells of the grid.
fn estimate_surface_grid_error(
    surface: &impl Surface,
    u_count: usize,
    v_count: usize,
    topology: GridTopology,
) -> GridError {
    let (u0, u1) = surface.domain_u();
    let (v0, v1) = surface.domain_v();
    let u_span = u1 - u0;
    let v_span = v1 - v0;

    let quad_u = if topology.wrap_u { u_count } else { u_count - 1 };
    let quad_v = if topology.wrap_v { v_count } else { v_count - 1 };
    let step_u = (quad_u / quad_u.min(16).max(1)).max(1);
    let step_v = (quad_v / quad_v.min(16).max(1)).max(1);

    let mut error = GridError::default();

    for v in (0..quad_v).step_by(step_v) {
        for u in (0..quad_u).step_by(step_u) {
            let (ua, ub) = surface_cell_params(u0, u1, u_span, u, u_count, topology.wrap_u);
            let (va, vb) = surface_cell_params(v0, v1, v_span, v, v_count, topology.wrap_v);
            let um = 0.5 * (ua + ub);
            let vm = 0.5 * (va + vb);

            let p00 = surface.point_at(ua, va);
            let p10 = surface.point_at(ub, va);
            let p01 = surface.point_at(ua, vb);
            let p11 = surface.point_at(ub, vb);

            let dev_u = surface
                .point_at(um, va)
                .distance_to(p00.lerp(p10, 0.5))
                .max(surface.point_at(um, vb).distance_to(p01.lerp(p11, 0.5)));
            let dev_v = surface
                .point_at(ua, vm)
                .distance_to(p00.lerp(p01, 0.5))
                .max(surface.point_at(ub, vm).distance_to(p10.lerp(p11, 0.5)));
            let bilinear = p00.lerp(p10, 0.5).lerp(p01.lerp(p11, 0.5), 0.5);
            let dev_c = surface.point_at(um, vm).distance_to(bilinear);

            error.deviation_u = error.deviation_u.max(dev_u);
            error.deviation_v = error.deviation_v.max(dev_v);
            error.deviation_center = error.deviation_center.max(dev_c);

            let n00 = surface.normal_at(ua, va);
            let n10 = surface.normal_at(ub, va);
            let n01 = surface.normal_at(ua, vb);
            if let Some(angle) = normal_angle(n00, n10) {
                error.angle_u = error.angle_u.max(angle);
            }
            if let Some(angle) = normal_angle(n00, n01) {
                error.angle_v = error.angle_v.max(angle);
            }
        }
    }

    error
}

/// Undefined next to poles, where the normal vanishes.
fn normal_angle(a: Option<Vec3>, b: Option<Vec3>) -> Option<f64> {
    a?.angle_to(b?)
}

/// Parameter bounds of grid cell `idx`.
#[inline]
#[allow(clippy::cast_precision_loss)]
fn surface_cell_params(
    start: f64,
    end: f64,
    span: f64,
    idx: usize,
    count: usize,
    wrap: bool,
) -> (f64, f64) {
    if !span.is_finite() || span == 0.0 {
        return (start, start);
    }

    if wrap {
        let denom = count as f64;
        let a = start + span * (idx as f64 / denom);
        let b = if idx + 1 == count {
            end
        } else {
            start + span * ((idx + 1) as f64 / denom)
        };
        (a, b)
    } else {
        let denom = (count - 1) as f64;
        let a = start + span * (idx as f64 / denom);
        let b = start + span * ((idx + 1) as f64 / denom);
        (a, b)
    }
}

/// Evaluates the grid in the vertex layout of [`triangulate_surface_grid`].
#[must_use]
pub fn sample_surface_grid(
    surface: &impl Surface,
    u_count: usize,
    v_count: usize,
    topology: GridTopology,
) -> Vec<Point3> {
    sample_grid_parameters(surface, u_count, v_count, topology)
        .into_iter()
        .map(|[u, v]| surface.point_at(u, v))
        .collect()
}

/// Grid `(u, v)` parameters in the vertex layout of
/// [`triangulate_surface_grid`]. Poles sit at `u_min`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sample_grid_parameters(
    surface: &impl Surface,
    u_count: usize,
    v_count: usize,
    topology: GridTopology,
) -> Vec<[f64; 2]> {
    let (min_u, min_v) = topology.min_counts();
    let u_count = u_count.max(min_u);
    let v_count = v_count.max(min_v);
    let (u0, u1) = surface.domain_u();
    let (v0, v1) = surface.domain_v();
    let pole_start = topology.pole_v_start && !topology.wrap_v;
    let pole_end = topology.pole_v_end && !topology.wrap_v;

    let u_at = |i: usize| {
        if topology.wrap_u {
            u0 + (u1 - u0) * (i as f64 / u_count as f64)
        } else {
            u0 + (u1 - u0) * fraction(i, u_count - 1)
        }
    };
    let v_at = |j: usize| {
        if topology.wrap_v {
            v0 + (v1 - v0) * (j as f64 / v_count as f64)
        } else {
            v0 + (v1 - v0) * fraction(j, v_count - 1)
        }
    };

    let mut params = Vec::with_capacity(topology.vertex_count(u_count, v_count));
    if pole_start {
        params.push([u0, v0]);
    }
    let first_row = usize::from(pole_start);
    let last_row = v_count - usize::from(pole_end);
    for j in first_row..last_row {
        let v = v_at(j);
        for i in 0..u_count {
            params.push([u_at(i), v]);
        }
    }
    if pole_end {
        params.push([u0, v1]);
    }
    params
}

// ─────────────────────────────────────────────────────────────────────────────
// Shape tessellation
// ─────────────────────────────────────────────────────────────────────────────

/// Tessellation result for one extracted face.
#[derive(Debug, Clone)]
pub struct FaceTessellation {
    /// Dense index in traversal order.
    pub face_id: usize,
    pub face: Face,
    /// `None` when the face produced no triangles.
    pub triangulation: Option<Arc<RawTriangulation>>,
}

impl FaceTessellation {
    #[must_use]
    pub fn is_meshed(&self) -> bool {
        self.triangulation.is_some()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangulation.as_ref().map_or(0, |t| t.triangle_count())
    }

    /// Nodes transformed by the face's accumulated placement.
    #[must_use]
    pub fn placed_nodes(&self) -> Vec<Point3> {
        let location = self.face.location();
        self.triangulation
            .as_ref()
            .map(|t| t.nodes.iter().map(|&p| location.apply_point(p)).collect())
            .unwrap_or_default()
    }

    /// Node surface parameters; empty when the face is unmeshed or the
    /// mesher reported none.
    #[must_use]
    pub fn node_uvs(&self) -> Vec<[f64; 2]> {
        self.triangulation
            .as_ref()
            .filter(|t| t.has_uvs())
            .map(|t| t.uvs.clone())
            .unwrap_or_default()
    }

    /// Triangles in local node indices, re-wound for reversed faces.
    #[must_use]
    pub fn oriented_triangles(&self) -> Vec<[u32; 3]> {
        let reverse = self.face.orientation().reverses_winding();
        self.triangulation
            .as_ref()
            .map(|t| {
                t.triangles
                    .iter()
                    .map(|&[a, b, c]| if reverse { [a, c, b] } else { [a, b, c] })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// All faces of a shape, tessellated.
#[derive(Debug, Clone, Default)]
pub struct ShapeTessellation {
    pub faces: Vec<FaceTessellation>,
    /// Face visits dropped as duplicates during exploration.
    pub duplicate_count: usize,
}

impl ShapeTessellation {
    #[must_use]
    pub fn failed_face_ids(&self) -> Vec<usize> {
        self.faces
            .iter()
            .filter(|f| !f.is_meshed())
            .map(|f| f.face_id)
            .collect()
    }
}

/// Explores `shape` and tessellates every unique face.
///
/// # Errors
/// Returns [`TessellationError`] when a face has a singular placement or
/// the mesher reports a kernel error.
pub fn tessellate_shape(
    shape: &Shape,
    params: &MeshParameters,
    mesher: &dyn FaceMesher,
    ctx: &mut GeomContext,
) -> Result<ShapeTessellation, TessellationError> {
    let exploration = ctx
        .metrics
        .time(TimingBucket::Exploration, || explore_faces(shape));
    let faces = tessellate_faces(&exploration.faces, params, mesher, ctx)?;
    Ok(ShapeTessellation {
        faces,
        duplicate_count: exploration.duplicate_count,
    })
}

enum Slot {
    Ready(Option<Arc<RawTriangulation>>),
    Pending(usize),
}

/// Tessellates `faces`, with face id = slice index.
///
/// Faces sharing geometry are meshed once; cached triangulations are reused
/// across calls with identical parameters.
///
/// # Errors
/// See [`tessellate_shape`].
pub fn tessellate_faces(
    faces: &[Face],
    params: &MeshParameters,
    mesher: &dyn FaceMesher,
    ctx: &mut GeomContext,
) -> Result<Vec<FaceTessellation>, TessellationError> {
    for (face_id, face) in faces.iter().enumerate() {
        let location = face.location();
        if !location.is_finite()
            || location.linear_determinant().abs() <= Tolerance::ZERO_LENGTH.eps
        {
            return Err(TessellationError::SingularPlacement { face_id });
        }
    }

    let mut slots = Vec::with_capacity(faces.len());
    let mut pending: Vec<(usize, TriangulationKey)> = Vec::new();
    let mut pending_index: HashMap<TriangulationKey, usize> = HashMap::new();
    let mesher_tag = mesher.cache_tag();

    for (face_id, face) in faces.iter().enumerate() {
        let key = TriangulationKey::new(face.geometry(), params, mesher_tag);
        if let Some(&index) = pending_index.get(&key) {
            slots.push(Slot::Pending(index));
        } else if let Some(hit) = ctx.cache.get(&key) {
            slots.push(Slot::Ready(hit));
        } else {
            pending_index.insert(key, pending.len());
            slots.push(Slot::Pending(pending.len()));
            pending.push((face_id, key));
        }
    }

    let cached = slots.iter().filter(|s| matches!(s, Slot::Ready(_))).count();
    let work: Vec<&FaceGeometry> = pending
        .iter()
        .map(|&(face_id, _)| faces[face_id].geometry().as_ref())
        .collect();
    let results = ctx
        .metrics
        .time(TimingBucket::Tessellation, || mesh_pending(&work, mesher, params));

    let mut meshed = Vec::with_capacity(results.len());
    for ((face_id, key), result) in pending.into_iter().zip(results) {
        let shared = result
            .map_err(|source| TessellationError::Kernel { face_id, source })?
            .map(Arc::new);
        ctx.cache.insert(key, shared.clone());
        meshed.push(shared);
    }

    let tessellations = faces
        .iter()
        .zip(slots)
        .enumerate()
        .map(|(face_id, (face, slot))| FaceTessellation {
            face_id,
            face: face.clone(),
            triangulation: match slot {
                Slot::Ready(hit) => hit,
                Slot::Pending(index) => meshed[index].clone(),
            },
        })
        .collect::<Vec<_>>();

    log::debug!(
        "tessellated {} faces ({} meshed, {cached} from cache)",
        faces.len(),
        meshed.len(),
    );

    Ok(tessellations)
}

type MeshResult = Result<Option<RawTriangulation>, KernelError>;

#[cfg(feature = "parallel")]
fn mesh_pending(
    work: &[&FaceGeometry],
    mesher: &dyn FaceMesher,
    params: &MeshParameters,
) -> Vec<MeshResult> {
    if params.in_parallel && work.len() > 1 {
        work.par_iter()
            .map(|face| mesher.triangulate(face, params))
            .collect()
    } else {
        work.iter()
            .map(|face| mesher.triangulate(face, params))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn mesh_pending(
    work: &[&FaceGeometry],
    mesher: &dyn FaceMesher,
    params: &MeshParameters,
) -> Vec<MeshResult> {
    work.iter()
        .map(|face| mesher.triangulate(face, params))
        .collect()
}
