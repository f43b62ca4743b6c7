//! Mesh parameter recommendations from shape complexity.
//!
//! [`analyze_shape`] measures a shape (size, face and edge counts, area,
//! enclosed volume, freeform surfaces) by sampling its faces directly, with
//! no tessellation. The remaining functions turn those metrics into
//! [`MeshParameters`] and rough cost estimates. All of it is guidance:
//! estimates are analytic approximations and validation never blocks a
//! conversion.
//!
//! ```ignore
//! use brep_mesh::geom::{analyze_shape, estimate_triangle_count, recommend_parameters};
//!
//! let complexity = analyze_shape(&shape);
//! let params = recommend_parameters(&complexity);
//! println!("~{} triangles", estimate_triangle_count(&complexity, &params));
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::core::{BBox, Point3};
use super::mesh::GeomContext;
use super::metrics::TimingBucket;
use super::surface::Surface;
use super::tessellation::MeshParameters;
use super::topology::{Face, Shape, explore_faces};

/// Samples per direction when integrating area and volume over a face.
const INTEGRATION_SAMPLES: usize = 32;
/// Samples per direction when bounding a face.
const BOUNDS_SAMPLES: usize = 9;
/// Grid used to match edges shared between faces.
const EDGE_QUANTUM: f64 = 1e-6;

/// Bytes per triangle used by [`estimate_memory_usage_mb`]: three positions,
/// three normals and three indices, plus half again for overhead.
const BYTES_PER_TRIANGLE: f64 = 230.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeComplexity {
    pub bounding_box_diagonal: f64,
    pub face_count: usize,
    /// Unique face boundary curves; seams count once, poles not at all.
    pub edge_count: usize,
    pub surface_area: f64,
    /// Enclosed volume; 0 unless the shape contains a solid.
    pub volume: f64,
    /// `volume / surface_area` for solids, else 0.
    pub volume_to_surface_ratio: f64,
    /// Any B-spline or Bézier face.
    pub has_complex_surfaces: bool,
    /// Coarse curvature proxy: `face_count / surface_area`.
    pub average_curvature: f64,
}

impl ShapeComplexity {
    #[must_use]
    pub fn is_high_curvature(&self) -> bool {
        self.average_curvature > 0.1
    }
}

/// Measures `shape`. An empty shape yields all-zero metrics.
#[must_use]
pub fn analyze_shape(shape: &Shape) -> ShapeComplexity {
    let faces = explore_faces(shape).faces;
    if faces.is_empty() {
        log::warn!("cannot analyze a shape without faces");
        return ShapeComplexity::default();
    }

    let mut bbox: Option<BBox> = None;
    let mut area = 0.0;
    let mut signed_volume = 0.0;
    let mut edges = HashSet::new();
    let mut has_complex_surfaces = false;

    for face in &faces {
        if let Some(face_box) = face_bounds(face) {
            bbox = Some(bbox.map_or(face_box, |b| b.union(face_box)));
        }
        let (face_area, face_volume) = integrate_face(face);
        area += face_area;
        signed_volume += face_volume;
        edges.extend(face_edges(face));
        has_complex_surfaces |= face.geometry().kind().is_freeform();
    }

    let volume = if shape.contains_solid() && signed_volume > 0.0 {
        signed_volume
    } else {
        0.0
    };
    #[allow(clippy::cast_precision_loss)]
    let average_curvature = if area > 0.0 {
        faces.len() as f64 / area
    } else {
        0.0
    };

    ShapeComplexity {
        bounding_box_diagonal: bbox.map_or(0.0, BBox::diagonal),
        face_count: faces.len(),
        edge_count: edges.len(),
        surface_area: area,
        volume,
        volume_to_surface_ratio: if area > 0.0 { volume / area } else { 0.0 },
        has_complex_surfaces,
        average_curvature,
    }
}

/// [`analyze_shape`], timed in the context's metrics.
#[must_use]
pub fn analyze_shape_with_context(shape: &Shape, ctx: &mut GeomContext) -> ShapeComplexity {
    ctx.metrics
        .time(TimingBucket::Analysis, || analyze_shape(shape))
}

#[allow(clippy::cast_precision_loss)]
fn sample_params(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = if count > 1 { (end - start) / (count - 1) as f64 } else { 0.0 };
    (0..count).map(move |i| start + step * i as f64)
}

fn face_bounds(face: &Face) -> Option<BBox> {
    let geometry = face.geometry();
    let (u0, u1) = geometry.domain_u();
    let (v0, v1) = geometry.domain_v();
    let mut points = Vec::with_capacity(BOUNDS_SAMPLES * BOUNDS_SAMPLES);
    for v in sample_params(v0, v1, BOUNDS_SAMPLES) {
        for u in sample_params(u0, u1, BOUNDS_SAMPLES) {
            let p = face.point_at(u, v);
            if p.is_finite() {
                points.push(p);
            }
        }
    }
    BBox::from_points(&points)
}

/// Area and signed volume contribution `∫ p · n dA / 3`, by midpoint rule.
#[allow(clippy::cast_precision_loss)]
fn integrate_face(face: &Face) -> (f64, f64) {
    let geometry = face.geometry();
    let domain = geometry.domain();
    if !domain.is_valid() || domain.is_degenerate() {
        return (0.0, 0.0);
    }
    let location = face.location();
    let sign = if face.orientation().reverses_winding() { -1.0 } else { 1.0 };

    let n = INTEGRATION_SAMPLES as f64;
    let du = domain.u_span() / n;
    let dv = domain.v_span() / n;
    let mut area = 0.0;
    let mut volume = 0.0;

    for j in 0..INTEGRATION_SAMPLES {
        let v = domain.v_min + (j as f64 + 0.5) * dv;
        for i in 0..INTEGRATION_SAMPLES {
            let u = domain.u_min + (i as f64 + 0.5) * du;
            let (su, sv) = geometry.partial_derivatives_at(u, v);
            let normal = location.apply_vec(su).cross(location.apply_vec(sv));
            if !normal.is_finite() {
                continue;
            }
            let p = face.point_at(u, v).to_vec3();
            area += normal.length() * du * dv;
            volume += sign * p.dot(normal) * du * dv / 3.0;
        }
    }

    (area, volume)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EdgeKey {
    ends: [[i64; 3]; 2],
    mid: [i64; 3],
}

#[allow(clippy::cast_possible_truncation)]
fn quantize(p: Point3) -> [i64; 3] {
    let q = |x: f64| (x / EDGE_QUANTUM).round() as i64;
    [q(p.x), q(p.y), q(p.z)]
}

/// Boundary iso-curves of a face as direction-independent geometric keys.
fn face_edges(face: &Face) -> Vec<EdgeKey> {
    let geometry = face.geometry();
    let domain = geometry.domain();
    if !domain.is_valid() || domain.is_degenerate() {
        return Vec::new();
    }
    let (u0, u1, v0, v1) = (domain.u_min, domain.u_max, domain.v_min, domain.v_max);
    let um = 0.5 * (u0 + u1);
    let vm = 0.5 * (v0 + v1);

    let mut curves: Vec<[(f64, f64); 3]> = Vec::with_capacity(4);
    if !geometry.pole_v_start() {
        curves.push([(u0, v0), (um, v0), (u1, v0)]);
    }
    if !geometry.pole_v_end() && !geometry.is_v_closed() {
        curves.push([(u0, v1), (um, v1), (u1, v1)]);
    }
    curves.push([(u0, v0), (u0, vm), (u0, v1)]);
    if !geometry.is_u_closed() {
        curves.push([(u1, v0), (u1, vm), (u1, v1)]);
    }

    curves
        .into_iter()
        .filter_map(|[a, m, b]| {
            let (a, m, b) = (
                quantize(face.point_at(a.0, a.1)),
                quantize(face.point_at(m.0, m.1)),
                quantize(face.point_at(b.0, b.1)),
            );
            if a == m && m == b {
                return None;
            }
            let ends = if a <= b { [a, b] } else { [b, a] };
            Some(EdgeKey { ends, mid: m })
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Recommendations
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters for a shape of the given complexity.
#[must_use]
pub fn recommend_parameters(complexity: &ShapeComplexity) -> MeshParameters {
    let diagonal = complexity.bounding_box_diagonal;
    let (mut deflection, mut angular): (f64, f64) = if diagonal < 10.0 {
        (0.001, 0.05)
    } else if diagonal < 100.0 {
        (0.01, 0.1)
    } else if diagonal < 1000.0 {
        (0.1, 0.2)
    } else {
        (1.0, 0.5)
    };

    if complexity.has_complex_surfaces {
        deflection *= 0.5;
        angular *= 0.5;
    }
    if complexity.is_high_curvature() {
        deflection *= 0.7;
        angular *= 0.8;
    }
    if complexity.face_count > 1000 {
        deflection *= 1.5;
    }

    MeshParameters {
        deflection: deflection.clamp(1e-4, 10.0),
        angular_deflection: angular.clamp(0.01, 1.0),
        relative: false,
        in_parallel: complexity.face_count > 100,
    }
}

/// Named quality levels, from coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MeshQuality {
    Draft,
    Low,
    #[default]
    Medium,
    High,
    VeryHigh,
}

impl MeshQuality {
    pub const ALL: [Self; 5] = [Self::Draft, Self::Low, Self::Medium, Self::High, Self::VeryHigh];

    /// Deflection as a fraction of the bounding-box diagonal.
    #[must_use]
    pub const fn deflection_fraction(self) -> f64 {
        match self {
            Self::Draft => 0.05,
            Self::Low => 0.02,
            Self::Medium => 0.01,
            Self::High => 0.005,
            Self::VeryHigh => 0.001,
        }
    }

    #[must_use]
    pub const fn angular_deflection(self) -> f64 {
        match self {
            Self::Draft => 0.5,
            Self::Low => 0.3,
            Self::Medium => 0.1,
            Self::High => 0.05,
            Self::VeryHigh => 0.02,
        }
    }
}

#[must_use]
pub fn preset_parameters(complexity: &ShapeComplexity, quality: MeshQuality) -> MeshParameters {
    let faces = complexity.face_count;
    let in_parallel = match quality {
        MeshQuality::Draft => faces > 50,
        MeshQuality::Low | MeshQuality::Medium => faces > 100,
        MeshQuality::High | MeshQuality::VeryHigh => true,
    };
    MeshParameters {
        deflection: complexity.bounding_box_diagonal * quality.deflection_fraction(),
        angular_deflection: quality.angular_deflection(),
        relative: false,
        in_parallel,
    }
}

/// Rough triangle count for meshing a shape with `params`.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn estimate_triangle_count(complexity: &ShapeComplexity, params: &MeshParameters) -> usize {
    if complexity.surface_area <= 0.0 || !(params.deflection > 0.0) {
        return 0;
    }

    let mut estimate = complexity.surface_area / (params.deflection * params.deflection) * 2.0;
    if complexity.has_complex_surfaces {
        estimate *= 1.5;
    }
    if complexity.is_high_curvature() {
        estimate *= 1.3;
    }
    estimate *= 0.2 / params.angular_deflection.max(0.01);

    if estimate.is_finite() {
        estimate.min(usize::MAX as f64) as usize
    } else {
        usize::MAX
    }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimate_memory_usage_mb(triangle_count: usize) -> f64 {
    triangle_count as f64 * BYTES_PER_TRIANGLE / (1024.0 * 1024.0)
}

/// Deflection for `quality` in [0, 1]: 5% of the diagonal at 0, falling by
/// a decade per half step (0.5% at 0.5, 0.05% at 1).
#[must_use]
pub fn recommended_deflection(bounding_box_diagonal: f64, quality: f64) -> f64 {
    let quality = quality.clamp(0.0, 1.0);
    bounding_box_diagonal * 0.05 * 0.1_f64.powf(quality * 2.0)
}

/// Outcome of [`validate_parameters`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterValidation {
    pub is_valid: bool,
    pub warnings: Vec<String>,
}

/// Checks parameters for sanity, and against the shape size when given.
///
/// Advisory only: every warning is also logged, and nothing is rejected.
#[must_use]
pub fn validate_parameters(
    params: &MeshParameters,
    complexity: Option<&ShapeComplexity>,
) -> ParameterValidation {
    let mut warnings = Vec::new();

    if !(params.deflection > 0.0 && params.deflection <= 1000.0) {
        warnings.push(format!("invalid deflection: {}", params.deflection));
    }
    if !(params.angular_deflection > 0.0 && params.angular_deflection <= std::f64::consts::PI) {
        warnings.push(format!(
            "invalid angular deflection: {}",
            params.angular_deflection
        ));
    }
    let is_valid = warnings.is_empty();

    if let (true, Some(complexity)) = (is_valid, complexity) {
        let diagonal = complexity.bounding_box_diagonal;
        if params.deflection > diagonal * 0.1 {
            warnings.push("deflection may be too coarse for this model".to_owned());
        }
        if params.deflection < diagonal * 0.0001 {
            warnings.push("deflection may be too fine, meshing could be slow".to_owned());
        }
    }

    for warning in &warnings {
        log::warn!("{warning}");
    }

    ParameterValidation { is_valid, warnings }
}
