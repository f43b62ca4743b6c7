use super::core::{Point3, Tolerance, Vec3};

fn is_non_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

pub(crate) fn wrap_param(value: f64, start: f64, end: f64) -> f64 {
    let span = end - start;
    if !span.is_finite() || span == 0.0 {
        return start;
    }
    let mut t = (value - start) % span;
    if t < 0.0 {
        t += span;
    }
    start + t
}

fn orthogonal_unit_vector(reference: Vec3) -> Vec3 {
    let candidate = if reference.x.abs() < reference.y.abs() {
        Vec3::new(0.0, -reference.z, reference.y)
    } else {
        Vec3::new(-reference.z, 0.0, reference.x)
    };

    candidate.normalized().unwrap_or(Vec3::X)
}

fn frame_axes_from_xaxis_normal(x_axis: Vec3, normal: Vec3) -> (Vec3, Vec3, Vec3) {
    let z = normal.normalized().unwrap_or(Vec3::Z);
    let projected = x_axis.sub(z.mul_scalar(x_axis.dot(z)));
    let x = projected
        .normalized()
        .unwrap_or_else(|| orthogonal_unit_vector(z));
    let y = z.cross(x).normalized().unwrap_or(Vec3::Y);
    (x, y, z)
}

fn point_bits(p: Point3) -> [u64; 3] {
    [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]
}

fn vec_bits(v: Vec3) -> [u64; 3] {
    [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()]
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HPoint4 {
    x: f64,
    y: f64,
    z: f64,
    w: f64,
}

impl HPoint4 {
    const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    fn lerp(self, rhs: Self, t: f64) -> Self {
        let s = 1.0 - t;
        Self::new(
            self.x * s + rhs.x * t,
            self.y * s + rhs.y * t,
            self.z * s + rhs.z * t,
            self.w * s + rhs.w * t,
        )
    }

    fn to_point3(self) -> Option<Point3> {
        if self.w.is_finite() && self.w != 0.0 {
            Some(Point3::new(self.x / self.w, self.y / self.w, self.z / self.w))
        } else {
            None
        }
    }
}

fn find_span(n: usize, p: usize, u: f64, knots: &[f64]) -> usize {
    if u >= knots[n + 1] {
        return n;
    }
    if u <= knots[p] {
        return p;
    }

    let mut low = p;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

fn de_boor(d: &mut [HPoint4], span: usize, p: usize, u: f64, knots: &[f64]) {
    for r in 1..=p {
        for j in (r..=p).rev() {
            let i = span - p + j;
            let denom = knots[i + p + 1 - r] - knots[i];
            let alpha = if denom == 0.0 { 0.0 } else { (u - knots[i]) / denom };
            d[j] = d[j - 1].lerp(d[j], alpha);
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("{surface} radius must be finite and > 0")]
    InvalidRadius { surface: &'static str },
    #[error("{surface} axis must be non-zero")]
    DegenerateAxis { surface: &'static str },
    #[error("nurbs surface requires at least a 2x2 control net")]
    ControlNetTooSmall,
    #[error("nurbs surface degrees must be >= 1 and < control point counts")]
    InvalidDegree,
    #[error("nurbs surface control point count must be {expected}, got {actual}")]
    ControlPointCount { expected: usize, actual: usize },
    #[error("nurbs surface {direction} knot length must be {expected}, got {actual}")]
    KnotCount {
        direction: char,
        expected: usize,
        actual: usize,
    },
    #[error("nurbs surface knots must be finite and non-decreasing")]
    InvalidKnots,
    #[error("nurbs surface weights must match control points and be finite and > 0")]
    InvalidWeights,
}

/// Geometric family of a surface, as reported to shape analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Plane,
    Cylinder,
    Cone,
    Sphere,
    Torus,
    BSpline,
    Bezier,
}

impl SurfaceKind {
    /// Free-form surfaces that need finer tessellation than analytic ones.
    #[must_use]
    pub const fn is_freeform(self) -> bool {
        matches!(self, Self::BSpline | Self::Bezier)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceCacheKey {
    Plane {
        origin: [u64; 3],
        u_axis: [u64; 3],
        v_axis: [u64; 3],
    },
    Cylinder {
        base: [u64; 3],
        axis: [u64; 3],
        x_axis: [u64; 3],
        radius: u64,
    },
    Cone {
        base: [u64; 3],
        axis: [u64; 3],
        x_axis: [u64; 3],
        radius0: u64,
        radius1: u64,
    },
    Sphere {
        center: [u64; 3],
        x_axis: [u64; 3],
        z_axis: [u64; 3],
        radius: u64,
    },
    Torus {
        center: [u64; 3],
        x_axis: [u64; 3],
        z_axis: [u64; 3],
        major_radius: u64,
        minor_radius: u64,
    },
    Nurbs {
        hash: u64,
    },
}

pub trait Surface {
    fn point_at(&self, u: f64, v: f64) -> Point3;

    #[must_use]
    fn domain_u(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn domain_v(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn is_u_closed(&self) -> bool {
        false
    }

    #[must_use]
    fn is_v_closed(&self) -> bool {
        false
    }

    #[must_use]
    fn pole_v_start(&self) -> bool {
        false
    }

    #[must_use]
    fn pole_v_end(&self) -> bool {
        false
    }

    /// Central finite differences, clamped at open domain ends.
    #[must_use]
    fn partial_derivatives_at(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();
        let u_closed = self.is_u_closed();
        let v_closed = self.is_v_closed();

        let mut du = Vec3::ZERO;
        let mut dv = Vec3::ZERO;

        let h = Tolerance::DERIVATIVE.relative_to(u1 - u0);
        if h.is_finite() && h != 0.0 {
            let ua = if u_closed { u - h } else { (u - h).max(u0) };
            let ub = if u_closed { u + h } else { (u + h).min(u1) };
            if ua != ub {
                du = self
                    .point_at(ub, v)
                    .sub_point(self.point_at(ua, v))
                    .mul_scalar(1.0 / (ub - ua));
            }
        }

        let h = Tolerance::DERIVATIVE.relative_to(v1 - v0);
        if h.is_finite() && h != 0.0 {
            let va = if v_closed { v - h } else { (v - h).max(v0) };
            let vb = if v_closed { v + h } else { (v + h).min(v1) };
            if va != vb {
                dv = self
                    .point_at(u, vb)
                    .sub_point(self.point_at(u, va))
                    .mul_scalar(1.0 / (vb - va));
            }
        }

        (du, dv)
    }

    /// Unit normal along `∂u × ∂v`, `None` where the surface is singular.
    #[must_use]
    fn normal_at(&self, u: f64, v: f64) -> Option<Vec3> {
        let (du, dv) = self.partial_derivatives_at(u, v);
        du.cross(dv).normalized()
    }

    fn cache_key(&self) -> SurfaceCacheKey;

    fn kind(&self) -> SurfaceKind;
}

// ─────────────────────────────────────────────────────────────────────────────
// Analytic surfaces
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSurface {
    pub origin: Point3,
    pub u_axis: Vec3,
    pub v_axis: Vec3,
}

impl PlaneSurface {
    /// Plane spanned by `u_axis` and `v_axis`; the unit square maps to the
    /// parallelogram at `origin`, with normal `u_axis × v_axis`.
    #[must_use]
    pub const fn new(origin: Point3, u_axis: Vec3, v_axis: Vec3) -> Self {
        Self {
            origin,
            u_axis,
            v_axis,
        }
    }
}

impl Surface for PlaneSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.origin
            .add_vec(self.u_axis.mul_scalar(u))
            .add_vec(self.v_axis.mul_scalar(v))
    }

    fn normal_at(&self, _u: f64, _v: f64) -> Option<Vec3> {
        self.u_axis.cross(self.v_axis).normalized()
    }

    fn cache_key(&self) -> SurfaceCacheKey {
        SurfaceCacheKey::Plane {
            origin: point_bits(self.origin),
            u_axis: vec_bits(self.u_axis),
            v_axis: vec_bits(self.v_axis),
        }
    }

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Plane
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderSurface {
    pub base: Point3,
    pub axis: Vec3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub radius: f64,
}

impl CylinderSurface {
    /// Cylinder around `axis` (whose length is the height at `v = 1`).
    pub fn new(base: Point3, axis: Vec3, radius: f64) -> Result<Self, SurfaceError> {
        let axis_dir = axis
            .normalized()
            .ok_or(SurfaceError::DegenerateAxis { surface: "cylinder" })?;
        Self::from_base_axis_xaxis(base, axis, orthogonal_unit_vector(axis_dir), radius)
    }

    pub fn from_base_axis_xaxis(
        base: Point3,
        axis: Vec3,
        x_axis: Vec3,
        radius: f64,
    ) -> Result<Self, SurfaceError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SurfaceError::InvalidRadius { surface: "cylinder" });
        }
        let axis_dir = axis
            .normalized()
            .ok_or(SurfaceError::DegenerateAxis { surface: "cylinder" })?;
        let (x_axis, y_axis, _) = frame_axes_from_xaxis_normal(x_axis, axis_dir);

        Ok(Self {
            base,
            axis,
            x_axis,
            y_axis,
            radius,
        })
    }
}

impl Surface for CylinderSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let angle = std::f64::consts::TAU * wrap_param(u, 0.0, 1.0);
        let radial = self
            .x_axis
            .mul_scalar(angle.cos())
            .add(self.y_axis.mul_scalar(angle.sin()))
            .mul_scalar(self.radius);

        self.base.add_vec(self.axis.mul_scalar(v)).add_vec(radial)
    }

    fn is_u_closed(&self) -> bool {
        true
    }

    fn cache_key(&self) -> SurfaceCacheKey {
        SurfaceCacheKey::Cylinder {
            base: point_bits(self.base),
            axis: vec_bits(self.axis),
            x_axis: vec_bits(self.x_axis),
            radius: self.radius.to_bits(),
        }
    }

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Cylinder
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeSurface {
    pub base: Point3,
    pub axis: Vec3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub radius0: f64,
    pub radius1: f64,
}

impl ConeSurface {
    /// Truncated cone; a zero radius at either end is a pole.
    pub fn new(base: Point3, axis: Vec3, radius0: f64, radius1: f64) -> Result<Self, SurfaceError> {
        if !radius0.is_finite()
            || radius0 < 0.0
            || !radius1.is_finite()
            || radius1 < 0.0
            || (radius0 == 0.0 && radius1 == 0.0)
        {
            return Err(SurfaceError::InvalidRadius { surface: "cone" });
        }
        let axis_dir = axis
            .normalized()
            .ok_or(SurfaceError::DegenerateAxis { surface: "cone" })?;
        let x_axis = orthogonal_unit_vector(axis_dir);
        let y_axis = axis_dir.cross(x_axis).normalized().unwrap_or(Vec3::Y);

        Ok(Self {
            base,
            axis,
            x_axis,
            y_axis,
            radius0,
            radius1,
        })
    }
}

impl Surface for ConeSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let angle = std::f64::consts::TAU * wrap_param(u, 0.0, 1.0);
        let radius = self.radius0 + (self.radius1 - self.radius0) * v;
        let radial = self
            .x_axis
            .mul_scalar(angle.cos())
            .add(self.y_axis.mul_scalar(angle.sin()))
            .mul_scalar(radius);

        self.base.add_vec(self.axis.mul_scalar(v)).add_vec(radial)
    }

    fn is_u_closed(&self) -> bool {
        true
    }

    fn pole_v_start(&self) -> bool {
        self.radius0 == 0.0
    }

    fn pole_v_end(&self) -> bool {
        self.radius1 == 0.0
    }

    fn cache_key(&self) -> SurfaceCacheKey {
        SurfaceCacheKey::Cone {
            base: point_bits(self.base),
            axis: vec_bits(self.axis),
            x_axis: vec_bits(self.x_axis),
            radius0: self.radius0.to_bits(),
            radius1: self.radius1.to_bits(),
        }
    }

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Cone
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereSurface {
    pub center: Point3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
    pub radius: f64,
}

impl SphereSurface {
    pub fn new(center: Point3, radius: f64) -> Result<Self, SurfaceError> {
        Self::from_center_xaxis_normal(center, Vec3::X, Vec3::Z, radius)
    }

    pub fn from_center_xaxis_normal(
        center: Point3,
        x_axis: Vec3,
        normal: Vec3,
        radius: f64,
    ) -> Result<Self, SurfaceError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SurfaceError::InvalidRadius { surface: "sphere" });
        }

        let (x_axis, y_axis, z_axis) = frame_axes_from_xaxis_normal(x_axis, normal);
        Ok(Self {
            center,
            x_axis,
            y_axis,
            z_axis,
            radius,
        })
    }
}

impl Surface for SphereSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let theta = std::f64::consts::TAU * wrap_param(u, 0.0, 1.0);
        let phi = std::f64::consts::PI * (v.clamp(0.0, 1.0) - 0.5);
        let (sin_phi, cos_phi) = phi.sin_cos();

        self.center.add_vec(
            self.x_axis
                .mul_scalar(cos_phi * theta.cos())
                .add(self.y_axis.mul_scalar(cos_phi * theta.sin()))
                .add(self.z_axis.mul_scalar(sin_phi))
                .mul_scalar(self.radius),
        )
    }

    fn is_u_closed(&self) -> bool {
        true
    }

    fn pole_v_start(&self) -> bool {
        true
    }

    fn pole_v_end(&self) -> bool {
        true
    }

    fn cache_key(&self) -> SurfaceCacheKey {
        SurfaceCacheKey::Sphere {
            center: point_bits(self.center),
            x_axis: vec_bits(self.x_axis),
            z_axis: vec_bits(self.z_axis),
            radius: self.radius.to_bits(),
        }
    }

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Sphere
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusSurface {
    pub center: Point3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
    pub major_radius: f64,
    pub minor_radius: f64,
}

impl TorusSurface {
    pub fn from_center_xaxis_normal(
        center: Point3,
        x_axis: Vec3,
        normal: Vec3,
        major_radius: f64,
        minor_radius: f64,
    ) -> Result<Self, SurfaceError> {
        if !major_radius.is_finite()
            || major_radius <= 0.0
            || !minor_radius.is_finite()
            || minor_radius <= 0.0
        {
            return Err(SurfaceError::InvalidRadius { surface: "torus" });
        }

        let (x_axis, y_axis, z_axis) = frame_axes_from_xaxis_normal(x_axis, normal);
        Ok(Self {
            center,
            x_axis,
            y_axis,
            z_axis,
            major_radius,
            minor_radius,
        })
    }
}

impl Surface for TorusSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let theta = std::f64::consts::TAU * wrap_param(u, 0.0, 1.0);
        let phi = std::f64::consts::TAU * wrap_param(v, 0.0, 1.0);
        let (sin_phi, cos_phi) = phi.sin_cos();

        let radial = self
            .x_axis
            .mul_scalar(theta.cos())
            .add(self.y_axis.mul_scalar(theta.sin()));
        let tube = radial.mul_scalar(self.major_radius + self.minor_radius * cos_phi);
        let vertical = self.z_axis.mul_scalar(self.minor_radius * sin_phi);
        self.center.add_vec(tube.add(vertical))
    }

    fn is_u_closed(&self) -> bool {
        true
    }

    fn is_v_closed(&self) -> bool {
        true
    }

    fn cache_key(&self) -> SurfaceCacheKey {
        SurfaceCacheKey::Torus {
            center: point_bits(self.center),
            x_axis: vec_bits(self.x_axis),
            z_axis: vec_bits(self.z_axis),
            major_radius: self.major_radius.to_bits(),
            minor_radius: self.minor_radius.to_bits(),
        }
    }

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Torus
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NURBS
// ─────────────────────────────────────────────────────────────────────────────

/// Rational B-spline patch. Control points are stored row-major with U
/// varying fastest (`v_index * u_count + u_index`).
#[derive(Debug, Clone, PartialEq)]
pub struct NurbsSurface {
    pub degree_u: usize,
    pub degree_v: usize,
    pub u_count: usize,
    pub v_count: usize,
    pub control_points: Vec<Point3>,
    pub knots_u: Vec<f64>,
    pub knots_v: Vec<f64>,
    pub weights: Option<Vec<f64>>,
    cache_hash: u64,
    u_closed: bool,
    v_closed: bool,
    pole_v_start: bool,
    pole_v_end: bool,
}

impl NurbsSurface {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        u_count: usize,
        v_count: usize,
        control_points: Vec<Point3>,
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, SurfaceError> {
        use std::hash::{Hash, Hasher};

        if u_count < 2 || v_count < 2 {
            return Err(SurfaceError::ControlNetTooSmall);
        }
        if degree_u == 0 || degree_v == 0 || degree_u >= u_count || degree_v >= v_count {
            return Err(SurfaceError::InvalidDegree);
        }
        if control_points.len() != u_count * v_count {
            return Err(SurfaceError::ControlPointCount {
                expected: u_count * v_count,
                actual: control_points.len(),
            });
        }
        for (direction, knots, expected) in [
            ('u', &knots_u, u_count + degree_u + 1),
            ('v', &knots_v, v_count + degree_v + 1),
        ] {
            if knots.len() != expected {
                return Err(SurfaceError::KnotCount {
                    direction,
                    expected,
                    actual: knots.len(),
                });
            }
            if knots.iter().any(|k| !k.is_finite()) || !is_non_decreasing(knots) {
                return Err(SurfaceError::InvalidKnots);
            }
        }
        if let Some(ref weights) = weights {
            if weights.len() != control_points.len()
                || weights.iter().any(|w| !w.is_finite() || *w <= 0.0)
            {
                return Err(SurfaceError::InvalidWeights);
            }
        }

        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        degree_u.hash(&mut hasher);
        degree_v.hash(&mut hasher);
        u_count.hash(&mut hasher);
        v_count.hash(&mut hasher);
        for point in &control_points {
            point_bits(*point).hash(&mut hasher);
        }
        for value in knots_u.iter().chain(&knots_v) {
            value.to_bits().hash(&mut hasher);
        }
        if let Some(ref weights) = weights {
            for value in weights {
                value.to_bits().hash(&mut hasher);
            }
        }

        let mut surface = Self {
            degree_u,
            degree_v,
            u_count,
            v_count,
            control_points,
            knots_u,
            knots_v,
            weights,
            cache_hash: hasher.finish(),
            u_closed: false,
            v_closed: false,
            pole_v_start: false,
            pole_v_end: false,
        };

        let tol = Tolerance::DEFAULT;
        surface.u_closed = surface.compute_u_closed(tol);
        surface.v_closed = surface.compute_v_closed(tol);
        surface.pole_v_start = !surface.v_closed && surface.row_collapses(surface.domain_v().0, tol);
        surface.pole_v_end = !surface.v_closed && surface.row_collapses(surface.domain_v().1, tol);

        Ok(surface)
    }

    /// Bézier patch: a single-span NURBS with clamped knots.
    ///
    /// `u_count`/`v_count` are the control net dimensions; degrees are one less.
    pub fn bezier(
        u_count: usize,
        v_count: usize,
        control_points: Vec<Point3>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, SurfaceError> {
        if u_count < 2 || v_count < 2 {
            return Err(SurfaceError::ControlNetTooSmall);
        }
        let clamped = |count: usize| {
            let mut knots = vec![0.0; count];
            knots.extend(std::iter::repeat_n(1.0, count));
            knots
        };
        Self::new(
            u_count - 1,
            v_count - 1,
            u_count,
            v_count,
            control_points,
            clamped(u_count),
            clamped(v_count),
            weights,
        )
    }

    fn control_hpoint(&self, u_index: usize, v_index: usize) -> HPoint4 {
        let idx = v_index * self.u_count + u_index;
        let p = self.control_points[idx];
        let w = self
            .weights
            .as_ref()
            .and_then(|weights| weights.get(idx).copied())
            .unwrap_or(1.0);
        HPoint4::new(p.x * w, p.y * w, p.z * w, w)
    }

    fn point_at_clamped(&self, u: f64, v: f64) -> Point3 {
        let p = self.degree_u;
        let q = self.degree_v;
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();
        let u = u.clamp(u0, u1);
        let v = v.clamp(v0, v1);

        let span_u = find_span(self.u_count - 1, p, u, &self.knots_u);
        let span_v = find_span(self.v_count - 1, q, v, &self.knots_v);

        let mut column = Vec::with_capacity(q + 1);
        let mut row = Vec::with_capacity(p + 1);
        for l in 0..=q {
            let v_index = span_v - q + l;
            row.clear();
            row.extend((0..=p).map(|j| self.control_hpoint(span_u - p + j, v_index)));
            de_boor(&mut row, span_u, p, u, &self.knots_u);
            column.push(row[p]);
        }

        de_boor(&mut column, span_v, q, v, &self.knots_v);
        column[q]
            .to_point3()
            .unwrap_or(Point3::new(f64::NAN, f64::NAN, f64::NAN))
    }

    fn compute_u_closed(&self, tol: Tolerance) -> bool {
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();
        [v0, 0.5 * (v0 + v1), v1]
            .into_iter()
            .all(|v| tol.approx_eq_point3(self.point_at_clamped(u0, v), self.point_at_clamped(u1, v)))
    }

    fn compute_v_closed(&self, tol: Tolerance) -> bool {
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();
        [u0, 0.5 * (u0 + u1), u1]
            .into_iter()
            .all(|u| tol.approx_eq_point3(self.point_at_clamped(u, v0), self.point_at_clamped(u, v1)))
    }

    /// True when the whole iso-row at `v` collapses to one point.
    fn row_collapses(&self, v: f64, tol: Tolerance) -> bool {
        let (u0, u1) = self.domain_u();
        let first = self.point_at_clamped(u0, v);
        [0.25, 0.5, 0.75, 1.0].into_iter().all(|t| {
            tol.approx_eq_point3(first, self.point_at_clamped(u0 + (u1 - u0) * t, v))
        })
    }
}

impl Surface for NurbsSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();
        let u = if self.u_closed { wrap_param(u, u0, u1) } else { u };
        let v = if self.v_closed { wrap_param(v, v0, v1) } else { v };
        self.point_at_clamped(u, v)
    }

    fn domain_u(&self) -> (f64, f64) {
        (self.knots_u[self.degree_u], self.knots_u[self.u_count])
    }

    fn domain_v(&self) -> (f64, f64) {
        (self.knots_v[self.degree_v], self.knots_v[self.v_count])
    }

    fn is_u_closed(&self) -> bool {
        self.u_closed
    }

    fn is_v_closed(&self) -> bool {
        self.v_closed
    }

    fn pole_v_start(&self) -> bool {
        self.pole_v_start
    }

    fn pole_v_end(&self) -> bool {
        self.pole_v_end
    }

    fn cache_key(&self) -> SurfaceCacheKey {
        SurfaceCacheKey::Nurbs {
            hash: self.cache_hash,
        }
    }

    fn kind(&self) -> SurfaceKind {
        let single_span = self.knots_u.len() == 2 * (self.degree_u + 1)
            && self.knots_v.len() == 2 * (self.degree_v + 1);
        if single_span {
            SurfaceKind::Bezier
        } else {
            SurfaceKind::BSpline
        }
    }
}
