//! Boundary-representation topology consumed by the tessellator.
//!
//! A [`Shape`] is an immutable tree of face, shell, solid and compound
//! nodes. Every node reference carries a placement ([`Transform`]) and an
//! [`Orientation`]; both compose from the root down to each face. Nodes
//! are shared through `Arc`, so the same face geometry may be reached
//! several times (instancing, or the same face listed in two compounds).
//!
//! [`explore_faces`] flattens a shape into an ordered, deduplicated list of
//! [`Face`]s. Identity is content-addressed via [`FaceKey`]: two visits
//! describe the same face when the surface descriptor, UV domain and
//! accumulated placement agree bit for bit.
//!
//! # Example
//!
//! ```ignore
//! use brep_mesh::geom::{FaceGeometry, PlaneSurface, Point3, Shape, Vec3, explore_faces};
//!
//! let plane = PlaneSurface::new(Point3::ORIGIN, Vec3::X, Vec3::Y);
//! let face = Shape::face(FaceGeometry::full(plane));
//! let twice = Shape::compound(vec![face.clone(), Shape::compound(vec![face])]);
//!
//! let exploration = explore_faces(&twice);
//! assert_eq!(exploration.faces.len(), 1);
//! assert_eq!(exploration.duplicate_count, 1);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use super::core::{Point3, Transform, Vec3};
use super::surface::{
    ConeSurface, CylinderSurface, NurbsSurface, PlaneSurface, SphereSurface, Surface,
    SurfaceCacheKey, SurfaceKind, TorusSurface,
};

// ─────────────────────────────────────────────────────────────────────────────
// Orientation
// ─────────────────────────────────────────────────────────────────────────────

/// Orientation of a shape reference relative to its underlying geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Forward,
    Reversed,
    Internal,
    External,
}

impl Orientation {
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Reversed,
            Self::Reversed => Self::Forward,
            other => other,
        }
    }

    /// Orientation of a child reached through a parent with orientation `self`.
    #[must_use]
    pub const fn compose(self, child: Self) -> Self {
        match self {
            Self::Reversed => child.reversed(),
            _ => child,
        }
    }

    /// Whether triangles of a face with this orientation must be re-wound.
    ///
    /// Shared by the global assembler and the face-domain builder so both
    /// produce identical winding for the same face.
    #[must_use]
    pub const fn reverses_winding(self) -> bool {
        matches!(self, Self::Reversed)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UV domain
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ShapeError {
    #[error("uv domain bounds must be finite")]
    NonFiniteDomain,
    #[error("uv domain is inverted in {direction}: [{min}, {max}]")]
    InvertedDomain { direction: char, min: f64, max: f64 },
}

/// A rectangular domain in UV parameter space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvDomain {
    pub u_min: f64,
    pub u_max: f64,
    pub v_min: f64,
    pub v_max: f64,
}

impl UvDomain {
    #[must_use]
    pub const fn new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
        }
    }

    /// Checked constructor; [`UvDomain::new`] accepts anything and defers
    /// validation to tessellation.
    pub fn try_new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Result<Self, ShapeError> {
        let domain = Self::new(u_min, u_max, v_min, v_max);
        if ![u_min, u_max, v_min, v_max].iter().all(|x| x.is_finite()) {
            return Err(ShapeError::NonFiniteDomain);
        }
        if u_min > u_max {
            return Err(ShapeError::InvertedDomain {
                direction: 'u',
                min: u_min,
                max: u_max,
            });
        }
        if v_min > v_max {
            return Err(ShapeError::InvertedDomain {
                direction: 'v',
                min: v_min,
                max: v_max,
            });
        }
        Ok(domain)
    }

    /// Create a unit domain [0, 1] x [0, 1].
    #[must_use]
    pub const fn unit() -> Self {
        Self::new(0.0, 1.0, 0.0, 1.0)
    }

    /// Check if this domain is valid (finite, min <= max for both axes).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.u_min.is_finite()
            && self.u_max.is_finite()
            && self.v_min.is_finite()
            && self.v_max.is_finite()
            && self.u_min <= self.u_max
            && self.v_min <= self.v_max
    }

    #[must_use]
    pub fn u_span(&self) -> f64 {
        self.u_max - self.u_min
    }

    #[must_use]
    pub fn v_span(&self) -> f64 {
        self.v_max - self.v_min
    }

    /// True when either span is zero, so the domain encloses no area.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.u_span() <= 0.0 || self.v_span() <= 0.0
    }

    fn to_bits(self) -> [u64; 4] {
        [
            self.u_min.to_bits(),
            self.u_max.to_bits(),
            self.v_min.to_bits(),
            self.v_max.to_bits(),
        ]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Face geometry
// ─────────────────────────────────────────────────────────────────────────────

/// Underlying surface of a face.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceSurface {
    Plane(PlaneSurface),
    Cylinder(CylinderSurface),
    Cone(ConeSurface),
    Sphere(SphereSurface),
    Torus(TorusSurface),
    Nurbs(NurbsSurface),
}

impl FaceSurface {
    fn as_dyn(&self) -> &dyn Surface {
        match self {
            Self::Plane(s) => s,
            Self::Cylinder(s) => s,
            Self::Cone(s) => s,
            Self::Sphere(s) => s,
            Self::Torus(s) => s,
            Self::Nurbs(s) => s,
        }
    }
}

impl Surface for FaceSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.as_dyn().point_at(u, v)
    }

    fn domain_u(&self) -> (f64, f64) {
        self.as_dyn().domain_u()
    }

    fn domain_v(&self) -> (f64, f64) {
        self.as_dyn().domain_v()
    }

    fn is_u_closed(&self) -> bool {
        self.as_dyn().is_u_closed()
    }

    fn is_v_closed(&self) -> bool {
        self.as_dyn().is_v_closed()
    }

    fn pole_v_start(&self) -> bool {
        self.as_dyn().pole_v_start()
    }

    fn pole_v_end(&self) -> bool {
        self.as_dyn().pole_v_end()
    }

    fn partial_derivatives_at(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        self.as_dyn().partial_derivatives_at(u, v)
    }

    fn normal_at(&self, u: f64, v: f64) -> Option<Vec3> {
        self.as_dyn().normal_at(u, v)
    }

    fn cache_key(&self) -> SurfaceCacheKey {
        self.as_dyn().cache_key()
    }

    fn kind(&self) -> SurfaceKind {
        self.as_dyn().kind()
    }
}

macro_rules! impl_from_surface {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for FaceSurface {
                fn from(surface: $ty) -> Self {
                    Self::$variant(surface)
                }
            }
        )*
    };
}

impl_from_surface!(
    PlaneSurface => Plane,
    CylinderSurface => Cylinder,
    ConeSurface => Cone,
    SphereSurface => Sphere,
    TorusSurface => Torus,
    NurbsSurface => Nurbs,
);

/// Stable descriptor of a face's geometry, independent of placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceGeometryKey {
    surface: SurfaceCacheKey,
    domain: [u64; 4],
}

/// A surface bounded by a rectangular UV domain, in local coordinates.
///
/// Implements [`Surface`] restricted to its domain: closedness and poles
/// only hold when the domain spans the full surface period.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceGeometry {
    surface: FaceSurface,
    domain: UvDomain,
}

impl FaceGeometry {
    #[must_use]
    pub fn new(surface: impl Into<FaceSurface>, domain: UvDomain) -> Self {
        Self {
            surface: surface.into(),
            domain,
        }
    }

    /// Face covering the whole parameter domain of `surface`.
    #[must_use]
    pub fn full(surface: impl Into<FaceSurface>) -> Self {
        let surface = surface.into();
        let (u0, u1) = surface.domain_u();
        let (v0, v1) = surface.domain_v();
        Self {
            surface,
            domain: UvDomain::new(u0, u1, v0, v1),
        }
    }

    #[must_use]
    pub const fn surface(&self) -> &FaceSurface {
        &self.surface
    }

    #[must_use]
    pub const fn domain(&self) -> UvDomain {
        self.domain
    }

    #[must_use]
    pub fn key(&self) -> FaceGeometryKey {
        FaceGeometryKey {
            surface: self.surface.cache_key(),
            domain: self.domain.to_bits(),
        }
    }

    fn spans_full_u(&self) -> bool {
        let (u0, u1) = self.surface.domain_u();
        self.domain.u_min <= u0 && self.domain.u_max >= u1
    }

    fn spans_full_v(&self) -> bool {
        let (v0, v1) = self.surface.domain_v();
        self.domain.v_min <= v0 && self.domain.v_max >= v1
    }
}

impl Surface for FaceGeometry {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.surface.point_at(u, v)
    }

    fn domain_u(&self) -> (f64, f64) {
        (self.domain.u_min, self.domain.u_max)
    }

    fn domain_v(&self) -> (f64, f64) {
        (self.domain.v_min, self.domain.v_max)
    }

    fn is_u_closed(&self) -> bool {
        self.surface.is_u_closed() && self.spans_full_u()
    }

    fn is_v_closed(&self) -> bool {
        self.surface.is_v_closed() && self.spans_full_v()
    }

    fn pole_v_start(&self) -> bool {
        self.surface.pole_v_start()
            && self.spans_full_u()
            && self.domain.v_min <= self.surface.domain_v().0
    }

    fn pole_v_end(&self) -> bool {
        self.surface.pole_v_end()
            && self.spans_full_u()
            && self.domain.v_max >= self.surface.domain_v().1
    }

    fn normal_at(&self, u: f64, v: f64) -> Option<Vec3> {
        self.surface.normal_at(u, v)
    }

    fn cache_key(&self) -> SurfaceCacheKey {
        self.surface.cache_key()
    }

    fn kind(&self) -> SurfaceKind {
        self.surface.kind()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shape tree
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ShapeNode {
    Face(Arc<FaceGeometry>),
    Shell(Vec<Shape>),
    Solid(Vec<Shape>),
    Compound(Vec<Shape>),
}

/// A located, oriented reference to a shared topology node.
#[derive(Debug, Clone)]
pub struct Shape {
    node: Arc<ShapeNode>,
    location: Transform,
    orientation: Orientation,
}

impl Shape {
    fn from_node(node: ShapeNode) -> Self {
        Self {
            node: Arc::new(node),
            location: Transform::identity(),
            orientation: Orientation::Forward,
        }
    }

    #[must_use]
    pub fn face(geometry: FaceGeometry) -> Self {
        Self::from_node(ShapeNode::Face(Arc::new(geometry)))
    }

    /// Face shape sharing already-allocated geometry.
    #[must_use]
    pub fn shared_face(geometry: Arc<FaceGeometry>) -> Self {
        Self::from_node(ShapeNode::Face(geometry))
    }

    #[must_use]
    pub fn shell(children: Vec<Shape>) -> Self {
        Self::from_node(ShapeNode::Shell(children))
    }

    #[must_use]
    pub fn solid(children: Vec<Shape>) -> Self {
        Self::from_node(ShapeNode::Solid(children))
    }

    #[must_use]
    pub fn compound(children: Vec<Shape>) -> Self {
        Self::from_node(ShapeNode::Compound(children))
    }

    /// The empty compound, standing in for a null shape.
    #[must_use]
    pub fn empty() -> Self {
        Self::compound(Vec::new())
    }

    /// Same node, moved by `transform` (applied after the current location).
    #[must_use]
    pub fn moved(&self, transform: Transform) -> Self {
        Self {
            node: Arc::clone(&self.node),
            location: transform.compose(self.location),
            orientation: self.orientation,
        }
    }

    /// Same node with the opposite orientation.
    #[must_use]
    pub fn reversed(&self) -> Self {
        self.oriented(self.orientation.reversed())
    }

    #[must_use]
    pub fn oriented(&self, orientation: Orientation) -> Self {
        Self {
            node: Arc::clone(&self.node),
            location: self.location,
            orientation,
        }
    }

    #[must_use]
    pub fn node(&self) -> &ShapeNode {
        &self.node
    }

    #[must_use]
    pub const fn location(&self) -> Transform {
        self.location
    }

    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Direct children; empty for faces.
    #[must_use]
    pub fn children(&self) -> &[Shape] {
        match self.node.as_ref() {
            ShapeNode::Face(_) => &[],
            ShapeNode::Shell(children)
            | ShapeNode::Solid(children)
            | ShapeNode::Compound(children) => children,
        }
    }

    /// True if a solid node is reachable anywhere below this shape.
    #[must_use]
    pub fn contains_solid(&self) -> bool {
        matches!(self.node.as_ref(), ShapeNode::Solid(_))
            || self.children().iter().any(Self::contains_solid)
    }

    /// True when no face is reachable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.node.as_ref() {
            ShapeNode::Face(_) => false,
            _ => self.children().iter().all(Self::is_empty),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Faces and exploration
// ─────────────────────────────────────────────────────────────────────────────

/// Content-addressed identity of a placed face.
///
/// Orientation is deliberately excluded: a face reached once forward and
/// once reversed at the same placement is the same topological face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceKey {
    geometry: FaceGeometryKey,
    placement: [u64; 12],
}

impl FaceKey {
    #[must_use]
    pub const fn geometry(&self) -> FaceGeometryKey {
        self.geometry
    }
}

/// A face as reached from the root, with accumulated placement and orientation.
#[derive(Debug, Clone)]
pub struct Face {
    geometry: Arc<FaceGeometry>,
    location: Transform,
    orientation: Orientation,
}

impl Face {
    #[must_use]
    pub fn new(geometry: Arc<FaceGeometry>, location: Transform, orientation: Orientation) -> Self {
        Self {
            geometry,
            location,
            orientation,
        }
    }

    #[must_use]
    pub fn geometry(&self) -> &Arc<FaceGeometry> {
        &self.geometry
    }

    #[must_use]
    pub const fn location(&self) -> Transform {
        self.location
    }

    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub fn key(&self) -> FaceKey {
        FaceKey {
            geometry: self.geometry.key(),
            placement: self.location.to_bits(),
        }
    }

    /// Face surface point at `(u, v)` in world coordinates.
    #[must_use]
    pub fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.location.apply_point(self.geometry.point_at(u, v))
    }
}

/// Ordered, deduplicated faces of a shape.
#[derive(Debug, Clone, Default)]
pub struct FaceExploration {
    /// Faces in depth-first traversal order; the index is the face id.
    pub faces: Vec<Face>,
    /// Face visits skipped because their [`FaceKey`] was already seen.
    pub duplicate_count: usize,
}

/// Collects every face below `shape`, however deeply nested.
#[must_use]
pub fn explore_faces(shape: &Shape) -> FaceExploration {
    let mut seen = HashSet::new();
    let mut exploration = FaceExploration::default();
    collect_faces(
        shape,
        Transform::identity(),
        Orientation::Forward,
        &mut seen,
        &mut exploration,
    );
    log::debug!(
        "explored {} faces ({} duplicates skipped)",
        exploration.faces.len(),
        exploration.duplicate_count
    );
    exploration
}

fn collect_faces(
    shape: &Shape,
    parent_location: Transform,
    parent_orientation: Orientation,
    seen: &mut HashSet<FaceKey>,
    out: &mut FaceExploration,
) {
    let location = parent_location.compose(shape.location);
    let orientation = parent_orientation.compose(shape.orientation);

    match shape.node.as_ref() {
        ShapeNode::Face(geometry) => {
            let face = Face::new(Arc::clone(geometry), location, orientation);
            if seen.insert(face.key()) {
                out.faces.push(face);
            } else {
                out.duplicate_count += 1;
            }
        }
        ShapeNode::Shell(children) | ShapeNode::Solid(children) | ShapeNode::Compound(children) => {
            for child in children {
                collect_faces(child, location, orientation, seen, out);
            }
        }
    }
}
