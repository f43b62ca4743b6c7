mod test_advisor_basic;
mod test_boundary_basic;
mod test_domain_basic;
mod test_subdivision_basic;
mod test_tessellation_basic;
mod test_topology_basic;

use crate::geom::{FaceGeometry, PlaneSurface, Point3, Shape, TriangleMesh, UvDomain, Vec3};

/// Planar face on the unit square of the parallelogram `origin + u*a + v*b`.
pub(super) fn plane_face(origin: Point3, a: Vec3, b: Vec3) -> Shape {
    Shape::face(FaceGeometry::new(PlaneSurface::new(origin, a, b), UvDomain::unit()))
}

/// Unit cube as a solid of six planar faces with outward `u × v` normals.
pub(super) fn unit_cube() -> Shape {
    let (x, y, z) = (Vec3::X, Vec3::Y, Vec3::Z);
    Shape::solid(vec![Shape::shell(vec![
        plane_face(Point3::new(0.0, 0.0, 0.0), y, x),
        plane_face(Point3::new(0.0, 0.0, 1.0), x, y),
        plane_face(Point3::new(0.0, 0.0, 0.0), x, z),
        plane_face(Point3::new(0.0, 1.0, 0.0), z, x),
        plane_face(Point3::new(0.0, 0.0, 0.0), z, y),
        plane_face(Point3::new(1.0, 0.0, 0.0), y, z),
    ])])
}

/// One counter-clockwise triangle in the XY plane.
pub(super) fn single_triangle() -> TriangleMesh {
    TriangleMesh::new(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        vec![0, 1, 2],
    )
}

/// Closed corner tetrahedron with outward winding.
pub(super) fn tetrahedron() -> TriangleMesh {
    TriangleMesh::new(
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ],
        vec![0, 2, 1, 0, 1, 3, 1, 2, 3, 0, 3, 2],
    )
}

/// Signed area of a triangle projected on the XY plane.
pub(super) fn signed_area_xy(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> f64 {
    0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]))
}
