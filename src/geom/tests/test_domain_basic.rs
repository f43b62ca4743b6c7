//! Tests for per-face domains.

use super::{plane_face, signed_area_xy, unit_cube};
use crate::geom::{
    FaceGeometry, FaceMesher, GeomContext, IncrementalMesher, KernelError, MeshParameters,
    PlaneSurface, Point3, RawTriangulation, Shape, ShapeTessellation, Surface, SurfaceKind,
    Transform, UvDomain, Vec3, assemble_face_meshes, build_face_domains, explore_faces,
    tessellate_shape,
};

fn tessellate(shape: &Shape) -> ShapeTessellation {
    tessellate_shape(
        shape,
        &MeshParameters::new(0.1, 0.5),
        &IncrementalMesher::default(),
        &mut GeomContext::new(),
    )
    .expect("tessellate")
}

fn domain_area(points: &[Point3], triangles: &[[u32; 3]]) -> f64 {
    triangles
        .iter()
        .map(|&[a, b, c]| {
            signed_area_xy(
                points[a as usize].to_array(),
                points[b as usize].to_array(),
                points[c as usize].to_array(),
            )
        })
        .sum()
}

#[test]
fn one_domain_per_extracted_face() {
    let cube = unit_cube();
    let domains = build_face_domains(&tessellate(&cube).faces);

    assert_eq!(domains.len(), explore_faces(&cube).faces.len());
    for (face_id, domain) in domains.iter().enumerate() {
        assert_eq!(domain.face_id, face_id);
        assert!(domain.is_valid);
        assert_eq!(domain.vertex_count(), 4);
        assert_eq!(domain.triangle_count(), 2);
    }
}

#[test]
fn domains_match_the_global_mesh() {
    let tessellation = tessellate(&unit_cube());
    let domains = build_face_domains(&tessellation.faces);
    let (mesh, mapping) = assemble_face_meshes(&tessellation.faces).expect("assemble");

    for domain in &domains {
        let global = mapping.triangles_for_face(domain.face_id);
        assert_eq!(global.len(), domain.triangle_count());
        for (&t, local) in global.iter().zip(&domain.triangles) {
            let tri = mesh.triangle(t).expect("triangle");
            for (g, l) in tri.iter().zip(local) {
                assert_eq!(mesh.positions[*g as usize], domain.points[*l as usize].to_array());
            }
        }
    }
}

#[test]
fn domains_use_placed_coordinates() {
    let face = plane_face(Point3::ORIGIN, Vec3::X, Vec3::Y)
        .moved(Transform::translate(Vec3::new(0.0, 0.0, 3.0)));
    let domains = build_face_domains(&tessellate(&face).faces);
    assert!(domains[0].points.iter().all(|p| (p.z - 3.0).abs() < 1e-12));
}

#[test]
fn reversed_domain_has_opposite_signed_area() {
    let face = plane_face(Point3::ORIGIN, Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0));
    let forward = build_face_domains(&tessellate(&face).faces);
    let reversed = build_face_domains(&tessellate(&face.reversed()).faces);

    let a = domain_area(&forward[0].points, &forward[0].triangles);
    let b = domain_area(&reversed[0].points, &reversed[0].triangles);
    assert!((a - 6.0).abs() < 1e-12);
    assert!((b + 6.0).abs() < 1e-12);
}

#[test]
fn failed_face_gets_an_invalid_domain() {
    struct PlanesOnly;

    impl FaceMesher for PlanesOnly {
        fn triangulate(
            &self,
            face: &FaceGeometry,
            params: &MeshParameters,
        ) -> Result<Option<RawTriangulation>, KernelError> {
            if face.kind() == SurfaceKind::Plane && face.domain().u_min < 0.25 {
                IncrementalMesher::default().triangulate(face, params)
            } else {
                Ok(None)
            }
        }
    }

    let shape = Shape::compound(vec![
        plane_face(Point3::ORIGIN, Vec3::X, Vec3::Y),
        Shape::face(FaceGeometry::new(
            PlaneSurface::new(Point3::ORIGIN, Vec3::X, Vec3::Z),
            UvDomain::new(0.5, 1.0, 0.0, 1.0),
        )),
    ]);
    let tessellation = tessellate_shape(
        &shape,
        &MeshParameters::default(),
        &PlanesOnly,
        &mut GeomContext::new(),
    )
    .expect("tessellate");
    let domains = build_face_domains(&tessellation.faces);

    assert_eq!(domains.len(), 2);
    assert!(domains[0].is_valid);
    assert!(!domains[1].is_valid);
    assert_eq!(domains[1].face_id, 1);
    assert!(domains[1].is_empty());
    assert_eq!(domains[1].vertex_count(), 0);
}

#[test]
fn buffers_flatten_points_and_triangles() {
    let face = plane_face(Point3::ORIGIN, Vec3::X, Vec3::Y);
    let domain = build_face_domains(&tessellate(&face).faces).remove(0);

    let (positions, indices) = domain.to_buffers();
    assert_eq!(positions.len(), domain.vertex_count());
    assert_eq!(indices.len(), domain.triangle_count() * 3);
    assert!(indices.iter().all(|&i| (i as usize) < positions.len()));
}
