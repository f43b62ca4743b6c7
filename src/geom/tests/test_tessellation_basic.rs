//! Tests for the face mesher and shape tessellation.

use std::sync::Arc;

use super::{plane_face, unit_cube};
use crate::geom::{
    CylinderSurface, FaceGeometry, FaceMesher, GeomContext, IncrementalMesher, KernelError,
    MeshParameters, PlaneSurface, Point3, Shape, SphereSurface, SurfaceTessellationOptions,
    TessellationError, Transform, UvDomain, Vec3, choose_surface_grid_counts, tessellate_shape,
};

fn unit_plane() -> FaceGeometry {
    FaceGeometry::new(PlaneSurface::new(Point3::ORIGIN, Vec3::X, Vec3::Y), UvDomain::unit())
}

#[test]
fn mesh_parameters_defaults() {
    let params = MeshParameters::default();
    assert!((params.deflection - 0.1).abs() < f64::EPSILON);
    assert!((params.angular_deflection - 0.5).abs() < f64::EPSILON);
    assert!(!params.relative);
    assert!(params.in_parallel);

    let custom = MeshParameters::new(0.01, 0.2).with_relative(true).with_parallel(false);
    assert!(custom.relative);
    assert!(!custom.in_parallel);
}

#[test]
fn plane_needs_only_the_minimal_grid() {
    assert_eq!(
        choose_surface_grid_counts(&unit_plane(), SurfaceTessellationOptions::new(1e-6, 0.01)),
        (2, 2)
    );

    let raw = IncrementalMesher::default()
        .triangulate(&unit_plane(), &MeshParameters::default())
        .expect("kernel")
        .expect("triangulation");
    assert_eq!(raw.node_count(), 4);
    assert_eq!(raw.triangle_count(), 2);
}

#[test]
fn mesher_reports_node_parameters() {
    let raw = IncrementalMesher::default()
        .triangulate(&unit_plane(), &MeshParameters::default())
        .expect("kernel")
        .expect("triangulation");
    assert!(raw.has_uvs());

    // The unit plane maps (u, v) straight to (x, y).
    let mut corners = raw.uvs.clone();
    for (node, [u, v]) in raw.nodes.iter().zip(&raw.uvs) {
        assert_eq!((node.x, node.y, node.z), (*u, *v, 0.0));
    }
    corners.sort_by(|a, b| a.partial_cmp(b).expect("finite"));
    assert_eq!(corners, vec![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]);
}

#[test]
fn cylinder_grid_respects_deflection_and_angle() {
    let cylinder = CylinderSurface::new(Point3::ORIGIN, Vec3::Z, 1.0).expect("cylinder");
    let params = MeshParameters::new(0.1, 0.5);
    let raw = IncrementalMesher::default()
        .triangulate(&FaceGeometry::full(cylinder), &params)
        .expect("kernel")
        .expect("triangulation");

    // Two rings share the seam, so nodes and triangles match one to one.
    assert_eq!(raw.node_count(), raw.triangle_count());
    let segments = raw.node_count() / 2;
    #[allow(clippy::cast_precision_loss)]
    let half_angle = std::f64::consts::PI / segments as f64;
    assert!(1.0 - half_angle.cos() <= 0.1, "sag too large with {segments} segments");
    assert!(2.0 * half_angle <= 0.5, "angle too large with {segments} segments");

    for p in &raw.nodes {
        let radial = (p.x * p.x + p.y * p.y).sqrt();
        assert!((radial - 1.0).abs() < 1e-9);
    }
}

#[test]
fn finer_deflection_gives_more_triangles() {
    let cylinder = FaceGeometry::full(
        CylinderSurface::new(Point3::ORIGIN, Vec3::Z, 1.0).expect("cylinder"),
    );
    let mesher = IncrementalMesher::default();
    let coarse = mesher
        .triangulate(&cylinder, &MeshParameters::new(0.1, 1.0))
        .expect("kernel")
        .expect("triangulation");
    let fine = mesher
        .triangulate(&cylinder, &MeshParameters::new(0.001, 1.0))
        .expect("kernel")
        .expect("triangulation");
    assert!(fine.triangle_count() > coarse.triangle_count());
}

#[test]
fn relative_deflection_scales_with_face_size() {
    let cylinder = FaceGeometry::full(
        CylinderSurface::new(Point3::ORIGIN, Vec3::new(0.0, 0.0, 20.0), 10.0).expect("cylinder"),
    );
    let mesher = IncrementalMesher::default();
    let absolute = mesher
        .triangulate(&cylinder, &MeshParameters::new(0.01, 3.0))
        .expect("kernel")
        .expect("triangulation");
    let relative = mesher
        .triangulate(&cylinder, &MeshParameters::new(0.01, 3.0).with_relative(true))
        .expect("kernel")
        .expect("triangulation");
    assert!(relative.triangle_count() < absolute.triangle_count());
}

#[test]
fn sphere_poles_are_single_nodes() {
    let sphere = SphereSurface::new(Point3::ORIGIN, 2.0).expect("sphere");
    let raw = IncrementalMesher::default()
        .triangulate(&FaceGeometry::full(sphere), &MeshParameters::new(0.05, 0.5))
        .expect("kernel")
        .expect("triangulation");

    let south = raw.nodes.iter().filter(|p| (p.z + 2.0).abs() < 1e-9).count();
    let north = raw.nodes.iter().filter(|p| (p.z - 2.0).abs() < 1e-9).count();
    assert_eq!(south, 1);
    assert_eq!(north, 1);
    for p in &raw.nodes {
        assert!((p.to_vec3().length() - 2.0).abs() < 1e-9);
    }
}

#[test]
fn malformed_domain_is_a_kernel_error() {
    let face = FaceGeometry::new(
        PlaneSurface::new(Point3::ORIGIN, Vec3::X, Vec3::Y),
        UvDomain::new(1.0, 0.0, 0.0, 1.0),
    );
    let result = IncrementalMesher::default().triangulate(&face, &MeshParameters::default());
    assert!(matches!(result, Err(KernelError::MalformedDomain { .. })));
}

#[test]
fn degenerate_domain_yields_no_triangles() {
    let face = FaceGeometry::new(
        PlaneSurface::new(Point3::ORIGIN, Vec3::X, Vec3::Y),
        UvDomain::new(0.0, 1.0, 0.5, 0.5),
    );
    let result = IncrementalMesher::default().triangulate(&face, &MeshParameters::default());
    assert_eq!(result, Ok(None));
}

#[test]
fn non_finite_surface_is_a_kernel_error() {
    let face = FaceGeometry::new(
        PlaneSurface::new(Point3::new(f64::NAN, 0.0, 0.0), Vec3::X, Vec3::Y),
        UvDomain::unit(),
    );
    let result = IncrementalMesher::default().triangulate(&face, &MeshParameters::default());
    assert_eq!(result, Err(KernelError::NonFiniteGeometry));
}

#[test]
fn kernel_errors_carry_the_face_id() {
    let good = plane_face(Point3::ORIGIN, Vec3::X, Vec3::Y);
    let bad = Shape::face(FaceGeometry::new(
        PlaneSurface::new(Point3::ORIGIN, Vec3::X, Vec3::Z),
        UvDomain::new(0.0, 1.0, 1.0, 0.0),
    ));
    let shape = Shape::compound(vec![good, bad]);

    let err = tessellate_shape(
        &shape,
        &MeshParameters::default(),
        &IncrementalMesher::default(),
        &mut GeomContext::new(),
    )
    .expect_err("malformed face");
    assert!(matches!(err, TessellationError::Kernel { face_id: 1, .. }));
}

#[test]
fn singular_placement_is_rejected() {
    let flat = plane_face(Point3::ORIGIN, Vec3::X, Vec3::Y)
        .moved(Transform::scale(1.0, 0.0, 1.0));

    let err = tessellate_shape(
        &flat,
        &MeshParameters::default(),
        &IncrementalMesher::default(),
        &mut GeomContext::new(),
    )
    .expect_err("singular placement");
    assert_eq!(err, TessellationError::SingularPlacement { face_id: 0 });
}

#[test]
fn second_conversion_is_served_from_cache() {
    let mut ctx = GeomContext::new();
    let params = MeshParameters::default();
    let mesher = IncrementalMesher::default();

    let first = tessellate_shape(&unit_cube(), &params, &mesher, &mut ctx).expect("first");
    let stats = ctx.cache.stats();
    assert_eq!(first.faces.len(), 6);
    assert_eq!(stats.entries, 6);
    assert_eq!(stats.misses, 6);
    assert_eq!(stats.hits, 0);

    let second = tessellate_shape(&unit_cube(), &params, &mesher, &mut ctx).expect("second");
    let stats = ctx.cache.stats();
    assert_eq!(stats.entries, 6);
    assert_eq!(stats.hits, 6);
    for (a, b) in first.faces.iter().zip(&second.faces) {
        let (a, b) = (a.triangulation.as_ref(), b.triangulation.as_ref());
        assert!(Arc::ptr_eq(a.expect("meshed"), b.expect("meshed")));
    }

    let finer = MeshParameters::new(0.01, 0.5);
    tessellate_shape(&unit_cube(), &finer, &mesher, &mut ctx).expect("third");
    assert_eq!(ctx.cache.stats().entries, 12);
}

#[test]
fn instanced_faces_are_meshed_once() {
    let geometry = Arc::new(unit_plane());
    let base = Shape::shared_face(Arc::clone(&geometry));
    let shape = Shape::compound(vec![
        base.clone(),
        base.moved(Transform::translate(Vec3::new(2.0, 0.0, 0.0))),
        base.moved(Transform::translate(Vec3::new(4.0, 0.0, 0.0))),
    ]);

    let mut ctx = GeomContext::new();
    let tessellation = tessellate_shape(
        &shape,
        &MeshParameters::default(),
        &IncrementalMesher::default(),
        &mut ctx,
    )
    .expect("tessellate");

    assert_eq!(tessellation.faces.len(), 3);
    assert_eq!(ctx.cache.stats().entries, 1);
    assert_eq!(ctx.cache.stats().misses, 1);

    let shifted = tessellation.faces[2].placed_nodes();
    assert!(shifted.iter().all(|p| p.x >= 4.0 - 1e-12));
}

#[test]
fn reversed_face_rewinds_its_triangles() {
    let face = plane_face(Point3::ORIGIN, Vec3::X, Vec3::Y);
    let mut ctx = GeomContext::new();
    let params = MeshParameters::default();
    let mesher = IncrementalMesher::default();

    let forward = tessellate_shape(&face, &params, &mesher, &mut ctx).expect("forward");
    let reversed = tessellate_shape(&face.reversed(), &params, &mesher, &mut ctx).expect("reversed");

    let f = forward.faces[0].oriented_triangles();
    let r = reversed.faces[0].oriented_triangles();
    assert_eq!(f.len(), r.len());
    for (&[a, b, c], &rev) in f.iter().zip(&r) {
        assert_eq!(rev, [a, c, b]);
    }
}

#[test]
fn failed_faces_are_listed() {
    struct NothingMesher;

    impl FaceMesher for NothingMesher {
        fn triangulate(
            &self,
            _face: &FaceGeometry,
            _params: &MeshParameters,
        ) -> Result<Option<crate::geom::RawTriangulation>, KernelError> {
            Ok(None)
        }
    }

    let tessellation = tessellate_shape(
        &unit_cube(),
        &MeshParameters::default(),
        &NothingMesher,
        &mut GeomContext::new(),
    )
    .expect("tessellate");
    assert_eq!(tessellation.failed_face_ids(), vec![0, 1, 2, 3, 4, 5]);
    assert!(tessellation.faces.iter().all(|f| f.placed_nodes().is_empty()));
}

#[test]
fn cached_results_are_scoped_to_the_mesher() {
    struct NothingMesher;

    impl FaceMesher for NothingMesher {
        fn triangulate(
            &self,
            _face: &FaceGeometry,
            _params: &MeshParameters,
        ) -> Result<Option<crate::geom::RawTriangulation>, KernelError> {
            Ok(None)
        }
    }

    let square = Shape::face(unit_plane());
    let params = MeshParameters::default();
    let mut ctx = GeomContext::new();

    let empty = tessellate_shape(&square, &params, &NothingMesher, &mut ctx).expect("nothing");
    assert_eq!(empty.faces[0].triangle_count(), 0);

    let meshed = tessellate_shape(&square, &params, &IncrementalMesher::default(), &mut ctx)
        .expect("incremental");
    assert_eq!(meshed.faces[0].triangle_count(), 2);

    let capped = IncrementalMesher {
        max_iterations: 1,
        ..IncrementalMesher::default()
    };
    assert_ne!(capped.cache_tag(), IncrementalMesher::default().cache_tag());
    assert_eq!(
        IncrementalMesher::default().cache_tag(),
        IncrementalMesher::default().cache_tag()
    );
    assert_eq!(ctx.cache.len(), 2);
}
