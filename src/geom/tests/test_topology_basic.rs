//! Tests for the shape tree and face exploration.

use std::sync::Arc;

use super::{plane_face, unit_cube};
use crate::geom::{
    CylinderSurface, FaceGeometry, Orientation, PlaneSurface, Point3, Shape, ShapeError, Surface,
    Transform, UvDomain, Vec3, explore_faces,
};

#[test]
fn orientation_composes_through_reversed_parents() {
    use Orientation::{External, Forward, Internal, Reversed};

    assert_eq!(Forward.compose(Reversed), Reversed);
    assert_eq!(Reversed.compose(Reversed), Forward);
    assert_eq!(Reversed.compose(Forward), Reversed);
    assert_eq!(Reversed.compose(Internal), Internal);
    assert_eq!(Forward.reversed(), Reversed);
    assert_eq!(External.reversed(), External);

    assert!(Reversed.reverses_winding());
    assert!(!Forward.reverses_winding());
    assert!(!Internal.reverses_winding());
    assert!(!External.reverses_winding());
}

#[test]
fn uv_domain_checked_constructor() {
    assert!(UvDomain::try_new(0.0, 1.0, -1.0, 2.0).is_ok());
    assert_eq!(
        UvDomain::try_new(0.0, f64::NAN, 0.0, 1.0),
        Err(ShapeError::NonFiniteDomain)
    );
    assert_eq!(
        UvDomain::try_new(0.0, 1.0, 2.0, 1.0),
        Err(ShapeError::InvertedDomain {
            direction: 'v',
            min: 2.0,
            max: 1.0
        })
    );

    let flat = UvDomain::new(0.0, 1.0, 0.5, 0.5);
    assert!(flat.is_valid());
    assert!(flat.is_degenerate());
    assert!(!UvDomain::new(1.0, 0.0, 0.0, 1.0).is_valid());
}

#[test]
fn partial_domain_opens_closed_surfaces() {
    let cylinder = CylinderSurface::new(Point3::ORIGIN, Vec3::Z, 1.0).expect("cylinder");

    let full = FaceGeometry::full(cylinder);
    assert!(full.is_u_closed());

    let half = FaceGeometry::new(cylinder, UvDomain::new(0.0, 0.5, 0.0, 1.0));
    assert!(!half.is_u_closed());
    assert_eq!(half.domain_u(), (0.0, 0.5));
    assert_ne!(full.key(), half.key());
}

#[test]
fn explore_collects_cube_faces_in_order() {
    let exploration = explore_faces(&unit_cube());
    assert_eq!(exploration.faces.len(), 6);
    assert_eq!(exploration.duplicate_count, 0);

    let first = &exploration.faces[0];
    assert_eq!(first.orientation(), Orientation::Forward);
    let p = first.point_at(1.0, 0.0);
    assert!(p.distance_to(Point3::new(0.0, 1.0, 0.0)) < 1e-12);
}

#[test]
fn shared_face_listed_twice_is_deduplicated() {
    let face = plane_face(Point3::ORIGIN, Vec3::X, Vec3::Y);
    let shape = Shape::compound(vec![face.clone(), Shape::compound(vec![face.clone()])]);

    let exploration = explore_faces(&shape);
    assert_eq!(exploration.faces.len(), 1);
    assert_eq!(exploration.duplicate_count, 1);
}

#[test]
fn same_face_reached_with_opposite_orientation_counts_once() {
    let face = plane_face(Point3::ORIGIN, Vec3::X, Vec3::Y);
    let shape = Shape::compound(vec![face.clone(), face.reversed()]);

    let exploration = explore_faces(&shape);
    assert_eq!(exploration.faces.len(), 1);
    assert_eq!(exploration.duplicate_count, 1);
}

#[test]
fn instanced_geometry_at_different_placements_is_kept() {
    let geometry = Arc::new(FaceGeometry::new(
        PlaneSurface::new(Point3::ORIGIN, Vec3::X, Vec3::Y),
        UvDomain::unit(),
    ));
    let face = Shape::shared_face(Arc::clone(&geometry));
    let moved = face.moved(Transform::translate(Vec3::new(0.0, 0.0, 5.0)));
    let shape = Shape::compound(vec![face, moved]);

    let exploration = explore_faces(&shape);
    assert_eq!(exploration.faces.len(), 2);
    assert_eq!(exploration.faces[0].key().geometry(), exploration.faces[1].key().geometry());
    assert_ne!(exploration.faces[0].key(), exploration.faces[1].key());

    let lifted = exploration.faces[1].point_at(0.0, 0.0);
    assert!(lifted.distance_to(Point3::new(0.0, 0.0, 5.0)) < 1e-12);
}

#[test]
fn placement_and_orientation_compose_from_the_root() {
    let face = plane_face(Point3::ORIGIN, Vec3::X, Vec3::Y)
        .moved(Transform::translate(Vec3::new(1.0, 0.0, 0.0)));
    let shell = Shape::shell(vec![face])
        .moved(Transform::translate(Vec3::new(0.0, 2.0, 0.0)))
        .reversed();

    let exploration = explore_faces(&shell);
    assert_eq!(exploration.faces.len(), 1);
    let face = &exploration.faces[0];
    assert_eq!(face.orientation(), Orientation::Reversed);
    assert!(face.point_at(0.0, 0.0).distance_to(Point3::new(1.0, 2.0, 0.0)) < 1e-12);
}

#[test]
fn empty_and_solid_queries() {
    assert!(Shape::empty().is_empty());
    assert!(Shape::compound(vec![Shape::shell(Vec::new())]).is_empty());
    assert!(!unit_cube().is_empty());
    assert!(unit_cube().contains_solid());
    assert!(!plane_face(Point3::ORIGIN, Vec3::X, Vec3::Y).contains_solid());
    assert!(explore_faces(&Shape::empty()).faces.is_empty());
}
