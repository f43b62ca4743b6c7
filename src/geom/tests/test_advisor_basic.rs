//! Tests for shape analysis and parameter advice.

use super::unit_cube;
use crate::geom::{
    CylinderSurface, FaceGeometry, GeomContext, MeshParameters, MeshQuality, Point3, Shape,
    ShapeComplexity, Transform, Vec3, analyze_shape, analyze_shape_with_context,
    estimate_memory_usage_mb, estimate_triangle_count, preset_parameters, recommend_parameters,
    recommended_deflection, validate_parameters,
};

fn complexity(diagonal: f64, face_count: usize) -> ShapeComplexity {
    ShapeComplexity {
        bounding_box_diagonal: diagonal,
        face_count,
        surface_area: 100.0,
        ..ShapeComplexity::default()
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * b.abs().max(1.0)
}

#[test]
fn cube_analysis() {
    let c = analyze_shape(&unit_cube());

    assert_eq!(c.face_count, 6);
    assert_eq!(c.edge_count, 12);
    assert!(approx(c.surface_area, 6.0), "area {}", c.surface_area);
    assert!(approx(c.volume, 1.0), "volume {}", c.volume);
    assert!(approx(c.volume_to_surface_ratio, 1.0 / 6.0));
    assert!(approx(c.bounding_box_diagonal, 3.0_f64.sqrt()));
    assert!(!c.has_complex_surfaces);
    assert!(approx(c.average_curvature, 1.0));
    assert!(c.is_high_curvature());
}

#[test]
fn analysis_follows_placement() {
    let moved = unit_cube().moved(Transform::scale(2.0, 2.0, 2.0));
    let c = analyze_shape(&moved);
    assert!(approx(c.surface_area, 24.0));
    assert!(approx(c.volume, 8.0));
    assert!(approx(c.bounding_box_diagonal, 2.0 * 3.0_f64.sqrt()));
}

#[test]
fn reversed_solid_has_no_positive_volume() {
    let c = analyze_shape(&unit_cube().reversed());
    assert!(approx(c.surface_area, 6.0));
    assert!(c.volume.abs() < f64::EPSILON);
}

#[test]
fn open_cylinder_side() {
    let cylinder = CylinderSurface::new(Point3::ORIGIN, Vec3::new(0.0, 0.0, 2.0), 1.0)
        .expect("cylinder");
    let c = analyze_shape(&Shape::face(FaceGeometry::full(cylinder)));

    // Two rims and one seam.
    assert_eq!(c.edge_count, 3);
    assert!((c.surface_area - 4.0 * std::f64::consts::PI).abs() < 1e-9);
    assert!(c.volume.abs() < f64::EPSILON);
}

#[test]
fn empty_shape_has_zero_metrics() {
    assert_eq!(analyze_shape(&Shape::empty()), ShapeComplexity::default());
}

#[test]
fn context_analysis_matches() {
    let mut ctx = GeomContext::new();
    assert_eq!(
        analyze_shape_with_context(&unit_cube(), &mut ctx),
        analyze_shape(&unit_cube())
    );
}

#[test]
fn recommendations_scale_with_size() {
    let small = recommend_parameters(&complexity(5.0, 6));
    assert!(approx(small.deflection, 0.001));
    assert!(approx(small.angular_deflection, 0.05));
    assert!(!small.relative);
    assert!(!small.in_parallel);

    let medium = recommend_parameters(&complexity(50.0, 6));
    assert!(approx(medium.deflection, 0.01));
    assert!(approx(medium.angular_deflection, 0.1));

    let large = recommend_parameters(&complexity(500.0, 200));
    assert!(approx(large.deflection, 0.1));
    assert!(approx(large.angular_deflection, 0.2));
    assert!(large.in_parallel);

    let huge = recommend_parameters(&complexity(5000.0, 2000));
    assert!(approx(huge.deflection, 1.5));
    assert!(approx(huge.angular_deflection, 0.5));
}

#[test]
fn freeform_and_curvature_refine_recommendations() {
    let freeform = ShapeComplexity {
        has_complex_surfaces: true,
        ..complexity(50.0, 6)
    };
    let params = recommend_parameters(&freeform);
    assert!(approx(params.deflection, 0.005));
    assert!(approx(params.angular_deflection, 0.05));

    let curved = ShapeComplexity {
        average_curvature: 0.5,
        ..complexity(50.0, 6)
    };
    let params = recommend_parameters(&curved);
    assert!(approx(params.deflection, 0.007));
    assert!(approx(params.angular_deflection, 0.08));
}

#[test]
fn presets_follow_the_diagonal() {
    let c = complexity(10.0, 60);
    let medium = preset_parameters(&c, MeshQuality::Medium);
    assert!(approx(medium.deflection, 0.1));
    assert!(approx(medium.angular_deflection, 0.1));
    assert!(!medium.in_parallel);

    assert!(preset_parameters(&c, MeshQuality::Draft).in_parallel);
    assert!(!preset_parameters(&c, MeshQuality::Low).in_parallel);
    assert!(preset_parameters(&complexity(10.0, 1), MeshQuality::High).in_parallel);

    let deflections: Vec<f64> = MeshQuality::ALL
        .iter()
        .map(|&q| preset_parameters(&c, q).deflection)
        .collect();
    assert!(deflections.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(MeshQuality::default(), MeshQuality::Medium);
}

#[test]
fn triangle_estimates() {
    let plain = complexity(10.0, 6);
    assert_eq!(estimate_triangle_count(&plain, &MeshParameters::new(0.5, 0.2)), 800);
    assert_eq!(estimate_triangle_count(&plain, &MeshParameters::new(0.5, 0.1)), 1600);

    let freeform = ShapeComplexity {
        has_complex_surfaces: true,
        ..plain
    };
    assert_eq!(estimate_triangle_count(&freeform, &MeshParameters::new(0.5, 0.2)), 1200);

    let flat = ShapeComplexity {
        surface_area: 0.0,
        ..plain
    };
    assert_eq!(estimate_triangle_count(&flat, &MeshParameters::default()), 0);
    assert_eq!(estimate_triangle_count(&plain, &MeshParameters::new(0.0, 0.2)), 0);
}

#[test]
fn memory_estimate() {
    assert!(approx(estimate_memory_usage_mb(1024 * 1024), 230.0));
    assert!(estimate_memory_usage_mb(0).abs() < f64::EPSILON);
}

#[test]
fn recommended_deflection_by_quality() {
    assert!(approx(recommended_deflection(100.0, 0.0), 5.0));
    assert!(approx(recommended_deflection(100.0, 0.5), 0.5));
    assert!(approx(recommended_deflection(100.0, 1.0), 0.05));
    assert!(approx(recommended_deflection(100.0, 7.0), 0.05));
    assert!(approx(recommended_deflection(100.0, -1.0), 5.0));
}

#[test]
fn validation_flags_bad_and_unsuitable_parameters() {
    let ok = validate_parameters(&MeshParameters::default(), None);
    assert!(ok.is_valid);
    assert!(ok.warnings.is_empty());

    let bad = validate_parameters(&MeshParameters::new(-1.0, 4.0), None);
    assert!(!bad.is_valid);
    assert_eq!(bad.warnings.len(), 2);

    let c = complexity(10.0, 6);
    let coarse = validate_parameters(&MeshParameters::new(2.0, 0.5), Some(&c));
    assert!(coarse.is_valid);
    assert_eq!(
        coarse.warnings,
        vec!["deflection may be too coarse for this model".to_owned()]
    );

    let fine = validate_parameters(&MeshParameters::new(0.0005, 0.5), Some(&c));
    assert!(fine.is_valid);
    assert_eq!(fine.warnings.len(), 1);

    let nan = validate_parameters(&MeshParameters::new(f64::NAN, 0.5), Some(&c));
    assert!(!nan.is_valid);
    assert_eq!(nan.warnings.len(), 1);
}
