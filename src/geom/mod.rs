mod advisor;
mod assembler;
mod boundary;
mod cache;
mod core;
mod diagnostics;
mod domain;
mod mesh;
mod metrics;
mod smooth;
mod subdivision;
mod surface;
mod tessellation;
mod topology;
mod triangulation;

pub use advisor::{
    MeshQuality, ParameterValidation, ShapeComplexity, analyze_shape, analyze_shape_with_context,
    estimate_memory_usage_mb, estimate_triangle_count, preset_parameters, recommend_parameters,
    recommended_deflection, validate_parameters,
};
pub(crate) use assembler::conversion_diagnostics;
pub use assembler::{
    FaceIndexMapping, TriangleSegment, assemble_face_meshes, convert_to_mesh_with_face_mapping,
};
pub use boundary::{BoundaryTriangle, identify_boundary_triangles, triangle_face_map};
pub use cache::{TriangulationCache, TriangulationCacheStats, TriangulationKey};
pub use core::{BBox, Point3, Tolerance, Transform, Vec3};
pub use diagnostics::ConversionDiagnostics;
pub use domain::{FaceDomain, build_face_domains};
pub use mesh::{
    EdgeTopology, GeomContext, MeshError, MeshStatistics, TriangleMesh, compute_vertex_normals,
};
pub use metrics::{GeomMetrics, GeomTimingReport, TimingBucket};
pub use smooth::{SmoothingDiagnostics, smooth_normals};
pub use subdivision::{SubdivisionDiagnostics, SubdivisionError, loop_beta, subdivide_loop};
pub use surface::{
    ConeSurface, CylinderSurface, NurbsSurface, PlaneSurface, SphereSurface, Surface,
    SurfaceCacheKey, SurfaceError, SurfaceKind, TorusSurface,
};
pub use tessellation::{
    FaceMesher, FaceTessellation, IncrementalMesher, KernelError, MeshParameters,
    RawTriangulation, ShapeTessellation, SurfaceTessellationOptions, TessellationError,
    choose_surface_grid_counts, sample_grid_parameters, sample_surface_grid, tessellate_faces,
    tessellate_shape,
};
pub use topology::{
    Face, FaceExploration, FaceGeometry, FaceGeometryKey, FaceKey, FaceSurface, Orientation,
    Shape, ShapeError, ShapeNode, UvDomain, explore_faces,
};
pub use triangulation::{
    GridTopology, compact_nodes, cull_degenerate_triangles, triangulate_surface_grid,
};

#[cfg(test)]
mod tests;
