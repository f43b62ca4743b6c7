//! One-call conversion from a shape to every render product.
//!
//! [`MeshPipeline`] runs the stages in order: tessellate, assemble the
//! global mesh with its face mapping, detect boundary triangles, build the
//! per-face domains, smooth normals, and optionally subdivide a display copy.
//! Faces are tessellated once; the assembler and the domain builder share
//! the result.
//!
//! ```ignore
//! use brep_mesh::pipeline::{MeshPipeline, ProcessingConfig};
//!
//! let pipeline = MeshPipeline::new(ProcessingConfig::default());
//! let products = pipeline.convert_shape(&shape)?;
//! println!("{}", products.diagnostics);
//! ```

use serde::{Deserialize, Serialize};

use crate::geom::{
    BoundaryTriangle, ConversionDiagnostics, FaceDomain, FaceIndexMapping, FaceMesher,
    GeomContext, IncrementalMesher, MeshParameters, Shape, SmoothingDiagnostics,
    SubdivisionDiagnostics, SubdivisionError, TessellationError, TimingBucket, TriangleMesh,
    assemble_face_meshes, build_face_domains, conversion_diagnostics, identify_boundary_triangles,
    smooth_normals, subdivide_loop, tessellate_shape,
};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub enabled: bool,
    /// Degrees.
    pub crease_angle: f64,
    pub iterations: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            crease_angle: 30.0,
            iterations: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubdivisionConfig {
    pub enabled: bool,
    pub levels: usize,
}

impl Default for SubdivisionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            levels: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub mesh: MeshParameters,
    pub smoothing: SmoothingConfig,
    pub subdivision: SubdivisionConfig,
}

// ─────────────────────────────────────────────────────────────────────────────
// Products
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Tessellation(#[from] TessellationError),
    #[error("subdivision failed: {0}")]
    Subdivision(#[from] SubdivisionError),
}

/// Everything a renderer needs from one shape.
#[derive(Debug, Clone, Default)]
pub struct MeshProducts {
    /// Assembled mesh; normals are smoothed when smoothing is enabled.
    pub mesh: TriangleMesh,
    /// Refers to triangles of `mesh`, never of `refined_mesh`.
    pub face_mapping: FaceIndexMapping,
    pub boundary_triangles: Vec<BoundaryTriangle>,
    pub face_domains: Vec<FaceDomain>,
    /// Subdivided display copy, when subdivision is enabled.
    pub refined_mesh: Option<TriangleMesh>,
    pub smoothing: Option<SmoothingDiagnostics>,
    pub subdivision: Option<SubdivisionDiagnostics>,
    pub diagnostics: ConversionDiagnostics,
}

impl MeshProducts {
    /// The refined mesh if there is one, else the assembled mesh.
    #[must_use]
    pub fn display_mesh(&self) -> &TriangleMesh {
        self.refined_mesh.as_ref().unwrap_or(&self.mesh)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline
// ─────────────────────────────────────────────────────────────────────────────

pub struct MeshPipeline {
    config: ProcessingConfig,
    mesher: Box<dyn FaceMesher>,
}

impl MeshPipeline {
    /// Pipeline using the built-in [`IncrementalMesher`].
    #[must_use]
    pub fn new(config: ProcessingConfig) -> Self {
        Self::with_mesher(config, Box::new(IncrementalMesher::default()))
    }

    #[must_use]
    pub fn with_mesher(config: ProcessingConfig, mesher: Box<dyn FaceMesher>) -> Self {
        Self { config, mesher }
    }

    #[must_use]
    pub const fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Converts `shape` with a fresh [`GeomContext`].
    ///
    /// # Errors
    /// See [`MeshPipeline::convert`].
    pub fn convert_shape(&self, shape: &Shape) -> Result<MeshProducts, PipelineError> {
        self.convert(shape, &mut GeomContext::new())
    }

    /// Converts `shape`, reusing the triangulation cache in `ctx`.
    ///
    /// Every product is rebuilt on each call. An empty shape gives empty
    /// products and a warning.
    ///
    /// # Errors
    /// [`PipelineError::Tessellation`] when a face cannot be meshed or the
    /// mesh outgrows `u32` indices, [`PipelineError::Subdivision`] when the
    /// refined mesh would.
    pub fn convert(
        &self,
        shape: &Shape,
        ctx: &mut GeomContext,
    ) -> Result<MeshProducts, PipelineError> {
        let config = &self.config;
        ctx.metrics.begin();
        let stats = ctx.cache.stats();
        let cache_before = (stats.hits, stats.misses);

        let tessellation = tessellate_shape(shape, &config.mesh, self.mesher.as_ref(), ctx)?;
        let (mut mesh, face_mapping) = ctx
            .metrics
            .time(TimingBucket::Assembly, || assemble_face_meshes(&tessellation.faces))?;
        let boundary_triangles = ctx.metrics.time(TimingBucket::BoundaryDetection, || {
            identify_boundary_triangles(&face_mapping)
        });
        let face_domains = ctx
            .metrics
            .time(TimingBucket::FaceDomains, || build_face_domains(&tessellation.faces));

        let mut diagnostics =
            conversion_diagnostics(&tessellation, &mesh, &face_mapping, cache_before, ctx);
        diagnostics.boundary_triangle_count = boundary_triangles.len();
        if tessellation.faces.is_empty() {
            log::warn!("shape has no faces; returning empty products");
            diagnostics.add_warning("shape has no faces");
        }

        let mut smoothing = None;
        if config.smoothing.enabled && !mesh.is_empty() {
            let (smoothed, smoothing_diagnostics) = ctx.metrics.time(TimingBucket::Smoothing, || {
                smooth_normals(
                    &mesh,
                    config.smoothing.crease_angle,
                    config.smoothing.iterations,
                )
            });
            mesh = smoothed;
            smoothing = Some(smoothing_diagnostics);
        }

        let mut refined_mesh = None;
        let mut subdivision = None;
        if config.subdivision.enabled && !mesh.is_empty() {
            let (refined, subdivision_diagnostics) = ctx
                .metrics
                .time(TimingBucket::Subdivision, || {
                    subdivide_loop(&mesh, config.subdivision.levels)
                })?;
            refined_mesh = Some(refined);
            subdivision = Some(subdivision_diagnostics);
        }

        diagnostics.timing = ctx.metrics.end();
        log::debug!("{diagnostics}");

        Ok(MeshProducts {
            mesh,
            face_mapping,
            boundary_triangles,
            face_domains,
            refined_mesh,
            smoothing,
            subdivision,
            diagnostics,
        })
    }
}

impl Default for MeshPipeline {
    fn default() -> Self {
        Self::new(ProcessingConfig::default())
    }
}

impl std::fmt::Debug for MeshPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
