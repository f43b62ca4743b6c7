//! Diagnostics for shape-to-mesh conversion.
//!
//! [`ConversionDiagnostics`] is returned with every converted mesh. It
//! records what the tessellator saw (faces, duplicates, failures), what the
//! assembler produced (counts and edge topology), cache behaviour, and
//! human-readable warnings.
//!
//! # Example
//!
//! ```ignore
//! use brep_mesh::pipeline::MeshPipeline;
//!
//! let products = MeshPipeline::default().convert_shape(&shape)?;
//! let diagnostics = &products.diagnostics;
//!
//! if diagnostics.is_watertight() {
//!     println!("closed mesh with {} triangles", diagnostics.triangle_count);
//! }
//! for warning in &diagnostics.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! ```

use std::fmt;

use super::metrics::GeomTimingReport;

/// Summary of one conversion.
///
/// # Face Accounting
///
/// - `face_count`: unique faces extracted (the face id range)
/// - `duplicate_face_count`: face visits dropped by `FaceKey` deduplication
/// - `failed_face_count`: faces that produced no triangulation; each keeps an
///   empty mapping segment and an invalid face domain
///
/// # Topology Metrics
///
/// - `open_edge_count`: edges with only one adjacent triangle
/// - `non_manifold_edge_count`: edges with more than two adjacent triangles
///
/// Faces are meshed independently and never welded, so a closed solid still
/// reports open edges along its face borders.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConversionDiagnostics {
    pub face_count: usize,
    pub duplicate_face_count: usize,
    pub failed_face_count: usize,

    /// Total number of vertices in the assembled mesh.
    pub vertex_count: usize,

    /// Total number of triangles in the assembled mesh.
    pub triangle_count: usize,

    /// Sum of all face segment sizes. Equals `triangle_count` unless a
    /// mapping was supplied from outside.
    pub mapped_triangle_count: usize,

    /// Triangles owned by more than one face.
    pub boundary_triangle_count: usize,

    pub open_edge_count: usize,
    pub non_manifold_edge_count: usize,

    /// Triangulation cache lookups served from earlier conversions.
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Timing breakdown, when the `metrics` feature is enabled.
    pub timing: Option<GeomTimingReport>,

    pub warnings: Vec<String>,
}

impl ConversionDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every extracted face produced triangles.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failed_face_count == 0
    }

    /// No open and no non-manifold edges.
    #[must_use]
    pub const fn is_watertight(&self) -> bool {
        self.open_edge_count == 0 && self.non_manifold_edge_count == 0
    }

    /// Complete, watertight and free of warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.is_complete() && self.is_watertight() && self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

impl fmt::Display for ConversionDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} faces ({} duplicate, {} failed) -> {} vertices, {} triangles",
            self.face_count,
            self.duplicate_face_count,
            self.failed_face_count,
            self.vertex_count,
            self.triangle_count
        )?;
        if self.boundary_triangle_count > 0 {
            write!(f, ", {} shared triangles", self.boundary_triangle_count)?;
        }
        if !self.is_watertight() {
            write!(
                f,
                ", {} open / {} non-manifold edges",
                self.open_edge_count, self.non_manifold_edge_count
            )?;
        }
        if let Some(timing) = &self.timing {
            write!(f, ", {:.3} ms", timing.total_ms())?;
        }
        if !self.warnings.is_empty() {
            write!(f, " [{} warnings]", self.warnings.len())?;
        }
        Ok(())
    }
}
