//! Boundary-representation shapes to render-ready triangle meshes.
//!
//! [`geom`] holds the building blocks: the shape model, the tessellator,
//! mesh assembly with its face mapping, boundary detection, per-face
//! domains, normal smoothing, Loop subdivision and the parameter advisor.
//! [`pipeline`] wires them into a single call.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod pipeline;

pub use geom::{
    ConversionDiagnostics, FaceDomain, FaceIndexMapping, GeomContext, MeshParameters, Shape,
    TriangleMesh,
};
pub use pipeline::{MeshPipeline, MeshProducts, PipelineError, ProcessingConfig};
