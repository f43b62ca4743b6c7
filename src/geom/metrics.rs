//! Opt-in timing hooks for the conversion pipeline.
//!
//! Timing is only collected when the `metrics` feature is enabled and the
//! target is not WASM (`std::time::Instant` is unavailable there). Otherwise
//! every call compiles down to running the closure.
//!
//! ```ignore
//! use brep_mesh::geom::{GeomMetrics, TimingBucket};
//!
//! let mut metrics = GeomMetrics::default();
//! metrics.begin();
//! let tessellation = metrics.time(TimingBucket::Tessellation, || mesh_faces());
//! if let Some(report) = metrics.end() {
//!     println!("tessellation: {} ns", report.tessellation_ns);
//! }
//! ```

/// Phases of a shape-to-mesh conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Face collection and deduplication.
    Exploration,
    /// Per-face meshing, including cache lookups.
    Tessellation,
    /// Global buffer assembly and vertex normals.
    Assembly,
    BoundaryDetection,
    FaceDomains,
    Smoothing,
    Subdivision,
    /// Shape complexity analysis.
    Analysis,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeomTimingReport {
    pub exploration_ns: u64,
    pub tessellation_ns: u64,
    pub assembly_ns: u64,
    pub boundary_detection_ns: u64,
    pub face_domains_ns: u64,
    pub smoothing_ns: u64,
    pub subdivision_ns: u64,
    pub analysis_ns: u64,
}

impl GeomTimingReport {
    /// Returns the total time across all buckets in nanoseconds.
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.exploration_ns
            .saturating_add(self.tessellation_ns)
            .saturating_add(self.assembly_ns)
            .saturating_add(self.boundary_detection_ns)
            .saturating_add(self.face_domains_ns)
            .saturating_add(self.smoothing_ns)
            .saturating_add(self.subdivision_ns)
            .saturating_add(self.analysis_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing conversion phases.
///
/// Call [`begin`](Self::begin) to reset, wrap phases with
/// [`time`](Self::time), and read the report with [`end`](Self::end).
#[derive(Debug, Default)]
pub struct GeomMetrics {
    #[cfg(all(feature = "metrics", not(target_arch = "wasm32")))]
    report: GeomTimingReport,
}

impl GeomMetrics {
    /// Resets all timing counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "metrics", not(target_arch = "wasm32")))]
        {
            self.report = GeomTimingReport::default();
        }
    }

    /// Returns the accumulated timing report, or `None` if metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<GeomTimingReport> {
        #[cfg(all(feature = "metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Times `f` and accumulates the elapsed time in `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
            self.add_to_bucket(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(all(feature = "metrics", not(target_arch = "wasm32")))]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::Exploration => &mut self.report.exploration_ns,
            TimingBucket::Tessellation => &mut self.report.tessellation_ns,
            TimingBucket::Assembly => &mut self.report.assembly_ns,
            TimingBucket::BoundaryDetection => &mut self.report.boundary_detection_ns,
            TimingBucket::FaceDomains => &mut self.report.face_domains_ns,
            TimingBucket::Smoothing => &mut self.report.smoothing_ns,
            TimingBucket::Subdivision => &mut self.report.subdivision_ns,
            TimingBucket::Analysis => &mut self.report.analysis_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_report_total() {
        let report = GeomTimingReport {
            tessellation_ns: 1000,
            assembly_ns: 2000,
            smoothing_ns: 3000,
            ..GeomTimingReport::default()
        };
        assert_eq!(report.total_ns(), 6000);
        assert!((report.total_ms() - 0.006).abs() < 1e-9);
    }

    #[test]
    fn test_total_saturates() {
        let report = GeomTimingReport {
            exploration_ns: u64::MAX,
            analysis_ns: 10,
            ..GeomTimingReport::default()
        };
        assert_eq!(report.total_ns(), u64::MAX);
    }

    #[test]
    fn test_time_returns_closure_result() {
        let mut metrics = GeomMetrics::default();
        metrics.begin();
        let result = metrics.time(TimingBucket::Subdivision, || 42);
        assert_eq!(result, 42);
    }

    #[test]
    fn test_end_matches_feature() {
        let mut metrics = GeomMetrics::default();
        metrics.begin();
        metrics.time(TimingBucket::Exploration, || ());
        let report = metrics.end();
        if cfg!(all(feature = "metrics", not(target_arch = "wasm32"))) {
            assert!(report.is_some());
        } else {
            assert!(report.is_none());
        }
    }
}
