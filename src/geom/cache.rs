//! Face triangulation cache.
//!
//! Meshing a face is the expensive step of a conversion, and the same face
//! geometry often shows up again: instanced under several placements, or
//! re-converted with unchanged parameters. [`TriangulationCache`] keeps the
//! face-local [`RawTriangulation`] per (face geometry, parameters, mesher)
//! so those cases skip the mesher.
//!
//! Entries are keyed by value, never by pointer, and include the meshing
//! parameters and the mesher's cache tag, so changing either can never hit
//! a stale entry.
//!
//! # Example
//! ```ignore
//! let mut cache = TriangulationCache::new();
//! let key = TriangulationKey::new(&face_geometry, &params, mesher.cache_tag());
//! if cache.get(&key).is_none() {
//!     let triangulation = mesher.triangulate(&face_geometry, &params)?;
//!     cache.insert(key, triangulation.map(Arc::new));
//! }
//! println!("hit rate: {:.2}", cache.stats().hit_rate());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::core::Point3;
use super::tessellation::{MeshParameters, RawTriangulation};
use super::topology::{FaceGeometry, FaceGeometryKey};

/// Cache key: face geometry plus the parameters and mesher that shape its
/// triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriangulationKey {
    geometry: FaceGeometryKey,
    tolerances: [u64; 2],
    relative: bool,
    mesher: u64,
}

impl TriangulationKey {
    /// `mesher` is the producing mesher's [`FaceMesher::cache_tag`].
    ///
    /// [`FaceMesher::cache_tag`]: super::tessellation::FaceMesher::cache_tag
    #[must_use]
    pub fn new(face: &FaceGeometry, params: &MeshParameters, mesher: u64) -> Self {
        let (tolerances, relative) = params.cache_bits();
        Self {
            geometry: face.key(),
            tolerances,
            relative,
            mesher,
        }
    }
}

/// Shared triangulation; `None` records a face that produced no triangles.
type SharedTriangulation = Option<Arc<RawTriangulation>>;

#[derive(Debug, Default)]
pub struct TriangulationCache {
    entries: HashMap<TriangulationKey, SharedTriangulation>,
    hits: usize,
    misses: usize,
}

/// Cache statistics for diagnostics and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriangulationCacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
    /// Estimated memory usage in bytes.
    pub estimated_memory_bytes: usize,
}

impl TriangulationCacheStats {
    /// Returns the cache hit rate as a value between 0.0 and 1.0.
    /// Returns 0.0 if no cache accesses have been made.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl TriangulationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `key`, counting a hit or a miss.
    ///
    /// The outer `Option` is the lookup result; the inner one is the cached
    /// triangulation, which may itself be "no triangles".
    pub fn get(&mut self, key: &TriangulationKey) -> Option<SharedTriangulation> {
        if let Some(entry) = self.entries.get(key) {
            self.hits += 1;
            Some(entry.clone())
        } else {
            self.misses += 1;
            None
        }
    }

    pub fn insert(&mut self, key: TriangulationKey, triangulation: SharedTriangulation) {
        self.entries.insert(key, triangulation);
    }

    #[must_use]
    pub fn contains(&self, key: &TriangulationKey) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> TriangulationCacheStats {
        TriangulationCacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            estimated_memory_bytes: self.estimate_memory_usage(),
        }
    }

    /// Clears all cached data and resets hit/miss counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.reset_counters();
    }

    /// Resets hit/miss counters without clearing cached data.
    pub fn reset_counters(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    #[must_use]
    pub fn estimate_memory_usage(&self) -> usize {
        let entry_overhead = std::mem::size_of::<(TriangulationKey, SharedTriangulation)>();
        self.entries
            .values()
            .flatten()
            .map(|t| {
                t.nodes.len() * std::mem::size_of::<Point3>()
                    + t.triangles.len() * std::mem::size_of::<[u32; 3]>()
                    + t.uvs.len() * std::mem::size_of::<[f64; 2]>()
            })
            .sum::<usize>()
            + self.entries.len() * entry_overhead
    }
}
