//! Index buffers for structured UV grids.
//!
//! A grid is described by its sample counts and a [`GridTopology`]: closed
//! directions reuse the first row/column as seam instead of duplicating it,
//! and collapsed v ends (poles) are stored as a single vertex and stitched
//! with triangle fans. All triangles are wound counter-clockwise in UV, so
//! their geometric normal follows `∂u × ∂v`.

use super::core::{Point3, Tolerance};

/// Seam and pole layout of a sampled surface grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridTopology {
    pub wrap_u: bool,
    pub wrap_v: bool,
    pub pole_v_start: bool,
    pub pole_v_end: bool,
}

impl GridTopology {
    /// Minimal sample counts for this layout: 2 per open direction, 3 per
    /// closed one, and 3 in v when both v ends collapse.
    #[must_use]
    pub const fn min_counts(self) -> (usize, usize) {
        let u = if self.wrap_u { 3 } else { 2 };
        let v = if self.wrap_v || (self.pole_v_start && self.pole_v_end) {
            3
        } else {
            2
        };
        (u, v)
    }

    fn poles(self) -> (bool, bool) {
        if self.wrap_v {
            (false, false)
        } else {
            (self.pole_v_start, self.pole_v_end)
        }
    }

    /// Number of full rows (v samples that are not poles).
    #[must_use]
    pub fn ring_count(self, v_count: usize) -> usize {
        let (start, end) = self.poles();
        v_count.saturating_sub(usize::from(start) + usize::from(end))
    }

    /// Number of vertices a `u_count` x `v_count` grid stores.
    #[must_use]
    pub fn vertex_count(self, u_count: usize, v_count: usize) -> usize {
        let (start, end) = self.poles();
        self.ring_count(v_count) * u_count + usize::from(start) + usize::from(end)
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn idx(i: usize) -> u32 {
    i as u32
}

/// Triangle indices for a grid of `u_count` x `v_count` samples stored in the
/// layout of [`GridTopology::vertex_count`]: start pole, rows in v-major
/// order (u fastest), end pole.
///
/// Counts below [`GridTopology::min_counts`] are raised to the minimum.
#[must_use]
pub fn triangulate_surface_grid(
    u_count: usize,
    v_count: usize,
    topology: GridTopology,
) -> Vec<[u32; 3]> {
    let (min_u, min_v) = topology.min_counts();
    let u_count = u_count.max(min_u);
    let v_count = v_count.max(min_v);
    let (pole_start, pole_end) = topology.poles();

    let rings = topology.ring_count(v_count);
    let row_offset = usize::from(pole_start);
    let quad_u = if topology.wrap_u { u_count } else { u_count - 1 };
    let quad_v = if topology.wrap_v { rings } else { rings.saturating_sub(1) };

    let mut triangles = Vec::with_capacity(
        quad_u * quad_v * 2 + quad_u * (usize::from(pole_start) + usize::from(pole_end)),
    );

    let at = |u: usize, row: usize| idx(row_offset + row * u_count + u);
    let next_u = |u: usize| if topology.wrap_u { (u + 1) % u_count } else { u + 1 };

    if pole_start {
        let pole = 0;
        for u in 0..quad_u {
            triangles.push([pole, at(next_u(u), 0), at(u, 0)]);
        }
    }

    for row in 0..quad_v {
        let row1 = if topology.wrap_v { (row + 1) % rings } else { row + 1 };
        for u in 0..quad_u {
            let u1 = next_u(u);
            let i0 = at(u, row);
            let i1 = at(u1, row);
            let i2 = at(u, row1);
            let i3 = at(u1, row1);
            triangles.push([i0, i1, i2]);
            triangles.push([i2, i1, i3]);
        }
    }

    if pole_end && rings > 0 {
        let pole = idx(row_offset + rings * u_count);
        let last = rings - 1;
        for u in 0..quad_u {
            triangles.push([at(u, last), at(next_u(u), last), pole]);
        }
    }

    triangles
}

/// Drops triangles with repeated indices or (near) zero area.
///
/// Returns the kept triangles and the number removed.
#[must_use]
pub fn cull_degenerate_triangles(
    points: &[Point3],
    triangles: &[[u32; 3]],
    tol: Tolerance,
) -> (Vec<[u32; 3]>, usize) {
    let mut kept = Vec::with_capacity(triangles.len());
    for &tri in triangles {
        let [a, b, c] = tri;
        if a == b || b == c || a == c {
            continue;
        }
        let (Some(&pa), Some(&pb), Some(&pc)) = (
            points.get(a as usize),
            points.get(b as usize),
            points.get(c as usize),
        ) else {
            continue;
        };
        let doubled_area = pb.sub_point(pa).cross(pc.sub_point(pa)).length();
        if doubled_area > tol.eps {
            kept.push(tri);
        }
    }
    let removed = triangles.len() - kept.len();
    (kept, removed)
}

/// Removes nodes no triangle references, remapping indices in place.
#[must_use]
pub fn compact_nodes<T: Copy>(points: &[T], triangles: &mut [[u32; 3]]) -> Vec<T> {
    let mut remap = vec![u32::MAX; points.len()];
    let mut compacted = Vec::with_capacity(points.len());
    for tri in triangles.iter_mut() {
        for index in tri.iter_mut() {
            let old = *index as usize;
            if remap[old] == u32::MAX {
                remap[old] = idx(compacted.len());
                compacted.push(points[old]);
            }
            *index = remap[old];
        }
    }
    compacted
}
