/*!
    Triangle-triangle intersection and the grid-accelerated pair sweep

    The intersection test is Möller's separating-axis construction: signed
    vertex distances to the opposite plane, then clipping of the two
    parametric intervals on the common plane-plane line. Coplanar overlap
    is deliberately reported as no intersection.
*/

use crate::grid::{cell_size_for, Projection, TriGrid};
use crate::math::*;
use crate::soup::{triangle_bounds, Triangle};
use heapless::Vec as SVec;
use rustc_hash::FxHashMap;

/// the 3D intersection of two triangles
#[derive(Clone, Copy, Debug)]
pub struct Segment {
    pub a: Vec3,
    pub b: Vec3,
}

/// a segment tagged with the indices of its source triangles in each soup
#[derive(Clone, Copy, Debug)]
pub struct TaggedSegment {
    pub a: Vec3,
    pub b: Vec3,
    pub idx_a: usize,
    pub idx_b: usize,
}

/// signed vertex distances and segment length, for callers that steer on
/// the raw test rather than the segment itself
#[derive(Clone, Copy, Debug)]
pub struct IntersectionDetail {
    pub dist_a: [Float; 3],
    pub dist_b: [Float; 3],
    pub length: Float,
}

/// crossed triangles of one soup, keyed by triangle index
pub type CrossedSet = FxHashMap<usize, Vec<TaggedSegment>>;

// tolerance ladder of the intersection test, part of the contract
const COPLANAR_DOT: Float = 0.9999;
const DIR_EPS: Float = 1e-12;
const DET_EPS: Float = 1e-12;
const ON_PLANE_EPS: Float = 1e-10;
const OVERLAP_EPS: Float = 1e-10;
const SEGMENT_EPS: Float = 1e-8;

struct Hit {
    seg: Segment,
    dist_a: [Float; 3],
    dist_b: [Float; 3],
    length: Float,
}

/// The shared Möller construction behind both public variants
fn tri_tri_hit(fa: &Triangle, fb: &Triangle) -> Option<Hit> {
    // unit plane normals, degenerate triangles cannot intersect anything
    let na_raw = (fa[1] - fa[0]).cross(fa[2] - fa[0]);
    let la = na_raw.length();
    if la < DIR_EPS {
        return None;
    }
    let na = na_raw / la;

    let nb_raw = (fb[1] - fb[0]).cross(fb[2] - fb[0]);
    let lb = nb_raw.length();
    if lb < DIR_EPS {
        return None;
    }
    let nb = nb_raw / lb;

    // signed distances of A's vertices to plane(B)
    let mut dist_a = [0.0; 3];
    for i in 0..3 {
        dist_a[i] = nb.dot(fa[i] - fb[0]);
    }
    if dist_a.iter().all(|d| *d > 0.0) || dist_a.iter().all(|d| *d < 0.0) {
        return None;
    }

    // signed distances of B's vertices to plane(A)
    let mut dist_b = [0.0; 3];
    for i in 0..3 {
        dist_b[i] = na.dot(fb[i] - fa[0]);
    }
    if dist_b.iter().all(|d| *d > 0.0) || dist_b.iter().all(|d| *d < 0.0) {
        return None;
    }

    // near-coplanar pairs are treated as not intersecting
    if na.dot(nb).abs() > COPLANAR_DOT {
        return None;
    }

    // line of intersection of the two planes
    let dir_raw = na.cross(nb);
    let ld = dir_raw.length();
    if ld < DIR_EPS {
        return None;
    }
    let dir = dir_raw / ld;

    // reference point on the line: zero the dominant direction component
    // and solve the two plane equations on the remaining axes by Cramer
    let k = {
        let d = dir.map(Float::abs);
        if d[0] >= d[1] && d[0] >= d[2] {
            0
        } else if d[1] >= d[2] {
            1
        } else {
            2
        }
    };
    let (i, j) = match k {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    };
    let pa = na.dot(fa[0]);
    let pb = nb.dot(fb[0]);
    let det = na[i] * nb[j] - na[j] * nb[i];
    if det.abs() < DET_EPS {
        return None;
    }
    let mut ref_coords = [0.0; 3];
    ref_coords[i] = (pa * nb[j] - pb * na[j]) / det;
    ref_coords[j] = (na[i] * pb - nb[i] * pa) / det;
    let reference = Vec3::from(ref_coords);

    // parametric interval of each triangle on the line
    let interval = |tri: &Triangle, dist: &[Float; 3]| -> Option<(Float, Float)> {
        let mut params: SVec<Float, 8> = SVec::new();
        for e in 0..3 {
            let f = (e + 1) % 3;
            if dist[e] * dist[f] < 0.0 {
                let crossing = lerp(tri[e], tri[f], dist[e] / (dist[e] - dist[f]));
                let _ = params.push((crossing - reference).dot(dir));
            }
        }
        for e in 0..3 {
            if dist[e].abs() < ON_PLANE_EPS {
                let _ = params.push((tri[e] - reference).dot(dir));
            }
        }
        if params.len() < 2 {
            return None;
        }
        let lo = params.iter().copied().fold(Float::INFINITY, Float::min);
        let hi = params.iter().copied().fold(Float::NEG_INFINITY, Float::max);
        Some((lo, hi))
    };

    let (a0, a1) = interval(fa, &dist_a)?;
    let (b0, b1) = interval(fb, &dist_b)?;

    // clip the two intervals
    let lo = a0.max(b0);
    let hi = a1.min(b1);
    if hi - lo < OVERLAP_EPS {
        return None;
    }

    let p0 = reference + dir * lo;
    let p1 = reference + dir * hi;
    let length = distance(p0, p1);
    if length < SEGMENT_EPS {
        return None;
    }

    Some(Hit {
        seg: Segment { a: p0, b: p1 },
        dist_a,
        dist_b,
        length,
    })
}

/// Intersection segment of two triangles, `None` when they do not cross
/// (coplanar overlap included)
pub fn tri_tri_intersection(fa: &Triangle, fb: &Triangle) -> Option<Segment> {
    tri_tri_hit(fa, fb).map(|h| h.seg)
}

/// Detailed variant: signed vertex distances to the opposite planes and
/// the segment length. Rejection logic is identical to
/// [`tri_tri_intersection`].
pub fn tri_tri_intersection_detail(fa: &Triangle, fb: &Triangle) -> Option<IntersectionDetail> {
    tri_tri_hit(fa, fb).map(|h| IntersectionDetail {
        dist_a: h.dist_a,
        dist_b: h.dist_b,
        length: h.length,
    })
}

/// Find all intersection segments between two soups, tagged with their
/// source triangle indices.
///
/// A grid is built over `b` in the XY projection; each triangle of `a`
/// queries it by projected bounding box. Every crossing pair yields
/// exactly one tagged segment.
pub fn intersect_soups_tagged(a: &[Triangle], b: &[Triangle]) -> Vec<TaggedSegment> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let grid = TriGrid::build(b, cell_size_for(b), Projection::XY);
    let mut out = Vec::new();
    for (i, ta) in a.iter().enumerate() {
        let bb = Projection::XY.project_box(&triangle_bounds(ta));
        for j in grid.query_box(&bb) {
            if let Some(seg) = tri_tri_intersection(ta, &b[j]) {
                out.push(TaggedSegment {
                    a: seg.a,
                    b: seg.b,
                    idx_a: i,
                    idx_b: j,
                });
            }
        }
    }
    out
}

/// Partition tagged segments into the two per-mesh crossed-sets
pub fn crossed_sets(tagged: &[TaggedSegment]) -> (CrossedSet, CrossedSet) {
    let mut by_a: CrossedSet = FxHashMap::default();
    let mut by_b: CrossedSet = FxHashMap::default();
    for seg in tagged {
        by_a.entry(seg.idx_a).or_default().push(*seg);
        by_b.entry(seg.idx_b).or_default().push(*seg);
    }
    (by_a, by_b)
}
