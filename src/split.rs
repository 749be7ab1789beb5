/*!
    Re-triangulation of crossed triangles along their intersection segments

    Each crossed triangle is mapped into an orthonormal 2D frame on its
    own plane, the segment endpoints become Steiner points, and a
    constrained Delaunay triangulation replaces the face. Sub-triangles
    inherit inside/outside from vertices shared with the flood-filled
    regions, with a ray cast as last resort.

    The triangle boundary is deliberately not constrained: Steiner points
    can land exactly on a boundary edge and a segmental boundary
    constraint would skip them.
*/

use crate::classify::{classify_point_multi_axis, MeshGrids};
use crate::intersect::{CrossedSet, TaggedSegment};
use crate::math::*;
use crate::soup::{triangle_centroid, vertex_key, Triangle, VertKey};
use rustc_hash::{FxHashMap, FxHashSet};
use spade::{
    handles::FixedVertexHandle, ConstrainedDelaunayTriangulation, Triangulation as _,
};
use thiserror::Error;

const FRAME_EPS: Float = 1e-12;
const STEINER_SLOP: Float = 1e-4;
const CENTROID_SLOP: Float = 1e-6;
const MIN_AREA_RATIO: Float = 1e-8;

#[derive(Error, Debug)]
enum SplitError {
    #[error("degenerate 2d frame")]
    DegenerateFrame,
    #[error("vertex insertion failed: {0}")]
    Insertion(#[from] spade::InsertionError),
}

/// classified sub-triangle groups of one mesh
#[derive(Default)]
pub struct SplitGroups {
    pub inside: Vec<Triangle>,
    pub outside: Vec<Triangle>,
}

/// Replace one crossed triangle by constrained-Delaunay sub-triangles
fn retriangulate(tri: &Triangle, segs: &[TaggedSegment]) -> Result<Vec<Triangle>, SplitError> {
    // orthonormal frame on the triangle plane
    let u_raw = tri[1] - tri[0];
    let lu = u_raw.length();
    if lu < FRAME_EPS {
        return Err(SplitError::DegenerateFrame);
    }
    let u = u_raw / lu;
    let n_raw = u.cross(tri[2] - tri[0]);
    let ln = n_raw.length();
    if ln < FRAME_EPS {
        return Err(SplitError::DegenerateFrame);
    }
    let n = n_raw / ln;
    let v = n.cross(u);
    if v.length() < FRAME_EPS {
        return Err(SplitError::DegenerateFrame);
    }

    let to2d = |p: Vec3| Vec2::from([(p - tri[0]).dot(u), (p - tri[0]).dot(v)]);
    let corners = [to2d(tri[0]), to2d(tri[1]), to2d(tri[2])];
    let det = (corners[1][1] - corners[2][1]) * (corners[0][0] - corners[2][0])
        + (corners[2][0] - corners[1][0]) * (corners[0][1] - corners[2][1]);
    if det.abs() < FRAME_EPS {
        return Err(SplitError::DegenerateFrame);
    }
    let orig_area = det.abs() / 2.0;

    // corners first, then surviving Steiner endpoints
    let mut points_3d: Vec<Vec3> = tri.to_vec();
    let mut points_2d: Vec<Vec2> = corners.to_vec();
    let mut by_key: FxHashMap<VertKey, usize> = FxHashMap::default();
    for (i, p) in tri.iter().enumerate() {
        by_key.entry(vertex_key(*p)).or_insert(i);
    }
    for seg in segs {
        for p in [seg.a, seg.b] {
            let key = vertex_key(p);
            if by_key.contains_key(&key) {
                continue;
            }
            let p2 = to2d(p);
            let (_, bu, bv, bw) = barycentric_2d(p2, corners[0], corners[1], corners[2]);
            if bu < -STEINER_SLOP || bv < -STEINER_SLOP || bw < -STEINER_SLOP {
                // endpoint drifted off this triangle, leave it out
                log::debug!("steiner endpoint outside triangle, dropped");
                continue;
            }
            by_key.insert(key, points_3d.len());
            points_3d.push(p);
            points_2d.push(p2);
        }
    }

    let mut cdt: ConstrainedDelaunayTriangulation<spade::Point2<Float>> =
        ConstrainedDelaunayTriangulation::new();
    let mut handles: Vec<FixedVertexHandle> = Vec::with_capacity(points_2d.len());
    let mut local: FxHashMap<FixedVertexHandle, usize> = FxHashMap::default();
    for (i, p) in points_2d.iter().enumerate() {
        let h = cdt.insert(spade::Point2::new(p[0], p[1]))?;
        handles.push(h);
        local.entry(h).or_insert(i);
    }

    // constrain each intersection segment whose endpoints both survived;
    // edges that would cross an existing constraint are skipped
    for seg in segs {
        let (Some(&ia), Some(&ib)) = (
            by_key.get(&vertex_key(seg.a)),
            by_key.get(&vertex_key(seg.b)),
        ) else {
            continue;
        };
        if ia == ib {
            continue;
        }
        // NOTE: the naming of `can_add_constraint` is misleading
        if !cdt.can_add_constraint(handles[ia], handles[ib]) {
            let _ = cdt.add_constraint(handles[ia], handles[ib]);
        }
    }

    let mut out = Vec::new();
    for face in cdt.inner_faces() {
        let vs = face.vertices();
        let mut idx = [0usize; 3];
        for k in 0..3 {
            idx[k] = local[&vs[k].fix()];
        }
        let (a, b, c) = (points_2d[idx[0]], points_2d[idx[1]], points_2d[idx[2]]);

        // centroid must stay within the parent triangle
        let centroid = (a + b + c) / 3.0;
        let (_, bu, bv, bw) = barycentric_2d(centroid, corners[0], corners[1], corners[2]);
        if bu < -CENTROID_SLOP || bv < -CENTROID_SLOP || bw < -CENTROID_SLOP {
            continue;
        }
        let area = ((b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])).abs() / 2.0;
        if area < MIN_AREA_RATIO * orig_area {
            continue;
        }
        out.push([points_3d[idx[0]], points_3d[idx[1]], points_3d[idx[2]]]);
    }
    Ok(out)
}

/// Split a crossed triangle, falling back to the unsplit parent on any
/// failure or when the filters leave nothing
pub fn split_crossed_triangle(tri: &Triangle, segs: &[TaggedSegment]) -> Vec<Triangle> {
    match retriangulate(tri, segs) {
        Ok(subs) if !subs.is_empty() => subs,
        Ok(_) => vec![*tri],
        Err(e) => {
            log::debug!("retriangulation failed, keeping face unsplit: {e}");
            vec![*tri]
        }
    }
}

/// Classification of one sub-triangle by vertex adjacency.
///
/// The first vertex that is not on the intersection curve and has a known
/// class decides; otherwise the centroid is ray cast against the other
/// mesh.
fn classify_sub(
    sub: &Triangle,
    vertex_class: &FxHashMap<VertKey, i8>,
    seam: &FxHashSet<VertKey>,
    other: &[Triangle],
    other_grids: &MeshGrids,
) -> i8 {
    for p in sub {
        let key = vertex_key(*p);
        if seam.contains(&key) {
            continue;
        }
        if let Some(&c) = vertex_class.get(&key) {
            return c;
        }
    }
    classify_point_multi_axis(triangle_centroid(sub), other, other_grids)
}

/// Vertex keys lying on the intersection curve; these never vote during
/// sub-triangle classification
pub fn seam_keys(tagged: &[TaggedSegment]) -> FxHashSet<VertKey> {
    let mut keys = FxHashSet::default();
    for seg in tagged {
        keys.insert(vertex_key(seg.a));
        keys.insert(vertex_key(seg.b));
    }
    keys
}

/// Split every crossed triangle of `soup` and bucket the whole mesh into
/// inside/outside groups.
///
/// Non-crossed triangles carry their flood-fill class; sub-triangles of
/// crossed ones classify by vertex adjacency with ray-cast fallback.
pub fn split_and_classify(
    soup: &[Triangle],
    crossed: &CrossedSet,
    region_class: &[i8],
    seam: &FxHashSet<VertKey>,
    other: &[Triangle],
    other_grids: &MeshGrids,
) -> SplitGroups {
    // vertex -> class map from the non-crossed triangles, first write wins
    let mut vertex_class: FxHashMap<VertKey, i8> = FxHashMap::default();
    for (i, tri) in soup.iter().enumerate() {
        if crossed.contains_key(&i) || region_class[i] == 0 {
            continue;
        }
        for p in tri {
            vertex_class.entry(vertex_key(*p)).or_insert(region_class[i]);
        }
    }

    let mut groups = SplitGroups::default();
    for (i, tri) in soup.iter().enumerate() {
        if let Some(segs) = crossed.get(&i) {
            for sub in split_crossed_triangle(tri, segs) {
                match classify_sub(&sub, &vertex_class, seam, other, other_grids) {
                    1 => groups.inside.push(sub),
                    -1 => groups.outside.push(sub),
                    _ => {}
                }
            }
        } else {
            match region_class[i] {
                1 => groups.inside.push(*tri),
                -1 => groups.outside.push(*tri),
                _ => {}
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soup::triangle_area;

    fn tri(a: [Float; 3], b: [Float; 3], c: [Float; 3]) -> Triangle {
        [Vec3::from(a), Vec3::from(b), Vec3::from(c)]
    }

    fn seg(a: [Float; 3], b: [Float; 3]) -> TaggedSegment {
        TaggedSegment {
            a: Vec3::from(a),
            b: Vec3::from(b),
            idx_a: 0,
            idx_b: 0,
        }
    }

    #[test]
    fn test_split_preserves_area() {
        let t = tri([0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [2.0, 4.0, 0.0]);
        let segs = vec![seg([1.0, 1.0, 0.0], [3.0, 1.0, 0.0])];
        let subs = split_crossed_triangle(&t, &segs);
        assert!(subs.len() > 1);
        let total: Float = subs.iter().map(triangle_area).sum();
        assert!((total - triangle_area(&t)).abs() < 1e-6);
    }

    #[test]
    fn test_split_keeps_segment_edge() {
        let t = tri([0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [2.0, 4.0, 0.0]);
        let sa = [1.5, 1.0, 0.0];
        let sb = [2.5, 1.0, 0.0];
        let subs = split_crossed_triangle(&t, &[seg(sa, sb)]);
        // both steiner points must appear among the sub-triangle vertices
        let keys: FxHashSet<VertKey> = subs
            .iter()
            .flat_map(|s| s.iter().map(|p| vertex_key(*p)))
            .collect();
        assert!(keys.contains(&vertex_key(Vec3::from(sa))));
        assert!(keys.contains(&vertex_key(Vec3::from(sb))));
    }

    #[test]
    fn test_degenerate_triangle_unsplit() {
        let t = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        let segs = vec![seg([0.5, 0.0, 0.0], [1.5, 0.0, 0.0])];
        let subs = split_crossed_triangle(&t, &segs);
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn test_endpoint_outside_dropped() {
        let t = tri([0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [2.0, 4.0, 0.0]);
        // one endpoint far off the triangle: it must not be inserted, the
        // other splits the face alone
        let segs = vec![seg([2.0, 1.0, 0.0], [50.0, 50.0, 0.0])];
        let subs = split_crossed_triangle(&t, &segs);
        let keys: FxHashSet<VertKey> = subs
            .iter()
            .flat_map(|s| s.iter().map(|p| vertex_key(*p)))
            .collect();
        assert!(!keys.contains(&vertex_key(Vec3::from([50.0, 50.0, 0.0]))));
    }

    #[test]
    fn test_segment_endpoint_on_corner_reused() {
        let t = tri([0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [2.0, 4.0, 0.0]);
        let segs = vec![seg([0.0, 0.0, 0.0], [2.0, 1.0, 0.0])];
        let subs = split_crossed_triangle(&t, &segs);
        assert!(subs.len() > 1);
        // corner count stays three per sub-triangle and the corner is not
        // duplicated as a distinct point
        let total: Float = subs.iter().map(triangle_area).sum();
        assert!((total - triangle_area(&t)).abs() < 1e-6);
    }

    #[test]
    fn test_sliver_split_no_degenerate_output() {
        let t = tri([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [5.0, 0.01, 0.0]);
        let segs = vec![seg([5.0, 0.0, 0.0], [5.0, 0.005, 0.0])];
        for sub in split_crossed_triangle(&t, &segs) {
            assert!(sub.iter().all(|p| is_finite_vec(*p)));
        }
    }
}
