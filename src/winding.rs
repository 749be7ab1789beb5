/*!
    Winding propagation over shared edges

    A homogeneous output group should have every pair of adjacent
    triangles traverse their shared edge in opposite directions. When the
    group is manifold this is enforced by flag propagation from triangle
    zero; otherwise each triangle is individually oriented with a
    non-negative Z normal as a best effort.
*/

use crate::math::*;
use crate::soup::{edge_key, flip_triangle, triangle_normal, vertex_key, EdgeKey, Triangle};
use rustc_hash::FxHashMap;

const ZUP_FLIP: Float = -0.01;

/// Orient one triangle so its normal points no lower than `ZUP_FLIP`
pub fn orient_z_up(t: &Triangle) -> Triangle {
    let n = triangle_normal(t);
    if n[2] < ZUP_FLIP {
        flip_triangle(t)
    } else {
        *t
    }
}

/// Propagate a consistent winding across the group.
///
/// Every edge must be shared by exactly two triangles for propagation to
/// run; any other sharing count makes the group non-manifold and each
/// triangle falls back to the Z-up heuristic.
pub fn propagate_winding(group: &[Triangle]) -> Vec<Triangle> {
    if group.is_empty() {
        return Vec::new();
    }

    // half-edge map: canonical edge -> (triangle, traverses in key order)
    let mut edges: FxHashMap<EdgeKey, Vec<(usize, bool)>> = FxHashMap::default();
    let tri_keys: Vec<[crate::soup::VertKey; 3]> = group
        .iter()
        .map(|t| [vertex_key(t[0]), vertex_key(t[1]), vertex_key(t[2])])
        .collect();
    for (i, k) in tri_keys.iter().enumerate() {
        for e in 0..3 {
            let (a, b) = (k[e], k[(e + 1) % 3]);
            let key = edge_key(a, b);
            let forward = key[0] == a;
            edges.entry(key).or_default().push((i, forward));
        }
    }

    if edges.values().any(|v| v.len() != 2) {
        log::warn!("group is not manifold, orienting triangles individually");
        return group.iter().map(orient_z_up).collect();
    }

    // propagate flip flags: two triangles traversing a shared edge in the
    // same direction are inconsistent
    let mut flip: Vec<Option<bool>> = vec![None; group.len()];
    for root in 0..group.len() {
        if flip[root].is_some() {
            continue;
        }
        flip[root] = Some(false);
        let mut front = vec![root];
        while let Some(f) = front.pop() {
            let f_flip = flip[f].unwrap_or(false);
            let k = &tri_keys[f];
            for e in 0..3 {
                let (a, b) = (k[e], k[(e + 1) % 3]);
                let key = edge_key(a, b);
                let this_forward = key[0] == a;
                for &(other, other_forward) in &edges[&key] {
                    if other == f || flip[other].is_some() {
                        continue;
                    }
                    flip[other] = Some(if this_forward == other_forward {
                        !f_flip
                    } else {
                        f_flip
                    });
                    front.push(other);
                }
            }
        }
    }

    group
        .iter()
        .zip(&flip)
        .map(|(t, f)| {
            if f.unwrap_or(false) {
                flip_triangle(t)
            } else {
                *t
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn tri(a: [Float; 3], b: [Float; 3], c: [Float; 3]) -> Triangle {
        [Vec3::from(a), Vec3::from(b), Vec3::from(c)]
    }

    /// count directed traversals of every edge
    fn directed_edges(group: &[Triangle]) -> FxHashMap<(crate::soup::VertKey, crate::soup::VertKey), usize> {
        let mut m = FxHashMap::default();
        for t in group {
            let k = [vertex_key(t[0]), vertex_key(t[1]), vertex_key(t[2])];
            for e in 0..3 {
                *m.entry((k[e], k[(e + 1) % 3])).or_insert(0) += 1;
            }
        }
        m
    }

    fn make_tetrahedron() -> Vec<Triangle> {
        let p = [
            Vec3::from([0.0, 0.0, 0.0]),
            Vec3::from([1.0, 0.0, 0.0]),
            Vec3::from([0.0, 1.0, 0.0]),
            Vec3::from([0.0, 0.0, 1.0]),
        ];
        vec![
            [p[0], p[2], p[1]],
            [p[0], p[1], p[3]],
            [p[1], p[2], p[3]],
            [p[0], p[3], p[2]],
        ]
    }

    #[test]
    fn test_manifold_group_oriented() {
        let mut group = make_tetrahedron();
        // sabotage one winding
        group[2] = flip_triangle(&group[2]);
        let fixed = propagate_winding(&group);
        // adjacent triangles must traverse shared edges in opposite
        // directions: no directed edge appears twice
        let m = directed_edges(&fixed);
        assert!(m.values().all(|c| *c == 1));
    }

    #[test]
    fn test_consistent_group_unchanged_count() {
        let group = make_tetrahedron();
        let fixed = propagate_winding(&group);
        assert_eq!(fixed.len(), group.len());
        let m = directed_edges(&fixed);
        assert!(m.values().all(|c| *c == 1));
    }

    #[test]
    fn test_open_group_z_up_fallback() {
        // two triangles of a quad plus a dangling one: boundary edges are
        // not shared by two triangles, so the z-up fallback applies
        let group = vec![
            tri([0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]), // normal -z
            tri([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]), // normal -z
        ];
        let fixed = propagate_winding(&group);
        for t in &fixed {
            assert!(triangle_normal(t)[2] >= ZUP_FLIP);
        }
    }

    #[test]
    fn test_empty_group() {
        assert!(propagate_winding(&[]).is_empty());
    }
}
