/*!
    Inside/outside classification against an opposing surface

    A single-axis parity ray cast breaks down on open surfaces and on
    faces coplanar with the test point. Instead, rays are cast along all
    three axes, each three times with small fixed offsets on the two
    projected coordinates, and the axes vote. Whole connected regions of
    non-crossed triangles then inherit one seed classification through a
    flood fill over shared edges.
*/

use crate::grid::{cell_size_for, Projection, TriGrid};
use crate::intersect::CrossedSet;
use crate::math::*;
use crate::soup::{edge_key, triangle_centroid, vertex_key, EdgeKey, Triangle};
use rustc_hash::FxHashMap;

const BARY_DET_EPS: Float = 1e-12;
const BARY_SLOP: Float = 1e-10;

/// Deterministic ray offsets, three per axis, applied to the two
/// projected coordinates. Distinct per axis so no two axes degenerate on
/// the same unlucky geometry.
const JITTER: [[(Float, Float); 3]; 3] = [
    // ray +Z, offsets on (x, y)
    [(1.0e-4, 3.0e-5), (-7.0e-5, 9.0e-5), (4.0e-5, -1.0e-4)],
    // ray +X, offsets on (y, z)
    [(9.0e-5, -2.0e-5), (-1.0e-4, 5.0e-5), (3.0e-5, 8.0e-5)],
    // ray +Y, offsets on (x, z)
    [(-4.0e-5, 1.0e-4), (6.0e-5, 2.0e-5), (1.0e-4, -6.0e-5)],
];

/// One spatial grid per projection plane, all with the same cell size
pub struct MeshGrids {
    pub xy: TriGrid,
    pub yz: TriGrid,
    pub xz: TriGrid,
}

impl MeshGrids {
    pub fn build(triangles: &[Triangle]) -> Self {
        let cell = cell_size_for(triangles);
        MeshGrids {
            xy: TriGrid::build(triangles, cell, Projection::XY),
            yz: TriGrid::build(triangles, cell, Projection::YZ),
            xz: TriGrid::build(triangles, cell, Projection::XZ),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum AxisVote {
    Inside,
    Outside,
    NoHit,
}

/// Cast three jittered rays along one positive axis and vote by parity
fn cast_axis(p: Vec3, soup: &[Triangle], grid: &TriGrid, jitter: &[(Float, Float); 3]) -> AxisVote {
    let (i0, i1) = grid.projection.axes();
    let ray = grid.projection.ray_axis();

    let mut odd = 0usize;
    let mut any_hits = false;
    for &(ja, jb) in jitter {
        let a = p[i0] + ja;
        let b = p[i1] + jb;
        let mut crossings = 0usize;
        for &t in grid.query_point(a, b) {
            let tri = &soup[t];
            let pa = Vec2::from([tri[0][i0], tri[0][i1]]);
            let pb = Vec2::from([tri[1][i0], tri[1][i1]]);
            let pc = Vec2::from([tri[2][i0], tri[2][i1]]);
            let (det, u, v, w) = barycentric_2d(Vec2::from([a, b]), pa, pb, pc);
            if det.abs() < BARY_DET_EPS {
                continue;
            }
            if u < -BARY_SLOP || v < -BARY_SLOP || w < -BARY_SLOP {
                continue;
            }
            // ray-axis coordinate of the triangle plane at (a, b)
            let height = u * tri[0][ray] + v * tri[1][ray] + w * tri[2][ray];
            if height > p[ray] {
                crossings += 1;
            }
        }
        if crossings > 0 {
            any_hits = true;
        }
        if crossings % 2 == 1 {
            odd += 1;
        }
    }

    if !any_hits {
        AxisVote::NoHit
    } else if odd >= 2 {
        AxisVote::Inside
    } else {
        AxisVote::Outside
    }
}

/// Decide whether `p` lies inside the solid bounded by `soup`.
///
/// Returns +1 for inside, -1 for outside. Tolerates open surfaces and
/// faces coplanar with the query point: at least two of the three axes
/// cast away from any such face.
pub fn classify_point_multi_axis(p: Vec3, soup: &[Triangle], grids: &MeshGrids) -> i8 {
    let votes = [
        cast_axis(p, soup, &grids.xy, &JITTER[0]),
        cast_axis(p, soup, &grids.yz, &JITTER[1]),
        cast_axis(p, soup, &grids.xz, &JITTER[2]),
    ];
    let inside = votes.iter().filter(|v| **v == AxisVote::Inside).count();
    let outside = votes.iter().filter(|v| **v == AxisVote::Outside).count();

    if inside >= 2 {
        1
    } else if outside >= 1 {
        -1
    } else if inside == 1 {
        // exactly one axis saw any geometry and it voted inside
        1
    } else {
        // no axis hit anything at all
        -1
    }
}

/// Classify every non-crossed triangle of `soup` against the other mesh.
///
/// One ray cast per connected component: connectivity runs through edges
/// shared by two non-crossed triangles, so components separated by the
/// intersection ring stay isolated. Crossed triangles keep class 0.
pub fn classify_regions(
    soup: &[Triangle],
    crossed: &CrossedSet,
    other: &[Triangle],
    other_grids: &MeshGrids,
) -> Vec<i8> {
    let mut cls = vec![0i8; soup.len()];

    // edge -> triangles adjacency over non-crossed triangles only
    let mut conn: FxHashMap<EdgeKey, Vec<usize>> = FxHashMap::default();
    for (i, tri) in soup.iter().enumerate() {
        if crossed.contains_key(&i) {
            continue;
        }
        let k = [
            vertex_key(tri[0]),
            vertex_key(tri[1]),
            vertex_key(tri[2]),
        ];
        for e in 0..3 {
            conn.entry(edge_key(k[e], k[(e + 1) % 3]))
                .or_default()
                .push(i);
        }
    }

    for i in 0..soup.len() {
        if crossed.contains_key(&i) || cls[i] != 0 {
            continue;
        }
        let seed = classify_point_multi_axis(triangle_centroid(&soup[i]), other, other_grids);
        let mut front = vec![i];
        while let Some(f) = front.pop() {
            if cls[f] != 0 {
                continue;
            }
            cls[f] = seed;
            let tri = &soup[f];
            let k = [
                vertex_key(tri[0]),
                vertex_key(tri[1]),
                vertex_key(tri[2]),
            ];
            for e in 0..3 {
                if let Some(neighbors) = conn.get(&edge_key(k[e], k[(e + 1) % 3])) {
                    for &n in neighbors {
                        if cls[n] == 0 {
                            front.push(n);
                        }
                    }
                }
            }
        }
    }

    cls
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    /// Axis-aligned cube as 12 outward-wound triangles
    fn make_cube(center: [Float; 3], size: Float) -> Vec<Triangle> {
        let h = size / 2.0;
        let c = Vec3::from(center);
        let p = [
            c + Vec3::from([-h, -h, -h]),
            c + Vec3::from([h, -h, -h]),
            c + Vec3::from([h, h, -h]),
            c + Vec3::from([-h, h, -h]),
            c + Vec3::from([-h, -h, h]),
            c + Vec3::from([h, -h, h]),
            c + Vec3::from([h, h, h]),
            c + Vec3::from([-h, h, h]),
        ];
        vec![
            [p[0], p[2], p[1]],
            [p[0], p[3], p[2]],
            [p[4], p[5], p[6]],
            [p[4], p[6], p[7]],
            [p[0], p[1], p[5]],
            [p[0], p[5], p[4]],
            [p[2], p[3], p[7]],
            [p[2], p[7], p[6]],
            [p[0], p[4], p[7]],
            [p[0], p[7], p[3]],
            [p[1], p[2], p[6]],
            [p[1], p[6], p[5]],
        ]
    }

    #[test]
    fn test_point_inside_cube() {
        let cube = make_cube([0.0, 0.0, 0.0], 2.0);
        let grids = MeshGrids::build(&cube);
        let c = classify_point_multi_axis(Vec3::from([0.3, 0.2, -0.5]), &cube, &grids);
        assert_eq!(c, 1);
    }

    #[test]
    fn test_point_outside_cube() {
        let cube = make_cube([0.0, 0.0, 0.0], 2.0);
        let grids = MeshGrids::build(&cube);
        let c = classify_point_multi_axis(Vec3::from([5.0, 5.0, 0.0]), &cube, &grids);
        assert_eq!(c, -1);
    }

    #[test]
    fn test_point_inside_larger_cube() {
        let cube = make_cube([0.0, 0.0, 0.0], 4.0);
        let grids = MeshGrids::build(&cube);
        let c = classify_point_multi_axis(Vec3::from([0.7, 0.3, -0.2]), &cube, &grids);
        assert_eq!(c, 1);
    }

    #[test]
    fn test_point_near_open_patch() {
        // a single horizontal quad is an open surface, points below see
        // one odd crossing along +Z, points above see none
        let patch = vec![
            [
                Vec3::from([-1.0, -1.0, 0.0]),
                Vec3::from([1.0, -1.0, 0.0]),
                Vec3::from([1.0, 1.0, 0.0]),
            ],
            [
                Vec3::from([-1.0, -1.0, 0.0]),
                Vec3::from([1.0, 1.0, 0.0]),
                Vec3::from([-1.0, 1.0, 0.0]),
            ],
        ];
        let grids = MeshGrids::build(&patch);
        let below = classify_point_multi_axis(Vec3::from([0.2, 0.1, -1.0]), &patch, &grids);
        let above = classify_point_multi_axis(Vec3::from([0.2, 0.1, 1.0]), &patch, &grids);
        assert_eq!(below, 1);
        assert_eq!(above, -1);
    }

    #[test]
    fn test_regions_whole_component_shares_seed() {
        let cube_a = make_cube([0.0, 0.0, 0.0], 1.0);
        let big = make_cube([0.0, 0.0, 0.0], 4.0);
        let grids = MeshGrids::build(&big);
        let crossed = FxHashMap::default();
        let cls = classify_regions(&cube_a, &crossed, &big, &grids);
        // the small cube sits entirely inside the big one and is a single
        // connected component
        assert!(cls.iter().all(|c| *c == 1));
    }

    #[test]
    fn test_regions_separate_components() {
        // two disconnected cubes, one inside the big cube and one far
        // away: each component gets its own seed classification
        let mut soup = make_cube([0.0, 0.0, 0.0], 1.0);
        let far = make_cube([20.0, 0.0, 0.0], 1.0);
        soup.extend_from_slice(&far);
        let big = make_cube([0.0, 0.0, 0.0], 4.0);
        let grids = MeshGrids::build(&big);
        let crossed = FxHashMap::default();
        let cls = classify_regions(&soup, &crossed, &big, &grids);
        assert!(cls[..12].iter().all(|c| *c == 1));
        assert!(cls[12..].iter().all(|c| *c == -1));
    }

    #[test]
    fn test_regions_skip_crossed() {
        let cube_a = make_cube([0.0, 0.0, 0.0], 1.0);
        let big = make_cube([0.0, 0.0, 0.0], 4.0);
        let grids = MeshGrids::build(&big);
        let mut crossed: CrossedSet = FxHashMap::default();
        crossed.insert(0, Vec::new());
        let cls = classify_regions(&cube_a, &crossed, &big, &grids);
        assert_eq!(cls[0], 0);
        assert!(cls[1..].iter().all(|c| *c == 1));
    }
}
