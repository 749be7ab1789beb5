/*!
    Triangle-soup data model

    A soup is a plain sequence of `[Vec3; 3]` triangles in winding order,
    with no shared vertex identity. Topological identity (edge sharing,
    seam membership) is established through quantised vertex keys instead.
    The welded, indexed form produced at the end of a boolean operation
    lives here as well.
*/

use crate::aabox::AABox;
use crate::math::*;

/// A triangle in winding order. Vertices carry no identity of their own.
pub type Triangle = [Vec3; 3];

/// A vertex pool plus triangles referencing pool positions, the result of
/// welding a soup under a tolerance.
#[derive(Clone, Debug, Default)]
pub struct IndexedMesh {
    pub points: Vec<Vec3>,
    pub triangles: Vec<[Index; 3]>,
}

/// Quantisation scale for topological vertex keys: 6 decimal places.
///
/// Distinct from every geometric tolerance; two vertices share an edge or
/// a seam exactly when their keys agree.
pub const KEY_SCALE: Float = 1e6;

/// Quantised vertex key, one rounded integer per coordinate
pub type VertKey = [i64; 3];

/// Canonical unordered edge: the two vertex keys, sorted
pub type EdgeKey = [VertKey; 2];

pub fn vertex_key(p: Vec3) -> VertKey {
    [
        (p[0] * KEY_SCALE).round() as i64,
        (p[1] * KEY_SCALE).round() as i64,
        (p[2] * KEY_SCALE).round() as i64,
    ]
}

/// Return a key for a non-directional edge (sorted pair)
pub fn edge_key(a: VertKey, b: VertKey) -> EdgeKey {
    if a <= b {
        [a, b]
    } else {
        [b, a]
    }
}

pub fn triangle_bounds(t: &Triangle) -> AABox<3> {
    AABox::from_iter(t.iter().copied())
}

pub fn triangle_centroid(t: &Triangle) -> Vec3 {
    (t[0] + t[1] + t[2]) / 3.0
}

pub fn triangle_area(t: &Triangle) -> Float {
    (t[1] - t[0]).cross(t[2] - t[0]).length() / 2.0
}

/// Normalised face normal, NaN components when the triangle is degenerate
pub fn triangle_normal(t: &Triangle) -> Vec3 {
    (t[1] - t[0]).cross(t[2] - t[0]).normalize()
}

/// Reverse the winding (and therefore the normal) of a triangle
pub fn flip_triangle(t: &Triangle) -> Triangle {
    [t[0], t[2], t[1]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_key_rounding() {
        // agreement at 6 decimal places, disagreement below
        let a = vertex_key(Vec3::from([1.0000001, 0.0, 0.0]));
        let b = vertex_key(Vec3::from([1.0000004, 0.0, 0.0]));
        let c = vertex_key(Vec3::from([1.000001, 0.0, 0.0]));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_vertex_key_negative() {
        let a = vertex_key(Vec3::from([-0.5, 0.25, -1.0]));
        assert_eq!(a, [-500000, 250000, -1000000]);
    }

    #[test]
    fn test_edge_key_canonical() {
        let a = vertex_key(Vec3::from([0.0, 0.0, 0.0]));
        let b = vertex_key(Vec3::from([1.0, 0.0, 0.0]));
        assert_eq!(edge_key(a, b), edge_key(b, a));
    }

    #[test]
    fn test_triangle_area() {
        let t = [
            Vec3::from([0.0, 0.0, 0.0]),
            Vec3::from([2.0, 0.0, 0.0]),
            Vec3::from([0.0, 2.0, 0.0]),
        ];
        assert!((triangle_area(&t) - 2.0).abs() < NUMPREC);
    }

    #[test]
    fn test_flip_reverses_normal() {
        let t = [
            Vec3::from([0.0, 0.0, 0.0]),
            Vec3::from([1.0, 0.0, 0.0]),
            Vec3::from([0.0, 1.0, 0.0]),
        ];
        let n = triangle_normal(&t);
        let m = triangle_normal(&flip_triangle(&t));
        assert!((n + m).length() < NUMPREC);
    }
}
