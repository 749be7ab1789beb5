/*!
    math definitions and vector helpers shared by every module

    only the functions needed by the boolean pipeline live here, this is
    deliberately a small subset of a general geometry toolbox
*/

pub use vecmat::prelude::*;
pub use vecmat::Vector;

pub type Index = u32;
pub type Float = f64;

/// numerical precision of floats used (float64 = 14 decimals)
pub const NUMPREC: Float = 1e-13;

pub type Vec2 = Vector<Float, 2>;
pub type Vec3 = Vector<Float, 3>;

/// Linear interpolation between `a` and `b`
pub fn lerp<const N: usize>(a: Vector<Float, N>, b: Vector<Float, N>, t: Float) -> Vector<Float, N> {
    a + (b - a) * t
}

/// Euclidean distance between two points
pub fn distance<const N: usize>(a: Vector<Float, N>, b: Vector<Float, N>) -> Float {
    (b - a).length()
}

/// Check if all components of a vector are finite
pub fn is_finite_vec<const N: usize>(v: Vector<Float, N>) -> bool {
    v.as_array().iter().all(|x| x.is_finite())
}

/// 2D barycentric coordinates of `p` in triangle `(a, b, c)`.
///
/// Returns `(det, u, v, w)` where `det` is the signed doubled area of the
/// triangle. The caller decides what determinant magnitude it accepts; a
/// zero determinant yields zero coordinates.
pub fn barycentric_2d(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> (Float, Float, Float, Float) {
    let det = (b[1] - c[1]) * (a[0] - c[0]) + (c[0] - b[0]) * (a[1] - c[1]);
    if det == 0.0 {
        return (0.0, 0.0, 0.0, 0.0);
    }
    let u = ((b[1] - c[1]) * (p[0] - c[0]) + (c[0] - b[0]) * (p[1] - c[1])) / det;
    let v = ((c[1] - a[1]) * (p[0] - c[0]) + (a[0] - c[0]) * (p[1] - c[1])) / det;
    (det, u, v, 1.0 - u - v)
}
