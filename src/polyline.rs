/*!
    Polyline utilities over intersection segments

    Tagged segments describe the intersection curve piecewise and in no
    particular order; chaining assembles them into polylines by endpoint
    proximity, and simplification thins a dense polyline to a target
    spacing.
*/

use crate::intersect::Segment;
use crate::math::*;

/// Assemble segments into polylines, joining endpoints closer than
/// `threshold`.
///
/// Chains extend at both ends and segments are reversed as needed; every
/// input segment is consumed exactly once.
pub fn chain_segments(segments: &[Segment], threshold: Float) -> Vec<Vec<Vec3>> {
    let mut remaining: Vec<(Vec3, Vec3)> = segments.iter().map(|s| (s.a, s.b)).collect();
    let mut result = Vec::new();

    while let Some((a, b)) = remaining.pop() {
        let mut chain = vec![a, b];

        let mut found = true;
        while found {
            found = false;
            for i in 0..remaining.len() {
                let (c, d) = remaining[i];
                let head = chain[0];
                let tail = *chain.last().unwrap();
                if distance(d, head) < threshold {
                    chain.insert(0, c);
                } else if distance(c, tail) < threshold {
                    chain.push(d);
                } else if distance(c, head) < threshold {
                    chain.insert(0, d);
                } else if distance(d, tail) < threshold {
                    chain.push(c);
                } else {
                    continue;
                }
                remaining.swap_remove(i);
                found = true;
                break;
            }
        }
        result.push(chain);
    }

    result
}

/// Thin a polyline so consecutive kept vertices are at least `spacing`
/// apart along the arc.
///
/// The first and last vertices are always kept. Inputs with two or fewer
/// vertices, or a non-positive spacing (including zero), are returned
/// unchanged.
pub fn simplify_polyline(points: &[Vec3], spacing: Float) -> Vec<Vec3> {
    if points.len() <= 2 || spacing <= 0.0 {
        return points.to_vec();
    }

    let mut out = vec![points[0]];
    let mut arc = 0.0;
    for i in 1..points.len() - 1 {
        arc += distance(points[i - 1], points[i]);
        if arc >= spacing {
            out.push(points[i]);
            arc = 0.0;
        }
    }
    out.push(points[points.len() - 1]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(a: [Float; 3], b: [Float; 3]) -> Segment {
        Segment {
            a: Vec3::from(a),
            b: Vec3::from(b),
        }
    }

    #[test]
    fn test_chain_collinear_segments() {
        let segments = vec![
            seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            seg([1.0, 0.0, 0.0], [2.0, 0.0, 0.0]),
            seg([2.0, 0.0, 0.0], [3.0, 0.0, 0.0]),
        ];
        let chains = chain_segments(&segments, 0.01);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 4);
    }

    #[test]
    fn test_chain_reversed_segment() {
        let segments = vec![
            seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            seg([2.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
        ];
        let chains = chain_segments(&segments, 0.01);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 3);
    }

    #[test]
    fn test_chain_two_separate_curves() {
        let segments = vec![
            seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            seg([5.0, 0.0, 0.0], [6.0, 0.0, 0.0]),
        ];
        let chains = chain_segments(&segments, 0.01);
        assert_eq!(chains.len(), 2);
    }

    #[test]
    fn test_chain_empty() {
        assert!(chain_segments(&[], 0.01).is_empty());
    }

    #[test]
    fn test_simplify_dense_polyline() {
        let points: Vec<Vec3> = (0..101)
            .map(|i| Vec3::from([i as Float * 0.1, 0.0, 0.0]))
            .collect();
        let out = simplify_polyline(&points, 1.0);
        assert!(out.len() < 101);
        assert_eq!(out[0].as_array(), points[0].as_array());
        assert_eq!(
            out.last().unwrap().as_array(),
            points.last().unwrap().as_array()
        );
    }

    #[test]
    fn test_simplify_short_input_unchanged() {
        let points = vec![
            Vec3::from([0.0, 0.0, 0.0]),
            Vec3::from([1.0, 0.0, 0.0]),
        ];
        let out = simplify_polyline(&points, 10.0);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_simplify_zero_spacing_unchanged() {
        let points: Vec<Vec3> = (0..50)
            .map(|i| Vec3::from([i as Float, 0.0, 0.0]))
            .collect();
        let out = simplify_polyline(&points, 0.0);
        assert_eq!(out.len(), 50);
    }
}
