/*!
    2D uniform hash grid over a projection plane

    Triangles are stamped into every cell their projected bounding box
    touches; queries return deduplicated candidate indices. A triangle
    spanning many cells is indexed redundantly on purpose, the hit-set on
    the query side removes duplicates.
*/

use crate::aabox::AABox;
use crate::math::*;
use crate::soup::{triangle_bounds, Triangle};
use rustc_hash::{FxHashMap, FxHashSet};

/// Projection plane the grid lives in. The remaining axis is the ray axis
/// used by the point classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
    XY,
    YZ,
    XZ,
}

impl Projection {
    /// Indices of the two kept coordinates
    pub fn axes(self) -> (usize, usize) {
        match self {
            Projection::XY => (0, 1),
            Projection::YZ => (1, 2),
            Projection::XZ => (0, 2),
        }
    }

    /// Index of the dropped coordinate
    pub fn ray_axis(self) -> usize {
        match self {
            Projection::XY => 2,
            Projection::YZ => 0,
            Projection::XZ => 1,
        }
    }

    pub fn project(self, p: Vec3) -> Vec2 {
        let (i, j) = self.axes();
        Vec2::from([p[i], p[j]])
    }

    pub fn project_box(self, bb: &AABox<3>) -> AABox<2> {
        let (i, j) = self.axes();
        AABox {
            min: Vec2::from([bb.min[i], bb.min[j]]),
            max: Vec2::from([bb.max[i], bb.max[j]]),
        }
    }
}

/// Uniform hash grid of triangle indices in a projection plane
pub struct TriGrid {
    pub cellsize: Float,
    pub projection: Projection,
    dict: FxHashMap<[i64; 2], Vec<usize>>,
}

impl TriGrid {
    /// Stamp every triangle's projected bounding box into the grid
    pub fn build(triangles: &[Triangle], cellsize: Float, projection: Projection) -> Self {
        let mut dict: FxHashMap<[i64; 2], Vec<usize>> = FxHashMap::default();
        for (i, tri) in triangles.iter().enumerate() {
            let bb = projection.project_box(&triangle_bounds(tri));
            let ka0 = (bb.min[0] / cellsize).floor() as i64;
            let ka1 = (bb.max[0] / cellsize).floor() as i64;
            let kb0 = (bb.min[1] / cellsize).floor() as i64;
            let kb1 = (bb.max[1] / cellsize).floor() as i64;
            for ka in ka0..=ka1 {
                for kb in kb0..=kb1 {
                    dict.entry([ka, kb]).or_default().push(i);
                }
            }
        }
        TriGrid {
            cellsize,
            projection,
            dict,
        }
    }

    fn cell_of(&self, a: Float, b: Float) -> [i64; 2] {
        [
            (a / self.cellsize).floor() as i64,
            (b / self.cellsize).floor() as i64,
        ]
    }

    /// Unique triangle indices from every cell overlapping the 2D box
    pub fn query_box(&self, bb: &AABox<2>) -> Vec<usize> {
        let lo = self.cell_of(bb.min[0], bb.min[1]);
        let hi = self.cell_of(bb.max[0], bb.max[1]);
        let mut seen = FxHashSet::default();
        let mut hits = Vec::new();
        for ka in lo[0]..=hi[0] {
            for kb in lo[1]..=hi[1] {
                if let Some(cell) = self.dict.get(&[ka, kb]) {
                    for &i in cell {
                        if seen.insert(i) {
                            hits.push(i);
                        }
                    }
                }
            }
        }
        hits
    }

    /// Triangle indices from the single cell containing (a, b)
    pub fn query_point(&self, a: Float, b: Float) -> &[usize] {
        self.dict
            .get(&self.cell_of(a, b))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// Mean edge length over the first 100 triangles, 1.0 when there are none
pub fn avg_edge(triangles: &[Triangle]) -> Float {
    let mut sum = 0.0;
    let mut count = 0usize;
    for tri in triangles.iter().take(100) {
        sum += distance(tri[0], tri[1]) + distance(tri[1], tri[2]) + distance(tri[2], tri[0]);
        count += 3;
    }
    if count == 0 {
        1.0
    } else {
        sum / count as Float
    }
}

/// Cell size used by every grid in the pipeline
pub fn cell_size_for(triangles: &[Triangle]) -> Float {
    (2.0 * avg_edge(triangles)).max(0.1)
}
