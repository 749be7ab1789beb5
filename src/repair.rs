/*!
    Repair primitives consumed by the boolean assembler

    Both operations run on a 3D uniform hash: a point bin that merges
    positionally coincident vertices under a tolerance. Seam dedup keeps
    the soup form, welding produces the indexed form.
*/

use crate::math::*;
use crate::soup::{IndexedMesh, Triangle};
use rustc_hash::FxHashMap;

type CellKey = [i64; 3];

/// Deduplicated points indexed by spatial hashing.
///
/// `cellsize` is the distance below which two points are considered
/// equivalent. Lookup scans the 8 cells any equivalent point can hash to.
struct PointBin {
    cellsize: Float,
    points: Vec<Vec3>,
    dict: FxHashMap<CellKey, Index>,
}

impl PointBin {
    fn new(cellsize: Float) -> Self {
        PointBin {
            cellsize,
            points: Vec::new(),
            dict: FxHashMap::default(),
        }
    }

    fn keyfor(&self, pt: Vec3) -> CellKey {
        let k = (pt / self.cellsize).map(|x| x.floor() as i64);
        *k.as_array()
    }

    /// 8 adjacent cell keys for tolerance-based lookup
    fn keysfor(&self, pt: Vec3) -> [CellKey; 8] {
        let vox = pt / self.cellsize;
        let lo = vox.map(|x| (x - 0.5 + NUMPREC).floor() as i64);
        let hi = vox.map(|x| (x + 0.5 - NUMPREC).floor() as i64);
        [
            [lo[0], lo[1], lo[2]],
            [hi[0], lo[1], lo[2]],
            [lo[0], hi[1], lo[2]],
            [hi[0], hi[1], lo[2]],
            [lo[0], lo[1], hi[2]],
            [hi[0], lo[1], hi[2]],
            [lo[0], hi[1], hi[2]],
            [hi[0], hi[1], hi[2]],
        ]
    }

    /// Index of the existing equivalent point, or of the newly added one
    fn add(&mut self, pt: Vec3) -> Index {
        for key in self.keysfor(pt) {
            if let Some(&idx) = self.dict.get(&key) {
                return idx;
            }
        }
        let idx = self.points.len() as Index;
        self.dict.insert(self.keyfor(pt), idx);
        self.points.push(pt);
        idx
    }
}

/// Merge positionally coincident vertices of a soup at `tolerance`,
/// removing triangles that collapse in the process.
pub fn dedup_seam_vertices(soup: &[Triangle], tolerance: Float) -> Vec<Triangle> {
    if tolerance <= 0.0 {
        return soup.to_vec();
    }
    let mut bin = PointBin::new(tolerance);
    let mut out = Vec::with_capacity(soup.len());
    for tri in soup {
        let idx = [bin.add(tri[0]), bin.add(tri[1]), bin.add(tri[2])];
        if idx[0] == idx[1] || idx[1] == idx[2] || idx[2] == idx[0] {
            continue;
        }
        out.push([
            bin.points[idx[0] as usize],
            bin.points[idx[1] as usize],
            bin.points[idx[2] as usize],
        ]);
    }
    out
}

/// Build an indexed mesh from a soup, merging vertices at `tolerance`.
///
/// A non-positive tolerance disables merging entirely; every distinct
/// bit pattern keeps its own pool slot.
pub fn weld(soup: &[Triangle], tolerance: Float) -> IndexedMesh {
    let mut mesh = IndexedMesh::default();
    if tolerance <= 0.0 {
        let mut seen: FxHashMap<[u64; 3], Index> = FxHashMap::default();
        for tri in soup {
            let mut idx = [0 as Index; 3];
            for (slot, p) in idx.iter_mut().zip(tri) {
                let bits = [p[0].to_bits(), p[1].to_bits(), p[2].to_bits()];
                *slot = *seen.entry(bits).or_insert_with(|| {
                    mesh.points.push(*p);
                    (mesh.points.len() - 1) as Index
                });
            }
            if idx[0] != idx[1] && idx[1] != idx[2] && idx[2] != idx[0] {
                mesh.triangles.push(idx);
            }
        }
        return mesh;
    }

    let mut bin = PointBin::new(tolerance);
    for tri in soup {
        let idx = [bin.add(tri[0]), bin.add(tri[1]), bin.add(tri[2])];
        if idx[0] != idx[1] && idx[1] != idx[2] && idx[2] != idx[0] {
            mesh.triangles.push(idx);
        }
    }
    mesh.points = bin.points;
    mesh
}
