/*!
    Boolean operations on triangle soups

    The assembler wires the whole pipeline together: pair intersection,
    region classification, splitting of crossed triangles, seam cleanup,
    winding propagation and the final weld. Inputs are never mutated;
    everything built here lives for one invocation.
*/

use crate::classify::{classify_regions, MeshGrids};
use crate::intersect::{crossed_sets, intersect_soups_tagged};
use crate::math::*;
use crate::repair::{dedup_seam_vertices, weld};
use crate::soup::{flip_triangle, Triangle};
use crate::split::{seam_keys, split_and_classify};
use crate::winding::propagate_winding;

/// tolerance for seam dedup and the final weld
const WELD_TOL: Float = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BooleanOp {
    Subtract,
    Union,
    Intersect,
}

/// Result of a boolean operation: the raw soup plus its welded indexed
/// form.
#[derive(Clone, Debug)]
pub struct BooleanOutput {
    pub soup: Vec<Triangle>,
    pub points: Vec<Vec3>,
    pub triangles: Vec<[Index; 3]>,
}

fn finalize(soup: Vec<Triangle>) -> Option<BooleanOutput> {
    if soup.is_empty() {
        return None;
    }
    let mesh = weld(&soup, WELD_TOL);
    Some(BooleanOutput {
        soup,
        points: mesh.points,
        triangles: mesh.triangles,
    })
}

/// Boolean set operation between two triangle soups.
///
/// Returns `None` when there is no meaningful output: an empty input,
/// an intersection of disjoint meshes, or an empty combined result.
/// Open (non-watertight) inputs are tolerated; the result is then a best
/// effort and may be open as well.
pub fn boolean(a: &[Triangle], b: &[Triangle], op: BooleanOp) -> Option<BooleanOutput> {
    if a.is_empty() || b.is_empty() {
        return None;
    }

    let tagged = intersect_soups_tagged(a, b);
    if tagged.is_empty() {
        // nothing crosses: the operation degenerates
        return match op {
            BooleanOp::Union => {
                let mut soup = a.to_vec();
                soup.extend_from_slice(b);
                finalize(soup)
            }
            BooleanOp::Intersect => None,
            BooleanOp::Subtract => finalize(a.to_vec()),
        };
    }

    let (crossed_a, crossed_b) = crossed_sets(&tagged);
    let grids_a = MeshGrids::build(a);
    let grids_b = MeshGrids::build(b);

    let class_a = classify_regions(a, &crossed_a, b, &grids_b);
    let class_b = classify_regions(b, &crossed_b, a, &grids_a);

    let seam = seam_keys(&tagged);
    let groups_a = split_and_classify(a, &crossed_a, &class_a, &seam, b, &grids_b);
    let groups_b = split_and_classify(b, &crossed_b, &class_b, &seam, a, &grids_a);

    // seam cleanup and winding, independently per group
    let finish = |group: Vec<Triangle>| propagate_winding(&dedup_seam_vertices(&group, WELD_TOL));
    let a_inside = finish(groups_a.inside);
    let a_outside = finish(groups_a.outside);
    let b_inside = finish(groups_b.inside);
    let b_outside = finish(groups_b.outside);

    let combined = match op {
        BooleanOp::Union => {
            let mut soup = a_outside;
            soup.extend(b_outside);
            soup
        }
        BooleanOp::Intersect => {
            let mut soup = a_inside;
            soup.extend(b_inside);
            soup
        }
        BooleanOp::Subtract => {
            let mut soup = a_outside;
            // the removed cavity faces outward
            soup.extend(b_inside.iter().map(flip_triangle));
            soup
        }
    };

    finalize(combined)
}
