/*!
    meshbool: boolean operations on triangle meshes

    Computes union, intersection and difference of triangle soups,
    including open (non-watertight) surfaces such as terrain patches and
    partial shells. The pipeline is numerical with fixed tolerances:
    exact arithmetic is deliberately out of scope, as are repairs beyond
    the seam dedup and weld the assembler itself needs.

    The main entry point is [`boolean`]; the building blocks (pair
    intersection, multi-axis point classification, splitting) are public
    for callers assembling their own strategies.
*/

pub mod aabox;
pub mod boolean;
pub mod classify;
pub mod grid;
pub mod intersect;
pub mod math;
pub mod polyline;
pub mod repair;
pub mod soup;
pub mod split;
pub mod winding;

pub use boolean::{boolean, BooleanOp, BooleanOutput};
pub use math::{Float, Index, Vec2, Vec3};
pub use classify::{classify_point_multi_axis, classify_regions, MeshGrids};
pub use grid::{Projection, TriGrid};
pub use intersect::{
    crossed_sets, intersect_soups_tagged, tri_tri_intersection, tri_tri_intersection_detail,
    CrossedSet, IntersectionDetail, Segment, TaggedSegment,
};
pub use polyline::{chain_segments, simplify_polyline};
pub use repair::{dedup_seam_vertices, weld};
pub use soup::{IndexedMesh, Triangle};
pub use split::{seam_keys, split_and_classify, SplitGroups};
