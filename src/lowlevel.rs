//! Building blocks behind [`nms_poly`](crate::nms_poly).
//!
//! These expose the spatial index used to bound candidate comparisons, for
//! callers composing their own suppression passes. Most users only need the
//! top-level functions.

pub use crate::geometry::Aabb;
pub use crate::nms::grid::{
    CellRange, GridPlan, SpatialGrid, VisitStamps, MAX_GRID_CELLS, MAX_GRID_ITEMS,
};
