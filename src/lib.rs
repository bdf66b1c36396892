//! quadnms is a post-processing core for quadrilateral detections.
//!
//! It reduces scored 4-point polygons to a non-overlapping subset with greedy
//! non-maximum suppression, and provides the geometry that step relies on:
//! canonical corner ordering, exact and AABB IoU, contour scoring over a
//! probability map, and stride-aligned input sizing. Parallel batch
//! suppression is available via the `rayon` feature.

mod filter;
pub mod geometry;
pub mod image;
pub mod lowlevel;
pub mod nms;
pub mod tiling;
mod trace;
pub mod util;

pub use geometry::contour::contour_score;
pub use geometry::fit::{aspect_fit, aspect_fit32};
pub use geometry::iou::{aabb_iou, quad_iou};
pub use geometry::order::order_quad;
pub use geometry::{rect_quad, Aabb, Detection, Point2, Quad};
pub use image::ProbMap;
pub use util::{QuadNmsError, QuadNmsResult};

pub use filter::filter_min_size;
#[cfg(feature = "rayon")]
pub use nms::nms_poly_batch;
pub use nms::{nms_poly, nms_poly_with, NmsConfig};
pub use tiling::{make_tiles, merge_tile_detections, GridSpec, TileConfig, TileRect};
