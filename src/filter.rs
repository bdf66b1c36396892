//! Pre-suppression filtering.

use crate::geometry::Detection;

/// Keeps detections whose AABB is at least `min_w` wide and `min_h` tall.
///
/// A bound of zero disables that axis; with both zero the input is returned
/// as-is.
pub fn filter_min_size(dets: Vec<Detection>, min_w: f32, min_h: f32) -> Vec<Detection> {
    if min_w <= 0.0 && min_h <= 0.0 {
        return dets;
    }
    dets.into_iter()
        .filter(|d| {
            let b = d.aabb();
            !(min_w > 0.0 && b.width() < min_w) && !(min_h > 0.0 && b.height() < min_h)
        })
        .collect()
}
