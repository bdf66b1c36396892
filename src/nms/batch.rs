//! Rayon-parallel NMS over independent detection lists (feature-gated).
//!
//! Each list is suppressed on its own; nothing is shared between calls, so the
//! per-list results are identical to running [`nms_poly_with`] sequentially.

use crate::geometry::Detection;
use crate::nms::{nms_poly_with, NmsConfig};
use crate::trace::trace_span;
use rayon::prelude::*;

/// Suppresses every list in `batches` in parallel, preserving list order.
pub fn nms_poly_batch(batches: &[Vec<Detection>], cfg: &NmsConfig) -> Vec<Vec<Detection>> {
    let _span = trace_span!("nms_poly_batch", lists = batches.len()).entered();
    batches
        .par_iter()
        .map(|dets| nms_poly_with(dets, cfg))
        .collect()
}
