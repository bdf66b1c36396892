//! Greedy non-maximum suppression for quadrilateral detections.
//!
//! Detections are swept in descending score order. Each survivor suppresses
//! every strictly lower-ranked detection whose IoU with it reaches the
//! threshold. Candidates come from an adaptive uniform grid over the
//! detections' AABBs, falling back to a brute-force scan when the grid would
//! be too large.

pub mod grid;

#[cfg(feature = "rayon")]
mod batch;

#[cfg(feature = "rayon")]
pub use batch::nms_poly_batch;

use crate::geometry::iou::quad_iou;
use crate::geometry::{Aabb, Detection};
use crate::nms::grid::{GridPlan, SpatialGrid, VisitStamps};
use crate::trace::{trace_event, trace_span};
use std::cmp::Ordering;

/// Suppression parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NmsConfig {
    /// IoU at or above which the lower-scored detection is removed.
    ///
    /// `<= 0` disables suppression (all detections, sorted); `>= 1` keeps only
    /// the best detection.
    pub iou_threshold: f32,
    /// Compare axis-aligned boxes instead of exact polygons.
    pub use_fast_iou: bool,
}

impl Default for NmsConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.3,
            use_fast_iou: false,
        }
    }
}

/// Runs exact-polygon NMS with threshold `iou_threshold`.
///
/// Returns the kept detections in descending score order.
pub fn nms_poly(dets: &[Detection], iou_threshold: f32) -> Vec<Detection> {
    nms_poly_with(
        dets,
        &NmsConfig {
            iou_threshold,
            use_fast_iou: false,
        },
    )
}

/// Runs NMS with explicit configuration. Never fails; see [`NmsConfig`] for
/// the threshold edge cases.
pub fn nms_poly_with(dets: &[Detection], cfg: &NmsConfig) -> Vec<Detection> {
    let n = dets.len();
    if n == 0 {
        return Vec::new();
    }
    let thr = cfg.iou_threshold;
    let _span = trace_span!("nms_poly", count = n, iou_thr = thr).entered();

    if thr <= 0.0 {
        return score_order(dets).into_iter().map(|i| dets[i]).collect();
    }
    if thr >= 1.0 {
        return vec![dets[best_index(dets)]];
    }

    let order = score_order(dets);
    let mut rank = vec![0usize; n];
    for (pos, &idx) in order.iter().enumerate() {
        rank[idx] = pos;
    }
    let boxes: Vec<Aabb> = dets.iter().map(Detection::aabb).collect();

    let plan = GridPlan::for_boxes(&boxes);
    let grid = SpatialGrid::build(&plan, &boxes);
    match &grid {
        Some(g) => {
            let (nx, ny) = g.dims();
            trace_event!("nms_grid", cell = g.cell_size(), nx = nx, ny = ny);
        }
        None => {
            trace_event!("nms_bruteforce", cells = plan.cells());
        }
    }

    let mut sweep = Sweep {
        dets,
        boxes: &boxes,
        rank: &rank,
        suppressed: vec![false; n],
        thr,
        use_fast_iou: cfg.use_fast_iou,
    };
    let mut stamps = VisitStamps::new(n);
    let mut keep = Vec::with_capacity(n);

    for (pos, &i) in order.iter().enumerate() {
        if sweep.suppressed[i] {
            continue;
        }
        keep.push(dets[i]);

        match &grid {
            Some(g) => {
                stamps.advance();
                g.for_each_in(&boxes[i], |j| {
                    if stamps.first_visit(j) {
                        sweep.try_suppress(i, j);
                    }
                });
            }
            None => {
                for &j in &order[pos + 1..] {
                    sweep.try_suppress(i, j);
                }
            }
        }
    }

    trace_event!("nms_kept", kept = keep.len(), suppressed = n - keep.len());
    keep
}

/// Mutable state of one suppression sweep.
struct Sweep<'a> {
    dets: &'a [Detection],
    boxes: &'a [Aabb],
    rank: &'a [usize],
    suppressed: Vec<bool>,
    thr: f32,
    use_fast_iou: bool,
}

impl Sweep<'_> {
    /// Suppresses `j` if it ranks strictly below `i` and overlaps it enough.
    #[inline]
    fn try_suppress(&mut self, i: usize, j: usize) {
        if j == i || self.suppressed[j] || self.rank[j] <= self.rank[i] {
            return;
        }
        if !self.boxes[i].overlaps(&self.boxes[j]) {
            return;
        }
        let iou = quad_iou(&self.dets[i].pts, &self.dets[j].pts, self.use_fast_iou);
        if iou >= self.thr {
            self.suppressed[j] = true;
        }
    }
}

/// Indices sorted by descending score; equal scores keep input order.
pub(crate) fn score_order(dets: &[Detection]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..dets.len()).collect();
    order.sort_by(|&a, &b| dets[b].score.total_cmp(&dets[a].score));
    order
}

/// First index holding the maximum score.
fn best_index(dets: &[Detection]) -> usize {
    let mut best = 0;
    for (i, d) in dets.iter().enumerate().skip(1) {
        if d.score.total_cmp(&dets[best].score) == Ordering::Greater {
            best = i;
        }
    }
    best
}
