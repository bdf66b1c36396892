//! Ephemeral uniform grid over detection AABBs.
//!
//! The grid is stored in CSR form: `offsets[c]..offsets[c + 1]` indexes the
//! slice of `items` holding every detection whose box overlaps cell `c`. A box
//! spanning several cells is listed in each of them, so callers deduplicate
//! with [`VisitStamps`].

use crate::geometry::Aabb;

/// Grids with more cells than this are abandoned in favour of brute force.
pub const MAX_GRID_CELLS: usize = 2_000_000;

/// Upper bound on cell memberships; boxes far larger than the chosen cell
/// size could otherwise multiply the item list without bound.
pub const MAX_GRID_ITEMS: usize = 32_000_000;

const CELL_BUCKETS: [f32; 3] = [64.0, 128.0, 256.0];

/// Grid geometry derived from a set of boxes, computed before any allocation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPlan {
    origin_x: f32,
    origin_y: f32,
    cell: f32,
    nx: f64,
    ny: f64,
}

impl GridPlan {
    /// Sizes cells from the mean box extent (each side floored at 1), clamped
    /// to `[64, 256]` and snapped up to the next of 64, 128 or 256. The origin
    /// is the minimum box corner so negative coordinates index correctly.
    pub fn for_boxes(boxes: &[Aabb]) -> Self {
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        let mut sum_w = 0.0f64;
        let mut sum_h = 0.0f64;
        for b in boxes {
            min_x = min_x.min(b.min_x);
            min_y = min_y.min(b.min_y);
            max_x = max_x.max(b.max_x);
            max_y = max_y.max(b.max_y);
            sum_w += f64::from((b.max_x - b.min_x).max(1.0));
            sum_h += f64::from((b.max_y - b.min_y).max(1.0));
        }
        let count = boxes.len().max(1) as f64;
        let mean = 0.5 * (sum_w / count + sum_h / count);
        let cell = snap_cell(mean as f32);

        let origin_x = if min_x.is_finite() { min_x } else { 0.0 };
        let origin_y = if min_y.is_finite() { min_y } else { 0.0 };
        let span_x = f64::from((max_x - origin_x).max(1.0));
        let span_y = f64::from((max_y - origin_y).max(1.0));

        Self {
            origin_x,
            origin_y,
            cell,
            nx: (span_x / f64::from(cell)).floor() + 1.0,
            ny: (span_y / f64::from(cell)).floor() + 1.0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell
    }

    /// Total cell count, saturating for pathological extents.
    pub fn cells(&self) -> f64 {
        self.nx * self.ny
    }

    /// Whether a grid with this plan stays within [`MAX_GRID_CELLS`].
    pub fn fits(&self) -> bool {
        let cells = self.cells();
        cells.is_finite() && cells <= MAX_GRID_CELLS as f64
    }
}

fn snap_cell(extent: f32) -> f32 {
    let c = if extent.is_nan() {
        CELL_BUCKETS[2]
    } else {
        extent.clamp(CELL_BUCKETS[0], CELL_BUCKETS[2])
    };
    CELL_BUCKETS
        .into_iter()
        .find(|&bucket| c <= bucket)
        .unwrap_or(CELL_BUCKETS[2])
}

/// Inclusive range of cell coordinates covered by a box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange {
    pub x0: usize,
    pub x1: usize,
    pub y0: usize,
    pub y1: usize,
}

impl CellRange {
    fn len(&self) -> usize {
        (self.x1 - self.x0 + 1) * (self.y1 - self.y0 + 1)
    }
}

/// Uniform grid mapping cells to the detections whose boxes overlap them.
#[derive(Debug)]
pub struct SpatialGrid {
    origin_x: f32,
    origin_y: f32,
    cell: f32,
    nx: usize,
    ny: usize,
    offsets: Vec<usize>,
    items: Vec<u32>,
}

impl SpatialGrid {
    /// Builds the grid for `boxes`, or `None` when the plan exceeds the cell
    /// or membership limits.
    pub fn build(plan: &GridPlan, boxes: &[Aabb]) -> Option<Self> {
        if !plan.fits() || u32::try_from(boxes.len()).is_err() {
            return None;
        }
        let mut grid = Self {
            origin_x: plan.origin_x,
            origin_y: plan.origin_y,
            cell: plan.cell,
            nx: plan.nx as usize,
            ny: plan.ny as usize,
            offsets: Vec::new(),
            items: Vec::new(),
        };

        let mut total = 0usize;
        for b in boxes {
            total = total.saturating_add(grid.cell_range(b).len());
        }
        if total > MAX_GRID_ITEMS {
            return None;
        }

        // Pass 1: per-cell counts, shifted by one so the prefix sum yields offsets.
        let cells = grid.nx * grid.ny;
        let mut offsets = vec![0usize; cells + 1];
        for b in boxes {
            let r = grid.cell_range(b);
            for cy in r.y0..=r.y1 {
                for cx in r.x0..=r.x1 {
                    offsets[grid.cell_id(cx, cy) + 1] += 1;
                }
            }
        }
        for c in 0..cells {
            offsets[c + 1] += offsets[c];
        }

        // Pass 2: scatter indices through a moving cursor.
        let mut cursor = offsets.clone();
        let mut items = vec![0u32; total];
        for (idx, b) in boxes.iter().enumerate() {
            let r = grid.cell_range(b);
            for cy in r.y0..=r.y1 {
                for cx in r.x0..=r.x1 {
                    let slot = &mut cursor[grid.cell_id(cx, cy)];
                    items[*slot] = idx as u32;
                    *slot += 1;
                }
            }
        }

        grid.offsets = offsets;
        grid.items = items;
        Some(grid)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell
    }

    /// Grid dimensions `(nx, ny)` in cells.
    pub fn dims(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    #[inline]
    fn cell_id(&self, cx: usize, cy: usize) -> usize {
        cy * self.nx + cx
    }

    #[inline]
    fn axis_cell(&self, v: f32, origin: f32, n: usize) -> usize {
        // NaN casts to 0; out-of-range values clamp to the border cells.
        let c = ((v - origin) / self.cell).floor() as i64;
        c.clamp(0, n as i64 - 1) as usize
    }

    /// Cells overlapped by `b`, clamped to the grid.
    pub fn cell_range(&self, b: &Aabb) -> CellRange {
        CellRange {
            x0: self.axis_cell(b.min_x, self.origin_x, self.nx),
            x1: self.axis_cell(b.max_x, self.origin_x, self.nx),
            y0: self.axis_cell(b.min_y, self.origin_y, self.ny),
            y1: self.axis_cell(b.max_y, self.origin_y, self.ny),
        }
    }

    /// Detection indices stored in cell `(cx, cy)`.
    pub fn cell_items(&self, cx: usize, cy: usize) -> &[u32] {
        if cx >= self.nx || cy >= self.ny {
            return &[];
        }
        let id = self.cell_id(cx, cy);
        &self.items[self.offsets[id]..self.offsets[id + 1]]
    }

    /// Calls `f` for every index stored in the cells `b` overlaps. An index
    /// appears once per shared cell.
    pub fn for_each_in(&self, b: &Aabb, mut f: impl FnMut(usize)) {
        let r = self.cell_range(b);
        for cy in r.y0..=r.y1 {
            for cx in r.x0..=r.x1 {
                for &j in self.cell_items(cx, cy) {
                    f(j as usize);
                }
            }
        }
    }
}

/// Per-call visited markers. Bumping the stamp invalidates every mark at once,
/// so each sweep step costs only as much as the candidates it touches.
pub struct VisitStamps {
    seen: Vec<u32>,
    stamp: u32,
}

impl VisitStamps {
    pub fn new(len: usize) -> Self {
        Self {
            seen: vec![0; len],
            stamp: 0,
        }
    }

    /// Starts a new visit round.
    pub fn advance(&mut self) {
        self.stamp += 1;
    }

    /// Marks `idx` and reports whether this is its first visit this round.
    pub fn first_visit(&mut self, idx: usize) -> bool {
        if self.seen[idx] == self.stamp {
            return false;
        }
        self.seen[idx] = self.stamp;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{snap_cell, CellRange, GridPlan, SpatialGrid, VisitStamps};
    use crate::geometry::{rect_quad, Aabb};

    fn bx(x0: f32, y0: f32, x1: f32, y1: f32) -> Aabb {
        Aabb::from_quad(&rect_quad(x0, y0, x1, y1))
    }

    #[test]
    fn cell_size_snaps_to_buckets() {
        assert_eq!(snap_cell(10.0), 64.0);
        assert_eq!(snap_cell(64.0), 64.0);
        assert_eq!(snap_cell(64.5), 128.0);
        assert_eq!(snap_cell(200.0), 256.0);
        assert_eq!(snap_cell(5000.0), 256.0);
        assert_eq!(snap_cell(f32::NAN), 256.0);
    }

    #[test]
    fn spanning_box_lands_in_every_cell() {
        let boxes = [
            bx(0.0, 0.0, 10.0, 10.0),
            bx(300.0, 0.0, 310.0, 10.0),
            bx(5.0, 5.0, 305.0, 8.0),
        ];
        let plan = GridPlan::for_boxes(&boxes);
        assert_eq!(plan.cell_size(), 64.0);
        let grid = SpatialGrid::build(&plan, &boxes).unwrap();
        assert_eq!(grid.dims(), (5, 1));

        assert_eq!(grid.cell_items(0, 0), &[0, 2]);
        assert_eq!(grid.cell_items(2, 0), &[2]);
        assert_eq!(grid.cell_items(4, 0), &[1, 2]);
        assert!(grid.cell_items(9, 9).is_empty());

        let r = grid.cell_range(&boxes[2]);
        assert_eq!(r, CellRange { x0: 0, x1: 4, y0: 0, y1: 0 });

        let mut visited = Vec::new();
        grid.for_each_in(&boxes[0], |j| visited.push(j));
        assert_eq!(visited, vec![0, 2]);
    }

    #[test]
    fn negative_coordinates_use_shifted_origin() {
        let boxes = [bx(-500.0, -500.0, -490.0, -490.0), bx(0.0, 0.0, 10.0, 10.0)];
        let plan = GridPlan::for_boxes(&boxes);
        let grid = SpatialGrid::build(&plan, &boxes).unwrap();
        assert_eq!(grid.cell_items(0, 0), &[0]);
        let (nx, ny) = grid.dims();
        assert_eq!(grid.cell_items(nx - 1, ny - 1), &[1]);
    }

    #[test]
    fn huge_extent_refuses_to_build() {
        let boxes = [bx(0.0, 0.0, 1.0, 1.0), bx(1.0e6, 1.0e6, 1.0e6 + 1.0, 1.0e6 + 1.0)];
        let plan = GridPlan::for_boxes(&boxes);
        assert!(!plan.fits());
        assert!(SpatialGrid::build(&plan, &boxes).is_none());

        let inf = [bx(0.0, 0.0, f32::INFINITY, 1.0)];
        assert!(!GridPlan::for_boxes(&inf).fits());
    }

    #[test]
    fn stamps_reset_per_round() {
        let mut stamps = VisitStamps::new(3);
        stamps.advance();
        assert!(stamps.first_visit(1));
        assert!(!stamps.first_visit(1));
        stamps.advance();
        assert!(stamps.first_visit(1));
    }
}
