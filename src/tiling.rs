//! Tile layout for split inference and merging of tile-local detections.
//!
//! An image is split into a `rows x cols` grid of balanced tiles, optionally
//! grown by a relative overlap and clipped to the image. Detections produced
//! per tile are shifted back to image coordinates by
//! [`merge_tile_detections`]; cross-tile duplicates are left for
//! [`nms_poly`](crate::nms_poly).

use crate::geometry::Detection;
use crate::trace::trace_event;
use crate::util::{QuadNmsError, QuadNmsResult};

/// Largest accepted relative overlap.
const MAX_OVERLAP: f32 = 0.95;

/// Tile grid dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self { rows: 1, cols: 1 }
    }
}

/// Tiling parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TileConfig {
    pub grid: GridSpec,
    /// Fraction of the nominal tile size added on each side, clamped to
    /// `[0, 0.95]`.
    pub overlap: f32,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            overlap: 0.1,
        }
    }
}

/// Tile rectangle in image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Builds the row-major tile layout for an `img_w x img_h` image.
///
/// Each axis is split into segments of `len / k` pixels with the remainder
/// spread over the first segments. Tiles are then expanded by
/// `round(segment * overlap)` on both sides, clipped to the image, and empty
/// tiles are dropped.
pub fn make_tiles(img_w: usize, img_h: usize, cfg: &TileConfig) -> QuadNmsResult<Vec<TileRect>> {
    if img_w == 0 || img_h == 0 {
        return Err(QuadNmsError::InvalidDimensions {
            width: img_w,
            height: img_h,
        });
    }
    let GridSpec { rows, cols } = cfg.grid;
    if rows == 0 || cols == 0 {
        return Err(QuadNmsError::InvalidGrid { rows, cols });
    }
    let overlap = if cfg.overlap.is_nan() {
        0.0
    } else {
        cfg.overlap.clamp(0.0, MAX_OVERLAP)
    };

    let xs = split_axis(img_w, cols);
    let ys = split_axis(img_h, rows);

    let mut tiles = Vec::with_capacity(rows * cols);
    for &(y0, h0) in &ys {
        for &(x0, w0) in &xs {
            let ex = grow(w0, overlap);
            let ey = grow(h0, overlap);
            let x1 = x0.saturating_sub(ex);
            let y1 = y0.saturating_sub(ey);
            let x2 = (x0 + w0 + ex).min(img_w);
            let y2 = (y0 + h0 + ey).min(img_h);
            if x2 > x1 && y2 > y1 {
                tiles.push(TileRect {
                    x: x1,
                    y: y1,
                    width: x2 - x1,
                    height: y2 - y1,
                });
            }
        }
    }

    trace_event!("tiles_built", tiles = tiles.len(), rows = rows, cols = cols);
    Ok(tiles)
}

/// Balanced split of `len` into `k` `(start, length)` segments.
fn split_axis(len: usize, k: usize) -> Vec<(usize, usize)> {
    let base = len / k;
    let rem = len % k;
    let mut start = 0;
    (0..k)
        .map(|i| {
            let seg = base + usize::from(i < rem);
            let out = (start, seg);
            start += seg;
            out
        })
        .collect()
}

fn grow(len: usize, overlap: f32) -> usize {
    (len as f64 * f64::from(overlap)).round() as usize
}

/// Shifts each tile's detections by its origin and concatenates them.
pub fn merge_tile_detections<I>(per_tile: I) -> Vec<Detection>
where
    I: IntoIterator<Item = (TileRect, Vec<Detection>)>,
{
    let mut merged = Vec::new();
    for (tile, dets) in per_tile {
        let (dx, dy) = (tile.x as f32, tile.y as f32);
        merged.extend(dets.iter().map(|d| d.translated(dx, dy)));
    }
    merged
}
