//! Mean probability inside a contour.

use crate::image::ProbMap;
use std::cell::RefCell;

#[derive(Default)]
struct Scratch {
    mask: Vec<u8>,
    local: Vec<(i64, i64)>,
    crossings: Vec<f64>,
}

thread_local! {
    static SCRATCH: RefCell<Scratch> = RefCell::new(Scratch::default());
}

/// Mean of `prob` over the pixels covered by the filled polygon `contour`.
///
/// The polygon's inclusive pixel bounding box is intersected with the map;
/// an empty contour or an empty intersection yields 0. Vertices are clamped
/// into that box, and the filled region includes the boundary pixels.
///
/// The rasterization mask lives in a per-thread buffer that only grows, so
/// repeated calls do not allocate and concurrent callers never share it.
pub fn contour_score(prob: &ProbMap<'_>, contour: &[(i32, i32)]) -> f32 {
    let Some(&(fx, fy)) = contour.first() else {
        return 0.0;
    };
    let (mut x0, mut y0, mut x1, mut y1) = (fx, fy, fx, fy);
    for &(x, y) in &contour[1..] {
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }

    let bx0 = i64::from(x0).max(0);
    let by0 = i64::from(y0).max(0);
    let bx1 = i64::from(x1).min(prob.width() as i64 - 1);
    let by1 = i64::from(y1).min(prob.height() as i64 - 1);
    if bx0 > bx1 || by0 > by1 {
        return 0.0;
    }
    let bw = (bx1 - bx0 + 1) as usize;
    let bh = (by1 - by0 + 1) as usize;

    SCRATCH.with(|cell| {
        let mut guard = cell.borrow_mut();
        let scratch = &mut *guard;

        scratch.local.clear();
        scratch.local.extend(
            contour
                .iter()
                .map(|&(x, y)| (i64::from(x).clamp(bx0, bx1) - bx0, i64::from(y).clamp(by0, by1) - by0)),
        );

        scratch.mask.clear();
        scratch.mask.resize(bw * bh, 0);
        fill_polygon(&scratch.local, &mut scratch.mask, bw, bh, &mut scratch.crossings);
        draw_outline(&scratch.local, &mut scratch.mask, bw);

        let mut sum = 0.0f64;
        let mut count = 0usize;
        for (ly, mask_row) in scratch.mask.chunks_exact(bw).enumerate() {
            let Some(row) = prob.row(by0 as usize + ly) else {
                continue;
            };
            let row = &row[bx0 as usize..bx0 as usize + bw];
            for (&m, &v) in mask_row.iter().zip(row) {
                if m != 0 {
                    sum += f64::from(v);
                    count += 1;
                }
            }
        }
        if count == 0 {
            0.0
        } else {
            (sum / count as f64) as f32
        }
    })
}

/// Even-odd scanline fill sampled at integer pixel rows.
fn fill_polygon(pts: &[(i64, i64)], mask: &mut [u8], bw: usize, bh: usize, xs: &mut Vec<f64>) {
    let n = pts.len();
    if n < 3 {
        return;
    }
    for y in 0..bh {
        let yf = y as f64;
        xs.clear();
        for i in 0..n {
            let (px, py) = pts[i];
            let (qx, qy) = pts[(i + 1) % n];
            let (pyf, qyf) = (py as f64, qy as f64);
            if (pyf <= yf && yf < qyf) || (qyf <= yf && yf < pyf) {
                let t = (yf - pyf) / (qyf - pyf);
                xs.push(px as f64 + t * (qx - px) as f64);
            }
        }
        xs.sort_by(f64::total_cmp);

        let row = &mut mask[y * bw..(y + 1) * bw];
        for span in xs.chunks_exact(2) {
            let start = span[0].ceil().max(0.0) as usize;
            let end = span[1].floor().min((bw - 1) as f64);
            if end < 0.0 {
                continue;
            }
            let end = end as usize;
            if start <= end {
                row[start..=end].fill(1);
            }
        }
    }
}

/// Bresenham outline so edge pixels count as inside.
fn draw_outline(pts: &[(i64, i64)], mask: &mut [u8], bw: usize) {
    let n = pts.len();
    for i in 0..n {
        let (mut x, mut y) = pts[i];
        let (x_end, y_end) = pts[(i + 1) % n];
        let dx = (x_end - x).abs();
        let dy = -(y_end - y).abs();
        let sx = if x < x_end { 1 } else { -1 };
        let sy = if y < y_end { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            mask[y as usize * bw + x as usize] = 1;
            if x == x_end && y == y_end {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::contour_score;
    use crate::image::ProbMap;

    fn gradient_map(width: usize, height: usize) -> Vec<f32> {
        (0..height)
            .flat_map(|_| (0..width).map(|x| x as f32))
            .collect()
    }

    #[test]
    fn rectangle_averages_its_columns() {
        let data = gradient_map(8, 6);
        let map = ProbMap::from_slice(&data, 8, 6).unwrap();
        let rect = [(2, 1), (4, 1), (4, 3), (2, 3)];
        assert!((contour_score(&map, &rect) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn triangle_mask_matches_half_plane() {
        let (w, h) = (8usize, 8usize);
        let data: Vec<f32> = (0..h)
            .flat_map(|y| (0..w).map(move |x| if x + y <= 4 { 1.0 } else { 0.0 }))
            .collect();
        let map = ProbMap::from_slice(&data, w, h).unwrap();
        let tri = [(0, 0), (4, 0), (0, 4)];
        assert!((contour_score(&map, &tri) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn outside_or_empty_contours_score_zero() {
        let data = vec![0.9f32; 16];
        let map = ProbMap::from_slice(&data, 4, 4).unwrap();
        assert_eq!(contour_score(&map, &[]), 0.0);
        assert_eq!(contour_score(&map, &[(10, 10), (12, 10), (12, 12)]), 0.0);
        assert_eq!(contour_score(&map, &[(-5, -5), (-1, -5), (-1, -1)]), 0.0);
    }

    #[test]
    fn partially_outside_contour_is_clipped() {
        let data = vec![0.25f32; 16];
        let map = ProbMap::from_slice(&data, 4, 4).unwrap();
        let big = [(-3, -3), (9, -3), (9, 9), (-3, 9)];
        assert!((contour_score(&map, &big) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn concurrent_callers_get_independent_scratch() {
        let data = gradient_map(32, 32);
        let map = ProbMap::from_slice(&data, 32, 32).unwrap();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let map = map;
                    s.spawn(move || {
                        let x0 = t * 6;
                        let rect = [(x0, 0), (x0 + 4, 0), (x0 + 4, 20), (x0, 20)];
                        (0..50).map(|_| contour_score(&map, &rect)).last().unwrap()
                    })
                })
                .collect();
            for (t, h) in handles.into_iter().enumerate() {
                let expected = (t * 6 + 2) as f32;
                assert!((h.join().unwrap() - expected).abs() < 1e-6);
            }
        });
    }
}
