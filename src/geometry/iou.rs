//! Intersection-over-union for quadrilaterals.
//!
//! Exact mode clips the convex hulls of the two quads against each other
//! (Sutherland-Hodgman) in `f64`; fast mode compares axis-aligned boxes.

use crate::geometry::{Aabb, Quad};

/// Hull/clip vertex budget. Clipping a convex polygon by one half-plane adds at
/// most one vertex, so quad against quad stays well below this.
const MAX_VERTS: usize = 16;

const MIN_HULL_AREA: f64 = 1e-9;
const MIN_UNION_AREA: f64 = 1e-12;
const MIN_AABB_UNION: f32 = 1e-6;

/// IoU of the axis-aligned boxes enclosing `a` and `b`.
///
/// Returns 0 for non-finite coordinates or when the union area is (near) zero.
pub fn aabb_iou(a: &Quad, b: &Quad) -> f32 {
    if !a.iter().chain(b.iter()).all(|p| p.is_finite()) {
        return 0.0;
    }
    let ba = Aabb::from_quad(a);
    let bb = Aabb::from_quad(b);
    let inter = ba.intersection_area(&bb);
    let union = ba.area() + bb.area() - inter;
    if !(union > MIN_AABB_UNION) {
        return 0.0;
    }
    clamp_unit(inter / union)
}

/// IoU of two quadrilaterals.
///
/// With `use_fast_iou` this is [`aabb_iou`]. Otherwise the convex hull of each
/// quad is intersected exactly; hulls that collapse to a segment or a point,
/// and non-finite input, yield 0.
pub fn quad_iou(a: &Quad, b: &Quad, use_fast_iou: bool) -> f32 {
    if use_fast_iou {
        return aabb_iou(a, b);
    }
    if !a.iter().chain(b.iter()).all(|p| p.is_finite()) {
        return 0.0;
    }

    let (Some(ha), Some(hb)) = (ConvexPoly::hull_of(a), ConvexPoly::hull_of(b)) else {
        return 0.0;
    };
    let area_a = ha.area();
    let area_b = hb.area();

    let Some(clipped) = ha.clip_by(&hb) else {
        return 0.0;
    };
    let mut inter = clipped.area();
    if !(inter > 0.0) || !inter.is_finite() {
        return 0.0;
    }
    inter = inter.min(area_a.min(area_b));

    let union = area_a + area_b - inter;
    if !(union > MIN_UNION_AREA) || !union.is_finite() {
        return 0.0;
    }
    clamp_unit((inter / union) as f32)
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

type P = [f64; 2];

/// Counter-clockwise convex polygon with inline storage.
#[derive(Clone, Copy)]
struct ConvexPoly {
    pts: [P; MAX_VERTS],
    len: usize,
}

impl ConvexPoly {
    fn empty() -> Self {
        Self {
            pts: [[0.0; 2]; MAX_VERTS],
            len: 0,
        }
    }

    fn vertices(&self) -> &[P] {
        &self.pts[..self.len]
    }

    #[must_use]
    fn push(&mut self, p: P) -> bool {
        if self.len == MAX_VERTS {
            return false;
        }
        self.pts[self.len] = p;
        self.len += 1;
        true
    }

    /// Monotone-chain hull of the quad's vertices. `None` when the hull is
    /// not a proper polygon.
    fn hull_of(q: &Quad) -> Option<Self> {
        let mut pts: [P; 4] = q.map(|p| [f64::from(p.x), f64::from(p.y)]);
        pts.sort_by(|a, b| a[0].total_cmp(&b[0]).then_with(|| a[1].total_cmp(&b[1])));

        let mut hull = [[0.0; 2]; 8];
        let mut k = 0usize;
        for p in pts.iter() {
            while k >= 2 && cross(hull[k - 2], hull[k - 1], *p) <= 0.0 {
                k -= 1;
            }
            hull[k] = *p;
            k += 1;
        }
        let lower = k + 1;
        for p in pts.iter().rev().skip(1) {
            while k >= lower && cross(hull[k - 2], hull[k - 1], *p) <= 0.0 {
                k -= 1;
            }
            hull[k] = *p;
            k += 1;
        }
        // Last point repeats the first.
        k -= 1;
        if k < 3 {
            return None;
        }

        let mut out = Self::empty();
        for p in &hull[..k] {
            if !out.push(*p) {
                return None;
            }
        }
        (out.area() > MIN_HULL_AREA).then_some(out)
    }

    fn area(&self) -> f64 {
        let v = self.vertices();
        let n = v.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            twice += v[i][0] * v[j][1] - v[j][0] * v[i][1];
        }
        twice.abs() * 0.5
    }

    /// Clips `self` against every edge of the convex `clip` polygon.
    fn clip_by(&self, clip: &ConvexPoly) -> Option<ConvexPoly> {
        let mut subject = *self;
        let edges = clip.vertices();
        for i in 0..edges.len() {
            let e0 = edges[i];
            let e1 = edges[(i + 1) % edges.len()];

            let input = subject;
            let src = input.vertices();
            if src.is_empty() {
                return None;
            }
            subject = ConvexPoly::empty();

            let mut prev = src[src.len() - 1];
            let mut prev_side = cross(e0, e1, prev);
            for &cur in src {
                let cur_side = cross(e0, e1, cur);
                if cur_side >= 0.0 {
                    if prev_side < 0.0 && !subject.push(lerp(prev, cur, prev_side, cur_side)) {
                        return None;
                    }
                    if !subject.push(cur) {
                        return None;
                    }
                } else if prev_side >= 0.0 && !subject.push(lerp(prev, cur, prev_side, cur_side)) {
                    return None;
                }
                prev = cur;
                prev_side = cur_side;
            }
        }
        (subject.len >= 3).then_some(subject)
    }
}

#[inline]
fn cross(o: P, a: P, b: P) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

/// Point where segment `a -> b` crosses the clip line, given signed distances.
#[inline]
fn lerp(a: P, b: P, side_a: f64, side_b: f64) -> P {
    let t = side_a / (side_a - side_b);
    [a[0] + t * (b[0] - a[0]), a[1] + t * (b[1] - a[1])]
}
