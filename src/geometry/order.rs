//! Canonical corner ordering for quadrilaterals.

use crate::geometry::{Point2, Quad};
use std::cmp::Ordering;

/// Reorders `quad` in place to top-left, top-right, bottom-right, bottom-left.
///
/// Corners are picked by the extremes of `x + y` (TL minimum, BR maximum) and
/// `y - x` (TR minimum, BL maximum). When an extreme is shared by several
/// points, or two picks land on the same vertex (a square rotated by 45
/// degrees), the points are ordered by angle around their centroid and
/// rotated to start at the smallest `x + y`. Non-finite coordinates fall back
/// to a lexicographic `(y, x)` ordering.
///
/// The result is a permutation of the input that depends only on the point
/// set, so reordering an already ordered quad leaves it unchanged.
pub fn order_quad(quad: &mut Quad) {
    if !quad.iter().all(|p| p.is_finite()) {
        order_lexicographic(quad);
        return;
    }
    // Fix the arrival order so float sums below do not depend on it.
    quad.sort_by(|a, b| a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y)));

    let picks = (
        unique_extreme(quad, |p| p.x + p.y, Ordering::Less),
        unique_extreme(quad, |p| p.y - p.x, Ordering::Less),
        unique_extreme(quad, |p| p.x + p.y, Ordering::Greater),
        unique_extreme(quad, |p| p.y - p.x, Ordering::Greater),
    );
    if let (Some(tl), Some(tr), Some(br), Some(bl)) = picks {
        let picks = [tl, tr, br, bl];
        let distinct = (0..4).all(|a| (a + 1..4).all(|b| picks[a] != picks[b]));
        if distinct {
            *quad = picks.map(|i| quad[i]);
            return;
        }
    }
    order_angular(quad);
}

/// Index of the vertex whose key is most extreme in direction `want`, or
/// `None` when that extreme is shared by more than one vertex.
fn unique_extreme(quad: &Quad, key: impl Fn(Point2) -> f32, want: Ordering) -> Option<usize> {
    let keys = quad.map(key);
    let mut best = 0;
    for (i, k) in keys.iter().enumerate().skip(1) {
        if k.total_cmp(&keys[best]) == want {
            best = i;
        }
    }
    let ties = keys
        .iter()
        .filter(|k| k.total_cmp(&keys[best]) == Ordering::Equal)
        .count();
    (ties == 1).then_some(best)
}

fn order_angular(quad: &mut Quad) {
    let cx = quad.iter().map(|p| p.x).sum::<f32>() * 0.25;
    let cy = quad.iter().map(|p| p.y).sum::<f32>() * 0.25;

    // With y pointing down, ascending atan2 walks TL, TR, BR, BL. Adding 0.0
    // folds -0.0 so a point level with the centroid lands at +pi, not -pi.
    let polar = quad.map(|p| {
        let (dx, dy) = (p.x - cx + 0.0, p.y - cy + 0.0);
        (dy.atan2(dx), dx * dx + dy * dy)
    });

    // Same angle: farther point first, then x, then y.
    let mut idx = [0usize, 1, 2, 3];
    idx.sort_by(|&a, &b| {
        polar[a]
            .0
            .total_cmp(&polar[b].0)
            .then_with(|| polar[b].1.total_cmp(&polar[a].1))
            .then_with(|| quad[a].x.total_cmp(&quad[b].x))
            .then_with(|| quad[a].y.total_cmp(&quad[b].y))
    });

    let mut start = 0;
    for k in 1..4 {
        let s = quad[idx[k]].x + quad[idx[k]].y;
        let best = quad[idx[start]].x + quad[idx[start]].y;
        if s < best {
            start = k;
        }
    }

    let src = *quad;
    for (k, slot) in quad.iter_mut().enumerate() {
        *slot = src[idx[(start + k) % 4]];
    }
}

fn order_lexicographic(quad: &mut Quad) {
    quad.sort_by(|a, b| a.y.total_cmp(&b.y).then_with(|| a.x.total_cmp(&b.x)));
    // quad[0] is top-most (TL), quad[3] bottom-most (BR); the right-hand one
    // of the middle pair is TR.
    let (p1, p2) = (quad[1], quad[2]);
    let (tr, bl) = if p2.x.total_cmp(&p1.x) == Ordering::Greater {
        (p2, p1)
    } else {
        (p1, p2)
    };
    let (tl, br) = (quad[0], quad[3]);
    *quad = [tl, tr, br, bl];
}

#[cfg(test)]
mod tests {
    use super::order_quad;
    use crate::geometry::{rect_quad, Point2};

    fn p(x: f32, y: f32) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn shuffled_rectangle_becomes_canonical() {
        let mut q = [p(4.0, 2.0), p(0.0, 0.0), p(0.0, 2.0), p(4.0, 0.0)];
        order_quad(&mut q);
        assert_eq!(q, rect_quad(0.0, 0.0, 4.0, 2.0));
    }

    #[test]
    fn tilted_quad_orders_by_corners() {
        let mut q = [p(12.0, 9.0), p(1.0, 1.0), p(2.0, 8.0), p(10.0, 0.0)];
        order_quad(&mut q);
        assert_eq!(q, [p(1.0, 1.0), p(10.0, 0.0), p(12.0, 9.0), p(2.0, 8.0)]);
    }

    #[test]
    fn diamond_uses_angular_fallback_and_is_stable() {
        let mut q = [p(-1.0, 0.0), p(0.0, 1.0), p(1.0, 0.0), p(0.0, -1.0)];
        order_quad(&mut q);
        assert_eq!(q, [p(0.0, -1.0), p(1.0, 0.0), p(0.0, 1.0), p(-1.0, 0.0)]);

        let once = q;
        order_quad(&mut q);
        assert_eq!(q, once);
    }

    #[test]
    fn tied_sums_resolve_the_same_from_any_order() {
        let expected = [p(-2.0, -1.0), p(-1.0, -2.0), p(2.0, 0.0), p(1.0, 1.0)];
        let mut q = [p(-1.0, -2.0), p(2.0, 0.0), p(1.0, 1.0), p(-2.0, -1.0)];
        order_quad(&mut q);
        assert_eq!(q, expected);
        order_quad(&mut q);
        assert_eq!(q, expected);
    }

    #[test]
    fn shared_angle_breaks_ties_by_distance() {
        let a = [p(1.0, -1.0), p(-1.0, -1.0), p(0.0, -2.0), p(0.0, -3.0)];
        let mut b = [a[3], a[1], a[0], a[2]];
        let mut a = a;
        order_quad(&mut a);
        order_quad(&mut b);
        assert_eq!(a, b);
        let once = a;
        order_quad(&mut a);
        assert_eq!(a, once);
    }

    #[test]
    fn coincident_points_stay_a_permutation() {
        let mut q = [p(3.0, 3.0); 4];
        order_quad(&mut q);
        assert_eq!(q, [p(3.0, 3.0); 4]);
    }

    #[test]
    fn non_finite_input_does_not_panic() {
        let mut q = [p(f32::NAN, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        order_quad(&mut q);
        assert_eq!(q.iter().filter(|v| v.x.is_nan()).count(), 1);
        assert!(q.contains(&p(1.0, 0.0)));
        assert!(q.contains(&p(1.0, 1.0)));
        assert!(q.contains(&p(0.0, 1.0)));
    }
}
