//! Geometric primitives for quadrilateral detections.
//!
//! All functions here are pure: they never allocate on the hot path (except
//! the thread-local scratch reused by `contour_score`) and map degenerate
//! input to sentinel values instead of failing.

pub mod contour;
pub mod fit;
pub mod iou;
pub mod order;

/// Planar point in floating-point pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub(crate) fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Four corner points of a quadrilateral.
pub type Quad = [Point2; 4];

/// Builds an axis-aligned rectangle quad in TL, TR, BR, BL order.
pub fn rect_quad(x0: f32, y0: f32, x1: f32, y1: f32) -> Quad {
    [
        Point2::new(x0, y0),
        Point2::new(x1, y0),
        Point2::new(x1, y1),
        Point2::new(x0, y1),
    ]
}

/// Quadrilateral detection with a confidence score.
///
/// Point order is whatever the upstream detector produced; call
/// [`order_quad`](crate::order_quad) when a canonical TL, TR, BR, BL layout is
/// needed.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Detection {
    pub pts: Quad,
    pub score: f32,
}

impl Detection {
    pub const fn new(pts: Quad, score: f32) -> Self {
        Self { pts, score }
    }

    /// Returns the axis-aligned box enclosing the quad.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_quad(&self.pts)
    }

    /// Returns a copy shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        let mut pts = self.pts;
        for p in pts.iter_mut() {
            p.x += dx;
            p.y += dy;
        }
        Self {
            pts,
            score: self.score,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    /// Computes the min/max extents over the four vertices.
    pub fn from_quad(q: &Quad) -> Self {
        let mut b = Self {
            min_x: q[0].x,
            min_y: q[0].y,
            max_x: q[0].x,
            max_y: q[0].y,
        };
        for p in &q[1..] {
            b.min_x = b.min_x.min(p.x);
            b.min_y = b.min_y.min(p.y);
            b.max_x = b.max_x.max(p.x);
            b.max_y = b.max_y.max(p.y);
        }
        b
    }

    /// Width clamped at zero.
    pub fn width(&self) -> f32 {
        (self.max_x - self.min_x).max(0.0)
    }

    /// Height clamped at zero.
    pub fn height(&self) -> f32 {
        (self.max_y - self.min_y).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Closed-interval overlap test; boxes touching along an edge overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max_x < other.min_x
            || other.max_x < self.min_x
            || self.max_y < other.min_y
            || other.max_y < self.min_y)
    }

    /// Area of the intersection rectangle, zero when disjoint.
    pub fn intersection_area(&self, other: &Aabb) -> f32 {
        let w = (self.max_x.min(other.max_x) - self.min_x.max(other.min_x)).max(0.0);
        let h = (self.max_y.min(other.max_y) - self.min_y.max(other.min_y)).max(0.0);
        w * h
    }
}
