//! Aspect-preserving, stride-aligned input sizing.

/// Fits `(input_w, input_h)` so the longer edge becomes `side`, keeps the
/// aspect ratio, and rounds both edges to the nearest multiple of 32 (never
/// below 32).
///
/// A zero input dimension yields `(32, 32)`; `side == 0` keeps the input size
/// and only aligns it.
pub fn aspect_fit32(input_w: u32, input_h: u32, side: u32) -> (u32, u32) {
    aspect_fit(input_w, input_h, side, 32)
}

/// Same as [`aspect_fit32`] for an arbitrary non-zero `stride`.
pub fn aspect_fit(input_w: u32, input_h: u32, side: u32, stride: u32) -> (u32, u32) {
    let stride = stride.max(1);
    if input_w == 0 || input_h == 0 {
        return (stride, stride);
    }
    if side == 0 {
        return (
            align_nearest(input_w, stride),
            align_nearest(input_h, stride),
        );
    }

    let scale = f64::from(side) / f64::from(input_w.max(input_h));
    let w = (f64::from(input_w) * scale).round().max(1.0) as u32;
    let h = (f64::from(input_h) * scale).round().max(1.0) as u32;
    (align_nearest(w, stride), align_nearest(h, stride))
}

/// Rounds to the nearest multiple of `stride` (halves round up), at least `stride`.
fn align_nearest(v: u32, stride: u32) -> u32 {
    let q = (u64::from(v) + u64::from(stride / 2)) / u64::from(stride);
    let aligned = q.max(1) * u64::from(stride);
    u32::try_from(aligned).unwrap_or(u32::MAX - u32::MAX % stride)
}

#[cfg(test)]
mod tests {
    use super::{align_nearest, aspect_fit, aspect_fit32};

    #[test]
    fn full_hd_into_640() {
        assert_eq!(aspect_fit32(1920, 1080, 640), (640, 352));
        assert_eq!(aspect_fit32(1080, 1920, 640), (352, 640));
    }

    #[test]
    fn small_inputs_scale_up_to_side() {
        assert_eq!(aspect_fit32(100, 50, 960), (960, 480));
    }

    #[test]
    fn tiny_edges_floor_at_stride() {
        assert_eq!(aspect_fit32(4000, 10, 640), (640, 32));
        assert_eq!(aspect_fit32(0, 10, 640), (32, 32));
    }

    #[test]
    fn zero_side_aligns_input() {
        assert_eq!(aspect_fit32(1000, 500, 0), (992, 512));
    }

    #[test]
    fn nearest_rounding() {
        assert_eq!(align_nearest(47, 32), 32);
        assert_eq!(align_nearest(48, 32), 64);
        assert_eq!(align_nearest(0, 32), 32);
        assert_eq!(aspect_fit(300, 200, 300, 64), (320, 192));
    }
}
