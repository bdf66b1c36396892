//! Borrowed probability maps.
//!
//! `ProbMap` is a read-only 2D view over a row-major `f32` buffer with an
//! explicit stride, counted in elements between the starts of consecutive
//! rows. It is the input to [`contour_score`](crate::contour_score) and never
//! copies the underlying data.

use crate::util::{QuadNmsError, QuadNmsResult};

/// Single-channel probability field borrowed from a caller-owned buffer.
#[derive(Copy, Clone, Debug)]
pub struct ProbMap<'a> {
    data: &'a [f32],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a> ProbMap<'a> {
    /// Creates a contiguous map with `stride == width`.
    pub fn from_slice(data: &'a [f32], width: usize, height: usize) -> QuadNmsResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a map with an explicit row stride.
    pub fn new(data: &'a [f32], width: usize, height: usize, stride: usize) -> QuadNmsResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(QuadNmsError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the value at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x).copied()
    }

    /// Returns row `y` without its padding.
    pub fn row(&self, y: usize) -> Option<&'a [f32]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + self.width)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> QuadNmsResult<usize> {
    if width == 0 || height == 0 {
        return Err(QuadNmsError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(QuadNmsError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(QuadNmsError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::ProbMap;
    use crate::QuadNmsError;

    #[test]
    fn padded_rows_skip_the_padding() {
        let data = [1.0f32, 2.0, -1.0, 3.0, 4.0, -1.0];
        let map = ProbMap::new(&data, 2, 2, 3).unwrap();
        assert_eq!(map.row(1).unwrap(), &[3.0, 4.0]);
        assert_eq!(map.get(1, 0), Some(2.0));
        assert_eq!(map.get(2, 0), None);
    }

    #[test]
    fn rejects_short_buffers_and_bad_strides() {
        let data = [0.0f32; 5];
        assert_eq!(
            ProbMap::from_slice(&data, 3, 2).err(),
            Some(QuadNmsError::BufferTooSmall { needed: 6, got: 5 })
        );
        assert_eq!(
            ProbMap::new(&data, 3, 1, 2).err(),
            Some(QuadNmsError::InvalidStride {
                width: 3,
                stride: 2
            })
        );
        assert_eq!(
            ProbMap::from_slice(&data, 0, 2).err(),
            Some(QuadNmsError::InvalidDimensions {
                width: 0,
                height: 2
            })
        );
    }
}
