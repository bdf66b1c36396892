//! Error types for quadnms.

use thiserror::Error;

/// Result alias for quadnms operations.
pub type QuadNmsResult<T> = std::result::Result<T, QuadNmsError>;

/// Errors raised when constructing views or layouts from invalid parameters.
///
/// The geometry primitives and the suppression engine never return errors;
/// degenerate input maps to sentinel values instead.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QuadNmsError {
    /// A width or height is zero.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The backing buffer cannot hold the described view.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A tiling grid has zero rows or columns.
    #[error("invalid tile grid: {rows} rows x {cols} cols")]
    InvalidGrid { rows: usize, cols: usize },
}
