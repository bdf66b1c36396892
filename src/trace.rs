//! Logging hooks for suppression and tiling.
//!
//! Call sites always write `trace_span!`/`trace_event!`; whether anything is
//! recorded is decided inside the expansion by the `tracing` feature. Field
//! values are still evaluated without the feature, by reference only.

/// Span covering one public call, e.g. `trace_span!("nms_poly", count = n)`.
///
/// Returns a `tracing::Span`, or a [`NoopSpan`] when the feature is off; both
/// support `.entered()`.
macro_rules! trace_span {
    ($name:literal $(, $key:ident = $value:expr)* $(,)?) => {{
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!($name $(, $key = $value)*);
        #[cfg(not(feature = "tracing"))]
        let span = {
            let _ = ($(&$value,)*);
            $crate::trace::NoopSpan
        };
        span
    }};
}

/// Named event carrying counters such as kept/suppressed totals or the chosen
/// grid size.
macro_rules! trace_event {
    ($name:literal, $($key:ident = $value:expr),+ $(,)?) => {{
        #[cfg(feature = "tracing")]
        tracing::info!(name: $name, $($key = $value),+);
        #[cfg(not(feature = "tracing"))]
        let _ = ($(&$value,)+);
    }};
}

pub(crate) use trace_event;
pub(crate) use trace_span;

#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
