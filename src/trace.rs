//! Fixed-stride pixel sampling: walk a decoded bitmap at a constant step and
//! emit one filled square per visible sample.
//!
//! This is deliberately not a contour tracer. There is no edge detection, no
//! merging of adjacent cells, and no path fitting; a coarse stride produces
//! visibly blocky output and drops sub-stride detail. That trade-off is the
//! point: output stays a bounded, editor-legible grid of independent rects.

use crate::foundation::core::Bitmap;
use crate::foundation::error::{ImgvertError, ImgvertResult};

/// Default sampling step in pixels.
pub const DEFAULT_STRIDE: u32 = 4;

/// Default alpha cutoff; samples must exceed this to emit a primitive.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 128;

/// Tunables for the sampler.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct TraceParams {
    /// Pixel step between sampled coordinates on both axes.
    pub stride: u32,
    /// Samples with `alpha > alpha_threshold` are visible; the rest are
    /// culled (transparency-culling policy, not an error).
    pub alpha_threshold: u8,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            stride: DEFAULT_STRIDE,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

impl TraceParams {
    pub fn validate(&self) -> ImgvertResult<()> {
        if self.stride == 0 {
            return Err(ImgvertError::validation("trace stride must be positive"));
        }
        Ok(())
    }
}

/// Restartable lazy sequence of sampled coordinates in raster-scan order
/// (row-major, top-to-bottom, left-to-right).
///
/// Yields exactly `ceil(width / stride) * ceil(height / stride)` coordinates.
#[derive(Clone, Copy, Debug)]
pub struct SampleGrid {
    width: u32,
    height: u32,
    stride: u32,
    x: u32,
    y: u32,
}

impl SampleGrid {
    pub fn new(width: u32, height: u32, stride: u32) -> Self {
        debug_assert!(stride > 0);
        Self {
            width,
            height,
            stride,
            x: 0,
            y: 0,
        }
    }
}

impl Iterator for SampleGrid {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<(u32, u32)> {
        if self.y >= self.height {
            return None;
        }
        let coord = (self.x, self.y);
        self.x += self.stride;
        if self.x >= self.width {
            self.x = 0;
            self.y += self.stride;
        }
        Some(coord)
    }
}

/// The emission rule for one sample: a stride-sided square at the sampled
/// coordinate, filled with the exact RGB of the sampled pixel, or `None` when
/// the sample is culled by the alpha threshold.
pub fn rect_for_sample(x: u32, y: u32, rgba: [u8; 4], params: &TraceParams) -> Option<String> {
    let [r, g, b, a] = rgba;
    if a <= params.alpha_threshold {
        return None;
    }
    let s = params.stride;
    Some(format!(
        r#"<rect x="{x}" y="{y}" width="{s}" height="{s}" fill="rgb({r},{g},{b})"/>"#
    ))
}

/// Sample `bitmap` at the configured stride and concatenate one rect per
/// visible sample, in raster-scan order. No deduplication or adjacency
/// merging; every emitted cell is independent. Deterministic.
pub fn trace_rects(bitmap: &Bitmap, params: &TraceParams) -> ImgvertResult<String> {
    params.validate()?;

    let mut out = String::new();
    for (x, y) in SampleGrid::new(bitmap.width(), bitmap.height(), params.stride) {
        if let Some(rect) = rect_for_sample(x, y, bitmap.pixel(x, y), params) {
            out.push_str(&rect);
        }
    }
    Ok(out)
}
