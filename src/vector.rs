//! SVG production: the trace-or-embed strategy switch, envelope assembly, and
//! markup minification.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::convert::encode_jpeg;
use crate::foundation::core::Bitmap;
use crate::foundation::error::ImgvertResult;
use crate::trace::{TraceParams, trace_rects};

/// Default pixel-area cutoff below which tracing is chosen. Above it the
/// rect count would make the document far larger and slower to render than
/// an embedded snapshot.
pub const DEFAULT_TRACE_AREA_THRESHOLD: u64 = 150_000;

/// Tunables for SVG production.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct VectorOptions {
    /// Trace iff `width * height < trace_area_threshold` (strict: an image
    /// exactly at the threshold embeds).
    pub trace_area_threshold: u64,
    pub trace: TraceParams,
}

impl Default for VectorOptions {
    fn default() -> Self {
        Self {
            trace_area_threshold: DEFAULT_TRACE_AREA_THRESHOLD,
            trace: TraceParams::default(),
        }
    }
}

/// The two ways of producing a vector document, kept as an explicit tagged
/// choice so each path stays independently testable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorStrategy {
    /// Grid of discrete filled rects from sampled pixels.
    Trace,
    /// Envelope around a single embedded raster snapshot.
    Embed,
}

impl VectorStrategy {
    /// Pick a strategy from the scaled output dimensions.
    pub fn select(width: u32, height: u32, area_threshold: u64) -> Self {
        let area = width as u64 * height as u64;
        if area < area_threshold {
            Self::Trace
        } else {
            Self::Embed
        }
    }
}

/// Produce a minified SVG document for `bitmap` using whichever strategy its
/// area selects. `quality` only affects the embed path's JPEG payload.
pub fn render_svg(bitmap: &Bitmap, quality: f32, opts: &VectorOptions) -> ImgvertResult<String> {
    let strategy = VectorStrategy::select(bitmap.width(), bitmap.height(), opts.trace_area_threshold);
    tracing::debug!(
        ?strategy,
        width = bitmap.width(),
        height = bitmap.height(),
        "selected svg strategy"
    );

    let body = match strategy {
        VectorStrategy::Trace => {
            let rects = trace_rects(bitmap, &opts.trace)?;
            format!("<g>{rects}</g>")
        }
        VectorStrategy::Embed => {
            let jpeg = encode_jpeg(bitmap, quality)?;
            let payload = BASE64.encode(&jpeg);
            format!(
                r#"<image width="{}" height="{}" href="data:image/jpeg;base64,{payload}"/>"#,
                bitmap.width(),
                bitmap.height()
            )
        }
    };

    Ok(minify_markup(&envelope(bitmap.width(), bitmap.height(), &body)))
}

/// Wrap `body` in the standard SVG root with matching viewport dimensions.
fn envelope(width: u32, height: u32, body: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">{body}</svg>"#
    )
}

/// Strip XML comments and inter-tag whitespace. Has no semantic effect on
/// rendering, only on payload size. Idempotent: minifying already-minified
/// markup returns it byte-identical.
pub fn minify_markup(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup.trim();

    while let Some(open) = rest.find("<!--") {
        out.push_str(&rest[..open]);
        match rest[open + 4..].find("-->") {
            Some(close) => rest = &rest[open + 4 + close + 3..],
            None => {
                // Unterminated comment: drop the remainder, matching how
                // permissive markup parsers treat it.
                rest = "";
            }
        }
    }
    out.push_str(rest);

    // Whitespace runs between a closing '>' and the next '<' carry no
    // rendering meaning; whitespace inside tags is left untouched.
    let mut collapsed = String::with_capacity(out.len());
    let mut chars = out.chars().peekable();
    let mut in_tag = false;
    while let Some(c) = chars.next() {
        match c {
            '<' => {
                in_tag = true;
                collapsed.push(c);
            }
            '>' => {
                in_tag = false;
                collapsed.push(c);
            }
            c if c.is_whitespace() && !in_tag => {
                while chars.peek().is_some_and(|n| n.is_whitespace()) {
                    chars.next();
                }
                // Only a run with a tag on both sides is safe to drop; a run
                // touching text content separates words and must survive as a
                // single space.
                let after_tag = collapsed.ends_with('>');
                let before_tag = chars.peek() == Some(&'<');
                if !(after_tag && before_tag) && chars.peek().is_some() {
                    collapsed.push(' ');
                }
            }
            c => collapsed.push(c),
        }
    }
    collapsed
}
