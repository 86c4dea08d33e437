use crate::foundation::core::Bitmap;
use crate::foundation::error::{ImgvertError, ImgvertResult};

/// Upper bound on either output dimension, shared with the raster scale path.
/// Callers wanting very large rasters should pre-scale the source instead.
pub(crate) const MAX_DIM: u32 = 16_384;

/// Compute the pixel size for rasterizing `tree` at a uniform `scale`.
pub fn svg_raster_size(tree: &usvg::Tree, scale: f32) -> ImgvertResult<(u32, u32)> {
    fn to_px(v: f32) -> ImgvertResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(ImgvertError::decode("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let w = to_px(size.width() * scale)?;
    let h = to_px(size.height() * scale)?;

    if w > MAX_DIM || h > MAX_DIM {
        return Err(ImgvertError::validation(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

/// Rasterize an SVG tree into a straight-alpha RGBA8 bitmap of `width` x `height`.
///
/// Pixmap allocation failure is the surface-acquisition error: fatal for this
/// request, no retry.
pub fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> ImgvertResult<Bitmap> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ImgvertError::surface("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are premultiplied; conversion back to straight alpha
    // happens per pixel so downstream fills carry the exact source RGB.
    let mut rgba = pixmap.take();
    unpremultiply_rgba8_in_place(&mut rgba);
    Bitmap::from_rgba8(width, height, rgba)
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}
