use anyhow::Context;

use crate::foundation::core::Bitmap;
use crate::foundation::error::ImgvertResult;

/// Decode a raster payload (PNG, JPEG, WebP, GIF, ...) into a straight-alpha
/// RGBA8 bitmap. Format detection is by content, not by the declared type.
pub fn decode_raster(bytes: &[u8]) -> ImgvertResult<Bitmap> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Bitmap::from_rgba8(width, height, rgba.into_raw())
}

/// Parse an SVG payload into a usvg tree.
pub fn parse_svg(bytes: &[u8]) -> ImgvertResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}
