//! The format converter: one request in, one encoded payload out.

use std::io::Cursor;

use anyhow::Context;

use crate::assets::decode::{decode_raster, parse_svg};
use crate::assets::svg_raster::{MAX_DIM, rasterize_svg, svg_raster_size};
use crate::foundation::core::Bitmap;
use crate::foundation::error::{ImgvertError, ImgvertResult};
use crate::vector::{VectorOptions, minify_markup, render_svg};

/// The fixed set of supported output encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeTarget {
    Png,
    Jpeg,
    /// Lossless in image 0.25; the quality scalar is ignored.
    WebP,
    Gif,
    Svg,
}

impl EncodeTarget {
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Svg => "image/svg+xml",
        }
    }

    /// Whether the encoding can represent transparency. Targets that cannot
    /// get flattened against an opaque backdrop before encoding.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

/// One self-contained conversion job. Output is fully determined by these
/// fields plus the converter options; nothing is cached across calls.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ConversionRequest {
    /// Undecoded source payload.
    pub source: Vec<u8>,
    /// Declared media type of `source`; SVG sources are routed by this.
    pub source_type: String,
    pub target: EncodeTarget,
    /// In `[0, 1]`. Affects JPEG output (standalone or embedded in SVG).
    pub quality: f32,
    /// Uniform scale multiplier, `> 0`.
    pub scale: f32,
}

impl ConversionRequest {
    pub fn validate(&self) -> ImgvertResult<()> {
        if !self.quality.is_finite() || !(0.0..=1.0).contains(&self.quality) {
            return Err(ImgvertError::validation(format!(
                "quality must be in [0, 1], got {}",
                self.quality
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ImgvertError::validation(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Encoded output: an opaque byte buffer plus its media type. Transient and
/// caller-owned; the converter retains nothing.
#[derive(Clone, Debug)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
}

const SVG_MEDIA_TYPE: &str = "image/svg+xml";

/// Run one conversion. Decode, scale, then encode for the requested target;
/// SVG targets route through the trace-or-embed strategy, and SVG-to-SVG is a
/// minify-only pass-through.
#[tracing::instrument(skip(req, opts), fields(target = ?req.target))]
pub fn convert(req: &ConversionRequest, opts: &VectorOptions) -> ImgvertResult<Rendered> {
    req.validate()?;

    let source_is_svg = req.source_type == SVG_MEDIA_TYPE;

    if source_is_svg && req.target == EncodeTarget::Svg {
        return pass_through_svg(&req.source);
    }

    let bitmap = if source_is_svg {
        let tree = parse_svg(&req.source)?;
        let (w, h) = svg_raster_size(&tree, req.scale)?;
        rasterize_svg(&tree, w, h)?
    } else {
        let decoded = decode_raster(&req.source)?;
        scale_bitmap(decoded, req.scale)?
    };

    let bytes = match req.target {
        EncodeTarget::Svg => render_svg(&bitmap, req.quality, opts)?.into_bytes(),
        EncodeTarget::Jpeg => encode_jpeg(&bitmap, req.quality)?,
        EncodeTarget::Png => encode_with_format(&bitmap, image::ImageFormat::Png)?,
        EncodeTarget::WebP => encode_with_format(&bitmap, image::ImageFormat::WebP)?,
        EncodeTarget::Gif => encode_with_format(&bitmap, image::ImageFormat::Gif)?,
    };

    Ok(Rendered {
        bytes,
        media_type: req.target.media_type(),
    })
}

/// SVG in, SVG out: minify only, no re-rendering. The source is still parsed
/// so malformed documents fail here instead of in a downstream viewer.
fn pass_through_svg(source: &[u8]) -> ImgvertResult<Rendered> {
    let text = std::str::from_utf8(source)
        .map_err(|_| ImgvertError::decode("svg source is not valid utf-8"))?;
    parse_svg(source)?;
    Ok(Rendered {
        bytes: minify_markup(text).into_bytes(),
        media_type: SVG_MEDIA_TYPE,
    })
}

fn scale_bitmap(bitmap: Bitmap, scale: f32) -> ImgvertResult<Bitmap> {
    if (scale - 1.0).abs() < f32::EPSILON {
        return Ok(bitmap);
    }
    let w = ((bitmap.width() as f32 * scale).round() as u32).max(1);
    let h = ((bitmap.height() as f32 * scale).round() as u32).max(1);
    if w > MAX_DIM || h > MAX_DIM {
        return Err(ImgvertError::validation(format!(
            "scaled raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let img = rgba_image(&bitmap)?;
    let resized = image::imageops::resize(&img, w, h, image::imageops::FilterType::Triangle);
    Bitmap::from_rgba8(w, h, resized.into_raw())
}

fn rgba_image(bitmap: &Bitmap) -> ImgvertResult<image::RgbaImage> {
    image::RgbaImage::from_raw(bitmap.width(), bitmap.height(), bitmap.as_rgba8().to_vec())
        .ok_or_else(|| ImgvertError::surface("bitmap buffer does not match its dimensions"))
}

/// JPEG cannot represent transparency, so flatten against an opaque white
/// backdrop, then encode RGB at the mapped quality.
pub(crate) fn encode_jpeg(bitmap: &Bitmap, quality: f32) -> ImgvertResult<Vec<u8>> {
    let rgb = flatten_to_rgb8(bitmap);
    let mut buf = Vec::new();
    let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(
        Cursor::new(&mut buf),
        jpeg_quality(quality),
    );
    enc.encode(
        rgb.as_raw(),
        bitmap.width(),
        bitmap.height(),
        image::ExtendedColorType::Rgb8,
    )
    .context("encode jpeg")?;
    Ok(buf)
}

fn encode_with_format(bitmap: &Bitmap, format: image::ImageFormat) -> ImgvertResult<Vec<u8>> {
    let img = rgba_image(bitmap)?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .with_context(|| format!("encode {format:?}"))?;
    Ok(buf)
}

/// Map the `[0, 1]` quality scalar onto the encoder's `1..=100` range.
fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

fn flatten_to_rgb8(bitmap: &Bitmap) -> image::RgbImage {
    let mut rgb = Vec::with_capacity(bitmap.as_rgba8().len() / 4 * 3);
    for px in bitmap.as_rgba8().chunks_exact(4) {
        let a = px[3] as u16;
        for &c in &px[..3] {
            rgb.push(((c as u16 * a + 255 * (255 - a) + 127) / 255) as u8);
        }
    }
    image::RgbImage::from_raw(bitmap.width(), bitmap.height(), rgb)
        .unwrap_or_else(|| image::RgbImage::new(bitmap.width(), bitmap.height()))
}
