//! Sequential batch driver. One request at a time, no shared state between
//! items, and a failed item never aborts the rest of the batch.

use crate::convert::{ConversionRequest, Rendered, convert};
use crate::foundation::error::ImgvertResult;
use crate::vector::VectorOptions;

/// Convert every request in order, collecting one result per item in the same
/// order. Errors stay in place; remaining items still run.
pub fn convert_all(
    requests: &[ConversionRequest],
    opts: &VectorOptions,
) -> Vec<ImgvertResult<Rendered>> {
    requests.iter().map(|req| convert(req, opts)).collect()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::convert::EncodeTarget;

    fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
        let buf: Vec<u8> = rgba.iter().copied().cycle().take(w as usize * h as usize * 4).collect();
        let img = image::RgbaImage::from_raw(w, h, buf).unwrap();
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    fn req(source: Vec<u8>, target: EncodeTarget) -> ConversionRequest {
        ConversionRequest {
            source,
            source_type: "image/png".into(),
            target,
            quality: 0.9,
            scale: 1.0,
        }
    }

    #[test]
    fn a_failing_item_does_not_stop_the_batch() {
        let requests = vec![
            req(png_bytes(2, 2, [255, 0, 0, 255]), EncodeTarget::Png),
            req(b"not an image".to_vec(), EncodeTarget::Png),
            req(png_bytes(2, 2, [0, 255, 0, 255]), EncodeTarget::Jpeg),
        ];

        let results = convert_all(&requests, &VectorOptions::default());
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
        assert_eq!(results[2].as_ref().unwrap().media_type, "image/jpeg");
    }

    #[test]
    fn results_keep_request_order() {
        let requests = vec![
            req(png_bytes(1, 1, [1, 2, 3, 255]), EncodeTarget::Jpeg),
            req(png_bytes(1, 1, [1, 2, 3, 255]), EncodeTarget::Png),
        ];
        let results = convert_all(&requests, &VectorOptions::default());
        assert_eq!(results[0].as_ref().unwrap().media_type, "image/jpeg");
        assert_eq!(results[1].as_ref().unwrap().media_type, "image/png");
    }
}
