use crate::foundation::error::{ImgvertError, ImgvertResult};

/// An immutable decoded image: tightly packed row-major RGBA8, 4 bytes per pixel.
#[derive(Clone, Debug)]
pub struct Bitmap {
    width: u32,
    height: u32,
    rgba8: Vec<u8>,
}

impl Bitmap {
    /// Wrap a raw RGBA8 buffer. Fails if dimensions are zero or the buffer
    /// length does not match `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> ImgvertResult<Self> {
        if width == 0 || height == 0 {
            return Err(ImgvertError::validation(format!(
                "bitmap dimensions must be positive, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if rgba8.len() != expected {
            return Err(ImgvertError::validation(format!(
                "bitmap buffer has {} bytes, expected {expected} for {width}x{height}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_rgba8(&self) -> &[u8] {
        &self.rgba8
    }

    pub fn into_rgba8(self) -> Vec<u8> {
        self.rgba8
    }

    /// Read the `[r, g, b, a]` quadruple at `(x, y)`. Callers stay in bounds;
    /// every caller in this crate iterates within `width`/`height`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        debug_assert!(x < self.width && y < self.height);
        let off = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.rgba8[off],
            self.rgba8[off + 1],
            self.rgba8[off + 2],
            self.rgba8[off + 3],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba8_validates_dimensions_and_length() {
        assert!(Bitmap::from_rgba8(0, 1, vec![]).is_err());
        assert!(Bitmap::from_rgba8(1, 0, vec![]).is_err());
        assert!(Bitmap::from_rgba8(2, 1, vec![0; 4]).is_err());
        assert!(Bitmap::from_rgba8(2, 1, vec![0; 8]).is_ok());
    }

    #[test]
    fn pixel_reads_row_major() {
        let mut buf = vec![0u8; 2 * 2 * 4];
        buf[4..8].copy_from_slice(&[1, 2, 3, 4]); // (1, 0)
        buf[8..12].copy_from_slice(&[5, 6, 7, 8]); // (0, 1)
        let bmp = Bitmap::from_rgba8(2, 2, buf).unwrap();
        assert_eq!(bmp.pixel(1, 0), [1, 2, 3, 4]);
        assert_eq!(bmp.pixel(0, 1), [5, 6, 7, 8]);
    }
}
