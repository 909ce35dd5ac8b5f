//! RGBA raster buffers.
//!
//! [`RasterBuffer`] is the kernel's input and output type: a tightly packed,
//! row-major grid of interleaved RGBA bytes. Length is validated once at
//! construction so the kernel never has to.

use imgref::{Img, ImgRef, ImgVec};
use rgb::RGBA8;

use crate::PixelDiffError;

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Fully transparent black, used for coordinates outside a buffer.
pub const TRANSPARENT: RGBA8 = RGBA8 {
    r: 0,
    g: 0,
    b: 0,
    a: 0,
};

/// A `width × height` grid of RGBA pixels stored as interleaved bytes.
///
/// Rows run top to bottom with no padding, so `pixels.len()` is always
/// `width * height * 4`. Zero-sized buffers are allowed and hold no bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RasterBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

/// Computes `width * height * 4`, or `None` on overflow.
pub(crate) fn byte_len(width: usize, height: usize) -> Option<usize> {
    width
        .checked_mul(height)
        .and_then(|wh| wh.checked_mul(BYTES_PER_PIXEL))
}

/// Checks that `len` matches `width * height * 4`.
pub(crate) fn check_len(width: usize, height: usize, len: usize) -> Result<(), PixelDiffError> {
    let expected = byte_len(width, height)
        .ok_or(PixelDiffError::DimensionOverflow { width, height })?;
    if len != expected {
        return Err(PixelDiffError::InvalidBuffer {
            width,
            height,
            expected,
            actual: len,
        });
    }
    Ok(())
}

impl RasterBuffer {
    /// Wraps interleaved RGBA bytes.
    ///
    /// # Errors
    /// - [`PixelDiffError::InvalidBuffer`] if `pixels.len() != width * height * 4`
    /// - [`PixelDiffError::DimensionOverflow`] if that product overflows `usize`
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, PixelDiffError> {
        check_len(width, height, pixels.len())?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Copies interleaved RGBA bytes out of a borrowed slice.
    ///
    /// # Errors
    /// Same as [`RasterBuffer::new`].
    pub fn from_slice(width: usize, height: usize, pixels: &[u8]) -> Result<Self, PixelDiffError> {
        check_len(width, height, pixels.len())?;
        Ok(Self {
            width,
            height,
            pixels: pixels.to_vec(),
        })
    }

    /// Creates a buffer where every pixel is `color`.
    ///
    /// # Panics
    /// Panics if `width * height * 4` overflows `usize`.
    #[must_use]
    pub fn filled(width: usize, height: usize, color: RGBA8) -> Self {
        let len = byte_len(width, height).expect("raster dimensions overflow usize");
        let mut pixels = Vec::with_capacity(len);
        for _ in 0..width * height {
            pixels.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Creates a fully transparent buffer.
    ///
    /// # Panics
    /// Panics if `width * height * 4` overflows `usize`.
    #[must_use]
    pub fn transparent(width: usize, height: usize) -> Self {
        let len = byte_len(width, height).expect("raster dimensions overflow usize");
        Self {
            width,
            height,
            pixels: vec![0; len],
        }
    }

    /// Builds a buffer from one `RGBA8` per pixel.
    ///
    /// # Errors
    /// [`PixelDiffError::InvalidBuffer`] if `pixels.len() != width * height`.
    pub fn from_pixels(
        width: usize,
        height: usize,
        pixels: &[RGBA8],
    ) -> Result<Self, PixelDiffError> {
        check_len(width, height, pixels.len() * BYTES_PER_PIXEL)?;
        let bytes = pixels.iter().flat_map(|p| [p.r, p.g, p.b, p.a]).collect();
        Ok(Self {
            width,
            height,
            pixels: bytes,
        })
    }

    /// Copies an `imgref` view, dropping any row stride padding.
    #[must_use]
    pub fn from_imgref(img: ImgRef<'_, RGBA8>) -> Self {
        let (width, height) = (img.width(), img.height());
        let mut pixels = Vec::with_capacity(width * height * BYTES_PER_PIXEL);
        for row in img.rows() {
            for p in row {
                pixels.extend_from_slice(&[p.r, p.g, p.b, p.a]);
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Converts into an owned `imgref` image.
    #[must_use]
    pub fn to_imgvec(&self) -> ImgVec<RGBA8> {
        let pixels = self
            .pixels
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|c| RGBA8::new(c[0], c[1], c[2], c[3]))
            .collect();
        Img::new(pixels, self.width, self.height)
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// True when the buffer has no pixels.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Interleaved RGBA bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Consumes the buffer, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    /// Returns the bytes of row `y`, or `None` if out of range.
    #[inline]
    #[must_use]
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.width * BYTES_PER_PIXEL;
        let start = y * stride;
        Some(&self.pixels[start..start + stride])
    }

    /// Returns the pixel at `(x, y)`, or `None` if out of range.
    #[inline]
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<RGBA8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * BYTES_PER_PIXEL;
        let p = &self.pixels[i..i + BYTES_PER_PIXEL];
        Some(RGBA8::new(p[0], p[1], p[2], p[3]))
    }

    /// Returns the pixel at `(x, y)`, or transparent black if out of range.
    #[inline]
    #[must_use]
    pub fn pixel_or_transparent(&self, x: usize, y: usize) -> RGBA8 {
        self.pixel(x, y).unwrap_or(TRANSPARENT)
    }

    /// Writes one pixel. Only the kernel builds buffers this way.
    #[inline]
    pub(crate) fn set_pixel(&mut self, x: usize, y: usize, p: RGBA8) {
        let i = (y * self.width + x) * BYTES_PER_PIXEL;
        self.pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&[p.r, p.g, p.b, p.a]);
    }
}
