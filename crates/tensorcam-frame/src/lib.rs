// tensorcam-frame/src/lib.rs
// ============================================================
// Frame plumbing for tensorcam
// Carries RGBA_8888 analysis frames from a source into packed
// ARGB bitmaps that the preprocess stage can scale + encode.
// ------------------------------------------------------------
// Public API:
//   * VideoFrame::new()             – validated RGBA frame
//   * Bitmap::copy_pixels_from_frame – frame → ARGB_8888 bitmap
//   * FrameSource / frame_stream()   – backpressured delivery
// ============================================================

//! tensorcam – frame layer
//!
//! A [`VideoFrame`] is what the capture side hands us: one RGBA_8888 plane
//! with a row stride. A [`Bitmap`] is the packed `0xAARRGGBB` view the rest of
//! the pipeline works on. Frames reach the analyzer through [`frame_stream`],
//! which runs a [`FrameSource`] on its own thread and serializes delivery to a
//! single consumer.

use std::time::Duration;
use thiserror::Error;

mod source;
mod stream;
pub use source::{FrameSource, StillImageSource};
pub use stream::{frame_stream, DEPTH};

/// Bytes per RGBA_8888 / ARGB_8888 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Buffer not large enough for pixels: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },
    #[error("Row stride {stride} is smaller than a {width}px row")]
    InvalidStride { stride: u32, width: u32 },
    #[error("Dimension mismatch: expected {expected_w}x{expected_h}, got {actual_w}x{actual_h}")]
    DimensionMismatch {
        expected_w: u32,
        expected_h: u32,
        actual_w: u32,
        actual_h: u32,
    },
    #[error("Pixel count {actual} does not match {width}x{height}")]
    PixelCount { width: u32, height: u32, actual: usize },
    #[error("Frame size {width}x{height} overflows the address space")]
    TooLarge { width: u32, height: u32 },
    #[error("Frame source failed: {0}")]
    Source(String),
    #[error("Image decode failed: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, FrameError>;

/// A single RGBA_8888 analysis frame.
///
/// Only constructible through [`VideoFrame::new`] / [`VideoFrame::packed`],
/// so every row is known to be in bounds.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    // bytes per row, >= width * 4
    row_stride: u32,
    pts: Duration,
}

impl VideoFrame {
    /// Wrap an RGBA plane, checking that it covers every row.
    pub fn new(data: Vec<u8>, width: u32, height: u32, row_stride: u32, pts: Duration) -> Result<Self> {
        let row_bytes = (width as usize)
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or(FrameError::TooLarge { width, height })?;
        if (row_stride as usize) < row_bytes {
            return Err(FrameError::InvalidStride { stride: row_stride, width });
        }
        let needed = if height == 0 {
            0
        } else {
            (row_stride as usize)
                .checked_mul(height as usize - 1)
                .and_then(|n| n.checked_add(row_bytes))
                .ok_or(FrameError::TooLarge { width, height })?
        };
        if data.len() < needed {
            return Err(FrameError::BufferTooSmall { needed, actual: data.len() });
        }
        Ok(Self { data, width, height, row_stride, pts })
    }

    /// Tightly packed frame (`row_stride == width * 4`).
    pub fn packed(data: Vec<u8>, width: u32, height: u32, pts: Duration) -> Result<Self> {
        let stride = width
            .checked_mul(BYTES_PER_PIXEL as u32)
            .ok_or(FrameError::TooLarge { width, height })?;
        Self::new(data, width, height, stride, pts)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row, including padding.
    pub fn row_stride(&self) -> u32 {
        self.row_stride
    }

    pub fn pts(&self) -> Duration {
        self.pts
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGBA bytes of row `y`, without stride padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.row_stride as usize;
        &self.data[start..start + self.width as usize * BYTES_PER_PIXEL]
    }
}

/// Pack one RGBA byte quad into `0xAARRGGBB`.
#[inline]
pub fn pack_argb(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Split `0xAARRGGBB` back into `[r, g, b, a]`.
#[inline]
pub fn unpack_rgba(px: u32) -> [u8; 4] {
    [(px >> 16) as u8, (px >> 8) as u8, px as u8, (px >> 24) as u8]
}

/// ARGB_8888 bitmap. Pixels are row-major, one `u32` each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Bitmap {
    /// Transparent black bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(FrameError::PixelCount { width, height, actual: pixels.len() });
        }
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Row-major packed pixels; the first `width` entries are row 0.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Overwrite this bitmap with the frame's pixels. Sizes must match.
    pub fn copy_pixels_from_frame(&mut self, frame: &VideoFrame) -> Result<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(FrameError::DimensionMismatch {
                expected_w: self.width,
                expected_h: self.height,
                actual_w: frame.width,
                actual_h: frame.height,
            });
        }
        let w = self.width as usize;
        for y in 0..self.height {
            let dst = &mut self.pixels[y as usize * w..(y as usize + 1) * w];
            for (px, rgba) in dst.iter_mut().zip(frame.row(y).chunks_exact(BYTES_PER_PIXEL)) {
                *px = pack_argb(rgba[0], rgba[1], rgba[2], rgba[3]);
            }
        }
        Ok(())
    }

    /// Fresh bitmap sized to the frame.
    pub fn from_frame(frame: &VideoFrame) -> Result<Self> {
        let mut bmp = Self::new(frame.width, frame.height);
        bmp.copy_pixels_from_frame(frame)?;
        Ok(bmp)
    }

    pub fn from_rgba_image(img: &image::RgbaImage) -> Self {
        let pixels = img
            .pixels()
            .map(|p| pack_argb(p[0], p[1], p[2], p[3]))
            .collect();
        Self {
            width: img.width(),
            height: img.height(),
            pixels,
        }
    }

    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut raw = Vec::with_capacity(self.pixels.len() * BYTES_PER_PIXEL);
        for &px in &self.pixels {
            raw.extend_from_slice(&unpack_rgba(px));
        }
        // length is width*height*4 by construction
        image::RgbaImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }
}
