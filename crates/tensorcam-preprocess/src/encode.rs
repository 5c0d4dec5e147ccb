//! Bitmap → float tensor encoding.
//!
//! Every pixel becomes three native‑endian `f32`s in `[0, 1]`: bits 16‑23,
//! 8‑15 and 0‑7 of the packed `0xAARRGGBB` value, each divided by 255. Alpha
//! is dropped. Output is exactly `4 * W * H * 3` bytes.

use ndarray::{Array4, ShapeError};
use serde::{Deserialize, Serialize};
use tensorcam_frame::Bitmap;

pub const BYTES_PER_FLOAT: usize = std::mem::size_of::<f32>();
pub const CHANNELS: usize = 3;

/// Order in which pixels are visited when writing the tensor.
///
/// `ColumnMajor` walks `x` in the outer loop and `y` in the inner loop over
/// the row‑major pixel array, which transposes the image. Deployed model
/// weights were fed this layout, so it is the default. `RowMajor` writes
/// pixels in their natural order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traversal {
    #[default]
    ColumnMajor,
    RowMajor,
}

/// Encoded model input: raw bytes plus the bitmap size they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TensorBuffer {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl TensorBuffer {
    /// Empty buffer with room for a `width`x`height` encode.
    pub fn with_capacity(width: u32, height: u32) -> Self {
        Self {
            bytes: Vec::with_capacity(encoded_len(width, height)),
            width: 0,
            height: 0,
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn iter_f32(&self) -> impl Iterator<Item = f32> + '_ {
        self.bytes
            .chunks_exact(BYTES_PER_FLOAT)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
    }

    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.iter_f32().collect()
    }

    /// View the floats as a `[1, 3, W, H]` input tensor.
    ///
    /// This is a reinterpretation of the flat buffer, the same way a
    /// fixed‑size runtime tensor is loaded from raw bytes. No reordering.
    pub fn to_array(&self) -> Result<Array4<f32>, ShapeError> {
        Array4::from_shape_vec(
            (1, CHANNELS, self.width as usize, self.height as usize),
            self.to_f32_vec(),
        )
    }

    fn reset(&mut self) {
        self.bytes.clear();
        self.width = 0;
        self.height = 0;
    }
}

/// Byte length of an encoded `width`x`height` bitmap.
pub fn encoded_len(width: u32, height: u32) -> usize {
    BYTES_PER_FLOAT * width as usize * height as usize * CHANNELS
}

/// Stateless encoder; only the traversal order is configurable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TensorEncoder {
    traversal: Traversal,
}

impl TensorEncoder {
    pub fn new(traversal: Traversal) -> Self {
        Self { traversal }
    }

    pub fn traversal(&self) -> Traversal {
        self.traversal
    }

    /// Encode into a new buffer. `None` encodes to an empty buffer.
    pub fn encode(&self, bitmap: Option<&Bitmap>) -> TensorBuffer {
        let mut out = TensorBuffer::default();
        self.encode_into(bitmap, &mut out);
        out
    }

    /// Encode into `dst`, replacing its contents but keeping its allocation.
    pub fn encode_into(&self, bitmap: Option<&Bitmap>, dst: &mut TensorBuffer) {
        dst.reset();
        let Some(bmp) = bitmap else { return };

        let (w, h) = (bmp.width() as usize, bmp.height() as usize);
        dst.bytes.reserve(encoded_len(bmp.width(), bmp.height()));
        let px = bmp.pixels();

        match self.traversal {
            Traversal::ColumnMajor => {
                for x in 0..w {
                    for y in 0..h {
                        push_pixel(&mut dst.bytes, px[y * w + x]);
                    }
                }
            }
            Traversal::RowMajor => {
                for &p in px {
                    push_pixel(&mut dst.bytes, p);
                }
            }
        }

        dst.width = bmp.width();
        dst.height = bmp.height();
    }
}

/// Encode with the default (column‑major) traversal.
pub fn encode(bitmap: Option<&Bitmap>) -> TensorBuffer {
    TensorEncoder::default().encode(bitmap)
}

#[inline]
fn push_pixel(out: &mut Vec<u8>, px: u32) {
    for shift in [16, 8, 0] {
        let v = ((px >> shift) & 0xFF) as f32 / 255.0;
        out.extend_from_slice(&v.to_ne_bytes());
    }
}
