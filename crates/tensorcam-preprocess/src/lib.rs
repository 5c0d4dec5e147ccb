//! tensorcam‑preprocess – scale ARGB bitmaps + encode them as model input.

use anyhow::{bail, Result};
use resize::{new, Pixel, Type};
use rgb::FromSlice;
use tensorcam_frame::{pack_argb, unpack_rgba, Bitmap, BYTES_PER_PIXEL};

pub mod encode;
pub mod pool;

pub use encode::{encode, TensorBuffer, TensorEncoder, Traversal, BYTES_PER_FLOAT, CHANNELS};
pub use pool::TensorPool;

#[derive(Clone)]
pub struct Preprocessor {
    dst_w: u32,
    dst_h: u32,
    encoder: TensorEncoder,
}

impl Preprocessor {
    /// Create a pre‑processor whose tensors are sized for a WxH model input.
    pub fn new(dst_w: u32, dst_h: u32) -> Self {
        Self {
            dst_w,
            dst_h,
            encoder: TensorEncoder::default(),
        }
    }

    pub fn with_traversal(mut self, traversal: Traversal) -> Self {
        self.encoder = TensorEncoder::new(traversal);
        self
    }

    /// Scale to the model size without filtering.
    pub fn scale(&self, bitmap: &Bitmap) -> Result<Bitmap> {
        scale_bitmap(bitmap, self.dst_w, self.dst_h)
    }

    /// Scale + encode into a freshly allocated tensor.
    pub fn run(&self, bitmap: &Bitmap) -> Result<TensorBuffer> {
        let scaled = self.scale(bitmap)?;
        Ok(self.encoder.encode(Some(&scaled)))
    }

    /// Scale + encode, reusing `dst`'s allocation.
    pub fn run_into(&self, bitmap: &Bitmap, dst: &mut TensorBuffer) -> Result<()> {
        let scaled = self.scale(bitmap)?;
        self.encoder.encode_into(Some(&scaled), dst);
        Ok(())
    }
}

/// Nearest‑neighbour (unfiltered) scale of `src` to `dst_w`x`dst_h`.
///
/// A zero target size gives an empty bitmap. Scaling an empty source to a
/// non‑empty size is an error since there is nothing to sample.
pub fn scale_bitmap(src: &Bitmap, dst_w: u32, dst_h: u32) -> Result<Bitmap> {
    if dst_w == 0 || dst_h == 0 {
        return Ok(Bitmap::new(dst_w, dst_h));
    }
    if src.is_empty() {
        log::debug!("refusing to scale empty {}x{} bitmap", src.width(), src.height());
        bail!(
            "cannot scale an empty {}x{} bitmap to {}x{}",
            src.width(),
            src.height(),
            dst_w,
            dst_h
        );
    }
    if (src.width(), src.height()) == (dst_w, dst_h) {
        return Ok(src.clone());
    }

    log::trace!(
        "scaling {}x{} -> {}x{}",
        src.width(),
        src.height(),
        dst_w,
        dst_h
    );

    // 1. unpack to RGBA bytes (alpha last, as resize expects)
    let mut rgba = Vec::with_capacity(src.pixels().len() * BYTES_PER_PIXEL);
    for &px in src.pixels() {
        rgba.extend_from_slice(&unpack_rgba(px));
    }

    // 2. point sampling; RGBA8P so no premultiply pass touches the channels
    let mut dst = vec![0u8; dst_w as usize * dst_h as usize * BYTES_PER_PIXEL];
    let mut resizer = new(
        src.width() as usize,
        src.height() as usize,
        dst_w as usize,
        dst_h as usize,
        Pixel::RGBA8P,
        Type::Point,
    )?;
    resizer.resize(rgba.as_rgba(), dst.as_rgba_mut())?;

    // 3. repack
    let pixels = dst
        .chunks_exact(BYTES_PER_PIXEL)
        .map(|c| pack_argb(c[0], c[1], c[2], c[3]))
        .collect();
    Ok(Bitmap::from_pixels(dst_w, dst_h, pixels)?)
}
