// tensorcam-frame/src/source.rs
use crate::{FrameError, Result, VideoFrame};
use std::path::Path;
use std::time::Duration;

/// Anything that can hand out frames one at a time.
///
/// `Ok(None)` means the source is exhausted.
pub trait FrameSource: Send + 'static {
    fn next_frame_blocking(&mut self) -> Result<Option<VideoFrame>>;
}

/// Replays a single RGBA image as a fixed number of frames.
pub struct StillImageSource {
    image: image::RgbaImage,
    remaining: usize,
    frame_interval: Duration,
    pts: Duration,
}

impl StillImageSource {
    pub fn new(image: image::RgbaImage, frames: usize, fps: u32) -> Self {
        let frame_interval = if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / fps
        };
        Self {
            image,
            remaining: frames,
            frame_interval,
            pts: Duration::ZERO,
        }
    }

    /// Decode `path` (png / jpeg) and replay it `frames` times.
    pub fn open(path: impl AsRef<Path>, frames: usize, fps: u32) -> Result<Self> {
        let img = image::open(path.as_ref())?.to_rgba8();
        log::info!(
            "loaded {} ({}x{})",
            path.as_ref().display(),
            img.width(),
            img.height()
        );
        Ok(Self::new(img, frames, fps))
    }
}

impl FrameSource for StillImageSource {
    fn next_frame_blocking(&mut self) -> Result<Option<VideoFrame>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        let (w, h) = self.image.dimensions();
        let frame = VideoFrame::packed(self.image.as_raw().clone(), w, h, self.pts)?;
        self.pts += self.frame_interval;
        Ok(Some(frame))
    }
}

impl<F> FrameSource for F
where
    F: FnMut() -> Option<std::result::Result<VideoFrame, String>> + Send + 'static,
{
    fn next_frame_blocking(&mut self) -> Result<Option<VideoFrame>> {
        match self() {
            Some(Ok(f)) => Ok(Some(f)),
            Some(Err(msg)) => Err(FrameError::Source(msg)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_image_counts_down_and_advances_pts() {
        let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([1, 2, 3, 4]));
        let mut src = StillImageSource::new(img, 3, 10);

        let mut pts = Vec::new();
        while let Some(f) = src.next_frame_blocking().unwrap() {
            assert_eq!((f.width(), f.height(), f.row_stride()), (4, 2, 16));
            pts.push(f.pts());
        }
        assert_eq!(
            pts,
            vec![Duration::ZERO, Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[test]
    fn closure_source_maps_errors() {
        let mut src = || Some(Err::<VideoFrame, _>("sensor gone".to_string()));
        assert!(matches!(
            src.next_frame_blocking(),
            Err(FrameError::Source(msg)) if msg == "sensor gone"
        ));
    }
}
