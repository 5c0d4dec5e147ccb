//! Per‑frame analysis: frame → bitmap → scale → encode → classify.

use crate::barcode::{scan_and_log, Barcode, BarcodeOptions, BarcodeScanner};
use crate::scores::Scores;
use crate::{Classifier, ClassifyError, Result};
use futures_core::Stream;
use std::time::Duration;
use tensorcam_frame::{Bitmap, VideoFrame};
use tensorcam_model::ModelConfig;
use tensorcam_preprocess::{Preprocessor, TensorPool};
use tokio_stream::StreamExt;

/// What one frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub pts: Duration,
    pub scores: Scores,
    pub barcodes: Vec<Barcode>,
}

/// Drives a single frame end to end. Not shared between workers; frames
/// are expected one at a time from [`tensorcam_frame::frame_stream`].
pub struct FrameAnalyzer<C> {
    config: ModelConfig,
    preprocessor: Preprocessor,
    classifier: C,
    scanner: Option<Box<dyn BarcodeScanner + Send>>,
    barcode_options: BarcodeOptions,
    // frame-sized, reallocated only when the frame size changes
    frame_bitmap: Option<Bitmap>,
    tensors: TensorPool,
}

impl<C: Classifier> FrameAnalyzer<C> {
    pub fn new(config: ModelConfig, classifier: C) -> Result<Self> {
        config.validate()?;
        let preprocessor = Preprocessor::new(config.input_width, config.input_height)
            .with_traversal(config.traversal);
        let barcode_options = BarcodeOptions::builder()
            .set_barcode_formats(config.barcode_formats.iter().copied())
            .build();
        let tensors = TensorPool::new(config.input_width, config.input_height, 1);

        Ok(Self {
            config,
            preprocessor,
            classifier,
            scanner: None,
            barcode_options,
            frame_bitmap: None,
            tensors,
        })
    }

    /// Attach a barcode engine. Only used when `scan_barcodes` is set.
    pub fn with_scanner(mut self, scanner: impl BarcodeScanner + Send + 'static) -> Self {
        self.scanner = Some(Box::new(scanner));
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Analyze one frame. The frame is consumed.
    pub fn analyze(&mut self, frame: VideoFrame) -> Result<Analysis> {
        let stale = self
            .frame_bitmap
            .as_ref()
            .map_or(true, |b| (b.width(), b.height()) != (frame.width(), frame.height()));
        if stale {
            log::debug!("allocating {}x{} frame bitmap", frame.width(), frame.height());
            self.frame_bitmap = Some(Bitmap::new(frame.width(), frame.height()));
        }
        let bitmap = self
            .frame_bitmap
            .get_or_insert_with(|| Bitmap::new(frame.width(), frame.height()));
        bitmap.copy_pixels_from_frame(&frame)?;

        let mut tensor = self.tensors.acquire();
        let raw = self
            .preprocessor
            .run_into(bitmap, &mut tensor)
            .map_err(ClassifyError::from)
            .and_then(|()| self.classifier.classify(&tensor));
        self.tensors.release(tensor);
        let scores = Scores::from_raw(raw?);

        let barcodes = match (&mut self.scanner, self.config.scan_barcodes) {
            (Some(scanner), true) => scan_and_log(scanner.as_mut(), bitmap, &self.barcode_options)?,
            _ => Vec::new(),
        };

        Ok(Analysis {
            pts: frame.pts(),
            scores,
            barcodes,
        })
    }

    /// Drain `frames` one at a time, handing each result to `on_result`.
    ///
    /// A frame that fails to analyze is logged and skipped. A stream error
    /// stops the loop and is returned. Yields the number of analyzed frames.
    pub async fn analyze_stream<S, F>(&mut self, frames: S, mut on_result: F) -> Result<usize>
    where
        S: Stream<Item = tensorcam_frame::Result<VideoFrame>>,
        F: FnMut(Analysis),
    {
        let mut frames = std::pin::pin!(frames);
        let mut analyzed = 0;
        while let Some(frame) = frames.next().await {
            let frame = frame?;
            let pts = frame.pts();
            match self.analyze(frame) {
                Ok(analysis) => {
                    analyzed += 1;
                    for hit in analysis.scores.above(self.config.score_threshold) {
                        log::info!("{:?}: output {} = {:.3}", pts, hit.index, hit.probability);
                    }
                    on_result(analysis);
                }
                Err(e) => log::warn!("skipping frame at {:?}: {}", pts, e),
            }
        }
        Ok(analyzed)
    }
}
