// tensorcam-classify/src/lib.rs
// ============================================================
// tensorcam-classify  –  per-frame classification stage
// Runs an opaque score model on the encoded tensor and turns
// raw outputs into sigmoid probabilities (+ optional barcodes).
// ------------------------------------------------------------
// Pipeline: VideoFrame → Bitmap → scale → TensorBuffer → scores
// ------------------------------------------------------------
// Public API
//   * Classifier::classify(tensor)  – raw scores, any backend
//   * sigmoid_transform(scores)     – logged probabilities
//   * FrameAnalyzer::analyze(frame) – the whole per-frame path
// ============================================================

//! tensorcam – classification layer
//!
//! The model runtime is a [`Classifier`]: anything that maps a
//! [`TensorBuffer`] to a vector of raw scores. [`OnnxModel`] implements it
//! via tract, and [`from_fn`] wraps a closure so tests and demos can run
//! the pipeline without a model file. Barcode recognition is likewise an
//! injected [`BarcodeScanner`].

use tensorcam_frame::FrameError;
use tensorcam_model::{ModelError, OnnxModel};
use tensorcam_preprocess::TensorBuffer;
use thiserror::Error;

pub mod analyzer;
pub mod barcode;
pub mod scores;

pub use analyzer::{Analysis, FrameAnalyzer};
pub use barcode::{Barcode, BarcodeFormat, BarcodeOptions, BarcodeOptionsBuilder, BarcodeScanner};
pub use scores::{sigmoid, sigmoid_transform, ScoredClass, Scores};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
    #[error("Preprocess error: {0}")]
    Preprocess(#[from] anyhow::Error),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Barcode scan failed: {0}")]
    Barcode(String),
}

pub type Result<T> = std::result::Result<T, ClassifyError>;

/// Trait for score models.
pub trait Classifier {
    fn classify(&mut self, input: &TensorBuffer) -> Result<Vec<f32>>;
}

impl Classifier for OnnxModel {
    fn classify(&mut self, input: &TensorBuffer) -> Result<Vec<f32>> {
        Ok(self.run(&input.to_f32_vec())?)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&mut self, input: &TensorBuffer) -> Result<Vec<f32>> {
        (**self).classify(input)
    }
}

/// Closure-backed classifier, see [`from_fn`].
pub struct FnClassifier<F>(F);

impl<F> Classifier for FnClassifier<F>
where
    F: FnMut(&TensorBuffer) -> Result<Vec<f32>>,
{
    fn classify(&mut self, input: &TensorBuffer) -> Result<Vec<f32>> {
        (self.0)(input)
    }
}

/// Use a closure as the model.
pub fn from_fn<F>(f: F) -> FnClassifier<F>
where
    F: FnMut(&TensorBuffer) -> Result<Vec<f32>>,
{
    FnClassifier(f)
}
