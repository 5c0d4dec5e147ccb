//! # tensorcam-model
//!
//! Everything about the model that is not the encoder: which file to load,
//! what input size it was exported for, how its outputs are thresholded, and
//! a thin tract wrapper that runs it.
//!
//! ## Features
//!
//! - [`ModelConfig`] loaded from / saved to JSON, with defaults for a
//!   640×480 input
//! - [`OnnxModel`] which pins the ONNX input to `f32 [1, 3, W, H]`
//! - [`validate_onnx_model`] to check a model file loads with a config

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tensorcam_preprocess::Traversal;
use thiserror::Error;

mod runtime;
pub use runtime::{validate_onnx_model, OnnxModel};

/// Default model input width (`model_w`).
pub const DEFAULT_INPUT_WIDTH: u32 = 640;
/// Default model input height (`model_h`).
pub const DEFAULT_INPUT_HEIGHT: u32 = 480;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Model load or inference error: {0}")]
    Tract(#[from] tract_onnx::prelude::TractError),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Input has {actual} floats, model expects {expected}")]
    InputSize { expected: usize, actual: usize },
    #[error("Model produced no outputs")]
    NoOutput,
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// Barcode symbologies the scanner can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeFormat {
    QrCode,
    Aztec,
    DataMatrix,
    Ean13,
    Code128,
}

/// Configuration for one deployed model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// ONNX model file
    pub model_path: PathBuf,
    /// Model input width; frames are scaled to this before encoding
    pub input_width: u32,
    /// Model input height
    pub input_height: u32,
    /// Pixel order used by the encoder
    pub traversal: Traversal,
    /// Probability at or above which a score is reported
    pub score_threshold: f32,
    /// Run the barcode scanner on each frame
    pub scan_barcodes: bool,
    pub barcode_formats: Vec<BarcodeFormat>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/model.onnx"),
            input_width: DEFAULT_INPUT_WIDTH,
            input_height: DEFAULT_INPUT_HEIGHT,
            traversal: Traversal::default(),
            score_threshold: 0.5,
            scan_barcodes: false,
            barcode_formats: vec![BarcodeFormat::QrCode, BarcodeFormat::Aztec],
        }
    }
}

impl ModelConfig {
    /// Read a JSON config. Missing fields fall back to the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        log::info!("loaded model config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `[1, 3, input_width, input_height]`
    pub fn input_shape(&self) -> [usize; 4] {
        [1, 3, self.input_width as usize, self.input_height as usize]
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_width == 0 || self.input_height == 0 {
            return Err(ModelError::InvalidConfig(format!(
                "input size {}x{} must be non-zero",
                self.input_width, self.input_height
            )));
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(ModelError::InvalidConfig(format!(
                "score_threshold {} is outside [0, 1]",
                self.score_threshold
            )));
        }
        Ok(())
    }
}
