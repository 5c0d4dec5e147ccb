//! tract-backed ONNX runtime.

use crate::{ModelConfig, ModelError, Result};
use std::path::Path;
use tract_onnx::prelude::*;

/// Wraps a tract runnable ONNX model with its input pinned to `f32 [1,3,W,H]`.
pub struct OnnxModel {
    model: RunnableModel<TypedFact, Box<dyn TypedOp>, TypedModel>,
    input_shape: [usize; 4],
}

impl OnnxModel {
    /// Load, pin the input shape, optimize, and make runnable.
    pub fn load(model_path: &Path, width: u32, height: u32) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_path(model_path)?
            .with_input_fact(0, f32::fact([1, 3, width as i32, height as i32]).into())?
            .into_optimized()?
            .into_runnable()?;

        log::info!(
            "loaded {} with input [1, 3, {}, {}]",
            model_path.display(),
            width,
            height
        );
        Ok(Self {
            model,
            input_shape: [1, 3, width as usize, height as usize],
        })
    }

    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        Self::load(&config.model_path, config.input_width, config.input_height)
    }

    pub fn input_shape(&self) -> [usize; 4] {
        self.input_shape
    }

    /// Run on a flat float tensor and return the first output, flattened.
    ///
    /// The floats are taken as‑is in the pinned shape; no reordering.
    pub fn run(&self, input: &[f32]) -> Result<Vec<f32>> {
        let expected: usize = self.input_shape.iter().product();
        if input.len() != expected {
            return Err(ModelError::InputSize { expected, actual: input.len() });
        }

        let [n, c, w, h] = self.input_shape;
        let arr = tract_ndarray::Array4::from_shape_vec((n, c, w, h), input.to_vec())
            .map_err(|e| ModelError::Tract(e.into()))?;
        let tensor: Tensor = arr.into_tensor();

        let outputs = self.model.run(tvec![tensor.into()])?;
        let first = outputs.first().ok_or(ModelError::NoOutput)?;
        let view = first.to_array_view::<f32>()?;
        Ok(view.iter().copied().collect())
    }
}

/// Check that the configured model loads with the configured input size.
pub fn validate_onnx_model(config: &ModelConfig) -> Result<()> {
    config.validate()?;
    let model = OnnxModel::from_config(config)?;
    drop(model);
    Ok(())
}
