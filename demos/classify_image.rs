//! Classify a single image file
//!
//! Loads an image, scales it to the model input, encodes it, runs the ONNX
//! model and prints every output whose sigmoid probability clears the
//! threshold.
//!
//! Usage: cargo run --bin classify_image -- --model models/model.onnx --image cat.jpg

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tensorcam_classify::{Classifier, Scores};
use tensorcam_frame::Bitmap;
use tensorcam_model::{ModelConfig, OnnxModel};
use tensorcam_preprocess::{Preprocessor, Traversal};

#[derive(Parser)]
struct CliArgs {
    /// Image to classify (png / jpeg)
    #[arg(long)]
    image: PathBuf,

    /// ONNX model; overrides the config file
    #[arg(long)]
    model: Option<PathBuf>,

    /// JSON model config
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Write pixels row by row instead of column by column
    #[arg(long)]
    row_major: bool,

    #[arg(long)]
    threshold: Option<f32>,
}

fn load_config(args: &CliArgs) -> Result<ModelConfig> {
    let mut config = match &args.config {
        Some(path) => ModelConfig::load(path).with_context(|| format!("reading {}", path.display()))?,
        None => ModelConfig::default(),
    };
    if let Some(model) = &args.model {
        config.model_path = model.clone();
    }
    if let Some(w) = args.width {
        config.input_width = w;
    }
    if let Some(h) = args.height {
        config.input_height = h;
    }
    if args.row_major {
        config.traversal = Traversal::RowMajor;
    }
    if let Some(t) = args.threshold {
        config.score_threshold = t;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();
    let config = load_config(&args)?;

    // 1) decode + wrap as an ARGB bitmap
    let img = image::open(&args.image)
        .with_context(|| format!("failed to open {}", args.image.display()))?
        .to_rgba8();
    let bitmap = Bitmap::from_rgba_image(&img);
    log::info!("image {}x{}", bitmap.width(), bitmap.height());

    // 2) scale + encode to the model input
    let preprocessor =
        Preprocessor::new(config.input_width, config.input_height).with_traversal(config.traversal);
    let tensor = preprocessor.run(&bitmap)?;
    log::info!("tensor {} bytes, shape {:?}", tensor.as_bytes().len(), config.input_shape());

    // 3) inference
    let mut model = OnnxModel::from_config(&config)
        .with_context(|| format!("failed to load {}", config.model_path.display()))?;
    let scores = Scores::from_raw(model.classify(&tensor)?);

    let hits = scores.above(config.score_threshold);
    println!("{} outputs, {} at or above {:.2}", scores.len(), hits.len(), config.score_threshold);
    for hit in hits {
        println!("  output {:>4}: {:.4}", hit.index, hit.probability);
    }
    Ok(())
}
