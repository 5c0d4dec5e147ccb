//! Stream synthetic frames through the analyzer
//!
//! Generates moving gradient RGBA frames, pushes them through the
//! backpressured frame stream and a [`FrameAnalyzer`] whose "model" is the
//! mean brightness of each channel. No model file needed.
//!
//! Usage: RUST_LOG=info cargo run --bin synthetic_stream -- --frames 60

use anyhow::Result;
use clap::Parser;
use std::time::{Duration, Instant};
use tensorcam_classify::{from_fn, FrameAnalyzer};
use tensorcam_frame::{frame_stream, VideoFrame, BYTES_PER_PIXEL};
use tensorcam_model::ModelConfig;
use tensorcam_preprocess::TensorBuffer;

#[derive(Parser)]
struct CliArgs {
    #[arg(long, default_value = "30")]
    frames: u64,

    /// Camera frame width
    #[arg(long, default_value = "1280")]
    width: u32,

    #[arg(long, default_value = "960")]
    height: u32,
}

fn gradient_frame(w: u32, h: u32, n: u64) -> tensorcam_frame::Result<VideoFrame> {
    let mut data = Vec::with_capacity(w as usize * h as usize * BYTES_PER_PIXEL);
    for y in 0..h {
        for x in 0..w {
            let r = ((x as u64 + n * 8) % 256) as u8;
            let g = ((y as u64 * 255) / h.max(1) as u64) as u8;
            data.extend_from_slice(&[r, g, (n % 256) as u8, 255]);
        }
    }
    VideoFrame::packed(data, w, h, Duration::from_millis(n * 33))
}

/// Per-channel mean, shifted so mid-grey sits at logit 0.
fn channel_means(t: &TensorBuffer) -> Vec<f32> {
    let v = t.to_f32_vec();
    let px = (v.len() / 3).max(1) as f32;
    (0..3)
        .map(|c| v.iter().skip(c).step_by(3).sum::<f32>() / px * 8.0 - 4.0)
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let (w, h, total) = (args.width, args.height, args.frames);
    let mut n = 0;
    let source = move || {
        if n >= total {
            return None;
        }
        n += 1;
        Some(gradient_frame(w, h, n).map_err(|e| e.to_string()))
    };

    let config = ModelConfig::default();
    println!(
        "streaming {} frames of {}x{} into a {}x{} model input",
        total, w, h, config.input_width, config.input_height
    );

    let mut analyzer = FrameAnalyzer::new(config, from_fn(|t: &TensorBuffer| Ok(channel_means(t))))?;
    let started = Instant::now();
    let analyzed = analyzer
        .analyze_stream(frame_stream(source), |a| {
            let p = &a.scores.probabilities;
            log::info!("{:>8?}  r={:.3} g={:.3} b={:.3}", a.pts, p[0], p[1], p[2]);
        })
        .await?;

    let secs = started.elapsed().as_secs_f64();
    println!(
        "analyzed {} frames in {:.2}s ({:.1} fps)",
        analyzed,
        secs,
        analyzed as f64 / secs.max(f64::EPSILON)
    );
    Ok(())
}
