use std::sync::{Arc, Mutex};
use std::time::Duration;
use tensorcam_classify::{
    from_fn, Analysis, Barcode, BarcodeFormat, BarcodeOptions, BarcodeScanner, ClassifyError,
    FrameAnalyzer,
};
use tensorcam_frame::{frame_stream, Bitmap, StillImageSource, VideoFrame};
use tensorcam_model::ModelConfig;
use tensorcam_preprocess::TensorBuffer;

/// Reports a QR code when the top-left pixel is opaque red, plus an EAN-13
/// that the default options never ask for.
struct RedCornerScanner;

impl BarcodeScanner for RedCornerScanner {
    fn scan(&mut self, bitmap: &Bitmap, _: &BarcodeOptions) -> tensorcam_classify::Result<Vec<Barcode>> {
        let mut found = vec![Barcode {
            format: BarcodeFormat::Ean13,
            display_value: "4006381333931".into(),
        }];
        if bitmap.pixel(0, 0) == 0xFFFF_0000 {
            found.push(Barcode {
                format: BarcodeFormat::QrCode,
                display_value: "tensorcam".into(),
            });
        }
        Ok(found)
    }
}

fn config() -> ModelConfig {
    ModelConfig {
        input_width: 32,
        input_height: 24,
        scan_barcodes: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn still_image_runs_through_analyzer() {
    let img = image::RgbaImage::from_pixel(64, 48, image::Rgba([255, 0, 0, 255]));
    let frames = frame_stream(StillImageSource::new(img, 5, 30));

    // mean of the first channel: 1.0 for a red image
    let model = from_fn(|t: &TensorBuffer| {
        let v = t.to_f32_vec();
        let red = v.iter().step_by(3).sum::<f32>() / (v.len() / 3) as f32;
        Ok(vec![red * 10.0, -10.0])
    });
    let mut analyzer = FrameAnalyzer::new(config(), model)
        .unwrap()
        .with_scanner(RedCornerScanner);

    let mut results: Vec<Analysis> = Vec::new();
    let n = analyzer
        .analyze_stream(frames, |a| results.push(a))
        .await
        .unwrap();

    assert_eq!(n, 5);
    assert_eq!(results.len(), 5);
    for a in &results {
        assert!(a.scores.probabilities[0] > 0.99);
        assert!(a.scores.probabilities[1] < 0.01);
        assert_eq!(a.scores.above(0.5).len(), 1);
        assert_eq!(
            a.barcodes,
            vec![Barcode { format: BarcodeFormat::QrCode, display_value: "tensorcam".into() }]
        );
    }
    assert!(results.windows(2).all(|w| w[0].pts < w[1].pts));
}

#[tokio::test]
async fn failed_frames_are_skipped_and_stream_errors_stop() {
    let mut produced = 0u64;
    let source = move || {
        produced += 1;
        match produced {
            1..=3 => Some(
                VideoFrame::packed(vec![0; 4 * 4 * 4], 4, 4, Duration::from_millis(produced))
                    .map_err(|e| e.to_string()),
            ),
            _ => Some(Err("camera closed".to_string())),
        }
    };

    let calls = Arc::new(Mutex::new(0));
    let seen = Arc::clone(&calls);
    let model = from_fn(move |_: &TensorBuffer| {
        let mut n = seen.lock().unwrap();
        *n += 1;
        if *n == 2 {
            return Err(ClassifyError::Inference("dropped".into()));
        }
        Ok(vec![0.0])
    });

    let mut analyzer = FrameAnalyzer::new(config(), model).unwrap();
    let mut analyzed = 0;
    let res = analyzer.analyze_stream(frame_stream(source), |_| analyzed += 1).await;

    assert!(matches!(res, Err(ClassifyError::Frame(_))));
    assert_eq!(analyzed, 2);
    assert_eq!(*calls.lock().unwrap(), 3);
}

#[test]
fn scanner_is_idle_unless_enabled() {
    let config = ModelConfig { scan_barcodes: false, ..config() };
    let mut analyzer = FrameAnalyzer::new(config, from_fn(|_: &TensorBuffer| Ok(vec![])))
        .unwrap()
        .with_scanner(RedCornerScanner);

    let frame = VideoFrame::packed([255, 0, 0, 255].repeat(4), 2, 2, Duration::ZERO).unwrap();
    let a = analyzer.analyze(frame).unwrap();
    assert!(a.barcodes.is_empty());
    assert!(a.scores.is_empty());
}
