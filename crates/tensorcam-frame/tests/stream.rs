use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tensorcam_frame::{frame_stream, FrameError, StillImageSource, VideoFrame, DEPTH};
use tokio_stream::StreamExt;

#[tokio::test]
async fn still_image_stream_delivers_every_frame_in_order() -> anyhow::Result<()> {
    let img = image::RgbaImage::from_pixel(8, 6, image::Rgba([200, 100, 50, 255]));
    let mut stream = Box::pin(frame_stream(StillImageSource::new(img, 10, 30)));

    let mut last = None;
    let mut n = 0;
    while let Some(frame) = stream.next().await {
        let frame = frame?;
        assert_eq!((frame.width(), frame.height()), (8, 6));
        if let Some(prev) = last {
            assert!(frame.pts() > prev);
        }
        last = Some(frame.pts());
        n += 1;
    }
    assert_eq!(n, 10);
    Ok(())
}

#[tokio::test]
async fn source_error_ends_the_stream() {
    let mut calls = 0;
    let source = move || {
        calls += 1;
        if calls <= 2 {
            Some(VideoFrame::packed(vec![0u8; 4], 1, 1, Duration::from_millis(calls)).map_err(|e| e.to_string()))
        } else {
            Some(Err("unplugged".to_string()))
        }
    };
    let items: Vec<_> = frame_stream(source).collect().await;

    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok() && items[1].is_ok());
    assert!(matches!(&items[2], Err(FrameError::Source(m)) if m == "unplugged"));
}

#[tokio::test]
async fn dropping_the_consumer_stops_the_producer() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    // endless source
    let source = move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Some(VideoFrame::packed(vec![0u8; 4], 1, 1, Duration::ZERO).map_err(|e| e.to_string()))
    };
    let mut stream = Box::pin(frame_stream(source));
    assert!(stream.next().await.is_some());
    drop(stream);

    // let the producer notice the closed channel
    tokio::time::sleep(Duration::from_millis(50)).await;
    let settled = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), settled);
    // at most the channel depth plus the frame in flight and the one taken
    assert!(settled <= DEPTH + 2);
}

#[tokio::test]
async fn png_file_streams_through_still_image_source() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("still.png");
    image::RgbaImage::from_pixel(5, 3, image::Rgba([10, 20, 30, 255])).save(&path)?;

    let source = StillImageSource::open(&path, 2, 0)?;
    let frames: Vec<_> = frame_stream(source).collect().await;
    assert_eq!(frames.len(), 2);
    for frame in frames {
        let frame = frame?;
        assert_eq!((frame.width(), frame.height()), (5, 3));
        assert_eq!(&frame.data()[..4], &[10, 20, 30, 255]);
        assert_eq!(frame.pts(), Duration::ZERO);
    }
    Ok(())
}

#[test]
fn missing_image_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let res = StillImageSource::open(dir.path().join("gone.png"), 1, 30);
    assert!(matches!(res, Err(FrameError::Image(_))));
}
