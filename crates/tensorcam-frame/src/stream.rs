// tensorcam-frame/src/stream.rs
use crate::{FrameSource, Result, VideoFrame};
use futures_core::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

// back‑pressure: source → channel → single analyzer
pub const DEPTH: usize = 4;

/// Run `source` on a producer thread and deliver its frames in order.
///
/// The channel holds at most [`DEPTH`] frames; a slow consumer blocks the
/// producer. The stream ends when the source is exhausted, after the first
/// error, or once the consumer is dropped.
pub fn frame_stream<S: FrameSource>(mut source: S) -> impl Stream<Item = Result<VideoFrame>> {
    let (tx, rx) = mpsc::channel(DEPTH);

    std::thread::spawn(move || {
        loop {
            match source.next_frame_blocking() {
                Ok(Some(f)) => {
                    if tx.blocking_send(Ok(f)).is_err() {
                        log::debug!("frame consumer dropped, stopping source");
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let _ = tx.blocking_send(Err(e));
                    break;
                }
            }
        }
    });

    ReceiverStream::new(rx)
}
