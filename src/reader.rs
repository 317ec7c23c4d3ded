use std::io::Error as IoError;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;

/// Chunk source fed from an in-process channel.
///
/// Every `String` sent on the channel is delivered to the extractor as one
/// chunk, unchanged. Dropping every sender closes the source.
pub struct ChannelReader {
    rx: mpsc::Receiver<String>,
}

impl ChannelReader {
    pub fn new(rx: mpsc::Receiver<String>) -> Self {
        Self { rx }
    }
}

impl Stream for ChannelReader {
    type Item = Result<String, IoError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(chunk)) => Poll::Ready(Some(Ok(chunk))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
