use tokio::sync::mpsc;
use tokio_stream::Stream;
use tracing::{info, warn};

use crate::{ExtractorConfig, ExtractorError, ExtractorStats, Frame, FrameExtractor};

/// Consumer of extracted frames.
///
/// Called once per frame from the read loop, so implementations must not
/// block.
pub trait FrameSink {
    fn on_frame(&mut self, frame: &Frame);
}

impl<F> FrameSink for F
where
    F: FnMut(&Frame),
{
    fn on_frame(&mut self, frame: &Frame) {
        self(frame)
    }
}

/// Forwards frames to a channel, dropping them while the receiver lags.
pub struct ChannelSink {
    tx: mpsc::Sender<Frame>,
    dropped: u64,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Frame>) -> Self {
        Self { tx, dropped: 0 }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl FrameSink for ChannelSink {
    fn on_frame(&mut self, frame: &Frame) {
        match self.tx.try_send(frame.clone()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped += 1;
                warn!(dropped = self.dropped, "frame receiver is lagging, dropping frame");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.dropped += 1;
            }
        }
    }
}

/// One connection's worth of state: the extractor reading from the device
/// and the consumer of its frames.
///
/// Built when the stream is opened; `run` consumes it, so everything is torn
/// down once the stream closes.
pub struct Session<S, K> {
    extractor: FrameExtractor<S>,
    sink: K,
}

impl<S, K> Session<S, K>
where
    S: Stream<Item = std::io::Result<String>> + Unpin,
    K: FrameSink,
{
    pub fn new(source: S, config: ExtractorConfig, sink: K) -> Self {
        Self {
            extractor: FrameExtractor::with_config(source, config),
            sink,
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Feeds frames to the sink until the source closes.
    pub async fn run(self) -> Result<ExtractorStats, ExtractorError> {
        self.run_with_sink().await.map(|(stats, _)| stats)
    }

    /// Like [`Session::run`], but hands the sink back for inspection.
    pub async fn run_with_sink(mut self) -> Result<(ExtractorStats, K), ExtractorError> {
        info!(max_frame_len = self.extractor.config().max_frame_len, "session started");
        while let Some(frame) = self.extractor.next_frame().await? {
            self.sink.on_frame(&frame);
        }
        let stats = self.extractor.stats();
        info!(
            frames = stats.frames,
            abandoned = stats.abandoned,
            dropped_chunks = stats.dropped_chunks,
            "session closed"
        );
        Ok((stats, self.sink))
    }
}
