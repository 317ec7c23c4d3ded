use simd_json::OwnedValue;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::timeout;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, instrument, trace};

use crate::{find_balanced, find_resync, metrics, parse_json};

/// One parsed telemetry message, usually the `"data"` object of the envelope.
pub type Frame = OwnedValue;

pub const DEFAULT_MAX_FRAME_LEN: usize = 1000;
pub const DEFAULT_PAYLOAD_KEY: &str = "data";

#[derive(Debug, thiserror::Error)]
pub enum ExtractorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Timeout while waiting for data")]
    Timeout,
}

/// Decides which chunks open a new frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameGate {
    /// A frame starts only on a chunk whose first character is `{`. Other
    /// chunks are kept only if they are complete JSON objects on their own;
    /// bare values such as `42` are dropped.
    #[default]
    ObjectStart,
    /// Leading whitespace is ignored, `[` also opens a frame and complete
    /// non-object values are produced as they are.
    AnyValue,
}

/// How the accumulated text is cut into frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// The whole accumulator must parse as one JSON document.
    #[default]
    WholeBuffer,
    /// Frames are cut at balanced braces, so several frames may come out of
    /// one chunk and text between frames is skipped.
    BraceBalanced,
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Characters an unfinished frame may reach before it is abandoned.
    pub max_frame_len: usize,
    pub gate: FrameGate,
    pub framing: Framing,
    /// Key whose value is produced as the frame; `None` produces the whole
    /// object.
    pub payload_key: Option<String>,
    pub read_timeout: Option<Duration>,
    pub batch_size: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            gate: FrameGate::default(),
            framing: Framing::default(),
            payload_key: Some(DEFAULT_PAYLOAD_KEY.to_string()),
            read_timeout: None,
            batch_size: 10,
        }
    }
}

/// Counters kept over the lifetime of one extractor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractorStats {
    pub chunks_read: u64,
    pub frames: u64,
    /// Unfinished frames dropped at the length cap.
    pub abandoned: u64,
    /// Chunks that neither opened a frame nor parsed on their own.
    pub dropped_chunks: u64,
    /// Balanced candidates that failed to parse, and unterminated ones
    /// skipped to reach a complete frame (brace-balanced framing).
    pub malformed: u64,
    /// Unfinished frames discarded because the source closed.
    pub discarded_on_close: u64,
}

/// Extracts JSON frames from a source of text chunks.
///
/// The source is any stream of `io::Result<String>`; closing it ends the
/// frame sequence.
pub struct FrameExtractor<S> {
    source: S,
    accumulator: String,
    ready: VecDeque<Frame>,
    config: ExtractorConfig,
    stats: ExtractorStats,
}

impl<S> FrameExtractor<S>
where
    S: Stream<Item = std::io::Result<String>> + Unpin,
{
    pub fn new(source: S) -> Self {
        Self::with_config(source, ExtractorConfig::default())
    }

    /// A `batch_size` of zero is treated as one.
    pub fn with_config(source: S, config: ExtractorConfig) -> Self {
        let config = ExtractorConfig {
            batch_size: config.batch_size.max(1),
            ..config
        };
        Self {
            source,
            accumulator: String::with_capacity(config.max_frame_len),
            ready: VecDeque::new(),
            config,
            stats: ExtractorStats::default(),
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn stats(&self) -> ExtractorStats {
        self.stats
    }

    /// Text of the frame currently being accumulated.
    pub fn pending(&self) -> &str {
        &self.accumulator
    }

    /// Lazy, non-restartable sequence of frames. Ends when the source closes.
    pub fn into_stream(self) -> impl Stream<Item = Result<Frame, ExtractorError>> {
        let mut extractor = self;
        async_stream::try_stream! {
            while let Some(frame) = extractor.next_frame().await? {
                yield frame;
            }
        }
    }

    /// Waits for the next frame. `Ok(None)` means the source has closed.
    #[instrument(skip(self))]
    pub async fn next_frame(&mut self) -> Result<Option<Frame>, ExtractorError> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Ok(Some(frame));
            }

            let Some(chunk) = self.read_chunk().await? else {
                if !self.accumulator.is_empty() {
                    debug!(
                        pending = self.accumulator.chars().count(),
                        "source closed mid-frame, discarding partial frame"
                    );
                    self.stats.discarded_on_close += 1;
                    self.accumulator.clear();
                    metrics::set_accumulator_len(0);
                }
                return Ok(None);
            };

            match self.config.framing {
                Framing::WholeBuffer => self.accept_whole(chunk),
                Framing::BraceBalanced => self.accept_balanced(&chunk),
            }
            metrics::set_accumulator_len(self.accumulator.chars().count());
        }
    }

    /// Collects up to `batch_size` frames, stopping early when the source
    /// closes. An empty batch means the source had already closed.
    pub async fn next_batch(&mut self) -> Result<Vec<Frame>, ExtractorError> {
        let mut batch = Vec::with_capacity(self.config.batch_size);
        while batch.len() < self.config.batch_size {
            match self.next_frame().await? {
                Some(frame) => batch.push(frame),
                None => break,
            }
        }
        Ok(batch)
    }

    async fn read_chunk(&mut self) -> Result<Option<String>, ExtractorError> {
        let next = self.source.next();
        let item = match self.config.read_timeout {
            Some(t) => timeout(t, next).await.map_err(|_| ExtractorError::Timeout)?,
            None => next.await,
        };
        match item {
            Some(chunk) => {
                let chunk = chunk?;
                self.stats.chunks_read += 1;
                trace!(len = chunk.len(), "chunk");
                Ok(Some(chunk))
            }
            None => Ok(None),
        }
    }

    fn accept_whole(&mut self, chunk: String) {
        if self.accumulator.is_empty() {
            if !self.opens_frame(&chunk) {
                self.accept_standalone(&chunk);
                return;
            }
            self.accumulator = chunk;
        } else {
            self.accumulator.push_str(&chunk);
        }

        if let Some(value) = parse_json(&self.accumulator) {
            self.accumulator.clear();
            self.emit(value);
        } else if self.accumulator.chars().count() >= self.config.max_frame_len {
            self.abandon();
        }
    }

    fn accept_balanced(&mut self, chunk: &str) {
        self.accumulator.push_str(chunk);
        let allow_arrays = self.config.gate == FrameGate::AnyValue;
        loop {
            match find_balanced(&self.accumulator, allow_arrays) {
                Some((start, end)) => {
                    let candidate = self.accumulator[start..end].to_string();
                    self.accumulator.drain(..end);
                    match parse_json(&candidate) {
                        Some(value) => self.emit(value),
                        None => {
                            debug!(candidate = %truncate(&candidate), "skipping malformed frame");
                            self.stats.malformed += 1;
                        }
                    }
                }
                None => {
                    self.skip_to_opening(allow_arrays);
                    if let Some(offset) = find_resync(&self.accumulator, allow_arrays) {
                        debug!(
                            skipped = %truncate(&self.accumulator[..offset]),
                            "skipping unterminated frame before a complete one"
                        );
                        self.accumulator.drain(..offset);
                        self.stats.malformed += 1;
                        continue;
                    }
                    if self.accumulator.chars().count() >= self.config.max_frame_len {
                        self.abandon();
                    }
                    return;
                }
            }
        }
    }

    /// Drops text that precedes the next opening bracket.
    fn skip_to_opening(&mut self, allow_arrays: bool) {
        match self
            .accumulator
            .find(|c: char| c == '{' || (allow_arrays && c == '['))
        {
            Some(0) => {}
            Some(start) => {
                self.accumulator.drain(..start);
            }
            None => self.accumulator.clear(),
        }
    }

    fn opens_frame(&self, chunk: &str) -> bool {
        match self.config.gate {
            FrameGate::ObjectStart => chunk.starts_with('{'),
            FrameGate::AnyValue => chunk.trim_start().starts_with(['{', '[']),
        }
    }

    fn accept_standalone(&mut self, chunk: &str) {
        match parse_json(chunk) {
            Some(value @ OwnedValue::Object(_)) => self.emit(value),
            Some(value) if self.config.gate == FrameGate::AnyValue => self.emit(value),
            _ => {
                trace!(chunk = %truncate(chunk), "dropping chunk outside a frame");
                self.stats.dropped_chunks += 1;
                metrics::record_dropped_chunk();
            }
        }
    }

    fn abandon(&mut self) {
        debug!(
            len = self.accumulator.chars().count(),
            max = self.config.max_frame_len,
            "abandoning frame that did not complete within the length cap"
        );
        self.accumulator.clear();
        self.stats.abandoned += 1;
        metrics::record_abandoned();
    }

    fn emit(&mut self, value: OwnedValue) {
        let frame = self.payload(value);
        self.stats.frames += 1;
        metrics::record_frame();
        self.ready.push_back(frame);
    }

    fn payload(&self, value: OwnedValue) -> Frame {
        match (value, &self.config.payload_key) {
            (OwnedValue::Object(mut object), Some(key)) => object
                .remove(key.as_str())
                .unwrap_or_else(|| OwnedValue::Object(Box::default())),
            (value, _) => value,
        }
    }
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(50) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
