mod session_tests;
mod settings_tests;

use crate::{ExtractorConfig, ExtractorStats, Frame, FrameExtractor};
use tokio_stream::Stream;

pub(crate) fn chunks(parts: &[&str]) -> impl Stream<Item = std::io::Result<String>> + Unpin {
    let owned: Vec<std::io::Result<String>> = parts.iter().map(|p| Ok(p.to_string())).collect();
    tokio_stream::iter(owned)
}

/// Runs an extractor over `parts` until the source closes.
pub(crate) async fn extract_all(parts: &[&str], config: ExtractorConfig) -> (Vec<Frame>, ExtractorStats) {
    let mut extractor = FrameExtractor::with_config(chunks(parts), config);
    let mut frames = Vec::new();
    while let Some(frame) = extractor.next_frame().await.unwrap() {
        frames.push(frame);
    }
    (frames, extractor.stats())
}
