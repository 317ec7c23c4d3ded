use serial_telemetry::{ExtractorConfig, FrameExtractor, Framing, TextDecoder};

#[tokio::main]
async fn main() {
    // Two back-to-back messages, read a few bytes at a time.
    let data = "{\"data\":{\"potentiometer_1\":0.4}}{\"data\":{\"potentiometer_1\":1.2}}".as_bytes();
    let config = ExtractorConfig {
        framing: Framing::BraceBalanced,
        ..Default::default()
    };
    let mut extractor = FrameExtractor::with_config(TextDecoder::with_read_size(data, 7), config);

    while let Ok(Some(frame)) = extractor.next_frame().await {
        println!("Frame: {}", frame);
    }
    println!("Stats: {:?}", extractor.stats());
}
