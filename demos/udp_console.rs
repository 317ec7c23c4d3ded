use serial_telemetry::{
    DataConnector, ExtractorConfig, FrameExtractor, FrameSink, ParameterMapper, UdpConnector,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Listen where the device sends its console packets.
    let connector = UdpConnector::default();
    let source = connector.open().await?;
    println!("Listening for telemetry on 0.0.0.0:4210");

    let mut extractor = FrameExtractor::with_config(source, ExtractorConfig::default());
    let mut mapper = ParameterMapper::default();

    while let Some(frame) = extractor.next_frame().await? {
        mapper.on_frame(&frame);
        println!("{} -> {}", frame, mapper.params().background);
    }
    Ok(())
}
