use clap::Parser;
use serial_telemetry::{
    DataConnector, DeviceConnector, ExtractorConfig, FrameGate, Framing, ParameterMapper, Session,
    SessionConfig, SourceConfig, StdinConnector, Target, UdpConnector,
};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser, Debug)]
#[command(
    name = "serial-telemetry",
    about = "Print JSON telemetry frames from a serial device and the colors they map to"
)]
struct Cli {
    /// Device node or file to read, e.g. /dev/ttyUSB0
    #[arg(long, conflicts_with = "udp")]
    device: Option<PathBuf>,

    /// Address to receive the device's UDP console packets on, e.g. 0.0.0.0:4210
    #[arg(long)]
    udp: Option<String>,

    /// Session config file; command-line flags override it
    #[arg(long, env = "TELEMETRY_CONFIG")]
    config: Option<String>,

    /// Characters an unfinished frame may reach before it is dropped
    #[arg(long)]
    max_frame_len: Option<usize>,

    /// Also accept frames that start with whitespace or `[`, and bare values
    #[arg(long)]
    any_value: bool,

    /// Cut frames at balanced braces instead of parsing the whole buffer
    #[arg(long)]
    brace_balanced: bool,

    /// Envelope key holding the payload; empty for the whole message
    #[arg(long)]
    payload_key: Option<String>,

    /// Sensor key that drives the background color
    #[arg(long)]
    key: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[cfg(feature = "configs")]
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[cfg(not(feature = "configs"))]
    #[error("config files need the `configs` feature")]
    ConfigUnsupported,
    #[error(transparent)]
    Connector(#[from] serial_telemetry::ConnectorError),
    #[error(transparent)]
    Extractor(#[from] serial_telemetry::ExtractorError),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        error!(error = %e, "serial-telemetry failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut session_config = load_session_config(cli.config.as_deref())?;
    let config = extractor_config(&session_config, &cli);
    let mut mapper = match &cli.key {
        Some(key) => {
            let mut mapper = ParameterMapper::new();
            mapper.bind(key.clone(), Target::Background);
            mapper
        }
        None => session_config.mapper(),
    };

    if let Some(path) = cli.device {
        session_config.source = SourceConfig::Device { path };
    } else if let Some(bind) = cli.udp {
        session_config.source = SourceConfig::Udp { bind };
    }

    let connector: Box<dyn DataConnector> = match &session_config.source {
        SourceConfig::Device { path } => Box::new(DeviceConnector::new(path.clone())),
        SourceConfig::Stdin => Box::new(StdinConnector),
        SourceConfig::Udp { bind } => Box::new(UdpConnector::parse(bind)?),
    };
    let source = open(connector.as_ref()).await?;

    let sink = move |frame: &serial_telemetry::Frame| {
        mapper.apply(frame);
        println!("{frame} -> {}", mapper.params().background.css());
    };
    let stats = Session::new(source, config, sink).run().await?;
    eprintln!(
        "{} chunks, {} frames, {} abandoned, {} dropped chunks, {} malformed",
        stats.chunks_read, stats.frames, stats.abandoned, stats.dropped_chunks, stats.malformed
    );
    Ok(())
}

#[cfg(feature = "circuit-breaker")]
async fn open(
    connector: &dyn DataConnector,
) -> Result<serial_telemetry::ChunkStream, serial_telemetry::ConnectorError> {
    serial_telemetry::connect_with_retry(connector).await
}

#[cfg(not(feature = "circuit-breaker"))]
async fn open(
    connector: &dyn DataConnector,
) -> Result<serial_telemetry::ChunkStream, serial_telemetry::ConnectorError> {
    connector.open().await
}

#[cfg(feature = "configs")]
fn load_session_config(path: Option<&str>) -> Result<SessionConfig, CliError> {
    match path {
        Some(path) => Ok(serial_telemetry::configuration::load_config(path)?),
        None => Ok(SessionConfig::default()),
    }
}

#[cfg(not(feature = "configs"))]
fn load_session_config(path: Option<&str>) -> Result<SessionConfig, CliError> {
    match path {
        Some(_) => Err(CliError::ConfigUnsupported),
        None => Ok(SessionConfig::default()),
    }
}

fn extractor_config(session: &SessionConfig, cli: &Cli) -> ExtractorConfig {
    let mut config = session.extractor_config();
    if let Some(max) = cli.max_frame_len {
        config.max_frame_len = max;
    }
    if cli.any_value {
        config.gate = FrameGate::AnyValue;
    }
    if cli.brace_balanced {
        config.framing = Framing::BraceBalanced;
    }
    if let Some(key) = &cli.payload_key {
        config.payload_key = Some(key.clone()).filter(|key| !key.is_empty());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file_settings() {
        let mut session = SessionConfig::default();
        session.extractor.max_frame_len = 2000;
        session.extractor.payload_key = "payload".into();

        let cli = Cli::parse_from(["serial-telemetry", "--brace-balanced", "--payload-key", ""]);
        let config = extractor_config(&session, &cli);

        assert_eq!(config.max_frame_len, 2000);
        assert_eq!(config.framing, Framing::BraceBalanced);
        assert_eq!(config.gate, FrameGate::ObjectStart);
        assert_eq!(config.payload_key, None);
    }

    #[test]
    fn test_flags_on_default_settings() {
        let cli = Cli::parse_from(["serial-telemetry", "--max-frame-len", "500", "--any-value"]);
        let config = extractor_config(&SessionConfig::default(), &cli);

        assert_eq!(config.max_frame_len, 500);
        assert_eq!(config.gate, FrameGate::AnyValue);
        assert_eq!(config.framing, Framing::WholeBuffer);
        assert_eq!(config.payload_key.as_deref(), Some("data"));
    }

    #[test]
    fn test_device_and_udp_conflict() {
        let result = Cli::try_parse_from([
            "serial-telemetry",
            "--device",
            "/dev/ttyUSB0",
            "--udp",
            "0.0.0.0:4210",
        ]);
        assert!(result.is_err());
    }
}
