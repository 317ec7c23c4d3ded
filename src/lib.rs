//! # Serial Telemetry
//!
//! This library extracts JSON telemetry frames from a microcontroller's
//! serial (or UDP console) output and maps sensor readings onto visual and
//! audio parameters.
//!
//! Devices write messages of the form `{"data": {"potentiometer_1": 0.5}}`
//! back to back, with nothing but JSON itself marking where one ends. The
//! transport delivers them as text chunks cut at arbitrary points; the
//! [`FrameExtractor`] stitches chunks together until they parse, gives up on
//! a frame once it passes a length cap, and produces the `"data"` payload of
//! every message.
//!
//! ## Example
//!
//! ```no_run
//! use serial_telemetry::{ChannelReader, FrameExtractor, ParameterMapper, FrameSink};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a channel to simulate the serial port.
//!     let (tx, rx) = mpsc::channel::<String>(10);
//!     let mut extractor = FrameExtractor::new(ChannelReader::new(rx));
//!
//!     tokio::spawn(async move {
//!         tx.send(r#"{"data""#.to_string()).await.unwrap();
//!         tx.send(r#":{"potentiometer_1":0.5}}"#.to_string()).await.unwrap();
//!     });
//!
//!     let mut mapper = ParameterMapper::default();
//!     while let Some(frame) = extractor.next_frame().await? {
//!         mapper.on_frame(&frame);
//!         println!("background: {}", mapper.params().background);
//!     }
//!     Ok(())
//! }
//! ```

#[cfg(test)]
mod tests;

mod reader;
pub use reader::*;

mod decoder;
pub use decoder::*;

mod extractor;
pub use extractor::*;

mod extract_json;
pub use extract_json::*;

mod synth;
pub use synth::*;

mod mapping;
pub use mapping::*;

mod session;
pub use session::*;

mod settings;
pub use settings::*;

#[cfg(feature = "connectors")]
mod connectors;
#[cfg(feature = "connectors")]
pub use connectors::*;

mod metrics;
pub use metrics::*;

mod utils;
pub use utils::*;
