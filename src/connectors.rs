use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::UdpSocket;
use tracing::info;

use crate::TextDecoder;

/// Port the device's console link sends to.
pub const DEFAULT_CONSOLE_PORT: u16 = 4210;
const MAX_DATAGRAM: usize = 2048;

/// Chunk stream produced by an opened connector.
pub type ChunkStream = BoxStream<'static, std::io::Result<String>>;

/// Opens a transport and yields its input as text chunks.
#[async_trait]
pub trait DataConnector: Send + Sync {
    async fn open(&self) -> Result<ChunkStream, ConnectorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Reads from a device node or file, e.g. `/dev/ttyUSB0`.
///
/// Line settings such as the baud rate are whatever the device node is
/// currently configured with.
#[derive(Clone, Debug)]
pub struct DeviceConnector {
    path: PathBuf,
    read_size: usize,
}

impl DeviceConnector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_size: crate::DEFAULT_READ_SIZE,
        }
    }

    pub fn with_read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size;
        self
    }
}

#[async_trait]
impl DataConnector for DeviceConnector {
    async fn open(&self) -> Result<ChunkStream, ConnectorError> {
        let file = tokio::fs::File::open(&self.path).await?;
        info!(path = %self.path.display(), "device opened");
        Ok(TextDecoder::with_read_size(file, self.read_size).boxed())
    }
}

#[derive(Clone, Debug, Default)]
pub struct StdinConnector;

#[async_trait]
impl DataConnector for StdinConnector {
    async fn open(&self) -> Result<ChunkStream, ConnectorError> {
        Ok(TextDecoder::new(tokio::io::stdin()).boxed())
    }
}

/// Listens for the device's UDP console packets; every datagram is one chunk.
///
/// The stream never ends on its own.
#[derive(Clone, Debug)]
pub struct UdpConnector {
    bind: SocketAddr,
}

impl UdpConnector {
    pub fn new(bind: SocketAddr) -> Self {
        Self { bind }
    }

    pub fn parse(bind: &str) -> Result<Self, ConnectorError> {
        let bind = bind
            .parse()
            .map_err(|e: std::net::AddrParseError| ConnectorError::Config(e.to_string()))?;
        Ok(Self::new(bind))
    }
}

impl Default for UdpConnector {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], DEFAULT_CONSOLE_PORT)))
    }
}

#[async_trait]
impl DataConnector for UdpConnector {
    async fn open(&self) -> Result<ChunkStream, ConnectorError> {
        let socket = UdpSocket::bind(self.bind).await?;
        info!(addr = %socket.local_addr()?, "listening for console datagrams");
        Ok(datagrams(socket).boxed())
    }
}

/// Yields each datagram received on `socket` as one chunk.
pub fn datagrams(socket: UdpSocket) -> impl futures::Stream<Item = std::io::Result<String>> + Send {
    stream::unfold(socket, |socket| async move {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let item = socket
            .recv(&mut buf)
            .await
            .map(|n| String::from_utf8_lossy(&buf[..n]).into_owned());
        Some((item, socket))
    })
}

/// Opens `connector`, retrying with backoff while the transport is missing.
#[cfg(feature = "circuit-breaker")]
pub async fn connect_with_retry<C: DataConnector + ?Sized>(
    connector: &C,
) -> Result<ChunkStream, ConnectorError> {
    crate::circuit_breaker::with_retry(|| connector.open()).await
}

impl From<ConnectorError> for std::io::Error {
    fn from(err: ConnectorError) -> Self {
        use ConnectorError::*;
        match err {
            Io(e) => e,
            Config(msg) => std::io::Error::new(std::io::ErrorKind::InvalidInput, msg),
        }
    }
}
