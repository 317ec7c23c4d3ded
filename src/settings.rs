use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::{
    ExtractorConfig, FrameGate, Framing, ParameterMapper, Target, DEFAULT_MAX_FRAME_LEN,
    DEFAULT_PAYLOAD_KEY,
};

/// Where chunks come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Device { path: PathBuf },
    #[default]
    Stdin,
    Udp { bind: String },
}

/// File form of [`ExtractorConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    pub max_frame_len: usize,
    pub gate: FrameGate,
    pub framing: Framing,
    /// Empty string means the whole object is the frame.
    pub payload_key: String,
    pub read_timeout_ms: Option<u64>,
    pub batch_size: usize,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            gate: FrameGate::default(),
            framing: Framing::default(),
            payload_key: DEFAULT_PAYLOAD_KEY.to_string(),
            read_timeout_ms: None,
            batch_size: 10,
        }
    }
}

impl From<ExtractorSettings> for ExtractorConfig {
    fn from(settings: ExtractorSettings) -> Self {
        Self {
            max_frame_len: settings.max_frame_len,
            gate: settings.gate,
            framing: settings.framing,
            payload_key: Some(settings.payload_key).filter(|key| !key.is_empty()),
            read_timeout: settings.read_timeout_ms.map(Duration::from_millis),
            batch_size: settings.batch_size.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MappingConfig {
    pub key: String,
    pub target: Target,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    pub source: SourceConfig,
    pub extractor: ExtractorSettings,
    /// Empty means the default `potentiometer_1` to background binding.
    pub mappings: Vec<MappingConfig>,
}

impl SessionConfig {
    pub fn extractor_config(&self) -> ExtractorConfig {
        self.extractor.clone().into()
    }

    pub fn mapper(&self) -> ParameterMapper {
        if self.mappings.is_empty() {
            return ParameterMapper::default();
        }
        let mut mapper = ParameterMapper::new();
        for mapping in &self.mappings {
            mapper.bind(mapping.key.clone(), mapping.target);
        }
        mapper
    }
}

#[cfg(feature = "configs")]
pub mod configuration {
    use config::Config;

    use super::SessionConfig;

    /// Loads a session config from `path`, then applies `TELEMETRY__*`
    /// environment overrides (e.g. `TELEMETRY__EXTRACTOR__MAX_FRAME_LEN`).
    pub fn load_config(path: &str) -> Result<SessionConfig, config::ConfigError> {
        let settings = Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("TELEMETRY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
