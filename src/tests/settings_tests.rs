#[cfg(test)]
mod tests {
    use simd_json::{json, OwnedValue};
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::{
        ExtractorConfig, ExtractorSettings, FrameGate, Framing, MappingConfig, Rgb, SessionConfig,
        SourceConfig, Target,
    };

    #[test]
    fn test_defaults_match_extractor_defaults() {
        let config: ExtractorConfig = ExtractorSettings::default().into();
        let expected = ExtractorConfig::default();

        assert_eq!(config.max_frame_len, expected.max_frame_len);
        assert_eq!(config.gate, expected.gate);
        assert_eq!(config.framing, expected.framing);
        assert_eq!(config.payload_key, expected.payload_key);
        assert_eq!(config.read_timeout, None);
        assert_eq!(SessionConfig::default().source, SourceConfig::Stdin);
    }

    #[test]
    fn test_zero_batch_size_is_raised_to_one() {
        let settings = ExtractorSettings {
            batch_size: 0,
            ..Default::default()
        };
        let config: ExtractorConfig = settings.into();
        assert_eq!(config.batch_size, 1);
    }

    #[test]
    fn test_deserialize_session_config() {
        let mut text = br#"{
            "source": {"kind": "device", "path": "/dev/ttyUSB0"},
            "extractor": {
                "max_frame_len": 4096,
                "gate": "any_value",
                "framing": "brace_balanced",
                "payload_key": "",
                "read_timeout_ms": 250
            },
            "mappings": [{"key": "knob", "target": "lfo_frequency"}]
        }"#
        .to_vec();
        let session: SessionConfig = simd_json::from_slice(&mut text).unwrap();

        assert_eq!(
            session.source,
            SourceConfig::Device {
                path: PathBuf::from("/dev/ttyUSB0")
            }
        );
        assert_eq!(
            session.mappings,
            vec![MappingConfig {
                key: "knob".into(),
                target: Target::LfoFrequency
            }]
        );

        let config = session.extractor_config();
        assert_eq!(config.max_frame_len, 4096);
        assert_eq!(config.gate, FrameGate::AnyValue);
        assert_eq!(config.framing, Framing::BraceBalanced);
        assert_eq!(config.payload_key, None);
        assert_eq!(config.read_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.batch_size, 10);
    }

    #[test]
    fn test_mapper_from_config() {
        let session = SessionConfig {
            mappings: vec![MappingConfig {
                key: "knob".into(),
                target: Target::ModulationIndex,
            }],
            ..Default::default()
        };
        let mut mapper = session.mapper();
        mapper.apply(&OwnedValue::from(json!({"knob": 12.0, "potentiometer_1": 1.0})));

        assert_eq!(mapper.params().synth.modulation_index, 12.0);
        assert_eq!(mapper.params().background, Rgb::default());

        let mut fallback = SessionConfig::default().mapper();
        fallback.apply(&OwnedValue::from(json!({"potentiometer_1": 0.5})));
        assert_eq!(fallback.params().background.red, 189);
    }

    #[cfg(feature = "configs")]
    #[test]
    fn test_load_config_file() {
        let path = std::env::temp_dir().join(format!("serial_telemetry_{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[source]
kind = "udp"
bind = "0.0.0.0:4210"

[extractor]
max_frame_len = 2000
framing = "brace_balanced"

[[mappings]]
key = "potentiometer_1"
target = "background"
"#,
        )
        .unwrap();

        let loaded = crate::configuration::load_config(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            loaded.source,
            SourceConfig::Udp {
                bind: "0.0.0.0:4210".into()
            }
        );
        assert_eq!(loaded.extractor.max_frame_len, 2000);
        assert_eq!(loaded.extractor.framing, Framing::BraceBalanced);
        assert_eq!(loaded.extractor.gate, FrameGate::ObjectStart);
        assert_eq!(loaded.mappings.len(), 1);
    }
}
