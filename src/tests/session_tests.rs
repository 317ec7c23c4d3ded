#[cfg(test)]
mod tests {
    use simd_json::prelude::*;
    use tokio::sync::mpsc;
    use tokio::time::{sleep, Duration};

    use super::super::chunks;
    use crate::{
        ChannelReader, ChannelSink, ExtractorConfig, Frame, ParameterMapper, Rgb, Session,
    };

    #[tokio::test]
    async fn test_session_feeds_closure_sink_until_close() {
        let mut seen = Vec::new();
        let session = Session::new(
            chunks(&[
                r#"{"data":{"potentiometer_1":1}}"#,
                "garbage",
                r#"{"data":{"potentiometer_1":2}}"#,
            ]),
            ExtractorConfig::default(),
            |frame: &Frame| seen.push(frame["potentiometer_1"].as_i64()),
        );

        let stats = session.run().await.unwrap();

        assert_eq!(stats.frames, 2);
        assert_eq!(stats.dropped_chunks, 1);
        assert_eq!(seen, vec![Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_session_with_parameter_mapper() {
        let (tx, rx) = mpsc::channel::<String>(8);
        let session = Session::new(
            ChannelReader::new(rx),
            ExtractorConfig::default(),
            ParameterMapper::default(),
        );

        tokio::spawn(async move {
            for part in [r#"{"data""#, r#":{"potentiometer_1":0}}"#, r#"{"data":{"potentio"#] {
                tx.send(part.to_string()).await.unwrap();
                sleep(Duration::from_millis(10)).await;
            }
            tx.send(r#"meter_1":-1.5707963267948966}}"#.to_string()).await.unwrap();
        });

        let (stats, mapper) = session.run_with_sink().await.unwrap();

        assert_eq!(stats.frames, 2);
        assert_eq!(mapper.params().background, Rgb::new(0, 60, 50));
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_frames() {
        let (tx, mut rx) = mpsc::channel(4);
        let session = Session::new(
            chunks(&[r#"{"data":{"x":1}}"#, r#"{"data":{"x":2}}"#]),
            ExtractorConfig::default(),
            ChannelSink::new(tx),
        );

        let (_, sink) = session.run_with_sink().await.unwrap();
        assert_eq!(sink.dropped(), 0);
        drop(sink);

        let mut received = Vec::new();
        while let Some(frame) = rx.recv().await {
            received.push(frame["x"].as_i64());
        }
        assert_eq!(received, vec![Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_channel_sink_drops_when_receiver_lags() {
        let (tx, mut rx) = mpsc::channel(1);
        let session = Session::new(
            chunks(&[r#"{"data":1}"#, r#"{"data":2}"#, r#"{"data":3}"#]),
            ExtractorConfig::default(),
            ChannelSink::new(tx),
        );

        let (stats, sink) = session.run_with_sink().await.unwrap();

        assert_eq!(stats.frames, 3);
        assert_eq!(sink.dropped(), 2);
        assert_eq!(rx.recv().await.and_then(|f| f.as_i64()), Some(1));
    }
}
