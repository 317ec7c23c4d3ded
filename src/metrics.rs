#[cfg(feature = "metrics")]
mod registry {
    use lazy_static::lazy_static;
    use prometheus::{register_int_counter, register_int_gauge, Encoder, IntCounter, IntGauge, TextEncoder};

    lazy_static! {
        pub(super) static ref FRAMES: Option<IntCounter> = register_int_counter!(
            "telemetry_frames_total",
            "Total number of telemetry frames extracted"
        ).ok();
        pub(super) static ref ABANDONED: Option<IntCounter> = register_int_counter!(
            "telemetry_frames_abandoned_total",
            "Unfinished frames dropped at the length cap"
        ).ok();
        pub(super) static ref DROPPED_CHUNKS: Option<IntCounter> = register_int_counter!(
            "telemetry_chunks_dropped_total",
            "Chunks received outside of any frame"
        ).ok();
        pub(super) static ref ACCUMULATOR: Option<IntGauge> = register_int_gauge!(
            "telemetry_accumulator_chars",
            "Characters currently held for an unfinished frame"
        ).ok();
    }

    /// Renders every registered metric in the Prometheus text format.
    pub fn gather_metrics() -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        let metric_families = prometheus::gather();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(feature = "metrics")]
pub use registry::gather_metrics;

#[cfg(feature = "metrics")]
pub(crate) fn record_frame() {
    if let Some(counter) = registry::FRAMES.as_ref() {
        counter.inc();
    }
}

#[cfg(feature = "metrics")]
pub(crate) fn record_abandoned() {
    if let Some(counter) = registry::ABANDONED.as_ref() {
        counter.inc();
    }
}

#[cfg(feature = "metrics")]
pub(crate) fn record_dropped_chunk() {
    if let Some(counter) = registry::DROPPED_CHUNKS.as_ref() {
        counter.inc();
    }
}

#[cfg(feature = "metrics")]
pub(crate) fn set_accumulator_len(len: usize) {
    if let Some(gauge) = registry::ACCUMULATOR.as_ref() {
        gauge.set(i64::try_from(len).unwrap_or(i64::MAX));
    }
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_frame() {}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_abandoned() {}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_dropped_chunk() {}

#[cfg(not(feature = "metrics"))]
pub(crate) fn set_accumulator_len(_len: usize) {}
