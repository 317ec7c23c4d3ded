#[cfg(feature = "circuit-breaker")]
pub mod circuit_breaker {
    use tokio_retry::strategy::{jitter, ExponentialBackoff};
    use tokio_retry::Retry;
    use tracing::warn;

    /// Runs `operation`, retrying it up to three more times (four attempts
    /// in all) with exponential backoff from 100ms and jitter.
    pub async fn with_retry<F, T, E, Fut>(operation: F) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let strategy = ExponentialBackoff::from_millis(100)
            .map(jitter)
            .take(3);

        let operation = &operation;
        Retry::spawn(strategy, move || async move {
            let result = operation().await;
            if let Err(e) = &result {
                warn!(error = %e, "attempt failed");
            }
            result
        })
        .await
    }
}
