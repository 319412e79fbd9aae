//! Timeout helper for callers that want to bound a turn.

use std::future::Future;
use std::time::Duration;

use crate::error::TurnkitError;

/// Wrap a future with a timeout.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, TurnkitError>>,
) -> Result<T, TurnkitError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(TurnkitError::Timeout(duration.as_millis() as u64)),
    }
}
