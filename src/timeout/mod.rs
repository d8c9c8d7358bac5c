use crate::error::{AggregatorError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Race an upstream call against a deadline.
///
/// Resolves with the call's own result when it settles in time; otherwise
/// fails with [`AggregatorError::Timeout`] carrying the caller-supplied
/// label. The in-flight future is dropped when the deadline fires, which
/// cancels the upstream request at its next suspension point instead of
/// leaving it running with a discarded result.
pub async fn with_deadline<T, F>(future: F, deadline: Duration, label: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => {
            let deadline_ms = deadline.as_millis() as u64;
            warn!(label = %label, deadline_ms, "Call exceeded its deadline");
            Err(AggregatorError::timeout(label, deadline_ms))
        }
    }
}
