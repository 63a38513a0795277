//! Timeout helper for browser operations

use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Run a fallible browser operation under a deadline
///
/// The timeout error message contains "timeout" so `FailureKind::classify`
/// maps it to a timeout fetch status.
pub async fn with_page_timeout<F, T>(operation: F, timeout: Duration, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{operation_name} timeout after {} ms",
            timeout.as_millis()
        )),
    }
}
