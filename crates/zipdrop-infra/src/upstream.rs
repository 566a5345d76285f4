//! Bounded calls to external collaborators

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use zipdrop_core::AppError;

/// Run `call` with a deadline.
///
/// Both a collaborator error and an elapsed deadline become
/// `AppError::UpstreamUnavailable` for `service`. The call is not retried.
pub async fn bounded<T, E, F>(service: &str, timeout: Duration, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(AppError::upstream(service, e.to_string())),
        Err(_) => {
            tracing::warn!(
                service = service,
                timeout_ms = timeout.as_millis() as u64,
                "Upstream call timed out"
            );
            Err(AppError::upstream(
                service,
                format!("timed out after {}ms", timeout.as_millis()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipdrop_core::ErrorKind;

    #[tokio::test]
    async fn test_passes_value_through() {
        let value = bounded("counter store", Duration::from_secs(1), async {
            Ok::<_, String>(7)
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_error_becomes_upstream_unavailable() {
        let err = bounded("blob store", Duration::from_secs(1), async {
            Err::<(), _>("connection reset")
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(err.to_string().contains("blob store"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_upstream_unavailable() {
        let err = bounded("metadata store", Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, String>(())
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(err.to_string().contains("timed out"));
    }
}
