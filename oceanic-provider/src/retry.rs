//! Deadline-bounded retry for cluster creation.
//!
//! Creation races the control plane's propagation of newly granted launch
//! profiles, so the create call runs under a deadline. Error classification
//! decides which failures are worth another attempt before the deadline.

use std::time::Duration;

use oceanic_sdk::{ApiError, ApiResult};
use tokio::time::{sleep, Instant};
use tracing::warn;

/// Timing knobs for the create retry loop.
#[derive(Debug, Clone)]
pub struct CreateRetry {
    /// Total budget for all attempts.
    pub timeout: Duration,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for CreateRetry {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            delay: Duration::from_secs(1),
        }
    }
}

/// What to do with a failed create attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    Retry,
    Stop,
}

/// Classify a create failure.
///
/// A rejected launch profile is reported while the grant is still
/// propagating, and every other failure stops the loop too, so creation
/// fails on the first error in practice.
pub fn classify_create_error(err: &ApiError) -> RetryClass {
    if err.is_invalid_launch_profile() {
        return RetryClass::Stop;
    }
    RetryClass::Stop
}

/// Run `attempt` until it succeeds, the classifier stops it, or the
/// deadline passes.
pub async fn retry_create<T, F, Fut>(config: &CreateRetry, mut attempt: F) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ApiResult<T>>,
{
    let deadline = Instant::now() + config.timeout;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if classify_create_error(&err) == RetryClass::Stop {
                    warn!(error = %err, "cluster creation failed");
                    return Err(err);
                }
                if Instant::now() + config.delay >= deadline {
                    warn!(error = %err, "cluster creation deadline exceeded");
                    return Err(err);
                }
                sleep(config.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use oceanic_sdk::{ApiError, ERR_CODE_INVALID_PARAMETER};

    use super::*;

    fn fast() -> CreateRetry {
        CreateRetry {
            timeout: Duration::from_millis(200),
            delay: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn success_passes_through() {
        let attempts = AtomicU32::new(0);
        let result = retry_create(&fast(), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ApiError>(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_launch_profile_stops_after_one_attempt() {
        let attempts = AtomicU32::new(0);
        let result: ApiResult<()> = retry_create(&fast(), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ApiError::new(
                    ERR_CODE_INVALID_PARAMETER,
                    "Invalid launch profile: not yet propagated",
                ))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn generic_failure_stops_after_one_attempt() {
        let attempts = AtomicU32::new(0);
        let result: ApiResult<()> = retry_create(&fast(), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(ApiError::new("GENERAL_ERROR", "boom")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
