//! Unit tests for the retry loop.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use planpatch::service::{with_retry, RetryPolicy};
use planpatch::AppError;

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    }
}

#[tokio::test]
async fn succeeds_after_transient_failures() {
    let calls = AtomicU32::new(0);
    let result = with_retry(&fast_policy(3), |attempt| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if attempt < 3 {
                Err(AppError::Service("503".into()))
            } else {
                Ok(attempt)
            }
        }
    })
    .await;

    assert_eq!(result.expect("third attempt succeeds"), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn validation_errors_are_not_retried() {
    let calls = AtomicU32::new(0);
    let result: planpatch::Result<()> = with_retry(&fast_policy(5), |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(AppError::Validation("bad input".into())) }
    })
    .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let calls = AtomicU32::new(0);
    let result: planpatch::Result<()> = with_retry(&fast_policy(2), |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(AppError::Network("refused".into())) }
    })
    .await;

    assert!(matches!(result, Err(AppError::Network(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_hint_replaces_backoff() {
    let policy = RetryPolicy {
        max_attempts: 2,
        initial_delay: Duration::from_secs(60),
        max_delay: Duration::from_secs(60),
    };
    let started = tokio::time::Instant::now();
    let result = with_retry(&policy, |attempt| async move {
        if attempt == 1 {
            Err(AppError::RateLimit {
                message: "429".into(),
                retry_after: Some(Duration::from_secs(2)),
            })
        } else {
            Ok(())
        }
    })
    .await;

    assert!(result.is_ok());
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(2));
    assert!(waited < Duration::from_secs(60));
}

#[test]
fn no_retry_policy_allows_one_attempt() {
    assert_eq!(RetryPolicy::no_retry().max_attempts, 1);
}
