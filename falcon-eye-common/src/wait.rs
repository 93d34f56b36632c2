use std::time::Duration;

use anyhow::{Result, bail};
use tokio_util::sync::CancellationToken;

/// Exponential backoff w/ "full jitter": sleep for a random duration in
/// `[0, min(cap, base * 2^attempt)]`. Behaves well under contention and
/// avoids lockstep retries between concurrent callers waiting on the same
/// cluster state.
pub fn backoff_full_jitter(base: Duration, cap: Duration, attempt: usize) -> Duration {
    let base_ms = base.as_millis() as u64;
    let cap_ms = cap.as_millis() as u64;
    let pow = if attempt >= 63 { u64::MAX } else { 1u64 << attempt };
    let exp_ms = base_ms.saturating_mul(pow);
    let upper = exp_ms.min(cap_ms).max(1);
    Duration::from_millis(rand::random_range(0..=upper))
}

/// Polls `check` until it returns `Some`, a deadline elapses, or `cancel`
/// fires. Used by the Recording Supervisor (bounded recorder-readiness wait)
/// and the Lifecycle Controller (bounded pod-termination wait on delete).
pub async fn poll_until<T, F, Fut>(
    cancel: &CancellationToken,
    deadline: Duration,
    interval: Duration,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<Option<T>>>,
{
    let start = tokio::time::Instant::now();
    let mut attempt = 0usize;
    loop {
        if let Some(value) = check().await? {
            return Ok(value);
        }
        if start.elapsed() >= deadline {
            bail!("timed out after {:?}", deadline);
        }
        let delay = backoff_full_jitter(interval, interval, attempt).max(Duration::from_millis(1));
        attempt = attempt.saturating_add(1);
        tokio::select! {
            _ = cancel.cancelled() => bail!("cancelled"),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn backoff_never_exceeds_cap() {
        let cap = Duration::from_millis(100);
        for attempt in 0..10 {
            let delay = backoff_full_jitter(Duration::from_millis(10), cap, attempt);
            assert!(delay <= cap, "attempt {attempt} produced {delay:?} > cap {cap:?}");
        }
    }

    #[test]
    fn backoff_at_zero_attempts_is_bounded_by_base() {
        let base = Duration::from_millis(10);
        let delay = backoff_full_jitter(base, Duration::from_secs(10), 0);
        assert!(delay <= base);
    }

    #[tokio::test]
    async fn poll_until_returns_once_check_succeeds() {
        let cancel = CancellationToken::new();
        let calls = AtomicUsize::new(0);
        let result = poll_until(&cancel, Duration::from_secs(1), Duration::from_millis(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(if n >= 2 { Some(n) } else { None }) }
        })
        .await
        .unwrap();
        assert_eq!(result, 2);
    }

    #[tokio::test]
    async fn poll_until_times_out() {
        let cancel = CancellationToken::new();
        let result: Result<()> = poll_until(&cancel, Duration::from_millis(20), Duration::from_millis(5), || async {
            Ok(None)
        })
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn poll_until_honors_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<()> = poll_until(&cancel, Duration::from_secs(5), Duration::from_millis(1), || async { Ok(None) }).await;
        assert!(result.is_err());
    }
}
