use std::future::Future;

use tracing::debug;

use crate::engine::GenerateError;

/// Fixed-attempt retry loop, no backoff. The acceptance predicate is
/// injected so the heuristic can be tested apart from the mechanics.
/// Returns the first accepted response; once attempts are exhausted, the
/// last unaccepted response is returned as-is, and the last error is
/// propagated only when no attempt produced text at all.
pub async fn generate_with_retry<F, Fut, P>(
    attempts: usize,
    accept: P,
    mut op: F,
) -> Result<String, GenerateError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, GenerateError>>,
    P: Fn(&str) -> bool,
{
    let mut last_text: Option<String> = None;
    let mut last_err = GenerateError::Connection;

    for attempt in 1..=attempts.max(1) {
        match op().await {
            Ok(text) if accept(&text) => return Ok(text),
            Ok(text) => {
                debug!(attempt, "response rejected by acceptance check");
                last_text = Some(text);
            }
            Err(e) => {
                debug!(attempt, error = %e, "generation attempt failed");
                last_err = e;
            }
        }
    }

    last_text.ok_or(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn returns_first_accepted_response() {
        let calls = AtomicUsize::new(0);
        let result = generate_with_retry(3, |t| t.contains("good"), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok("bad".to_string())
                } else {
                    Ok("good".to_string())
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "good");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn stops_after_fixed_attempts_and_keeps_last_text() {
        let calls = AtomicUsize::new(0);
        let result = generate_with_retry(3, |_| false, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(format!("attempt {n}")) }
        })
        .await;
        assert_eq!(result.unwrap(), "attempt 2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn propagates_last_error_when_nothing_succeeded() {
        let result: Result<String, _> =
            generate_with_retry(2, |_| true, || async { Err(GenerateError::Timeout) }).await;
        assert!(matches!(result.unwrap_err(), GenerateError::Timeout));
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let calls = AtomicUsize::new(0);
        let _ = generate_with_retry(0, |_| true, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok("x".to_string()) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
