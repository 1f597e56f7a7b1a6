//! Retry and backoff for catalog API requests.
//!
//! Provides exponential backoff retry logic for rate limiting (HTTP 429 or a
//! GraphQL `THROTTLED` error) and connectivity failures. Everything else,
//! including GraphQL query errors and non-429 HTTP statuses, is propagated
//! immediately without retrying.

use std::future::Future;
use std::time::Duration;

use crate::error::CatalogError;

/// Upper bound for a single backoff sleep, whether computed or server-provided.
const MAX_DELAY_MS: u64 = 60_000;

/// Whether `err` is worth another attempt after a backoff sleep.
///
/// Retried:
/// - [`CatalogError::RateLimited`]: the API asked us to back off.
/// - [`CatalogError::Http`] when the request timed out or could not connect.
///
/// Returned on the spot:
/// - [`CatalogError::Query`]: malformed query or authorization failure.
/// - [`CatalogError::HttpStatus`]: any other non-2xx status.
/// - [`CatalogError::Deserialize`]: response body does not parse.
/// - [`CatalogError::MissingData`] and the remaining shape errors.
pub(crate) fn is_retriable(err: &CatalogError) -> bool {
    match err {
        CatalogError::RateLimited { .. } => true,
        CatalogError::Http(e) => e.is_timeout() || e.is_connect(),
        _ => false,
    }
}

/// Delay before retry number `retry` (1-based).
///
/// A rate-limit response that carried `Retry-After` is honored as-is;
/// otherwise the delay is `backoff_base_ms * 2^(retry - 1)`. Both are capped
/// at [`MAX_DELAY_MS`].
pub(crate) fn backoff_delay_ms(retry: u32, backoff_base_ms: u64, err: &CatalogError) -> u64 {
    let delay = match err {
        CatalogError::RateLimited {
            retry_after_secs: Some(secs),
        } => secs.saturating_mul(1_000),
        _ => backoff_base_ms.saturating_mul(1u64 << retry.saturating_sub(1).min(20)),
    };
    delay.min(MAX_DELAY_MS)
}

/// Calls `operation` until it succeeds, fails permanently, or the retry budget
/// runs out.
///
/// On success the result is returned immediately. Non-retriable errors are
/// returned immediately without sleeping or retrying.
///
/// On a retriable error the function sleeps for [`backoff_delay_ms`] and tries
/// again, up to `max_retries` additional attempts after the first try. If the
/// budget runs out the last error is wrapped in
/// [`CatalogError::RetriesExhausted`].
///
/// # Backoff schedule (example with `backoff_base_ms = 2000`, no `Retry-After`)
///
/// | Attempt | Sleep before next attempt |
/// |---------|--------------------------|
/// | 0 (initial) | none |
/// | 1 (first retry) | 2000 × 2^0 = 2 s |
/// | 2 (second retry) | 2000 × 2^1 = 4 s |
/// | 3 (third retry) | 2000 × 2^2 = 8 s |
///
/// `max_retries = 3` therefore means up to four calls of `operation`.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut retry = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retriable(&err) {
            return Err(err);
        }
        if retry >= max_retries {
            return Err(CatalogError::RetriesExhausted {
                attempts: retry + 1,
                last: Box::new(err),
            });
        }

        retry += 1;
        let delay_ms = backoff_delay_ms(retry, backoff_base_ms, &err);
        tracing::warn!(
            attempt = retry,
            max_retries,
            delay_ms,
            error = %err,
            "transient catalog error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn rate_limited(retry_after_secs: Option<u64>) -> CatalogError {
        CatalogError::RateLimited { retry_after_secs }
    }

    /// Runs the retry loop with zero backoff; `outcome(n)` decides what call
    /// `n` (0-based) returns. Yields the result and the number of calls made.
    async fn scripted<F>(max_retries: u32, outcome: F) -> (Result<u32, CatalogError>, u32)
    where
        F: Fn(u32) -> Result<u32, CatalogError>,
    {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(max_retries, 0, || {
            let out = outcome(calls.fetch_add(1, Ordering::SeqCst));
            async move { out }
        })
        .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn first_success_is_returned_without_retrying() {
        let (result, calls) = scripted(3, |_| Ok(42)).await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn recovers_after_two_rate_limits() {
        let (result, calls) = scripted(3, |n| if n < 2 { Err(rate_limited(None)) } else { Ok(99) }).await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn repeated_rate_limits_exhaust_the_budget() {
        let (result, calls) = scripted(3, |_| Err(rate_limited(Some(0)))).await;
        assert_eq!(calls, 4);
        match result {
            Err(CatalogError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 4);
                assert!(matches!(*last, CatalogError::RateLimited { .. }));
            }
            other => panic!("expected RetriesExhausted, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_budget_means_one_call() {
        let (result, calls) = scripted(0, |_| Err(rate_limited(None))).await;
        assert_eq!(calls, 1);
        assert!(matches!(
            result,
            Err(CatalogError::RetriesExhausted { attempts: 1, .. })
        ));
    }

    #[tokio::test]
    async fn query_error_fails_on_first_call() {
        let (result, calls) = scripted(3, |_| {
            Err(CatalogError::Query {
                messages: "Field 'prodcts' doesn't exist on type 'QueryRoot'".to_owned(),
            })
        })
        .await;
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(CatalogError::Query { .. })));
    }

    #[tokio::test]
    async fn unauthorized_status_fails_on_first_call() {
        let (result, calls) = scripted(3, |_| {
            Err(CatalogError::HttpStatus {
                status: 401,
                body: "[API] Invalid API key or access token".to_owned(),
            })
        })
        .await;
        assert_eq!(calls, 1);
        assert!(matches!(
            result,
            Err(CatalogError::HttpStatus { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn undecodable_body_fails_on_first_call() {
        let (result, calls) = scripted(3, |_| {
            Err(CatalogError::Deserialize {
                context: "products response".to_owned(),
                source: serde_json::from_str::<serde_json::Value>("<html>").unwrap_err(),
            })
        })
        .await;
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(CatalogError::Deserialize { .. })));
    }

    #[test]
    fn backoff_doubles_from_base() {
        let err = rate_limited(None);
        assert_eq!(backoff_delay_ms(1, 2_000, &err), 2_000);
        assert_eq!(backoff_delay_ms(2, 2_000, &err), 4_000);
        assert_eq!(backoff_delay_ms(3, 2_000, &err), 8_000);
    }

    #[test]
    fn backoff_honors_retry_after() {
        assert_eq!(backoff_delay_ms(1, 2_000, &rate_limited(Some(5))), 5_000);
        assert_eq!(backoff_delay_ms(3, 2_000, &rate_limited(Some(1))), 1_000);
    }

    #[test]
    fn backoff_is_capped() {
        assert_eq!(backoff_delay_ms(30, 2_000, &rate_limited(None)), MAX_DELAY_MS);
        assert_eq!(
            backoff_delay_ms(1, 0, &rate_limited(Some(3_600))),
            MAX_DELAY_MS
        );
    }
}
