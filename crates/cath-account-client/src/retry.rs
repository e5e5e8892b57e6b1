//! Bounded retry with exponential backoff for account service calls.
//!
//! Only transient transport failures (refused connections, timeouts) are
//! retried. Anything that produced a response, whatever its status, goes
//! straight back to the caller.

use std::time::Duration;

/// Total attempts per request: one initial try plus this many retries.
const MAX_RETRIES: u32 = 3;

/// First backoff delay; doubles per retry (200ms, 400ms, 800ms).
const BASE_DELAY_MS: u64 = 200;

/// Drive `f` until it yields a response or the attempt budget runs out.
///
/// The closure is invoked at most `MAX_RETRIES + 1` times. The error
/// returned is the one from the last attempt.
pub(crate) async fn retry_send<F, Fut>(f: F) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut delay = Duration::from_millis(BASE_DELAY_MS);
    let mut attempt = 0;
    loop {
        let err = match f().await {
            Ok(resp) => return Ok(resp),
            Err(err) => err,
        };
        attempt += 1;
        if attempt > MAX_RETRIES {
            return Err(err);
        }
        tracing::warn!(
            attempt,
            max_retries = MAX_RETRIES,
            "account service request failed, retrying in {delay:?}: {err}"
        );
        tokio::time::sleep(delay).await;
        delay *= 2;
    }
}
