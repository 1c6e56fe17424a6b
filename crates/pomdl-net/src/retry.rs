use std::time::Duration;

use tracing::debug;

use crate::client::{HttpClient, HttpResponse};
use crate::error::TransportError;

/// Delay before retry attempt `retry_count` (0-indexed): `base * 2^n`,
/// saturating on overflow.
pub fn retry_delay(retry_count: u32, base: Duration) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(retry_count))
}

/// Bounded retry configuration for transient transport failures.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }
}

/// Wraps an [`HttpClient`], re-issuing a request only when the failure is
/// transient ([`TransportError::is_transient`]). Responses with non-2xx
/// statuses are returned as-is on the first attempt; exhausting the attempt
/// budget surfaces the last transient error.
pub struct RetryingClient<C: HttpClient> {
    client: C,
    policy: RetryPolicy,
}

impl<C: HttpClient> RetryingClient<C> {
    pub fn new(client: C, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub async fn get(
        &self,
        url: &str,
        auth: Option<(&str, &str)>,
    ) -> Result<HttpResponse, TransportError> {
        let mut attempt = 0;
        loop {
            match self.client.get(url, auth).await {
                Ok(response) => return Ok(response),
                Err(error) if error.is_transient() && attempt + 1 < self.policy.max_attempts => {
                    let delay = retry_delay(attempt, self.policy.base_delay);
                    debug!(url, attempt, ?delay, %error, "transient transport failure, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use bytes::Bytes;

    use super::*;

    /// Fails with `failures` transient errors before answering 200.
    struct FlakyClient {
        failures: u32,
        calls: AtomicU32,
        error: fn(String) -> TransportError,
    }

    impl FlakyClient {
        fn new(failures: u32, error: fn(String) -> TransportError) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                error,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl HttpClient for FlakyClient {
        async fn get(
            &self,
            _url: &str,
            _auth: Option<(&str, &str)>,
        ) -> Result<HttpResponse, TransportError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err((self.error)("boom".into()))
            } else {
                Ok(HttpResponse {
                    status: 200,
                    body: Bytes::from_static(b"ok"),
                })
            }
        }
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[test]
    fn retry_delay_grows_exponentially() {
        let base = Duration::from_millis(100);
        assert_eq!(retry_delay(0, base), Duration::from_millis(100));
        assert_eq!(retry_delay(1, base), Duration::from_millis(200));
        assert_eq!(retry_delay(2, base), Duration::from_millis(400));
    }

    #[test]
    fn retry_delay_saturates() {
        let delay = retry_delay(40, Duration::from_secs(u64::MAX / 2));
        assert!(delay >= Duration::from_secs(u64::MAX / 2));
    }

    #[tokio::test]
    async fn recovers_from_transient_failures() {
        let client = RetryingClient::new(
            FlakyClient::new(2, TransportError::ReadTimeout),
            policy(3),
        );
        let response = client.get("https://repo.example/m2", None).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(client.client.calls(), 3);
    }

    #[tokio::test]
    async fn surfaces_last_error_after_exhaustion() {
        let client = RetryingClient::new(
            FlakyClient::new(5, TransportError::ConnectTimeout),
            policy(3),
        );
        let error = client.get("https://repo.example/m2", None).await.unwrap_err();
        assert!(matches!(error, TransportError::ConnectTimeout(_)));
        assert_eq!(client.client.calls(), 3);
    }

    #[tokio::test]
    async fn permanent_failures_are_never_retried() {
        let client = RetryingClient::new(FlakyClient::new(5, TransportError::Tls), policy(3));
        let error = client.get("https://repo.example/m2", None).await.unwrap_err();
        assert!(matches!(error, TransportError::Tls(_)));
        assert_eq!(client.client.calls(), 1);
    }

    #[tokio::test]
    async fn non_success_statuses_come_back_unretried() {
        struct NotFoundClient {
            calls: AtomicU32,
        }

        impl HttpClient for NotFoundClient {
            async fn get(
                &self,
                _url: &str,
                _auth: Option<(&str, &str)>,
            ) -> Result<HttpResponse, TransportError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(HttpResponse {
                    status: 404,
                    body: Bytes::new(),
                })
            }
        }

        let client = RetryingClient::new(
            NotFoundClient {
                calls: AtomicU32::new(0),
            },
            policy(3),
        );
        let response = client.get("https://repo.example/m2", None).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(client.client.calls.load(Ordering::SeqCst), 1);
    }
}
