//! Exchange rates.
//!
//! [`FrankfurterClient`] talks to a Frankfurter-compatible API. Wrap it in
//! [`Retrying`] for capped linear-backoff retries and in [`RateCache`] to
//! reuse rates within a validity window.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use tracing::{debug, warn};
use ureq::Agent;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 10;

/// Error fetching an exchange rate.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// Server returned an error status.
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Response did not contain the requested currency.
    #[error("Rate not found for {from} to {to}")]
    MissingRate { from: String, to: String },
}

/// Something that knows how many `to` one `from` buys.
pub trait ExchangeRateSource: Send + Sync {
    fn rate(&self, from: &str, to: &str) -> Result<f64, RateError>;
}

#[derive(Deserialize)]
struct LatestResponse {
    rates: HashMap<String, f64>,
}

/// Client for `GET {base}/latest?from=X&to=Y`.
pub struct FrankfurterClient {
    agent: Agent,
    base_url: String,
}

impl FrankfurterClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Currency codes come from bill data and are encoded as query values.
    fn latest_url(&self, from: &str, to: &str) -> String {
        format!(
            "{}/latest?from={}&to={}",
            self.base_url,
            utf8_percent_encode(from, NON_ALPHANUMERIC),
            utf8_percent_encode(to, NON_ALPHANUMERIC)
        )
    }
}

impl Default for FrankfurterClient {
    fn default() -> Self {
        Self::new(
            "https://api.frankfurter.app",
            Duration::from_secs(DEFAULT_TIMEOUT),
        )
    }
}

impl ExchangeRateSource for FrankfurterClient {
    fn rate(&self, from: &str, to: &str) -> Result<f64, RateError> {
        if from == to {
            return Ok(1.0);
        }

        let url = self.latest_url(from, to);
        debug!(%url, "Fetching exchange rate");

        let response = self.agent.get(&url).header("Accept", "application/json").call()?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(RateError::HttpResponse {
                status,
                body: error_body,
            });
        }

        let latest: LatestResponse = body.read_json()?;
        latest
            .rates
            .get(to)
            .copied()
            .ok_or_else(|| RateError::MissingRate {
                from: from.to_owned(),
                to: to.to_owned(),
            })
    }
}

/// Retry settings: up to `max_retries` extra attempts, attempt `n` waiting
/// `base_delay * n` first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Source that retries failed lookups. Exhaustion returns the last error.
pub struct Retrying<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: ExchangeRateSource> Retrying<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<S: ExchangeRateSource> ExchangeRateSource for Retrying<S> {
    fn rate(&self, from: &str, to: &str) -> Result<f64, RateError> {
        let mut attempt = 0;
        loop {
            match self.inner.rate(from, to) {
                Ok(rate) => return Ok(rate),
                Err(e) if attempt < self.policy.max_retries => {
                    attempt += 1;
                    let delay = self.policy.delay(attempt);
                    warn!(
                        from,
                        to,
                        attempt,
                        ?delay,
                        error = %e,
                        "Exchange rate fetch failed, retrying"
                    );
                    std::thread::sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// In-memory cache keyed by currency pair with a validity window.
pub struct RateCache<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<(String, String), (f64, Instant)>>,
}

impl<S: ExchangeRateSource> RateCache<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn cached(&self, key: &(String, String)) -> Option<f64> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(key)
            .filter(|(_, fetched)| fetched.elapsed() < self.ttl)
            .map(|(rate, _)| *rate)
    }
}

impl<S: ExchangeRateSource> ExchangeRateSource for RateCache<S> {
    fn rate(&self, from: &str, to: &str) -> Result<f64, RateError> {
        let key = (from.to_owned(), to.to_owned());
        if let Some(rate) = self.cached(&key) {
            return Ok(rate);
        }

        let rate = self.inner.rate(from, to)?;
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, (rate, Instant::now()));
        }
        Ok(rate)
    }
}

impl<T: ExchangeRateSource + ?Sized> ExchangeRateSource for &T {
    fn rate(&self, from: &str, to: &str) -> Result<f64, RateError> {
        (**self).rate(from, to)
    }
}

impl<T: ExchangeRateSource + ?Sized> ExchangeRateSource for Box<T> {
    fn rate(&self, from: &str, to: &str) -> Result<f64, RateError> {
        (**self).rate(from, to)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tracing_test::traced_test;

    /// Serves fixed rates, failing the first `failures` calls.
    pub(crate) struct FakeRates {
        pub rates: HashMap<(String, String), f64>,
        pub failures: u32,
        pub calls: AtomicU32,
    }

    impl FakeRates {
        pub(crate) fn new(rates: &[(&str, &str, f64)]) -> Self {
            Self {
                rates: rates
                    .iter()
                    .map(|(from, to, rate)| (((*from).to_owned(), (*to).to_owned()), *rate))
                    .collect(),
                failures: 0,
                calls: AtomicU32::new(0),
            }
        }

        pub(crate) fn failing(mut self, failures: u32) -> Self {
            self.failures = failures;
            self
        }

        pub(crate) fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ExchangeRateSource for FakeRates {
        fn rate(&self, from: &str, to: &str) -> Result<f64, RateError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(RateError::HttpResponse {
                    status: 503,
                    body: "unavailable".to_owned(),
                });
            }
            self.rates
                .get(&(from.to_owned(), to.to_owned()))
                .copied()
                .ok_or_else(|| RateError::MissingRate {
                    from: from.to_owned(),
                    to: to.to_owned(),
                })
        }
    }

    fn no_delay(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_latest_url() {
        let client = FrankfurterClient::new("https://rates.test/", Duration::from_secs(1));
        assert_eq!(
            client.latest_url("USD", "CNY"),
            "https://rates.test/latest?from=USD&to=CNY"
        );
    }

    #[test]
    fn test_latest_url_encodes_codes() {
        let client = FrankfurterClient::new("https://rates.test", Duration::from_secs(1));
        assert_eq!(
            client.latest_url("US D", "C&Y=1#x"),
            "https://rates.test/latest?from=US%20D&to=C%26Y%3D1%23x"
        );
    }

    #[test]
    fn test_same_currency_skips_request() {
        let client = FrankfurterClient::new("http://127.0.0.1:9", Duration::from_millis(10));
        assert_eq!(client.rate("EUR", "EUR").unwrap(), 1.0);
    }

    #[test]
    fn test_retry_delay_is_linear() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_millis(500));
        assert_eq!(policy.delay(3), Duration::from_millis(1500));
    }

    #[test]
    #[traced_test]
    fn test_retry_recovers() {
        let source = Retrying::new(FakeRates::new(&[("USD", "CNY", 7.2)]).failing(2), no_delay(3));

        assert_eq!(source.rate("USD", "CNY").unwrap(), 7.2);
        assert_eq!(source.inner.calls(), 3);
        assert!(logs_contain("Exchange rate fetch failed, retrying"));
    }

    #[test]
    fn test_retry_exhaustion_returns_last_error() {
        let source = Retrying::new(FakeRates::new(&[("USD", "CNY", 7.2)]).failing(10), no_delay(2));

        let err = source.rate("USD", "CNY").unwrap_err();

        assert_eq!(err.to_string(), "HTTP error: 503 - unavailable");
        assert_eq!(source.inner.calls(), 3);
    }

    #[test]
    fn test_cache_reuses_rate() {
        let cache = RateCache::new(FakeRates::new(&[("USD", "CNY", 7.2)]), Duration::from_secs(60));

        assert_eq!(cache.rate("USD", "CNY").unwrap(), 7.2);
        assert_eq!(cache.rate("USD", "CNY").unwrap(), 7.2);
        assert_eq!(cache.inner.calls(), 1);
    }

    #[test]
    fn test_cache_keys_by_pair() {
        let cache = RateCache::new(
            FakeRates::new(&[("USD", "CNY", 7.2), ("EUR", "CNY", 7.8)]),
            Duration::from_secs(60),
        );

        assert_eq!(cache.rate("USD", "CNY").unwrap(), 7.2);
        assert_eq!(cache.rate("EUR", "CNY").unwrap(), 7.8);
        assert_eq!(cache.inner.calls(), 2);
    }

    #[test]
    fn test_cache_expired_entry_refetches() {
        let cache = RateCache::new(FakeRates::new(&[("USD", "CNY", 7.2)]), Duration::ZERO);

        cache.rate("USD", "CNY").unwrap();
        cache.rate("USD", "CNY").unwrap();
        assert_eq!(cache.inner.calls(), 2);
    }

    #[test]
    fn test_cache_does_not_store_errors() {
        let cache = RateCache::new(
            FakeRates::new(&[("USD", "CNY", 7.2)]).failing(1),
            Duration::from_secs(60),
        );

        assert!(cache.rate("USD", "CNY").is_err());
        assert_eq!(cache.rate("USD", "CNY").unwrap(), 7.2);
    }
}
