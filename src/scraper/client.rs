//! Blocking HTTP client with a fixed politeness delay and bounded, linearly backed-off retries.

use crate::scraper::error::FetchError;
use log::{debug, warn};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, UPGRADE_INSECURE_REQUESTS,
};
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "ja,en-US;q=0.7,en;q=0.3";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DELAY_SECS: u64 = 1;
const MAX_REDIRECTS: usize = 10;

/// Default number of attempts for get_text (initial plus retries).
const DEFAULT_RETRY_COUNT: u32 = 3;

/// Delay after failed attempt `attempt` (0-based): `base * (attempt + 2)`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * (attempt + 2)
}

/// Blocking HTTP client that sleeps a fixed delay before every request.
#[derive(Debug)]
pub struct PoliteClient {
    inner: reqwest::blocking::Client,
    delay: Duration,
    retry_count: u32,
}

impl PoliteClient {
    /// Build a polite client with the default headers, timeout, delay and retry count.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    pub fn builder() -> PoliteClientBuilder {
        PoliteClientBuilder::default()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// GET `url` and return the body text.
    ///
    /// Sleeps the base delay before every attempt. Transport errors, non-2xx statuses
    /// and body read errors are all retried; after a failed attempt the client waits
    /// [`backoff_delay`] before trying again. The last attempt's error is returned.
    pub fn get_text(&mut self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0u32;
        loop {
            std::thread::sleep(self.delay);
            match self.try_get_text(url) {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!("Attempt {} failed for {}: {}", attempt + 1, url, e);
                    if attempt + 1 >= self.retry_count {
                        return Err(e);
                    }
                    let backoff = backoff_delay(self.delay, attempt);
                    debug!("Retrying {} in {:?}", url, backoff);
                    std::thread::sleep(backoff);
                    attempt += 1;
                }
            }
        }
    }

    fn try_get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .inner
            .get(url)
            .send()
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response.text().map_err(|e| FetchError::BodyRead {
            url: url.to_string(),
            source: e,
        })
    }
}

/// Builder for PoliteClient. Headers are fixed; only timing knobs are exposed.
#[derive(Debug)]
pub struct PoliteClientBuilder {
    delay: Duration,
    timeout_secs: u64,
    retry_count: u32,
}

impl Default for PoliteClientBuilder {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(DEFAULT_DELAY_SECS),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_count: DEFAULT_RETRY_COUNT,
        }
    }
}

impl PoliteClientBuilder {
    /// Set delay before each request in seconds. Default 1.
    pub fn delay_secs(mut self, secs: u64) -> Self {
        self.delay = Duration::from_secs(secs);
        self
    }

    /// Set delay before each request. Zero disables throttling (tests).
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set total number of attempts per URL (default 3, minimum 1).
    pub fn retry_count(mut self, n: u32) -> Self {
        self.retry_count = n.max(1);
        self
    }

    pub fn build(self) -> Result<PoliteClient, reqwest::Error> {
        let inner = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .user_agent(DEFAULT_USER_AGENT)
            .default_headers(default_headers())
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(PoliteClient {
            inner,
            delay: self.delay,
            retry_count: self.retry_count,
        })
    }
}

/// Browser-like request headers. Accept-Encoding is negotiated by reqwest so bodies get decoded.
fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_linearly_from_twice_the_base() {
        let base = Duration::from_secs(1);
        assert_eq!(backoff_delay(base, 0), Duration::from_secs(2));
        assert_eq!(backoff_delay(base, 1), Duration::from_secs(3));
        assert_eq!(backoff_delay(base, 2), Duration::from_secs(4));
    }

    #[test]
    fn backoff_scales_with_base() {
        let base = Duration::from_millis(250);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(1250));
        assert_eq!(backoff_delay(Duration::ZERO, 5), Duration::ZERO);
    }

    #[test]
    fn builder_defaults_match_fixed_policy() -> Result<(), reqwest::Error> {
        let client = PoliteClient::new()?;
        assert_eq!(client.delay(), Duration::from_secs(1));
        assert_eq!(client.retry_count(), 3);
        Ok(())
    }

    #[test]
    fn retry_count_is_at_least_one() -> Result<(), reqwest::Error> {
        let client = PoliteClient::builder().retry_count(0).build()?;
        assert_eq!(client.retry_count(), 1);
        Ok(())
    }

    #[test]
    fn default_headers_mimic_browser() {
        let headers = default_headers();
        assert_eq!(
            headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()),
            Some("ja,en-US;q=0.7,en;q=0.3")
        );
        assert_eq!(
            headers
                .get(UPGRADE_INSECURE_REQUESTS)
                .and_then(|v| v.to_str().ok()),
            Some("1")
        );
    }
}
