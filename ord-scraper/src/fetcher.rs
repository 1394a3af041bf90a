use crate::types::{FetchConfig, Result, ScraperError};
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Statuses worth another attempt: throttling and transient upstream failures.
const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

pub fn is_retryable_status(status: StatusCode) -> bool {
    RETRYABLE_STATUSES.contains(&status.as_u16())
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout() || err.is_body()
}

/// Read-only client for the reaction database API.
///
/// A single connection pool is shared by every call made during a run.
/// Requests are retried on connection failures and on the statuses in
/// [`RETRYABLE_STATUSES`], with exponential backoff between attempts.
pub struct HttpClient {
    client: Client,
    config: FetchConfig,
    base: Url,
}

impl HttpClient {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        let base = parse_api_base(&config.api_base)?;

        Ok(Self { client, config, base })
    }

    /// Resolves an endpoint path against the configured API base.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// Issues a GET, retrying transient failures.
    ///
    /// A retryable status that survives the retry budget is handed back as a
    /// normal response so the caller can inspect it.
    pub async fn get<Q>(&self, url: &Url, query: &Q, timeout: Duration) -> Result<Response>
    where
        Q: Serialize + ?Sized,
    {
        let mut backoff = self.backoff();
        let mut attempt: u32 = 0;

        loop {
            debug!("GET {} (attempt {})", url, attempt + 1);
            let outcome = self
                .client
                .get(url.clone())
                .query(query)
                .timeout(timeout)
                .send()
                .await;

            let can_retry = attempt < self.config.max_retries;
            let reason = match outcome {
                Ok(response) if can_retry && is_retryable_status(response.status()) => {
                    format!("HTTP {}", response.status())
                }
                Ok(response) => return Ok(response),
                Err(e) if can_retry && is_transient(&e) => e.to_string(),
                Err(e) => return Err(ScraperError::Http(e)),
            };

            let delay = backoff
                .next_backoff()
                .unwrap_or(Duration::from_millis(self.config.max_retry_delay_ms));
            warn!("Attempt {} for {} failed ({}), retrying in {:?}", attempt + 1, url, reason, delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Like [`HttpClient::get`], but any non-2xx status becomes an error.
    pub async fn get_ok<Q>(&self, url: &Url, query: &Q, timeout: Duration) -> Result<Response>
    where
        Q: Serialize + ?Sized,
    {
        let response = self.get(url, query, timeout).await?;
        ensure_success(response)
    }

    fn backoff(&self) -> ExponentialBackoff {
        retry_backoff(&self.config)
    }
}

pub fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ScraperError::RequestFailed {
            url: response.url().to_string(),
            status: status.as_u16(),
        })
    }
}

fn retry_backoff(config: &FetchConfig) -> ExponentialBackoff {
    let initial = Duration::from_millis(config.retry_delay_ms);
    ExponentialBackoff {
        current_interval: initial,
        initial_interval: initial,
        randomization_factor: 0.0,
        multiplier: 2.0,
        max_interval: Duration::from_millis(config.max_retry_delay_ms),
        max_elapsed_time: None,
        ..Default::default()
    }
}

// `Url::join` replaces the last path segment unless the base ends in '/'.
fn parse_api_base(api_base: &str) -> Result<Url> {
    let mut base = api_base.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(Url::parse(&base)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses_match_transient_failures() {
        for code in [429, 500, 502, 503, 504] {
            assert!(is_retryable_status(StatusCode::from_u16(code).unwrap()), "{code}");
        }
        for code in [200, 202, 400, 401, 404, 501] {
            assert!(!is_retryable_status(StatusCode::from_u16(code).unwrap()), "{code}");
        }
    }

    #[test]
    fn endpoints_resolve_under_the_api_prefix() {
        let client = HttpClient::new(FetchConfig {
            api_base: "https://open-reaction-database.org/api".to_string(),
            ..FetchConfig::default()
        })
        .unwrap();

        assert_eq!(
            client.endpoint("datasets").unwrap().as_str(),
            "https://open-reaction-database.org/api/datasets"
        );
        assert_eq!(
            client.endpoint("/submit_query").unwrap().as_str(),
            "https://open-reaction-database.org/api/submit_query"
        );
    }

    #[test]
    fn rejects_unparseable_api_base() {
        let result = HttpClient::new(FetchConfig {
            api_base: "not a url".to_string(),
            ..FetchConfig::default()
        });
        assert!(matches!(result, Err(ScraperError::InvalidUrl(_))));
    }

    #[test]
    fn backoff_doubles_from_the_initial_delay_up_to_the_cap() {
        let config = FetchConfig {
            retry_delay_ms: 1_000,
            max_retry_delay_ms: 4_000,
            ..FetchConfig::default()
        };
        let mut backoff = retry_backoff(&config);
        let delays: Vec<u128> = (0..5)
            .map(|_| backoff.next_backoff().unwrap().as_millis())
            .collect();
        assert_eq!(delays, vec![1_000, 2_000, 4_000, 4_000, 4_000]);
    }
}
