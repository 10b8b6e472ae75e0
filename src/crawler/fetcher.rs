//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Issuing exactly one GET per call
//! - Classifying the response into a [`FetchOutcome`]
//! - Recording 404 targets as broken links

use crate::config::HttpConfig;
use crate::state::ResultStore;
use crate::url::resolve_target;
use chrono::{DateTime, Utc};
use reqwest::header::RETRY_AFTER;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Classified result of a single fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 2xx (or lower) response with its body read to text
    Success {
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// HTTP 429, with the server-directed wait if one could be parsed
    RateLimited {
        retry_after: Option<Duration>,
    },

    /// 4xx other than 429; never retried
    ClientError {
        status_code: u16,
    },

    /// 3xx, 5xx, network failures and body read failures; retryable
    TransientError {
        /// Error description
        reason: String,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are not followed: a 3xx response is reported as a transient
/// error, the same as a 5xx.
///
/// # Example
///
/// ```no_run
/// use oda_crawler::config::HttpConfig;
/// use oda_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Parses a `Retry-After` header value into a delay from `now`
///
/// Accepts a whole number of seconds or an HTTP date. Values that do not
/// parse, that overflow `u64` seconds, or that are zero or already in the
/// past, yield `None`.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use oda_crawler::crawler::parse_retry_after;
/// use std::time::Duration;
///
/// assert_eq!(parse_retry_after("2", Utc::now()), Some(Duration::from_secs(2)));
/// assert_eq!(parse_retry_after("soon", Utc::now()), None);
/// ```
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if value.bytes().all(|b| b.is_ascii_digit()) {
        return value
            .parse::<u64>()
            .ok()
            .filter(|&seconds| seconds > 0)
            .map(Duration::from_secs);
    }

    let date = DateTime::parse_from_rfc2822(value).ok()?;
    let delta = date.with_timezone(&Utc) - now;
    delta.to_std().ok().filter(|d| !d.is_zero())
}

/// Performs single GET requests against one origin and classifies them
///
/// The client counts every network attempt it makes and records 404 targets
/// in the shared result store. It never retries on its own.
#[derive(Debug)]
pub struct FetchClient {
    client: Client,
    base_url: Url,
    store: Arc<ResultStore>,
    requests: AtomicU64,
}

impl FetchClient {
    pub fn new(client: Client, base_url: Url, store: Arc<ResultStore>) -> Self {
        Self {
            client,
            base_url,
            store,
            requests: AtomicU64::new(0),
        }
    }

    /// Total number of network attempts made so far
    pub fn total_requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches a same-origin target once
    ///
    /// # Classification
    ///
    /// | Status | Outcome |
    /// |--------|---------|
    /// | < 300 | Success (body read as text) |
    /// | 300-399 | TransientError |
    /// | 404 | ClientError, target recorded as broken |
    /// | 429 | RateLimited, with parsed `Retry-After` |
    /// | other 4xx | ClientError |
    /// | >= 500 | TransientError |
    /// | network error | TransientError |
    pub async fn fetch(&self, target: &str) -> FetchOutcome {
        let url = match resolve_target(&self.base_url, target) {
            Ok(url) => url,
            Err(e) => {
                // Not a network condition; retrying will not help.
                tracing::warn!("Cannot resolve {} against {}: {}", target, self.base_url, e);
                return FetchOutcome::ClientError {
                    status_code: StatusCode::BAD_REQUEST.as_u16(),
                };
            }
        };

        self.requests.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("GET {}", url);

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                let reason = if e.is_timeout() {
                    "Request timeout".to_string()
                } else if e.is_connect() {
                    format!("Connection failed: {}", e)
                } else {
                    e.to_string()
                };
                return FetchOutcome::TransientError { reason };
            }
        };

        let status = response.status();

        if status.is_client_error() {
            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| parse_retry_after(v, Utc::now()));
                return FetchOutcome::RateLimited { retry_after };
            }

            if status == StatusCode::NOT_FOUND {
                self.store.record_broken_link(target);
            }

            return FetchOutcome::ClientError {
                status_code: status.as_u16(),
            };
        }

        if status.is_redirection() || status.is_server_error() {
            return FetchOutcome::TransientError {
                reason: format!("HTTP {}", status),
            };
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Success {
                status_code: status.as_u16(),
                body,
            },
            Err(e) => FetchOutcome::TransientError {
                reason: format!("Failed to read body: {}", e),
            },
        }
    }
}
