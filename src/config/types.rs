use serde::Deserialize;

/// Main configuration structure for the crawler
///
/// Every section and key is optional in the TOML file; missing values fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub retry: RetryConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Crawl traversal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Origin that every relative path resolves against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Relative path the crawl starts from (depth 0)
    #[serde(rename = "start-path")]
    pub start_path: String,

    /// Deepest level that is still fetched
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://oda.com".to_string(),
            start_path: "/no".to_string(),
            max_depth: 2,
            max_concurrent_fetches: 20,
        }
    }
}

/// Retry and backoff configuration for a single logical fetch
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Backoff before the first retry (milliseconds)
    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: u64,

    /// Multiplier applied per retry
    pub factor: u32,

    /// Upper bound on the time spent waiting between attempts (milliseconds)
    #[serde(rename = "max-retry-time-ms")]
    pub max_retry_time_ms: u64,

    /// Adds up to 10% random jitter to exponential backoff
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1000,
            factor: 2,
            max_retry_time_ms: 60_000,
            jitter: false,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("oda-crawler/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the product map JSON file
    #[serde(rename = "products-path")]
    pub products_path: String,

    /// Path of the broken link JSON file
    #[serde(rename = "broken-links-path")]
    pub broken_links_path: String,

    /// Pretty-print the JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            products_path: "output.json".to_string(),
            broken_links_path: "brokenLinks.json".to_string(),
            pretty: false,
        }
    }
}
