use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig, RetryConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_retry_config(&config.retry)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_base_url(&config.base_url)?;

    if !config.start_path.starts_with('/') || config.start_path.starts_with("//") {
        return Err(ConfigError::Validation(format!(
            "start_path must be a same-origin path starting with '/', got '{}'",
            config.start_path
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 1000 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 1000, got {}",
            config.max_concurrent_fetches
        )));
    }

    Ok(())
}

/// Validates the origin URL: http(s) with a host
fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' has no host",
            base_url
        )));
    }

    Ok(())
}

/// Validates retry configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "max_attempts must be >= 1".to_string(),
        ));
    }

    if config.factor < 1 {
        return Err(ConfigError::Validation(format!(
            "factor must be >= 1, got {}",
            config.factor
        )));
    }

    if config.base_delay_ms > config.max_retry_time_ms {
        return Err(ConfigError::Validation(format!(
            "base_delay_ms ({}) cannot exceed max_retry_time_ms ({})",
            config.base_delay_ms, config.max_retry_time_ms
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.products_path.is_empty() {
        return Err(ConfigError::Validation(
            "products_path cannot be empty".to_string(),
        ));
    }

    if config.broken_links_path.is_empty() {
        return Err(ConfigError::Validation(
            "broken_links_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
