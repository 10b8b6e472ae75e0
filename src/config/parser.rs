use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable that overrides `crawler.base-url`
pub const BASE_URL_ENV: &str = "BASE_URL";

/// Loads and parses a configuration file from the given path
///
/// The `BASE_URL` environment variable is applied on top of the file and the
/// result is validated.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use oda_crawler::config::load_config;
///
/// let config = load_config(Path::new("crawler.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    apply_env_overrides(&mut config, std::env::var(BASE_URL_ENV).ok());
    validate(&config)?;
    Ok(config)
}

/// Builds a configuration from defaults plus the environment, without a file
pub fn load_from_env() -> Result<Config, ConfigError> {
    let config = config_from_env();
    validate(&config)?;
    Ok(config)
}

/// Defaults with the environment applied, not yet validated
///
/// For callers that layer more overrides before validating.
pub fn config_from_env() -> Config {
    let mut config = Config::default();
    apply_env_overrides(&mut config, std::env::var(BASE_URL_ENV).ok());
    config
}

/// Parses TOML content into a configuration (no validation)
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Applies environment overrides onto an existing configuration
///
/// Empty values are ignored so that `BASE_URL=` does not wipe the default.
pub fn apply_env_overrides(config: &mut Config, base_url: Option<String>) {
    if let Some(base_url) = base_url.filter(|v| !v.trim().is_empty()) {
        config.crawler.base_url = base_url.trim().to_string();
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a run's output can be traced back to its config.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
