//! Configuration module for the crawler
//!
//! Configuration is layered: built-in defaults, an optional TOML file, the
//! `BASE_URL` environment variable, then command-line flags (applied by the
//! binary). Validation runs on the final result.
//!
//! # Example
//!
//! ```no_run
//! use oda_crawler::config::load_from_env;
//!
//! let config = load_from_env().unwrap();
//! println!("Crawling {}", config.crawler.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, OutputConfig, RetryConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, config_from_env, load_config, load_config_with_hash,
    load_from_env, parse_config, BASE_URL_ENV,
};
pub use validation::validate;
