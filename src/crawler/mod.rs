//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Single-attempt HTTP fetching with outcome classification
//! - Retry scheduling with exponential and rate-limit-aware backoff
//! - Admission control for concurrent fetches
//! - HTML parsing for links and product data
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod gate;
mod parser;
mod retry;

pub use coordinator::{run_crawl, CrawlFuture, CrawlReport, Crawler};
pub use fetcher::{build_http_client, parse_retry_after, FetchClient, FetchOutcome};
pub use gate::{AdmissionGate, Slot};
pub use parser::{clean_text, extract_product, parse_leading_int, parse_page, ParsedPage};
pub use retry::{run_with_retry, FetchedPage, RetryError, RetryPolicy, RetryState};
