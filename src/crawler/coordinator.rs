//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl traversal, which:
//! - Claims each target in the visited set before any network call
//! - Stops descending past the maximum depth
//! - Fetches through the admission gate and the retry scheduler
//! - Extracts product records and follow-up links
//! - Fans out one task per child link and joins every handle before returning

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{build_http_client, FetchClient, FetchOutcome};
use crate::crawler::gate::AdmissionGate;
use crate::crawler::parser::parse_page;
use crate::crawler::retry::{run_with_retry, FetchedPage, RetryError, RetryPolicy};
use crate::output::{JsonSnapshotWriter, RunStatistics, SnapshotWriter};
use crate::state::{CrawlSnapshot, ResultStore};
use crate::CrawlerError;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use url::Url;

/// Boxed crawl branch; boxing breaks the recursive future type
pub type CrawlFuture = Pin<Box<dyn Future<Output = Result<(), CrawlerError>> + Send>>;

/// Main crawler structure
///
/// Holds the injected shared state and the components every branch uses.
/// Branches share one `Crawler` through an `Arc`.
pub struct Crawler {
    config: CrawlerConfig,
    policy: RetryPolicy,
    fetcher: FetchClient,
    gate: AdmissionGate,
    store: Arc<ResultStore>,
    pages_fetched: AtomicU64,
}

impl Crawler {
    /// Creates a crawler from configuration, building its own HTTP client
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to crawl
    /// * `Err(CrawlerError)` - The base URL did not parse or the client could not be built
    pub fn new(config: &Config, store: Arc<ResultStore>) -> Result<Self, CrawlerError> {
        let client = build_http_client(&config.http)?;
        Self::with_client(config, client, store)
    }

    /// Creates a crawler around an existing HTTP client
    pub fn with_client(
        config: &Config,
        client: Client,
        store: Arc<ResultStore>,
    ) -> Result<Self, CrawlerError> {
        let base_url = Url::parse(&config.crawler.base_url)?;
        let fetcher = FetchClient::new(client, base_url, Arc::clone(&store));
        let gate = AdmissionGate::new(config.crawler.max_concurrent_fetches as usize);

        Ok(Self {
            config: config.crawler.clone(),
            policy: RetryPolicy::from(&config.retry),
            fetcher,
            gate,
            store,
            pages_fetched: AtomicU64::new(0),
        })
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Network attempts made so far, retries included
    pub fn total_requests(&self) -> u64 {
        self.fetcher.total_requests()
    }

    /// Pages fetched successfully so far
    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    /// Crawls the configured start path from depth 0 and gathers statistics
    pub async fn run(self: &Arc<Self>) -> Result<RunStatistics, CrawlerError> {
        let start_time = Instant::now();
        tracing::info!(
            "Starting crawl of {}{} (max depth {}, {} concurrent fetches)",
            self.fetcher.base_url(),
            self.config.start_path,
            self.config.max_depth,
            self.gate.ceiling()
        );

        self.crawl(self.config.start_path.clone(), 0).await?;

        let stats = RunStatistics {
            elapsed: start_time.elapsed(),
            total_requests: self.total_requests(),
            pages_fetched: self.pages_fetched(),
            products: self.store.product_count(),
            broken_links: self.store.broken_link_count(),
            peak_in_flight: self.gate.peak_in_flight(),
        };

        tracing::info!(
            "Crawl completed: {} pages fetched, {} products, {} broken links in {:?}",
            stats.pages_fetched,
            stats.products,
            stats.broken_links,
            stats.elapsed
        );

        Ok(stats)
    }

    /// Crawls one target and everything reachable from it
    ///
    /// Per-URL failures end only this branch. The returned error is reserved
    /// for faults such as a panicked child task, and is reported only after
    /// every sibling has finished.
    pub fn crawl(self: &Arc<Self>, target: String, depth: u32) -> CrawlFuture {
        let crawler = Arc::clone(self);
        Box::pin(async move { crawler.crawl_branch(target, depth).await })
    }

    async fn crawl_branch(self: Arc<Self>, target: String, depth: u32) -> Result<(), CrawlerError> {
        // Claim before any network call so concurrent parents cannot both fetch it.
        if !self.store.visited().insert(&target) {
            tracing::trace!("Already visited: {}", target);
            return Ok(());
        }

        if depth > self.config.max_depth {
            tracing::trace!("Depth {} exceeds limit, skipping {}", depth, target);
            return Ok(());
        }

        let page = match self.fetch_with_retry(&target).await {
            Ok(page) => page,
            Err(RetryError::ClientError { status_code }) => {
                tracing::warn!("Skipping {}: HTTP {}", target, status_code);
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Giving up on {}: {}", target, e);
                return Ok(());
            }
        };

        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
        tracing::info!("Finished: {} (depth {})", target, depth);

        let parsed = parse_page(&page.body, &target);

        if let Some((id, record)) = parsed.product {
            tracing::debug!("Product {} from {}: {}", id, target, record.name);
            self.store.upsert_product(&id, record);
        }

        let links: Vec<String> = parsed
            .links
            .into_iter()
            .filter(|link| !self.store.visited().contains(link))
            .collect();

        if links.is_empty() {
            return Ok(());
        }

        tracing::debug!("{} new links on {}", links.len(), target);

        let children: Vec<(String, JoinHandle<Result<(), CrawlerError>>)> = links
            .into_iter()
            .map(|link| {
                let handle = tokio::spawn(self.crawl(link.clone(), depth + 1));
                (link, handle)
            })
            .collect();

        self.join_children(children).await
    }

    /// Waits for every child, then surfaces the first fault
    async fn join_children(
        &self,
        children: Vec<(String, JoinHandle<Result<(), CrawlerError>>)>,
    ) -> Result<(), CrawlerError> {
        let mut first_fault = None;

        for (link, handle) in children {
            let fault = match handle.await {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e),
                Err(e) => {
                    tracing::error!("Crawl task for {} failed: {}", link, e);
                    Some(CrawlerError::TaskPanicked {
                        target: link,
                        message: e.to_string(),
                    })
                }
            };

            if first_fault.is_none() {
                first_fault = fault;
            }
        }

        match first_fault {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn fetch_with_retry(&self, target: &str) -> Result<FetchedPage, RetryError> {
        run_with_retry(&self.policy, || self.fetch_admitted(target)).await
    }

    /// One fetch attempt holding an admission slot
    ///
    /// The slot covers only the network call, never the backoff between
    /// attempts, so a waiting retry does not starve other branches.
    async fn fetch_admitted(&self, target: &str) -> FetchOutcome {
        let Some(slot) = self.gate.acquire().await else {
            return FetchOutcome::TransientError {
                reason: "admission gate closed".to_string(),
            };
        };
        let outcome = self.fetcher.fetch(target).await;
        self.gate.release(slot);
        outcome
    }
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub snapshot: CrawlSnapshot,
    pub statistics: RunStatistics,
}

/// Runs the main crawl operation
///
/// This function orchestrates the entire crawl process:
///
/// 1. Create the shared result store
/// 2. Build the HTTP client and crawler
/// 3. Crawl from the start path
/// 4. Snapshot the results and write them to the configured JSON files
///
/// # Example
///
/// ```no_run
/// use oda_crawler::config::load_from_env;
/// use oda_crawler::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_from_env()?;
/// let report = run_crawl(config).await?;
/// println!("{} products", report.snapshot.products.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, CrawlerError> {
    let store = Arc::new(ResultStore::new());
    let crawler = Arc::new(Crawler::new(&config, Arc::clone(&store))?);

    let statistics = crawler.run().await?;
    let snapshot = store.snapshot();

    JsonSnapshotWriter::new(&config.output).write_snapshot(&snapshot)?;
    tracing::info!(
        "Wrote {} products to {} and {} broken links to {}",
        snapshot.products.len(),
        config.output.products_path,
        snapshot.broken_links.len(),
        config.output.broken_links_path
    );

    Ok(CrawlReport {
        snapshot,
        statistics,
    })
}
