//! Run statistics
//!
//! Derived numbers reported when a crawl finishes.

use std::time::Duration;

/// Telemetry gathered over one crawl run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    /// Wall-clock time of the crawl
    pub elapsed: Duration,

    /// Network attempts, retries included
    pub total_requests: u64,

    /// Pages fetched successfully
    pub pages_fetched: u64,

    /// Distinct product records
    pub products: usize,

    pub broken_links: usize,

    /// Highest number of simultaneous fetches observed
    pub peak_in_flight: usize,
}

impl RunStatistics {
    /// Requests per second over the whole run, zero for an instant run
    pub fn requests_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_requests as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Crawl Statistics ===\n");
    println!("Elapsed time (seconds): {:.2}", stats.elapsed.as_secs_f64());
    println!("Total requests:         {}", stats.total_requests);
    println!("Requests per second:    {:.2}", stats.requests_per_second());
    println!("Pages fetched:          {}", stats.pages_fetched);
    println!("Products:               {}", stats.products);
    println!("Broken links:           {}", stats.broken_links);
    println!("Peak in-flight fetches: {}", stats.peak_in_flight);
}
