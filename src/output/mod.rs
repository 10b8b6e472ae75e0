//! Output module for crawl results
//!
//! This module handles:
//! - Writing the final snapshot (product map and broken links) as JSON
//! - Reporting run statistics

mod json;
pub mod stats;
mod traits;

pub use json::JsonSnapshotWriter;
pub use stats::{print_statistics, RunStatistics};
pub use traits::{OutputError, OutputResult, SnapshotWriter};
