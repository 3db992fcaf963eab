//! Output module for rendering crawl results
//!
//! This module handles:
//! - Consuming the result stream and printing one entry per URL
//! - Recording and printing run statistics

mod report;
pub mod stats;

pub use report::{report_results, write_result};
pub use stats::{print_statistics, CrawlStatistics};
