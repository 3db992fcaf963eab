//! Run statistics
//!
//! Counts results by outcome as they stream past the aggregator.

use crate::crawler::{DispatchReport, FetchResult};
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Results carrying a body
    pub fetched: u64,

    /// Results carrying an error
    pub failed: u64,

    /// Failed results per error kind
    pub by_kind: BTreeMap<&'static str, u64>,
}

impl CrawlStatistics {
    pub fn record(&mut self, result: &FetchResult) {
        match result.error() {
            None => self.fetched += 1,
            Some(e) => {
                self.failed += 1;
                *self.by_kind.entry(e.kind()).or_insert(0) += 1;
            }
        }
    }

    /// Number of results observed
    pub fn total(&self) -> u64 {
        self.fetched + self.failed
    }
}

/// Prints statistics in a formatted manner
pub fn print_statistics<W: Write>(
    out: &mut W,
    stats: &CrawlStatistics,
    dispatch: &DispatchReport,
) -> io::Result<()> {
    writeln!(out, "=== Crawl Statistics ===")?;
    writeln!(out, "  Submitted: {}", dispatch.submitted)?;
    if dispatch.skipped > 0 {
        writeln!(out, "  Skipped (unparseable): {}", dispatch.skipped)?;
    }
    if dispatch.dropped > 0 {
        writeln!(out, "  Not submitted (stopped): {}", dispatch.dropped)?;
    }
    writeln!(out, "  Fetched: {}", stats.fetched)?;
    writeln!(out, "  Failed: {}", stats.failed)?;

    for (kind, count) in &stats.by_kind {
        writeln!(out, "    {}: {}", kind, count)?;
    }

    let success_rate = if stats.total() > 0 {
        (stats.fetched as f64 / stats.total() as f64) * 100.0
    } else {
        0.0
    };
    writeln!(out, "  Success rate: {:.1}%", success_rate)?;
    out.flush()
}
