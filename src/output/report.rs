//! Result aggregation
//!
//! Renders each [`FetchResult`] as it arrives:
//!
//! ```text
//! Fetched URL: <url>
//! Content: <body>
//! Error fetching <url>: <error>
//! ```

use crate::config::OutputConfig;
use crate::crawler::FetchResult;
use crate::output::stats::CrawlStatistics;
use std::io::{self, Write};
use tokio::sync::mpsc;

/// Writes one result in the operator-facing format
pub fn write_result<W: Write>(out: &mut W, result: &FetchResult, show_body: bool) -> io::Result<()> {
    match &result.outcome {
        Ok(body) => {
            writeln!(out, "Fetched URL: {}", result.url)?;
            if show_body {
                writeln!(out, "Content: {}", body)?;
            }
        }
        Err(e) => writeln!(out, "Error fetching {}: {}", result.url, e)?,
    }
    out.flush()
}

/// Consumes the result stream until it closes
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Counts over every result observed
/// * `Err(io::Error)` - Writing to `out` failed; the stream is left open
pub async fn report_results<W: Write>(
    results: &mut mpsc::UnboundedReceiver<FetchResult>,
    out: &mut W,
    options: &OutputConfig,
) -> io::Result<CrawlStatistics> {
    let mut stats = CrawlStatistics::default();

    while let Some(result) = results.recv().await {
        stats.record(&result);
        write_result(out, &result, options.show_body)?;
    }

    tracing::debug!("Result stream closed after {} results", stats.total());
    Ok(stats)
}
