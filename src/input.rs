//! Interactive URL input
//!
//! Prompts until the operator enters a valid, non-empty URL list.

use crate::url::validate_urls;
use crate::CrawlError;
use std::io::{self, BufRead, Write};

/// Prompt shown before each read
pub const PROMPT: &str = "Enter comma-separated URLs to crawl:";

/// Reads comma-separated URL lists from `reader` until one validates
///
/// Each rejected line is answered with the validation error and a new
/// prompt. Reaching end of input first is an error.
pub fn prompt_for_urls<R: BufRead, W: Write>(
    mut reader: R,
    mut out: W,
) -> Result<Vec<String>, CrawlError> {
    loop {
        writeln!(out, "{}", PROMPT)?;
        out.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a valid URL list was entered",
            )
            .into());
        }

        match validate_urls(line.trim()) {
            Ok(urls) => return Ok(urls),
            Err(e) => writeln!(out, "{}", e)?,
        }
    }
}
