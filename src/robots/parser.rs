//! Robots.txt rule evaluation
//!
//! Matching is delegated to the robotstxt crate; this type only owns the
//! fetched body so that it can be shared read-only between workers.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt data for one host
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    content: String,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Returns the raw robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if a path is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `path` - The URL path (and query) to check, e.g. "/page.html"
    /// * `user_agent` - The agent token, e.g. "FourBot"
    ///
    /// # Returns
    ///
    /// `false` only when the rules explicitly disallow `path` for `user_agent`
    pub fn is_allowed(&self, path: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        // The matcher keeps per-query state, so each check gets its own
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, path)
    }
}
