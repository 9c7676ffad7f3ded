//! Robots.txt parser implementation
//!
//! Thin wrapper over the `robotstxt` crate's Google-compatible matcher.

use robotstxt::DefaultMatcher;

/// A robots.txt document, or the absence of one
///
/// The `robotstxt` matcher re-parses the body on every query, which keeps this
/// type cheap to share between tasks.
#[derive(Debug, Clone, Default)]
pub struct ParsedRobots {
    /// `None` when every URL is permitted
    body: Option<String>,
}

impl ParsedRobots {
    /// Wraps raw robots.txt content
    ///
    /// Content without any rules behaves like [`ParsedRobots::allow_all`].
    pub fn from_content(content: &str) -> Self {
        if content.trim().is_empty() {
            return Self::allow_all();
        }
        Self {
            body: Some(content.to_string()),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is what a missing or unreadable robots.txt turns into.
    pub fn allow_all() -> Self {
        Self { body: None }
    }

    /// Returns true if no rules were loaded
    pub fn is_permissive(&self) -> bool {
        self.body.is_none()
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// `url` may be absolute or a bare path such as `/page.html`; only the
    /// path, parameters and query take part in matching.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match &self.body {
            None => true,
            Some(body) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(body, user_agent, url)
            }
        }
    }
}
