//! Robots.txt evaluation using the robotstxt crate

use robotstxt::DefaultMatcher;

/// User agent queried against robots.txt groups
pub const WILDCARD_AGENT: &str = "*";

/// Parsed robots.txt directives for one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRobots {
    /// No restrictions apply
    AllowAll,

    /// The site refused access to its robots.txt (401/403)
    DisallowAll,

    /// Raw robots.txt content, matched on demand
    Rules(String),
}

impl ParsedRobots {
    /// Creates a ParsedRobots from raw robots.txt content
    ///
    /// Empty content allows everything.
    pub fn from_content(content: &str) -> Self {
        if content.trim().is_empty() {
            Self::AllowAll
        } else {
            Self::Rules(content.to_string())
        }
    }

    /// Checks whether the wildcard agent may fetch `url`
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to check
    pub fn allows(&self, url: &str) -> bool {
        self.allows_agent(url, WILDCARD_AGENT)
    }

    /// Checks whether `user_agent` may fetch `url`
    pub fn allows_agent(&self, url: &str, user_agent: &str) -> bool {
        match self {
            Self::AllowAll => true,
            Self::DisallowAll => false,
            Self::Rules(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, user_agent, url)
            }
        }
    }
}
