// ABOUTME: Repository reference parsing: name[:tag] with a "latest" default.
// ABOUTME: Total parse, no failure modes; the first colon is the separator.

use std::fmt;

pub const DEFAULT_TAG: &str = "latest";

/// A `name:tag` repository reference.
///
/// The tag is never empty: parses without a tag (or with an empty one)
/// default to `latest`. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    name: String,
    tag: String,
}

impl RepoRef {
    /// Parse a `name[:tag]` string.
    ///
    /// Splits on the first `:`; everything after it is the tag, so inputs
    /// with multiple colons keep the remainder as part of the tag.
    pub fn parse(input: &str) -> Self {
        match input.split_once(':') {
            Some((name, tag)) if !tag.is_empty() => Self {
                name: name.to_string(),
                tag: tag.to_string(),
            },
            Some((name, _)) => Self::with_latest(name),
            None => Self::with_latest(input),
        }
    }

    /// Build a reference with the default `latest` tag.
    pub fn with_latest(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tag: DEFAULT_TAG.to_string(),
        }
    }

    pub fn new(name: &str, tag: &str) -> Self {
        if tag.is_empty() {
            Self::with_latest(name)
        } else {
            Self {
                name: name.to_string(),
                tag: tag.to_string(),
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}
