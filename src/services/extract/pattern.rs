//! Regular-expression matcher for the status marker.

use super::{ExtractorKind, StatusMatcher};
use crate::{Error, Result};
use regex::Regex;

/// `[0-9]` rather than `\d`: the `regex` crate's `\d` also matches non-ASCII digits.
pub const STATUS_PATTERN: &str = r"HTTP Status Code: ([0-9]{3})";

#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: Regex,
}

impl PatternMatcher {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(STATUS_PATTERN)
            .map_err(|err| Error::System(format!("invalid status pattern: {err}")))?;
        Ok(Self { pattern })
    }
}

impl StatusMatcher for PatternMatcher {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Regex
    }

    fn status_code(&self, message: &str) -> Option<u16> {
        self.pattern
            .captures(message)
            .and_then(|captures| captures.get(1))
            .and_then(|code| code.as_str().parse().ok())
    }
}
