//! Substring scan for the status marker.

use super::{ExtractorKind, STATUS_MARKER, StatusMatcher, leading_code};

#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralMatcher;

impl StatusMatcher for LiteralMatcher {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Literal
    }

    fn status_code(&self, message: &str) -> Option<u16> {
        // A marker not followed by digits does not hide a later, valid one.
        message
            .match_indices(STATUS_MARKER)
            .find_map(|(start, _)| leading_code(&message[start + STATUS_MARKER.len()..]))
    }
}
