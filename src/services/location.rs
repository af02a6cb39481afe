//! Parsing of `scheme://bucket[/prefix]` scan locations

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Schemes accepted in front of the bucket name.
pub const SCHEMES: [&str; 2] = ["s3", "store"];

/// A bucket plus a normalized key prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub scheme: String,
    pub bucket: String,
    /// Empty, or ending with exactly one `/`.
    pub prefix: String,
}

impl Location {
    /// Parse a location string, rejecting unknown schemes and empty buckets.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let (scheme, rest) = input.split_once("://").ok_or_else(|| {
            Error::InvalidInput(format!(
                "Location must look like s3://bucket[/prefix]: {input}"
            ))
        })?;

        if !SCHEMES.contains(&scheme) {
            return Err(Error::InvalidInput(format!(
                "Unsupported scheme '{scheme}://' (expected one of: {})",
                SCHEMES
                    .iter()
                    .map(|s| format!("{s}://"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(Error::InvalidInput(format!(
                "Location is missing a bucket name: {input}"
            )));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            bucket: bucket.to_string(),
            prefix: normalize_prefix(prefix),
        })
    }
}

/// Trim trailing slashes, then terminate a non-empty prefix with one `/` so it
/// only selects keys inside that "directory".
#[must_use]
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Location::parse(s)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.bucket)?;
        if !self.prefix.is_empty() {
            write!(f, "/{}", self.prefix)?;
        }
        Ok(())
    }
}
