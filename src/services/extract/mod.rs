//! Record extraction: from raw object bytes to one status class per record.
//!
//! Every strategy shares record decoding and differs only in how the status
//! code is located inside the message text. Strategies MUST agree on every
//! input; they exist so the same contract can be served by a plain substring
//! scan or by a compiled pattern.
//!
//! - Records are `\n`-delimited JSON objects; surrounding whitespace is ignored
//!   and blank lines are not records.
//! - Lines that are not a JSON object are malformed: skipped and counted.
//! - Only the `message` field is consulted; a missing or non-string message
//!   carries no status.

pub mod literal;
pub mod pattern;

use crate::{Result, RunningTotals, StatusClass};
use literal::LiteralMatcher;
use pattern::PatternMatcher;
use serde_json::{Map, Value};

/// Literal that precedes the three-digit status code in a message.
pub const STATUS_MARKER: &str = "HTTP Status Code: ";

/// Enumeration of available extraction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorKind {
    /// Substring scan for the marker followed by three ASCII digits.
    #[default]
    Literal,
    /// Compiled regular expression, as analytical engines express it.
    Regex,
}

impl ExtractorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractorKind::Literal => "literal",
            ExtractorKind::Regex => "regex",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "literal" | "scan" => Some(ExtractorKind::Literal),
            "regex" | "pattern" => Some(ExtractorKind::Regex),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExtractorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ExtractorKind::from_label(s).ok_or_else(|| format!("unknown extractor '{s}'"))
    }
}

/// Locates the status code inside a record's message.
pub trait StatusMatcher: Send + Sync {
    fn kind(&self) -> ExtractorKind;

    /// First three-digit code that directly follows [`STATUS_MARKER`].
    fn status_code(&self, message: &str) -> Option<u16>;
}

/// The decoded part of a log record that extraction consults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub message: Option<String>,
}

impl LogRecord {
    /// Decode one line; `None` when it is not a JSON object.
    #[must_use]
    pub fn parse(line: &[u8]) -> Option<Self> {
        let object: Map<String, Value> = serde_json::from_slice(line).ok()?;
        let message = match object.get("message") {
            Some(Value::String(text)) => Some(text.clone()),
            _ => None,
        };
        Some(Self { message })
    }
}

/// Extraction strategy selected at startup.
pub enum Extractor {
    Literal(LiteralMatcher),
    Regex(PatternMatcher),
}

impl Extractor {
    pub fn new(kind: ExtractorKind) -> Result<Self> {
        Ok(match kind {
            ExtractorKind::Literal => Extractor::Literal(LiteralMatcher),
            ExtractorKind::Regex => Extractor::Regex(PatternMatcher::new()?),
        })
    }

    fn matcher(&self) -> &dyn StatusMatcher {
        match self {
            Extractor::Literal(matcher) => matcher,
            Extractor::Regex(matcher) => matcher,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ExtractorKind {
        self.matcher().kind()
    }

    #[must_use]
    pub fn status_code(&self, message: &str) -> Option<u16> {
        self.matcher().status_code(message)
    }

    /// Classify a single decoded record.
    #[must_use]
    pub fn classify(&self, record: &LogRecord) -> StatusClass {
        record
            .message
            .as_deref()
            .and_then(|message| self.status_code(message))
            .map_or(StatusClass::Unknown, StatusClass::from_code)
    }

    /// Lazily classify every record in one object's content.
    #[must_use]
    pub fn records<'a>(&'a self, content: &'a [u8]) -> Records<'a> {
        Records {
            extractor: self,
            lines: content.split(is_newline as fn(&u8) -> bool),
            malformed: 0,
        }
    }

    /// Classify a whole object into fresh per-object totals.
    #[must_use]
    pub fn tally(&self, content: &[u8]) -> RunningTotals {
        let mut totals = RunningTotals::new();
        let mut records = self.records(content);
        for class in records.by_ref() {
            totals.record(class);
        }
        totals.record_malformed(records.malformed());
        totals
    }
}

/// Iterator over the status classes of well-formed records.
pub struct Records<'a> {
    extractor: &'a Extractor,
    lines: std::slice::Split<'a, u8, fn(&u8) -> bool>,
    malformed: u64,
}

impl Records<'_> {
    /// Number of malformed records skipped so far.
    #[must_use]
    pub fn malformed(&self) -> u64 {
        self.malformed
    }
}

impl Iterator for Records<'_> {
    type Item = StatusClass;

    fn next(&mut self) -> Option<StatusClass> {
        for line in self.lines.by_ref() {
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }

            match LogRecord::parse(line) {
                Some(record) => return Some(self.extractor.classify(&record)),
                None => {
                    self.malformed += 1;
                    log::trace!("Skipping malformed record ({} bytes)", line.len());
                }
            }
        }

        None
    }
}

fn is_newline(byte: &u8) -> bool {
    *byte == b'\n'
}

/// Parse exactly three ASCII digits at the start of `text`.
pub(crate) fn leading_code(text: &str) -> Option<u16> {
    let digits = text.as_bytes().get(..3)?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(
        digits
            .iter()
            .fold(0u16, |code, digit| code * 10 + u16::from(digit - b'0')),
    )
}
