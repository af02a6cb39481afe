//! Data models for listed objects, status classes, totals, rates and checkpoints

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An object reported by the store listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub key: String,
    pub size_bytes: u64,
}

impl ObjectRef {
    #[must_use]
    pub fn new(key: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            key: key.into(),
            size_bytes,
        }
    }
}

/// HTTP status class derived from a three-digit code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusClass {
    #[serde(rename = "2xx")]
    Success,
    #[serde(rename = "3xx")]
    Redirect,
    #[serde(rename = "4xx")]
    ClientError,
    #[serde(rename = "5xx")]
    ServerError,
    #[serde(rename = "unknown")]
    Unknown,
}

impl StatusClass {
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code {
            200..300 => StatusClass::Success,
            300..400 => StatusClass::Redirect,
            400..500 => StatusClass::ClientError,
            500..600 => StatusClass::ServerError,
            _ => StatusClass::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClass::Success => "2xx",
            StatusClass::Redirect => "3xx",
            StatusClass::ClientError => "4xx",
            StatusClass::ServerError => "5xx",
            StatusClass::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running per-class counters for one scan.
///
/// `total` only counts records whose status fell in 2xx, 4xx or 5xx, so
/// `count_2xx + count_4xx + count_5xx == total` always holds. `unclassified`
/// and `malformed` are diagnostics and never enter the rates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningTotals {
    pub total: u64,
    pub count_2xx: u64,
    pub count_4xx: u64,
    pub count_5xx: u64,
    pub unclassified: u64,
    pub malformed: u64,
}

impl RunningTotals {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, class: StatusClass) {
        match class {
            StatusClass::Success => self.count_2xx = self.count_2xx.saturating_add(1),
            StatusClass::ClientError => self.count_4xx = self.count_4xx.saturating_add(1),
            StatusClass::ServerError => self.count_5xx = self.count_5xx.saturating_add(1),
            StatusClass::Redirect | StatusClass::Unknown => {
                self.unclassified = self.unclassified.saturating_add(1);
                return;
            }
        }
        self.total = self.total.saturating_add(1);
    }

    pub fn record_malformed(&mut self, count: u64) {
        self.malformed = self.malformed.saturating_add(count);
    }

    pub fn merge(&mut self, other: &RunningTotals) {
        self.total = self.total.saturating_add(other.total);
        self.count_2xx = self.count_2xx.saturating_add(other.count_2xx);
        self.count_4xx = self.count_4xx.saturating_add(other.count_4xx);
        self.count_5xx = self.count_5xx.saturating_add(other.count_5xx);
        self.unclassified = self.unclassified.saturating_add(other.unclassified);
        self.malformed = self.malformed.saturating_add(other.malformed);
    }

    /// Project the counters onto rates; all zero when nothing was counted.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rates(&self) -> RateResult {
        if self.total == 0 {
            return RateResult::default();
        }

        let total = self.total as f64;
        RateResult {
            rate_2xx: self.count_2xx as f64 / total,
            rate_4xx: self.count_4xx as f64 / total,
            rate_5xx: self.count_5xx as f64 / total,
        }
    }
}

/// Final status-class rates, each in `[0, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RateResult {
    pub rate_2xx: f64,
    pub rate_4xx: f64,
    pub rate_5xx: f64,
}

/// Progress notification emitted when a granularity boundary is crossed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// 1-based emission order within one scan.
    pub sequence: u64,
    /// Boundary crossed, in bytes or files depending on the granularity.
    pub threshold: u64,
    pub processed_bytes: u64,
    pub files_seen: u64,
    pub elapsed_ms: u64,
}

impl Checkpoint {
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    #[must_use]
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed().as_secs_f64() / 60.0
    }
}

/// Metadata stored alongside a persisted scan report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub location: String,
    pub started_at: String,  // unix epoch milliseconds
    pub finished_at: String, // unix epoch milliseconds
    pub extractor: String,
    pub granularity: String,
    pub objects_scanned: u64,
    pub bytes_scanned: u64,
}
