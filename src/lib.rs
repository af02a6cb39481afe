//! HTTP Status Rate Library
//!
//! This library scans newline-delimited JSON log records stored as objects in
//! a blob store, classifies the HTTP status code found in each record's
//! message, and reports the share of 2xx, 4xx and 5xx responses together with
//! byte-based progress checkpoints.

pub mod cli;
pub mod io;
pub mod models;
pub mod services;

pub use models::{Checkpoint, ObjectRef, RateResult, ReportMeta, RunningTotals, StatusClass};
pub use services::checkpoint::Granularity;
pub use services::extract::ExtractorKind;
pub use services::location::Location;
pub use services::scan::CancellationToken;
pub use services::store::ObjectStore;

use std::fmt;
use std::result;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Custom error type for the library
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    InvalidInput(String),
    StorageUnavailable {
        bucket: String,
        prefix: String,
        source: std::io::Error,
    },
    Fetch {
        key: String,
        source: std::io::Error,
    },
    Cancelled,
    System(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Error::StorageUnavailable {
                bucket,
                prefix,
                source,
            } => write!(
                f,
                "Storage unavailable: listing '{bucket}/{prefix}' failed: {source}"
            ),
            Error::Fetch { key, source } => write!(f, "Failed to fetch '{key}': {source}"),
            Error::Cancelled => write!(f, "Scan cancelled"),
            Error::System(msg) => write!(f, "System error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::StorageUnavailable { source, .. } | Error::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Callback receiving checkpoints as they are emitted.
pub type CheckpointNotifier = Arc<dyn Fn(&Checkpoint) + Send + Sync>;

/// Default size of the fetch/parse worker pool
pub const DEFAULT_WORKERS: usize = 8;

/// Options for scanning a location
#[derive(Clone)]
pub struct ScanOptions {
    pub extractor: ExtractorKind,
    pub granularity: Granularity,
    pub workers: usize,
    pub checkpoint_notifier: Option<CheckpointNotifier>,
    pub cancellation: Option<CancellationToken>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extractor: ExtractorKind::default(),
            granularity: Granularity::default(),
            workers: DEFAULT_WORKERS,
            checkpoint_notifier: None,
            cancellation: None,
        }
    }
}

impl fmt::Debug for ScanOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanOptions")
            .field("extractor", &self.extractor)
            .field("granularity", &self.granularity)
            .field("workers", &self.workers)
            .field("checkpoint_notifier", &self.checkpoint_notifier.is_some())
            .field("cancellation", &self.cancellation)
            .finish()
    }
}

/// Summary result from a scan operation
#[derive(Debug, Clone)]
pub struct Summary {
    pub location: String,
    pub rates: RateResult,
    pub totals: RunningTotals,
    pub checkpoints: Vec<Checkpoint>,
    pub objects_scanned: u64,
    pub bytes_scanned: u64,
    pub extractor: ExtractorKind,
    pub started_at: SystemTime,
    pub finished_at: SystemTime,
    pub elapsed: Duration,
}

impl Summary {
    #[must_use]
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed.as_secs_f64() / 60.0
    }
}

/// Scan every object under a location and return the status rates
///
/// # Arguments
/// * `location` - A `s3://bucket[/prefix]` or `store://bucket[/prefix]` string
/// * `store` - The object store to list and fetch from
/// * `opts` - Scan options
///
/// # Returns
/// A Summary with the final rates, totals and the checkpoints emitted.
/// The location is validated before the store is touched.
pub fn scan_summary(location: &str, store: &dyn ObjectStore, opts: &ScanOptions) -> Result<Summary> {
    let location: Location = location.parse()?;
    services::scan::Scanner::new(store, opts.clone()).run(&location)
}
