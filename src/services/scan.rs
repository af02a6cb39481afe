//! Scan orchestration: list, fetch, parse, merge, checkpoint, finalize.
//!
//! Pages are listed one at a time. The objects of a page are fetched and
//! parsed in parallel on a bounded worker pool; each worker tallies one object
//! into local totals and then passes a single sequencing point that merges the
//! totals, advances progress and observes checkpoints. This keeps:
//!
//! - final totals independent of worker count and completion order,
//! - checkpoints ordered by non-decreasing processed bytes,
//! - any listing or fetch failure fatal for the whole scan (no partial result).
//!
//! Cancellation is cooperative and checked between objects.

use crate::services::accumulate::RateAccumulator;
use crate::services::checkpoint::{CheckpointReporter, MIB};
use crate::services::enumerate::ObjectEnumerator;
use crate::services::extract::Extractor;
use crate::services::location::Location;
use crate::services::store::ObjectStore;
use crate::{Checkpoint, Error, ObjectRef, Result, ScanOptions, Summary};
use rayon::prelude::*;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Instant, SystemTime};

/// Upper bound on the buffer reserved from a listed size; listings can lie.
const MAX_PREALLOCATION: u64 = 64 * MIB;

/// Cooperative cancellation flag shared between a scan and its controller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress owned by one scan, mutated only at the sequencing point.
#[derive(Debug)]
struct ProgressState {
    processed_bytes: u64,
    files_seen: u64,
    reporter: CheckpointReporter,
    checkpoints: Vec<Checkpoint>,
}

/// Per-scan shared state; nothing outlives one `run`.
struct ScanState {
    accumulator: RateAccumulator,
    progress: Mutex<ProgressState>,
}

impl ScanState {
    fn progress(&self) -> MutexGuard<'_, ProgressState> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drives one scan of a location against an injected object store.
pub struct Scanner<'a> {
    store: &'a dyn ObjectStore,
    options: ScanOptions,
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub fn new(store: &'a dyn ObjectStore, options: ScanOptions) -> Self {
        Self { store, options }
    }

    pub fn run(&self, location: &Location) -> Result<Summary> {
        if self.options.workers == 0 {
            return Err(Error::InvalidInput(
                "worker count must be greater than zero".to_string(),
            ));
        }

        let extractor = Extractor::new(self.options.extractor)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.workers)
            .thread_name(|index| format!("lograte-worker-{index}"))
            .build()
            .map_err(|err| Error::System(format!("failed to start worker pool: {err}")))?;

        let started_at = SystemTime::now();
        let start_instant = Instant::now();
        let state = ScanState {
            accumulator: RateAccumulator::new(),
            progress: Mutex::new(ProgressState {
                processed_bytes: 0,
                files_seen: 0,
                reporter: CheckpointReporter::started_at(self.options.granularity, start_instant),
                checkpoints: Vec::new(),
            }),
        };

        log::info!(
            "Scanning {location} with {} extractor, {} workers, checkpoint every {}",
            extractor.kind(),
            self.options.workers,
            self.options.granularity
        );

        self.check_cancelled()?;

        let enumerator = ObjectEnumerator::new(self.store, location);
        for page in enumerator.pages() {
            let page = page?;
            self.check_cancelled()?;

            pool.install(|| {
                page.par_iter()
                    .try_for_each(|object| self.process_object(location, object, &extractor, &state))
            })?;
        }

        let ScanState {
            accumulator,
            progress,
        } = state;
        let progress = progress.into_inner().unwrap_or_else(PoisonError::into_inner);
        let totals = accumulator.into_totals();
        let elapsed = start_instant.elapsed();

        log::info!(
            "Scanned {} objects ({} bytes) from {location}: {} classified, {} unclassified, {} malformed in {:.2} min",
            progress.files_seen,
            progress.processed_bytes,
            totals.total,
            totals.unclassified,
            totals.malformed,
            elapsed.as_secs_f64() / 60.0
        );

        Ok(Summary {
            location: location.to_string(),
            rates: totals.rates(),
            totals,
            checkpoints: progress.checkpoints,
            objects_scanned: progress.files_seen,
            bytes_scanned: progress.processed_bytes,
            extractor: extractor.kind(),
            started_at,
            finished_at: SystemTime::now(),
            elapsed,
        })
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.options.cancellation {
            Some(token) if token.is_cancelled() => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }

    fn process_object(
        &self,
        location: &Location,
        object: &ObjectRef,
        extractor: &Extractor,
        state: &ScanState,
    ) -> Result<()> {
        self.check_cancelled()?;

        let content = self.fetch(location, object)?;
        let local = extractor.tally(&content);

        log::debug!(
            "Parsed {}: {} classified, {} unclassified, {} malformed",
            object.key,
            local.total,
            local.unclassified,
            local.malformed
        );

        let mut progress = state.progress();
        state.accumulator.merge(&local);
        progress.processed_bytes = progress.processed_bytes.saturating_add(object.size_bytes);
        progress.files_seen += 1;

        let (bytes, files) = (progress.processed_bytes, progress.files_seen);
        if let Some(checkpoint) = progress.reporter.observe(bytes, files) {
            log::debug!(
                "Checkpoint {} at threshold {} after {} objects",
                checkpoint.sequence,
                checkpoint.threshold,
                checkpoint.files_seen
            );
            if let Some(notifier) = &self.options.checkpoint_notifier {
                notifier(&checkpoint);
            }
            progress.checkpoints.push(checkpoint);
        }

        Ok(())
    }

    fn fetch(&self, location: &Location, object: &ObjectRef) -> Result<Vec<u8>> {
        let fetch_error = |source: std::io::Error| Error::Fetch {
            key: object.key.clone(),
            source,
        };

        let mut reader = self
            .store
            .get(&location.bucket, &object.key)
            .map_err(fetch_error)?;

        let capacity = usize::try_from(object.size_bytes.min(MAX_PREALLOCATION)).unwrap_or(0);
        let mut content = Vec::with_capacity(capacity);
        reader.read_to_end(&mut content).map_err(fetch_error)?;

        if content.len() as u64 != object.size_bytes {
            log::warn!(
                "Object {} listed as {} bytes but {} bytes were read",
                object.key,
                object.size_bytes,
                content.len()
            );
        }

        Ok(content)
    }
}
