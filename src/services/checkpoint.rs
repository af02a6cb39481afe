//! Checkpoint reporting keyed on cumulative progress.

use crate::{Checkpoint, Error, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

pub const KIB: u64 = 1024;
pub const MIB: u64 = KIB * 1024;
pub const GIB: u64 = MIB * 1024;
pub const TIB: u64 = GIB * 1024;

/// Default byte granularity between checkpoints.
pub const DEFAULT_CHECKPOINT_BYTES: u64 = 5 * GIB;

/// Progress step between two checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Every N cumulative bytes of listed object size.
    Bytes(u64),
    /// Every N objects processed.
    Files(u64),
}

impl Default for Granularity {
    fn default() -> Self {
        Granularity::Bytes(DEFAULT_CHECKPOINT_BYTES)
    }
}

impl Granularity {
    /// Step size, never zero.
    #[must_use]
    pub fn step(&self) -> u64 {
        match *self {
            Granularity::Bytes(step) | Granularity::Files(step) => step.max(1),
        }
    }

    fn progress(&self, processed_bytes: u64, files_seen: u64) -> u64 {
        match self {
            Granularity::Bytes(_) => processed_bytes,
            Granularity::Files(_) => files_seen,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Granularity::Files(n) => write!(f, "{n}files"),
            Granularity::Bytes(n) => {
                for (unit, label) in [(TIB, "TiB"), (GIB, "GiB"), (MIB, "MiB"), (KIB, "KiB")] {
                    if n >= unit && n % unit == 0 {
                        return write!(f, "{}{label}", n / unit);
                    }
                }
                write!(f, "{n}B")
            }
        }
    }
}

impl FromStr for Granularity {
    type Err = Error;

    /// Accepts `10files`, or a byte size with an optional unit
    /// (`B`, `KiB`/`KB`/`K`, `MiB`, `GiB`, `TiB`; all binary multiples).
    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let lower = raw.to_ascii_lowercase();
        let invalid = || Error::InvalidInput(format!("invalid checkpoint granularity '{raw}'"));

        let split = lower
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(lower.len());
        let (digits, unit) = lower.split_at(split);
        let value: u64 = digits.parse().map_err(|_| invalid())?;
        if value == 0 {
            return Err(Error::InvalidInput(
                "checkpoint granularity must be greater than zero".to_string(),
            ));
        }

        let multiplier = match unit.trim() {
            "files" | "file" => return Ok(Granularity::Files(value)),
            "" | "b" => 1,
            "k" | "kb" | "kib" => KIB,
            "m" | "mb" | "mib" => MIB,
            "g" | "gb" | "gib" => GIB,
            "t" | "tb" | "tib" => TIB,
            _ => return Err(invalid()),
        };

        value
            .checked_mul(multiplier)
            .map(Granularity::Bytes)
            .ok_or_else(invalid)
    }
}

/// Decides when cumulative progress crosses the next granularity boundary.
///
/// Thresholds are emitted in strictly increasing order and never repeat. When
/// one observation jumps across several boundaries only the highest one is
/// reported.
#[derive(Debug)]
pub struct CheckpointReporter {
    granularity: Granularity,
    started_at: Instant,
    boundaries_crossed: u64,
    emitted: u64,
}

impl CheckpointReporter {
    #[must_use]
    pub fn new(granularity: Granularity) -> Self {
        Self::started_at(granularity, Instant::now())
    }

    #[must_use]
    pub fn started_at(granularity: Granularity, started_at: Instant) -> Self {
        Self {
            granularity,
            started_at,
            boundaries_crossed: 0,
            emitted: 0,
        }
    }

    #[must_use]
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Threshold of the most recent checkpoint, zero before the first.
    #[must_use]
    pub fn last_threshold(&self) -> u64 {
        self.boundaries_crossed * self.granularity.step()
    }

    /// Consider emitting a checkpoint for the current cumulative counters.
    pub fn observe(&mut self, processed_bytes: u64, files_seen: u64) -> Option<Checkpoint> {
        self.observe_at(Instant::now(), processed_bytes, files_seen)
    }

    pub fn observe_at(
        &mut self,
        now: Instant,
        processed_bytes: u64,
        files_seen: u64,
    ) -> Option<Checkpoint> {
        let step = self.granularity.step();
        let crossed = self.granularity.progress(processed_bytes, files_seen) / step;
        if crossed <= self.boundaries_crossed {
            return None;
        }

        self.boundaries_crossed = crossed;
        self.emitted += 1;

        let elapsed = now.saturating_duration_since(self.started_at);
        Some(Checkpoint {
            sequence: self.emitted,
            threshold: crossed * step,
            processed_bytes,
            files_seen,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        })
    }
}
