//! Shared tempo cell.
//!
//! The BPM lives in an `AtomicU64` holding the `f64` bit pattern, so the
//! scheduler thread and caller threads can read and write it without a lock.
//! Invalid values are rejected at the point of assignment and never stored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;

/// Tempo used when nothing else is configured.
pub const DEFAULT_BPM: f64 = 135.0;

/// A rejected tempo assignment.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("tempo must be a positive, finite BPM (got {0})")]
pub struct TempoError(pub f64);

/// Beats per minute, shared between threads.
#[derive(Debug)]
pub struct Tempo {
    bits: AtomicU64,
}

impl Tempo {
    /// Create a tempo cell, rejecting non-positive or non-finite values.
    pub fn new(bpm: f64) -> Result<Self, TempoError> {
        validate(bpm)?;
        Ok(Self {
            bits: AtomicU64::new(bpm.to_bits()),
        })
    }

    /// Current BPM.
    pub fn bpm(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Set a new BPM. On error the previous value is kept.
    pub fn set_bpm(&self, bpm: f64) -> Result<(), TempoError> {
        validate(bpm)?;
        self.bits.store(bpm.to_bits(), Ordering::Release);
        Ok(())
    }

    /// Length of one beat at the current tempo.
    pub fn beat_interval(&self) -> Duration {
        beat_interval(self.bpm())
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self {
            bits: AtomicU64::new(DEFAULT_BPM.to_bits()),
        }
    }
}

/// Length of one beat at `bpm`: `60 / bpm` seconds.
///
/// Panics if `60 / bpm` is not a representable `Duration`; a [`Tempo`] only
/// ever holds values for which it is.
pub fn beat_interval(bpm: f64) -> Duration {
    Duration::from_secs_f64(60.0 / bpm)
}

/// A BPM is usable when it is positive, finite, and its beat fits in a
/// `Duration`.
fn validate(bpm: f64) -> Result<(), TempoError> {
    if bpm.is_finite() && bpm > 0.0 && Duration::try_from_secs_f64(60.0 / bpm).is_ok() {
        Ok(())
    } else {
        Err(TempoError(bpm))
    }
}
