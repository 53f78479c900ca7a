//! Advisory diagnostics for non-conformant storages.
//!
//! A storage that reports moving more than it was asked for breaks its contract, but
//! the engine keeps going: the surplus is voided and the diagnostic fires. Nothing
//! here can change a transfer's result.

#[cfg(any(test, feature = "test-util"))]
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives storage contract violations.
pub trait TransferDiagnostics: Send + Sync + core::fmt::Debug {
    /// A view extracted `extracted` while `requested` was asked for.
    fn over_extraction(&self, extracted: u64, requested: u64);

    /// A storage accepted `inserted` while only `requested` was offered.
    fn over_insertion(&self, inserted: u64, requested: u64);
}

/// Logs violations as warnings. Default.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl TransferDiagnostics for TracingDiagnostics {
    fn over_extraction(&self, extracted: u64, requested: u64) {
        tracing::warn!(
            extracted,
            requested,
            voided = extracted.saturating_sub(requested),
            "inventory returned more than requested during extraction; excess will be voided"
        );
    }

    fn over_insertion(&self, inserted: u64, requested: u64) {
        tracing::warn!(
            inserted,
            requested,
            "inventory accepted more than offered during insertion; clamping"
        );
    }
}

/// Ignores violations.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentDiagnostics;

impl TransferDiagnostics for SilentDiagnostics {
    fn over_extraction(&self, _extracted: u64, _requested: u64) {}

    fn over_insertion(&self, _inserted: u64, _requested: u64) {}
}

/// Counts violations and voided units.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct CountingDiagnostics {
    over_extractions: AtomicU64,
    over_insertions: AtomicU64,
    voided: AtomicU64,
}

#[cfg(any(test, feature = "test-util"))]
impl CountingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn over_extractions(&self) -> u64 {
        self.over_extractions.load(Ordering::Relaxed)
    }

    pub fn over_insertions(&self) -> u64 {
        self.over_insertions.load(Ordering::Relaxed)
    }

    /// Units extracted by storages beyond what was asked for.
    pub fn voided(&self) -> u64 {
        self.voided.load(Ordering::Relaxed)
    }
}

#[cfg(any(test, feature = "test-util"))]
impl TransferDiagnostics for CountingDiagnostics {
    fn over_extraction(&self, extracted: u64, requested: u64) {
        self.over_extractions.fetch_add(1, Ordering::Relaxed);
        self.voided
            .fetch_add(extracted.saturating_sub(requested), Ordering::Relaxed);
    }

    fn over_insertion(&self, _inserted: u64, _requested: u64) {
        self.over_insertions.fetch_add(1, Ordering::Relaxed);
    }
}
