//! Translation resolution metrics.
//!
//! Counts how content translations were picked. A growing first-available
//! count means translations are missing.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global resolution metrics singleton.
pub struct ResolutionMetrics {
    exact: AtomicUsize,
    english_fallback: AtomicUsize,
    first_available: AtomicUsize,
    missing: AtomicUsize,
}

static METRICS: OnceLock<ResolutionMetrics> = OnceLock::new();

impl ResolutionMetrics {
    fn new() -> Self {
        Self {
            exact: AtomicUsize::new(0),
            english_fallback: AtomicUsize::new(0),
            first_available: AtomicUsize::new(0),
            missing: AtomicUsize::new(0),
        }
    }

    pub fn global() -> &'static ResolutionMetrics {
        METRICS.get_or_init(ResolutionMetrics::new)
    }

    pub fn record_exact(&self) {
        self.exact.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_english_fallback(&self) {
        self.english_fallback.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_first_available(&self) {
        self.first_available.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_missing(&self) {
        self.missing.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report(&self) -> ResolutionReport {
        let exact = self.exact.load(Ordering::Relaxed);
        let english_fallback = self.english_fallback.load(Ordering::Relaxed);
        let first_available = self.first_available.load(Ordering::Relaxed);
        let missing = self.missing.load(Ordering::Relaxed);

        let total = exact + english_fallback + first_available + missing;
        let exact_rate = if total > 0 {
            (exact as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        ResolutionReport {
            exact,
            english_fallback,
            first_available,
            missing,
            exact_rate,
        }
    }
}

/// Snapshot of resolution counters.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub exact: usize,
    pub english_fallback: usize,
    pub first_available: usize,
    pub missing: usize,

    /// Share of resolutions that matched the requested language (0-100)
    pub exact_rate: f64,
}
