//! Ingestion counters
//!
//! - Counters only
//! - Monotonic increase, reset only on process start
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters shared by every pipeline invocation.
///
/// Relaxed ordering: counters are observational and never drive control flow.
#[derive(Debug, Default)]
pub struct IngestMetrics {
    received: AtomicU64,
    accepted: AtomicU64,
    rejected_missing_name: AtomicU64,
    rejected_not_found: AtomicU64,
    rejected_invalid: AtomicU64,
    infrastructure_failures: AtomicU64,
    records_persisted: AtomicU64,
    violations_reported: AtomicU64,
}

impl IngestMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a stored batch and its records
    pub fn record_accepted(&self, records: usize) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        self.records_persisted
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    pub fn increment_missing_name(&self) {
        self.rejected_missing_name.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_not_found(&self) {
        self.rejected_not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a batch rejected by structural validation
    pub fn record_invalid(&self, violations: usize) {
        self.rejected_invalid.fetch_add(1, Ordering::Relaxed);
        self.violations_reported
            .fetch_add(violations as u64, Ordering::Relaxed);
    }

    pub fn increment_infrastructure_failures(&self) {
        self.infrastructure_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all counters as a point-in-time snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected_missing_name: self.rejected_missing_name.load(Ordering::Relaxed),
            rejected_not_found: self.rejected_not_found.load(Ordering::Relaxed),
            rejected_invalid: self.rejected_invalid.load(Ordering::Relaxed),
            infrastructure_failures: self.infrastructure_failures.load(Ordering::Relaxed),
            records_persisted: self.records_persisted.load(Ordering::Relaxed),
            violations_reported: self.violations_reported.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub received: u64,
    pub accepted: u64,
    pub rejected_missing_name: u64,
    pub rejected_not_found: u64,
    pub rejected_invalid: u64,
    pub infrastructure_failures: u64,
    pub records_persisted: u64,
    pub violations_reported: u64,
}

impl MetricsSnapshot {
    /// Total requests answered with a 400 outcome
    pub fn rejected(&self) -> u64 {
        self.rejected_missing_name + self.rejected_not_found + self.rejected_invalid
    }
}
