// eventscrub-core/src/telemetry.rs
//! Failure counters and log helpers for the scrubber.
//!
//! The scrubber never surfaces its own failures to the caller, so these are
//! the only place they show up. Every error record starts with
//! [`LOG_MARKER`] so it can be found regardless of the logger target.
//!
//! License: MIT OR APACHE 2.0

use std::sync::atomic::{AtomicU64, Ordering};

use log::error;
use serde::Serialize;

/// Prefix of every failure log record.
pub const LOG_MARKER: &str = "SCRUBBER_ERROR";

/// Log target used by the scrubber's own records.
pub const LOG_TARGET: &str = "eventscrub_core::scrubber";

/// Counter name for redactor failures.
pub const REDACTOR_ERROR_METRIC: &str = "redactor_error";

/// Counter name for traversal failures.
pub const TRAVERSAL_ERROR_METRIC: &str = "traversal_error";

/// Thread-safe failure counters, usually shared between scrubbers via `Arc`.
#[derive(Debug, Default)]
pub struct ScrubMetrics {
    redactor_errors: AtomicU64,
    traversal_errors: AtomicU64,
}

/// A point-in-time copy of [`ScrubMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub redactor_errors: u64,
    pub traversal_errors: u64,
}

impl MetricsSnapshot {
    /// Counts accumulated since `earlier` was taken.
    pub fn since(&self, earlier: &MetricsSnapshot) -> MetricsSnapshot {
        MetricsSnapshot {
            redactor_errors: self.redactor_errors.saturating_sub(earlier.redactor_errors),
            traversal_errors: self.traversal_errors.saturating_sub(earlier.traversal_errors),
        }
    }

    pub fn total(&self) -> u64 {
        self.redactor_errors + self.traversal_errors
    }
}

impl ScrubMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redactor_errors(&self) -> u64 {
        self.redactor_errors.load(Ordering::Relaxed)
    }

    pub fn traversal_errors(&self) -> u64 {
        self.traversal_errors.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            redactor_errors: self.redactor_errors(),
            traversal_errors: self.traversal_errors(),
        }
    }

    /// Records a redactor that failed on one value.
    pub(crate) fn record_redactor_error(&self, redactor: &str, path: &str, err: &dyn std::fmt::Display) {
        self.redactor_errors.fetch_add(1, Ordering::Relaxed);
        error!(target: LOG_TARGET, "{}", redactor_error_message(redactor, path, err));
    }

    /// Records a rule whose walk had to be abandoned.
    pub(crate) fn record_traversal_error(&self, path: &str, err: &dyn std::fmt::Display) {
        self.traversal_errors.fetch_add(1, Ordering::Relaxed);
        error!(target: LOG_TARGET, "{}", traversal_error_message(path, err));
    }
}

fn redactor_error_message(redactor: &str, path: &str, err: &dyn std::fmt::Display) -> String {
    format!(
        "{}: Error in redactor '{}' at '{}': {} (metric: {})",
        LOG_MARKER, redactor, path, err, REDACTOR_ERROR_METRIC
    )
}

fn traversal_error_message(path: &str, err: &dyn std::fmt::Display) -> String {
    format!(
        "{}: Error walking '{}': {} (metric: {})",
        LOG_MARKER, path, err, TRAVERSAL_ERROR_METRIC
    )
}
