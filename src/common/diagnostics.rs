//! Injectable diagnostics observer.
//!
//! Log output goes through `tracing` (bevy's `info!`/`warn!`/`error!`). The observer is for
//! hosts that want structured notice of critical failures, e.g. to show a crash dialog or
//! attach to a bug report.

use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex};

use bevy::prelude::*;

pub trait DiagnosticsObserver: Send + Sync + 'static {
    /// Non-fatal anomaly (bad data reference, skipped spawn).
    fn note(&self, _context: &str, _detail: &str) {}

    /// A guarded boundary caught a failure and forced a safe state.
    fn critical(&self, _context: &str, _error: &dyn Error) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl DiagnosticsObserver for NoopDiagnostics {}

/// Shared handle to the observer. Clones report to the same observer.
#[derive(Resource, Clone)]
pub struct Diagnostics(Arc<dyn DiagnosticsObserver>);

impl Diagnostics {
    pub fn new(observer: impl DiagnosticsObserver) -> Self {
        Self(Arc::new(observer))
    }

    pub fn note(&self, context: &str, detail: &str) {
        self.0.note(context, detail);
    }

    pub fn critical(&self, context: &str, error: &dyn Error) {
        self.0.critical(context, error);
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(NoopDiagnostics)
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEntry {
    Note { context: String, detail: String },
    Critical { context: String, message: String },
}

/// Observer that keeps every entry. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingDiagnostics {
    entries: Arc<Mutex<Vec<DiagnosticEntry>>>,
}

impl RecordingDiagnostics {
    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn criticals(&self) -> usize {
        self.entries()
            .iter()
            .filter(|e| matches!(e, DiagnosticEntry::Critical { .. }))
            .count()
    }

    fn record(&self, entry: DiagnosticEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

impl DiagnosticsObserver for RecordingDiagnostics {
    fn note(&self, context: &str, detail: &str) {
        self.record(DiagnosticEntry::Note {
            context: context.to_string(),
            detail: detail.to_string(),
        });
    }

    fn critical(&self, context: &str, error: &dyn Error) {
        self.record(DiagnosticEntry::Critical {
            context: context.to_string(),
            message: error.to_string(),
        });
    }
}
