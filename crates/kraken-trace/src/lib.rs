// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # kraken-trace
//!
//! Diagnostic sink collaborators for the Kraken mapper.

use std::sync::{Arc, Mutex};
use tracing::warn;

// ── DiagnosticSink ──────────────────────────────────────────────────────

/// Receives non-fatal mapping diagnostics as they are recorded.
///
/// Sinks observe the rendered form (property name plus human-readable
/// message); the typed diagnostic stays with the mapping operation itself.
/// One sink instance may back many concurrent mapping operations.
pub trait DiagnosticSink: Send + Sync {
    /// Records one diagnostic.
    fn warn(&self, property: &str, message: &str);
}

// ── TracingSink ─────────────────────────────────────────────────────────

/// Forwards diagnostics as structured `tracing` warn events.
///
/// No subscriber is installed here; the host application decides where the
/// events go.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, property: &str, message: &str) {
        warn!(property, "{message}");
    }
}

// ── MemorySink ──────────────────────────────────────────────────────────

/// Thread-safe in-memory diagnostic collector.
///
/// Clones share the same buffer, so a test (or a batch driver) can hand the
/// sink to a mapping operation and inspect the capture afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all `(property, message)` pairs recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.inner.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Number of diagnostics recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().map(|g| g.len()).unwrap_or(0)
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discards everything recorded so far.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.clear();
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn warn(&self, property: &str, message: &str) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.push((property.to_owned(), message.to_owned()));
        }
    }
}

// ── NullSink ────────────────────────────────────────────────────────────

/// Drops every diagnostic; the explicit "no live surfacing" collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn warn(&self, _property: &str, _message: &str) {}
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.warn("Name", "first");
        sink.warn("Group", "second");
        assert_eq!(sink.len(), 2);
        let snap = sink.snapshot();
        assert_eq!(snap[0], ("Name".to_owned(), "first".to_owned()));
        assert_eq!(snap[1], ("Group".to_owned(), "second".to_owned()));
    }

    #[test]
    fn memory_sink_clones_share_buffer() {
        let sink = MemorySink::new();
        let clone = sink.clone();
        clone.warn("k", "m");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn memory_sink_clear() {
        let sink = MemorySink::new();
        sink.warn("k", "m");
        sink.clear();
        assert!(sink.is_empty());
        assert!(sink.snapshot().is_empty());
    }

    #[test]
    fn memory_sink_across_threads() {
        let sink = MemorySink::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let s = sink.clone();
                thread::spawn(move || s.warn("p", &format!("m{i}")))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sink.len(), 4);
    }

    #[test]
    fn null_sink_drops_everything() {
        // Nothing observable; just exercise the path.
        NullSink.warn("k", "m");
    }

    #[test]
    fn tracing_sink_smoke() {
        // No subscriber installed; the event is simply discarded.
        TracingSink.warn("k", "m");
    }

    #[test]
    fn sinks_are_object_safe() {
        let sinks: Vec<Box<dyn DiagnosticSink>> = vec![
            Box::new(MemorySink::new()),
            Box::new(NullSink),
            Box::new(TracingSink),
        ];
        for s in &sinks {
            s.warn("p", "m");
        }
    }
}
