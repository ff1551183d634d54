// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # kraken-propmap
//!
//! Property mapping engine: populate a typed target from an untyped bag,
//! recording non-fatal mismatches as diagnostics.

mod coerce;
mod diagnostic;

pub use diagnostic::{Diagnostic, DiagnosticKind};

use coerce::coerce;
use kraken_schema::{IncludeAll, IncludeFilter, Schema};
use kraken_trace::DiagnosticSink;
use kraken_value::PropertyBag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

// ── PropertyMap ─────────────────────────────────────────────────────────

/// Mutable configuration and working state for mapping operations.
///
/// Holds the explicit key renames, the include filter, the optional live
/// diagnostic sink, and the accumulated diagnostics. A map is cheap to
/// build per operation; reusing one across sequential imports opts into
/// batch accumulation: [`PropertyMap::messages`] keeps growing until
/// [`PropertyMap::clear_messages`] or [`PropertyMap::take_messages`] is
/// called, while each [`import`] call still returns its own fresh
/// [`ImportReport`].
///
/// Not intended for concurrent imports against the same instance; give
/// each concurrent operation its own map. Filters and sinks are
/// `Send + Sync`, so one instance of those may back many maps.
pub struct PropertyMap {
    renames: BTreeMap<String, String>,
    filter: Arc<dyn IncludeFilter>,
    sink: Option<Arc<dyn DiagnosticSink>>,
    messages: Vec<Diagnostic>,
}

impl Default for PropertyMap {
    fn default() -> Self {
        Self {
            renames: BTreeMap::new(),
            filter: Arc::new(IncludeAll),
            sink: None,
            messages: Vec::new(),
        }
    }
}

impl PropertyMap {
    /// Creates a map with no renames, an always-true filter, and no sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directs a source key to a differently named target field.
    ///
    /// Later renames for the same source key replace earlier ones.
    #[must_use]
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    /// Bulk registration of renames.
    #[must_use]
    pub fn with_renames<K, V>(mut self, renames: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (from, to) in renames {
            self.renames.insert(from.into(), to.into());
        }
        self
    }

    /// Installs an include filter deciding per-field eligibility.
    #[must_use]
    pub fn with_include(mut self, filter: impl IncludeFilter + 'static) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    /// Installs a live diagnostic sink.
    ///
    /// Without a sink, diagnostics are retained only in
    /// [`PropertyMap::messages`] and the per-call [`ImportReport`].
    #[must_use]
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Diagnostics accumulated across all imports since the last clear.
    #[must_use]
    pub fn messages(&self) -> &[Diagnostic] {
        &self.messages
    }

    /// Discards the accumulated diagnostics.
    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    /// Takes the accumulated diagnostics, leaving the map empty.
    pub fn take_messages(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.messages)
    }

    /// Effective target name for a source key: the registered rename, or
    /// the key verbatim.
    #[must_use]
    pub fn effective_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.renames.get(key).map_or(key, String::as_str)
    }

    fn record(&mut self, report: &mut ImportReport, diagnostic: Diagnostic) {
        if let Some(sink) = &self.sink {
            sink.warn(&diagnostic.property, &diagnostic.to_string());
        }
        report.diagnostics.push(diagnostic.clone());
        self.messages.push(diagnostic);
    }
}

impl fmt::Debug for PropertyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMap")
            .field("renames", &self.renames)
            .field("has_sink", &self.sink.is_some())
            .field("messages", &self.messages)
            .finish_non_exhaustive()
    }
}

// ── ImportReport ────────────────────────────────────────────────────────

/// Per-call outcome of an [`import`].
///
/// Always fresh: diagnostics here cover this call only, regardless of what
/// the map has accumulated from earlier calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Number of fields successfully assigned.
    pub applied: usize,
    /// Number of keys skipped by the include filter (intentional, not failures).
    pub excluded: usize,
    /// Diagnostics recorded during this call, in processing order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ImportReport {
    /// Returns `true` when every source key either applied or was
    /// intentionally excluded — the strict-caller check.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Total number of source keys this call processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.applied + self.excluded + self.diagnostics.len()
    }

    /// One-line human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_clean() {
            format!(
                "clean import: {} applied, {} excluded",
                self.applied, self.excluded
            )
        } else {
            format!(
                "partial import: {} applied, {} excluded, {} diagnostics",
                self.applied,
                self.excluded,
                self.diagnostics.len()
            )
        }
    }
}

// ── Import ──────────────────────────────────────────────────────────────

/// Populates `target` from `bag` according to `schema` and `map`.
///
/// One synchronous pass over the bag; per key:
///
/// 1. resolve the effective field name (rename, else key verbatim);
/// 2. look up the field case-insensitively — a miss records an
///    unrecognized-property diagnostic and moves on;
/// 3. consult the include filter — an excluded field is skipped silently;
/// 4. coerce the value to the declared type — failure records a diagnostic
///    and leaves the field at its prior value;
/// 5. assign through the field's setter.
///
/// The pass never aborts. When two keys resolve to the same field, the
/// later one (in bag iteration order) wins.
pub fn import<T>(
    bag: &PropertyBag,
    target: &mut T,
    schema: &Schema<T>,
    map: &mut PropertyMap,
) -> ImportReport {
    let mut report = ImportReport::default();

    for (key, value) in bag.iter() {
        let effective = map.effective_name(key).to_owned();
        let Some(field) = schema.resolve(&effective) else {
            map.record(&mut report, Diagnostic::unrecognized(key));
            continue;
        };

        if !map.filter.is_included(field.descriptor()) {
            report.excluded += 1;
            continue;
        }

        match coerce(value, field.descriptor()) {
            Ok(coerced) => match field.assign(target, coerced) {
                Ok(()) => report.applied += 1,
                Err(reason) => {
                    map.record(&mut report, Diagnostic::coercion_failed(field.name(), reason));
                }
            },
            Err(diagnostic) => map.record(&mut report, diagnostic),
        }
    }

    report
}

/// [`import`] with a throwaway default [`PropertyMap`] (no renames,
/// always-true filter, no sink).
pub fn import_default<T>(bag: &PropertyBag, target: &mut T, schema: &Schema<T>) -> ImportReport {
    let mut map = PropertyMap::new();
    import(bag, target, schema, &mut map)
}

// ── Tests ───────────────────────────────────────────────────────────────
