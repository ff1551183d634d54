// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # kraken
//!
//! Facade over the Kraken property mapping crates.
//!
//! Re-exports the full public surface: the untyped [`Value`] /
//! [`PropertyBag`] side, the statically declared [`Schema`] side, the
//! [`PropertyMap`] configuration plus [`import`] engine, and the
//! diagnostic sinks.

pub use kraken_propmap::{
    Diagnostic, DiagnosticKind, ImportReport, PropertyMap, import, import_default,
};
pub use kraken_schema::{
    Field, FieldDescriptor, IncludeAll, IncludeFilter, Schema, SchemaBuilder, SchemaError,
    TypeKind,
};
pub use kraken_trace::{DiagnosticSink, MemorySink, NullSink, TracingSink};
pub use kraken_value::{PropertyBag, SourceError, Value, ValueKind};
