// SPDX-License-Identifier: MIT OR Apache-2.0

//! Non-fatal mapping diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What went wrong for one source key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// No target field matched the key (after renames).
    UnrecognizedProperty,
    /// An enumeration field received a string matching no variant.
    EnumValueNotFound,
    /// The value could not be coerced to the field's declared type.
    CoercionFailed,
}

/// One recorded, non-fatal mapping failure.
///
/// `property` is the effective target field name, except for
/// [`DiagnosticKind::UnrecognizedProperty`] where it is the source key that
/// failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Failure classification.
    pub kind: DiagnosticKind,
    /// Property the failure concerns.
    pub property: String,
    /// Human-readable detail (offending value, expected kind, ...).
    pub detail: String,
}

impl Diagnostic {
    pub(crate) fn unrecognized(key: &str) -> Self {
        Self {
            kind: DiagnosticKind::UnrecognizedProperty,
            property: key.to_owned(),
            detail: String::new(),
        }
    }

    pub(crate) fn enum_not_found(property: &str, detail: String) -> Self {
        Self {
            kind: DiagnosticKind::EnumValueNotFound,
            property: property.to_owned(),
            detail,
        }
    }

    pub(crate) fn coercion_failed(property: &str, detail: String) -> Self {
        Self {
            kind: DiagnosticKind::CoercionFailed,
            property: property.to_owned(),
            detail,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::UnrecognizedProperty => {
                write!(f, "Unrecognized property name: '{}'", self.property)
            }
            DiagnosticKind::EnumValueNotFound => {
                write!(f, "enum value not found for '{}': {}", self.property, self.detail)
            }
            DiagnosticKind::CoercionFailed => {
                write!(f, "cannot coerce value for '{}': {}", self.property, self.detail)
            }
        }
    }
}
