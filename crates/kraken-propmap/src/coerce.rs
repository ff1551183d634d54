// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort coercion from untyped bag values to declared field types.

use crate::diagnostic::Diagnostic;
use kraken_schema::{FieldDescriptor, TypeKind};
use kraken_value::Value;

/// Coerces `value` to the field's declared [`TypeKind`].
///
/// On success the returned [`Value`] matches what the field's setter
/// expects (enumeration fields receive the matched variant index as
/// [`Value::Int`]). On failure the target must stay untouched; the returned
/// [`Diagnostic`] says why.
///
/// Nulls never assign to non-opaque fields: an absent value must not
/// default-reset target state.
pub(crate) fn coerce(value: &Value, field: &FieldDescriptor) -> Result<Value, Diagnostic> {
    if value.is_null() && field.kind != TypeKind::Opaque {
        return Err(Diagnostic::coercion_failed(
            &field.name,
            format!("null value cannot assign to {} field", field.kind),
        ));
    }

    match field.kind {
        TypeKind::Str => match value {
            Value::Str(_) => Ok(value.clone()),
            other => Err(mismatch(field, other)),
        },
        TypeKind::Int => match value {
            Value::Int(_) => Ok(value.clone()),
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| parse_failure(field, s)),
            other => Err(mismatch(field, other)),
        },
        TypeKind::Float => match value {
            Value::Float(_) => Ok(value.clone()),
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| parse_failure(field, s)),
            other => Err(mismatch(field, other)),
        },
        TypeKind::Bool => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(parse_failure(field, s)),
            },
            other => Err(mismatch(field, other)),
        },
        TypeKind::Enum => match value {
            Value::Str(s) => field
                .variants
                .iter()
                .position(|v| v.eq_ignore_ascii_case(s))
                .map(|i| Value::Int(i as i64))
                .ok_or_else(|| {
                    Diagnostic::enum_not_found(
                        &field.name,
                        format!(
                            "no variant matching '{s}' (expected one of {})",
                            field.variants.join(", ")
                        ),
                    )
                }),
            other => Err(mismatch(field, other)),
        },
        TypeKind::Opaque => Ok(value.clone()),
    }
}

fn mismatch(field: &FieldDescriptor, value: &Value) -> Diagnostic {
    Diagnostic::coercion_failed(
        &field.name,
        format!("expected {}, got {}", field.kind, value.kind()),
    )
}

fn parse_failure(field: &FieldDescriptor, raw: &str) -> Diagnostic {
    Diagnostic::coercion_failed(
        &field.name,
        format!("'{raw}' does not parse as {}", field.kind),
    )
}
