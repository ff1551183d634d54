// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # kraken-schema
//!
//! Statically declared field tables for Kraken mapping targets.

use kraken_value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ── Errors ──────────────────────────────────────────────────────────────

/// Errors raised while building a [`Schema`].
///
/// These are programming errors in the target declaration, not data-quality
/// issues; they are the fatal class of the mapper's error taxonomy.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    /// Two fields collide under case-insensitive name resolution.
    #[error("duplicate field name: `{name}`")]
    DuplicateField {
        /// The colliding field name (as registered second).
        name: String,
    },
    /// An enumeration field declared no variants.
    #[error("enumeration field `{name}` has no variants")]
    EmptyEnum {
        /// Name of the offending field.
        name: String,
    },
}

// ── TypeKind ────────────────────────────────────────────────────────────

/// Declared type of a target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// UTF-8 string.
    Str,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean.
    Bool,
    /// Closed set of named variants, matched case-insensitively.
    Enum,
    /// Structured payload assigned verbatim; the setter may still reject it.
    Opaque,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Enum => "enum",
            Self::Opaque => "opaque",
        };
        f.write_str(s)
    }
}

// ── FieldDescriptor ─────────────────────────────────────────────────────

/// Metadata describing one settable field of a mapping target.
///
/// This is the view an [`IncludeFilter`] sees: the name, the declared
/// [`TypeKind`], enumeration variants (for [`TypeKind::Enum`] only), and
/// free-form string tags standing in for attributes (e.g. a `"sensitive"`
/// tag a filter can key off).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, resolved case-insensitively during mapping.
    pub name: String,
    /// Declared type.
    pub kind: TypeKind,
    /// Variant names; non-empty only for [`TypeKind::Enum`].
    pub variants: Vec<String>,
    /// Associated metadata tags (deterministic ordering).
    pub tags: BTreeMap<String, String>,
}

impl FieldDescriptor {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            variants: Vec::new(),
            tags: BTreeMap::new(),
        }
    }

    /// Returns `true` if the descriptor carries the given tag key.
    #[must_use]
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }
}

// ── IncludeFilter ───────────────────────────────────────────────────────

/// Capability interface letting a caller opt fields out of mapping.
///
/// Evaluated once per candidate field per import; must be pure enough to
/// call repeatedly. One filter instance may back many concurrent mapping
/// operations, hence the `Send + Sync` bound.
pub trait IncludeFilter: Send + Sync {
    /// Returns `true` if the field is eligible for assignment.
    fn is_included(&self, field: &FieldDescriptor) -> bool;
}

impl<F> IncludeFilter for F
where
    F: Fn(&FieldDescriptor) -> bool + Send + Sync,
{
    fn is_included(&self, field: &FieldDescriptor) -> bool {
        self(field)
    }
}

/// The default filter: every field is eligible.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl IncludeFilter for IncludeAll {
    fn is_included(&self, _field: &FieldDescriptor) -> bool {
        true
    }
}

// ── Field ───────────────────────────────────────────────────────────────

type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<(), String> + Send + Sync>;

/// A descriptor paired with the setter that writes the coerced value.
pub struct Field<T> {
    descriptor: FieldDescriptor,
    setter: Setter<T>,
}

impl<T> Field<T> {
    /// The field's metadata.
    #[must_use]
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    /// Shorthand for the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Shorthand for the declared type.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.descriptor.kind
    }

    /// Writes an already-coerced value into the target.
    ///
    /// The value must match the declared [`TypeKind`]; enumeration fields
    /// receive the matched variant index as [`Value::Int`]. An `Err` means
    /// the assignment was rejected at runtime (opaque setters may reject
    /// payloads they cannot hold) and the target was left untouched.
    pub fn assign(&self, target: &mut T, value: Value) -> Result<(), String> {
        (self.setter)(target, value)
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

// ── Schema ──────────────────────────────────────────────────────────────

/// The statically declared settable surface of a mapping target type.
///
/// Field order is registration order; names are unique under
/// case-insensitive comparison (enforced by [`SchemaBuilder::build`]).
pub struct Schema<T> {
    fields: Vec<Field<T>>,
}

impl<T> Schema<T> {
    /// Starts declaring a schema.
    #[must_use]
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder { fields: Vec::new() }
    }

    /// Iterates fields in registration order.
    pub fn fields(&self) -> impl Iterator<Item = &Field<T>> {
        self.fields.iter()
    }

    /// Case-insensitive field lookup.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Field<T>> {
        self.fields
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("fields", &self.fields).finish()
    }
}

// ── SchemaBuilder ───────────────────────────────────────────────────────

/// Fluent builder for a [`Schema`].
///
/// Each registration method takes the field name and a plain setter for the
/// already-coerced value; coercion from untyped bag values is the mapper's
/// job, not the setter's.
pub struct SchemaBuilder<T> {
    fields: Vec<Field<T>>,
}

impl<T> SchemaBuilder<T> {
    fn push(mut self, descriptor: FieldDescriptor, setter: Setter<T>) -> Self {
        self.fields.push(Field { descriptor, setter });
        self
    }

    /// Declares a string field.
    #[must_use]
    pub fn string(
        self,
        name: impl Into<String>,
        set: impl Fn(&mut T, String) + Send + Sync + 'static,
    ) -> Self {
        let descriptor = FieldDescriptor::new(name, TypeKind::Str);
        self.push(
            descriptor,
            Box::new(move |target, value| match value {
                Value::Str(s) => {
                    set(target, s);
                    Ok(())
                }
                other => Err(format!("expected str, got {}", other.kind())),
            }),
        )
    }

    /// Declares a 64-bit integer field.
    #[must_use]
    pub fn integer(
        self,
        name: impl Into<String>,
        set: impl Fn(&mut T, i64) + Send + Sync + 'static,
    ) -> Self {
        let descriptor = FieldDescriptor::new(name, TypeKind::Int);
        self.push(
            descriptor,
            Box::new(move |target, value| match value {
                Value::Int(i) => {
                    set(target, i);
                    Ok(())
                }
                other => Err(format!("expected int, got {}", other.kind())),
            }),
        )
    }

    /// Declares a float field.
    #[must_use]
    pub fn float(
        self,
        name: impl Into<String>,
        set: impl Fn(&mut T, f64) + Send + Sync + 'static,
    ) -> Self {
        let descriptor = FieldDescriptor::new(name, TypeKind::Float);
        self.push(
            descriptor,
            Box::new(move |target, value| match value {
                Value::Float(x) => {
                    set(target, x);
                    Ok(())
                }
                other => Err(format!("expected float, got {}", other.kind())),
            }),
        )
    }

    /// Declares a boolean field.
    #[must_use]
    pub fn boolean(
        self,
        name: impl Into<String>,
        set: impl Fn(&mut T, bool) + Send + Sync + 'static,
    ) -> Self {
        let descriptor = FieldDescriptor::new(name, TypeKind::Bool);
        self.push(
            descriptor,
            Box::new(move |target, value| match value {
                Value::Bool(b) => {
                    set(target, b);
                    Ok(())
                }
                other => Err(format!("expected bool, got {}", other.kind())),
            }),
        )
    }

    /// Declares an enumeration field over a closed set of variant names.
    ///
    /// The setter receives the index of the matched variant within
    /// `variants`; name matching (case-insensitive) happens in the mapper.
    #[must_use]
    pub fn enumeration(
        self,
        name: impl Into<String>,
        variants: &[&str],
        set: impl Fn(&mut T, usize) + Send + Sync + 'static,
    ) -> Self {
        let mut descriptor = FieldDescriptor::new(name, TypeKind::Enum);
        descriptor.variants = variants.iter().map(|v| (*v).to_owned()).collect();
        self.push(
            descriptor,
            Box::new(move |target, value| match value {
                Value::Int(i) if i >= 0 => {
                    set(target, i as usize);
                    Ok(())
                }
                other => Err(format!("expected variant index, got {}", other.kind())),
            }),
        )
    }

    /// Declares an opaque field receiving the source value verbatim.
    ///
    /// The setter may reject the payload by returning `Err` with a
    /// human-readable reason; the mapper records that as a coercion
    /// failure and leaves the field untouched.
    #[must_use]
    pub fn opaque(
        self,
        name: impl Into<String>,
        set: impl Fn(&mut T, Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        let descriptor = FieldDescriptor::new(name, TypeKind::Opaque);
        self.push(descriptor, Box::new(set))
    }

    /// Attaches a metadata tag to the most recently declared field.
    ///
    /// No-op when no field has been declared yet.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.descriptor.tags.insert(key.into(), value.into());
        }
        self
    }

    /// Validates the declared table and produces the [`Schema`].
    pub fn build(self) -> Result<Schema<T>, SchemaError> {
        for (i, field) in self.fields.iter().enumerate() {
            if field.kind() == TypeKind::Enum && field.descriptor.variants.is_empty() {
                return Err(SchemaError::EmptyEnum {
                    name: field.name().to_owned(),
                });
            }
            if self.fields[..i]
                .iter()
                .any(|prior| prior.name().eq_ignore_ascii_case(field.name()))
            {
                return Err(SchemaError::DuplicateField {
                    name: field.name().to_owned(),
                });
            }
        }
        Ok(Schema {
            fields: self.fields,
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Widget {
        name: String,
        count: i64,
        ratio: f64,
        enabled: bool,
        color: usize,
        extra: Option<Value>,
    }

    fn widget_schema() -> Schema<Widget> {
        Schema::builder()
            .string("Name", |w: &mut Widget, v| w.name = v)
            .integer("Count", |w: &mut Widget, v| w.count = v)
            .float("Ratio", |w: &mut Widget, v| w.ratio = v)
            .boolean("Enabled", |w: &mut Widget, v| w.enabled = v)
            .enumeration("Color", &["Red", "Green", "Blue"], |w: &mut Widget, i| {
                w.color = i
            })
            .opaque("Extra", |w: &mut Widget, v| {
                w.extra = Some(v);
                Ok(())
            })
            .build()
            .unwrap()
    }

    // ── Builder & resolution ────────────────────────────────────────────

    #[test]
    fn build_and_resolve() {
        let schema = widget_schema();
        assert_eq!(schema.len(), 6);
        assert!(!schema.is_empty());
        assert!(schema.resolve("Name").is_some());
        assert!(schema.resolve("missing").is_none());
    }

    #[test]
    fn resolution_is_case_insensitive() {
        let schema = widget_schema();
        let field = schema.resolve("nAmE").unwrap();
        assert_eq!(field.name(), "Name");
        assert_eq!(field.kind(), TypeKind::Str);
    }

    #[test]
    fn fields_keep_registration_order() {
        let schema = widget_schema();
        let names: Vec<_> = schema.fields().map(Field::name).collect();
        assert_eq!(names, ["Name", "Count", "Ratio", "Enabled", "Color", "Extra"]);
    }

    #[test]
    fn duplicate_field_rejected() {
        let err = Schema::builder()
            .string("Name", |_: &mut Widget, _| {})
            .integer("name", |_: &mut Widget, _| {})
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateField { name: "name".into() });
    }

    #[test]
    fn empty_enum_rejected() {
        let err = Schema::builder()
            .enumeration("Color", &[], |_: &mut Widget, _| {})
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::EmptyEnum { name: "Color".into() });
    }

    #[test]
    fn empty_schema_builds() {
        let schema = Schema::<Widget>::builder().build().unwrap();
        assert!(schema.is_empty());
    }

    // ── Assignment ──────────────────────────────────────────────────────

    #[test]
    fn setters_write_matching_values() {
        let schema = widget_schema();
        let mut w = Widget::default();
        schema
            .resolve("Name")
            .unwrap()
            .assign(&mut w, Value::from("box"))
            .unwrap();
        schema
            .resolve("Count")
            .unwrap()
            .assign(&mut w, Value::Int(5))
            .unwrap();
        schema
            .resolve("Color")
            .unwrap()
            .assign(&mut w, Value::Int(2))
            .unwrap();
        assert_eq!(w.name, "box");
        assert_eq!(w.count, 5);
        assert_eq!(w.color, 2);
    }

    #[test]
    fn setters_reject_mismatched_values() {
        let schema = widget_schema();
        let mut w = Widget::default();
        let err = schema
            .resolve("Count")
            .unwrap()
            .assign(&mut w, Value::from("five"))
            .unwrap_err();
        assert!(err.contains("expected int"));
        assert_eq!(w.count, 0, "rejected assignment must not mutate");
    }

    #[test]
    fn opaque_setter_can_reject() {
        let schema = Schema::builder()
            .opaque("Extra", |_: &mut Widget, v| match v {
                Value::Opaque(_) => Ok(()),
                other => Err(format!("only structured payloads, got {}", other.kind())),
            })
            .build()
            .unwrap();
        let mut w = Widget::default();
        let err = schema
            .resolve("Extra")
            .unwrap()
            .assign(&mut w, Value::Int(1))
            .unwrap_err();
        assert!(err.contains("structured"));
    }

    // ── Descriptors, tags, filters ──────────────────────────────────────

    #[test]
    fn enum_descriptor_carries_variants() {
        let schema = widget_schema();
        let d = schema.resolve("Color").unwrap().descriptor();
        assert_eq!(d.kind, TypeKind::Enum);
        assert_eq!(d.variants, ["Red", "Green", "Blue"]);
    }

    #[test]
    fn tags_attach_to_last_field() {
        let schema = Schema::builder()
            .string("Secret", |_: &mut Widget, _| {})
            .tag("sensitive", "true")
            .string("Plain", |_: &mut Widget, _| {})
            .build()
            .unwrap();
        assert!(schema.resolve("Secret").unwrap().descriptor().has_tag("sensitive"));
        assert!(!schema.resolve("Plain").unwrap().descriptor().has_tag("sensitive"));
    }

    #[test]
    fn include_all_includes_everything() {
        let schema = widget_schema();
        for field in schema.fields() {
            assert!(IncludeAll.is_included(field.descriptor()));
        }
    }

    #[test]
    fn closure_filter_via_blanket_impl() {
        let filter = |f: &FieldDescriptor| !f.has_tag("sensitive");
        let schema = Schema::builder()
            .string("Secret", |_: &mut Widget, _| {})
            .tag("sensitive", "true")
            .string("Plain", |_: &mut Widget, _| {})
            .build()
            .unwrap();
        assert!(!filter.is_included(schema.resolve("Secret").unwrap().descriptor()));
        assert!(filter.is_included(schema.resolve("Plain").unwrap().descriptor()));
    }

    #[test]
    fn type_kind_display() {
        assert_eq!(TypeKind::Str.to_string(), "str");
        assert_eq!(TypeKind::Enum.to_string(), "enum");
    }

    #[test]
    fn descriptor_serde_roundtrip() {
        let schema = widget_schema();
        let d = schema.resolve("Color").unwrap().descriptor();
        let s = serde_json::to_string(d).unwrap();
        let back: FieldDescriptor = serde_json::from_str(&s).unwrap();
        assert_eq!(&back, d);
    }

    #[test]
    fn schema_error_display() {
        let e = SchemaError::DuplicateField { name: "x".into() };
        assert!(e.to_string().contains('x'));
        let e = SchemaError::EmptyEnum { name: "Color".into() };
        assert!(e.to_string().contains("Color"));
    }
}
