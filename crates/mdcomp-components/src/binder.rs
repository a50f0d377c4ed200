//! Attribute to parameter binding.

use std::collections::HashMap;
use std::fmt;

use crate::node::Attributes;
use crate::schema::{ComponentSchema, ParamKind, ParamType};

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Float(f64),
    /// Attribute text that could not be coerced to the declared type.
    Raw(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Raw(s) => f.write_str(s),
            Self::Integer(n) => n.fmt(f),
            Self::Boolean(b) => b.fmt(f),
            Self::Float(x) => x.fmt(f),
        }
    }
}

/// An attribute whose text did not parse as the declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionFailure {
    pub param: String,
    pub expected: ParamType,
    pub value: String,
}

/// Outcome of binding a tag's attributes to a schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    /// Values keyed by the schema's parameter name.
    pub parameters: HashMap<String, ParamValue>,
    /// Attribute names that match no bindable parameter.
    pub unmatched: Vec<String>,
    pub coercion_failures: Vec<CoercionFailure>,
}

/// Bind raw attributes to the value parameters of `schema`.
///
/// Names match ignoring ASCII case. Slot and read-only parameters are never
/// bound; attributes naming them are reported as unmatched. A value that
/// fails to coerce is passed through as [`ParamValue::Raw`].
///
/// # Example
///
/// ```
/// use mdcomp_components::{Attributes, ComponentSchema, ParamSpec, ParamType, ParamValue, bind};
///
/// let schema = ComponentSchema::new("Counter")
///     .with_param(ParamSpec::value("Start", ParamType::Integer));
/// let attrs: Attributes = [("start", "5")].into_iter().collect();
///
/// let binding = bind(&schema, &attrs);
/// assert_eq!(binding.parameters["Start"], ParamValue::Integer(5));
/// ```
#[must_use]
pub fn bind(schema: &ComponentSchema, attributes: &Attributes) -> Binding {
    let mut binding = Binding::default();

    for (key, raw) in attributes.iter() {
        let Some(param) = schema.bindable_param(key) else {
            binding.unmatched.push(key.to_owned());
            continue;
        };
        let ParamKind::Value(ty) = param.kind else {
            continue;
        };
        let value = coerce(ty, raw).unwrap_or_else(|| {
            binding.coercion_failures.push(CoercionFailure {
                param: param.name.clone(),
                expected: ty,
                value: raw.to_owned(),
            });
            ParamValue::Raw(raw.to_owned())
        });
        binding.parameters.insert(param.name.clone(), value);
    }

    binding
}

fn coerce(ty: ParamType, raw: &str) -> Option<ParamValue> {
    match ty {
        ParamType::String => Some(ParamValue::String(raw.to_owned())),
        ParamType::Integer => raw.trim().parse().ok().map(ParamValue::Integer),
        ParamType::Boolean => {
            let raw = raw.trim();
            if raw.eq_ignore_ascii_case("true") {
                Some(ParamValue::Boolean(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Some(ParamValue::Boolean(false))
            } else {
                None
            }
        }
        ParamType::Float => raw.trim().parse().ok().map(ParamValue::Float),
    }
}
