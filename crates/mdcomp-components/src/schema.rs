//! Statically declared parameter schemas.
//!
//! A [`ComponentSchema`] lists every parameter a component accepts. Value
//! parameters receive coerced attribute values; slot parameters receive
//! rendered child markup.

use std::fmt;

/// Scalar type of a value parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
    Float,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Float => "float",
        })
    }
}

/// What a parameter receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// A scalar bound from an attribute.
    Value(ParamType),
    /// Child content that is not wrapped in a named slot.
    DefaultSlot,
    /// Children of a wrapper element named after the parameter.
    NamedSlot,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(ty) => ty.fmt(f),
            Self::DefaultSlot => f.write_str("default-slot"),
            Self::NamedSlot => f.write_str("named-slot"),
        }
    }
}

/// A single declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    /// Read-only parameters are declared but never bound from attributes.
    pub read_only: bool,
}

impl ParamSpec {
    /// Declare a value parameter.
    pub fn value(name: impl Into<String>, ty: ParamType) -> Self {
        Self::new(name, ParamKind::Value(ty))
    }

    /// Declare the default slot.
    pub fn default_slot(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::DefaultSlot)
    }

    /// Declare a named slot.
    pub fn named_slot(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::NamedSlot)
    }

    fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            read_only: false,
        }
    }

    /// Mark the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the parameter as read-only.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Whether the parameter receives child content.
    pub fn is_slot(&self) -> bool {
        matches!(self.kind, ParamKind::DefaultSlot | ParamKind::NamedSlot)
    }

    /// Whether an attribute with this name can be bound to the parameter.
    pub fn is_bindable(&self) -> bool {
        !self.read_only && !self.is_slot()
    }

    /// ASCII case-insensitive name comparison.
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Invalid schema declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("component {component} declares parameter '{param}' more than once")]
    DuplicateParameter { component: String, param: String },
    #[error("component {0} declares more than one default slot")]
    MultipleDefaultSlots(String),
}

/// Parameter schema of a component type.
///
/// # Example
///
/// ```
/// use mdcomp_components::{ComponentSchema, ParamSpec, ParamType};
///
/// let schema = ComponentSchema::new("Card")
///     .with_param(ParamSpec::value("title", ParamType::String).required())
///     .with_param(ParamSpec::named_slot("Header"))
///     .with_param(ParamSpec::default_slot("ChildContent"));
///
/// assert!(schema.has_default_slot());
/// assert_eq!(schema.param("TITLE").map(|p| p.name.as_str()), Some("title"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSchema {
    type_name: String,
    params: Vec<ParamSpec>,
}

impl ComponentSchema {
    /// Create an empty schema for the given component type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            params: Vec::new(),
        }
    }

    /// Add a parameter declaration.
    #[must_use]
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Check the declaration for duplicate names and multiple default slots.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (idx, param) in self.params.iter().enumerate() {
            if self.params[..idx].iter().any(|p| p.matches(&param.name)) {
                return Err(SchemaError::DuplicateParameter {
                    component: self.type_name.clone(),
                    param: param.name.clone(),
                });
            }
        }
        let default_slots = self
            .params
            .iter()
            .filter(|p| p.kind == ParamKind::DefaultSlot)
            .count();
        if default_slots > 1 {
            return Err(SchemaError::MultipleDefaultSlots(self.type_name.clone()));
        }
        Ok(())
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Find a parameter by name, ignoring ASCII case.
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.matches(name))
    }

    /// Find a parameter that an attribute of this name binds to.
    pub fn bindable_param(&self, name: &str) -> Option<&ParamSpec> {
        self.param(name).filter(|p| p.is_bindable())
    }

    /// Find a named slot by wrapper element name, ignoring ASCII case.
    pub fn named_slot(&self, name: &str) -> Option<&ParamSpec> {
        self.param(name).filter(|p| p.kind == ParamKind::NamedSlot)
    }

    pub fn named_slots(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|p| p.kind == ParamKind::NamedSlot)
    }

    pub fn default_slot(&self) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.kind == ParamKind::DefaultSlot)
    }

    pub fn has_default_slot(&self) -> bool {
        self.default_slot().is_some()
    }

    /// Required value parameters.
    pub fn required_values(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|p| p.required && !p.is_slot())
    }
}
