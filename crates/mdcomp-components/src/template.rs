//! Components rendered from string templates.
//!
//! Template syntax:
//!
//! - `{{name}}` inserts the HTML-escaped value of a value parameter (empty if
//!   the attribute was not given)
//! - `{{{name}}}` inserts slot markup, or a value parameter unescaped
//! - `{{@id}}` inserts an id unique within the rendered document
//!
//! Names are matched against the schema ignoring ASCII case.

use std::sync::LazyLock;

use mdcomp_renderer::escape_html;
use regex::Regex;

use crate::error::ComponentError;
use crate::host::{Component, Invocation, RenderScope};
use crate::schema::{ComponentSchema, ParamKind};

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\{\s*([\w-]+)\s*\}\}\}|\{\{\s*(@id|[\w-]+)\s*\}\}")
        .expect("invalid placeholder regex")
});

/// Error compiling a template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("template for {component} references unknown parameter '{name}'")]
    UnknownParameter { component: String, name: String },
    #[error("template for {component} must insert slot '{name}' with triple braces")]
    EscapedSlot { component: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Escaped(String),
    Raw(String),
    DefaultSlot,
    NamedSlot(String),
    Id,
}

/// A component whose markup comes from a compiled template.
///
/// # Example
///
/// ```
/// use mdcomp_components::{ComponentSchema, ParamSpec, ParamType, TemplateComponent};
///
/// let schema = ComponentSchema::new("Alert")
///     .with_param(ParamSpec::value("type", ParamType::String))
///     .with_param(ParamSpec::default_slot("content"));
/// let alert = TemplateComponent::compile(
///     schema,
///     r#"<div class="alert alert-{{type}}">{{{content}}}</div>"#,
/// );
/// assert!(alert.is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct TemplateComponent {
    schema: ComponentSchema,
    segments: Vec<Segment>,
}

impl TemplateComponent {
    /// Compile `template` against `schema`.
    pub fn compile(schema: ComponentSchema, template: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER_RE.captures_iter(template) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Text(template[last..whole.start()].to_owned()));
            }
            last = whole.end();

            let (name, raw) = match (caps.get(1), caps.get(2)) {
                (Some(name), _) => (name.as_str(), true),
                (None, Some(name)) => (name.as_str(), false),
                (None, None) => continue,
            };
            if name == "@id" {
                segments.push(Segment::Id);
                continue;
            }

            let param = schema
                .param(name)
                .ok_or_else(|| TemplateError::UnknownParameter {
                    component: schema.type_name().to_owned(),
                    name: name.to_owned(),
                })?;
            let segment = match (param.kind, raw) {
                (ParamKind::Value(_), false) => Segment::Escaped(param.name.clone()),
                (ParamKind::Value(_), true) => Segment::Raw(param.name.clone()),
                (ParamKind::DefaultSlot, true) => Segment::DefaultSlot,
                (ParamKind::NamedSlot, true) => Segment::NamedSlot(param.name.clone()),
                (ParamKind::DefaultSlot | ParamKind::NamedSlot, false) => {
                    return Err(TemplateError::EscapedSlot {
                        component: schema.type_name().to_owned(),
                        name: param.name.clone(),
                    });
                }
            };
            segments.push(segment);
        }

        if last < template.len() {
            segments.push(Segment::Text(template[last..].to_owned()));
        }

        Ok(Self { schema, segments })
    }
}

impl Component for TemplateComponent {
    fn schema(&self) -> &ComponentSchema {
        &self.schema
    }

    fn render(
        &mut self,
        invocation: &Invocation,
        scope: &mut RenderScope,
    ) -> Result<String, ComponentError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Escaped(name) => {
                    if let Some(value) = invocation.parameter(name) {
                        out.push_str(&escape_html(&value.to_string()));
                    }
                }
                Segment::Raw(name) => {
                    if let Some(value) = invocation.parameter(name) {
                        out.push_str(&value.to_string());
                    }
                }
                Segment::DefaultSlot => {
                    out.push_str(invocation.default_content.as_deref().unwrap_or_default());
                }
                Segment::NamedSlot(name) => out.push_str(invocation.slot(name).unwrap_or_default()),
                Segment::Id => {
                    let prefix = self.schema.type_name().to_ascii_lowercase();
                    out.push_str(&scope.next_id(&prefix));
                }
            }
        }
        Ok(out)
    }
}
