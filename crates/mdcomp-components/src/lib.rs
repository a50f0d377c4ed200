//! Component tags for markdown.
//!
//! Documents may contain upper-case HTML-like tags (`<Alert type="info">`)
//! that are rendered by registered components instead of the markdown engine.
//!
//! # Architecture
//!
//! - [`scan`]: line-oriented scanner producing a [`Node`] tree of markdown runs
//!   and component nodes
//! - [`bind`]: coerces tag attributes to the typed parameters of a
//!   [`ComponentSchema`]
//! - [`partition`]: splits a node's children between named and default slots
//! - [`ComponentRenderer`]: walks the tree, renders markdown runs with
//!   [`mdcomp_renderer::MarkdownRenderer`] and invokes components through a
//!   [`ComponentHost`]
//!
//! Components run on a [`DispatchHost`] thread. Tags that are not registered,
//! or whose component fails, fall back to literal lower-cased tags so the
//! document always renders.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mdcomp_components::{
//!     ComponentRenderer, ComponentSchema, ComponentSet, HostConfig, ParamSpec, TemplateComponent,
//! };
//!
//! let alert = TemplateComponent::compile(
//!     ComponentSchema::new("Alert").with_param(ParamSpec::default_slot("content")),
//!     r#"<div class="alert">{{{content}}}</div>"#,
//! )
//! .unwrap();
//! let (registry, host) = ComponentSet::new()
//!     .with(alert)
//!     .build(HostConfig::default())
//!     .unwrap();
//!
//! let renderer = ComponentRenderer::new(Arc::new(registry), host);
//! let output = renderer.render("<Alert>\nHello **world**\n</Alert>\n");
//! assert!(output.html.contains("<strong>world</strong>"));
//! ```

mod attrs;
mod binder;
mod block;
mod error;
mod fence;
mod host;
mod inline;
mod inventory;
mod node;
mod pipeline;
mod registry;
mod scanner;
mod schema;
mod setup;
mod slots;
mod template;

pub use attrs::parse_attributes;
pub use binder::{Binding, CoercionFailure, ParamValue, bind};
pub use error::{ComponentError, SetupError};
pub use host::{
    Component, ComponentHost, DispatchHost, HostConfig, HostScope, Invocation, RenderScope,
};
pub use inline::{inline_components, recognize as recognize_inline};
pub use inventory::{TagUse, collect_tags};
pub use node::{Attributes, ComponentNode, MarkdownBlock, Node};
pub use pipeline::{ComponentRenderer, RenderOutput};
pub use registry::ComponentRegistry;
pub use scanner::{ScanResult, is_component_name, scan};
pub use schema::{ComponentSchema, ParamKind, ParamSpec, ParamType, SchemaError};
pub use setup::ComponentSet;
pub use slots::{Partition, partition};
pub use template::{TemplateComponent, TemplateError};
