//! Render pipeline: markdown with component tags to HTML.
//!
//! The document is scanned into a node tree and walked once, depth-first.
//! Markdown runs go through the generic [`MarkdownRenderer`] with inline
//! component tags intercepted; component nodes are bound, their children
//! rendered into slots, and the host invoked. Components nested in block
//! quotes and list items are rendered where their placeholder sits in the
//! run. Link reference definitions are collected from every run first, so a
//! reference resolves wherever its definition appears. Unregistered or failing
//! components degrade to literal lower-cased tags, so a document always
//! renders.

use std::fmt::Write;
use std::sync::Arc;

use mdcomp_renderer::{LinkReferences, MarkdownRenderer, escape_attribute};
use pulldown_cmark::{CowStr, Event, Options};

use crate::binder::bind;
use crate::error::ComponentError;
use crate::host::{ComponentHost, HostScope, Invocation};
use crate::inline;
use crate::node::{ComponentNode, MarkdownBlock, Node};
use crate::registry::ComponentRegistry;
use crate::scanner::scan;
use crate::schema::ComponentSchema;
use crate::slots::partition;

/// Result of rendering a document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderOutput {
    /// Rendered HTML.
    pub html: String,
    /// Warnings from scanning, binding and failed invocations.
    pub warnings: Vec<String>,
}

/// Renders markdown documents containing component tags.
///
/// The registry and host are shared; every call to [`render`](Self::render)
/// opens its own host scope, so one renderer can serve several threads.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use mdcomp_components::{ComponentRenderer, ComponentSet, HostConfig};
///
/// let (registry, host) = ComponentSet::new().build(HostConfig::default()).unwrap();
/// let renderer = ComponentRenderer::new(Arc::new(registry), host);
///
/// let output = renderer.render("<Card title=\"Hi\" />\n");
/// assert!(output.html.contains(r#"<card title="Hi" />"#));
/// ```
pub struct ComponentRenderer<H: ComponentHost> {
    registry: Arc<ComponentRegistry>,
    host: H,
    gfm: bool,
}

impl<H: ComponentHost> ComponentRenderer<H> {
    /// Create a renderer with GFM enabled.
    pub fn new(registry: Arc<ComponentRegistry>, host: H) -> Self {
        Self {
            registry,
            host,
            gfm: true,
        }
    }

    /// Enable or disable GitHub Flavored Markdown in markdown runs.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Scan and render a markdown document.
    pub fn render(&self, markdown: &str) -> RenderOutput {
        let scanned = scan(markdown);
        let mut output = self.render_nodes(&scanned.nodes);
        let mut warnings = scanned.warnings;
        warnings.append(&mut output.warnings);
        output.warnings = warnings;
        output
    }

    /// Render an already scanned node tree.
    pub fn render_nodes(&self, nodes: &[Node]) -> RenderOutput {
        let options = MarkdownRenderer::new().with_gfm(self.gfm).parser_options();
        let mut references = LinkReferences::new();
        collect_references(nodes, options, &mut references);
        tracing::trace!(definitions = references.len(), "Collected link references");

        let mut pass = RenderPass {
            registry: &self.registry,
            scope: self.host.open_scope(),
            gfm: self.gfm,
            references: &references,
            warnings: Vec::new(),
        };
        let html = pass.render_nodes(nodes);
        RenderOutput {
            html,
            warnings: pass.warnings,
        }
    }
}

/// Gather link reference definitions from every markdown run in the tree.
fn collect_references(nodes: &[Node], options: Options, references: &mut LinkReferences) {
    for node in nodes {
        match node {
            Node::Markdown(block) => {
                references.collect(&block.text, options);
                for component in &block.embedded {
                    collect_references(&component.children, options, references);
                }
            }
            Node::Component(component) => {
                collect_references(&component.children, options, references);
            }
        }
    }
}

/// State of one document render.
struct RenderPass<'a> {
    registry: &'a ComponentRegistry,
    scope: Box<dyn HostScope + 'a>,
    gfm: bool,
    references: &'a LinkReferences,
    warnings: Vec<String>,
}

impl RenderPass<'_> {
    fn render_nodes<'n>(&mut self, nodes: impl IntoIterator<Item = &'n Node>) -> String {
        let mut out = String::new();
        for node in nodes {
            match node {
                Node::Markdown(block) => out.push_str(&self.render_markdown(block)),
                Node::Component(component) => {
                    out.push_str(&self.render_component(component));
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
            }
        }
        out
    }

    /// Render a markdown run, replacing inline component tags and
    /// placeholders of embedded components.
    fn render_markdown(&mut self, block: &MarkdownBlock) -> String {
        let mut renderer = MarkdownRenderer::new().with_gfm(self.gfm);
        let references = self.references;
        let events = renderer
            .create_parser_with_references(&block.text, references)
            .into_offset_iter()
            .map(|(event, range)| match event {
                Event::InlineHtml(html) => match inline::recognize(&html, block.line_at(range.start)) {
                    Some(node) => Event::InlineHtml(CowStr::from(self.render_component(&node))),
                    None => Event::InlineHtml(html),
                },
                Event::Html(html) => {
                    let markup = if let Some(node) = block.embedded_for(&html) {
                        Some(self.render_component(node))
                    } else {
                        inline::recognize(&html, block.line_at(range.start))
                            .map(|node| self.render_component(&node))
                    };
                    match markup {
                        Some(mut markup) => {
                            if html.ends_with('\n') && !markup.ends_with('\n') {
                                markup.push('\n');
                            }
                            Event::Html(CowStr::from(markup))
                        }
                        None => Event::Html(html),
                    }
                }
                other => other,
            });
        renderer.render(events)
    }

    fn render_component(&mut self, node: &ComponentNode) -> String {
        let registry = self.registry;
        let Some(schema) = registry.lookup(&node.name) else {
            tracing::debug!(component = %node.name, line = node.line, "Unregistered component tag");
            return self.render_fallback(node);
        };

        match self.invoke(node, schema) {
            Ok(markup) => markup,
            Err(err) => {
                tracing::warn!(
                    component = %node.name,
                    line = node.line,
                    error = %err,
                    "Component invocation failed"
                );
                self.warnings.push(format!(
                    "line {}: failed to render <{}>: {err}",
                    node.line, node.name
                ));
                let mut out = self.render_fallback(node);
                write!(
                    out,
                    "<!-- Error rendering component {}: {} -->",
                    node.name,
                    defang_comment(&err.to_string())
                )
                .unwrap();
                out
            }
        }
    }

    /// Bind, fill slots, check required parameters and call the host.
    fn invoke(
        &mut self,
        node: &ComponentNode,
        schema: &ComponentSchema,
    ) -> Result<String, ComponentError> {
        let binding = bind(schema, &node.attributes);
        for name in &binding.unmatched {
            tracing::debug!(
                component = %node.name,
                attribute = %name,
                "Attribute matches no parameter"
            );
        }
        for failure in &binding.coercion_failures {
            self.warnings.push(format!(
                "line {}: <{}> attribute '{}' is not a valid {} ('{}'); passing it as text",
                node.line, node.name, failure.param, failure.expected, failure.value
            ));
        }

        let mut invocation = Invocation::new(&node.name, schema.type_name());
        invocation.parameters = binding.parameters;

        if !node.self_closing && !node.children.is_empty() {
            let parts = partition(schema, &node.children);
            for (slot, children) in &parts.named {
                let markup = self.render_nodes(children.iter().copied());
                invocation.slots.insert((*slot).to_owned(), markup);
            }
            if schema.has_default_slot() {
                if !parts.default.is_empty() {
                    invocation.default_content = Some(self.render_nodes(parts.default));
                }
            } else if parts.has_default_content() {
                tracing::debug!(component = %node.name, line = node.line, "Dropped child content");
                self.warnings.push(format!(
                    "line {}: <{}> has no default slot; child content dropped",
                    node.line, node.name
                ));
            }
        }

        if let Some(missing) = schema
            .required_values()
            .find(|param| !invocation.parameters.contains_key(&param.name))
        {
            return Err(ComponentError::MissingParameter(missing.name.clone()));
        }

        self.scope.invoke(invocation)
    }

    /// Literal lower-cased tag with the original attributes.
    fn render_fallback(&mut self, node: &ComponentNode) -> String {
        let name = node.name.to_ascii_lowercase();
        let mut out = format!("<{name}");
        for (key, value) in node.attributes.iter() {
            write!(out, r#" {key}="{}""#, escape_attribute(value)).unwrap();
        }
        if node.self_closing {
            out.push_str(" />");
        } else {
            out.push('>');
            out.push_str(&self.render_nodes(&node.children));
            write!(out, "</{name}>").unwrap();
        }
        out
    }
}

/// Keep an error message from terminating its HTML comment early.
fn defang_comment(message: &str) -> String {
    let mut text = message.to_owned();
    while text.contains("--") {
        text = text.replace("--", "- -");
    }
    text
}
