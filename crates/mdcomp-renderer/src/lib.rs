//! Generic markdown to HTML renderer.
//!
//! This crate turns a stream of pulldown-cmark events into HTML. It knows nothing
//! about component tags: the component pipeline in `mdcomp-components` feeds it
//! plain markdown runs and rewrites raw HTML events before they reach it.
//!
//! # Example
//!
//! ```
//! use mdcomp_renderer::MarkdownRenderer;
//!
//! let mut renderer = MarkdownRenderer::new();
//! let html = renderer.render_markdown("# Hello\n\n**Bold** text");
//! assert!(html.contains("<strong>Bold</strong>"));
//! ```

mod escape;
mod references;
mod renderer;
mod state;

pub use escape::{escape_attribute, escape_html};
pub use references::{LinkReferences, LinkTarget};
pub use renderer::MarkdownRenderer;
