//! Link reference definitions shared between markdown runs.
//!
//! A document rendered in several pieces still has one set of
//! `[label]: destination "title"` definitions. They are collected from every
//! piece up front and resolved through the parser's broken link callback,
//! which only fires for references a piece does not define itself.

use std::collections::HashMap;

use pulldown_cmark::{Options, Parser};

/// Destination and title of a link reference definition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkTarget {
    pub dest: String,
    /// Empty when the definition has no title.
    pub title: String,
}

/// Link reference definitions keyed by normalized label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkReferences {
    targets: HashMap<String, LinkTarget>,
}

impl LinkReferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the definitions found in `markdown`.
    ///
    /// The first definition of a label wins, also across calls.
    pub fn collect(&mut self, markdown: &str, options: Options) {
        let parser = Parser::new_ext(markdown, options);
        for (label, def) in parser.reference_definitions().iter() {
            self.targets
                .entry(normalize_label(label))
                .or_insert_with(|| LinkTarget {
                    dest: def.dest.to_string(),
                    title: def.title.as_deref().unwrap_or_default().to_owned(),
                });
        }
    }

    /// Look up a label as written in a reference link.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&LinkTarget> {
        self.targets.get(&normalize_label(label))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Case-fold a label and collapse its inner whitespace.
fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
