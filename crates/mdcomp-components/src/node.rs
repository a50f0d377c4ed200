//! Document tree produced by the tag scanner.

/// Raw attributes of a tag in source order.
///
/// Keys are unique. Inserting an existing key replaces its value but keeps
/// the position of the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.0.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    /// Get a value by exact key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (key, value) in iter {
            attrs.insert(key, value);
        }
        attrs
    }
}

const PLACEHOLDER_PREFIX: &str = "<!--mdcomp-component-";
const PLACEHOLDER_SUFFIX: &str = "-->";

/// A run of ordinary markdown lines, kept verbatim.
///
/// Components nested in a block quote or list item stay inside the run: their
/// lines are replaced by a placeholder comment after the container markers,
/// and the node itself is kept in `embedded`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownBlock {
    /// 1-based line of the first line in the run.
    pub line: usize,
    /// Source lines, each terminated by `\n`.
    pub text: String,
    /// Components referenced by placeholders in `text`, in order.
    pub embedded: Vec<ComponentNode>,
}

impl MarkdownBlock {
    pub(crate) fn new(line: usize) -> Self {
        Self {
            line,
            ..Self::default()
        }
    }

    pub(crate) fn push_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    /// Append a placeholder line for `node` after the container `prefix`.
    pub(crate) fn push_embedded(&mut self, prefix: &str, node: ComponentNode) {
        let index = self.embedded.len();
        self.push_line(&format!(
            "{prefix}{PLACEHOLDER_PREFIX}{index}{PLACEHOLDER_SUFFIX}"
        ));
        self.embedded.push(node);
    }

    /// The embedded component an HTML block stands for, if it is a
    /// placeholder.
    #[must_use]
    pub fn embedded_for(&self, html: &str) -> Option<&ComponentNode> {
        let index = html
            .trim()
            .strip_prefix(PLACEHOLDER_PREFIX)?
            .strip_suffix(PLACEHOLDER_SUFFIX)?;
        self.embedded.get(index.parse::<usize>().ok()?)
    }

    /// Whether the run holds only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Source line of a byte offset within `text`.
    #[must_use]
    pub fn line_at(&self, offset: usize) -> usize {
        let offset = offset.min(self.text.len());
        self.line + self.text.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count()
    }
}

/// A component tag in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNode {
    /// Tag name as written.
    pub name: String,
    pub attributes: Attributes,
    /// Self-closing nodes never have children.
    pub self_closing: bool,
    pub children: Vec<Node>,
    /// 1-based line of the opening tag.
    pub line: usize,
}

impl ComponentNode {
    /// A self-closing node: `<Name ... />`.
    pub fn leaf(name: impl Into<String>, attributes: Attributes, line: usize) -> Self {
        Self {
            name: name.into(),
            attributes,
            self_closing: true,
            children: Vec::new(),
            line,
        }
    }

    /// A container node: `<Name ...>` ... `</Name>`.
    pub fn container(name: impl Into<String>, attributes: Attributes, line: usize) -> Self {
        Self {
            name: name.into(),
            attributes,
            self_closing: false,
            children: Vec::new(),
            line,
        }
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Markdown(MarkdownBlock),
    Component(ComponentNode),
}

impl Node {
    /// Whether the node contributes nothing but whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Markdown(block) => block.is_blank(),
            Self::Component(_) => false,
        }
    }
}
