//! Block-level tag scanner.
//!
//! Splits a markdown document into a tree of [`Node`]s. Lines holding a
//! component tag become [`ComponentNode`]s; every other line is kept verbatim
//! in [`MarkdownBlock`] runs, so indentation inside a component body is
//! measured against the outer document.
//!
//! Recognized forms, each on a line of its own (at most three columns of
//! indentation):
//!
//! ```text
//! <Name attr="value" />     self-closing
//! <Name attr="value">       opening
//! </Name>                   closing
//! ```
//!
//! An opening or self-closing tag may spread its attributes over several
//! lines until the first line containing `>`.
//!
//! Tags at the start of a block inside a block quote or list item are matched
//! after the container markers. Such a component stays inside its container:
//! it is kept in the enclosing run's `embedded` list, and its body is the
//! following lines of the same container up to the closing tag.

use std::sync::LazyLock;

use regex::Regex;

use crate::attrs::parse_attributes;
use crate::block::{ContainerStack, strip_block_indent};
use crate::fence::FenceTracker;
use crate::node::{ComponentNode, MarkdownBlock, Node};

static SELF_CLOSING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<([A-Z][A-Za-z0-9]*)\s*([^>]*)/>\s*$").expect("invalid self-closing tag regex")
});

static OPENING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<([A-Z][A-Za-z0-9]*)\s*([^>]*)>$").expect("invalid opening tag regex")
});

static CLOSING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^</([A-Z][A-Za-z0-9]*)>\s*$").expect("invalid closing tag regex")
});

/// First line of a tag whose attributes continue on following lines.
static TAG_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<[A-Z][A-Za-z0-9]*(\s[^>]*)?$").expect("invalid tag start regex")
});

/// Whether `name` is a valid component tag name (`[A-Z][A-Za-z0-9]*`).
#[must_use]
pub fn is_component_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase()) && chars.all(|c| c.is_ascii_alphanumeric())
}

/// Result of scanning a document.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Top-level nodes in document order.
    pub nodes: Vec<Node>,
    /// Diagnostics such as unclosed tags.
    pub warnings: Vec<String>,
}

/// Scan a markdown document into a node tree.
///
/// # Example
///
/// ```
/// use mdcomp_components::{Node, scan};
///
/// let result = scan("<Alert kind=\"info\">\nHello\n</Alert>\n");
/// let Node::Component(alert) = &result.nodes[0] else { panic!() };
/// assert_eq!(alert.name, "Alert");
/// assert_eq!(alert.attributes.get("kind"), Some("info"));
/// assert_eq!(alert.children.len(), 1);
/// ```
#[must_use]
pub fn scan(input: &str) -> ScanResult {
    let lines: Vec<&str> = input.lines().collect();
    scan_lines(&lines, 1)
}

/// Scan `lines`, numbering them from `first_line`.
fn scan_lines(lines: &[&str], first_line: usize) -> ScanResult {
    let mut builder = TreeBuilder::default();
    let mut containers = ContainerStack::default();
    let mut fence = FenceTracker::new();
    // Container depth at which the open fence started.
    let mut fence_depth = 0;
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];
        let line_num = first_line + idx;

        let content = containers.continue_line(line);
        if fence.is_open() && containers.depth() < fence_depth {
            fence.reset();
        }
        if fence.is_open() {
            fence.observe(content);
            builder.push_line(line, line_num);
            idx += 1;
            continue;
        }

        let content = containers.open_new(content);
        if fence.observe(content) {
            fence_depth = containers.depth();
            builder.push_line(line, line_num);
            idx += 1;
            continue;
        }

        let Some(indented) = strip_block_indent(content) else {
            builder.push_line(line, line_num);
            idx += 1;
            continue;
        };
        let content = indented.trim_end();

        if containers.depth() > 0 {
            if starts_component_tag(content)
                && let Some((node, consumed, warnings)) =
                    scan_embedded(content, &containers.section(&lines[idx + 1..]), line_num)
            {
                let prefix = &line[..line.len() - indented.len()];
                builder.push_embedded(prefix, node, line_num);
                builder.warnings.extend(warnings);
                idx += consumed + 1;
            } else {
                builder.push_line(line, line_num);
                idx += 1;
            }
            continue;
        }

        if let Some(caps) = CLOSING_RE.captures(content) {
            if !builder.close(&caps[1], line_num) {
                builder.push_line(line, line_num);
            }
            idx += 1;
            continue;
        }

        if let Some(node) = parse_tag(content, line_num) {
            builder.push_node(node);
            idx += 1;
            continue;
        }

        if TAG_START_RE.is_match(content)
            && let Some((node, last)) = parse_multiline_tag(lines, idx, line_num)
        {
            builder.push_node(node);
            idx = last + 1;
            continue;
        }

        builder.push_line(line, line_num);
        idx += 1;
    }

    builder.finish()
}

fn starts_component_tag(text: &str) -> bool {
    text.strip_prefix('<')
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
}

/// Parse a tag starting a block inside a block quote or list item.
///
/// `section` holds the following lines with the container prefixes removed.
/// A container tag takes its body from `section` up to the matching closing
/// tag, and the body is scanned on its own. Returns the node, the number of
/// `section` lines consumed and any warnings.
fn scan_embedded(
    content: &str,
    section: &[&str],
    line_num: usize,
) -> Option<(ComponentNode, usize, Vec<String>)> {
    let mut tag_lines = Vec::with_capacity(section.len() + 1);
    tag_lines.push(content);
    tag_lines.extend_from_slice(section);

    let (mut node, last) = match parse_tag(content, line_num) {
        Some(node) => (node, 0),
        None if TAG_START_RE.is_match(content) => {
            parse_multiline_tag(&tag_lines, 0, line_num)?
        }
        None => return None,
    };
    if node.self_closing {
        return Some((node, last, Vec::new()));
    }

    let body = &tag_lines[last + 1..];
    let (body, consumed, mut warnings) = match find_closing(body, &node.name) {
        Some(close) => (&body[..close], last + close + 1, Vec::new()),
        None => {
            tracing::warn!(component = %node.name, line = node.line, "Unclosed component tag");
            let warning = format!("line {}: <{}> is never closed", node.line, node.name);
            (body, tag_lines.len() - 1, vec![warning])
        }
    };
    let inner = scan_lines(body, line_num + last + 1);
    node.children = inner.nodes;
    warnings.extend(inner.warnings);
    Some((node, consumed, warnings))
}

/// Index of the line closing a container named `name`, skipping nested
/// containers of the same name and fenced code.
fn find_closing(lines: &[&str], name: &str) -> Option<usize> {
    let mut fence = FenceTracker::new();
    let mut depth = 0usize;
    for (idx, line) in lines.iter().enumerate() {
        if fence.observe(line) {
            continue;
        }
        let Some(content) = strip_block_indent(line) else {
            continue;
        };
        let content = content.trim_end();
        if let Some(caps) = CLOSING_RE.captures(content)
            && &caps[1] == name
        {
            if depth == 0 {
                return Some(idx);
            }
            depth -= 1;
        } else if parse_tag(content, 0).is_some_and(|node| !node.self_closing && node.name == name)
        {
            depth += 1;
        }
    }
    None
}

/// Parse a complete self-closing or opening tag.
fn parse_tag(text: &str, line: usize) -> Option<ComponentNode> {
    if let Some(caps) = SELF_CLOSING_RE.captures(text) {
        return Some(ComponentNode::leaf(
            &caps[1],
            parse_attributes(&caps[2]),
            line,
        ));
    }
    OPENING_RE.captures(text).map(|caps| {
        ComponentNode::container(&caps[1], parse_attributes(&caps[2]), line)
    })
}

/// Join a tag spread over several lines, starting at `start` (source line
/// `line`).
///
/// Returns the node and the index of its last line, or `None` if the lines do
/// not form a tag (a blank line or end of input comes first, or the joined
/// text does not match).
fn parse_multiline_tag(
    lines: &[&str],
    start: usize,
    line: usize,
) -> Option<(ComponentNode, usize)> {
    let mut joined = lines[start].trim().to_owned();
    for (idx, next) in lines.iter().enumerate().skip(start + 1) {
        if next.trim().is_empty() {
            return None;
        }
        joined.push('\n');
        joined.push_str(next.trim_end());
        if next.contains('>') {
            return parse_tag(&joined, line).map(|node| (node, idx));
        }
    }
    None
}

/// Assembles the tree while lines are scanned.
#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    /// Open container nodes, innermost last.
    open: Vec<ComponentNode>,
    /// Markdown run collecting lines for the innermost container.
    text: Option<MarkdownBlock>,
    warnings: Vec<String>,
}

impl TreeBuilder {
    fn push_line(&mut self, line: &str, line_num: usize) {
        self.text
            .get_or_insert_with(|| MarkdownBlock::new(line_num))
            .push_line(line);
    }

    fn push_embedded(&mut self, prefix: &str, node: ComponentNode, line_num: usize) {
        self.text
            .get_or_insert_with(|| MarkdownBlock::new(line_num))
            .push_embedded(prefix, node);
    }

    fn push_node(&mut self, node: ComponentNode) {
        self.flush_text();
        if node.self_closing {
            self.append(Node::Component(node));
        } else {
            self.open.push(node);
        }
    }

    /// Close the innermost open node named `name`.
    ///
    /// Nodes opened after it are finalized first and end up as its
    /// descendants. Returns `false` if no open node has that name.
    fn close(&mut self, name: &str, line_num: usize) -> bool {
        let Some(pos) = self.open.iter().rposition(|node| node.name == name) else {
            return false;
        };
        self.flush_text();
        while self.open.len() > pos + 1 {
            if let Some(node) = self.open.pop() {
                let warning = format!(
                    "line {}: <{}> is not closed before </{name}> on line {line_num}",
                    node.line, node.name
                );
                tracing::warn!(
                    component = %node.name,
                    line = node.line,
                    "Implicitly closed component tag"
                );
                self.warnings.push(warning);
                self.append(Node::Component(node));
            }
        }
        if let Some(node) = self.open.pop() {
            self.append(Node::Component(node));
        }
        true
    }

    fn flush_text(&mut self) {
        if let Some(block) = self.text.take() {
            self.append(Node::Markdown(block));
        }
    }

    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn finish(mut self) -> ScanResult {
        self.flush_text();
        while let Some(node) = self.open.pop() {
            tracing::warn!(component = %node.name, line = node.line, "Unclosed component tag");
            self.warnings.push(format!(
                "line {}: <{}> is never closed",
                node.line, node.name
            ));
            self.append(Node::Component(node));
        }
        ScanResult {
            nodes: self.root,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::node::Attributes;

    fn md(line: usize, text: &str) -> Node {
        Node::Markdown(MarkdownBlock {
            line,
            text: text.to_owned(),
            ..Default::default()
        })
    }

    fn leaf(name: &str, attrs: &[(&str, &str)], line: usize) -> Node {
        Node::Component(ComponentNode::leaf(
            name,
            attrs.iter().copied().collect(),
            line,
        ))
    }

    fn container(name: &str, line: usize, children: Vec<Node>) -> Node {
        let mut node = ComponentNode::container(name, Attributes::new(), line);
        node.children = children;
        Node::Component(node)
    }

    #[test]
    fn test_plain_markdown_is_one_block() {
        let result = scan("# Title\n\nSome *text*\n");
        assert_eq!(result.nodes, vec![md(1, "# Title\n\nSome *text*\n")]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(scan(""), ScanResult::default());
    }

    #[test]
    fn test_self_closing_tag() {
        let result = scan("before\n<Card title=\"Hi\" />\nafter\n");
        assert_eq!(
            result.nodes,
            vec![
                md(1, "before\n"),
                leaf("Card", &[("title", "Hi")], 2),
                md(3, "after\n"),
            ]
        );
    }

    #[test]
    fn test_self_closing_without_space() {
        let result = scan("<Card/>");
        assert_eq!(result.nodes, vec![leaf("Card", &[], 1)]);
    }

    #[test]
    fn test_self_closing_never_consumes_lines() {
        let result = scan("<Card />\ntext\n</Card>\n");
        assert_eq!(
            result.nodes,
            vec![leaf("Card", &[], 1), md(2, "text\n</Card>\n")]
        );
    }

    #[test]
    fn test_container_consumes_until_closing() {
        let result = scan("<Alert type=\"info\">\nHello **world**\n</Alert>\nafter\n");
        let mut alert = ComponentNode::container(
            "Alert",
            [("type", "info")].into_iter().collect(),
            1,
        );
        alert.children = vec![md(2, "Hello **world**\n")];
        assert_eq!(
            result.nodes,
            vec![Node::Component(alert), md(4, "after\n")]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_indentation_preserved_in_children() {
        let result = scan("<Box>\n- level 1\n  - level 2\n\n      code\n</Box>\n");
        assert_eq!(
            result.nodes,
            vec![container(
                "Box",
                1,
                vec![md(2, "- level 1\n  - level 2\n\n      code\n")]
            )]
        );
    }

    #[test]
    fn test_nested_different_components() {
        let result = scan("<Outer>\na\n<Inner>\nb\n</Inner>\nc\n</Outer>\n");
        assert_eq!(
            result.nodes,
            vec![container(
                "Outer",
                1,
                vec![
                    md(2, "a\n"),
                    container("Inner", 3, vec![md(4, "b\n")]),
                    md(6, "c\n"),
                ]
            )]
        );
    }

    #[test]
    fn test_same_name_nesting_is_depth_aware() {
        let result = scan("<Card>\n<Card>\ninner\n</Card>\n</Card>\n");
        assert_eq!(
            result.nodes,
            vec![container(
                "Card",
                1,
                vec![container("Card", 2, vec![md(3, "inner\n")])]
            )]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_same_name_siblings() {
        let result = scan("<Card>\na\n</Card>\n<Card>\nb\n</Card>\n");
        assert_eq!(
            result.nodes,
            vec![
                container("Card", 1, vec![md(2, "a\n")]),
                container("Card", 4, vec![md(5, "b\n")]),
            ]
        );
    }

    #[test]
    fn test_closing_outer_finalizes_inner() {
        let result = scan("<Outer>\n<Inner>\ntext\n</Outer>\n");
        assert_eq!(
            result.nodes,
            vec![container(
                "Outer",
                1,
                vec![container("Inner", 2, vec![md(3, "text\n")])]
            )]
        );
        assert_eq!(
            result.warnings,
            vec!["line 2: <Inner> is not closed before </Outer> on line 4"]
        );
    }

    #[test]
    fn test_unmatched_closing_is_markdown() {
        let result = scan("text\n</Card>\n");
        assert_eq!(result.nodes, vec![md(1, "text\n</Card>\n")]);
    }

    #[test]
    fn test_unclosed_tag_finalized_with_warning() {
        let result = scan("<Card>\nbody\n");
        assert_eq!(result.nodes, vec![container("Card", 1, vec![md(2, "body\n")])]);
        assert_eq!(result.warnings, vec!["line 1: <Card> is never closed"]);
    }

    #[test]
    fn test_tags_inside_fenced_code_ignored() {
        let input = "```html\n<Card />\n<Alert>\n</Alert>\n```\n";
        let result = scan(input);
        assert_eq!(result.nodes, vec![md(1, input)]);
    }

    #[test]
    fn test_fence_inside_component_body() {
        let result = scan("<Box>\n```\n</Box>\n```\n</Box>\n");
        assert_eq!(
            result.nodes,
            vec![container("Box", 1, vec![md(2, "```\n</Box>\n```\n")])]
        );
    }

    #[test]
    fn test_indented_code_is_not_a_tag() {
        let result = scan("    <Card />\n\t<Card />\n");
        assert_eq!(result.nodes, vec![md(1, "    <Card />\n\t<Card />\n")]);
    }

    #[test]
    fn test_up_to_three_spaces_allowed() {
        let result = scan("   <Card />\n");
        assert_eq!(result.nodes, vec![leaf("Card", &[], 1)]);
    }

    #[test]
    fn test_lowercase_tags_are_markdown() {
        let input = "<simpleComponent title=\"x\" />\n<div>\n</div>\n";
        assert_eq!(scan(input).nodes, vec![md(1, input)]);
    }

    #[test]
    fn test_tag_with_trailing_text_is_markdown() {
        let input = "<Card>text</Card>\n<Card /> trailing\n";
        assert_eq!(scan(input).nodes, vec![md(1, input)]);
    }

    #[test]
    fn test_multiline_self_closing_tag() {
        let result = scan("<Card\n  title=\"One\"\n  kind='two' />\nafter\n");
        assert_eq!(
            result.nodes,
            vec![
                leaf("Card", &[("title", "One"), ("kind", "two")], 1),
                md(4, "after\n"),
            ]
        );
    }

    #[test]
    fn test_multiline_opening_tag() {
        let result = scan("<Card\n  title=\"One\">\nbody\n</Card>\n");
        let mut card =
            ComponentNode::container("Card", [("title", "One")].into_iter().collect(), 1);
        card.children = vec![md(3, "body\n")];
        assert_eq!(result.nodes, vec![Node::Component(card)]);
    }

    #[test]
    fn test_multiline_interrupted_by_blank_line() {
        let input = "<Card\n  title=\"One\"\n\ntext />\n";
        assert_eq!(scan(input).nodes, vec![md(1, input)]);
    }

    #[test]
    fn test_multiline_at_end_of_input() {
        let input = "<Card\n  title=\"One\"\n";
        assert_eq!(scan(input).nodes, vec![md(1, input)]);
    }

    #[test]
    fn test_entities_decoded_in_block_tags() {
        let result = scan("<Card title=\"a &amp; b\" />");
        assert_eq!(result.nodes, vec![leaf("Card", &[("title", "a & b")], 1)]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let result = scan("<Card>\r\nbody\r\n</Card>\r\n");
        assert_eq!(result.nodes, vec![container("Card", 1, vec![md(2, "body\n")])]);
    }

    fn embedded(line: usize, text: &str, nodes: Vec<ComponentNode>) -> Node {
        Node::Markdown(MarkdownBlock {
            line,
            text: text.to_owned(),
            embedded: nodes,
        })
    }

    #[test]
    fn test_fence_marker_in_indented_code_is_literal() {
        let result = scan("    ```\n\n<Alert type=\"x\">\nHello\n</Alert>\n");
        let mut alert = ComponentNode::container("Alert", [("type", "x")].into_iter().collect(), 3);
        alert.children = vec![md(4, "Hello\n")];
        assert_eq!(
            result.nodes,
            vec![md(1, "    ```\n\n"), Node::Component(alert)]
        );
    }

    #[test]
    fn test_component_in_blockquote_stays_inside() {
        let result = scan("> <Alert type=\"q\">\n> Hello\n> </Alert>\n\nafter\n");
        let mut alert = ComponentNode::container("Alert", [("type", "q")].into_iter().collect(), 1);
        alert.children = vec![md(2, "Hello\n")];
        assert_eq!(
            result.nodes,
            vec![embedded(
                1,
                "> <!--mdcomp-component-0-->\n\nafter\n",
                vec![alert]
            )]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_component_in_list_item_stays_inside() {
        let result = scan("- item\n\n  <Alert>\n  Hello\n  </Alert>\n- next\n");
        let mut alert = ComponentNode::container("Alert", Attributes::new(), 3);
        alert.children = vec![md(4, "Hello\n")];
        assert_eq!(
            result.nodes,
            vec![embedded(
                1,
                "- item\n\n  <!--mdcomp-component-0-->\n- next\n",
                vec![alert]
            )]
        );
    }

    #[test]
    fn test_self_closing_on_list_marker_line() {
        let result = scan("1. <Badge label=\"x\" />\n2. text\n");
        assert_eq!(
            result.nodes,
            vec![embedded(
                1,
                "1. <!--mdcomp-component-0-->\n2. text\n",
                vec![ComponentNode::leaf("Badge", [("label", "x")].into_iter().collect(), 1)]
            )]
        );
    }

    #[test]
    fn test_nested_same_name_in_blockquote() {
        let result = scan("> <Box>\n> <Box>\n> a\n> </Box>\n> </Box>\n");
        let Node::Markdown(block) = &result.nodes[0] else {
            panic!("expected markdown run");
        };
        assert_eq!(block.text, "> <!--mdcomp-component-0-->\n");
        assert_eq!(
            block.embedded[0].children,
            vec![container("Box", 2, vec![md(3, "a\n")])]
        );
    }

    #[test]
    fn test_unclosed_component_in_blockquote() {
        let result = scan("> <Alert>\n> body\n\nafter\n");
        let Node::Markdown(block) = &result.nodes[0] else {
            panic!("expected markdown run");
        };
        assert_eq!(block.text, "> <!--mdcomp-component-0-->\n\nafter\n");
        assert_eq!(block.embedded[0].children, vec![md(2, "body\n")]);
        assert_eq!(result.warnings, vec!["line 1: <Alert> is never closed"]);
    }

    #[test]
    fn test_closing_tag_in_blockquote_is_markdown() {
        let input = "<Alert>\n> </Alert>\n</Alert>\n";
        let result = scan(input);
        assert_eq!(
            result.nodes,
            vec![container("Alert", 1, vec![md(2, "> </Alert>\n")])]
        );
    }

    #[test]
    fn test_tags_in_fence_inside_list_item() {
        let input = "- item\n\n  ```\n  <Card />\n  ```\n";
        assert_eq!(scan(input).nodes, vec![md(1, input)]);
    }

    #[test]
    fn test_list_item_end_closes_its_fence() {
        let result = scan("- ```\n  <Card />\n<Card />\n");
        assert_eq!(
            result.nodes,
            vec![md(1, "- ```\n  <Card />\n"), leaf("Card", &[], 3)]
        );
    }

    #[test]
    fn test_is_component_name() {
        assert!(is_component_name("Card"));
        assert!(is_component_name("H2o"));
        assert!(!is_component_name("card"));
        assert!(!is_component_name("Card-x"));
        assert!(!is_component_name(""));
    }
}
