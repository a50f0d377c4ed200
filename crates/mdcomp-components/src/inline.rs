//! Inline tag recognizer.
//!
//! Self-closing component tags inside paragraphs, headings, list items and
//! table cells reach the renderer as raw HTML events. A tag alone on a line
//! inside a container block (for example a list item) is reported as an HTML
//! block line instead. Both forms are recognized here; opening and closing
//! pairs never are.

use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser};
use regex::Regex;

use crate::attrs::parse_attributes;
use crate::node::{ComponentNode, MarkdownBlock};

static INLINE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<([A-Z][A-Za-z0-9]*)\s*([^>]*)/>$").expect("invalid inline tag regex")
});

/// Recognize a raw HTML fragment that is exactly one self-closing component tag.
///
/// Surrounding whitespace (such as the line ending of an HTML block line) is
/// ignored.
#[must_use]
pub fn recognize(html: &str, line: usize) -> Option<ComponentNode> {
    let caps = INLINE_TAG_RE.captures(html.trim())?;
    Some(ComponentNode::leaf(
        &caps[1],
        parse_attributes(&caps[2]),
        line,
    ))
}

/// Collect every inline component tag in a markdown run, in document order.
pub fn inline_components(block: &MarkdownBlock, options: Options) -> Vec<ComponentNode> {
    Parser::new_ext(&block.text, options)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Html(html) | Event::InlineHtml(html) => {
                recognize(&html, block.line_at(range.start))
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(line: usize, text: &str) -> MarkdownBlock {
        MarkdownBlock {
            line,
            text: text.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_recognize_self_closing() {
        let node = recognize(r#"<Badge label="new" />"#, 4).unwrap();
        assert_eq!(node.name, "Badge");
        assert_eq!(node.attributes.get("label"), Some("new"));
        assert!(node.self_closing);
        assert_eq!(node.line, 4);
    }

    #[test]
    fn test_recognize_html_block_line() {
        let node = recognize("<Badge/>\n", 1).unwrap();
        assert_eq!(node.name, "Badge");
        assert!(node.attributes.is_empty());
    }

    #[test]
    fn test_recognize_rejects_non_components() {
        assert!(recognize("<Badge>", 1).is_none());
        assert!(recognize("</Badge>", 1).is_none());
        assert!(recognize("<badge />", 1).is_none());
        assert!(recognize("<br />", 1).is_none());
        assert!(recognize("<Badge /><Badge />", 1).is_none());
    }

    #[test]
    fn test_inline_components_in_paragraph() {
        let found = inline_components(
            &block(1, "Text <Badge label=\"a\" /> and <Icon name=\"b\"/>.\n"),
            Options::empty(),
        );
        let names: Vec<_> = found.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Badge", "Icon"]);
    }

    #[test]
    fn test_inline_components_report_source_line() {
        let found = inline_components(
            &block(10, "# Title\n\nSee <Badge />\n"),
            Options::empty(),
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 12);
    }

    #[test]
    fn test_inline_components_in_list_and_table() {
        let text = "- item <Badge />\n\n| A |\n|---|\n| <Icon /> |\n";
        let found = inline_components(&block(1, text), Options::ENABLE_TABLES);
        let names: Vec<_> = found.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Badge", "Icon"]);
    }

    #[test]
    fn test_inline_code_is_not_a_component() {
        let found = inline_components(&block(1, "Use `<Badge />` here\n"), Options::empty());
        assert!(found.is_empty());
    }

    #[test]
    fn test_lowercase_inline_tag_ignored() {
        let found = inline_components(
            &block(1, "Text <simpleComponent title=\"x\" /> end\n"),
            Options::empty(),
        );
        assert!(found.is_empty());
    }
}
