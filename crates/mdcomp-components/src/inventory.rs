//! Listing the component tags a document uses.

use pulldown_cmark::Options;

use crate::inline::inline_components;
use crate::node::{ComponentNode, Node};

/// A component tag found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUse {
    pub name: String,
    /// 1-based source line of the tag.
    pub line: usize,
    /// Whether the tag appeared inside a markdown block rather than on its
    /// own line.
    pub inline: bool,
}

/// Collect block and inline component tags from a scanned tree, sorted by line.
///
/// `options` should match the parser options the document is rendered with.
pub fn collect_tags(nodes: &[Node], options: Options) -> Vec<TagUse> {
    let mut tags = Vec::new();
    walk(nodes, options, &mut tags);
    tags.sort_by_key(|tag| tag.line);
    tags
}

fn walk(nodes: &[Node], options: Options, tags: &mut Vec<TagUse>) {
    for node in nodes {
        match node {
            Node::Markdown(block) => {
                tags.extend(inline_components(block, options).into_iter().map(|node| TagUse {
                    name: node.name,
                    line: node.line,
                    inline: true,
                }));
                for component in &block.embedded {
                    walk_component(component, options, tags);
                }
            }
            Node::Component(component) => walk_component(component, options, tags),
        }
    }
}

fn walk_component(component: &ComponentNode, options: Options, tags: &mut Vec<TagUse>) {
    tags.push(TagUse {
        name: component.name.clone(),
        line: component.line,
        inline: false,
    });
    walk(&component.children, options, tags);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::scanner::scan;

    fn tag(name: &str, line: usize, inline: bool) -> TagUse {
        TagUse {
            name: name.to_owned(),
            line,
            inline,
        }
    }

    #[test]
    fn test_block_and_inline_tags_in_line_order() {
        let input = "\
<Card title=\"x\">
Text with <Badge />
<Note />
</Card>

After <Icon name=\"a\" />
";
        let tags = collect_tags(&scan(input).nodes, Options::empty());
        assert_eq!(
            tags,
            vec![
                tag("Card", 1, false),
                tag("Badge", 2, true),
                tag("Note", 3, false),
                tag("Icon", 6, true),
            ]
        );
    }

    #[test]
    fn test_fenced_tags_not_listed() {
        let input = "```\n<Card />\n```\n";
        assert!(collect_tags(&scan(input).nodes, Options::empty()).is_empty());
    }

    #[test]
    fn test_table_tags_need_tables_enabled() {
        let input = "| A |\n|---|\n| <Icon /> |\n";
        let nodes = scan(input).nodes;
        assert_eq!(
            collect_tags(&nodes, Options::ENABLE_TABLES),
            vec![tag("Icon", 3, true)]
        );
    }

    #[test]
    fn test_tags_nested_in_containers() {
        let input = "\
> <Alert>
> See <Badge />
> </Alert>

- <Card />
";
        let tags = collect_tags(&scan(input).nodes, Options::empty());
        assert_eq!(
            tags,
            vec![
                tag("Alert", 1, false),
                tag("Badge", 2, true),
                tag("Card", 5, false),
            ]
        );
    }
}
