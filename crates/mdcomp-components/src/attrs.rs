//! Attribute parsing shared by the block and inline recognizers.

use std::sync::LazyLock;

use regex::Regex;

use crate::node::Attributes;

/// `key="value"` or `key='value'`.
static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w-]+)=(?:"([^"]*)"|'([^']*)')"#).expect("invalid attribute regex")
});

/// Parse the attribute text of a tag.
///
/// Values are HTML-entity-decoded. Text that does not form a quoted
/// `key=value` pair is ignored, and a repeated key replaces the earlier value.
pub fn parse_attributes(raw: &str) -> Attributes {
    let mut attrs = Attributes::new();
    for caps in ATTRIBUTE_RE.captures_iter(raw) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map_or("", |m| m.as_str());
        attrs.insert(&caps[1], html_escape::decode_html_entities(value));
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &str) -> Vec<(String, String)> {
        parse_attributes(raw)
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_owned(), v.to_owned())
    }

    #[test]
    fn test_double_and_single_quotes() {
        assert_eq!(
            pairs(r#"title="Hello" kind='info'"#),
            vec![pair("title", "Hello"), pair("kind", "info")]
        );
    }

    #[test]
    fn test_quote_inside_other_quote() {
        assert_eq!(
            pairs(r#"a="it's" b='say "hi"'"#),
            vec![pair("a", "it's"), pair("b", r#"say "hi""#)]
        );
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(
            pairs(r#"title="Tom &amp; Jerry &lt;3&gt; &quot;x&quot;""#),
            vec![pair("title", r#"Tom & Jerry <3> "x""#)]
        );
    }

    #[test]
    fn test_hyphenated_keys_and_empty_values() {
        assert_eq!(
            pairs(r#"data-id="" aria-label="close""#),
            vec![pair("data-id", ""), pair("aria-label", "close")]
        );
    }

    #[test]
    fn test_residue_dropped() {
        assert_eq!(
            pairs(r#"disabled title="x" count=3 "#),
            vec![pair("title", "x")]
        );
    }

    #[test]
    fn test_repeated_key_overwrites() {
        assert_eq!(
            pairs(r#"a="1" b="2" a="3""#),
            vec![pair("a", "3"), pair("b", "2")]
        );
    }

    #[test]
    fn test_multiline_attributes() {
        assert_eq!(
            pairs("title=\"One\"\n  body=\"Two\""),
            vec![pair("title", "One"), pair("body", "Two")]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_attributes("").is_empty());
    }
}
