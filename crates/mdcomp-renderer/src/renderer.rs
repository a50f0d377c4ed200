//! Event-driven HTML renderer.

use std::fmt::Write;

use pulldown_cmark::{
    BlockQuoteKind, BrokenLink, BrokenLinkCallback, CodeBlockKind, CowStr, Event, HeadingLevel,
    Options, Parser, Tag, TagEnd,
};

use crate::escape::{escape_attribute, escape_html};
use crate::references::LinkReferences;
use crate::state::{CodeBlockState, ImageState, TableState};

/// Markdown to HTML renderer.
///
/// Block-level elements are terminated with a newline, so the output of
/// consecutive renders can be concatenated without merging lines. Raw HTML
/// events are written through unchanged; callers that need to rewrite them
/// should map the event stream before handing it over.
pub struct MarkdownRenderer {
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    gfm: bool,
    /// Alert class per open blockquote (regular blockquotes push `None`).
    alert_stack: Vec<Option<&'static str>>,
}

impl MarkdownRenderer {
    /// Create a new renderer with GFM enabled by default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(1024),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            gfm: true,
            alert_stack: Vec::new(),
        }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    /// - Alert blockquotes (`> [!NOTE]`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Create a configured parser for the given markdown text.
    #[must_use]
    pub fn create_parser<'a>(&self, markdown: &'a str) -> Parser<'a> {
        Parser::new_ext(markdown, self.parser_options())
    }

    /// Create a parser that also resolves references defined outside
    /// `markdown`.
    ///
    /// Definitions in `markdown` itself take precedence over `references`.
    #[must_use]
    pub fn create_parser_with_references<'a>(
        &self,
        markdown: &'a str,
        references: &'a LinkReferences,
    ) -> Parser<'a, impl BrokenLinkCallback<'a> + use<'a>> {
        Parser::new_with_broken_link_callback(
            markdown,
            self.parser_options(),
            Some(move |link: BrokenLink<'a>| {
                references.get(&link.reference).map(|target| {
                    (
                        CowStr::Borrowed(target.dest.as_str()),
                        CowStr::Borrowed(target.title.as_str()),
                    )
                })
            }),
        )
    }

    /// Render markdown text directly using configured parser options.
    pub fn render_markdown(&mut self, markdown: &str) -> String {
        self.render(self.create_parser(markdown))
    }

    /// Render markdown events and return the HTML.
    ///
    /// The renderer is reset afterwards and can be reused.
    pub fn render<'a, I>(&mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }
        self.alert_stack.clear();
        std::mem::take(&mut self.output)
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.output.push_str("<br />\n"),
            Event::Rule => {
                self.ensure_newline();
                self.output.push_str("<hr />\n");
            }
            Event::TaskListMarker(checked) => {
                let checked = if checked { " checked=\"\"" } else { "" };
                write!(self.output, r#"<input disabled="" type="checkbox"{checked}/>"#).unwrap();
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    /// Push inline markup unless image alt text is being collected.
    fn push_inline(&mut self, markup: &str) {
        if !self.image.is_active() {
            self.output.push_str(markup);
        }
    }

    /// Start the next block on a fresh line.
    fn ensure_newline(&mut self) {
        if !self.output.is_empty() && !self.output.ends_with('\n') {
            self.output.push('\n');
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.ensure_newline();
                self.output.push_str("<p>");
            }
            Tag::Heading { level, .. } => {
                self.ensure_newline();
                write!(self.output, "<h{}>", heading_level_to_num(level)).unwrap();
            }
            Tag::BlockQuote(kind) => {
                self.ensure_newline();
                if let Some(class) = kind.map(alert_class) {
                    self.alert_stack.push(Some(class));
                    writeln!(self.output, "<div class=\"alert alert-{class}\">").unwrap();
                } else {
                    self.alert_stack.push(None);
                    self.output.push_str("<blockquote>\n");
                }
            }
            Tag::CodeBlock(kind) => {
                self.ensure_newline();
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .filter(|lang| !lang.is_empty())
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => {
                self.ensure_newline();
                match start {
                    Some(1) => self.output.push_str("<ol>\n"),
                    Some(n) => writeln!(self.output, "<ol start=\"{n}\">").unwrap(),
                    None => self.output.push_str("<ul>\n"),
                }
            }
            Tag::Item => {
                self.ensure_newline();
                self.output.push_str("<li>");
            }
            Tag::HtmlBlock => self.ensure_newline(),
            Tag::FootnoteDefinition(_) | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => {
                self.ensure_newline();
                self.output.push_str("<dl>\n");
            }
            Tag::DefinitionListTitle => {
                self.ensure_newline();
                self.output.push_str("<dt>");
            }
            Tag::DefinitionListDefinition => {
                self.ensure_newline();
                self.output.push_str("<dd>");
            }
            Tag::Table(alignments) => {
                self.ensure_newline();
                self.table.start(alignments);
                self.output.push_str("<table>\n");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead>\n<tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let tag = self.table.cell_tag();
                let align = self.table.alignment_attr();
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link = format!(r#"<a href="{}""#, escape_attribute(&dest_url));
                if !title.is_empty() {
                    write!(link, r#" title="{}""#, escape_attribute(&title)).unwrap();
                }
                link.push('>');
                self.push_inline(&link);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Rendered in end_tag once alt text is collected
                self.image.start(&dest_url, &title);
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>\n"),
            TagEnd::Heading(level) => {
                writeln!(self.output, "</h{}>", heading_level_to_num(level)).unwrap();
            }
            TagEnd::BlockQuote(_) => {
                self.ensure_newline();
                match self.alert_stack.pop() {
                    Some(Some(_)) => self.output.push_str("</div>\n"),
                    _ => self.output.push_str("</blockquote>\n"),
                }
            }
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                match lang {
                    Some(lang) => writeln!(
                        self.output,
                        "<pre><code class=\"language-{}\">{}</code></pre>",
                        escape_attribute(&lang),
                        escape_html(&content)
                    )
                    .unwrap(),
                    None => writeln!(
                        self.output,
                        "<pre><code>{}</code></pre>",
                        escape_html(&content)
                    )
                    .unwrap(),
                }
            }
            TagEnd::List(ordered) => {
                self.ensure_newline();
                self.output
                    .push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            TagEnd::Item => self.output.push_str("</li>\n"),
            TagEnd::HtmlBlock => self.ensure_newline(),
            TagEnd::FootnoteDefinition | TagEnd::MetadataBlock(_) => {}
            TagEnd::DefinitionList => {
                self.ensure_newline();
                self.output.push_str("</dl>\n");
            }
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>\n"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>\n"),
            TagEnd::Table => self.output.push_str("</tbody>\n</table>\n"),
            TagEnd::TableHead => {
                self.output.push_str("</tr>\n</thead>\n<tbody>\n");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>\n"),
            TagEnd::TableCell => {
                write!(self.output, "</{}>", self.table.cell_tag()).unwrap();
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                if let Some((src, alt, title)) = self.image.end() {
                    write!(
                        self.output,
                        r#"<img src="{}" alt="{}""#,
                        escape_attribute(&src),
                        escape_attribute(&alt)
                    )
                    .unwrap();
                    if !title.is_empty() {
                        write!(self.output, r#" title="{}""#, escape_attribute(&title)).unwrap();
                    }
                    self.output.push_str(" />");
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
        } else {
            write!(self.output, "<code>{}</code>", escape_html(code)).unwrap();
        }
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else {
            self.output.push('\n');
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn alert_class(kind: BlockQuoteKind) -> &'static str {
    match kind {
        BlockQuoteKind::Note => "note",
        BlockQuoteKind::Tip => "tip",
        BlockQuoteKind::Important => "important",
        BlockQuoteKind::Warning => "warning",
        BlockQuoteKind::Caution => "caution",
    }
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
