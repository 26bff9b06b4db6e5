//! Body compilation: markdown into a render tree
//!
//! The body is parsed with pulldown-cmark and folded into a [`RenderTree`].
//! Images, links and code are routed through a [`NodeRules`] strategy so the
//! site can substitute placeholders for missing images and mark external
//! links; every other node passes through unchanged.

use lazy_static::lazy_static;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag};
use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::path::{Component, Path, PathBuf};

use crate::error::CompileError;

/// Presentation-ready body of a post
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderTree {
    pub children: Vec<Node>,
}

impl RenderTree {
    /// Visit every node depth-first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        fn go<'a>(nodes: &'a [Node], visit: &mut impl FnMut(&'a Node)) {
            for node in nodes {
                visit(node);
                go(node.children(), visit);
            }
        }
        go(&self.children, visit);
    }

    /// Concatenated plain text of the body
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        self.walk(&mut |node| match node {
            Node::Text { text: t } | Node::Code { code: t, .. } => {
                text.push_str(t);
                text.push(' ');
            }
            _ => {}
        });
        text
    }

    /// Number of words in the body
    pub fn word_count(&self) -> usize {
        self.plain_text().split_whitespace().count()
    }
}

/// Whether a link leaves the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Internal,
    External,
}

/// Table column alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    None,
    Left,
    Center,
    Right,
}

impl From<Alignment> for Align {
    fn from(a: Alignment) -> Self {
        match a {
            Alignment::None => Align::None,
            Alignment::Left => Align::Left,
            Alignment::Center => Align::Center,
            Alignment::Right => Align::Right,
        }
    }
}

/// A node of the render tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Heading {
        level: u8,
        id: Option<String>,
        children: Vec<Node>,
    },
    Paragraph {
        children: Vec<Node>,
    },
    BlockQuote {
        children: Vec<Node>,
    },
    List {
        start: Option<u64>,
        children: Vec<Node>,
    },
    Item {
        children: Vec<Node>,
    },
    Table {
        alignments: Vec<Align>,
        children: Vec<Node>,
    },
    TableHead {
        children: Vec<Node>,
    },
    TableRow {
        children: Vec<Node>,
    },
    TableCell {
        children: Vec<Node>,
    },
    Emphasis {
        children: Vec<Node>,
    },
    Strong {
        children: Vec<Node>,
    },
    Strikethrough {
        children: Vec<Node>,
    },
    FootnoteDefinition {
        label: String,
        children: Vec<Node>,
    },
    /// Any other container the markdown dialect produces
    Group {
        children: Vec<Node>,
    },
    Link {
        href: String,
        title: String,
        kind: LinkKind,
        children: Vec<Node>,
    },
    Image {
        src: String,
        alt: String,
        title: String,
    },
    /// Stand-in for an image whose source is absent or unreachable
    Placeholder {
        alt: String,
        src: String,
        original: Option<String>,
    },
    /// Rendered fixed-width; never validated or interpreted
    Code {
        language: Option<String>,
        code: String,
        block: bool,
    },
    Text {
        text: String,
    },
    Html {
        html: String,
    },
    FootnoteReference {
        label: String,
    },
    TaskMarker {
        checked: bool,
    },
    SoftBreak,
    HardBreak,
    Rule,
}

impl Node {
    /// Child nodes, empty for leaves
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Heading { children, .. }
            | Node::Paragraph { children }
            | Node::BlockQuote { children }
            | Node::List { children, .. }
            | Node::Item { children }
            | Node::Table { children, .. }
            | Node::TableHead { children }
            | Node::TableRow { children }
            | Node::TableCell { children }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Strikethrough { children }
            | Node::FootnoteDefinition { children, .. }
            | Node::Group { children }
            | Node::Link { children, .. } => children,
            _ => &[],
        }
    }
}

/// Rendering rules for the node kinds that get special treatment.
///
/// Implementations decide what an image, link or code node becomes; all
/// other nodes are built as-is.
pub trait NodeRules {
    fn image(&self, src: String, alt: String, title: String) -> Node;

    fn link(&self, href: String, title: String, children: Vec<Node>) -> Node;

    fn code(&self, language: Option<String>, code: String, block: bool) -> Node {
        Node::Code {
            language,
            code,
            block,
        }
    }
}

/// Rules used by the site: placeholder images and safe external links
#[derive(Debug, Clone, Default)]
pub struct SiteRules {
    /// Host of the site itself; absolute links to it stay internal
    pub site_host: Option<String>,
    /// Directory that local image paths resolve against. When unset, local
    /// images are assumed reachable.
    pub static_dir: Option<PathBuf>,
}

impl SiteRules {
    pub fn new(site_host: Option<String>, static_dir: Option<PathBuf>) -> Self {
        Self {
            site_host,
            static_dir,
        }
    }

    fn image_reachable(&self, src: &str) -> bool {
        let src = src.trim();
        if src.is_empty() {
            return false;
        }
        if src.starts_with("data:") || src.starts_with("//") || url::Url::parse(src).is_ok() {
            return true;
        }

        let Some(static_dir) = &self.static_dir else {
            return true;
        };

        let path = src.split(['?', '#']).next().unwrap_or_default();
        let path = percent_encoding::percent_decode_str(path).decode_utf8_lossy();
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return false;
        }
        static_dir.join(relative).is_file()
    }
}

impl NodeRules for SiteRules {
    fn image(&self, src: String, alt: String, title: String) -> Node {
        if self.image_reachable(&src) {
            return Node::Image { src, alt, title };
        }

        tracing::debug!("Image source {:?} unavailable, using placeholder", src);
        let original = (!src.trim().is_empty()).then_some(src);
        Node::Placeholder {
            src: placeholder_data_uri(&alt),
            alt,
            original,
        }
    }

    fn link(&self, href: String, title: String, children: Vec<Node>) -> Node {
        let kind = classify_link(&href, self.site_host.as_deref());
        Node::Link {
            href,
            title,
            kind,
            children,
        }
    }
}

/// Decide whether a link target is on this site
pub fn classify_link(href: &str, site_host: Option<&str>) -> LinkKind {
    let href = href.trim();

    // Protocol-relative URLs carry a host
    let candidate = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    match url::Url::parse(&candidate) {
        Ok(url) => {
            let same_host = matches!(url.scheme(), "http" | "https")
                && url
                    .host_str()
                    .zip(site_host)
                    .is_some_and(|(host, site)| host.eq_ignore_ascii_case(site));
            if same_host {
                LinkKind::Internal
            } else {
                LinkKind::External
            }
        }
        // Relative references have no scheme and stay on the site
        Err(_) => LinkKind::Internal,
    }
}

/// Same set `encodeURIComponent` leaves unescaped
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Inline SVG showing the alt text, deterministic for a given alt
pub fn placeholder_data_uri(alt: &str) -> String {
    let label = if alt.trim().is_empty() { "Image" } else { alt };
    format!(
        "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='800' height='400' viewBox='0 0 800 400'%3E%3Crect width='800' height='400' fill='%234a90e2'/%3E%3Ctext x='400' y='200' font-family='Arial' font-size='32' fill='white' text-anchor='middle' dominant-baseline='middle'%3E{}%3C/text%3E%3C/svg%3E",
        utf8_percent_encode(label, URI_COMPONENT)
    )
}

lazy_static! {
    static ref HTML_TAG: Regex =
        Regex::new(r"^<(/?)([A-Za-z][A-Za-z0-9-]*)(?:\s[^<>]*?)?(/?)>$").unwrap();
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Markdown body compiler
pub struct BodyCompiler<R = SiteRules> {
    rules: R,
    options: Options,
}

impl BodyCompiler<SiteRules> {
    /// Compiler with default site rules (no host, no image existence checks)
    pub fn new() -> Self {
        Self::with_rules(SiteRules::default())
    }
}

impl Default for BodyCompiler<SiteRules> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: NodeRules> BodyCompiler<R> {
    pub fn with_rules(rules: R) -> Self {
        // Front-matter is split off before compilation, so YAML metadata
        // blocks are deliberately not enabled here
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        Self { rules, options }
    }

    /// Compile a markdown body into a render tree
    pub fn compile(&self, body: &str) -> Result<RenderTree, CompileError> {
        let parser = Parser::new_ext(body, self.options).into_offset_iter();

        let mut builder = TreeBuilder::new(body);
        for (event, range) in parser {
            builder.push(event, range, &self.rules)?;
        }
        builder.finish()
    }
}

/// Open container awaiting its end event
struct Frame<'a> {
    tag: Tag<'a>,
    children: Vec<Node>,
}

struct TreeBuilder<'s, 'a> {
    source: &'s str,
    stack: Vec<Frame<'a>>,
    root: Vec<Node>,
    html: HtmlBalance,
}

impl<'s, 'a> TreeBuilder<'s, 'a> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            stack: Vec::new(),
            root: Vec::new(),
            html: HtmlBalance::default(),
        }
    }

    fn emit(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(frame) => frame.children.push(node),
            None => self.root.push(node),
        }
    }

    fn push<R: NodeRules>(
        &mut self,
        event: Event<'a>,
        range: Range<usize>,
        rules: &R,
    ) -> Result<(), CompileError> {
        match event {
            Event::Start(tag) => self.stack.push(Frame {
                tag,
                children: Vec::new(),
            }),
            Event::End(_) => {
                let frame = self.stack.pop().ok_or_else(|| {
                    CompileError::at(self.source, range.start, "unexpected end of element")
                })?;
                let node = close(frame, rules);
                self.emit(node);
            }
            Event::Text(text) => self.emit(Node::Text {
                text: text.into_string(),
            }),
            Event::Code(code) => {
                let node = rules.code(None, code.into_string(), false);
                self.emit(node);
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.html.feed(&html, range.start, self.source)?;
                self.emit(Node::Html {
                    html: html.into_string(),
                });
            }
            Event::FootnoteReference(label) => self.emit(Node::FootnoteReference {
                label: label.into_string(),
            }),
            Event::SoftBreak => self.emit(Node::SoftBreak),
            Event::HardBreak => self.emit(Node::HardBreak),
            Event::Rule => self.emit(Node::Rule),
            Event::TaskListMarker(checked) => self.emit(Node::TaskMarker { checked }),
            _ => {}
        }
        Ok(())
    }

    fn finish(mut self) -> Result<RenderTree, CompileError> {
        if let Some((name, at)) = self.html.open.pop() {
            return Err(CompileError::at(
                self.source,
                at,
                format!("unclosed tag <{}>", name),
            ));
        }
        if !self.stack.is_empty() {
            return Err(CompileError::at(
                self.source,
                self.source.len(),
                "unexpected end of document",
            ));
        }
        Ok(RenderTree {
            children: self.root,
        })
    }
}

/// Tracks embedded HTML elements across events.
///
/// pulldown-cmark hands over HTML blocks one line at a time, so a tag may be
/// split between events. Text is buffered until each tag or comment is
/// complete; `segments` maps buffer positions back to source offsets.
#[derive(Default)]
struct HtmlBalance {
    pending: String,
    segments: Vec<(usize, usize)>,
    /// Elements still open, with the source offset of their opening tag
    open: Vec<(String, usize)>,
}

impl HtmlBalance {
    fn feed(&mut self, html: &str, offset: usize, source: &str) -> Result<(), CompileError> {
        self.segments.push((self.pending.len(), offset));
        self.pending.push_str(html);

        let mut cursor = 0;
        while let Some(lt) = self.pending[cursor..].find('<').map(|i| cursor + i) {
            let rest = &self.pending[lt..];

            if rest.starts_with("<!--") {
                match rest[4..].find("-->") {
                    Some(end) => {
                        cursor = lt + 4 + end + 3;
                        continue;
                    }
                    None => {
                        cursor = lt;
                        break;
                    }
                }
            }

            let Some(end) = rest[1..].find(['<', '>']).map(|i| i + 1) else {
                cursor = lt;
                break;
            };
            // A bare `<` is not a tag; rescan from the next one
            if rest.as_bytes()[end] == b'<' {
                cursor = lt + end;
                continue;
            }

            let tag = HTML_TAG.captures(&rest[..=end]).map(|caps| {
                (
                    caps[2].to_ascii_lowercase(),
                    !caps[1].is_empty(),
                    !caps[3].is_empty(),
                )
            });
            let at = self.source_offset(lt);
            cursor = lt + end + 1;

            if let Some((name, closing, self_closing)) = tag {
                self.apply(name, closing, self_closing, at, source)?;
            }
        }

        // Everything before the cursor is settled; keep only an incomplete tail
        if self.pending[cursor..].contains('<') {
            self.drain(cursor);
        } else {
            self.pending.clear();
            self.segments.clear();
        }
        Ok(())
    }

    fn apply(
        &mut self,
        name: String,
        closing: bool,
        self_closing: bool,
        at: usize,
        source: &str,
    ) -> Result<(), CompileError> {
        if VOID_ELEMENTS.contains(&name.as_str()) || self_closing {
            return Ok(());
        }
        if !closing {
            self.open.push((name, at));
            return Ok(());
        }

        match self.open.pop() {
            Some((open, _)) if open == name => Ok(()),
            Some((open, _)) => Err(CompileError::at(
                source,
                at,
                format!("closing tag </{}> does not match <{}>", name, open),
            )),
            None => Err(CompileError::at(
                source,
                at,
                format!("closing tag </{}> has no opening tag", name),
            )),
        }
    }

    fn source_offset(&self, pos: usize) -> usize {
        self.segments
            .iter()
            .rev()
            .find(|(start, _)| *start <= pos)
            .map(|(start, offset)| offset + (pos - start))
            .unwrap_or(pos)
    }

    fn drain(&mut self, upto: usize) {
        let keep_from = self
            .segments
            .iter()
            .rposition(|(start, _)| *start <= upto)
            .unwrap_or(0);
        let mut segments: Vec<(usize, usize)> = self.segments[keep_from..]
            .iter()
            .map(|(start, offset)| {
                if *start <= upto {
                    (0, offset + (upto - start))
                } else {
                    (start - upto, *offset)
                }
            })
            .collect();
        segments.dedup_by_key(|(start, _)| *start);
        self.segments = segments;
        self.pending.drain(..upto);
    }
}

/// Turn a finished frame into its node
fn close<R: NodeRules>(frame: Frame<'_>, rules: &R) -> Node {
    let children = frame.children;
    match frame.tag {
        Tag::Paragraph => Node::Paragraph { children },
        Tag::Heading { level, id, .. } => Node::Heading {
            level: level as u8,
            id: id.map(|id| id.into_string()),
            children,
        },
        Tag::BlockQuote(_) => Node::BlockQuote { children },
        Tag::CodeBlock(kind) => {
            let language = match kind {
                CodeBlockKind::Fenced(lang) => lang
                    .split_whitespace()
                    .next()
                    .filter(|l| !l.is_empty())
                    .map(str::to_string),
                CodeBlockKind::Indented => None,
            };
            rules.code(language, flatten_text(&children), true)
        }
        Tag::List(start) => Node::List { start, children },
        Tag::Item => Node::Item { children },
        Tag::FootnoteDefinition(label) => Node::FootnoteDefinition {
            label: label.into_string(),
            children,
        },
        Tag::Table(alignments) => Node::Table {
            alignments: alignments.into_iter().map(Align::from).collect(),
            children,
        },
        Tag::TableHead => Node::TableHead { children },
        Tag::TableRow => Node::TableRow { children },
        Tag::TableCell => Node::TableCell { children },
        Tag::Emphasis => Node::Emphasis { children },
        Tag::Strong => Node::Strong { children },
        Tag::Strikethrough => Node::Strikethrough { children },
        Tag::Link {
            dest_url, title, ..
        } => rules.link(dest_url.into_string(), title.into_string(), children),
        Tag::Image {
            dest_url, title, ..
        } => rules.image(
            dest_url.into_string(),
            flatten_text(&children),
            title.into_string(),
        ),
        _ => Node::Group { children },
    }
}

/// Plain text of a node list (used for image alt text and code bodies)
fn flatten_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text { text } => out.push_str(text),
            Node::Code { code, .. } => out.push_str(code),
            Node::SoftBreak | Node::HardBreak => out.push(' '),
            other => out.push_str(&flatten_text(other.children())),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn compile(body: &str) -> RenderTree {
        BodyCompiler::new().compile(body).unwrap()
    }

    fn find<'a>(tree: &'a RenderTree, pred: impl Fn(&Node) -> bool) -> Vec<&'a Node> {
        let mut found = Vec::new();
        tree.walk(&mut |node| {
            if pred(node) {
                found.push(node);
            }
        });
        found
    }

    #[test]
    fn test_basic_structure() {
        let tree = compile("# Hello World\n\nThis is *a* test.");
        assert_eq!(tree.children.len(), 2);
        assert!(matches!(&tree.children[0], Node::Heading { level: 1, .. }));
        assert!(matches!(&tree.children[1], Node::Paragraph { .. }));
        assert_eq!(tree.word_count(), 6);
    }

    #[test]
    fn test_code_block_passes_through() {
        let tree = compile("```rust\nfn main() { let x = ; }\n```");
        assert_eq!(
            tree.children,
            vec![Node::Code {
                language: Some("rust".to_string()),
                code: "fn main() { let x = ; }\n".to_string(),
                block: true,
            }]
        );
    }

    #[test]
    fn test_inline_code() {
        let tree = compile("Run `cargo <build>` now");
        let code = find(&tree, |n| matches!(n, Node::Code { block: false, .. }));
        assert_eq!(
            code,
            vec![&Node::Code {
                language: None,
                code: "cargo <build>".to_string(),
                block: false,
            }]
        );
    }

    #[test]
    fn test_missing_image_becomes_placeholder() {
        let static_dir = TempDir::new().unwrap();
        let rules = SiteRules::new(None, Some(static_dir.path().to_path_buf()));
        let tree = BodyCompiler::with_rules(rules)
            .compile("![Sunset over the bay](/images/missing.jpg)")
            .unwrap();

        let placeholders = find(&tree, |n| matches!(n, Node::Placeholder { .. }));
        assert_eq!(placeholders.len(), 1);
        match placeholders[0] {
            Node::Placeholder { alt, src, original } => {
                assert_eq!(alt, "Sunset over the bay");
                assert_eq!(original.as_deref(), Some("/images/missing.jpg"));
                assert!(src.starts_with("data:image/svg+xml,"));
                assert!(src.contains("Sunset%20over%20the%20bay"));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_empty_image_source_becomes_placeholder() {
        let tree = compile("![Diagram]()");
        let placeholders = find(&tree, |n| matches!(n, Node::Placeholder { .. }));
        assert_eq!(placeholders.len(), 1);
    }

    #[test]
    fn test_existing_image_is_kept() {
        let static_dir = TempDir::new().unwrap();
        std::fs::create_dir(static_dir.path().join("images")).unwrap();
        std::fs::write(static_dir.path().join("images/cat.png"), b"png").unwrap();
        let rules = SiteRules::new(None, Some(static_dir.path().to_path_buf()));
        let tree = BodyCompiler::with_rules(rules)
            .compile("![A cat](/images/cat.png \"Cat\")")
            .unwrap();

        let images = find(&tree, |n| matches!(n, Node::Image { .. }));
        assert_eq!(
            images,
            vec![&Node::Image {
                src: "/images/cat.png".to_string(),
                alt: "A cat".to_string(),
                title: "Cat".to_string(),
            }]
        );
    }

    #[test]
    fn test_remote_image_is_kept() {
        let rules = SiteRules::new(None, Some(PathBuf::from("/nonexistent")));
        let tree = BodyCompiler::with_rules(rules)
            .compile("![Logo](https://cdn.example.com/logo.png)")
            .unwrap();
        assert_eq!(find(&tree, |n| matches!(n, Node::Image { .. })).len(), 1);
    }

    #[test]
    fn test_placeholder_is_deterministic() {
        assert_eq!(placeholder_data_uri("Chart"), placeholder_data_uri("Chart"));
        assert_ne!(placeholder_data_uri("Chart"), placeholder_data_uri("Graph"));
        assert!(placeholder_data_uri("").contains("%3EImage%3C"));
    }

    #[test]
    fn test_link_classification() {
        let site = Some("tylerknibbs.com");
        assert_eq!(classify_link("/blog/hello", site), LinkKind::Internal);
        assert_eq!(classify_link("#section", site), LinkKind::Internal);
        assert_eq!(classify_link("../about", site), LinkKind::Internal);
        assert_eq!(
            classify_link("https://TylerKnibbs.com/resume", site),
            LinkKind::Internal
        );
        assert_eq!(classify_link("https://github.com", site), LinkKind::External);
        assert_eq!(classify_link("//github.com/x", site), LinkKind::External);
        assert_eq!(classify_link("mailto:me@example.com", site), LinkKind::External);
        assert_eq!(classify_link("http://localhost/x", None), LinkKind::External);
    }

    #[test]
    fn test_links_in_tree() {
        let rules = SiteRules::new(Some("example.com".to_string()), None);
        let tree = BodyCompiler::with_rules(rules)
            .compile("See [home](/) and [GitHub](https://github.com/tyler).")
            .unwrap();
        let kinds: Vec<_> = find(&tree, |n| matches!(n, Node::Link { .. }))
            .into_iter()
            .map(|n| match n {
                Node::Link { kind, .. } => *kind,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(kinds, vec![LinkKind::Internal, LinkKind::External]);
    }

    #[test]
    fn test_balanced_html_compiles() {
        let tree = compile("<details>\n<summary>More</summary>\n\nHidden *text*\n\n</details>\n");
        assert!(!find(&tree, |n| matches!(n, Node::Html { .. })).is_empty());
    }

    #[test]
    fn test_void_and_self_closing_html() {
        compile("Line one<br>line two <img src=\"x.png\"> and <Chart data={1} />");
    }

    #[test]
    fn test_opening_tag_split_across_lines() {
        let tree = compile("<div\n  className=\"note\">\n\nHello\n\n</div>\n");
        assert!(!find(&tree, |n| matches!(n, Node::Html { .. })).is_empty());
        compile("<Chart\n  data={points}\n/>\n\nAfter the chart.\n");
    }

    #[test]
    fn test_tags_inside_comments_are_ignored() {
        compile("Text\n\n<!-- <div> removed -->\n\nMore\n");
        compile("<!--\n<section>\nold draft\n-->\n\nBody\n");
        compile("Inline <!-- <span> --> comment");
    }

    #[test]
    fn test_bare_angle_bracket_does_not_hide_tags() {
        let err = BodyCompiler::new()
            .compile("<div>\nif a < b then\n</span>\n")
            .unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("</span>"));
    }

    #[test]
    fn test_unclosed_html_is_compile_error() {
        let err = BodyCompiler::new()
            .compile("Intro\n\n<div class=\"note\">\n\nNever closed.\n")
            .unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.column, 1);
        assert!(err.message.contains("<div>"));
    }

    #[test]
    fn test_mismatched_html_is_compile_error() {
        let err = BodyCompiler::new()
            .compile("Some <em>text</strong> here")
            .unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("</strong>"));
    }

    #[test]
    fn test_task_list_and_table() {
        let tree = compile("- [x] done\n- [ ] todo\n\n| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        assert_eq!(
            find(&tree, |n| matches!(n, Node::TaskMarker { .. })).len(),
            2
        );
        let tables = find(&tree, |n| matches!(n, Node::Table { .. }));
        match tables[0] {
            Node::Table { alignments, .. } => {
                assert_eq!(alignments, &vec![Align::Left, Align::Right])
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_tree_serializes_with_type_tags() {
        let tree = compile("Hello");
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["children"][0]["type"], "paragraph");
        assert_eq!(json["children"][0]["children"][0]["type"], "text");
        assert_eq!(json["children"][0]["children"][0]["text"], "Hello");
    }
}
