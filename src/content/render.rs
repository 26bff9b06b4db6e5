//! HTML rendering of compiled bodies, with syntax highlighting

use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::compile::{Align, LinkKind, Node, RenderTree};
use crate::config::HighlightConfig;

/// Serializes a [`RenderTree`] to HTML
pub struct HtmlRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    line_numbers: bool,
}

impl HtmlRenderer {
    /// Create a new renderer with highlighting enabled
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default())
    }

    /// Create with custom settings
    pub fn with_options(config: &HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.theme.clone(),
            highlight: config.enable,
            line_numbers: config.line_number,
        }
    }

    /// Render a whole tree
    pub fn render(&self, tree: &RenderTree) -> String {
        let mut out = String::new();
        self.render_nodes(&tree.children, &mut out);
        out
    }

    fn render_nodes(&self, nodes: &[Node], out: &mut String) {
        for node in nodes {
            self.render_node(node, out);
        }
    }

    fn wrap(&self, tag: &str, children: &[Node], out: &mut String) {
        out.push('<');
        out.push_str(tag);
        out.push('>');
        self.render_nodes(children, out);
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }

    fn render_node(&self, node: &Node, out: &mut String) {
        match node {
            Node::Heading {
                level,
                id,
                children,
            } => {
                match id {
                    Some(id) => out.push_str(&format!(r#"<h{} id="{}">"#, level, html_escape(id))),
                    None => out.push_str(&format!("<h{}>", level)),
                }
                self.render_nodes(children, out);
                out.push_str(&format!("</h{}>\n", level));
            }
            Node::Paragraph { children } => {
                self.wrap("p", children, out);
                out.push('\n');
            }
            Node::BlockQuote { children } => self.wrap("blockquote", children, out),
            Node::List { start, children } => match start {
                Some(1) => self.wrap("ol", children, out),
                Some(n) => {
                    out.push_str(&format!(r#"<ol start="{}">"#, n));
                    self.render_nodes(children, out);
                    out.push_str("</ol>");
                }
                None => self.wrap("ul", children, out),
            },
            Node::Item { children } => self.wrap("li", children, out),
            Node::Table {
                alignments,
                children,
            } => {
                if alignments.iter().all(|a| *a == Align::None) {
                    out.push_str("<table>");
                } else {
                    let names: Vec<_> = alignments.iter().map(align_name).collect();
                    out.push_str(&format!(r#"<table data-align="{}">"#, names.join(",")));
                }
                let (head, body) = match children.split_first() {
                    Some((first, rest)) if matches!(first, Node::TableHead { .. }) => {
                        (Some(first), rest)
                    }
                    _ => (None, children.as_slice()),
                };
                if let Some(head) = head {
                    self.render_node(head, out);
                }
                self.wrap("tbody", body, out);
                out.push_str("</table>\n");
            }
            Node::TableHead { children } => {
                out.push_str("<thead><tr>");
                self.render_nodes(children, out);
                out.push_str("</tr></thead>");
            }
            Node::TableRow { children } => self.wrap("tr", children, out),
            Node::TableCell { children } => self.wrap("td", children, out),
            Node::Emphasis { children } => self.wrap("em", children, out),
            Node::Strong { children } => self.wrap("strong", children, out),
            Node::Strikethrough { children } => self.wrap("del", children, out),
            Node::FootnoteDefinition { label, children } => {
                out.push_str(&format!(
                    r#"<div class="footnote-definition" id="fn-{}">"#,
                    html_escape(label)
                ));
                self.render_nodes(children, out);
                out.push_str("</div>");
            }
            Node::Group { children } => self.render_nodes(children, out),
            Node::Link {
                href,
                title,
                kind,
                children,
            } => {
                out.push_str(&format!(r#"<a href="{}""#, html_escape(href)));
                if !title.is_empty() {
                    out.push_str(&format!(r#" title="{}""#, html_escape(title)));
                }
                if *kind == LinkKind::External {
                    out.push_str(r#" target="_blank" rel="noopener noreferrer""#);
                }
                out.push('>');
                self.render_nodes(children, out);
                out.push_str("</a>");
            }
            Node::Image { src, alt, title } => {
                out.push_str(&format!(
                    r#"<img src="{}" alt="{}""#,
                    html_escape(src),
                    html_escape(alt)
                ));
                if !title.is_empty() {
                    out.push_str(&format!(r#" title="{}""#, html_escape(title)));
                }
                out.push_str(r#" loading="lazy">"#);
            }
            Node::Placeholder { alt, src, .. } => {
                out.push_str(&format!(
                    r#"<figure class="image-placeholder"><img src="{}" alt="{}" loading="lazy">"#,
                    html_escape(src),
                    html_escape(alt)
                ));
                if !alt.is_empty() {
                    out.push_str(&format!("<figcaption>{}</figcaption>", html_escape(alt)));
                }
                out.push_str("</figure>");
            }
            Node::Code {
                language,
                code,
                block: true,
            } => {
                out.push_str(&self.highlight_code(code, language.as_deref()));
                out.push('\n');
            }
            Node::Code { code, .. } => {
                out.push_str(&format!("<code>{}</code>", html_escape(code)));
            }
            Node::Text { text } => out.push_str(&html_escape(text)),
            Node::Html { html } => out.push_str(html),
            Node::FootnoteReference { label } => {
                let label = html_escape(label);
                out.push_str(&format!(
                    r##"<sup class="footnote-reference"><a href="#fn-{}">{}</a></sup>"##,
                    label, label
                ));
            }
            Node::TaskMarker { checked } => {
                out.push_str(if *checked {
                    r#"<input type="checkbox" disabled checked> "#
                } else {
                    r#"<input type="checkbox" disabled> "#
                });
            }
            Node::SoftBreak => out.push('\n'),
            Node::HardBreak => out.push_str("<br>\n"),
            Node::Rule => out.push_str("<hr>\n"),
        }
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        if !self.highlight {
            return plain_code_block(code, lang);
        }

        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let Some(theme) = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
        else {
            return plain_code_block(code, lang);
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => {
                if self.line_numbers {
                    add_line_numbers(&highlighted, lang)
                } else {
                    format!(
                        r#"<figure class="highlight {}">{}</figure>"#,
                        html_escape(lang),
                        highlighted
                    )
                }
            }
            Err(e) => {
                tracing::debug!("Highlighting failed for {}: {}", lang, e);
                plain_code_block(code, lang)
            }
        }
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn align_name(align: &Align) -> &'static str {
    match align {
        Align::None => "",
        Align::Left => "left",
        Align::Center => "center",
        Align::Right => "right",
    }
}

fn plain_code_block(code: &str, lang: &str) -> String {
    format!(
        r#"<pre><code class="language-{}">{}</code></pre>"#,
        html_escape(lang),
        html_escape(code)
    )
}

/// Add line numbers to highlighted code
fn add_line_numbers(code: &str, lang: &str) -> String {
    let lines: Vec<&str> = code.lines().collect();

    let gutter = (1..=lines.len())
        .map(|i| format!(r#"<span class="line-number">{}</span>"#, i))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        html_escape(lang),
        gutter,
        lines.join("\n")
    )
}

/// Simple HTML escaping
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::compile::{BodyCompiler, SiteRules};

    fn render(markdown: &str) -> String {
        let rules = SiteRules::new(Some("example.com".to_string()), None);
        let tree = BodyCompiler::with_rules(rules).compile(markdown).unwrap();
        HtmlRenderer::new().render(&tree)
    }

    #[test]
    fn test_render_basic_markdown() {
        let html = render("# Hello World\n\nThis is a test.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let html = render("```rust\nfn main() {}\n```");
        assert!(html.contains("highlight"));
    }

    #[test]
    fn test_render_code_block_without_highlighting() {
        let config = HighlightConfig {
            enable: false,
            ..HighlightConfig::default()
        };
        let tree = BodyCompiler::new().compile("```\n<b>x</b>\n```").unwrap();
        let html = HtmlRenderer::with_options(&config).render(&tree);
        assert!(html.contains(r#"<pre><code class="language-text">&lt;b&gt;x&lt;/b&gt;"#));
    }

    #[test]
    fn test_external_link_is_safe() {
        let html = render("[GitHub](https://github.com) and [About](/about)");
        assert!(html.contains(
            r#"<a href="https://github.com" target="_blank" rel="noopener noreferrer">GitHub</a>"#
        ));
        assert!(html.contains(r#"<a href="/about">About</a>"#));
    }

    #[test]
    fn test_placeholder_renders_caption() {
        let html = render("![Architecture diagram]()");
        assert!(html.contains(r#"class="image-placeholder""#));
        assert!(html.contains("<figcaption>Architecture diagram</figcaption>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render("Fish & chips");
        assert!(html.contains("Fish &amp; chips"));
    }
}
