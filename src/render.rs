//! HTML rendering for a finished document tree.
//!
//! Rendering is a straight walk over the AST: nodes carry fully resolved
//! children, so no markdown is parsed here. A per-node [`RenderRule`] hook
//! lets callers override any node's output while delegating the rest.
use crate::ast::{Align, Document, FormatStyle, Node};

/// Per-node override: return `Some(html)` to replace the default output.
pub type RenderRule = fn(&Node, &HtmlRenderer) -> Option<String>;

/// Renderer configuration.
pub struct RenderConfig {
    /// Append collected footnote bodies as a trailing `<footer>`.
    pub footnote_footer: bool,
    /// Optional per-node override hook.
    pub render_rule: Option<RenderRule>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            footnote_footer: true,
            render_rule: None,
        }
    }
}

impl RenderConfig {
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder::default()
    }
}

/// Fluent builder for [`RenderConfig`].
#[derive(Default)]
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    pub fn footnote_footer(mut self, enabled: bool) -> Self {
        self.config.footnote_footer = enabled;
        self
    }

    pub fn render_rule(mut self, rule: RenderRule) -> Self {
        self.config.render_rule = Some(rule);
        self
    }

    pub fn build(self) -> RenderConfig {
        self.config
    }
}

/// Escapes text content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Walks the AST and produces an HTML string.
pub struct HtmlRenderer {
    config: RenderConfig,
}

impl HtmlRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, document: &Document) -> String {
        let mut out = self.render_nodes(&document.children);
        if self.config.footnote_footer && !document.footnotes.is_empty() {
            out.push_str("<footer>");
            for footnote in &document.footnotes {
                out.push_str(&format!(
                    "<div id=\"footnote-{}\">{}</div>",
                    escape_html(&footnote.identifier),
                    self.render_nodes(&footnote.children)
                ));
            }
            out.push_str("</footer>");
        }
        out
    }

    /// Renders a node list; available to [`RenderRule`] hooks for
    /// rendering children.
    pub fn render_nodes(&self, nodes: &[Node]) -> String {
        let mut out = String::new();
        for node in nodes {
            self.render_node(node, &mut out);
        }
        out
    }

    fn render_node(&self, node: &Node, out: &mut String) {
        if let Some(rule) = self.config.render_rule {
            if let Some(html) = rule(node, self) {
                out.push_str(&html);
                return;
            }
        }
        match node {
            Node::Text { value } => out.push_str(&escape_html(value)),
            Node::Paragraph { children } => {
                out.push_str("<p>");
                out.push_str(&self.render_nodes(children));
                out.push_str("</p>");
            }
            Node::Heading {
                level,
                id,
                children,
            } => {
                if id.is_empty() {
                    out.push_str(&format!("<h{level}>"));
                } else {
                    out.push_str(&format!("<h{level} id=\"{}\">", escape_html(id)));
                }
                out.push_str(&self.render_nodes(children));
                out.push_str(&format!("</h{level}>"));
            }
            Node::BlockQuote { alert, children } => {
                out.push_str("<blockquote>");
                if let Some(label) = alert {
                    out.push_str(&format!(
                        "<header class=\"alert\">{}</header>",
                        escape_html(label)
                    ));
                }
                out.push_str(&self.render_nodes(children));
                out.push_str("</blockquote>");
            }
            Node::BreakLine => out.push_str("<br />"),
            Node::BreakThematic => out.push_str("<hr />"),
            Node::CodeBlock { lang, text, .. } => {
                match lang {
                    Some(lang) => out.push_str(&format!(
                        "<pre><code class=\"lang-{}\">",
                        escape_html(lang)
                    )),
                    None => out.push_str("<pre><code>"),
                }
                out.push_str(&escape_html(text));
                out.push_str("</code></pre>");
            }
            Node::CodeInline { text } => {
                out.push_str("<code>");
                out.push_str(&escape_html(text));
                out.push_str("</code>");
            }
            Node::Link {
                target,
                title,
                children,
            } => {
                out.push_str("<a");
                if let Some(target) = target {
                    out.push_str(&format!(" href=\"{}\"", escape_html(target)));
                }
                if let Some(title) = title {
                    out.push_str(&format!(" title=\"{}\"", escape_html(title)));
                }
                out.push('>');
                out.push_str(&self.render_nodes(children));
                out.push_str("</a>");
            }
            Node::Image { target, alt, title } => {
                out.push_str("<img");
                if let Some(target) = target {
                    out.push_str(&format!(" src=\"{}\"", escape_html(target)));
                }
                if let Some(alt) = alt {
                    out.push_str(&format!(" alt=\"{}\"", escape_html(alt)));
                }
                if let Some(title) = title {
                    out.push_str(&format!(" title=\"{}\"", escape_html(title)));
                }
                out.push_str(" />");
            }
            Node::OrderedList { start, items } => {
                if *start == 1 {
                    out.push_str("<ol>");
                } else {
                    out.push_str(&format!("<ol start=\"{start}\">"));
                }
                for item in items {
                    out.push_str("<li>");
                    out.push_str(&self.render_nodes(item));
                    out.push_str("</li>");
                }
                out.push_str("</ol>");
            }
            Node::UnorderedList { items } => {
                out.push_str("<ul>");
                for item in items {
                    out.push_str("<li>");
                    out.push_str(&self.render_nodes(item));
                    out.push_str("</li>");
                }
                out.push_str("</ul>");
            }
            Node::Table {
                align,
                header,
                rows,
            } => self.render_table(align, header, rows, out),
            Node::GfmTask { completed } => {
                if *completed {
                    out.push_str("<input type=\"checkbox\" checked disabled />");
                } else {
                    out.push_str("<input type=\"checkbox\" disabled />");
                }
            }
            Node::HtmlBlock {
                tag,
                attrs,
                children,
                raw_text,
                ..
            } => {
                out.push('<');
                out.push_str(tag);
                for attr in attrs {
                    out.push_str(&format!(" {}=\"{}\"", attr.name, escape_html(&attr.value)));
                }
                out.push('>');
                match raw_text {
                    Some(raw) => out.push_str(raw),
                    None => out.push_str(&self.render_nodes(children)),
                }
                out.push_str(&format!("</{tag}>"));
            }
            Node::HtmlSelfClosing { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for attr in attrs {
                    out.push_str(&format!(" {}=\"{}\"", attr.name, escape_html(&attr.value)));
                }
                out.push_str(" />");
            }
            Node::HtmlComment { text } => {
                out.push_str(&format!("<!--{text}-->"));
            }
            Node::FootnoteReference {
                identifier,
                display,
            } => {
                out.push_str(&format!(
                    "<a href=\"#footnote-{}\"><sup>{}</sup></a>",
                    escape_html(identifier),
                    escape_html(display)
                ));
            }
            Node::TextFormatted { style, children } => {
                let tag = match style {
                    FormatStyle::Bold => "strong",
                    FormatStyle::Italic => "em",
                    FormatStyle::Strikethrough => "del",
                    FormatStyle::Mark => "mark",
                };
                out.push_str(&format!("<{tag}>"));
                out.push_str(&self.render_nodes(children));
                out.push_str(&format!("</{tag}>"));
            }
        }
    }

    fn render_table(
        &self,
        align: &[Align],
        header: &[Vec<Node>],
        rows: &[Vec<Vec<Node>>],
        out: &mut String,
    ) {
        let style = |idx: usize| match align.get(idx) {
            Some(Align::Left) => " style=\"text-align: left;\"",
            Some(Align::Center) => " style=\"text-align: center;\"",
            Some(Align::Right) => " style=\"text-align: right;\"",
            _ => "",
        };
        out.push_str("<table><thead><tr>");
        for (idx, cell) in header.iter().enumerate() {
            out.push_str(&format!("<th{}>{}</th>", style(idx), self.render_nodes(cell)));
        }
        out.push_str("</tr></thead><tbody>");
        for row in rows {
            out.push_str("<tr>");
            for (idx, cell) in row.iter().enumerate() {
                out.push_str(&format!("<td{}>{}</td>", style(idx), self.render_nodes(cell)));
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Footnote;

    fn render(nodes: Vec<Node>) -> String {
        HtmlRenderer::new(RenderConfig::default()).render(&Document {
            children: nodes,
            footnotes: Vec::new(),
        })
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(render(vec![Node::text("a < b & c")]), "a &lt; b &amp; c");
    }

    #[test]
    fn link_without_target_omits_href() {
        let html = render(vec![Node::Link {
            target: None,
            title: None,
            children: vec![Node::text("x")],
        }]);
        assert_eq!(html, "<a>x</a>");
    }

    #[test]
    fn ordered_list_start_attribute() {
        let html = render(vec![Node::OrderedList {
            start: 2,
            items: vec![vec![Node::text("a")]],
        }]);
        assert_eq!(html, "<ol start=\"2\"><li>a</li></ol>");
    }

    #[test]
    fn table_cells_carry_alignment_styles() {
        let html = render(vec![Node::Table {
            align: vec![Align::Center, Align::None],
            header: vec![vec![Node::text("a")], vec![Node::text("b")]],
            rows: vec![vec![vec![Node::text("1")], vec![Node::text("2")]]],
        }]);
        assert!(html.contains("<th style=\"text-align: center;\">a</th>"));
        assert!(html.contains("<td>2</td>"));
    }

    #[test]
    fn footnote_footer_is_appended() {
        let renderer = HtmlRenderer::new(RenderConfig::default());
        let html = renderer.render(&Document {
            children: vec![Node::FootnoteReference {
                identifier: "n".to_string(),
                display: "n".to_string(),
            }],
            footnotes: vec![Footnote {
                identifier: "n".to_string(),
                children: vec![Node::text("body")],
            }],
        });
        assert!(html.contains("href=\"#footnote-n\""));
        assert!(html.ends_with("<footer><div id=\"footnote-n\">body</div></footer>"));
    }

    #[test]
    fn render_rule_overrides_one_node_kind() {
        fn no_images(node: &Node, _renderer: &HtmlRenderer) -> Option<String> {
            matches!(node, Node::Image { .. }).then(|| String::new())
        }
        let renderer = HtmlRenderer::new(
            RenderConfig::builder().render_rule(no_images).build(),
        );
        let html = renderer.render(&Document {
            children: vec![
                Node::Image {
                    target: Some("/x".to_string()),
                    alt: None,
                    title: None,
                },
                Node::text("kept"),
            ],
            footnotes: Vec::new(),
        });
        assert_eq!(html, "kept");
    }
}
