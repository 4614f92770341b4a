//! The abstract syntax tree produced by parsing.
//!
//! The tree is a closed tagged union: every construct the rule set can
//! recognize has exactly one variant here. Nodes are immutable once the
//! parse completes and carry fully resolved children — no further parsing
//! is required downstream.
use serde::Serialize;

/// Table column alignment, taken from the separator row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
    None,
}

/// Style applied by an inline formatting span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatStyle {
    Bold,
    Italic,
    Strikethrough,
    Mark,
}

/// A single HTML attribute as written in the source.
///
/// Bare attributes (`disabled`) carry an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Stable rule-kind identifiers.
///
/// These key the rule registry and the enable/disable options. Declaration
/// order is the documented tie-break between rules of equal priority, so
/// the order below is part of the public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    // MAX band
    FrontMatter,
    HtmlComment,
    RefDefinition,
    FootnoteDefinition,
    HeadingSetext,
    LinkAngle,
    LinkMailto,
    LinkBareUrl,
    // HIGH band
    BreakLine,
    BreakThematic,
    BlockQuote,
    CodeFenced,
    CodeIndented,
    Heading,
    GfmTask,
    HtmlBlock,
    HtmlSelfClosing,
    Image,
    RefImage,
    OrderedList,
    UnorderedList,
    Table,
    FootnoteReference,
    TextEscaped,
    // MED band
    TextBolded,
    TextStrikethrough,
    CodeInline,
    // LOW band
    Link,
    RefLink,
    TextEmphasized,
    TextMarked,
    NewlineCoalescer,
    Paragraph,
    // MIN band — the fallback, never disableable
    Text,
}

/// A parsed AST node.
///
/// `Link::target` and `Image::target` are `None` when the URL sanitizer
/// rejected the written destination; the textual content is preserved
/// either way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Node {
    Text {
        value: String,
    },
    Paragraph {
        children: Vec<Node>,
    },
    Heading {
        level: u8,
        id: String,
        children: Vec<Node>,
    },
    BlockQuote {
        alert: Option<String>,
        children: Vec<Node>,
    },
    BreakLine,
    BreakThematic,
    CodeBlock {
        lang: Option<String>,
        attrs: Option<String>,
        text: String,
    },
    CodeInline {
        text: String,
    },
    Link {
        target: Option<String>,
        title: Option<String>,
        children: Vec<Node>,
    },
    Image {
        target: Option<String>,
        alt: Option<String>,
        title: Option<String>,
    },
    OrderedList {
        start: u32,
        items: Vec<Vec<Node>>,
    },
    UnorderedList {
        items: Vec<Vec<Node>>,
    },
    Table {
        align: Vec<Align>,
        header: Vec<Vec<Node>>,
        rows: Vec<Vec<Vec<Node>>>,
    },
    GfmTask {
        completed: bool,
    },
    HtmlBlock {
        tag: String,
        attrs: Vec<Attribute>,
        children: Vec<Node>,
        raw_text: Option<String>,
        verbatim: bool,
    },
    HtmlSelfClosing {
        tag: String,
        attrs: Vec<Attribute>,
    },
    HtmlComment {
        text: String,
    },
    FootnoteReference {
        identifier: String,
        display: String,
    },
    TextFormatted {
        style: FormatStyle,
        children: Vec<Node>,
    },
}

impl Node {
    /// Convenience constructor for the plain-text variant.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
        }
    }

    /// Returns true if this is a `Text` node.
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text { .. })
    }
}

/// A footnote definition surfaced in the document's trailing collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footnote {
    pub identifier: String,
    pub children: Vec<Node>,
}

/// Root of a parsed document.
///
/// `children` is the renderable node list; reference definitions never
/// appear in it. `footnotes` is the ordered trailing collection of footnote
/// bodies, deduplicated by identifier, for the renderer to place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub children: Vec<Node>,
    pub footnotes: Vec<Footnote>,
}

impl Document {
    pub fn empty() -> Self {
        Self {
            children: Vec::new(),
            footnotes: Vec::new(),
        }
    }
}

/// Collects the plain text content of a node list, ignoring structure.
///
/// Used for heading slugs and image alt fallbacks.
pub fn plain_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    collect_plain_text(nodes, &mut out);
    out
}

fn collect_plain_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text { value } => out.push_str(value),
            Node::CodeInline { text } => out.push_str(text),
            Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::BlockQuote { children, .. }
            | Node::Link { children, .. }
            | Node::TextFormatted { children, .. }
            | Node::HtmlBlock { children, .. } => collect_plain_text(children, out),
            Node::Image { alt, .. } => {
                if let Some(alt) = alt {
                    out.push_str(alt);
                }
            }
            Node::FootnoteReference { display, .. } => out.push_str(display),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_flattens_nested_children() {
        let nodes = vec![
            Node::text("a "),
            Node::TextFormatted {
                style: FormatStyle::Bold,
                children: vec![Node::text("b")],
            },
            Node::CodeInline {
                text: " c".to_string(),
            },
        ];
        assert_eq!(plain_text(&nodes), "a b c");
    }

    #[test]
    fn node_serializes_with_kind_tag() {
        let node = Node::text("hi");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["value"], "hi");
    }
}
