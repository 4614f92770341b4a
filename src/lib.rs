//! inkdown: a markdown-to-AST engine with a priority-ordered,
//! context-gated rule dispatcher, plus an HTML renderer over the tree.
//!
//! Parsing never fails on document content: malformed syntax degrades to
//! literal text, unsafe URLs are dropped by the sanitizer, and pathological
//! nesting falls back to flat text under a recursion ceiling. The only
//! hard errors are caller-contract ones — conflicting options and inputs
//! over a configured size limit.
//!
//! ```
//! use inkdown::{parse, Node};
//!
//! let doc = parse("# Title\n\nHello *world*");
//! assert!(matches!(doc.children[0], Node::Heading { level: 1, .. }));
//!
//! let html = inkdown::to_html("*hi*");
//! assert_eq!(html, "<em>hi</em>");
//! ```
pub mod ast;
mod entities;
pub mod error;
pub mod options;
mod parser;
pub mod render;
pub mod sanitize;
pub mod slug;
mod streaming;

pub use ast::{
    plain_text, Align, Attribute, Document, Footnote, FormatStyle, Node, NodeKind,
};
pub use error::{MarkdownError, Result};
pub use options::{ParseOptions, ParseOptionsBuilder, Sanitizer, Slugify};
pub use render::{escape_html, HtmlRenderer, RenderConfig, RenderConfigBuilder, RenderRule};

/// Parses markdown with default options. Infallible: any string input
/// yields a document.
pub fn parse(markdown: &str) -> Document {
    parser::parse_document(markdown, &ParseOptions::default())
        .unwrap_or_else(|_| Document::empty())
}

/// Parses markdown under the given options.
pub fn parse_with_options(markdown: &str, options: &ParseOptions) -> Result<Document> {
    parser::parse_document(markdown, options)
}

/// Parses and renders to HTML with default options end to end.
pub fn to_html(markdown: &str) -> String {
    HtmlRenderer::new(RenderConfig::default()).render(&parse(markdown))
}
