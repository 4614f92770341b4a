//! The parsing engine: normalization, block/inline detection, the
//! two-phase definition collection, the rule-driven main pass, and
//! footnote finalization.
pub mod blocks;
pub mod context;
pub mod core;
pub mod html;
pub mod inline;
pub mod links;
pub mod list;
pub mod refs;
pub mod registry;
pub mod scan;
pub mod table;

use crate::ast::{Document, Footnote};
use crate::error::{MarkdownError, Result};
use crate::options::ParseOptions;
use crate::streaming;
use context::Flags;
use core::Parser;

/// Parses a markdown document into its AST.
///
/// The only hard failure is an input larger than the configured limit;
/// malformed syntax always degrades to literal text instead.
pub fn parse_document(markdown: &str, options: &ParseOptions) -> Result<Document> {
    if let Some(limit) = options.max_input_size {
        if markdown.len() > limit {
            return Err(MarkdownError::InputTooLarge {
                size: markdown.len(),
                limit,
            });
        }
    }

    let mut source = normalize(markdown);
    if options.optimize_for_streaming {
        let keep = streaming::truncate_incomplete(&source).len();
        source.truncate(keep);
    }

    let block = if options.force_block {
        true
    } else if options.force_inline {
        false
    } else {
        looks_like_block(&source)
    };
    if block {
        // Block mode wants a clean final line boundary.
        source.truncate(source.trim_end().len());
        source.push('\n');
    }

    let mut parser = Parser::new(options);
    refs::collect_definitions(&source, &mut parser.ctx);

    let flags = if block {
        Flags::default()
    } else {
        Flags {
            inline: true,
            ..Flags::default()
        }
    };
    let children = parser.parse_scoped(&source, flags);
    let footnotes = finalize_footnotes(&mut parser);
    Ok(Document {
        children,
        footnotes,
    })
}

/// Line endings become `\n`, tabs become four spaces.
fn normalize(markdown: &str) -> String {
    markdown.replace("\r\n", "\n").replace('\r', "\n").replace('\t', "    ")
}

/// Auto-detection: multi-line input or anything opening with block syntax
/// parses in block mode, a short plain fragment parses inline.
fn looks_like_block(source: &str) -> bool {
    source.contains('\n')
        || source.starts_with("  ")
        || blocks::interrupts_paragraph(source)
        || source.starts_with('|')
}

/// Footnote bodies parse in block scope once the main pass has finished,
/// so their own content can use every construct (including references).
fn finalize_footnotes(parser: &mut Parser<'_>) -> Vec<Footnote> {
    let defs = parser.ctx.footnotes.clone();
    defs.into_iter()
        .map(|def| Footnote {
            children: parser.parse_scoped(def.body.trim(), Flags::default()),
            identifier: def.identifier,
        })
        .collect()
}
