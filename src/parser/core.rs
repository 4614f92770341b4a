//! The recursive-descent driver.
//!
//! One loop: walk the sorted rule table, take the first scope-active rule
//! whose matcher accepts a prefix of the remaining input, hand the matched
//! slice to its parse function, advance. Parse functions re-enter the
//! driver for nested content through the scoped helpers below.
use crate::ast::Node;
use crate::options::ParseOptions;
use crate::parser::context::{Context, Flags};
use crate::parser::registry::{self, Rule};

/// Recursion ceiling; deeper content degrades to flat text.
const MAX_DEPTH: usize = 64;

/// Slack added to the per-call iteration ceiling.
const ITERATION_SLACK: usize = 64;

/// Driver state for one parse call.
pub struct Parser<'a> {
    pub options: &'a ParseOptions,
    rules: Vec<Rule>,
    pub ctx: Context,
}

impl<'a> Parser<'a> {
    pub fn new(options: &'a ParseOptions) -> Self {
        Self {
            options,
            rules: registry::build_rules(options),
            ctx: Context::new(),
        }
    }

    /// Parses `source` under the current flags, producing a node list.
    ///
    /// Guaranteed to terminate: every accepted match consumes at least one
    /// byte, an unmatched byte is consumed as text, and the loop carries an
    /// iteration ceiling proportional to the input length as a final
    /// backstop. At the recursion ceiling the region degrades to one flat
    /// text node instead of recursing further.
    pub fn nested_parse(&mut self, source: &str) -> Vec<Node> {
        if source.is_empty() {
            return Vec::new();
        }
        if self.ctx.depth >= MAX_DEPTH {
            self.ctx.push_consumed(source);
            return vec![Node::text(source)];
        }
        self.ctx.depth += 1;

        let mut out: Vec<Node> = Vec::new();
        let mut pos = 0;
        let mut iterations = 0;
        let ceiling = source.len() + ITERATION_SLACK;
        while pos < source.len() {
            iterations += 1;
            if iterations > ceiling {
                push_node(&mut out, Node::text(&source[pos..]));
                self.ctx.push_consumed(&source[pos..]);
                break;
            }
            let remaining = &source[pos..];
            let mut advanced = false;
            for idx in 0..self.rules.len() {
                let rule = self.rules[idx];
                if !rule.scope.active(&self.ctx.flags) {
                    continue;
                }
                let len = match (rule.is_match)(remaining, &self.ctx, self.options) {
                    Some(len) if len > 0 && len <= remaining.len() => len,
                    _ => continue,
                };
                let matched = &remaining[..len];
                self.ctx.push_consumed(matched);
                // Parse functions re-enter the driver on derived text
                // (heading bodies, item content, cells); only the matched
                // region is real consumed input, so rewind their pushes.
                let mark = self.ctx.mark_lookbehind();
                let nodes = (rule.parse)(matched, self);
                self.ctx.restore_lookbehind(mark);
                for node in nodes {
                    push_node(&mut out, node);
                }
                pos += len;
                advanced = true;
                break;
            }
            if !advanced {
                // No rule accepted, not even the fallback; consume one
                // character as literal text so the scan always moves.
                let ch_len = remaining
                    .chars()
                    .next()
                    .map(char::len_utf8)
                    .unwrap_or(1);
                push_node(&mut out, Node::text(&remaining[..ch_len]));
                self.ctx.push_consumed(&remaining[..ch_len]);
                pos += ch_len;
            }
        }

        self.ctx.depth -= 1;
        out
    }

    /// Runs `nested_parse` under replacement flags, restoring them after.
    pub fn parse_scoped(&mut self, source: &str, flags: Flags) -> Vec<Node> {
        let saved = self.ctx.flags;
        self.ctx.flags = flags;
        let nodes = self.nested_parse(source);
        self.ctx.flags = saved;
        nodes
    }

    /// Parses nested content in inline scope.
    pub fn parse_inline(&mut self, source: &str) -> Vec<Node> {
        let mut flags = self.ctx.flags;
        flags.inline = true;
        flags.simple = false;
        self.parse_scoped(source, flags)
    }

    /// Parses nested content in simple-inline scope (inside link text, so
    /// link recognition stays off).
    pub fn parse_simple(&mut self, source: &str) -> Vec<Node> {
        let mut flags = self.ctx.flags;
        flags.inline = false;
        flags.simple = true;
        flags.in_anchor = true;
        self.parse_scoped(source, flags)
    }

    /// Parses nested content in block scope.
    pub fn parse_blocks(&mut self, source: &str) -> Vec<Node> {
        let mut flags = self.ctx.flags;
        flags.inline = false;
        flags.simple = false;
        self.parse_scoped(source, flags)
    }
}

/// Appends a node, merging adjacent plain-text nodes.
fn push_node(out: &mut Vec<Node>, node: Node) {
    if let Node::Text { value: tail } = &node {
        if let Some(Node::Text { value: prev }) = out.last_mut() {
            prev.push_str(tail);
            return;
        }
    }
    out.push(node);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_text_nodes_merge() {
        let mut out = vec![Node::text("foo")];
        push_node(&mut out, Node::text("bar"));
        push_node(&mut out, Node::BreakLine);
        push_node(&mut out, Node::text("baz"));
        assert_eq!(
            out,
            vec![Node::text("foobar"), Node::BreakLine, Node::text("baz")]
        );
    }

    #[test]
    fn scoped_parse_restores_flags() {
        let options = ParseOptions::default();
        let mut parser = Parser::new(&options);
        let inline = Flags {
            inline: true,
            ..Flags::default()
        };
        parser.parse_scoped("plain words", inline);
        assert_eq!(parser.ctx.flags, Flags::default());
    }

    #[test]
    fn lookbehind_reflects_only_matched_input_after_reentrant_rules() {
        let options = ParseOptions::default();
        let mut parser = Parser::new(&options);
        // The heading rule re-parses its body text; afterwards the tail
        // must still end at the heading's own newline.
        parser.nested_parse("# head\n");
        assert!(parser.ctx.at_line_start());
    }

    #[test]
    fn empty_input_yields_no_nodes() {
        let options = ParseOptions::default();
        let mut parser = Parser::new(&options);
        assert!(parser.nested_parse("").is_empty());
    }
}
