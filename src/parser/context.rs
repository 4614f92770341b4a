//! Parse-time state threaded through every rule invocation.
use std::collections::HashMap;

/// Number of trailing consumed bytes retained for lookbehind.
///
/// Only start-of-line detection reads the tail, so a small window is
/// enough; consumed text is never re-scanned.
const LOOKBEHIND_BYTES: usize = 64;

/// Scope flags, saved and restored as a unit around scoped sub-parses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Inline scope: character-level formatting, links, text.
    pub inline: bool,
    /// Simple scope: inline with link recognition disabled.
    pub simple: bool,
    /// Currently parsing list item content.
    pub in_list: bool,
    /// Currently parsing a table cell.
    pub in_table: bool,
    /// Currently parsing link display text.
    pub in_anchor: bool,
}

impl Flags {
    /// Block scope is the absence of both inline flags.
    pub fn is_block(&self) -> bool {
        !self.inline && !self.simple
    }
}

/// A collected link/image reference definition.
#[derive(Debug, Clone, PartialEq)]
pub struct RefDef {
    pub target: String,
    pub title: Option<String>,
}

/// A collected footnote definition; the body is parsed after the main pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FootnoteDef {
    pub identifier: String,
    pub body: String,
}

/// Saved lookbehind state, taken around re-entrant parses.
#[derive(Debug)]
pub(crate) struct LookbehindMark {
    tail: String,
    total: usize,
}

/// The mutable-but-restorable environment of one `parse` call.
///
/// The reference table and footnote accumulator are append-only during
/// collection and read-only during resolution; the phases never overlap.
#[derive(Debug, Default)]
pub struct Context {
    pub flags: Flags,
    /// Bounded tail of already-consumed input, for zero-width lookbehind.
    consumed_tail: String,
    /// Total bytes consumed so far; distinguishes "empty tail" from
    /// "start of input".
    consumed_total: usize,
    pub refs: HashMap<String, RefDef>,
    pub footnotes: Vec<FootnoteDef>,
    /// Current re-entrant driver depth.
    pub depth: usize,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records consumed input, keeping only the bounded tail.
    pub fn push_consumed(&mut self, text: &str) {
        self.consumed_total += text.len();
        if text.len() >= LOOKBEHIND_BYTES {
            self.consumed_tail.clear();
            let mut start = text.len() - LOOKBEHIND_BYTES;
            while !text.is_char_boundary(start) {
                start += 1;
            }
            self.consumed_tail.push_str(&text[start..]);
            return;
        }
        self.consumed_tail.push_str(text);
        if self.consumed_tail.len() > LOOKBEHIND_BYTES {
            let mut cut = self.consumed_tail.len() - LOOKBEHIND_BYTES;
            while !self.consumed_tail.is_char_boundary(cut) {
                cut += 1;
            }
            self.consumed_tail.drain(..cut);
        }
    }

    /// Captures the lookbehind so a nested parse of derived text (heading
    /// bodies, item content, cells) cannot leave its pushes behind.
    pub(crate) fn mark_lookbehind(&self) -> LookbehindMark {
        LookbehindMark {
            tail: self.consumed_tail.clone(),
            total: self.consumed_total,
        }
    }

    /// Rewinds the lookbehind to a captured mark.
    pub(crate) fn restore_lookbehind(&mut self, mark: LookbehindMark) {
        self.consumed_tail = mark.tail;
        self.consumed_total = mark.total;
    }

    /// True when nothing has been consumed yet (absolute input start).
    pub fn at_input_start(&self) -> bool {
        self.consumed_total == 0
    }

    /// True at the start of a line: nothing consumed yet, or everything
    /// since the last newline is spaces.
    pub fn at_line_start(&self) -> bool {
        let trimmed = self.consumed_tail.trim_end_matches(' ');
        self.consumed_total == 0 || trimmed.ends_with('\n') || trimmed.is_empty()
    }

    /// The last consumed character, if any survives in the tail.
    pub fn last_consumed_char(&self) -> Option<char> {
        self.consumed_tail.chars().last()
    }

    /// Normalizes a reference label for table insertion and lookup.
    pub fn normalize_label(label: &str) -> String {
        let mut out = String::with_capacity(label.len());
        let mut last_was_space = false;
        for ch in label.trim().chars() {
            if ch.is_whitespace() {
                if !last_was_space {
                    out.push(' ');
                }
                last_was_space = true;
            } else {
                out.extend(ch.to_lowercase());
                last_was_space = false;
            }
        }
        out
    }

    /// Looks up a reference definition by raw label.
    pub fn lookup_ref(&self, label: &str) -> Option<&RefDef> {
        self.refs.get(&Self::normalize_label(label))
    }

    /// True when a footnote with this identifier was collected.
    pub fn has_footnote(&self, identifier: &str) -> bool {
        self.footnotes.iter().any(|f| f.identifier == identifier)
    }
}
