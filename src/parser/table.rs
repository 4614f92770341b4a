//! Pipe tables.
//!
//! A table is a header line, an alignment separator, and any number of
//! data lines. Once the separator parses, the construct is a table for
//! good — a missing body still yields a table node with empty rows.
use crate::ast::{Align, Node};
use crate::options::ParseOptions;
use crate::parser::context::Context;
use crate::parser::core::Parser;
use crate::parser::scan::{find_backtick_close, is_blank, run_len, split_line};
use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::{all_consuming, map, opt},
    multi::separated_list1,
    sequence::{delimited, tuple},
    IResult,
};

fn alignment_cell(input: &str) -> IResult<&str, Align> {
    map(
        tuple((
            opt(char(':')),
            take_while1(|c| c == '-'),
            opt(char(':')),
        )),
        |(left, _, right)| match (left.is_some(), right.is_some()) {
            (true, true) => Align::Center,
            (true, false) => Align::Left,
            (false, true) => Align::Right,
            (false, false) => Align::None,
        },
    )(input)
}

/// Parses the full separator line into per-column alignments. `None` means
/// the line is not a separator and the construct degrades to a paragraph.
fn alignment_row(line: &str) -> Option<Vec<Align>> {
    let parsed: IResult<&str, Vec<Align>> = all_consuming(delimited(
        opt(char('|')),
        separated_list1(
            char('|'),
            delimited(space0, alignment_cell, space0),
        ),
        opt(char('|')),
    ))(line.trim());
    match parsed {
        Ok((_, aligns)) => Some(aligns),
        Err(_) => None,
    }
}

/// True when the line carries a pipe that is neither escaped nor inside a
/// code span.
fn has_table_pipe(line: &str) -> bool {
    !split_cells_raw(line).1
}

/// Splits a row on unprotected pipes. Returns the cells and whether no
/// boundary pipe was found at all.
fn split_cells_raw(line: &str) -> (Vec<&str>, bool) {
    let bytes = line.as_bytes();
    let mut cells = Vec::new();
    let mut cell_start = 0;
    let mut found = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                let open = run_len(&line[i..], b'`');
                match find_backtick_close(&line[i + open..], open) {
                    Some(close) => i += open + close,
                    None => i += open,
                }
            }
            b'|' => {
                cells.push(&line[cell_start..i]);
                cell_start = i + 1;
                found = true;
                i += 1;
            }
            _ => i += 1,
        }
    }
    cells.push(&line[cell_start.min(line.len())..]);
    (cells, !found)
}

/// Row cells with the bounding-pipe empties dropped.
fn split_cells(line: &str) -> Vec<&str> {
    let (mut cells, _) = split_cells_raw(line);
    if line.trim_start().starts_with('|') {
        if let Some(first) = cells.first() {
            if first.trim().is_empty() {
                cells.remove(0);
            }
        }
    }
    if line.trim_end().ends_with('|') && cells.len() > 1 {
        if let Some(last) = cells.last() {
            if last.trim().is_empty() {
                cells.pop();
            }
        }
    }
    cells
}

pub fn match_table(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    let (header, rest) = split_line(s);
    if is_blank(header) || !has_table_pipe(header) || rest.is_empty() {
        return None;
    }
    let (separator, _) = split_line(rest);
    alignment_row(separator)?;

    let mut offset = line_len(s, header);
    offset += line_len(&s[offset..], separator);
    while offset < s.len() {
        let (line, _) = split_line(&s[offset..]);
        if is_blank(line) || !has_table_pipe(line) {
            break;
        }
        offset += line_len(&s[offset..], line);
    }
    Some(offset)
}

fn line_len(source: &str, line: &str) -> usize {
    if source.len() > line.len() {
        line.len() + 1
    } else {
        line.len()
    }
}

pub fn parse_table(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let (header_line, rest) = split_line(matched);
    let (separator, body) = split_line(rest);
    let mut align = alignment_row(separator).unwrap_or_default();

    let header = parse_row(header_line, parser);
    let width = header.len();
    align.resize(width, Align::None);
    align.truncate(width);

    let mut rows = Vec::new();
    for line in body.lines() {
        if is_blank(line) {
            break;
        }
        let mut row = parse_row(line, parser);
        // Ragged rows are padded or truncated to the header width.
        while row.len() < width {
            row.push(Vec::new());
        }
        row.truncate(width);
        rows.push(row);
    }

    vec![Node::Table {
        align,
        header,
        rows,
    }]
}

fn parse_row(line: &str, parser: &mut Parser<'_>) -> Vec<Vec<Node>> {
    let mut flags = parser.ctx.flags;
    flags.inline = true;
    flags.simple = false;
    flags.in_table = true;
    split_cells(line)
        .into_iter()
        .map(|cell| parser.parse_scoped(cell.trim(), flags))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_row_variants() {
        assert_eq!(
            alignment_row("| :-- | :-: | --: | --- |"),
            Some(vec![Align::Left, Align::Center, Align::Right, Align::None])
        );
        assert_eq!(alignment_row("-|-"), Some(vec![Align::None, Align::None]));
        assert_eq!(alignment_row("| a | b |"), None);
        assert_eq!(alignment_row("plain text"), None);
    }

    #[test]
    fn protected_pipes_do_not_split_cells() {
        assert_eq!(split_cells("a | `b|c` | d"), vec!["a ", " `b|c` ", " d"]);
        assert_eq!(split_cells("a | b\\|c"), vec!["a ", " b\\|c"]);
    }

    #[test]
    fn bounding_pipes_drop_empty_edge_cells() {
        assert_eq!(split_cells("| a | b |"), vec![" a ", " b "]);
        assert_eq!(split_cells("a | b"), vec!["a ", " b"]);
    }

    #[test]
    fn header_only_table_still_matches() {
        let options = ParseOptions::default();
        let src = "| a | b |\n| - | - |\n\nafter";
        let len = match_table(src, &Context::new(), &options).unwrap();
        assert_eq!(&src[..len], "| a | b |\n| - | - |\n");
    }

    #[test]
    fn invalid_separator_is_no_table() {
        let options = ParseOptions::default();
        assert_eq!(
            match_table("| a | b |\n| x | y |\n", &Context::new(), &options),
            None
        );
    }

    #[test]
    fn ragged_rows_are_padded_to_header_width() {
        let options = ParseOptions::default();
        let mut parser = Parser::new(&options);
        let nodes = parse_table("| a | b |\n| - | - |\n| only |\n", &mut parser);
        match &nodes[0] {
            Node::Table { header, rows, .. } => {
                assert_eq!(header.len(), 2);
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].len(), 2);
                assert!(rows[0][1].is_empty());
            }
            other => panic!("expected table, got {other:?}"),
        }
    }
}
