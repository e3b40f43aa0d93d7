use thiserror::Error;

use crate::editing::{Assoc, BlockKind, Outline, OutlineBlock};
use crate::position::Position;
use crate::suggestions::proposal::{NormalizedRange, PreviewKind, SelectionRange};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("selection is inverted: {from} > {to}")]
    Inverted { from: Position, to: Position },

    #[error("selection end {to} is past the end of the document ({size})")]
    OutOfBounds { to: Position, size: usize },

    #[error("cannot anchor a selection in an empty document")]
    EmptyDocument,
}

/// Expand a raw selection to boundaries a replacement can safely use.
///
/// The result always satisfies `from <= raw_from <= raw_to <= to` and is
/// never empty. `RangeReplace` grows the selection only as far as character
/// boundaries and atomic inline spans require, unless its ends sit in
/// different text-bearing blocks: then each end grows to its block's edge.
/// `Block` always grows each end to the edge of the innermost text-bearing
/// block around it. A selection cut between two table cells covers the
/// whole table.
pub fn normalize(
    selection: SelectionRange,
    kind: PreviewKind,
    outline: &Outline,
) -> Result<NormalizedRange, RangeError> {
    let SelectionRange { raw_from, raw_to } = selection;
    if raw_from > raw_to {
        return Err(RangeError::Inverted {
            from: raw_from,
            to: raw_to,
        });
    }
    let size = outline.size();
    if size == 0 {
        return Err(RangeError::EmptyDocument);
    }
    if raw_to.0 > size {
        return Err(RangeError::OutOfBounds { to: raw_to, size });
    }

    let (from, to) = minimal_range(raw_from, raw_to, outline);
    let range = match kind {
        PreviewKind::RangeReplace => expand_across_blocks(from, to, outline),
        PreviewKind::Block => expand_to_blocks(from, to, outline),
    };
    Ok(range)
}

fn minimal_range(raw_from: Position, raw_to: Position, outline: &Outline) -> (Position, Position) {
    let mut from = outline.floor_char_boundary(raw_from);
    let mut to = outline.ceil_char_boundary(raw_to);

    // An insertion point still needs one character to anchor on
    if from == to {
        match outline.next_char_boundary(to) {
            Some(next) => to = next,
            None => {
                if let Some(prev) = outline.prev_char_boundary(from) {
                    from = prev;
                }
            }
        }
    }

    // Growing over one atom can land inside another only if they touch
    loop {
        let start = outline.atom_containing(from).map_or(from, |atom| atom.start);
        let end = outline.atom_containing(to).map_or(to, |atom| atom.end);
        if start == from && end == to {
            break;
        }
        from = start;
        to = end;
    }

    (from, to)
}

/// A range inside one textblock is already safe to replace
fn expand_across_blocks(from: Position, to: Position, outline: &Outline) -> NormalizedRange {
    let first = outline.textblock_at(from, Assoc::After);
    let last = outline.textblock_at(to, Assoc::Before);
    if same_block(first, last) {
        return NormalizedRange { from, to };
    }
    widen_to_tables(union(from, to, first, last), outline)
}

/// Endpoints outside any text-bearing block keep their minimal position
fn expand_to_blocks(from: Position, to: Position, outline: &Outline) -> NormalizedRange {
    let first = outline
        .textblock_at(from, Assoc::After)
        .or_else(|| outline.textblock_at(from, Assoc::Before));
    let last = outline
        .textblock_at(to, Assoc::Before)
        .or_else(|| outline.textblock_at(to, Assoc::After));

    let range = union(from, to, first, last);
    if same_block(first, last) {
        range
    } else {
        widen_to_tables(range, outline)
    }
}

fn union(
    from: Position,
    to: Position,
    first: Option<&OutlineBlock>,
    last: Option<&OutlineBlock>,
) -> NormalizedRange {
    NormalizedRange {
        from: first.map_or(from, |block| block.span.start.min(from)),
        to: last.map_or(to, |block| block.span.end.max(to)),
    }
}

fn same_block(first: Option<&OutlineBlock>, last: Option<&OutlineBlock>) -> bool {
    matches!((first, last), (Some(a), Some(b)) if std::ptr::eq(a, b))
}

/// Rows and delimiter lines only survive replacement as a whole table
fn widen_to_tables(range: NormalizedRange, outline: &Outline) -> NormalizedRange {
    let NormalizedRange { mut from, mut to } = range;
    for table in outline
        .blocks()
        .iter()
        .filter(|block| block.kind == BlockKind::Table)
    {
        if table.span.start < from && from < table.span.end {
            from = table.span.start;
        }
        if table.span.start < to && to < table.span.end {
            to = table.span.end;
        }
    }
    NormalizedRange { from, to }
}
