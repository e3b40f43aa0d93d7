use pulldown_cmark::{Event, Parser, Tag};

use crate::content::markdown_options;
use crate::editing::Assoc;
use crate::position::{Position, Span};

/// Structural kind of a block in the outline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading { level: u8 },
    BlockQuote,
    Callout,
    CodeBlock,
    HtmlBlock,
    List { ordered: bool },
    ListItem,
    Table,
    TableRow,
    TableCell,
    Rule,
    Other,
}

/// A block node of the document with its position ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineBlock {
    pub kind: BlockKind,
    /// Full span including Markdown syntax, trailing line endings trimmed
    pub span: Span,
    /// Extent of the block's own inline content; `None` for pure containers
    pub content: Option<Span>,
    /// Nesting depth (top-level blocks are 0)
    pub depth: usize,
}

impl OutlineBlock {
    /// Blocks that hold text directly
    pub fn is_textblock(&self) -> bool {
        self.content.is_some()
    }
}

/// Read-only structural index of a document: where nodes start and end.
///
/// The normalizer uses it to find safe replacement boundaries and the overlay
/// uses it to keep highlights off block syntax. Built from scratch after
/// every edit; it never outlives the text it describes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    text: String,
    blocks: Vec<OutlineBlock>,
    atoms: Vec<Span>,
}

impl Outline {
    pub fn from_markdown(text: &str) -> Self {
        let mut blocks: Vec<OutlineBlock> = Vec::new();
        let mut atoms = Vec::new();
        // One entry per open tag; `None` for inline tags
        let mut open: Vec<Option<usize>> = Vec::new();

        for (event, range) in Parser::new_ext(text, markdown_options()).into_offset_iter() {
            match event {
                Event::Start(tag) => {
                    if let Some(kind) = block_kind(&tag) {
                        blocks.push(OutlineBlock {
                            kind,
                            span: trim_line_endings(text, range),
                            content: None,
                            depth: open.iter().flatten().count(),
                        });
                        open.push(Some(blocks.len() - 1));
                    } else {
                        if matches!(tag, Tag::Image { .. }) {
                            atoms.push(Span::from(range.clone()));
                        }
                        extend_content(&mut blocks, &open, range);
                        open.push(None);
                    }
                }
                Event::End(_) => {
                    open.pop();
                }
                Event::Rule => blocks.push(OutlineBlock {
                    kind: BlockKind::Rule,
                    span: trim_line_endings(text, range),
                    content: None,
                    depth: open.iter().flatten().count(),
                }),
                Event::Code(_)
                | Event::InlineHtml(_)
                | Event::InlineMath(_)
                | Event::DisplayMath(_)
                | Event::FootnoteReference(_)
                | Event::TaskListMarker(_) => {
                    atoms.push(Span::from(range.clone()));
                    extend_content(&mut blocks, &open, range);
                }
                Event::Text(_) | Event::Html(_) | Event::SoftBreak | Event::HardBreak => {
                    extend_content(&mut blocks, &open, range);
                }
            }
        }

        atoms.sort();
        Self {
            text: text.to_string(),
            blocks,
            atoms,
        }
    }

    pub fn size(&self) -> usize {
        self.text.len()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Blocks in document order, parents before their children
    pub fn blocks(&self) -> &[OutlineBlock] {
        &self.blocks
    }

    /// Inline spans that must never be split
    pub fn atoms(&self) -> &[Span] {
        &self.atoms
    }

    pub fn is_char_boundary(&self, pos: Position) -> bool {
        self.text.is_char_boundary(pos.0)
    }

    /// Nearest character boundary at or before `pos`
    pub fn floor_char_boundary(&self, pos: Position) -> Position {
        let mut offset = pos.0.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        Position(offset)
    }

    /// Nearest character boundary at or after `pos`
    pub fn ceil_char_boundary(&self, pos: Position) -> Position {
        let mut offset = pos.0.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset += 1;
        }
        Position(offset)
    }

    /// Boundary of the character following `pos`, if any
    pub fn next_char_boundary(&self, pos: Position) -> Option<Position> {
        let start = self.ceil_char_boundary(pos).0;
        let ch = self.text[start..].chars().next()?;
        Some(Position(start + ch.len_utf8()))
    }

    /// Boundary of the character preceding `pos`, if any
    pub fn prev_char_boundary(&self, pos: Position) -> Option<Position> {
        let end = self.floor_char_boundary(pos).0;
        let ch = self.text[..end].chars().next_back()?;
        Some(Position(end - ch.len_utf8()))
    }

    /// The atomic span that `pos` falls strictly inside
    pub fn atom_containing(&self, pos: Position) -> Option<Span> {
        self.atoms
            .iter()
            .copied()
            .find(|atom| atom.start < pos && pos < atom.end)
    }

    /// Innermost text-bearing block touching `pos`.
    ///
    /// `Assoc::After` looks for a block continuing after `pos` (a range start),
    /// `Assoc::Before` for one reaching up to `pos` (a range end).
    pub fn textblock_at(&self, pos: Position, side: Assoc) -> Option<&OutlineBlock> {
        self.blocks
            .iter()
            .filter(|block| block.is_textblock())
            .filter(|block| match side {
                Assoc::After => block.span.start <= pos && pos < block.span.end,
                Assoc::Before => block.span.start < pos && pos <= block.span.end,
            })
            .max_by_key(|block| block.depth)
    }

    /// Pull a span that sits on a block's outer edge onto its content edge.
    ///
    /// A span covering `# Title` becomes the span of `Title`; a span that
    /// starts or ends mid-text is returned unchanged.
    pub fn interior(&self, span: Span) -> Span {
        let mut start = span.start;
        let mut end = span.end;

        for block in &self.blocks {
            let Some(content) = block.content else {
                continue;
            };
            if block.span.start == span.start && content.start > start && content.start < end {
                start = content.start;
            }
            if block.span.end == span.end && content.end < end && content.end > start {
                end = content.end;
            }
        }

        Span { start, end }
    }
}

fn block_kind(tag: &Tag) -> Option<BlockKind> {
    let kind = match tag {
        Tag::Paragraph => BlockKind::Paragraph,
        Tag::Heading { level, .. } => BlockKind::Heading {
            level: *level as u8,
        },
        Tag::BlockQuote(None) => BlockKind::BlockQuote,
        Tag::BlockQuote(Some(_)) => BlockKind::Callout,
        Tag::CodeBlock(_) => BlockKind::CodeBlock,
        Tag::HtmlBlock => BlockKind::HtmlBlock,
        Tag::List(start) => BlockKind::List {
            ordered: start.is_some(),
        },
        Tag::Item => BlockKind::ListItem,
        Tag::Table(_) => BlockKind::Table,
        Tag::TableHead | Tag::TableRow => BlockKind::TableRow,
        Tag::TableCell => BlockKind::TableCell,
        Tag::FootnoteDefinition(_)
        | Tag::DefinitionList
        | Tag::DefinitionListTitle
        | Tag::DefinitionListDefinition
        | Tag::MetadataBlock(_) => BlockKind::Other,
        Tag::Emphasis
        | Tag::Strong
        | Tag::Strikethrough
        | Tag::Superscript
        | Tag::Subscript
        | Tag::Link { .. }
        | Tag::Image { .. } => return None,
    };
    Some(kind)
}

/// Grow the content extent of the innermost open block
fn extend_content(blocks: &mut [OutlineBlock], open: &[Option<usize>], range: std::ops::Range<usize>) {
    let Some(index) = open.iter().rev().flatten().next().copied() else {
        return;
    };
    let range = Span::from(range);
    let block = &mut blocks[index];
    block.content = Some(match block.content {
        Some(existing) => Span {
            start: existing.start.min(range.start),
            end: existing.end.max(range.end),
        },
        None => range,
    });
}

fn trim_line_endings(text: &str, range: std::ops::Range<usize>) -> Span {
    let trimmed = text[range.clone()].trim_end_matches(['\n', '\r']);
    Span::new(range.start, range.start + trimmed.len())
}
