//! Content-tree fragments carried by suggestions.
//!
//! A [`Fragment`] is an ordered list of [`ContentNode`]s: the original span
//! and the suggested replacement are both fragments, never flat strings. The
//! node set mirrors the block structure the preview cares about; inline marks
//! (emphasis, links) are flattened into their text.

mod emit;
mod markdown;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) use markdown::markdown_options;

/// Reasons a fragment cannot be written into a document
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("{node} cannot appear inside {parent}")]
    Misplaced {
        node: &'static str,
        parent: &'static str,
    },
}

fn default_list_start() -> u64 {
    1
}

/// One node of a content tree.
///
/// Serialized with an internal `type` tag so upstream producers can send
/// fragments as JSON, e.g. `{"type": "paragraph", "children": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentNode {
    Text {
        text: String,
    },
    HardBreak,
    Paragraph {
        #[serde(default)]
        children: Vec<ContentNode>,
    },
    Heading {
        level: u8,
        #[serde(default)]
        children: Vec<ContentNode>,
    },
    BulletList {
        #[serde(default)]
        children: Vec<ContentNode>,
    },
    OrderedList {
        #[serde(default = "default_list_start")]
        start: u64,
        #[serde(default)]
        children: Vec<ContentNode>,
    },
    /// A list item; `checked` is set for task items
    ListItem {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checked: Option<bool>,
        #[serde(default)]
        children: Vec<ContentNode>,
    },
    Table {
        #[serde(default)]
        children: Vec<ContentNode>,
    },
    TableRow {
        #[serde(default)]
        children: Vec<ContentNode>,
    },
    TableCell {
        #[serde(default)]
        children: Vec<ContentNode>,
    },
    Blockquote {
        #[serde(default)]
        children: Vec<ContentNode>,
    },
    CodeBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        #[serde(default)]
        children: Vec<ContentNode>,
    },
    Callout {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
        #[serde(default)]
        children: Vec<ContentNode>,
    },
    /// Any node type this engine has no special handling for
    Other {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default)]
        children: Vec<ContentNode>,
    },
}

impl ContentNode {
    pub fn text(text: impl Into<String>) -> Self {
        ContentNode::Text { text: text.into() }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentNode::Paragraph {
            children: vec![ContentNode::text(text)],
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        ContentNode::Heading {
            level,
            children: vec![ContentNode::text(text)],
        }
    }

    /// A list item holding a single line of text
    pub fn item(text: impl Into<String>) -> Self {
        ContentNode::ListItem {
            checked: None,
            children: vec![ContentNode::paragraph(text)],
        }
    }

    pub fn task(checked: bool, text: impl Into<String>) -> Self {
        ContentNode::ListItem {
            checked: Some(checked),
            children: vec![ContentNode::paragraph(text)],
        }
    }

    /// A table from rows of plain-text cells
    pub fn table<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        ContentNode::Table {
            children: rows
                .into_iter()
                .map(|row| ContentNode::TableRow {
                    children: row
                        .into_iter()
                        .map(|cell| ContentNode::TableCell {
                            children: vec![ContentNode::text(cell)],
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Child nodes; empty for leaves
    pub fn children(&self) -> &[ContentNode] {
        match self {
            ContentNode::Text { .. } | ContentNode::HardBreak => &[],
            ContentNode::Paragraph { children }
            | ContentNode::Heading { children, .. }
            | ContentNode::BulletList { children }
            | ContentNode::OrderedList { children, .. }
            | ContentNode::ListItem { children, .. }
            | ContentNode::Table { children }
            | ContentNode::TableRow { children }
            | ContentNode::TableCell { children }
            | ContentNode::Blockquote { children }
            | ContentNode::CodeBlock { children, .. }
            | ContentNode::Callout { children, .. }
            | ContentNode::Other { children, .. } => children,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<ContentNode>> {
        match self {
            ContentNode::Text { .. } | ContentNode::HardBreak => None,
            ContentNode::Paragraph { children }
            | ContentNode::Heading { children, .. }
            | ContentNode::BulletList { children }
            | ContentNode::OrderedList { children, .. }
            | ContentNode::ListItem { children, .. }
            | ContentNode::Table { children }
            | ContentNode::TableRow { children }
            | ContentNode::TableCell { children }
            | ContentNode::Blockquote { children }
            | ContentNode::CodeBlock { children, .. }
            | ContentNode::Callout { children, .. }
            | ContentNode::Other { children, .. } => Some(children),
        }
    }

    /// Text leaves and line breaks; everything else is block structure
    pub fn is_inline(&self) -> bool {
        matches!(self, ContentNode::Text { .. } | ContentNode::HardBreak)
    }

    /// Snake-case type name, as used in the serialized tag
    pub fn kind_name(&self) -> &'static str {
        match self {
            ContentNode::Text { .. } => "text",
            ContentNode::HardBreak => "hard_break",
            ContentNode::Paragraph { .. } => "paragraph",
            ContentNode::Heading { .. } => "heading",
            ContentNode::BulletList { .. } => "bullet_list",
            ContentNode::OrderedList { .. } => "ordered_list",
            ContentNode::ListItem { .. } => "list_item",
            ContentNode::Table { .. } => "table",
            ContentNode::TableRow { .. } => "table_row",
            ContentNode::TableCell { .. } => "table_cell",
            ContentNode::Blockquote { .. } => "blockquote",
            ContentNode::CodeBlock { .. } => "code_block",
            ContentNode::Callout { .. } => "callout",
            ContentNode::Other { .. } => "other",
        }
    }
}

/// An ordered run of content nodes: a slice of a document, not a whole one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fragment(pub Vec<ContentNode>);

impl Fragment {
    pub fn new(nodes: Vec<ContentNode>) -> Self {
        Fragment(nodes)
    }

    /// A fragment holding one text leaf
    pub fn text(text: impl Into<String>) -> Self {
        Fragment(vec![ContentNode::text(text)])
    }

    /// Parse Markdown into a fragment (tables, task lists and callouts enabled)
    pub fn from_markdown(source: &str) -> Self {
        Fragment(markdown::parse_fragment(source))
    }

    /// Render back to Markdown for insertion into a text document.
    ///
    /// Inline-only content, or a single paragraph, renders without block
    /// separators so it can replace a span inside a line.
    pub fn to_markdown(&self) -> Result<String, ContentError> {
        emit::render_fragment(&self.0)
    }

    pub fn nodes(&self) -> &[ContentNode] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the fragment can be placed mid-line
    pub fn is_inline(&self) -> bool {
        self.0.iter().all(ContentNode::is_inline)
            || matches!(self.0.as_slice(), [ContentNode::Paragraph { .. }])
    }
}

impl From<Vec<ContentNode>> for Fragment {
    fn from(nodes: Vec<ContentNode>) -> Self {
        Fragment(nodes)
    }
}
