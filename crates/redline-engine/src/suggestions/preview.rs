//! Flat, human-readable previews of content fragments.
//!
//! Used for the before/after panes of range replacements. The output keeps
//! list markers, one line per table row and one line per text block (code
//! blocks keep their own lines), and is normalized so two previews differ
//! only where their content does.

use std::sync::LazyLock;

use regex::Regex;

use crate::content::ContentNode;

/// Indentation of nested lists when no configuration is given
pub const DEFAULT_INDENT: &str = "  ";

static PARAGRAPH_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("paragraph gap pattern is valid"));

/// Serialize nodes to preview text with the default indentation
pub fn serialize(nodes: &[ContentNode]) -> String {
    serialize_with_indent(nodes, DEFAULT_INDENT)
}

/// Serialize nodes to preview text, indenting nested lists by `indent_unit`
pub fn serialize_with_indent(nodes: &[ContentNode], indent_unit: &str) -> String {
    let mut writer = PreviewWriter {
        out: String::new(),
        indent_unit,
    };
    writer.nodes(nodes, 0);
    tidy(&writer.out)
}

/// Unify line endings, drop trailing spaces and cap blank runs at one line
fn tidy(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n");
    let lines: Vec<&str> = unified.lines().map(str::trim_end).collect();
    let joined = lines.join("\n");
    PARAGRAPH_GAP.replace_all(&joined, "\n\n").trim().to_string()
}

struct PreviewWriter<'a> {
    out: String,
    indent_unit: &'a str,
}

impl PreviewWriter<'_> {
    fn nodes(&mut self, nodes: &[ContentNode], depth: usize) {
        for node in nodes {
            self.node(node, depth);
        }
    }

    fn node(&mut self, node: &ContentNode, depth: usize) {
        match node {
            ContentNode::Text { text } => self.out.push_str(text),
            ContentNode::HardBreak => self.out.push('\n'),
            ContentNode::Paragraph { children }
            | ContentNode::Heading { children, .. }
            | ContentNode::CodeBlock { children, .. } => self.line(depth, &inline_text(children)),
            ContentNode::Blockquote { children } | ContentNode::Callout { children, .. } => {
                self.line(depth, &flat_text(children))
            }
            ContentNode::BulletList { children } => self.list(children, None, depth),
            ContentNode::OrderedList { start, children } => {
                self.list(children, Some(*start), depth)
            }
            ContentNode::ListItem { checked, .. } => {
                self.item(node, &item_marker(*checked, None), depth)
            }
            ContentNode::Table { children } => self.nodes(children, depth),
            ContentNode::TableRow { children } => self.row(children, depth),
            ContentNode::TableCell { children } => self.line(depth, &flat_text(children)),
            ContentNode::Other { text, children, .. } => {
                if !children.is_empty() {
                    self.nodes(children, depth);
                } else if let Some(text) = text {
                    self.out.push_str(text);
                }
            }
        }
    }

    /// Write a block's text on its own line(s); empty text writes nothing
    fn line(&mut self, depth: usize, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        let indent = self.indent_unit.repeat(depth);
        for line in text.lines() {
            self.out.push_str(&indent);
            self.out.push_str(line);
            self.out.push('\n');
        }
    }

    fn list(&mut self, items: &[ContentNode], start: Option<u64>, depth: usize) {
        let mut number = start;
        for item in items {
            let ContentNode::ListItem { checked, .. } = item else {
                self.node(item, depth);
                continue;
            };
            self.item(item, &item_marker(*checked, number), depth);
            number = number.map(|n| n + 1);
        }
    }

    /// The item's leading text goes on the marker line; nested blocks follow
    /// one level deeper.
    fn item(&mut self, item: &ContentNode, marker: &str, depth: usize) {
        let children = item.children();
        let leading_inline = children
            .iter()
            .position(|child| !child.is_inline())
            .unwrap_or(children.len());

        let (head, rest) = if leading_inline > 0 {
            (inline_text(&children[..leading_inline]), &children[leading_inline..])
        } else {
            match children.first() {
                Some(ContentNode::Paragraph { children: inline })
                | Some(ContentNode::Heading {
                    children: inline, ..
                }) => (inline_text(inline), &children[1..]),
                _ => (String::new(), children),
            }
        };

        let head = head
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        self.line(depth, &format!("{marker} {head}"));
        self.nodes(rest, depth + 1);
    }

    fn row(&mut self, cells: &[ContentNode], depth: usize) {
        let texts: Vec<String> = cells
            .iter()
            .map(|cell| flat_text(std::slice::from_ref(cell)))
            .collect();
        if texts.iter().all(String::is_empty) {
            return;
        }
        self.line(depth, &texts.join(" | "));
    }
}

/// Task state wins over numbering
fn item_marker(checked: Option<bool>, number: Option<u64>) -> String {
    match (checked, number) {
        (Some(true), _) => "- [x]".to_string(),
        (Some(false), _) => "- [ ]".to_string(),
        (None, Some(n)) => format!("{n}."),
        (None, None) => "-".to_string(),
    }
}

/// Text of inline content; line breaks stay line breaks
fn inline_text(nodes: &[ContentNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            ContentNode::Text { text } => out.push_str(text),
            ContentNode::HardBreak => out.push('\n'),
            ContentNode::Other {
                text: Some(text),
                children,
                ..
            } if children.is_empty() => out.push_str(text),
            other => out.push_str(&inline_text(other.children())),
        }
    }
    out
}

/// All text below `nodes` on one line, whitespace runs collapsed
fn flat_text(nodes: &[ContentNode]) -> String {
    let mut raw = String::new();
    collect_flat(nodes, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_flat(nodes: &[ContentNode], out: &mut String) {
    for node in nodes {
        match node {
            ContentNode::Text { text } => out.push_str(text),
            ContentNode::Other {
                text: Some(text),
                children,
                ..
            } if children.is_empty() => out.push_str(text),
            other => {
                out.push(' ');
                collect_flat(other.children(), out);
                out.push(' ');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Fragment;
    use pretty_assertions::assert_eq;

    fn ordered(start: u64, items: &[&str]) -> ContentNode {
        ContentNode::OrderedList {
            start,
            children: items.iter().map(|text| ContentNode::item(*text)).collect(),
        }
    }

    #[test]
    fn test_ordered_list_counts_from_start() {
        assert_eq!(serialize(&[ordered(3, &["Alpha", "Beta"])]), "3. Alpha\n4. Beta");
    }

    #[test]
    fn test_table_rows_join_cells() {
        let table = ContentNode::table([["A", "B"], ["C", "D"]]);
        assert_eq!(serialize(&[table]), "A | B\nC | D");
    }

    #[test]
    fn test_blank_runs_collapse_to_one_gap() {
        let nodes = vec![
            ContentNode::text("Top"),
            ContentNode::HardBreak,
            ContentNode::HardBreak,
            ContentNode::HardBreak,
            ContentNode::HardBreak,
            ContentNode::text("Bottom"),
        ];
        assert_eq!(serialize(&nodes), "Top\n\nBottom");
    }

    #[test]
    fn test_serialize_is_repeatable() {
        let fragment = Fragment::from_markdown(
            "# Plan\n\n1. One\n2. Two\n   - nested\n\n| x | y |\n| - | - |\n| 1 | 2 |\n",
        );
        let first = serialize(fragment.nodes());
        let second = serialize(fragment.nodes());
        assert_eq!(first, second);
    }

    #[test]
    fn test_nested_lists_and_tasks() {
        let fragment = Fragment::from_markdown(
            "- Parent\n  - Child\n    - Grandchild\n- [x] Done\n- [ ] Open\n",
        );

        insta::assert_snapshot!(serialize(fragment.nodes()), @r"
- Parent
  - Child
    - Grandchild
- [x] Done
- [ ] Open
");
    }

    #[test]
    fn test_bare_items_keep_their_marker() {
        let nodes = vec![
            ContentNode::task(true, "Done"),
            ContentNode::task(false, "Open"),
            ContentNode::item("Plain"),
        ];

        assert_eq!(serialize(&nodes), "- [x] Done\n- [ ] Open\n- Plain");
    }

    #[test]
    fn test_code_block_keeps_its_lines() {
        let fragment = Fragment::from_markdown("```rust\nlet a = 1;\nlet b = 2;\n```\n");

        assert_eq!(serialize(fragment.nodes()), "let a = 1;\nlet b = 2;");
    }

    #[test]
    fn test_custom_indent_unit() {
        let fragment = Fragment::from_markdown("1. Outer\n   1. Inner\n");

        assert_eq!(
            serialize_with_indent(fragment.nodes(), "\t"),
            "1. Outer\n\t1. Inner"
        );
    }

    #[test]
    fn test_blocks_one_line_each_and_empties_dropped() {
        let nodes = vec![
            ContentNode::heading(2, "  Title  "),
            ContentNode::paragraph(""),
            ContentNode::Blockquote {
                children: vec![
                    ContentNode::paragraph("Quoted"),
                    ContentNode::paragraph("twice"),
                ],
            },
            ContentNode::paragraph("Body"),
        ];

        insta::assert_snapshot!(serialize(&nodes), @r"
Title
Quoted twice
Body
");
    }

    #[test]
    fn test_cells_flatten_nested_blocks() {
        let table = ContentNode::Table {
            children: vec![ContentNode::TableRow {
                children: vec![
                    ContentNode::TableCell {
                        children: vec![
                            ContentNode::paragraph("first\nline"),
                            ContentNode::paragraph("second"),
                        ],
                    },
                    ContentNode::TableCell {
                        children: vec![ContentNode::text("plain")],
                    },
                ],
            }],
        };

        assert_eq!(serialize(&[table]), "first line second | plain");
    }

    #[test]
    fn test_unknown_nodes_fall_back() {
        let nodes = vec![
            ContentNode::Other {
                name: "mention".to_string(),
                text: Some("@tim".to_string()),
                children: vec![],
            },
            ContentNode::Other {
                name: "columns".to_string(),
                text: None,
                children: vec![ContentNode::paragraph("Left"), ContentNode::paragraph("Right")],
            },
            ContentNode::Other {
                name: "divider".to_string(),
                text: None,
                children: vec![],
            },
        ];

        assert_eq!(serialize(&nodes), "@tim\nLeft\nRight");
    }

    #[test]
    fn test_empty_fragment_is_empty_string() {
        assert_eq!(serialize(&[]), "");
    }
}
