use super::{ContentError, ContentNode};

const DOCUMENT: &str = "document";

pub(super) fn render_fragment(nodes: &[ContentNode]) -> Result<String, ContentError> {
    if nodes.iter().all(ContentNode::is_inline) {
        return Ok(render_inline(nodes));
    }
    if let [ContentNode::Paragraph { children }] = nodes {
        return Ok(render_inline(children));
    }
    render_blocks(nodes, DOCUMENT)
}

/// Render sibling blocks separated by blank lines.
///
/// Runs of bare inline nodes between blocks are written as one paragraph.
fn render_blocks(nodes: &[ContentNode], parent: &'static str) -> Result<String, ContentError> {
    let mut blocks = Vec::new();
    let mut inline_run: Vec<&ContentNode> = Vec::new();

    for node in nodes {
        if node.is_inline() {
            inline_run.push(node);
            continue;
        }
        flush_inline(&mut inline_run, &mut blocks);
        let rendered = render_block(node, parent)?;
        if !rendered.is_empty() {
            blocks.push(rendered);
        }
    }
    flush_inline(&mut inline_run, &mut blocks);

    Ok(blocks.join("\n\n"))
}

fn flush_inline(run: &mut Vec<&ContentNode>, blocks: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let nodes: Vec<ContentNode> = run.drain(..).cloned().collect();
    let text = render_inline(&nodes);
    if !text.is_empty() {
        blocks.push(text);
    }
}

fn render_block(node: &ContentNode, parent: &'static str) -> Result<String, ContentError> {
    match node {
        ContentNode::Text { .. } | ContentNode::HardBreak => {
            Ok(render_inline(std::slice::from_ref(node)))
        }
        ContentNode::Paragraph { children } => Ok(render_inline(children)),
        ContentNode::Heading { level, children } => Ok(format!(
            "{} {}",
            "#".repeat((*level).clamp(1, 6) as usize),
            render_inline(children)
        )),
        ContentNode::BulletList { children } => render_list(children, None, node.kind_name()),
        ContentNode::OrderedList { start, children } => {
            render_list(children, Some(*start), node.kind_name())
        }
        ContentNode::Table { children } => render_table(children),
        ContentNode::Blockquote { children } => {
            let body = render_blocks(children, node.kind_name())?;
            Ok(quote_lines(&body))
        }
        ContentNode::Callout { kind, children } => {
            let body = render_blocks(children, node.kind_name())?;
            let label = kind.as_deref().unwrap_or("note").to_uppercase();
            Ok(format!("> [!{label}]\n{}", quote_lines(&body)))
        }
        ContentNode::CodeBlock { language, children } => {
            let code = plain_text(children);
            let code = code.strip_suffix('\n').unwrap_or(&code);
            Ok(format!(
                "```{}\n{code}\n```",
                language.as_deref().unwrap_or_default()
            ))
        }
        ContentNode::Other { text, children, .. } => {
            if children.is_empty() {
                Ok(text.clone().unwrap_or_default())
            } else {
                render_blocks(children, parent)
            }
        }
        ContentNode::ListItem { .. } | ContentNode::TableRow { .. } | ContentNode::TableCell { .. } => {
            Err(ContentError::Misplaced {
                node: node.kind_name(),
                parent,
            })
        }
    }
}

fn render_list(
    items: &[ContentNode],
    start: Option<u64>,
    parent: &'static str,
) -> Result<String, ContentError> {
    let mut lines = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let ContentNode::ListItem { checked, children } = item else {
            return Err(ContentError::Misplaced {
                node: item.kind_name(),
                parent,
            });
        };
        let marker = match (checked, start) {
            (Some(true), _) => "- [x] ".to_string(),
            (Some(false), _) => "- [ ] ".to_string(),
            (None, Some(start)) => format!("{}. ", start + index as u64),
            (None, None) => "- ".to_string(),
        };

        // Tight items: nested blocks follow on the next line, not after a gap
        let body = render_blocks(children, item.kind_name())?.replace("\n\n", "\n");
        let continuation = " ".repeat(marker.len());
        for (line_index, line) in body.lines().enumerate() {
            if line_index == 0 {
                lines.push(format!("{marker}{line}"));
            } else if line.is_empty() {
                lines.push(String::new());
            } else {
                lines.push(format!("{continuation}{line}"));
            }
        }
        if body.is_empty() {
            lines.push(marker.trim_end().to_string());
        }
    }

    Ok(lines.join("\n"))
}

fn render_table(rows: &[ContentNode]) -> Result<String, ContentError> {
    let mut lines = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let ContentNode::TableRow { children: cells } = row else {
            return Err(ContentError::Misplaced {
                node: row.kind_name(),
                parent: "table",
            });
        };
        let mut rendered = Vec::with_capacity(cells.len());
        for cell in cells {
            let ContentNode::TableCell { children } = cell else {
                return Err(ContentError::Misplaced {
                    node: cell.kind_name(),
                    parent: "table_row",
                });
            };
            let text = plain_text(children)
                .replace('\n', " ")
                .replace('|', "\\|");
            rendered.push(text.trim().to_string());
        }
        lines.push(format!("| {} |", rendered.join(" | ")));
        if index == 0 {
            let separator = vec!["---"; cells.len().max(1)].join(" | ");
            lines.push(format!("| {separator} |"));
        }
    }

    Ok(lines.join("\n"))
}

fn quote_lines(body: &str) -> String {
    body.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_inline(nodes: &[ContentNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            ContentNode::Text { text } => out.push_str(text),
            ContentNode::HardBreak => out.push_str("\\\n"),
            other => out.push_str(&render_inline(other.children())),
        }
    }
    out
}

/// Concatenated text leaves, line breaks as newlines
fn plain_text(nodes: &[ContentNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            ContentNode::Text { text } => out.push_str(text),
            ContentNode::HardBreak => out.push('\n'),
            other => out.push_str(&plain_text(other.children())),
        }
    }
    out
}
