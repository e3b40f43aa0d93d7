use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use super::ContentNode;

/// Markdown extensions shared by fragment parsing and the document outline
pub(crate) fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_GFM
}

pub(super) fn parse_fragment(source: &str) -> Vec<ContentNode> {
    let mut builder = FragmentBuilder::new();
    for event in Parser::new_ext(source, markdown_options()) {
        builder.process_event(event);
    }
    builder.finish()
}

/// One open container while walking the event stream.
///
/// Inline marks (emphasis, links) open a frame with no node: their children
/// are spliced into the parent when the frame closes.
struct Frame {
    node: Option<ContentNode>,
    children: Vec<ContentNode>,
}

/// Builds a content tree from pulldown-cmark events.
///
/// Every `Start` event opens exactly one frame and every `End` closes the
/// innermost one, so the frame stack mirrors the event nesting.
struct FragmentBuilder {
    stack: Vec<Frame>,
    root: Vec<ContentNode>,
}

impl FragmentBuilder {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            root: Vec::new(),
        }
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => {
                let node = node_for_tag(&tag);
                self.stack.push(Frame {
                    node,
                    children: Vec::new(),
                });
            }
            Event::End(_) => self.close_frame(),
            Event::Text(text) | Event::Code(text) | Event::Html(text) | Event::InlineHtml(text) => {
                self.push_text(&text)
            }
            Event::InlineMath(text) | Event::DisplayMath(text) => self.push_text(&text),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_node(ContentNode::HardBreak),
            Event::Rule => self.push_node(ContentNode::Other {
                name: "horizontal_rule".to_string(),
                text: None,
                children: Vec::new(),
            }),
            Event::FootnoteReference(label) => self.push_text(&format!("[^{label}]")),
            Event::TaskListMarker(checked) => self.mark_task(checked),
        }
    }

    fn close_frame(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame.node {
            Some(mut node) => {
                if let Some(children) = node.children_mut() {
                    *children = frame.children;
                }
                self.push_node(node);
            }
            None => {
                for child in frame.children {
                    self.push_node(child);
                }
            }
        }
    }

    fn siblings(&mut self) -> &mut Vec<ContentNode> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.root,
        }
    }

    fn push_node(&mut self, node: ContentNode) {
        if let ContentNode::Text { text } = &node {
            self.push_text(text);
            return;
        }
        self.siblings().push(node);
    }

    /// Append text, merging with a preceding text leaf
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let siblings = self.siblings();
        if let Some(ContentNode::Text { text: previous }) = siblings.last_mut() {
            previous.push_str(text);
        } else {
            siblings.push(ContentNode::text(text));
        }
    }

    /// Task markers arrive inside the item (or inside its first paragraph)
    fn mark_task(&mut self, is_checked: bool) {
        for frame in self.stack.iter_mut().rev() {
            if let Some(ContentNode::ListItem { checked, .. }) = &mut frame.node {
                *checked = Some(is_checked);
                return;
            }
        }
    }

    fn finish(mut self) -> Vec<ContentNode> {
        // Unbalanced input cannot come from pulldown-cmark, but never lose content
        while !self.stack.is_empty() {
            self.close_frame();
        }
        self.root
    }
}

fn node_for_tag(tag: &Tag) -> Option<ContentNode> {
    let node = match tag {
        Tag::Paragraph => ContentNode::Paragraph {
            children: Vec::new(),
        },
        Tag::Heading { level, .. } => ContentNode::Heading {
            level: *level as u8,
            children: Vec::new(),
        },
        Tag::BlockQuote(None) => ContentNode::Blockquote {
            children: Vec::new(),
        },
        Tag::BlockQuote(Some(kind)) => ContentNode::Callout {
            kind: Some(format!("{kind:?}").to_lowercase()),
            children: Vec::new(),
        },
        Tag::CodeBlock(kind) => ContentNode::CodeBlock {
            language: match kind {
                CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                _ => None,
            },
            children: Vec::new(),
        },
        Tag::List(Some(start)) => ContentNode::OrderedList {
            start: *start,
            children: Vec::new(),
        },
        Tag::List(None) => ContentNode::BulletList {
            children: Vec::new(),
        },
        Tag::Item => ContentNode::ListItem {
            checked: None,
            children: Vec::new(),
        },
        Tag::Table(_) => ContentNode::Table {
            children: Vec::new(),
        },
        // The header row has no row tag of its own
        Tag::TableHead | Tag::TableRow => ContentNode::TableRow {
            children: Vec::new(),
        },
        Tag::TableCell => ContentNode::TableCell {
            children: Vec::new(),
        },
        Tag::Emphasis
        | Tag::Strong
        | Tag::Strikethrough
        | Tag::Superscript
        | Tag::Subscript
        | Tag::Link { .. } => return None,
        Tag::Image { .. } => other("image"),
        Tag::HtmlBlock => other("html_block"),
        Tag::FootnoteDefinition(_) => other("footnote_definition"),
        Tag::DefinitionList => other("definition_list"),
        Tag::DefinitionListTitle => other("definition_list_title"),
        Tag::DefinitionListDefinition => other("definition_list_definition"),
        Tag::MetadataBlock(_) => other("metadata_block"),
    };
    Some(node)
}

fn other(name: &str) -> ContentNode {
    ContentNode::Other {
        name: name.to_string(),
        text: None,
        children: Vec::new(),
    }
}
