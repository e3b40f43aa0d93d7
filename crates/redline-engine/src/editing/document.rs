use xi_rope::delta::DeltaElement;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::content::Fragment;
use crate::editing::commands::{check_range, compile_command, replace_delta};
use crate::editing::{Cmd, EditError, HostDocument, Mapping, Outline, Patch, ReplaceError};
use crate::position::Span;

/// Reference host document: a Markdown buffer with a structural outline.
///
/// ## Single source of truth
/// The whole document lives in one `xi_rope::Rope`. Every mutation is
/// compiled to a `Delta` and applied in one step, so an edit either lands
/// completely or not at all.
///
/// ## Change notification
/// Each committed edit returns a [`Patch`] whose [`Mapping`] describes how old
/// positions move. The suggestion engine re-projects its proposals through it.
///
/// ## Outline
/// After every edit the [`Outline`] is rebuilt from the new text so node
/// boundaries are never stale.
///
/// ```rust
/// # use redline_engine::editing::{Cmd, Document};
/// let mut doc = Document::from_bytes(b"# Hello\n\n- Item 1").unwrap();
/// let patch = doc.apply(Cmd::InsertText { at: 7, text: "!".to_string() }).unwrap();
/// assert_eq!(patch.version, 1);
/// assert_eq!(doc.text(), "# Hello!\n\n- Item 1");
/// ```
#[derive(Clone)]
pub struct Document {
    /// xi-rope buffer containing the entire document as UTF-8
    pub(crate) buffer: Rope,
    /// Incremented on each committed edit
    pub(crate) version: u64,
    /// Structure of the current buffer
    pub(crate) outline: Outline,
}

impl Document {
    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self {
            buffer: Rope::from(text),
            version: 0,
            outline: Outline::from_markdown(text),
        })
    }

    /// Get the document's content as raw bytes (exact round-trip)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Slice the buffer, clamping the range to the document
    pub fn slice_to_cow(&self, range: std::ops::Range<usize>) -> std::borrow::Cow<'_, str> {
        let doc_len = self.buffer.len();
        let start = range.start.min(doc_len);
        let end = range.end.min(doc_len).max(start);
        self.buffer.slice_to_cow(start..end)
    }

    /// Apply a host-side editing command
    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch, EditError> {
        let delta = compile_command(self, &cmd)?;
        Ok(self.commit(&delta))
    }

    fn commit(&mut self, delta: &Delta<RopeInfo>) -> Patch {
        // Track changed ranges for the patch
        let mut changed = Vec::new();
        let mut cursor = 0;
        for op in delta.els.iter() {
            match op {
                DeltaElement::Copy(from, to) => {
                    cursor += to - from;
                }
                DeltaElement::Insert(inserted) => {
                    let start = cursor;
                    let end = cursor + inserted.len();
                    changed.push(start..end);
                    cursor = end;
                }
            }
        }

        let mapping = Mapping::from_delta(delta);
        self.buffer = delta.apply(&self.buffer);
        self.outline = Outline::from_markdown(&self.buffer.to_string());
        self.version += 1;

        Patch {
            changed,
            mapping,
            version: self.version,
        }
    }

    fn is_line_start(&self, offset: usize) -> bool {
        offset == 0 || self.slice_to_cow(offset - 1..offset) == "\n"
    }

    fn is_line_end(&self, offset: usize) -> bool {
        if offset >= self.len() {
            return true;
        }
        let rest = self.slice_to_cow(offset..(offset + 2).min(self.len()));
        rest.starts_with('\n') || rest.starts_with("\r\n")
    }
}

impl HostDocument for Document {
    fn size(&self) -> usize {
        self.len()
    }

    fn outline(&self) -> &Outline {
        &self.outline
    }

    fn slice_fragment(&self, span: Span) -> Fragment {
        Fragment::from_markdown(&self.slice_to_cow(span.to_range()))
    }

    /// Everything is validated before the delta is built, so a failure leaves
    /// the buffer, outline and version untouched.
    fn replace_range(&mut self, span: Span, content: &Fragment) -> Result<Patch, ReplaceError> {
        let range = check_range(self, span.to_range())?;
        let text = content.to_markdown()?;
        if !content.is_inline() && !self.is_line_start(range.start) {
            return Err(ReplaceError::BlockMidLine(span.start));
        }
        if !content.is_inline() && !self.is_line_end(range.end) {
            return Err(ReplaceError::BlockEndsMidLine(span.end));
        }

        let delta = replace_delta(self.len(), range, &text);
        Ok(self.commit(&delta))
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("text", &self.buffer.to_string())
            .field("version", &self.version)
            .finish()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        // The outline is derived from the buffer
        self.buffer.to_string() == other.buffer.to_string() && self.version == other.version
    }
}
