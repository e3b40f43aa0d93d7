use thiserror::Error;
use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::Document;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("range {start}..{end} is outside the document (length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("position {0} is not on a character boundary")]
    NotCharBoundary(usize),
}

/// Host-side edits to the document (typing, deleting, pasting)
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    InsertText {
        at: usize,
        text: String,
    },
    DeleteRange {
        range: std::ops::Range<usize>,
    },
    ReplaceRange {
        range: std::ops::Range<usize>,
        text: String,
    },
}

/// Compile a command into a delta
pub(crate) fn compile_command(doc: &Document, cmd: &Cmd) -> Result<Delta<RopeInfo>, EditError> {
    match cmd {
        Cmd::InsertText { at, text } => {
            let range = check_range(doc, *at..*at)?;
            Ok(replace_delta(doc.len(), range, text))
        }
        Cmd::DeleteRange { range } => {
            let range = check_range(doc, range.clone())?;
            let mut builder = Builder::new(doc.len());
            builder.delete(range);
            Ok(builder.build())
        }
        Cmd::ReplaceRange { range, text } => {
            let range = check_range(doc, range.clone())?;
            Ok(replace_delta(doc.len(), range, text))
        }
    }
}

pub(crate) fn replace_delta(
    base_len: usize,
    range: std::ops::Range<usize>,
    text: &str,
) -> Delta<RopeInfo> {
    let mut builder = Builder::new(base_len);
    builder.replace(range, Rope::from(text));
    builder.build()
}

/// Reject ranges xi-rope would panic on
pub(crate) fn check_range(
    doc: &Document,
    range: std::ops::Range<usize>,
) -> Result<std::ops::Range<usize>, EditError> {
    let len = doc.len();
    if range.start > range.end || range.end > len {
        return Err(EditError::OutOfBounds {
            start: range.start,
            end: range.end,
            len,
        });
    }
    for offset in [range.start, range.end] {
        if !doc.outline.is_char_boundary(offset.into()) {
            return Err(EditError::NotCharBoundary(offset));
        }
    }
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_text() {
        let mut doc = Document::from_bytes(b"Hello World").unwrap();
        doc.apply(Cmd::InsertText {
            at: 5,
            text: ",".to_string(),
        })
        .unwrap();

        assert_eq!(doc.text(), "Hello, World");
    }

    #[test]
    fn test_delete_range() {
        let mut doc = Document::from_bytes(b"Hello World").unwrap();
        doc.apply(Cmd::DeleteRange { range: 5..11 }).unwrap();

        assert_eq!(doc.text(), "Hello");
    }

    #[test]
    fn test_replace_range() {
        let mut doc = Document::from_bytes(b"Hello World").unwrap();
        doc.apply(Cmd::ReplaceRange {
            range: 6..11,
            text: "Universe".to_string(),
        })
        .unwrap();

        assert_eq!(doc.text(), "Hello Universe");
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let mut doc = Document::from_bytes(b"Hello").unwrap();
        let err = doc.apply(Cmd::DeleteRange { range: 3..40 }).unwrap_err();

        assert_eq!(
            err,
            EditError::OutOfBounds {
                start: 3,
                end: 40,
                len: 5
            }
        );
        assert_eq!(doc.text(), "Hello");
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_mid_character_is_rejected() {
        let mut doc = Document::from_bytes("日本".as_bytes()).unwrap();
        let err = doc
            .apply(Cmd::InsertText {
                at: 1,
                text: "x".to_string(),
            })
            .unwrap_err();

        assert_eq!(err, EditError::NotCharBoundary(1));
    }
}
