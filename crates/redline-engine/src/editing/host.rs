use thiserror::Error;

use crate::content::{ContentError, Fragment};
use crate::editing::{EditError, Outline, Patch};
use crate::position::{Position, Span};

/// Why a host refused to replace a range
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReplaceError {
    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("suggested content cannot be written: {0}")]
    Malformed(#[from] ContentError),

    #[error("block content cannot be inserted mid-line at {0}")]
    BlockMidLine(Position),

    #[error("block content must end at a line end, not at {0}")]
    BlockEndsMidLine(Position),
}

/// The editor the suggestion engine overlays.
///
/// The engine reads structure through [`outline`](HostDocument::outline) and
/// only ever mutates through [`replace_range`](HostDocument::replace_range),
/// which must be atomic: on `Err` nothing has changed.
pub trait HostDocument {
    /// Current size of the position space
    fn size(&self) -> usize;

    fn outline(&self) -> &Outline;

    /// Content of `span` as a fragment, used to capture original content
    fn slice_fragment(&self, span: Span) -> Fragment;

    fn replace_range(&mut self, span: Span, content: &Fragment) -> Result<Patch, ReplaceError>;
}
