use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::Fragment;
use crate::position::{Position, Span};

/// Opaque identifier of a proposal, unique within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub Uuid);

impl ProposalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProposalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProposalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a proposal is previewed and what its range is allowed to cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewKind {
    /// Replace whole block nodes; previewed with the inserted text
    Block,
    /// Replace an arbitrary span; previewed as before/after text
    RangeReplace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Equal,
    Insert,
    Delete,
}

/// One piece of an upstream-computed diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    pub kind: SegmentKind,
    pub text: String,
}

impl DiffSegment {
    pub fn equal(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Equal,
            text: text.into(),
        }
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Insert,
            text: text.into(),
        }
    }

    pub fn delete(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Delete,
            text: text.into(),
        }
    }
}

/// The user's selection when the suggestion was requested, possibly mid-node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub raw_from: Position,
    pub raw_to: Position,
}

impl SelectionRange {
    pub fn new(raw_from: impl Into<Position>, raw_to: impl Into<Position>) -> Self {
        Self {
            raw_from: raw_from.into(),
            raw_to: raw_to.into(),
        }
    }
}

/// The selection expanded to safe node boundaries: the proposal's anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRange {
    pub from: Position,
    pub to: Position,
}

impl NormalizedRange {
    pub fn new(from: impl Into<Position>, to: impl Into<Position>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn span(self) -> Span {
        Span {
            start: self.from,
            end: self.to,
        }
    }

    /// Whether `selection` sits inside this range
    pub fn encloses(self, selection: SelectionRange) -> bool {
        self.from <= selection.raw_from
            && selection.raw_from <= selection.raw_to
            && selection.raw_to <= self.to
    }
}

impl From<Span> for NormalizedRange {
    fn from(span: Span) -> Self {
        Self {
            from: span.start,
            to: span.end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Terminal transition requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected,
}

impl From<Outcome> for ProposalStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Accepted => ProposalStatus::Accepted,
            Outcome::Rejected => ProposalStatus::Rejected,
        }
    }
}

/// A suggested edit anchored to a range of the live document.
///
/// Only the store mutates a registered proposal: its `normalized` and
/// `selection` ranges follow document edits and its `status` changes once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffProposal {
    pub id: ProposalId,
    pub preview_kind: PreviewKind,
    pub original_content: Fragment,
    pub suggested_content: Fragment,
    pub diff: Vec<DiffSegment>,
    pub selection: SelectionRange,
    pub normalized: NormalizedRange,
    pub status: ProposalStatus,
    pub created_at: SystemTime,
}

impl DiffProposal {
    /// A fresh pending proposal with a new id
    pub fn new(
        preview_kind: PreviewKind,
        selection: SelectionRange,
        normalized: NormalizedRange,
        original_content: Fragment,
        suggested_content: Fragment,
        diff: Vec<DiffSegment>,
    ) -> Self {
        Self {
            id: ProposalId::new(),
            preview_kind,
            original_content,
            suggested_content,
            diff,
            selection,
            normalized,
            status: ProposalStatus::Pending,
            created_at: SystemTime::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ProposalStatus::Pending
    }

    /// First insert segment with text, used by block previews
    pub fn first_insertion(&self) -> Option<&str> {
        self.diff
            .iter()
            .find(|segment| segment.kind == SegmentKind::Insert && !segment.text.is_empty())
            .map(|segment| segment.text.as_str())
    }
}

/// A suggestion as the upstream producer delivers it, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub preview_kind: PreviewKind,
    pub selection: SelectionRange,
    pub suggested_content: Fragment,
    #[serde(default)]
    pub diff: Vec<DiffSegment>,
    /// Captured from the document at the normalized range when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_content: Option<Fragment>,
}

impl ProposalDraft {
    pub fn new(
        preview_kind: PreviewKind,
        selection: SelectionRange,
        suggested_content: Fragment,
    ) -> Self {
        Self {
            preview_kind,
            selection,
            suggested_content,
            diff: Vec::new(),
            original_content: None,
        }
    }

    pub fn with_diff(mut self, diff: Vec<DiffSegment>) -> Self {
        self.diff = diff;
        self
    }

    pub fn with_original(mut self, original: Fragment) -> Self {
        self.original_content = Some(original);
        self
    }
}
